
// Include tests
#[cfg(test)]
mod tests {
    use crate::connection::{ClientResponseSender, ConnectionId};
    use crate::handlers::EventHandlers;
    use crate::messaging::decode_message;
    use crate::services::Services;
    use crate::session::{SessionContext, UpstreamHandle};
    use serde_json::{json, Value};
    use std::collections::HashSet;
    use std::sync::{Arc, Mutex};
    use tokio::sync::mpsc;

    /// Records every outbound message instead of touching a socket, so
    /// handler behavior can be asserted end to end without a transport.
    #[derive(Debug, Default)]
    struct RecordingSender {
        sent: Mutex<Vec<(ConnectionId, String)>>,
        open: Mutex<HashSet<ConnectionId>>,
    }

    impl RecordingSender {
        fn open_connection(&self, connection_id: ConnectionId) {
            self.open.lock().unwrap().insert(connection_id);
        }

        fn close_connection(&self, connection_id: ConnectionId) {
            self.open.lock().unwrap().remove(&connection_id);
        }

        fn sent_to(&self, connection_id: ConnectionId) -> Vec<Value> {
            self.sent
                .lock()
                .unwrap()
                .iter()
                .filter(|(target, _)| *target == connection_id)
                .map(|(_, raw)| serde_json::from_str(raw).expect("recorded message is JSON"))
                .collect()
        }

        /// All deliveries carrying a given `header.message`, in send order.
        fn deliveries_named(&self, message: &str) -> Vec<(ConnectionId, Value)> {
            self.sent
                .lock()
                .unwrap()
                .iter()
                .map(|(target, raw)| {
                    let parsed: Value =
                        serde_json::from_str(raw).expect("recorded message is JSON");
                    (*target, parsed)
                })
                .filter(|(_, parsed)| parsed["header"]["message"] == message)
                .collect()
        }

        fn total_sent(&self) -> usize {
            self.sent.lock().unwrap().len()
        }

        fn clear(&self) {
            self.sent.lock().unwrap().clear();
        }
    }

    impl ClientResponseSender for RecordingSender {
        fn send_to_connection(
            &self,
            connection_id: ConnectionId,
            message: String,
        ) -> std::pin::Pin<Box<dyn std::future::Future<Output = Result<(), String>> + Send + '_>>
        {
            Box::pin(async move {
                if !self.open.lock().unwrap().contains(&connection_id) {
                    return Err(format!("Connection {} is not open", connection_id));
                }
                self.sent.lock().unwrap().push((connection_id, message));
                Ok(())
            })
        }

        fn is_connection_open(
            &self,
            connection_id: ConnectionId,
        ) -> std::pin::Pin<Box<dyn std::future::Future<Output = bool> + Send + '_>> {
            Box::pin(async move { self.open.lock().unwrap().contains(&connection_id) })
        }
    }

    struct Harness {
        handlers: EventHandlers,
        sender: Arc<RecordingSender>,
        upstream_rx: mpsc::UnboundedReceiver<String>,
    }

    impl Harness {
        fn new() -> Self {
            let sender = Arc::new(RecordingSender::default());
            let (upstream_tx, upstream_rx) = mpsc::unbounded_channel();
            let ctx = SessionContext::new(
                Arc::new(Services::new()),
                sender.clone(),
                UpstreamHandle::new(upstream_tx),
            );
            Self {
                handlers: EventHandlers::new(ctx),
                sender,
                upstream_rx,
            }
        }

        async fn dispatch(&self, frame: Value, origin: Option<ConnectionId>) {
            let event = decode_message(&frame.to_string(), origin).expect("frame should decode");
            self.handlers.dispatch(event).await;
        }

        /// Opens a connection and runs the client join flow on it.
        async fn join_client(&self, client_id: i64, connection_id: ConnectionId) {
            self.sender.open_connection(connection_id);
            self.dispatch(
                json!({
                    "header": {
                        "eventType": "joinGameClient",
                        "clientId": client_id,
                        "hash": format!("hash-{client_id}"),
                    },
                    "body": {},
                }),
                Some(connection_id),
            )
            .await;
        }
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn ping_answers_pong_on_the_join_connection() {
        let harness = Harness::new();
        harness.join_client(5, 1).await;
        harness.sender.clear();

        harness
            .dispatch(
                json!({
                    "header": { "eventType": "pingClient", "clientId": 5, "hash": "hash-5" },
                    "body": {},
                }),
                Some(1),
            )
            .await;

        let received = harness.sender.sent_to(1);
        assert_eq!(received.len(), 1);
        assert_eq!(received[0]["status"], "success");
        assert_eq!(received[0]["header"]["message"], "Pong!");
        assert_eq!(received[0]["header"]["eventType"], "pingClient");
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn ping_for_a_closed_connection_is_silently_skipped() {
        let harness = Harness::new();
        harness.join_client(5, 1).await;
        harness.sender.close_connection(1);
        harness.sender.clear();

        harness
            .dispatch(
                json!({
                    "header": { "eventType": "pingClient", "clientId": 5, "hash": "hash-5" },
                    "body": {},
                }),
                Some(1),
            )
            .await;

        assert_eq!(harness.sender.total_sent(), 0);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn client_join_broadcast_includes_the_joiner() {
        let harness = Harness::new();
        harness.join_client(5, 1).await;
        harness.sender.clear();

        harness.join_client(6, 2).await;

        let announcements = harness
            .sender
            .deliveries_named("Authentication success for user!");
        let targets: HashSet<ConnectionId> =
            announcements.iter().map(|(target, _)| *target).collect();
        assert_eq!(targets, HashSet::from([1, 2]));
        for (_, message) in &announcements {
            assert_eq!(message["header"]["clientId"], 6);
            assert_eq!(message["header"]["hash"], "hash-6");
        }
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn client_join_without_hash_is_rejected() {
        let harness = Harness::new();
        harness.sender.open_connection(1);

        harness
            .dispatch(
                json!({
                    "header": { "eventType": "joinGameClient", "clientId": 5, "hash": "" },
                    "body": {},
                }),
                Some(1),
            )
            .await;

        assert!(harness.handlers.ctx().services().clients.is_empty());
        // No session means no resolvable connection for the error reply.
        assert_eq!(harness.sender.total_sent(), 0);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn disconnect_broadcast_excludes_the_disconnector() {
        let harness = Harness::new();
        harness.join_client(5, 1).await;
        harness.join_client(6, 2).await;
        harness.sender.clear();

        harness
            .dispatch(
                json!({
                    "header": { "eventType": "disconnectClient", "clientId": 5, "hash": "hash-5" },
                    "body": {},
                }),
                Some(1),
            )
            .await;

        let farewells = harness.sender.deliveries_named("Client disconnected!");
        assert_eq!(farewells.len(), 1);
        assert_eq!(farewells[0].0, 2);
        assert_eq!(farewells[0].1["header"]["clientId"], 5);
        assert!(harness.handlers.ctx().services().clients.get(5).is_none());
        assert!(harness.handlers.ctx().services().clients.get(6).is_some());
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn character_join_is_deferred_until_the_record_arrives() {
        let harness = Harness::new();
        harness.join_client(5, 1).await;
        harness.sender.clear();

        harness
            .dispatch(
                json!({
                    "header": { "eventType": "joinGameCharacter", "clientId": 5, "hash": "hash-5" },
                    "body": { "characterId": 42 },
                }),
                Some(1),
            )
            .await;

        // Deferred join: no response at all until the replay.
        assert_eq!(harness.sender.total_sent(), 0);
        assert!(harness.handlers.pending().is_waiting(42));

        harness
            .dispatch(
                json!({
                    "header": { "eventType": "setCharacterData" },
                    "body": {
                        "id": 42,
                        "clientId": 5,
                        "name": "Aria",
                        "skillsData": [
                            { "skillName": "Fireball", "skillSlug": "fireball", "skillLevel": 2 }
                        ],
                    },
                }),
                None,
            )
            .await;

        assert!(!harness.handlers.pending().is_waiting(42));
        let joins = harness
            .sender
            .deliveries_named("Authentication success for character!");
        assert_eq!(joins.len(), 1);
        assert_eq!(joins[0].0, 1);
        assert_eq!(joins[0].1["header"]["clientId"], 5);
        assert_eq!(joins[0].1["body"]["character"]["id"], 42);
        assert_eq!(joins[0].1["body"]["character"]["name"], "Aria");

        // Join side effects: skill state and the NPC spawn push.
        let skills = harness
            .handlers
            .ctx()
            .services()
            .skills
            .get(42)
            .expect("skill state initialized on join");
        assert_eq!(skills.len(), 1);
        assert_eq!(skills[0].skill_slug, "fireball");
        let npc_pushes = harness.sender.deliveries_named("NPCs spawn data for area");
        assert_eq!(npc_pushes.len(), 1);
        assert_eq!(npc_pushes[0].0, 1);
        assert_eq!(npc_pushes[0].1["header"]["eventType"], "spawnNPCs");
        assert_eq!(npc_pushes[0].1["body"]["npcCount"], 0);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn deferred_joins_replay_in_arrival_order_exactly_once() {
        let harness = Harness::new();
        harness.join_client(5, 1).await;
        harness.join_client(6, 2).await;

        for (client_id, connection_id) in [(5, 1), (6, 2)] {
            harness
                .dispatch(
                    json!({
                        "header": {
                            "eventType": "joinGameCharacter",
                            "clientId": client_id,
                            "hash": format!("hash-{client_id}"),
                        },
                        "body": { "characterId": 42 },
                    }),
                    Some(connection_id),
                )
                .await;
        }
        assert_eq!(harness.handlers.pending().queued_for(42), 2);
        harness.sender.clear();

        let record = json!({
            "header": { "eventType": "setCharacterData" },
            "body": { "id": 42, "name": "Aria" },
        });
        harness.dispatch(record.clone(), None).await;

        // Each replayed join broadcasts to both clients, first waiter first.
        let joiner_ids: Vec<i64> = harness
            .sender
            .deliveries_named("Authentication success for character!")
            .iter()
            .map(|(_, message)| message["header"]["clientId"].as_i64().unwrap())
            .collect();
        assert_eq!(joiner_ids, vec![5, 5, 6, 6]);
        assert!(!harness.handlers.pending().is_waiting(42));

        // A second push finds no waiters and replays nothing.
        harness.sender.clear();
        harness.dispatch(record, None).await;
        assert!(harness
            .sender
            .deliveries_named("Authentication success for character!")
            .is_empty());
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn sentinel_ids_on_character_join_are_rejected_not_deferred() {
        let harness = Harness::new();
        harness.join_client(5, 1).await;
        harness
            .handlers
            .ctx()
            .services()
            .clients
            .set_character_id(5, 41);
        harness.sender.clear();

        // A join for the absent-character sentinel is refused outright,
        // never queued under key 0, and mutates nothing.
        harness
            .dispatch(
                json!({
                    "header": { "eventType": "joinGameCharacter", "clientId": 5, "hash": "hash-5" },
                    "body": { "characterId": 0 },
                }),
                Some(1),
            )
            .await;

        assert!(!harness.handlers.pending().is_waiting(0));
        let rejections = harness
            .sender
            .deliveries_named("Authentication failed for character!");
        assert_eq!(rejections.len(), 1);
        assert_eq!(rejections[0].0, 1);
        assert_eq!(rejections[0].1["status"], "error");
        let session = harness
            .handlers
            .ctx()
            .services()
            .clients
            .get(5)
            .expect("session kept");
        assert_eq!(session.character_id, 41);

        // An unauthenticated join is refused too; with no session the error
        // reply has no connection to land on.
        harness.sender.clear();
        harness
            .dispatch(
                json!({
                    "header": { "eventType": "joinGameCharacter", "clientId": 0, "hash": "" },
                    "body": { "characterId": 42 },
                }),
                None,
            )
            .await;

        assert!(!harness.handlers.pending().is_waiting(42));
        assert_eq!(harness.sender.total_sent(), 0);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn concurrent_join_and_record_arrival_never_strands_the_join() {
        for round in 0..50 {
            let harness = Arc::new(Harness::new());
            harness.join_client(5, 1).await;
            harness.sender.clear();

            let join = {
                let harness = harness.clone();
                tokio::spawn(async move {
                    harness
                        .dispatch(
                            json!({
                                "header": {
                                    "eventType": "joinGameCharacter",
                                    "clientId": 5,
                                    "hash": "hash-5",
                                },
                                "body": { "characterId": 42 },
                            }),
                            Some(1),
                        )
                        .await;
                })
            };
            let arrival = {
                let harness = harness.clone();
                tokio::spawn(async move {
                    harness
                        .dispatch(
                            json!({
                                "header": { "eventType": "setCharacterData" },
                                "body": { "id": 42, "name": "Aria" },
                            }),
                            None,
                        )
                        .await;
                })
            };
            join.await.expect("join task");
            arrival.await.expect("arrival task");

            // Whichever side wins the race, the join is answered exactly
            // once and nothing is left queued.
            let joins = harness
                .sender
                .deliveries_named("Authentication success for character!");
            assert_eq!(joins.len(), 1, "round {}: join lost or doubled", round);
            assert_eq!(joins[0].1["header"]["clientId"], 5);
            assert!(!harness.handlers.pending().is_waiting(42));
        }
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn sentinel_client_id_never_resolves_a_connection() {
        let harness = Harness::new();
        // Even a (bogus) session keyed by the sentinel must not resolve.
        harness
            .handlers
            .ctx()
            .services()
            .clients
            .load(
                &gateway_events::ClientInfo {
                    client_id: 0,
                    hash: "bogus".to_string(),
                    character_id: 0,
                },
                Some(9),
            );
        harness.sender.open_connection(9);

        assert!(harness.handlers.ctx().resolve_connection(0).is_none());
        harness
            .handlers
            .ctx()
            .send_to_client(0, "dropped".to_string())
            .await;
        assert_eq!(harness.sender.total_sent(), 0);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn movement_broadcasts_a_minimal_payload_to_everyone() {
        let harness = Harness::new();
        harness.join_client(5, 1).await;
        harness.join_client(6, 2).await;
        harness
            .dispatch(
                json!({
                    "header": { "eventType": "setCharacterData" },
                    "body": { "id": 42, "name": "Aria" },
                }),
                None,
            )
            .await;
        harness.sender.clear();

        harness
            .dispatch(
                json!({
                    "header": { "eventType": "moveCharacter", "clientId": 5, "hash": "hash-5" },
                    "body": {
                        "characterId": 42,
                        "posX": 10.0, "posY": 20.0, "posZ": 0.5, "rotZ": 180.0,
                    },
                }),
                Some(1),
            )
            .await;

        let moves = harness
            .sender
            .deliveries_named("Movement success for character!");
        let targets: HashSet<ConnectionId> = moves.iter().map(|(target, _)| *target).collect();
        assert_eq!(targets, HashSet::from([1, 2]));
        for (_, message) in &moves {
            let character = &message["body"]["character"];
            assert_eq!(character["id"], 42);
            assert_eq!(character["position"]["x"], 10.0);
            assert_eq!(character["position"]["rotationZ"], 180.0);
            // Minimal payload: no stats or attributes on a move.
            assert!(character.get("stats").is_none());
        }
        let stored = harness
            .handlers
            .ctx()
            .services()
            .characters
            .get(42)
            .expect("record kept");
        assert_eq!(stored.position.y, 20.0);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn connected_clients_listing_reports_live_status() {
        let harness = Harness::new();
        harness.join_client(5, 1).await;
        harness.join_client(6, 2).await;
        harness.sender.close_connection(2);
        harness.sender.clear();

        harness
            .dispatch(
                json!({
                    "header": { "eventType": "getConnectedClients", "clientId": 5, "hash": "hash-5" },
                    "body": {},
                }),
                Some(1),
            )
            .await;

        let received = harness.sender.sent_to(1);
        assert_eq!(received.len(), 1);
        assert_eq!(
            received[0]["header"]["message"],
            "Getting connected clients success!"
        );
        let listing = received[0]["body"]["clientsList"].as_array().unwrap();
        assert_eq!(listing.len(), 2);
        let status_of = |client_id: i64| {
            listing
                .iter()
                .find(|entry| entry["clientId"] == client_id)
                .map(|entry| entry["status"].clone())
                .unwrap()
        };
        assert_eq!(status_of(5), "connected");
        assert_eq!(status_of(6), "disconnected");
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn mob_death_broadcast_reaches_everyone() {
        let harness = Harness::new();
        harness.join_client(5, 1).await;
        harness.join_client(6, 2).await;
        harness.sender.clear();

        harness
            .dispatch(
                json!({
                    "header": { "eventType": "mobDeath" },
                    "body": { "mobUID": 1007, "zoneId": 3 },
                }),
                None,
            )
            .await;

        let deaths = harness.sender.deliveries_named("Mob died");
        let targets: HashSet<ConnectionId> = deaths.iter().map(|(target, _)| *target).collect();
        assert_eq!(targets, HashSet::from([1, 2]));
        for (_, message) in &deaths {
            assert_eq!(message["body"]["mobUID"], 1007);
            assert_eq!(message["body"]["zoneId"], 3);
        }
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn mob_data_lookup_replies_upstream() {
        let mut harness = Harness::new();
        harness
            .dispatch(
                json!({
                    "header": { "eventType": "setAllMobsList" },
                    "body": { "mobsList": [ { "id": 7, "name": "Dire Wolf", "zoneId": 3 } ] },
                }),
                None,
            )
            .await;

        harness
            .dispatch(
                json!({
                    "header": { "eventType": "getMobData" },
                    "body": { "id": 7, "UID": 1007 },
                }),
                None,
            )
            .await;

        let reply: Value = serde_json::from_str(
            &harness
                .upstream_rx
                .try_recv()
                .expect("reply queued for upstream"),
        )
        .unwrap();
        assert_eq!(reply["status"], "success");
        assert_eq!(reply["header"]["message"], "Getting mob data success!");
        assert_eq!(reply["body"]["mob"]["id"], 7);
        assert_eq!(reply["body"]["mob"]["name"], "Dire Wolf");
        // Nothing goes to clients for an upstream-only request.
        assert_eq!(harness.sender.total_sent(), 0);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn chunk_init_is_acknowledged_upstream() {
        let mut harness = Harness::new();
        harness
            .dispatch(
                json!({
                    "header": { "eventType": "chunkServerData" },
                    "body": {
                        "id": 12, "ip": "10.0.0.4", "port": 7012,
                        "posX": 0.0, "posY": 0.0, "posZ": 0.0,
                        "sizeX": 512.0, "sizeY": 512.0, "sizeZ": 256.0,
                    },
                }),
                None,
            )
            .await;

        let ack: Value =
            serde_json::from_str(&harness.upstream_rx.try_recv().expect("ack queued")).unwrap();
        assert_eq!(ack["status"], "success");
        assert_eq!(ack["header"]["message"], "Init success for chunk!");
        assert_eq!(ack["header"]["chunkId"], 12);
        assert_eq!(ack["header"]["eventType"], "chunkServerData");
        assert!(harness.handlers.ctx().services().chunks.get(12).is_some());

        harness
            .dispatch(
                json!({
                    "header": { "eventType": "chunkServerData" },
                    "body": { "id": 0 },
                }),
                None,
            )
            .await;
        let rejection: Value =
            serde_json::from_str(&harness.upstream_rx.try_recv().expect("ack queued")).unwrap();
        assert_eq!(rejection["status"], "error");
        assert_eq!(rejection["header"]["message"], "Init failed for chunk!");
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn spawn_zone_lookup_answers_the_requester_only() {
        let harness = Harness::new();
        harness.join_client(5, 1).await;
        harness.join_client(6, 2).await;
        harness
            .dispatch(
                json!({
                    "header": { "eventType": "setAllSpawnZones" },
                    "body": {
                        "spawnZonesData": [
                            { "id": 3, "name": "Darkwood", "maxMobSpawnCount": 10, "respawnTime": 30 }
                        ],
                    },
                }),
                None,
            )
            .await;
        harness.sender.clear();

        harness
            .dispatch(
                json!({
                    "header": { "eventType": "getSpawnZoneData", "clientId": 5, "hash": "hash-5" },
                    "body": { "zoneId": 3 },
                }),
                Some(1),
            )
            .await;

        assert_eq!(harness.sender.total_sent(), 1);
        let received = harness.sender.sent_to(1);
        assert_eq!(
            received[0]["header"]["message"],
            "Getting spawn zone data success!"
        );
        assert_eq!(received[0]["body"]["spawnZone"]["id"], 3);
        assert_eq!(received[0]["body"]["spawnZone"]["maxSpawnCount"], 10);
    }
}
