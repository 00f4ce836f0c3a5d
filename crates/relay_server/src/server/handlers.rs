//! Connection handling logic for WebSocket clients.
//!
//! This module contains the core connection handling logic that manages
//! the lifecycle of individual client connections, including WebSocket
//! handshaking, frame decoding, event dispatch, and cleanup.

use crate::{connection::ConnectionManager, error::ServerError, handlers::EventHandlers, messaging::decode_message};
use futures::{SinkExt, StreamExt};
use gateway_events::{Event, EventData, EventType};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpStream;
use tokio_tungstenite::{accept_async, tungstenite::Message};
use tracing::{debug, error, trace};

/// Handles a single client connection from establishment to cleanup.
///
/// # Connection Flow
///
/// 1. Perform WebSocket handshake
/// 2. Register connection with the connection manager
/// 3. Start message handling tasks (incoming and outgoing)
/// 4. On termination, synthesize a disconnect event if the connection had
///    an authenticated session, then clean up
///
/// # Message Handling
///
/// Two concurrent tasks per connection:
///
/// * **Incoming task**: decodes text frames into events and dispatches them
/// * **Outgoing task**: forwards messages addressed to this connection id
///
/// These run until the connection closes or an error occurs.
pub async fn handle_connection(
    stream: TcpStream,
    addr: SocketAddr,
    connection_manager: Arc<ConnectionManager>,
    handlers: Arc<EventHandlers>,
) -> Result<(), ServerError> {
    let ws_stream = accept_async(stream)
        .await
        .map_err(|e| ServerError::Network(format!("WebSocket handshake failed: {e}")))?;

    let (ws_sender, mut ws_receiver) = ws_stream.split();
    let ws_sender = Arc::new(tokio::sync::Mutex::new(ws_sender));
    let connection_id = connection_manager.add_connection(addr).await;
    connection_manager
        .register_ws_sender(connection_id, ws_sender.clone())
        .await;

    let mut message_receiver = connection_manager.subscribe();
    let ws_sender_incoming = ws_sender.clone();
    let ws_sender_outgoing = ws_sender.clone();

    // Incoming task: decode text frames and dispatch them.
    let incoming_task = {
        let handlers = handlers.clone();

        async move {
            while let Some(msg) = ws_receiver.next().await {
                match msg {
                    Ok(Message::Text(text)) => match decode_message(&text, Some(connection_id)) {
                        Ok(event) => handlers.dispatch(event).await,
                        Err(e) => {
                            trace!(
                                "❌ Dropping undecodable frame from connection {}: {}",
                                connection_id,
                                e
                            );
                        }
                    },
                    Ok(Message::Close(_)) => {
                        debug!("🔌 Client {} requested close", connection_id);
                        break;
                    }
                    Ok(Message::Ping(data)) => {
                        let mut ws_sender = ws_sender_incoming.lock().await;
                        let _ = ws_sender.send(Message::Pong(data)).await;
                    }
                    Err(e) => {
                        error!("WebSocket error for connection {}: {}", connection_id, e);
                        break;
                    }
                    _ => {}
                }
            }
        }
    };

    // Outgoing task: deliver messages addressed to this connection.
    let outgoing_task = {
        let ws_sender = ws_sender_outgoing;
        async move {
            while let Ok((target_connection_id, message)) = message_receiver.recv().await {
                if target_connection_id == connection_id {
                    let mut ws_sender = ws_sender.lock().await;
                    if let Err(e) = ws_sender.send(Message::Text(message.into())).await {
                        error!("Failed to send message: {}", e);
                        break;
                    }
                }
            }
        }
    };

    tokio::select! {
        _ = incoming_task => {},
        _ = outgoing_task => {},
    }

    // A socket that closed without a disconnect event still gets the full
    // disconnect treatment, so the rest of the world hears about it.
    if let Some(session) = handlers
        .ctx()
        .services()
        .clients
        .find_by_connection(connection_id)
    {
        let synthesized = Event::new(
            EventType::DisconnectClient,
            session.client_id,
            EventData::Client(gateway_events::ClientInfo {
                client_id: session.client_id,
                hash: session.hash.clone(),
                character_id: session.character_id,
            }),
        )
        .with_origin(connection_id);
        handlers.dispatch(synthesized).await;
    }

    connection_manager.remove_connection(connection_id).await;
    connection_manager.remove_ws_sender(connection_id).await;
    Ok(())
}
