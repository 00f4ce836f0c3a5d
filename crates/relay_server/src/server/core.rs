//! Core relay server implementation.
//!
//! This module contains the main `RelayServer` struct and its
//! implementation, wiring together connection management, the entity
//! registries, the domain handlers, and the upstream worker, and running
//! the client-facing accept loop(s).

use crate::{
    config::ServerConfig,
    connection::{ConnectionManager, WsResponseSender},
    error::ServerError,
    handlers::EventHandlers,
    server::handlers::handle_connection,
    services::Services,
    session::{SessionContext, UpstreamHandle},
    upstream::run_upstream_worker,
};
use futures::stream::{FuturesUnordered, StreamExt as FuturesStreamExt};
use socket2::{Domain, Protocol, Socket, Type};
use std::sync::Arc;
use tokio::sync::{broadcast, mpsc, Mutex};
use tracing::{error, info, trace, warn};

/// The core relay server structure.
///
/// `RelayServer` terminates client WebSockets, relays typed events to and
/// from the single authoritative upstream process, and answers or
/// broadcasts per-event delivery policy. It holds no game logic beyond
/// transcoding and relaying; the upstream process stays authoritative.
///
/// # Architecture
///
/// * **Connection manager**: WebSocket connection lifecycle and delivery
/// * **Registries**: in-memory caches of upstream-pushed world state
/// * **Handlers**: one dispatch target per event type
/// * **Upstream worker**: one TCP link, newline-framed JSON, reconnecting
/// * **Multi-threaded networking**: configurable accept loop scaling
pub struct RelayServer {
    /// Server configuration settings
    config: ServerConfig,

    /// Manager for client connections and messaging
    connection_manager: Arc<ConnectionManager>,

    /// Domain handlers behind the dispatch entry point
    handlers: Arc<EventHandlers>,

    /// Receiver side of the upstream queue, taken when the worker starts
    upstream_outbound: Mutex<Option<mpsc::UnboundedReceiver<String>>>,

    /// Channel for coordinating server shutdown
    shutdown_sender: broadcast::Sender<()>,
}

impl RelayServer {
    /// Creates a new relay server with the specified configuration.
    ///
    /// Initializes the connection manager, registries, session context,
    /// and handlers. The server is ready to start after construction.
    pub fn new(config: ServerConfig) -> Self {
        let connection_manager = Arc::new(ConnectionManager::new());
        let response_sender = Arc::new(WsResponseSender::new(connection_manager.clone()));
        let (upstream_tx, upstream_rx) = mpsc::unbounded_channel();
        let (shutdown_sender, _) = broadcast::channel(1);

        let ctx = SessionContext::new(
            Arc::new(Services::new()),
            response_sender,
            UpstreamHandle::new(upstream_tx),
        );
        let handlers = Arc::new(EventHandlers::new(ctx));

        Self {
            config,
            connection_manager,
            handlers,
            upstream_outbound: Mutex::new(Some(upstream_rx)),
            shutdown_sender,
        }
    }

    /// Starts the relay server and runs until shutdown is requested.
    ///
    /// # Startup Sequence
    ///
    /// 1. Spawn the upstream worker
    /// 2. Create TCP listeners (potentially multiple for multi-threading)
    /// 3. Run accept loops until an internal shutdown signal
    ///
    /// # Multi-threading
    ///
    /// If `use_reuse_port` is enabled in configuration, the server creates
    /// one accept loop per CPU core on its own SO_REUSEPORT listener for
    /// improved performance under high load.
    pub async fn start(&self) -> Result<(), ServerError> {
        info!("🚀 Starting relay server on {}", self.config.bind_address);
        info!("🎯 Upstream process at {}", self.config.upstream_address);

        let outbound = {
            let mut guard = self.upstream_outbound.lock().await;
            guard
                .take()
                .ok_or_else(|| ServerError::Internal("Server already started".to_string()))?
        };
        let upstream_address = self.config.upstream_address;
        let upstream_handlers = self.handlers.clone();
        tokio::spawn(async move {
            run_upstream_worker(upstream_address, outbound, upstream_handlers).await;
        });

        let core_count = num_cpus::get();
        let use_reuse_port = self.config.use_reuse_port;
        let num_acceptors = if use_reuse_port { core_count } else { 1 };
        info!(
            "🧠 Detected {} CPU cores, using {} acceptor(s)",
            core_count, num_acceptors
        );

        // Try to create multiple listeners; if any fail, fall back to one.
        let mut listeners = Vec::new();
        let mut multi_listener_error = None;
        for i in 0..num_acceptors {
            match self.build_listener(use_reuse_port) {
                Ok(listener) => {
                    listeners.push(listener);
                    trace!("✅ Listener {} bound on {}", i, self.config.bind_address);
                }
                Err(e) => {
                    multi_listener_error = Some(e);
                    break;
                }
            }
        }
        if let Some(e) = multi_listener_error {
            warn!(
                "Multi-listener creation failed: {}. Falling back to a single listener.",
                e
            );
            listeners.clear();
            listeners.push(self.build_listener(false)?);
            info!("Fallback: single listener bound on {}", self.config.bind_address);
        }

        let mut shutdown_receiver = self.shutdown_sender.subscribe();

        let mut accept_futures = listeners
            .into_iter()
            .map(|listener| {
                let connection_manager = self.connection_manager.clone();
                let handlers = self.handlers.clone();
                let max_connections = self.config.max_connections;

                async move {
                    loop {
                        match listener.accept().await {
                            Ok((stream, addr)) => {
                                if connection_manager.connection_count().await >= max_connections {
                                    warn!("Connection limit reached, rejecting {}", addr);
                                    drop(stream);
                                    continue;
                                }
                                let connection_manager = connection_manager.clone();
                                let handlers = handlers.clone();

                                tokio::spawn(async move {
                                    if let Err(e) = handle_connection(
                                        stream,
                                        addr,
                                        connection_manager,
                                        handlers,
                                    )
                                    .await
                                    {
                                        error!("Connection error: {:?}", e);
                                    }
                                });
                            }
                            Err(e) => {
                                error!("Failed to accept connection: {}", e);
                                break;
                            }
                        }
                    }
                }
            })
            .collect::<FuturesUnordered<_>>();

        tokio::select! {
            _ = accept_futures.next() => {} // Accept loop(s) run until error
            _ = shutdown_receiver.recv() => {
                info!("Internal shutdown signal received");
            }
        }

        info!("🧹 Performing server cleanup...");
        info!("Server stopped");
        Ok(())
    }

    /// Builds one non-blocking TCP listener on the configured bind
    /// address, optionally with SO_REUSEPORT for parallel acceptors.
    fn build_listener(&self, reuse_port: bool) -> Result<tokio::net::TcpListener, ServerError> {
        let addr = self.config.bind_address;
        let socket = Socket::new(Domain::for_address(addr), Type::STREAM, Some(Protocol::TCP))
            .map_err(|e| ServerError::Network(format!("Socket creation failed: {e}")))?;
        socket
            .set_reuse_address(true)
            .map_err(|e| ServerError::Network(format!("SO_REUSEADDR failed: {e}")))?;
        #[cfg(unix)]
        if reuse_port {
            socket
                .set_reuse_port(true)
                .map_err(|e| ServerError::Network(format!("SO_REUSEPORT failed: {e}")))?;
        }
        socket
            .bind(&addr.into())
            .map_err(|e| ServerError::Network(format!("Bind to {addr} failed: {e}")))?;
        socket
            .listen(65535)
            .map_err(|e| ServerError::Network(format!("Listen failed: {e}")))?;
        socket
            .set_nonblocking(true)
            .map_err(|e| ServerError::Network(format!("Nonblocking mode failed: {e}")))?;
        tokio::net::TcpListener::from_std(socket.into())
            .map_err(|e| ServerError::Network(format!("Tokio listener creation failed: {e}")))
    }

    /// Initiates server shutdown, stopping the accept loops.
    pub async fn shutdown(&self) -> Result<(), ServerError> {
        info!("🛑 Shutting down server...");
        let _ = self.shutdown_sender.send(());
        Ok(())
    }

    /// Access to the handler set, for tests and embedding.
    pub fn handlers(&self) -> Arc<EventHandlers> {
        self.handlers.clone()
    }
}
