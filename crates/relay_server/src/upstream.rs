//! Worker owning the TCP link to the authoritative game-logic process.
//!
//! One connection, newline-framed JSON in both directions. Outbound
//! messages are queued on an unbounded channel so handlers never block on
//! upstream I/O; inbound lines are decoded and dispatched through the same
//! handler set as client events. Connection loss triggers reconnection
//! with exponential backoff; the retry budget resets after every
//! successful connection.

use crate::handlers::EventHandlers;
use crate::messaging::decode_message;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio::time::{sleep, Duration};
use tracing::{error, info, warn};

/// Base delay between reconnection attempts; doubles per retry.
const RETRY_TIMEOUT: Duration = Duration::from_secs(2);

/// Consecutive failed attempts tolerated before giving up.
const MAX_RETRY_COUNT: u32 = 5;

/// Runs the upstream link until the outbound queue closes or the retry
/// budget is exhausted.
pub async fn run_upstream_worker(
    address: SocketAddr,
    mut outbound: mpsc::UnboundedReceiver<String>,
    handlers: Arc<EventHandlers>,
) {
    let mut retry_count: u32 = 0;

    loop {
        let stream = match TcpStream::connect(address).await {
            Ok(stream) => {
                info!("🔌 Connected to upstream process at {}", address);
                retry_count = 0;
                stream
            }
            Err(e) => {
                retry_count += 1;
                if retry_count > MAX_RETRY_COUNT {
                    error!(
                        "Giving up on upstream {} after {} attempts: {}",
                        address, MAX_RETRY_COUNT, e
                    );
                    return;
                }
                let delay = RETRY_TIMEOUT * (1 << (retry_count - 1));
                warn!(
                    "Upstream connect to {} failed ({}), retry {}/{} in {:?}",
                    address, e, retry_count, MAX_RETRY_COUNT, delay
                );
                sleep(delay).await;
                continue;
            }
        };

        let (read_half, mut write_half) = stream.into_split();
        let mut lines = BufReader::new(read_half).lines();

        loop {
            tokio::select! {
                queued = outbound.recv() => {
                    let Some(mut message) = queued else {
                        info!("Upstream queue closed, stopping worker");
                        return;
                    };
                    message.push('\n');
                    if let Err(e) = write_half.write_all(message.as_bytes()).await {
                        // Message is lost; sends are fire-and-forget.
                        error!("Upstream write failed: {}", e);
                        break;
                    }
                }
                line = lines.next_line() => {
                    match line {
                        Ok(Some(line)) => {
                            if line.trim().is_empty() {
                                continue;
                            }
                            match decode_message(&line, None) {
                                Ok(event) => handlers.dispatch(event).await,
                                Err(e) => warn!("Dropping undecodable upstream message: {}", e),
                            }
                        }
                        Ok(None) => {
                            warn!("Upstream closed the connection");
                            break;
                        }
                        Err(e) => {
                            error!("Upstream read failed: {}", e);
                            break;
                        }
                    }
                }
            }
        }

        warn!("Upstream link lost, reconnecting");
    }
}
