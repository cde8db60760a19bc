//! WebSocket connection gateway.
//!
//! Owns the lifecycle of every connection: accept, admission verdict,
//! player registration, broadcast scheduling, inbound dispatch and
//! teardown. Each connection runs in its own task; a failure in one
//! handler is logged and never propagates to other connections.

use crate::admission::AdmissionController;
use crate::registry::SessionRegistry;
use crate::{broadcast, ingest, reaper};
use futures_util::{SinkExt, StreamExt};
use log::{debug, error, info, warn};
use shared::{ServerMessage, REASON_CAPACITY_EXCEEDED};
use std::net::SocketAddr;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::mpsc;
use tokio_tungstenite::accept_async;
use tokio_tungstenite::tungstenite::Message;

/// Frames a connection may have queued before the broadcaster starts
/// dropping; sized for a few ticks of slack.
const OUTBOUND_QUEUE: usize = 16;

pub struct GatewayConfig {
    pub broadcast_interval: Duration,
}

pub struct ConnectionGateway {
    registry: Arc<SessionRegistry>,
    admission: Arc<AdmissionController>,
    config: GatewayConfig,
    next_connection_id: AtomicU32,
}

impl ConnectionGateway {
    pub fn new(
        registry: Arc<SessionRegistry>,
        admission: Arc<AdmissionController>,
        config: GatewayConfig,
    ) -> Self {
        Self {
            registry,
            admission,
            config,
            next_connection_id: AtomicU32::new(1),
        }
    }

    /// Accept loop. Runs until the listener fails unrecoverably.
    pub async fn run(self: Arc<Self>, listener: TcpListener) {
        loop {
            match listener.accept().await {
                Ok((stream, addr)) => {
                    let gateway = Arc::clone(&self);
                    tokio::spawn(async move {
                        if let Err(e) = gateway.handle_connection(stream, addr).await {
                            warn!("Connection from {} ended with error: {}", addr, e);
                        }
                    });
                }
                Err(e) => {
                    error!("Failed to accept connection: {}", e);
                    tokio::time::sleep(Duration::from_millis(10)).await;
                }
            }
        }
    }

    async fn handle_connection(
        &self,
        stream: TcpStream,
        addr: SocketAddr,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        let ws = accept_async(stream).await?;
        let (mut sink, mut inbound) = ws.split();

        if self.admission.try_admit().is_err() {
            warn!("Rejecting connection from {}: server at capacity", addr);
            let reject = serde_json::to_string(&ServerMessage::ConnectionReject {
                reason: REASON_CAPACITY_EXCEEDED.to_string(),
            })?;
            // Best effort; the client may already be gone.
            let _ = sink.send(Message::Text(reject)).await;
            let _ = sink.close().await;
            return Ok(());
        }

        let connection_id = self.next_connection_id.fetch_add(1, Ordering::Relaxed);
        self.registry.insert_player(connection_id).await;
        info!(
            "Connection {} admitted from {} ({}/{} players active)",
            connection_id,
            addr,
            self.admission.active(),
            self.admission.max_players()
        );

        let approve = serde_json::to_string(&ServerMessage::ConnectionApprove)?;
        if let Err(e) = sink.send(Message::Text(approve)).await {
            // Admission was counted and the record created; unwind both.
            self.registry.remove_player(connection_id).await;
            self.admission.release();
            return Err(e.into());
        }

        // Writer task: drains the bounded outbound queue into the
        // socket. A send failure means the transport is gone, which
        // closes the queue and lets the broadcaster wind down.
        let (outbound_tx, mut outbound_rx) = mpsc::channel::<Message>(OUTBOUND_QUEUE);
        let writer = tokio::spawn(async move {
            while let Some(frame) = outbound_rx.recv().await {
                if let Err(e) = sink.send(frame).await {
                    debug!("Send failed, treating as disconnect: {}", e);
                    break;
                }
            }
        });

        let broadcaster = broadcast::spawn_broadcaster(
            Arc::clone(&self.registry),
            connection_id,
            outbound_tx.clone(),
            self.config.broadcast_interval,
        );

        while let Some(frame) = inbound.next().await {
            match frame {
                Ok(Message::Text(text)) => {
                    if let Some(message) = ingest::parse_client_message(&text) {
                        ingest::apply_update(&self.registry, connection_id, message).await;
                    }
                }
                Ok(Message::Close(_)) => {
                    debug!("Connection {} requested close", connection_id);
                    break;
                }
                Ok(Message::Ping(_)) | Ok(Message::Pong(_)) => {}
                Ok(other) => {
                    debug!(
                        "Ignoring non-text frame from connection {}: {:?}",
                        connection_id, other
                    );
                }
                Err(e) => {
                    debug!("Connection {} transport error: {}", connection_id, e);
                    break;
                }
            }
        }

        // Close our send endpoint before the reaper aborts the timer,
        // so a tick racing the abort hits a closed queue.
        drop(outbound_tx);
        reaper::reap(&self.registry, &self.admission, connection_id, broadcaster).await;
        writer.abort();
        Ok(())
    }
}
