//! Per-connection broadcast scheduling.
//!
//! Every admitted connection gets its own recurring timer task that
//! snapshots the registry (excluding the receiving player) and queues
//! a `ServerUpdate` frame. Connections never share a timer, so a slow
//! client only ever costs itself frames.

use crate::registry::SessionRegistry;
use log::{debug, error};
use shared::{PlayerId, ServerMessage};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_tungstenite::tungstenite::Message;

/// Spawns the recurring snapshot timer for one connection.
///
/// The returned handle is held by the gateway and aborted by the
/// disconnect reaper; a tick racing the abort is harmless because the
/// outbound queue is closed first. `try_send` keeps the timer from
/// ever blocking on a backpressured client: a full queue drops that
/// tick's frame, a closed queue ends the task.
pub fn spawn_broadcaster(
    registry: Arc<SessionRegistry>,
    player_id: PlayerId,
    outbound: mpsc::Sender<Message>,
    interval: Duration,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            ticker.tick().await;

            let snapshot = registry.snapshot(player_id).await;
            let update = ServerMessage::ServerUpdate {
                players: snapshot.players,
                items: snapshot.items,
            };

            let text = match serde_json::to_string(&update) {
                Ok(text) => text,
                Err(e) => {
                    error!("Failed to serialize update for {}: {}", player_id, e);
                    continue;
                }
            };

            match outbound.try_send(Message::Text(text)) {
                Ok(()) => {}
                Err(TrySendError::Full(_)) => {
                    debug!("Connection {} is behind, dropping a frame", player_id);
                }
                Err(TrySendError::Closed(_)) => break,
            }
        }
    })
}
