//! Validation and application of inbound client messages.
//!
//! A connection may only ever mutate its own player record: the id
//! applied here is the authenticated connection identity supplied by
//! the gateway, never anything taken from the payload. Bad input is
//! dropped with a warning; nothing on this path is fatal to the
//! connection.

use crate::registry::SessionRegistry;
use log::{debug, warn};
use shared::{ClientMessage, PlayerId};

/// Parses one raw text frame into a tagged client message. Unknown
/// message types and shape mismatches are logged and dropped.
pub fn parse_client_message(text: &str) -> Option<ClientMessage> {
    match serde_json::from_str(text) {
        Ok(message) => Some(message),
        Err(e) => {
            warn!("Dropping malformed client message: {}", e);
            None
        }
    }
}

/// Applies one validated message to the registry on behalf of the
/// given connection.
pub async fn apply_update(registry: &SessionRegistry, player_id: PlayerId, message: ClientMessage) {
    match message {
        ClientMessage::PositionUpdate { position, heading } => {
            if let Err(e) = registry.upsert_player(player_id, position, heading).await {
                warn!(
                    "Dropping position update from connection {}: {}",
                    player_id, e
                );
            }
        }
        ClientMessage::CollectItem { item_id } => {
            match registry.mark_item_cleaned(&item_id, player_id).await {
                Ok(true) => debug!("Player {} collected item {}", player_id, item_id),
                Ok(false) => debug!(
                    "Player {} re-collected already cleaned item {}",
                    player_id, item_id
                ),
                Err(e) => warn!(
                    "Dropping collect from connection {}: {}",
                    player_id, e
                ),
            }
        }
    }
}
