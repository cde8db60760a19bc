//! Data model and wire protocol shared between the sync server, the
//! probe client and the integration tests.
//!
//! All wire messages are JSON text frames: an internally tagged enum
//! (`"type"` field) with camelCase payload fields, matching what the
//! browser client expects.

use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

/// Maximum number of concurrently admitted players.
pub const MAX_PLAYERS: usize = 20;
/// Upper bound on the world item population.
pub const MAX_ITEMS: usize = 5000;
/// Default per-connection broadcast interval.
pub const BROADCAST_INTERVAL_MS: u64 = 15;

pub const WORLD_WIDTH: f32 = 800.0;
pub const WORLD_HEIGHT: f32 = 600.0;

/// Connection identity assigned by the gateway at admission; doubles as
/// the player id for the connection's lifetime.
pub type PlayerId = u32;
pub type ItemId = String;

/// 2D world coordinate. Replaced wholesale on update, never mutated in
/// place.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq)]
pub struct Position {
    pub x: f32,
    pub y: f32,
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
pub enum ItemKind {
    Debris,
    Valuable,
}

/// A collectable world object. Items are never removed from the world;
/// collection marks them `cleaned` so re-broadcasts stay idempotent.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Item {
    pub id: ItemId,
    #[serde(rename = "type")]
    pub kind: ItemKind,
    pub position: Position,
    pub cleaned: bool,
}

/// One connected participant. `heading` is in radians.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Player {
    pub id: PlayerId,
    pub position: Position,
    pub heading: f32,
    /// Ids of items this player has collected; grows monotonically
    /// while the connection is open.
    pub collected: HashSet<ItemId>,
}

impl Player {
    pub fn new(id: PlayerId) -> Self {
        Self {
            id,
            position: Position { x: 0.0, y: 0.0 },
            heading: 0.0,
            collected: HashSet::new(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
pub enum ObstacleKind {
    Rock,
    Wreck,
    Crater,
}

/// Static world geometry. Read-only; not part of `ServerUpdate`.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Obstacle {
    #[serde(rename = "type")]
    pub kind: ObstacleKind,
    pub position: Position,
}

/// Messages a client may send. Unknown `"type"` tags fail to parse and
/// are dropped at the gateway.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(tag = "type")]
pub enum ClientMessage {
    PositionUpdate {
        position: Position,
        heading: f32,
    },
    CollectItem {
        #[serde(rename = "itemId")]
        item_id: ItemId,
    },
}

/// Messages the server sends. `ServerUpdate` is the per-tick snapshot,
/// excluding the receiving connection's own player entry.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(tag = "type")]
pub enum ServerMessage {
    ConnectionApprove,
    ConnectionReject {
        reason: String,
    },
    ServerUpdate {
        #[serde(deserialize_with = "deserialize_player_map")]
        players: HashMap<PlayerId, Player>,
        items: HashMap<ItemId, Item>,
    },
}

/// JSON object keys are strings, and the internally tagged enum's
/// buffered deserializer won't convert them back to `u32` on its own,
/// so parse the player-id keys explicitly.
fn deserialize_player_map<'de, D>(deserializer: D) -> Result<HashMap<PlayerId, Player>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let raw = HashMap::<String, Player>::deserialize(deserializer)?;
    raw.into_iter()
        .map(|(key, player)| {
            key.parse::<PlayerId>()
                .map(|id| (id, player))
                .map_err(|_| serde::de::Error::custom(format!("invalid player id key: {}", key)))
        })
        .collect()
}

/// Reject reason sent when the room is at capacity.
pub const REASON_CAPACITY_EXCEEDED: &str = "CapacityExceeded";

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_player_creation() {
        let player = Player::new(7);
        assert_eq!(player.id, 7);
        assert_eq!(player.position, Position { x: 0.0, y: 0.0 });
        assert_eq!(player.heading, 0.0);
        assert!(player.collected.is_empty());
    }

    #[test]
    fn test_position_update_wire_shape() {
        let text = r#"{"type":"PositionUpdate","position":{"x":1.0,"y":2.0},"heading":0.5}"#;
        let msg: ClientMessage = serde_json::from_str(text).unwrap();
        assert_eq!(
            msg,
            ClientMessage::PositionUpdate {
                position: Position { x: 1.0, y: 2.0 },
                heading: 0.5,
            }
        );
    }

    #[test]
    fn test_collect_item_wire_shape() {
        let text = r#"{"type":"CollectItem","itemId":"item-3"}"#;
        let msg: ClientMessage = serde_json::from_str(text).unwrap();
        assert_eq!(
            msg,
            ClientMessage::CollectItem {
                item_id: "item-3".to_string(),
            }
        );
    }

    #[test]
    fn test_unknown_message_type_rejected() {
        let text = r#"{"type":"Teleport","position":{"x":0.0,"y":0.0}}"#;
        assert!(serde_json::from_str::<ClientMessage>(text).is_err());
    }

    #[test]
    fn test_wrong_payload_shape_rejected() {
        let text = r#"{"type":"CollectItem","itemId":42}"#;
        assert!(serde_json::from_str::<ClientMessage>(text).is_err());
    }

    #[test]
    fn test_connection_reject_wire_shape() {
        let msg = ServerMessage::ConnectionReject {
            reason: REASON_CAPACITY_EXCEEDED.to_string(),
        };
        let value = serde_json::to_value(&msg).unwrap();
        assert_eq!(
            value,
            json!({"type": "ConnectionReject", "reason": "CapacityExceeded"})
        );
    }

    #[test]
    fn test_connection_approve_wire_shape() {
        let value = serde_json::to_value(&ServerMessage::ConnectionApprove).unwrap();
        assert_eq!(value, json!({"type": "ConnectionApprove"}));
    }

    #[test]
    fn test_item_serializes_type_tag() {
        let item = Item {
            id: "item-0".to_string(),
            kind: ItemKind::Valuable,
            position: Position { x: 10.0, y: 20.0 },
            cleaned: false,
        };
        let value = serde_json::to_value(&item).unwrap();
        assert_eq!(value["type"], "Valuable");
        assert_eq!(value["cleaned"], false);
    }

    #[test]
    fn test_server_update_keys_are_strings() {
        let mut players = HashMap::new();
        players.insert(3u32, Player::new(3));
        let msg = ServerMessage::ServerUpdate {
            players,
            items: HashMap::new(),
        };
        let value = serde_json::to_value(&msg).unwrap();
        // JSON object keys are strings; the client indexes by id string.
        assert!(value["players"]["3"].is_object());

        let back: ServerMessage = serde_json::from_value(value).unwrap();
        match back {
            ServerMessage::ServerUpdate { players, .. } => {
                assert!(players.contains_key(&3));
            }
            other => panic!("Unexpected message: {:?}", other),
        }
    }
}
