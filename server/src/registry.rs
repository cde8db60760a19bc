//! The authoritative session registry.
//!
//! Two independent keyspaces (players, items) behind separate
//! read-write locks, so snapshot reads for one connection do not
//! serialize against unrelated writes. No operation holds both locks
//! at once; a snapshot is a point-in-time copy per keyspace.

use crate::error::GameError;
use log::{info, warn};
use shared::{Item, ItemId, Player, PlayerId, Position, MAX_ITEMS};
use std::collections::HashMap;
use tokio::sync::RwLock;

/// An immutable, point-in-time copy of registry state handed to one
/// connection for one broadcast tick. Detached from internal storage;
/// concurrent mutation cannot affect it.
#[derive(Debug, Clone)]
pub struct Snapshot {
    pub players: HashMap<PlayerId, Player>,
    pub items: HashMap<ItemId, Item>,
}

pub struct SessionRegistry {
    players: RwLock<HashMap<PlayerId, Player>>,
    items: RwLock<HashMap<ItemId, Item>>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self {
            players: RwLock::new(HashMap::new()),
            items: RwLock::new(HashMap::new()),
        }
    }

    /// Creates the player record at admission, spawned at the default
    /// position. Must run before any update for this connection is
    /// processed.
    pub async fn insert_player(&self, id: PlayerId) {
        let mut players = self.players.write().await;
        players.insert(id, Player::new(id));
        info!("Registered player {}", id);
    }

    /// Full replace of a player's pose. Fails for a connection that
    /// was never admitted or has already been removed.
    pub async fn upsert_player(
        &self,
        id: PlayerId,
        position: Position,
        heading: f32,
    ) -> Result<(), GameError> {
        let mut players = self.players.write().await;
        match players.get_mut(&id) {
            Some(player) => {
                player.position = position;
                player.heading = heading;
                Ok(())
            }
            None => Err(GameError::UnknownPlayer(id)),
        }
    }

    /// Idempotent removal; an absent id is a no-op.
    pub async fn remove_player(&self, id: PlayerId) {
        let mut players = self.players.write().await;
        if players.remove(&id).is_some() {
            info!("Removed player {}", id);
        }
    }

    /// Marks an item cleaned and credits it to the acting player.
    ///
    /// Returns `Ok(true)` on the first successful collection and
    /// `Ok(false)` if the item was already cleaned; duplicate client
    /// messages are expected and tolerated. The cleaned flag never
    /// reverts.
    pub async fn mark_item_cleaned(
        &self,
        item_id: &str,
        by: PlayerId,
    ) -> Result<bool, GameError> {
        {
            let mut items = self.items.write().await;
            let item = items
                .get_mut(item_id)
                .ok_or_else(|| GameError::UnknownItem(item_id.to_string()))?;
            if item.cleaned {
                return Ok(false);
            }
            item.cleaned = true;
        }

        let mut players = self.players.write().await;
        if let Some(player) = players.get_mut(&by) {
            player.collected.insert(item_id.to_string());
        }
        Ok(true)
    }

    /// Seeds the item keyspace at session start, capped at `MAX_ITEMS`.
    pub async fn populate(&self, new_items: Vec<Item>) {
        let mut items = self.items.write().await;
        for item in new_items {
            if items.len() >= MAX_ITEMS {
                warn!("Item population capped at {}", MAX_ITEMS);
                break;
            }
            items.insert(item.id.clone(), item);
        }
    }

    /// Copies out all state except the named player's own record.
    pub async fn snapshot(&self, excluding: PlayerId) -> Snapshot {
        let players = {
            let players = self.players.read().await;
            players
                .iter()
                .filter(|(id, _)| **id != excluding)
                .map(|(id, player)| (*id, player.clone()))
                .collect()
        };
        let items = self.items.read().await.clone();
        Snapshot { players, items }
    }

    pub async fn player_count(&self) -> usize {
        self.players.read().await.len()
    }

    pub async fn item_count(&self) -> usize {
        self.items.read().await.len()
    }
}

impl Default for SessionRegistry {
    fn default() -> Self {
        Self::new()
    }
}
