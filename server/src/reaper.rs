//! Connection teardown.
//!
//! Runs after a connection's read loop ends for any reason, in a fixed
//! order: stop the broadcast timer so no further send races teardown,
//! remove the player record, then free the admission slot. Every step
//! is idempotent against partial state.

use crate::admission::AdmissionController;
use crate::registry::SessionRegistry;
use log::info;
use shared::PlayerId;
use tokio::task::JoinHandle;

pub async fn reap(
    registry: &SessionRegistry,
    admission: &AdmissionController,
    player_id: PlayerId,
    broadcaster: JoinHandle<()>,
) {
    broadcaster.abort();
    registry.remove_player(player_id).await;
    admission.release();
    info!(
        "Connection {} closed ({}/{} players active)",
        player_id,
        admission.active(),
        admission.max_players()
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[tokio::test]
    async fn test_reap_removes_player_and_frees_slot() {
        let registry = SessionRegistry::new();
        let admission = AdmissionController::new(1);

        admission.try_admit().unwrap();
        registry.insert_player(1).await;

        let broadcaster = tokio::spawn(async {
            tokio::time::sleep(std::time::Duration::from_secs(60)).await;
        });
        reap(&registry, &admission, 1, broadcaster).await;

        assert_eq!(registry.player_count().await, 0);
        assert_eq!(admission.active(), 0);
        assert!(admission.try_admit().is_ok());
    }

    #[tokio::test]
    async fn test_reap_tolerates_partial_state() {
        // Admission succeeded but the player record never landed,
        // e.g. the handshake failed mid-setup.
        let registry = SessionRegistry::new();
        let admission = AdmissionController::new(2);
        admission.try_admit().unwrap();

        let broadcaster = tokio::spawn(async {});
        reap(&registry, &admission, 9, broadcaster).await;

        assert_eq!(admission.active(), 0);
        assert_eq!(registry.player_count().await, 0);
    }

    #[tokio::test]
    async fn test_reap_leaves_other_connections_alone() {
        let registry = SessionRegistry::new();
        let admission = AdmissionController::new(5);

        admission.try_admit().unwrap();
        admission.try_admit().unwrap();
        registry.insert_player(1).await;
        registry.insert_player(2).await;

        let broadcaster = tokio::spawn(async {});
        reap(&registry, &admission, 1, broadcaster).await;

        assert_eq!(registry.player_count().await, 1);
        assert!(registry.snapshot(0).await.players.contains_key(&2));
        assert_eq!(admission.active(), 1);
    }

    #[tokio::test]
    async fn test_reap_cancels_broadcaster() {
        let registry = SessionRegistry::new();
        let admission = AdmissionController::new(1);
        admission.try_admit().unwrap();

        let ticks = Arc::new(std::sync::atomic::AtomicUsize::new(0));
        let counter = Arc::clone(&ticks);
        let broadcaster = tokio::spawn(async move {
            loop {
                counter.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
                tokio::time::sleep(std::time::Duration::from_millis(5)).await;
            }
        });

        reap(&registry, &admission, 1, broadcaster).await;
        tokio::time::sleep(std::time::Duration::from_millis(30)).await;

        let after_reap = ticks.load(std::sync::atomic::Ordering::SeqCst);
        tokio::time::sleep(std::time::Duration::from_millis(30)).await;
        assert_eq!(ticks.load(std::sync::atomic::Ordering::SeqCst), after_reap);
    }
}
