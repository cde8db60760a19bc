//! Admission control for new connections.
//!
//! A single shared counter of currently-admitted players, bounded by
//! the configured maximum. The counter is only ever touched through
//! `try_admit` and `release`; the disconnect path calls `release`
//! exactly once per admitted connection.

use crate::error::GameError;
use std::sync::atomic::{AtomicUsize, Ordering};

pub struct AdmissionController {
    active: AtomicUsize,
    max_players: usize,
}

impl AdmissionController {
    pub fn new(max_players: usize) -> Self {
        Self {
            active: AtomicUsize::new(0),
            max_players,
        }
    }

    /// Admits one connection if there is room, atomically incrementing
    /// the active count. Rejection leaves the count untouched.
    pub fn try_admit(&self) -> Result<(), GameError> {
        self.active
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |active| {
                if active < self.max_players {
                    Some(active + 1)
                } else {
                    None
                }
            })
            .map(|_| ())
            .map_err(|_| GameError::CapacityExceeded)
    }

    /// Frees one admission slot. Saturates at zero so teardown of a
    /// partially admitted connection cannot underflow the count.
    pub fn release(&self) {
        let _ = self
            .active
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |active| {
                active.checked_sub(1)
            });
    }

    pub fn active(&self) -> usize {
        self.active.load(Ordering::Acquire)
    }

    pub fn max_players(&self) -> usize {
        self.max_players
    }
}
