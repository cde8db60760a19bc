use shared::{ItemId, PlayerId};
use thiserror::Error;

/// Errors raised by the synchronization core.
///
/// None of these are fatal to the server: `CapacityExceeded` surfaces
/// as a reject message to the client, the other two mean the offending
/// message is dropped and logged.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum GameError {
    #[error("server is at capacity")]
    CapacityExceeded,
    #[error("no player registered for connection {0}")]
    UnknownPlayer(PlayerId),
    #[error("unknown item id '{0}'")]
    UnknownItem(ItemId),
}
