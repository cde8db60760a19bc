//! # Session-sync server
//!
//! Authoritative real-time state synchronization for a single shared
//! game room. The server admits player connections under a capacity
//! bound, ingests per-player state updates, and pushes a consistent
//! snapshot of all players and world items to every connection on its
//! own recurring timer.
//!
//! ## Architecture
//!
//! One tokio task per connection direction (reader, writer, broadcast
//! timer), all sharing two pieces of state:
//!
//! - the [`registry::SessionRegistry`], the single source of truth for
//!   player and item state, split into two independently locked
//!   keyspaces so snapshot reads do not serialize against unrelated
//!   writes;
//! - the [`admission::AdmissionController`], an atomic counter that
//!   gate-keeps new connections against `MAX_PLAYERS`.
//!
//! The [`gateway::ConnectionGateway`] wires the pieces together:
//! admission verdict on accept, player registration, a per-connection
//! [`broadcast`] timer, inbound dispatch through [`ingest`], and
//! ordered teardown through [`reaper`] when the connection closes.
//!
//! Per-connection errors never cross connections: malformed messages
//! are dropped with a warning, send failures tear down only their own
//! connection, and a rejected connection never touches the registry.

pub mod admission;
pub mod broadcast;
pub mod error;
pub mod gateway;
pub mod ingest;
pub mod reaper;
pub mod registry;
pub mod world;
