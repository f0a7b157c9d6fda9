//! Transport boundary: WebSocket server, per-room actors, and the
//! registry reconciling connections to rooms.
//!
//! Rooms never see sockets. Each lives behind an actor task that
//! serializes its envelopes, and the bridge in [`server`] shuttles JSON
//! frames between a connection and its bound room.

mod actor;
mod protocol;
mod registry;
mod server;

pub use actor::*;
pub use protocol::*;
pub use registry::*;
pub use server::*;
