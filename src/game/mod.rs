//! Room state machine and everything it owns.
//!
//! The aggregate root is [`Room`]: it validates every inbound [`Action`]
//! against turn order and ownership preconditions, mutates state, and
//! returns the [`Event`]s to deliver. All I/O lives in [`crate::hosting`];
//! everything here is synchronous against in-memory state, which is what
//! makes the turn/dice/trade logic unit-testable without a transport.

mod action;
mod config;
mod dice;
mod error;
mod event;
mod player;
mod room;
mod trade;

pub use action::*;
pub use config::*;
pub use dice::*;
pub use error::*;
pub use event::*;
pub use player::*;
pub use room::*;
pub use trade::*;
