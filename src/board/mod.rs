//! Static board content: the 40-space circular track and the two card decks.
//!
//! Everything here is read-only game data except space ownership and the
//! vacation pool, which the room state machine mutates through [`Board`].

mod card;
mod layout;
mod space;

pub use card::*;
pub use layout::*;
pub use space::*;
