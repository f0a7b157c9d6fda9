use super::GameError;
use crate::Funds;
use serde::Deserialize;
use serde::Serialize;

/// Leader-adjustable room settings, carried in-band by `create_room`
/// and `update_settings`.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct RoomConfig {
    pub max_players: usize,
    pub starting_funds: Funds,
    pub pool_entry: Funds,
}

impl RoomConfig {
    pub const MIN_PLAYERS: usize = 2;
    pub const MAX_PLAYERS: usize = 8;

    /// Reject out-of-range settings before they touch room state.
    pub fn validate(&self) -> Result<(), GameError> {
        if self.max_players < Self::MIN_PLAYERS || self.max_players > Self::MAX_PLAYERS {
            return Err(GameError::InvalidSettings(format!(
                "maxPlayers must be between {} and {}",
                Self::MIN_PLAYERS,
                Self::MAX_PLAYERS
            )));
        }
        if self.starting_funds < 0 {
            return Err(GameError::InvalidSettings(
                "startingAmount must be positive".to_string(),
            ));
        }
        if self.pool_entry < 0 {
            return Err(GameError::InvalidSettings(
                "pool entry must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for RoomConfig {
    fn default() -> Self {
        Self {
            max_players: 4,
            starting_funds: 1500,
            pool_entry: 0,
        }
    }
}
