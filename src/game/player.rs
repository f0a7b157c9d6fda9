use crate::Funds;
use crate::PlayerUuid;
use crate::Position;
use crate::SessionId;
use serde::Deserialize;
use serde::Serialize;
use std::collections::BTreeSet;

/// Per-participant mutable record.
///
/// `uuid` is the durable key all game logic is keyed on; `session` is a
/// transport routing address rebound on every successful reconnect.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Player {
    pub session: SessionId,
    pub uuid: PlayerUuid,
    pub name: String,
    pub color: String,
    pub is_leader: bool,
    pub position: Position,
    pub funds: Funds,
    pub holdings: BTreeSet<String>,
    pub in_jail: bool,
    pub jail_attempts: u8,
    pub has_rolled: bool,
    pub bankrupt: bool,
}

impl Player {
    pub fn new(
        session: SessionId,
        uuid: PlayerUuid,
        name: &str,
        color: &str,
        is_leader: bool,
        funds: Funds,
    ) -> Self {
        Self {
            session,
            uuid,
            name: name.to_string(),
            color: color.to_string(),
            is_leader,
            position: 0,
            funds,
            holdings: BTreeSet::new(),
            in_jail: false,
            jail_attempts: 0,
            has_rolled: false,
            bankrupt: false,
        }
    }
    /// Zero out funds and holdings and leave the active rotation.
    /// Board-side ownership release happens in [`crate::board::Board::release`].
    pub fn go_bankrupt(&mut self) {
        self.funds = 0;
        self.holdings.clear();
        self.bankrupt = true;
    }
}

impl std::fmt::Display for Player {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name)
    }
}
