use crate::Funds;
use crate::PlayerUuid;
use serde::Deserialize;
use serde::Serialize;
use std::collections::BTreeSet;

/// Lifecycle of a bilateral exchange. Terminal states are removed from
/// the room's pending set immediately.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TradeStatus {
    Pending,
    Accepted,
    Rejected,
}

/// A proposed exchange of funds and/or owned spaces between two players.
/// Immutable once status leaves Pending.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Trade {
    pub id: uuid::Uuid,
    pub proposer: PlayerUuid,
    pub counterparty: PlayerUuid,
    pub funds_offered: Funds,
    pub funds_requested: Funds,
    pub spaces_offered: BTreeSet<String>,
    pub spaces_requested: BTreeSet<String>,
    pub status: TradeStatus,
    pub created_at: u64,
}

impl Trade {
    pub fn new(
        proposer: PlayerUuid,
        counterparty: PlayerUuid,
        funds_offered: Funds,
        funds_requested: Funds,
        spaces_offered: BTreeSet<String>,
        spaces_requested: BTreeSet<String>,
    ) -> Self {
        Self {
            id: uuid::Uuid::new_v4(),
            proposer,
            counterparty,
            funds_offered,
            funds_requested,
            spaces_offered,
            spaces_requested,
            status: TradeStatus::Pending,
            created_at: std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .map(|d| d.as_secs())
                .unwrap_or(0),
        }
    }
    /// Whether the given player is one of the two parties.
    pub fn involves(&self, uuid: PlayerUuid) -> bool {
        self.proposer == uuid || self.counterparty == uuid
    }
}
