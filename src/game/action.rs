use super::RoomConfig;
use crate::Funds;
use crate::PlayerUuid;
use std::collections::BTreeSet;

/// A room-scoped game action, already decoded from the wire and tagged
/// with the acting session by the hosting layer.
///
/// Join and leave are not actions: they change who is in the room, so the
/// room actor routes them through [`super::Room::join`] / [`super::Room::leave`]
/// instead of the dispatch path.
#[derive(Clone, Debug)]
pub enum Action {
    Start,
    Roll,
    Buy {
        space: String,
    },
    EndTurn,
    Bankrupt {
        target: PlayerUuid,
    },
    UpdateSettings {
        config: RoomConfig,
    },
    Kick {
        target: PlayerUuid,
    },
    ProposeTrade {
        counterparty: PlayerUuid,
        funds_offered: Funds,
        funds_requested: Funds,
        spaces_offered: BTreeSet<String>,
        spaces_requested: BTreeSet<String>,
    },
    AcceptTrade {
        trade: uuid::Uuid,
    },
    RejectTrade {
        trade: uuid::Uuid,
    },
    RequestState,
    RequestTrades,
    Ack,
}

impl std::fmt::Display for Action {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Start => write!(f, "start"),
            Self::Roll => write!(f, "roll"),
            Self::Buy { space } => write!(f, "buy {}", space),
            Self::EndTurn => write!(f, "end turn"),
            Self::Bankrupt { target } => write!(f, "bankrupt {}", target),
            Self::UpdateSettings { .. } => write!(f, "update settings"),
            Self::Kick { target } => write!(f, "kick {}", target),
            Self::ProposeTrade { counterparty, .. } => write!(f, "trade with {}", counterparty),
            Self::AcceptTrade { trade } => write!(f, "accept trade {}", trade),
            Self::RejectTrade { trade } => write!(f, "reject trade {}", trade),
            Self::RequestState => write!(f, "request state"),
            Self::RequestTrades => write!(f, "request trades"),
            Self::Ack => write!(f, "ack"),
        }
    }
}
