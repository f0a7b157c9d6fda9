use super::Player;
use super::RoomConfig;
use super::Trade;
use crate::Funds;
use crate::PlayerUuid;
use crate::RoomId;
use crate::board::Space;
use serde::Deserialize;
use serde::Serialize;

/// The last dice roll, kept until the turn ends.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct LastRoll {
    pub d1: u8,
    pub d2: u8,
    pub roller: PlayerUuid,
}

/// Full room projection broadcast after every state-changing action,
/// and unicast on explicit re-sync requests.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Snapshot {
    pub room: RoomId,
    pub config: RoomConfig,
    pub players: Vec<Player>,
    pub current: usize,
    pub started: bool,
    pub last_roll: Option<LastRoll>,
    pub spaces: Vec<Space>,
    pub trades: Vec<Trade>,
}

/// Who an event is delivered to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Audience {
    /// Everyone currently attached to the room.
    Room,
    /// Only the session that triggered the action.
    Caller,
}

/// An event plus its delivery scope. Errors never appear here: they go
/// back to the caller through the `Result` side of dispatch.
#[derive(Clone, Debug)]
pub struct Scoped {
    pub audience: Audience,
    pub event: Event,
}

/// Events emitted by the room state machine.
/// The hosting layer encodes these into wire messages and delivers them.
#[derive(Clone, Debug)]
pub enum Event {
    JoinConfirmed,
    PlayerJoined(Player),
    PlayerLeft {
        player: PlayerUuid,
        name: String,
    },
    Waiting {
        waiting: bool,
        current: usize,
        max: usize,
    },
    Started,
    State(Snapshot),
    DiceRolled(LastRoll),
    PropertyAvailable {
        space: String,
        price: Funds,
        player: PlayerUuid,
    },
    PropertyBought {
        space: String,
        player: PlayerUuid,
    },
    TurnChanged {
        next: usize,
    },
    Message(String),
    Bankrupt {
        player: PlayerUuid,
        name: String,
    },
    Kicked {
        player: PlayerUuid,
        name: String,
    },
    TradeCreated {
        trade: Trade,
        proposer: String,
        counterparty: String,
    },
    TradeAccepted {
        trade: uuid::Uuid,
        message: String,
    },
    TradeRejected {
        trade: uuid::Uuid,
        message: String,
    },
    TradesUpdated(Vec<Trade>),
    SettingsUpdated(RoomConfig),
    Ended {
        message: String,
    },
}

impl Event {
    /// Scope this event to everyone in the room.
    pub fn broadcast(self) -> Scoped {
        Scoped {
            audience: Audience::Room,
            event: self,
        }
    }
    /// Scope this event to the acting session only.
    pub fn reply(self) -> Scoped {
        Scoped {
            audience: Audience::Caller,
            event: self,
        }
    }
}

impl std::fmt::Display for Event {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::JoinConfirmed => write!(f, "join confirmed"),
            Self::PlayerJoined(p) => write!(f, "{} joined", p.name),
            Self::PlayerLeft { name, .. } => write!(f, "{} left", name),
            Self::Waiting { current, max, .. } => write!(f, "waiting {}/{}", current, max),
            Self::Started => write!(f, "game started"),
            Self::State(_) => write!(f, "state snapshot"),
            Self::DiceRolled(r) => write!(f, "rolled {}+{}", r.d1, r.d2),
            Self::PropertyAvailable { space, price, .. } => {
                write!(f, "{} available for {}", space, price)
            }
            Self::PropertyBought { space, .. } => write!(f, "{} bought", space),
            Self::TurnChanged { next } => write!(f, "turn -> {}", next),
            Self::Message(s) => write!(f, "{}", s),
            Self::Bankrupt { name, .. } => write!(f, "{} bankrupt", name),
            Self::Kicked { name, .. } => write!(f, "{} kicked", name),
            Self::TradeCreated { trade, .. } => write!(f, "trade {} created", trade.id),
            Self::TradeAccepted { trade, .. } => write!(f, "trade {} accepted", trade),
            Self::TradeRejected { trade, .. } => write!(f, "trade {} rejected", trade),
            Self::TradesUpdated(ts) => write!(f, "{} pending trades", ts.len()),
            Self::SettingsUpdated(_) => write!(f, "settings updated"),
            Self::Ended { message } => write!(f, "{}", message),
        }
    }
}
