/// Everything that can go wrong with an inbound action.
///
/// All variants are recovered at the action boundary: validation happens
/// before any mutation, so a failed action leaves room state untouched and
/// is reported to the initiating caller only, never broadcast.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GameError {
    RoomNotFound,
    RoomExists,
    PlayerNotFound,
    SpaceNotFound,
    TradeNotFound,
    GameAlreadyStarted,
    GameNotStarted,
    RoomFull,
    NotEnoughPlayers,
    NotYourTurn,
    AlreadyRolled,
    MustRollFirst,
    NotAvailable,
    InsufficientFunds(String),
    NotLeader,
    NotAuthorized(String),
    InvalidSettings(String),
    TradeClosed,
}

impl std::fmt::Display for GameError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::RoomNotFound => write!(f, "Room not found"),
            Self::RoomExists => write!(f, "Room already exists"),
            Self::PlayerNotFound => write!(f, "Player not found"),
            Self::SpaceNotFound => write!(f, "Space not found"),
            Self::TradeNotFound => write!(f, "Trade not found"),
            Self::GameAlreadyStarted => write!(f, "Game has already started"),
            Self::GameNotStarted => write!(f, "Game has not started yet"),
            Self::RoomFull => write!(f, "Room is full"),
            Self::NotEnoughPlayers => write!(f, "Need at least 2 players to start"),
            Self::NotYourTurn => write!(f, "It is not your turn"),
            Self::AlreadyRolled => write!(f, "You have already rolled this turn"),
            Self::MustRollFirst => write!(f, "You must roll before ending turn"),
            Self::NotAvailable => write!(f, "Property not available for purchase"),
            Self::InsufficientFunds(s) => write!(f, "{}", s),
            Self::NotLeader => write!(f, "Only the room leader can do that"),
            Self::NotAuthorized(s) => write!(f, "{}", s),
            Self::InvalidSettings(s) => write!(f, "{}", s),
            Self::TradeClosed => write!(f, "Trade is no longer pending"),
        }
    }
}

impl std::error::Error for GameError {}
