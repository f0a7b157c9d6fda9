use crate::Funds;
use crate::PlayerUuid;
use crate::Position;
use serde::Deserialize;
use serde::Serialize;

/// What happens when a player lands on a space.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpaceKind {
    /// City lot, purchasable, charges rent.
    Property,
    Airport,
    Utility,
    /// Debits a fixed amount into the vacation pool.
    Tax,
    Surprise,
    Treasure,
    GoToJail,
    /// Pays out whatever the tax pool accumulated.
    Vacation,
    Start,
    /// Plain corner (the jail yard, for visitors).
    Corner,
}

impl SpaceKind {
    /// Whether this space can be bought and charge rent.
    pub fn purchasable(&self) -> bool {
        matches!(self, Self::Property | Self::Airport | Self::Utility)
    }
}

/// One of the 40 fixed positions on the track.
/// Immutable except `owner` and, for the vacation space, `pool`.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Space {
    pub id: String,
    pub name: String,
    pub kind: SpaceKind,
    pub position: Position,
    pub price: Option<Funds>,
    pub rent: Option<Funds>,
    pub owner: Option<PlayerUuid>,
    pub pool: Funds,
}

impl Space {
    pub fn new(
        id: &str,
        name: &str,
        kind: SpaceKind,
        position: Position,
        price: Option<Funds>,
        rent: Option<Funds>,
    ) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            kind,
            position,
            price,
            rent,
            owner: None,
            pool: 0,
        }
    }
    /// Purchase price, for spaces that have one.
    pub fn price(&self) -> Funds {
        self.price.unwrap_or(0)
    }
    /// Rent charged to visitors, for spaces that have one.
    pub fn rent(&self) -> Funds {
        self.rent.unwrap_or(0)
    }
}

impl std::fmt::Display for Space {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} (#{})", self.name, self.position)
    }
}
