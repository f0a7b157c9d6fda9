use super::Space;
use super::SpaceKind;
use crate::BOARD_LENGTH;
use crate::Funds;
use crate::PlayerUuid;
use crate::Position;
use crate::VACATION_POSITION;

/// The fixed circular track. Owns the only mutable board state:
/// space ownership and the vacation pool.
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct Board {
    spaces: Vec<Space>,
}

impl Board {
    /// The standard world-cities layout.
    ///
    /// Corners at 0/10/20/30 (Start, Jail, Vacation, Go To Jail), airports
    /// on the 5s, utilities at 12 and 28, taxes at 4 and 38, three surprise
    /// and three treasure spaces, cities everywhere else.
    pub fn standard() -> Self {
        use SpaceKind::*;
        let city = |id, name, pos, price: Funds| {
            Space::new(id, name, Property, pos, Some(price), Some(price / 10))
        };
        let spaces = vec![
            Space::new("start", "Start", Start, 0, None, None),
            city("salvador", "Salvador", 1, 60),
            Space::new("treasure1", "Treasure", Treasure, 2, None, None),
            city("rio", "Rio de Janeiro", 3, 60),
            Space::new("tax1", "Income Tax", Tax, 4, Some(200), None),
            Space::new("airport1", "Tel Aviv Airport", Airport, 5, Some(200), Some(25)),
            city("telaviv", "Tel Aviv", 6, 100),
            city("haifa", "Haifa", 7, 160),
            Space::new("surprise1", "Surprise", Surprise, 8, None, None),
            city("jerusalem", "Jerusalem", 9, 120),
            Space::new("jail", "Jail", Corner, 10, None, None),
            city("venice", "Venice", 11, 140),
            Space::new("utility1", "Electric Company", Utility, 12, Some(150), Some(15)),
            city("milan", "Milan", 13, 140),
            city("florence", "Florence", 14, 160),
            Space::new("airport2", "Munich Airport", Airport, 15, Some(200), Some(25)),
            city("madrid", "Madrid", 16, 180),
            Space::new("treasure2", "Treasure", Treasure, 17, None, None),
            city("newyork", "New York", 18, 220),
            city("barcelona", "Barcelona", 19, 200),
            Space::new("vacation", "Vacation", Vacation, 20, None, None),
            city("london", "London", 21, 220),
            Space::new("surprise2", "Surprise", Surprise, 22, None, None),
            city("sydney", "Sydney", 23, 240),
            city("rome", "Rome", 24, 260),
            Space::new("airport3", "Paris Airport", Airport, 25, Some(200), Some(25)),
            city("beijing", "Beijing", 26, 260),
            city("shanghai", "Shanghai", 27, 280),
            Space::new("utility2", "Water Company", Utility, 28, Some(150), Some(15)),
            city("tokyo", "Tokyo", 29, 300),
            Space::new("gotojail", "Go To Jail", GoToJail, 30, None, None),
            city("bangkok", "Bangkok", 31, 300),
            Space::new("treasure3", "Treasure", Treasure, 32, None, None),
            city("mumbai", "Mumbai", 33, 320),
            Space::new("surprise3", "Surprise", Surprise, 34, None, None),
            Space::new("airport4", "New York Airport", Airport, 35, Some(200), Some(25)),
            city("cairo", "Cairo", 36, 350),
            city("paris", "Paris", 37, 360),
            Space::new("tax2", "Luxury Tax", Tax, 38, Some(100), None),
            city("sanfrancisco", "San Francisco", 39, 400),
        ];
        debug_assert_eq!(spaces.len(), BOARD_LENGTH);
        Self { spaces }
    }
    /// Track length. Always [`BOARD_LENGTH`] for the standard layout.
    pub fn len(&self) -> usize {
        self.spaces.len()
    }
    pub fn is_empty(&self) -> bool {
        self.spaces.is_empty()
    }
    pub fn spaces(&self) -> &[Space] {
        &self.spaces
    }
    pub fn at(&self, position: Position) -> &Space {
        &self.spaces[position % self.spaces.len()]
    }
    pub fn at_mut(&mut self, position: Position) -> &mut Space {
        let n = self.spaces.len();
        &mut self.spaces[position % n]
    }
    pub fn by_id(&self, id: &str) -> Option<&Space> {
        self.spaces.iter().find(|s| s.id == id)
    }
    pub fn by_id_mut(&mut self, id: &str) -> Option<&mut Space> {
        self.spaces.iter_mut().find(|s| s.id == id)
    }
    /// The vacation corner, where tax revenue pools up.
    pub fn vacation_mut(&mut self) -> &mut Space {
        self.at_mut(VACATION_POSITION)
    }
    /// Release every space owned by the given player back to the bank.
    pub fn release(&mut self, owner: PlayerUuid) {
        self.spaces
            .iter_mut()
            .filter(|s| s.owner == Some(owner))
            .for_each(|s| s.owner = None);
    }
}

impl Default for Board {
    fn default() -> Self {
        Self::standard()
    }
}
