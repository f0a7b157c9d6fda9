use rand::Rng;
use rand::SeedableRng;
use rand::rngs::SmallRng;
use std::collections::VecDeque;

/// Source of randomness for dice rolls and card draws.
///
/// Injected into [`super::Room`] so tests (and replays) can script
/// outcomes deterministically while production rooms use seeded entropy.
pub trait Dice: Send {
    /// Two independent uniform d6.
    fn roll(&mut self) -> (u8, u8);
    /// Uniform index into a deck of the given size.
    fn pick(&mut self, len: usize) -> usize;
}

/// Production dice backed by a small fast RNG.
#[derive(Debug)]
pub struct Entropy {
    rng: SmallRng,
}

impl Entropy {
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: SmallRng::seed_from_u64(seed),
        }
    }
}

impl Default for Entropy {
    fn default() -> Self {
        Self {
            rng: SmallRng::from_os_rng(),
        }
    }
}

impl Dice for Entropy {
    fn roll(&mut self) -> (u8, u8) {
        (
            self.rng.random_range(1..=6),
            self.rng.random_range(1..=6),
        )
    }
    fn pick(&mut self, len: usize) -> usize {
        self.rng.random_range(0..len)
    }
}

/// Scripted dice: pops queued rolls and draws in order.
/// Falls back to flat values once the scripts run dry.
#[derive(Debug, Default)]
pub struct Scripted {
    rolls: VecDeque<(u8, u8)>,
    picks: VecDeque<usize>,
}

impl Scripted {
    pub fn rolls(rolls: &[(u8, u8)]) -> Self {
        Self {
            rolls: rolls.iter().copied().collect(),
            picks: VecDeque::new(),
        }
    }
    pub fn with_picks(mut self, picks: &[usize]) -> Self {
        self.picks = picks.iter().copied().collect();
        self
    }
}

impl Dice for Scripted {
    fn roll(&mut self) -> (u8, u8) {
        self.rolls.pop_front().unwrap_or((1, 2))
    }
    fn pick(&mut self, len: usize) -> usize {
        self.picks.pop_front().unwrap_or(0) % len
    }
}
