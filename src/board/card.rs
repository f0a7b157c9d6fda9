use crate::BOARD_LENGTH;
use crate::Funds;
use crate::JAIL_POSITION;
use crate::PASS_START_BONUS;
use crate::Position;
use crate::game::Player;

/// Effect of a drawn card on the drawing player.
/// Cards mutate position and funds only; the landed space is never
/// re-resolved after a jump.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CardEffect {
    /// Move to Start and collect the passing bonus.
    AdvanceToStart,
    GoToJail,
    GoBack(Position),
    MoveTo(Position),
    Credit(Funds),
    Debit(Funds),
    /// "Get out of Jail Free" - held tokens are not modeled yet.
    Nothing,
}

/// One entry of a chance deck: narrative text plus its literal effect.
#[derive(Clone, Copy, Debug)]
pub struct Card {
    pub text: &'static str,
    pub effect: CardEffect,
}

impl Card {
    const fn new(text: &'static str, effect: CardEffect) -> Self {
        Self { text, effect }
    }
    /// Apply this card to the drawing player.
    pub fn apply(&self, player: &mut Player) {
        match self.effect {
            CardEffect::AdvanceToStart => {
                player.position = 0;
                player.funds += PASS_START_BONUS;
            }
            CardEffect::GoToJail => {
                player.position = JAIL_POSITION;
                player.in_jail = true;
                player.jail_attempts = 0;
            }
            CardEffect::GoBack(n) => {
                player.position = (player.position + BOARD_LENGTH - n) % BOARD_LENGTH;
            }
            CardEffect::MoveTo(position) => player.position = position % BOARD_LENGTH,
            CardEffect::Credit(amount) => player.funds += amount,
            CardEffect::Debit(amount) => player.funds -= amount,
            CardEffect::Nothing => {}
        }
    }
}

impl std::fmt::Display for Card {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.text)
    }
}

/// The surprise deck. Drawn uniformly with replacement.
pub fn surprise_deck() -> &'static [Card] {
    use CardEffect::*;
    const DECK: &[Card] = &[
        Card::new("Advance to Start (Collect $200)", AdvanceToStart),
        Card::new("Go to Jail", GoToJail),
        Card::new("Go back 3 spaces", GoBack(3)),
        Card::new("Bank pays you dividend of $50", Credit(50)),
        Card::new("Pay tax of $45", Debit(45)),
        Card::new("Take a trip to Rome", MoveTo(24)),
        Card::new("Advance to New York", MoveTo(18)),
        Card::new("Your building loan matures - collect $150", Credit(150)),
        Card::new("Get out of Jail Free", Nothing),
    ];
    DECK
}

/// The treasure deck. Drawn uniformly with replacement.
pub fn treasure_deck() -> &'static [Card] {
    use CardEffect::*;
    const DECK: &[Card] = &[
        Card::new("Bank error in your favor - collect $200", Credit(200)),
        Card::new("From sale of stock you get $50", Credit(50)),
        Card::new("Doctor's fees - Pay $50", Debit(50)),
        Card::new("Holiday Fund matures - receive $100", Credit(100)),
        Card::new("Pay hospital fees of $100", Debit(100)),
        Card::new("Life insurance matures - collect $100", Credit(100)),
        Card::new("You inherit $100", Credit(100)),
        Card::new("Income tax refund - collect $20", Credit(20)),
        Card::new("Get out of Jail Free", Nothing),
    ];
    DECK
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::Player;

    fn player() -> Player {
        Player::new(1, uuid::Uuid::new_v4(), "tester", "#FF0000", true, 1500)
    }
    #[test]
    fn advance_to_start_collects() {
        let mut p = player();
        p.position = 24;
        Card::new("", CardEffect::AdvanceToStart).apply(&mut p);
        assert_eq!(p.position, 0);
        assert_eq!(p.funds, 1700);
    }
    #[test]
    fn go_to_jail_resets_attempts() {
        let mut p = player();
        p.jail_attempts = 2;
        Card::new("", CardEffect::GoToJail).apply(&mut p);
        assert_eq!(p.position, JAIL_POSITION);
        assert!(p.in_jail);
        assert_eq!(p.jail_attempts, 0);
    }
    #[test]
    fn go_back_wraps_below_zero() {
        let mut p = player();
        p.position = 1;
        Card::new("", CardEffect::GoBack(3)).apply(&mut p);
        assert_eq!(p.position, 38);
    }
    #[test]
    fn debit_can_go_negative() {
        let mut p = player();
        p.funds = 20;
        Card::new("", CardEffect::Debit(45)).apply(&mut p);
        assert_eq!(p.funds, -25);
    }
}
