mod card;
mod error;
pub mod hand;
pub mod player;
mod points;
pub mod round;
pub mod shoe;
pub mod strategy;

use std::fmt;

use serde_enum_str::{Deserialize_enum_str, Serialize_enum_str};
use strum::IntoEnumIterator;
use strum_macros::EnumIter;

pub use card::{parse_cards, Card};
pub use error::{RoundError, ShoeError, StrategyError};
pub use hand::{Hand, HandStatus};
pub use player::{AutoPlayer, BalanceSink, Bankroll, Player};
pub use points::{calculate_points, Points};
pub use round::{
    dealer_should_hit, play_round, EndState, Round, RoundEventHandler, RoundPhase, RoundSummary,
};
pub use shoe::{CardSource, RandomShoe, RecordingShoe, StackedShoe};
pub use strategy::{DealerColumn, PlayerRow, StrategyTable};

/// A round never holds more player hands than this (three splits).
pub const MAX_HANDS: usize = 4;
/// Profit of a natural, in base bets.
pub const PAYOUT_BLACKJACK: f64 = 1.5;
/// Loss of a surrender, in base bets.
pub const LOSS_SURRENDER: f64 = 0.5;

/// Something a player can do with a hand. The declaration order is the order
/// actions are offered in.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, Serialize_enum_str, Deserialize_enum_str,
)]
pub enum Action {
    Stand,
    Hit,
    Double,
    Split,
    Surrender,
}

impl Action {
    /// The letter used for this action in strategy tables and prompts.
    pub fn letter(&self) -> char {
        match self {
            Action::Stand => 'S',
            Action::Hit => 'H',
            Action::Double => 'D',
            Action::Split => 'P',
            Action::Surrender => 'R',
        }
    }

    /// Case-insensitive inverse of [`Action::letter`].
    pub fn from_letter(letter: char) -> Option<Action> {
        match letter.to_ascii_uppercase() {
            'S' => Some(Action::Stand),
            'H' => Some(Action::Hit),
            'D' => Some(Action::Double),
            'P' => Some(Action::Split),
            'R' => Some(Action::Surrender),
            _ => None,
        }
    }

    fn bit(&self) -> u8 {
        1 << (*self as u8)
    }
}

/// A set of actions, e.g. the actions currently legal for a hand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ActionSet(u8);

impl ActionSet {
    pub fn new() -> Self {
        Self(0)
    }

    pub fn insert(&mut self, action: Action) {
        self.0 |= action.bit();
    }

    pub fn contains(&self, action: Action) -> bool {
        self.0 & action.bit() != 0
    }

    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    pub fn len(&self) -> usize {
        self.0.count_ones() as usize
    }

    /// Iterates in offering order: Stand, Hit, Double, Split, Surrender.
    pub fn iter(&self) -> impl Iterator<Item = Action> + '_ {
        Action::iter().filter(move |action| self.contains(*action))
    }
}

impl FromIterator<Action> for ActionSet {
    fn from_iter<I: IntoIterator<Item = Action>>(iter: I) -> Self {
        let mut set = ActionSet::new();
        for action in iter {
            set.insert(action);
        }
        set
    }
}

impl fmt::Display for ActionSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let letters: String = self.iter().map(|action| action.letter()).collect();
        write!(f, "[{}]", letters)
    }
}

/// Formats a signed amount of money the way results are printed at the
/// table: `+$1.50`, `-$0.50`, `$0.00`.
pub fn to_currency(amount: f64) -> String {
    if amount > 0.0 {
        format!("+${:.2}", amount)
    } else if amount < 0.0 {
        format!("-${:.2}", -amount)
    } else {
        format!("${:.2}", 0.0)
    }
}
