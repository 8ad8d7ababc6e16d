//! Point calculation for a sequence of cards. Nothing here keeps state.

use crate::Card;

/// Totals of a card sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Points {
    /// Total with every Ace counted as 1.
    pub min: u8,
    /// Best total not above 21 if one exists, otherwise `min`.
    pub best: u8,
    /// Whether `best` counts an Ace as 11.
    pub soft: bool,
}

impl Points {
    pub fn is_bust(&self) -> bool {
        self.min > 21
    }
}

/// Calculates the totals of the given cards. At most one Ace can ever count as
/// 11 without busting, so the best total is either `min` or `min + 10`.
pub fn calculate_points(cards: &[Card]) -> Points {
    let min: u8 = cards.iter().map(Card::blackjack_value).sum();
    let has_ace = cards.iter().any(Card::is_ace);
    if has_ace && min + 10 <= 21 {
        Points {
            min,
            best: min + 10,
            soft: true,
        }
    } else {
        Points {
            min,
            best: min,
            soft: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::card::parse_cards;

    fn points_of(text: &str) -> Points {
        calculate_points(&parse_cards(text).unwrap())
    }

    #[test]
    fn ace_six_is_soft_17() {
        let points = points_of("A 6");
        assert_eq!(points.best, 17);
        assert_eq!(points.min, 7);
        assert!(points.soft);
    }

    #[test]
    fn ace_six_king_is_hard_17() {
        let points = points_of("A 6 K");
        assert_eq!(points.best, 17);
        assert!(!points.soft);
    }

    #[test]
    fn several_aces_count_at_most_one_high() {
        assert_eq!(points_of("A A").best, 12);
        assert_eq!(points_of("A A 9").best, 21);
        assert_eq!(points_of("A A A A 7").best, 21);
        assert_eq!(points_of("A A A A 8").best, 12);
    }

    #[test]
    fn bust_uses_minimal_total() {
        let points = points_of("K Q 5");
        assert!(points.is_bust());
        assert_eq!(points.best, 25);
        assert!(!points_of("A K Q").is_bust());
    }

    #[test]
    fn empty_hand_is_zero() {
        assert_eq!(calculate_points(&[]), Points::default());
    }
}
