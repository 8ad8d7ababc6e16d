use std::fmt;

use crate::{calculate_points, Action, ActionSet, Card, Points, RoundError, MAX_HANDS};

/// Where a hand is in its life. Everything but `Active` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandStatus {
    Active,
    Stood,
    /// Stood by itself after reaching 21 on a hit or after a split.
    AutoStood,
    Busted,
    Surrendered,
}

/// The cards of one player hand (or of the dealer) together with its action
/// history. Totals are recomputed every time a card is added.
#[derive(Debug, Clone)]
pub struct Hand {
    cards: Vec<Card>,
    points: Points,
    status: HandStatus,
    bet: f64,
    doubled: bool,
    split_originated: bool,
    split_pending: bool,
    split_disabled: bool,
    action_taken: bool,
    last_action: Option<Action>,
}

impl Hand {
    pub fn new() -> Hand {
        Hand {
            cards: Vec::with_capacity(4),
            points: Points::default(),
            status: HandStatus::Active,
            bet: 1.0,
            doubled: false,
            split_originated: false,
            split_pending: false,
            split_disabled: false,
            action_taken: false,
            last_action: None,
        }
    }

    /// Builds an untouched hand holding the given cards.
    pub fn with_cards(cards: &[Card]) -> Hand {
        let mut hand = Hand::new();
        for card in cards {
            hand.receive_card(*card);
        }
        hand
    }

    /// Adds a dealt card without counting it as an action.
    pub fn receive_card(&mut self, card: Card) {
        self.cards.push(card);
        self.points = calculate_points(&self.cards);
    }

    pub fn cards(&self) -> &[Card] {
        &self.cards
    }

    /// Best total not above 21 if achievable, else the minimal total.
    pub fn points(&self) -> u8 {
        self.points.best
    }

    /// Total with every Ace counted as 1.
    pub fn min_points(&self) -> u8 {
        self.points.min
    }

    pub fn is_soft(&self) -> bool {
        self.points.soft
    }

    pub fn is_bust(&self) -> bool {
        self.points.is_bust()
    }

    pub fn has_ace(&self) -> bool {
        self.cards.iter().any(Card::is_ace)
    }

    /// A natural: the two initial cards of a hand that never split, totalling 21.
    pub fn is_blackjack(&self) -> bool {
        self.cards.len() == 2
            && !self.split_originated
            && !self.action_taken
            && self.points.best == 21
    }

    pub fn status(&self) -> HandStatus {
        self.status
    }

    pub fn is_active(&self) -> bool {
        self.status == HandStatus::Active
    }

    /// Alive hands still face the dealer.
    pub fn is_alive(&self) -> bool {
        !self.is_bust() && self.status != HandStatus::Surrendered
    }

    pub fn is_stood(&self) -> bool {
        matches!(
            self.status,
            HandStatus::Stood | HandStatus::AutoStood | HandStatus::Surrendered
        )
    }

    /// Bet multiplier in base bets.
    pub fn bet(&self) -> f64 {
        self.bet
    }

    pub fn is_doubled(&self) -> bool {
        self.doubled
    }

    pub fn is_surrendered(&self) -> bool {
        self.status == HandStatus::Surrendered
    }

    pub fn is_split_originated(&self) -> bool {
        self.split_originated
    }

    pub fn is_split_pending(&self) -> bool {
        self.split_pending
    }

    pub fn last_action(&self) -> Option<Action> {
        self.last_action
    }

    /// Exactly two cards and no action taken on them yet.
    pub fn is_untouched(&self) -> bool {
        self.cards.len() == 2 && !self.action_taken
    }

    /// Two cards of the same rank, or two cards worth 10.
    pub fn is_pair(&self) -> bool {
        match self.cards.as_slice() {
            [first, second] => {
                first == second || (first.blackjack_value() == 10 && second.blackjack_value() == 10)
            }
            _ => false,
        }
    }

    /// Stops this hand from splitting for the rest of the round.
    pub fn disable_split(&mut self) {
        self.split_disabled = true;
    }

    /// The exact actions this hand may take in a round currently holding
    /// `hands_in_round` player hands. Querying never changes the hand.
    pub fn legal_actions(&self, hands_in_round: usize) -> ActionSet {
        let mut legal = ActionSet::new();
        if !self.is_active() || self.split_pending {
            return legal;
        }

        legal.insert(Action::Stand);
        legal.insert(Action::Hit);
        if self.is_untouched() {
            legal.insert(Action::Double);
            if self.is_pair() && !self.split_disabled && hands_in_round < MAX_HANDS {
                legal.insert(Action::Split);
            }
            if hands_in_round == 1 && !self.split_originated {
                legal.insert(Action::Surrender);
            }
        }
        legal
    }

    pub fn hit(&mut self, card: Card) -> Result<(), RoundError> {
        self.ensure_legal(Action::Hit)?;
        self.receive_card(card);
        self.action_taken = true;
        self.last_action = Some(Action::Hit);
        self.settle_after_draw();
        Ok(())
    }

    pub fn stand(&mut self) -> Result<(), RoundError> {
        self.ensure_legal(Action::Stand)?;
        self.action_taken = true;
        self.last_action = Some(Action::Stand);
        self.status = HandStatus::Stood;
        Ok(())
    }

    /// Doubles the bet, takes exactly one card and stops.
    pub fn double(&mut self, card: Card) -> Result<(), RoundError> {
        self.ensure_legal(Action::Double)?;
        self.bet *= 2.0;
        self.doubled = true;
        self.receive_card(card);
        self.action_taken = true;
        self.last_action = Some(Action::Double);
        self.status = if self.is_bust() {
            HandStatus::Busted
        } else {
            HandStatus::Stood
        };
        Ok(())
    }

    /// Marks the hand for splitting. The round expands it into two hands the
    /// next time it picks a turn.
    pub fn split(&mut self) -> Result<(), RoundError> {
        self.ensure_legal(Action::Split)?;
        self.split_pending = true;
        self.last_action = Some(Action::Split);
        Ok(())
    }

    /// Gives up half the bet. The round only allows this on its sole hand.
    pub fn surrender(&mut self) -> Result<(), RoundError> {
        self.ensure_legal(Action::Surrender)?;
        self.action_taken = true;
        self.last_action = Some(Action::Surrender);
        self.status = HandStatus::Surrendered;
        Ok(())
    }

    /// Expands a pending split. This hand keeps its first card and receives
    /// `own_card`; the returned sibling holds the second card plus
    /// `sibling_card`.
    pub(crate) fn split_off(&mut self, own_card: Card, sibling_card: Card) -> Hand {
        let moved = self.cards.split_off(1);
        let split_aces = self.cards.first().map_or(false, Card::is_ace);

        let mut sibling = Hand::new();
        sibling.bet = self.bet;
        for card in moved {
            sibling.receive_card(card);
        }
        sibling.receive_card(sibling_card);
        self.receive_card(own_card);

        for hand in [&mut *self, &mut sibling] {
            hand.split_originated = true;
            hand.split_pending = false;
            hand.action_taken = false;
            hand.last_action = Some(Action::Split);
            if split_aces {
                hand.status = HandStatus::Stood;
            } else if hand.points.best == 21 {
                hand.status = HandStatus::AutoStood;
            }
        }
        sibling
    }

    fn settle_after_draw(&mut self) {
        if self.is_bust() {
            self.status = HandStatus::Busted;
        } else if self.points.best == 21 {
            self.status = HandStatus::AutoStood;
        }
    }

    fn ensure_legal(&self, action: Action) -> Result<(), RoundError> {
        let legal = self.legal_actions(1);
        if legal.contains(action) {
            Ok(())
        } else {
            Err(RoundError::IllegalAction { action, legal })
        }
    }
}

impl Default for Hand {
    fn default() -> Self {
        Hand::new()
    }
}

impl fmt::Display for Hand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for card in &self.cards {
            write!(f, "{} ", card)?;
        }
        if self.is_blackjack() {
            write!(f, "(blackjack)")?;
        } else if self.is_bust() {
            write!(f, "(bust)")?;
        } else if self.is_soft() {
            write!(f, "(soft {})", self.points())?;
        } else {
            write!(f, "({})", self.points())?;
        }

        if self.is_surrendered() {
            write!(f, " SURRENDER")?;
        } else if self.doubled {
            write!(f, " DOUBLE")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse_cards;

    fn hand_of(text: &str) -> Hand {
        Hand::with_cards(&parse_cards(text).unwrap())
    }

    fn legal_of(actions: &[Action]) -> ActionSet {
        actions.iter().copied().collect()
    }

    #[test]
    fn fresh_hand_offers_everything_but_split() {
        let hand = hand_of("5 J");
        assert_eq!(
            hand.legal_actions(1),
            legal_of(&[Action::Stand, Action::Hit, Action::Double, Action::Surrender])
        );
    }

    #[test]
    fn legal_actions_query_is_idempotent() {
        let hand = hand_of("8 8");
        let first = hand.legal_actions(1);
        let second = hand.legal_actions(1);
        assert_eq!(first, second);
        assert!(first.contains(Action::Split));
    }

    #[test]
    fn ten_valued_cards_split() {
        assert!(hand_of("K Q").legal_actions(1).contains(Action::Split));
        assert!(hand_of("T J").is_pair());
        assert!(!hand_of("K 9").legal_actions(1).contains(Action::Split));
        assert!(!hand_of("K 9").is_pair());
    }

    #[test]
    fn split_needs_room_in_the_round() {
        let hand = hand_of("8 8");
        assert!(hand.legal_actions(3).contains(Action::Split));
        assert!(!hand.legal_actions(MAX_HANDS).contains(Action::Split));

        let mut hand = hand_of("8 8");
        hand.disable_split();
        assert!(!hand.legal_actions(1).contains(Action::Split));
    }

    #[test]
    fn surrender_only_on_the_sole_hand() {
        let hand = hand_of("9 7");
        assert!(hand.legal_actions(1).contains(Action::Surrender));
        assert!(!hand.legal_actions(2).contains(Action::Surrender));
    }

    #[test]
    fn hit_takes_away_double_split_and_surrender() {
        let mut hand = hand_of("2 2");
        hand.hit(Card::Three).unwrap();
        assert_eq!(hand.legal_actions(1), legal_of(&[Action::Stand, Action::Hit]));
        assert_eq!(hand.last_action(), Some(Action::Hit));
        assert!(hand.is_active());
    }

    #[test]
    fn hit_to_21_auto_stands() {
        let mut hand = hand_of("5 6");
        hand.hit(Card::King).unwrap();
        assert_eq!(hand.status(), HandStatus::AutoStood);
        assert!(hand.legal_actions(1).is_empty());
        assert!(!hand.is_blackjack());
    }

    #[test]
    fn hit_past_21_busts() {
        let mut hand = hand_of("K 6");
        hand.hit(Card::Queen).unwrap();
        assert_eq!(hand.status(), HandStatus::Busted);
        assert!(!hand.is_alive());
        assert_eq!(
            hand.hit(Card::Two),
            Err(RoundError::IllegalAction {
                action: Action::Hit,
                legal: ActionSet::new(),
            })
        );
        assert_eq!(hand.cards().len(), 3);
    }

    #[test]
    fn double_adds_one_card_and_stops() {
        let mut hand = hand_of("7 4");
        hand.double(Card::Nine).unwrap();
        assert_eq!(hand.cards().len(), 3);
        assert_eq!(hand.bet(), 2.0);
        assert!(hand.is_doubled());
        assert_eq!(hand.status(), HandStatus::Stood);
        assert!(hand.legal_actions(1).is_empty());
        assert_eq!(hand.to_string(), "7 4 9 (20) DOUBLE");
    }

    #[test]
    fn double_can_bust() {
        let mut hand = hand_of("6 6");
        hand.double(Card::Queen).unwrap();
        assert_eq!(hand.status(), HandStatus::Busted);
        assert_eq!(hand.to_string(), "6 6 Q (bust) DOUBLE");
    }

    #[test]
    fn double_rejected_after_hit() {
        let mut hand = hand_of("2 3");
        hand.hit(Card::Four).unwrap();
        assert!(matches!(
            hand.double(Card::Five),
            Err(RoundError::IllegalAction {
                action: Action::Double,
                ..
            })
        ));
        assert_eq!(hand.bet(), 1.0);
        assert_eq!(hand.cards().len(), 3);
    }

    #[test]
    fn stand_is_terminal() {
        let mut hand = hand_of("T 8");
        hand.stand().unwrap();
        assert!(hand.is_stood());
        assert!(hand.stand().is_err());
    }

    #[test]
    fn surrender_forces_stand() {
        let mut hand = hand_of("5 J");
        hand.surrender().unwrap();
        assert!(hand.is_surrendered());
        assert!(hand.is_stood());
        assert!(!hand.is_alive());
        assert_eq!(hand.to_string(), "5 J (15) SURRENDER");
    }

    #[test]
    fn split_marks_pending_until_expanded() {
        let mut hand = hand_of("8 8");
        hand.split().unwrap();
        assert!(hand.is_split_pending());
        assert!(hand.legal_actions(1).is_empty());

        let sibling = hand.split_off(Card::Three, Card::Ten);
        assert_eq!(hand.cards(), &[Card::Eight, Card::Three]);
        assert_eq!(sibling.cards(), &[Card::Eight, Card::Ten]);
        for hand in [&hand, &sibling] {
            assert!(hand.is_split_originated());
            assert!(hand.is_active());
            assert_eq!(hand.last_action(), Some(Action::Split));
            assert!(hand.legal_actions(2).contains(Action::Double));
            assert!(!hand.legal_actions(2).contains(Action::Surrender));
        }
    }

    #[test]
    fn split_aces_stand_immediately() {
        let mut hand = hand_of("A A");
        hand.split().unwrap();
        let sibling = hand.split_off(Card::Five, Card::Six);
        assert_eq!(hand.cards().len(), 2);
        assert_eq!(sibling.cards().len(), 2);
        assert_eq!(hand.status(), HandStatus::Stood);
        assert_eq!(sibling.status(), HandStatus::Stood);
        assert_eq!(hand.to_string(), "A 5 (soft 16)");
        assert_eq!(sibling.to_string(), "A 6 (soft 17)");
    }

    #[test]
    fn split_21_is_not_blackjack() {
        let mut hand = hand_of("A A");
        hand.split().unwrap();
        let sibling = hand.split_off(Card::Jack, Card::Two);
        assert_eq!(hand.points(), 21);
        assert!(!hand.is_blackjack());
        assert_eq!(hand.to_string(), "A J (soft 21)");
        assert_eq!(sibling.points(), 13);

        let mut hand = hand_of("K K");
        hand.split().unwrap();
        let sibling = hand.split_off(Card::Ace, Card::Seven);
        assert_eq!(hand.status(), HandStatus::AutoStood);
        assert!(!hand.is_blackjack());
        assert!(sibling.is_active());
    }

    #[test]
    fn blackjack_display() {
        let hand = hand_of("T A");
        assert!(hand.is_blackjack());
        assert_eq!(hand.to_string(), "T A (blackjack)");
        assert_eq!(hand_of("K 6 5").to_string(), "K 6 5 (21)");
        assert_eq!(hand_of("A 7").to_string(), "A 7 (soft 18)");
    }
}
