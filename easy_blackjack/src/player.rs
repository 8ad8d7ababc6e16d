use crate::{Action, ActionSet, Hand, StrategyTable};

/// Receives the settled profit of each round.
pub trait BalanceSink {
    fn update_balance(&mut self, amount: f64);
}

/// Someone who makes decisions at the table.
pub trait Player: BalanceSink {
    /// Picks one of `legal` for `hand`. `legal` is never empty.
    fn decide(&mut self, hand: &Hand, dealer_upcard: &Hand, legal: ActionSet) -> Action;

    /// Whether to play another round.
    fn play_again(&mut self) -> bool;

    /// Balance and rounds settled so far.
    fn bankroll(&self) -> &Bankroll;
}

/// Running balance and number of rounds settled.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Bankroll {
    balance: f64,
    hands_played: u64,
}

impl Bankroll {
    pub fn new() -> Bankroll {
        Bankroll::default()
    }

    pub fn balance(&self) -> f64 {
        self.balance
    }

    pub fn hands_played(&self) -> u64 {
        self.hands_played
    }

    /// Average profit per round as a percentage of the base bet.
    pub fn advantage(&self) -> f64 {
        if self.hands_played == 0 {
            0.0
        } else {
            self.balance / self.hands_played as f64 * 100.0
        }
    }
}

impl BalanceSink for Bankroll {
    fn update_balance(&mut self, amount: f64) {
        self.balance += amount;
        self.hands_played += 1;
    }
}

/// Plays a fixed number of rounds by looking every decision up in a
/// [`StrategyTable`].
#[derive(Debug, Clone)]
pub struct AutoPlayer {
    table: StrategyTable,
    hands_to_play: u64,
    fallback: Action,
    bankroll: Bankroll,
}

impl AutoPlayer {
    pub fn new(table: StrategyTable, hands_to_play: u64) -> AutoPlayer {
        AutoPlayer {
            table,
            hands_to_play,
            fallback: Action::Stand,
            bankroll: Bankroll::new(),
        }
    }

    /// Sets the action taken when the table has no recommendation.
    pub fn with_fallback(mut self, fallback: Action) -> AutoPlayer {
        self.fallback = fallback;
        self
    }

    fn fallback_for(&self, legal: ActionSet) -> Action {
        [self.fallback, Action::Stand]
            .into_iter()
            .chain(legal.iter())
            .find(|action| legal.contains(*action))
            .unwrap_or(Action::Hit)
    }
}

impl BalanceSink for AutoPlayer {
    fn update_balance(&mut self, amount: f64) {
        self.bankroll.update_balance(amount);
    }
}

impl Player for AutoPlayer {
    fn decide(&mut self, hand: &Hand, dealer_upcard: &Hand, legal: ActionSet) -> Action {
        self.table
            .recommend(hand, dealer_upcard, legal)
            .unwrap_or_else(|| self.fallback_for(legal))
    }

    fn play_again(&mut self) -> bool {
        self.bankroll.hands_played() < self.hands_to_play
    }

    fn bankroll(&self) -> &Bankroll {
        &self.bankroll
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{parse_cards, play_round, StackedShoe};

    fn hand_of(text: &str) -> Hand {
        Hand::with_cards(&parse_cards(text).unwrap())
    }

    #[test]
    fn bankroll_tracks_rounds() {
        let mut bankroll = Bankroll::new();
        assert_eq!(bankroll.advantage(), 0.0);
        bankroll.update_balance(1.5);
        bankroll.update_balance(-0.5);
        assert_eq!(bankroll.balance(), 1.0);
        assert_eq!(bankroll.hands_played(), 2);
        assert_eq!(bankroll.advantage(), 50.0);
    }

    #[test]
    fn auto_player_stops_after_its_hands() {
        let mut player = AutoPlayer::new(StrategyTable::basic(), 2);
        assert!(player.play_again());
        player.update_balance(1.0);
        assert!(player.play_again());
        player.update_balance(-1.0);
        assert!(!player.play_again());
        assert_eq!(player.bankroll().hands_played(), 2);
    }

    #[test]
    fn empty_table_uses_fallback() {
        let legal = hand_of("T 6").legal_actions(1);
        let upcard = hand_of("9");

        let mut player = AutoPlayer::new(StrategyTable::empty(), 1);
        assert_eq!(player.decide(&hand_of("T 6"), &upcard, legal), Action::Stand);

        let mut player = AutoPlayer::new(StrategyTable::empty(), 1).with_fallback(Action::Hit);
        assert_eq!(player.decide(&hand_of("T 6"), &upcard, legal), Action::Hit);
    }

    #[test]
    fn illegal_fallback_falls_back_to_stand() {
        let legal = [Action::Stand, Action::Hit].into_iter().collect();
        let mut player =
            AutoPlayer::new(StrategyTable::empty(), 1).with_fallback(Action::Surrender);
        assert_eq!(
            player.decide(&hand_of("T 6 2"), &hand_of("9"), legal),
            Action::Stand
        );
    }

    #[test]
    fn plays_a_full_round_with_basic_strategy() {
        // Dealer 6 T, player 5 6 doubles on 11 and draws a ten; dealer draws 9.
        let mut shoe: StackedShoe = "6 T 5 6 K 9".parse().unwrap();
        let mut player = AutoPlayer::new(StrategyTable::basic(), 1);
        let summary = play_round(&mut shoe, 1.0, &mut player, &mut ()).unwrap();

        assert_eq!(summary.profit, 2.0);
        assert!(summary.hands[0].is_doubled());
        assert_eq!(player.bankroll().balance(), 2.0);
        assert!(!player.play_again());
    }
}
