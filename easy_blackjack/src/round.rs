use std::fmt;

use easy_blackjack_macros::allowed_phase;
use log::{debug, trace};

use crate::{
    to_currency, Action, ActionSet, BalanceSink, Card, CardSource, Hand, Player, RoundError,
    LOSS_SURRENDER, MAX_HANDS, PAYOUT_BLACKJACK,
};

/// Which operations a round currently accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoundPhase {
    /// `next` and `apply` drive the player hands.
    PlayerTurns,
    /// No player hand can act any more; waiting for `finish`.
    Settlement,
    /// Settled and paid out.
    Finished,
}

/// How a round ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EndState {
    NotEnded,
    PlayerBlackjack,
    DealerBlackjack,
    DrawBlackjack,
    PlayerSurrendered,
    DealerBust,
    PlayerAllBust,
    AllStandoff,
}

/// One round of Blackjack between the dealer and up to four player hands.
///
/// A round is dealt with [`Round::deal`], driven by alternating [`Round::next`]
/// and [`Round::apply`], and settled once with [`Round::finish`].
pub struct Round<'s, S: CardSource + ?Sized> {
    source: &'s mut S,
    base_bet: f64,

    // Round state
    phase: RoundPhase,
    end_state: EndState,
    dealer: Hand,
    dealer_upcard: Hand,
    hands: Vec<Hand>,
    current: Option<usize>,
    profit: f64,
}

impl<'s, S: CardSource + ?Sized> Round<'s, S> {
    /// Deals dealer, dealer, player, player and checks for naturals. If anyone
    /// has a blackjack the round goes straight to settlement.
    pub fn deal(source: &'s mut S, base_bet: f64) -> Result<Self, RoundError> {
        let mut round = Round {
            source,
            base_bet,
            phase: RoundPhase::PlayerTurns,
            end_state: EndState::NotEnded,
            dealer: Hand::new(),
            dealer_upcard: Hand::new(),
            hands: Vec::with_capacity(MAX_HANDS),
            current: None,
            profit: 0.0,
        };

        let mut player = Hand::new();
        for _ in 0..2 {
            let card = round.draw()?;
            round.dealer.receive_card(card);
        }
        for _ in 0..2 {
            let card = round.draw()?;
            player.receive_card(card);
        }
        if let Some(upcard) = round.dealer.cards().first() {
            round.dealer_upcard.receive_card(*upcard);
        }

        round.end_state = match (player.is_blackjack(), round.dealer.is_blackjack()) {
            (true, true) => EndState::DrawBlackjack,
            (true, false) => EndState::PlayerBlackjack,
            (false, true) => EndState::DealerBlackjack,
            (false, false) => EndState::NotEnded,
        };
        if round.end_state != EndState::NotEnded {
            round.phase = RoundPhase::Settlement;
        }
        debug!(
            "dealt dealer {} / player {}, {:?}",
            round.dealer, player, round.end_state
        );

        round.hands.push(player);
        Ok(round)
    }

    pub fn phase(&self) -> RoundPhase {
        self.phase
    }

    pub fn end_state(&self) -> EndState {
        self.end_state
    }

    pub fn base_bet(&self) -> f64 {
        self.base_bet
    }

    /// Settled profit, zero until `finish` runs.
    pub fn profit(&self) -> f64 {
        self.profit
    }

    pub fn dealer_hand(&self) -> &Hand {
        &self.dealer
    }

    /// The dealer's face-up card as a one-card hand.
    pub fn dealer_upcard(&self) -> &Hand {
        &self.dealer_upcard
    }

    pub fn hands(&self) -> &[Hand] {
        &self.hands
    }

    /// Index of the hand the last `next` call handed out.
    pub fn current(&self) -> Option<usize> {
        self.current
    }

    pub fn legal_actions(&self, index: usize) -> ActionSet {
        self.hands
            .get(index)
            .map_or(ActionSet::new(), |hand| hand.legal_actions(self.hands.len()))
    }

    /// Expands pending splits and picks the hand to act next. The current
    /// hand keeps the turn after a hit or a split; otherwise the search goes
    /// round-robin from the following hand. Returns `None` once no hand can
    /// act, which moves the round to settlement.
    #[allowed_phase(PlayerTurns)]
    pub fn next(&mut self) -> Result<Option<usize>, RoundError> {
        self.expand_splits()?;
        if self.hands.len() >= MAX_HANDS {
            for hand in &mut self.hands {
                hand.disable_split();
            }
        }

        if let Some(index) = self.current {
            let hand = &self.hands[index];
            if hand.is_active() && matches!(hand.last_action(), Some(Action::Hit | Action::Split))
            {
                return Ok(Some(index));
            }
        }

        let count = self.hands.len();
        let start = self.current.map_or(0, |index| index + 1);
        let found = (0..count)
            .map(|offset| (start + offset) % count)
            .find(|&index| self.hands[index].is_active());

        self.current = found;
        if found.is_none() {
            self.phase = RoundPhase::Settlement;
        }
        Ok(found)
    }

    /// Applies `action` to the current hand, drawing cards as needed.
    /// An action outside the legal set is rejected and changes nothing.
    #[allowed_phase(PlayerTurns)]
    pub fn apply(&mut self, action: Action) -> Result<(), RoundError> {
        let index = self.current.ok_or(RoundError::NoCurrentHand)?;
        let legal = self.legal_actions(index);
        if !legal.contains(action) {
            return Err(RoundError::IllegalAction { action, legal });
        }

        match action {
            Action::Hit => {
                let card = self.draw()?;
                self.hands[index].hit(card)
            }
            Action::Double => {
                let card = self.draw()?;
                self.hands[index].double(card)
            }
            Action::Stand => self.hands[index].stand(),
            Action::Split => self.hands[index].split(),
            Action::Surrender => self.hands[index].surrender(),
        }
    }

    /// Plays the dealer, settles every hand and reports the net profit to
    /// `sink` exactly once.
    #[allowed_phase(Settlement)]
    pub fn finish<B: BalanceSink + ?Sized>(&mut self, sink: &mut B) -> Result<f64, RoundError> {
        let profit = match self.end_state {
            EndState::DrawBlackjack => 0.0,
            EndState::PlayerBlackjack => PAYOUT_BLACKJACK * self.base_bet,
            EndState::DealerBlackjack => -self.base_bet,
            _ => self.settle_hands()?,
        };

        debug!("round settled {:?}, profit {}", self.end_state, profit);
        self.profit = profit;
        self.phase = RoundPhase::Finished;
        sink.update_balance(profit);
        Ok(profit)
    }

    pub fn summary(&self) -> RoundSummary {
        RoundSummary {
            end_state: self.end_state,
            profit: self.profit,
            dealer: self.dealer.clone(),
            hands: self.hands.clone(),
        }
    }

    fn settle_hands(&mut self) -> Result<f64, RoundError> {
        let base_bet = self.base_bet;
        if self.hands.iter().any(Hand::is_surrendered) {
            self.end_state = EndState::PlayerSurrendered;
            return Ok(-LOSS_SURRENDER * base_bet);
        }

        if self.hands.iter().all(Hand::is_bust) {
            self.end_state = EndState::PlayerAllBust;
            return Ok(-self.hands.iter().map(|hand| hand.bet() * base_bet).sum::<f64>());
        }

        self.play_dealer()?;
        if self.dealer.is_bust() {
            self.end_state = EndState::DealerBust;
            let profit = self
                .hands
                .iter()
                .filter(|hand| !hand.is_bust())
                .map(|hand| hand.bet() * base_bet)
                .sum();
            return Ok(profit);
        }

        self.end_state = EndState::AllStandoff;
        let dealer_points = self.dealer.points();
        let profit = self
            .hands
            .iter()
            .map(|hand| {
                let bet = hand.bet() * base_bet;
                if hand.is_bust() || hand.points() < dealer_points {
                    -bet
                } else if hand.points() > dealer_points {
                    bet
                } else {
                    0.0
                }
            })
            .sum();
        Ok(profit)
    }

    fn play_dealer(&mut self) -> Result<(), RoundError> {
        while self.dealer.is_active() && dealer_should_hit(&self.dealer) {
            let card = self.draw()?;
            self.dealer.hit(card)?;
            debug!("dealer draws {}, now {}", card, self.dealer);
        }
        if self.dealer.is_active() {
            self.dealer.stand()?;
        }
        Ok(())
    }

    fn expand_splits(&mut self) -> Result<(), RoundError> {
        let mut index = 0;
        while index < self.hands.len() {
            if self.hands[index].is_split_pending() {
                let own_card = self.draw()?;
                let sibling_card = self.draw()?;
                let sibling = self.hands[index].split_off(own_card, sibling_card);
                debug!(
                    "hand {} split into {} / {}",
                    index + 1,
                    self.hands[index],
                    sibling
                );
                self.hands.insert(index + 1, sibling);
                index += 1;
            }
            index += 1;
        }
        Ok(())
    }

    fn draw(&mut self) -> Result<Card, RoundError> {
        self.source.pop().ok_or(RoundError::ShoeExhausted)
    }
}

/// The fixed dealer policy. A minimal total of 7 holding an Ace always hits;
/// otherwise hit below 17, stand from 18, and at 17 hit only when soft.
pub fn dealer_should_hit(dealer: &Hand) -> bool {
    if dealer.min_points() == 7 && dealer.has_ace() {
        return true;
    }
    match dealer.points() {
        points if points < 17 => true,
        17 => dealer.is_soft(),
        _ => false,
    }
}

/// What is left of a round once it is over.
#[derive(Debug, Clone)]
pub struct RoundSummary {
    pub end_state: EndState,
    pub profit: f64,
    pub dealer: Hand,
    pub hands: Vec<Hand>,
}

impl fmt::Display for RoundSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Dealer: {}", self.dealer)?;
        for (index, hand) in self.hands.iter().enumerate() {
            writeln!(f, "Hand {}: {}", index + 1, hand)?;
        }
        write!(f, "Result: {}", to_currency(self.profit))
    }
}

/// Observer of a round played through [`play_round`]. Every method defaults
/// to doing nothing.
pub trait RoundEventHandler {
    fn on_deal(&mut self, _dealer_upcard: &Hand, _hand: &Hand) {}
    fn on_round_early_end(&mut self, _end_state: EndState) {}
    fn on_split(&mut self, _hands: &[Hand]) {}
    fn on_decision(&mut self, _hand_index: usize, _hand: &Hand, _action: Action) {}
    fn on_finish(&mut self, _summary: &RoundSummary) {}
}

impl RoundEventHandler for () {}

/// Plays one complete round: deals, lets `player` decide for every hand that
/// can act, and settles into `player`'s balance.
pub fn play_round<S, P, H>(
    source: &mut S,
    base_bet: f64,
    player: &mut P,
    handler: &mut H,
) -> Result<RoundSummary, RoundError>
where
    S: CardSource + ?Sized,
    P: Player + ?Sized,
    H: RoundEventHandler + ?Sized,
{
    let mut round = Round::deal(source, base_bet)?;
    handler.on_deal(round.dealer_upcard(), &round.hands()[0]);

    if round.phase() == RoundPhase::Settlement {
        handler.on_round_early_end(round.end_state());
    }
    while round.phase() == RoundPhase::PlayerTurns {
        let hands_before = round.hands().len();
        let next = round.next()?;
        if round.hands().len() > hands_before {
            handler.on_split(round.hands());
        }
        let Some(index) = next else {
            break;
        };

        let hand = &round.hands()[index];
        let legal = round.legal_actions(index);
        let action = player.decide(hand, round.dealer_upcard(), legal);
        trace!("hand {}: {} -> {:?} (allowed {})", index + 1, hand, action, legal);
        handler.on_decision(index, hand, action);
        round.apply(action)?;
    }

    round.finish(player)?;
    let summary = round.summary();
    handler.on_finish(&summary);
    Ok(summary)
}
