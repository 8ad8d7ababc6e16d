use std::{fs, path::Path, str::FromStr};

use rand::{rngs::StdRng, seq::SliceRandom, SeedableRng};
use strum::IntoEnumIterator;

use crate::{parse_cards, Card, ShoeError};

/// Where a round draws its cards from. `None` means the source is used up.
pub trait CardSource {
    fn pop(&mut self) -> Option<Card>;
}

/// An endless shoe. Every draw picks one of the 13 ranks uniformly at random,
/// so the odds never change as cards are dealt.
#[derive(Debug, Clone)]
pub struct RandomShoe {
    rng: StdRng,
    ranks: Vec<Card>,
}

impl RandomShoe {
    /// Creates a shoe whose sequence is fully determined by `seed`.
    pub fn new(seed: u64) -> RandomShoe {
        RandomShoe {
            rng: StdRng::seed_from_u64(seed),
            ranks: Card::iter().collect(),
        }
    }
}

impl CardSource for RandomShoe {
    fn pop(&mut self) -> Option<Card> {
        self.ranks.choose(&mut self.rng).copied()
    }
}

/// A shoe with a fixed sequence of cards, drawn front to back.
#[derive(Debug, Clone, Default)]
pub struct StackedShoe {
    cards: Vec<Card>,
    next: usize,
}

impl StackedShoe {
    pub fn new(cards: Vec<Card>) -> StackedShoe {
        StackedShoe { cards, next: 0 }
    }

    /// Reads whitespace separated card symbols from a file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<StackedShoe, ShoeError> {
        fs::read_to_string(path)?.parse()
    }

    pub fn remaining(&self) -> usize {
        self.cards.len() - self.next
    }
}

impl FromStr for StackedShoe {
    type Err = ShoeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(StackedShoe::new(parse_cards(s)?))
    }
}

impl CardSource for StackedShoe {
    fn pop(&mut self) -> Option<Card> {
        let card = self.cards.get(self.next).copied()?;
        self.next += 1;
        Some(card)
    }
}

/// Wraps another source and remembers every card it hands out, so a random
/// session can be replayed later through a [`StackedShoe`].
#[derive(Debug, Clone)]
pub struct RecordingShoe<S> {
    inner: S,
    drawn: Vec<Card>,
}

impl<S: CardSource> RecordingShoe<S> {
    pub fn new(inner: S) -> RecordingShoe<S> {
        RecordingShoe {
            inner,
            drawn: Vec::new(),
        }
    }

    pub fn recorded(&self) -> &[Card] {
        &self.drawn
    }

    /// The recorded cards in the format [`StackedShoe`] reads, 13 per line.
    pub fn to_text(&self) -> String {
        let mut text = String::new();
        for line in self.drawn.chunks(13) {
            let symbols: Vec<String> = line.iter().map(Card::to_string).collect();
            text.push_str(&symbols.join(" "));
            text.push('\n');
        }
        text
    }

    pub fn write_to<P: AsRef<Path>>(&self, path: P) -> Result<(), ShoeError> {
        fs::write(path, self.to_text())?;
        Ok(())
    }

    pub fn into_inner(self) -> S {
        self.inner
    }
}

impl<S: CardSource> CardSource for RecordingShoe<S> {
    fn pop(&mut self) -> Option<Card> {
        let card = self.inner.pop()?;
        self.drawn.push(card);
        Some(card)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draw(source: &mut impl CardSource, count: usize) -> Vec<Card> {
        (0..count).filter_map(|_| source.pop()).collect()
    }

    #[test]
    fn same_seed_same_cards() {
        let first = draw(&mut RandomShoe::new(42), 50);
        let second = draw(&mut RandomShoe::new(42), 50);
        assert_eq!(first.len(), 50);
        assert_eq!(first, second);
        assert_ne!(first, draw(&mut RandomShoe::new(43), 50));
    }

    #[test]
    fn random_shoe_deals_every_rank() {
        let cards = draw(&mut RandomShoe::new(7), 2000);
        for rank in Card::iter() {
            assert!(cards.contains(&rank), "{} never dealt", rank);
        }
    }

    #[test]
    fn stacked_shoe_runs_out() {
        let mut shoe: StackedShoe = "A 5\nk".parse().unwrap();
        assert_eq!(shoe.remaining(), 3);
        assert_eq!(draw(&mut shoe, 5), vec![Card::Ace, Card::Five, Card::King]);
        assert_eq!(shoe.pop(), None);
        assert_eq!(shoe.remaining(), 0);
    }

    #[test]
    fn stacked_shoe_rejects_bad_symbols() {
        assert!(matches!(
            "A 5 Z".parse::<StackedShoe>(),
            Err(ShoeError::UnknownCard(_))
        ));
    }

    #[test]
    fn recording_replays_through_stacked_shoe() {
        let mut recording = RecordingShoe::new(RandomShoe::new(3));
        let dealt = draw(&mut recording, 30);
        assert_eq!(recording.recorded(), &dealt[..]);
        assert_eq!(recording.to_text().lines().count(), 3);

        let mut replay: StackedShoe = recording.to_text().parse().unwrap();
        assert_eq!(draw(&mut replay, 30), dealt);
    }

    #[test]
    fn missing_shoe_file_is_io_error() {
        assert!(matches!(
            StackedShoe::from_file("/nonexistent/easybj/shoe.txt"),
            Err(ShoeError::Io(_))
        ));
    }
}
