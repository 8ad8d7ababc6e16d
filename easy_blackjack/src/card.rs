use std::fmt;
use std::str::FromStr;

use strum_macros::EnumIter;

use crate::ShoeError;

/// A card as the table sees it. Suits never matter in this game, so a card is
/// nothing but its rank.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter)]
pub enum Card {
    Ace,
    Two,
    Three,
    Four,
    Five,
    Six,
    Seven,
    Eight,
    Nine,
    Ten,
    Jack,
    Queen,
    King,
}

impl Card {
    /// Blackjack value with the Ace counted low.
    pub fn blackjack_value(&self) -> u8 {
        match self {
            Card::Ace => 1,
            Card::Two => 2,
            Card::Three => 3,
            Card::Four => 4,
            Card::Five => 5,
            Card::Six => 6,
            Card::Seven => 7,
            Card::Eight => 8,
            Card::Nine => 9,
            Card::Ten | Card::Jack | Card::Queen | Card::King => 10,
        }
    }

    pub fn is_ace(&self) -> bool {
        *self == Card::Ace
    }

    pub fn symbol(&self) -> char {
        match self {
            Card::Ace => 'A',
            Card::Two => '2',
            Card::Three => '3',
            Card::Four => '4',
            Card::Five => '5',
            Card::Six => '6',
            Card::Seven => '7',
            Card::Eight => '8',
            Card::Nine => '9',
            Card::Ten => 'T',
            Card::Jack => 'J',
            Card::Queen => 'Q',
            Card::King => 'K',
        }
    }
}

impl TryFrom<char> for Card {
    type Error = ShoeError;

    fn try_from(symbol: char) -> Result<Self, Self::Error> {
        let card = match symbol.to_ascii_uppercase() {
            'A' => Card::Ace,
            '2' => Card::Two,
            '3' => Card::Three,
            '4' => Card::Four,
            '5' => Card::Five,
            '6' => Card::Six,
            '7' => Card::Seven,
            '8' => Card::Eight,
            '9' => Card::Nine,
            'T' => Card::Ten,
            'J' => Card::Jack,
            'Q' => Card::Queen,
            'K' => Card::King,
            _ => return Err(ShoeError::UnknownCard(symbol.to_string())),
        };
        Ok(card)
    }
}

impl FromStr for Card {
    type Err = ShoeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s == "10" {
            return Ok(Card::Ten);
        }
        let mut chars = s.chars();
        match (chars.next(), chars.next()) {
            (Some(symbol), None) => Card::try_from(symbol),
            _ => Err(ShoeError::UnknownCard(s.to_string())),
        }
    }
}

impl fmt::Display for Card {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

/// Parses whitespace separated card symbols, e.g. `"A K 9 7"`.
pub fn parse_cards(text: &str) -> Result<Vec<Card>, ShoeError> {
    text.split_whitespace().map(str::parse).collect()
}
