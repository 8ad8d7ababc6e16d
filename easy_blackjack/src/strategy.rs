use std::{fs, path::Path, str::FromStr};

use log::trace;
use strum::IntoEnumIterator;
use strum_macros::EnumIter;

use crate::{Action, ActionSet, Hand, StrategyError};

/// Number of player rows: hard 4..=21, soft 13..=20, pairs 2..=9, tens and aces.
pub const ROWS: usize = 36;
/// Number of dealer columns: 2..=9, ten and ace.
pub const COLUMNS: usize = 10;

/// The player's side of a strategy lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PlayerRow {
    /// Hard total, 4..=21.
    Hard(u8),
    /// Soft total, 13..=20 (A2 to A9).
    Soft(u8),
    /// Pair of the given value, 2..=9.
    Pair(u8),
    TenPair,
    AcePair,
}

impl PlayerRow {
    /// Classifies a hand. Unplayed pairs use the pair rows, soft hands the soft
    /// rows and everything else its hard total.
    pub fn classify(hand: &Hand) -> PlayerRow {
        if hand.is_untouched() && hand.is_pair() {
            if let Some(card) = hand.cards().first() {
                return match card.blackjack_value() {
                    1 => PlayerRow::AcePair,
                    10 => PlayerRow::TenPair,
                    value => PlayerRow::Pair(value),
                };
            }
        }
        if hand.is_soft() {
            PlayerRow::Soft(hand.points())
        } else {
            PlayerRow::Hard(hand.points())
        }
    }

    /// Position in the table, `None` for totals the table has no row for.
    pub fn index(&self) -> Option<usize> {
        match *self {
            PlayerRow::Hard(total) if (4..=21).contains(&total) => Some((total - 4) as usize),
            PlayerRow::Soft(total) if (13..=20).contains(&total) => {
                Some(18 + (total - 13) as usize)
            }
            PlayerRow::Pair(value) if (2..=9).contains(&value) => Some(26 + (value - 2) as usize),
            PlayerRow::TenPair => Some(34),
            PlayerRow::AcePair => Some(35),
            _ => None,
        }
    }

    /// Row label as written in strategy files: `16`, `A7`, `88`, `TT`, `AA`.
    pub fn label(&self) -> String {
        match *self {
            PlayerRow::Hard(total) => total.to_string(),
            PlayerRow::Soft(total) => format!("A{}", total.saturating_sub(11)),
            PlayerRow::Pair(value) => format!("{}{}", value, value),
            PlayerRow::TenPair => "TT".to_string(),
            PlayerRow::AcePair => "AA".to_string(),
        }
    }

    pub fn from_label(label: &str) -> Option<PlayerRow> {
        let label = label.to_ascii_uppercase();
        match label.as_str() {
            "AA" => return Some(PlayerRow::AcePair),
            "TT" => return Some(PlayerRow::TenPair),
            _ => {}
        }

        let digit = |byte: u8| (b'2'..=b'9').contains(&byte).then(|| byte - b'0');
        match label.as_bytes() {
            [b'A', second] => digit(*second).map(|value| PlayerRow::Soft(11 + value)),
            [first, second] if first == second && digit(*first).is_some() => {
                digit(*first).map(PlayerRow::Pair)
            }
            _ => label
                .parse::<u8>()
                .ok()
                .filter(|total| (4..=21).contains(total))
                .map(PlayerRow::Hard),
        }
    }
}

/// The dealer's side of a strategy lookup, keyed on the up-card.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter)]
pub enum DealerColumn {
    Two,
    Three,
    Four,
    Five,
    Six,
    Seven,
    Eight,
    Nine,
    Ten,
    Ace,
}

impl DealerColumn {
    /// Classifies the dealer's up-card hand. A soft 11 is an Ace.
    pub fn classify(upcard: &Hand) -> Option<DealerColumn> {
        if upcard.is_soft() && upcard.points() == 11 {
            return Some(DealerColumn::Ace);
        }
        match upcard.points() {
            value @ 2..=10 => DealerColumn::iter().nth((value - 2) as usize),
            _ => None,
        }
    }

    pub fn index(&self) -> usize {
        *self as usize
    }

    pub fn label(&self) -> &'static str {
        match self {
            DealerColumn::Two => "2",
            DealerColumn::Three => "3",
            DealerColumn::Four => "4",
            DealerColumn::Five => "5",
            DealerColumn::Six => "6",
            DealerColumn::Seven => "7",
            DealerColumn::Eight => "8",
            DealerColumn::Nine => "9",
            DealerColumn::Ten => "T",
            DealerColumn::Ace => "A",
        }
    }

    /// Accepts `2`..`9`, `T` or `10`, `A` or `11`.
    pub fn from_label(label: &str) -> Option<DealerColumn> {
        match label.to_ascii_uppercase().as_str() {
            "T" | "10" => Some(DealerColumn::Ten),
            "A" | "11" => Some(DealerColumn::Ace),
            other => {
                let value: u8 = other.parse().ok()?;
                if (2..=9).contains(&value) {
                    DealerColumn::iter().nth((value - 2) as usize)
                } else {
                    None
                }
            }
        }
    }
}

/// A grid of action preferences indexed by player row and dealer column.
/// A cell lists actions in order of preference; the first legal one wins.
#[derive(Debug, Clone, PartialEq)]
pub struct StrategyTable {
    cells: Vec<Option<Vec<Action>>>,
}

impl StrategyTable {
    /// A table with every cell empty.
    pub fn empty() -> StrategyTable {
        StrategyTable {
            cells: vec![None; ROWS * COLUMNS],
        }
    }

    /// Basic strategy for these house rules: dealer hits soft 17, doubling
    /// after splits, late surrender.
    pub fn basic() -> StrategyTable {
        const H: &[Action] = &[Action::Hit];
        const S: &[Action] = &[Action::Stand];
        const P: &[Action] = &[Action::Split];
        const DH: &[Action] = &[Action::Double, Action::Hit];
        const DS: &[Action] = &[Action::Double, Action::Stand];
        const RH: &[Action] = &[Action::Surrender, Action::Hit];
        const RS: &[Action] = &[Action::Surrender, Action::Stand];
        const RP: &[Action] = &[Action::Surrender, Action::Split];

        //   2   3   4   5   6   7   8   9   T   A
        let hard: [[&[Action]; COLUMNS]; 18] = [
            [H, H, H, H, H, H, H, H, H, H], // 4
            [H, H, H, H, H, H, H, H, H, H],
            [H, H, H, H, H, H, H, H, H, H],
            [H, H, H, H, H, H, H, H, H, H],
            [H, H, H, H, H, H, H, H, H, H],
            [H, DH, DH, DH, DH, H, H, H, H, H], // 9
            [DH, DH, DH, DH, DH, DH, DH, DH, H, H],
            [DH, DH, DH, DH, DH, DH, DH, DH, DH, DH],
            [H, H, S, S, S, H, H, H, H, H],
            [S, S, S, S, S, H, H, H, H, H],
            [S, S, S, S, S, H, H, H, H, H],
            [S, S, S, S, S, H, H, H, RH, RH], // 15
            [S, S, S, S, S, H, H, RH, RH, RH],
            [S, S, S, S, S, S, S, S, S, RS],
            [S, S, S, S, S, S, S, S, S, S],
            [S, S, S, S, S, S, S, S, S, S],
            [S, S, S, S, S, S, S, S, S, S],
            [S, S, S, S, S, S, S, S, S, S], // 21
        ];
        let soft: [[&[Action]; COLUMNS]; 8] = [
            [H, H, H, DH, DH, H, H, H, H, H], // A2
            [H, H, H, DH, DH, H, H, H, H, H],
            [H, H, DH, DH, DH, H, H, H, H, H],
            [H, H, DH, DH, DH, H, H, H, H, H],
            [H, DH, DH, DH, DH, H, H, H, H, H], // A6
            [DS, DS, DS, DS, DS, S, S, H, H, H],
            [S, S, S, S, DS, S, S, S, S, S],
            [S, S, S, S, S, S, S, S, S, S], // A9
        ];
        let pairs: [[&[Action]; COLUMNS]; 10] = [
            [P, P, P, P, P, P, H, H, H, H], // 22
            [P, P, P, P, P, P, H, H, H, H],
            [H, H, H, P, P, H, H, H, H, H],
            [DH, DH, DH, DH, DH, DH, DH, DH, H, H],
            [P, P, P, P, P, H, H, H, H, H],
            [P, P, P, P, P, P, H, H, H, H],
            [P, P, P, P, P, P, P, P, P, RP],
            [P, P, P, P, P, S, P, P, S, S], // 99
            [S, S, S, S, S, S, S, S, S, S], // TT
            [P, P, P, P, P, P, P, P, P, P], // AA
        ];

        let mut table = StrategyTable::empty();
        let charts = hard.iter().chain(soft.iter()).chain(pairs.iter());
        for (row, chart) in charts.enumerate() {
            for (column, actions) in chart.iter().enumerate() {
                table.cells[row * COLUMNS + column] = Some(actions.to_vec());
            }
        }
        table
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<StrategyTable, StrategyError> {
        fs::read_to_string(path)?.parse()
    }

    /// The preference list of a cell, `None` when the cell is empty.
    pub fn get(&self, row: PlayerRow, column: DealerColumn) -> Option<&[Action]> {
        let index = row.index()? * COLUMNS + column.index();
        self.cells.get(index)?.as_deref()
    }

    /// Recommends an action for `hand` against the dealer's up-card. Looks up
    /// the hand's own row first and falls back to its hard total when that
    /// cell is empty or offers nothing legal.
    pub fn recommend(&self, hand: &Hand, dealer_upcard: &Hand, legal: ActionSet) -> Option<Action> {
        let column = DealerColumn::classify(dealer_upcard)?;
        let row = PlayerRow::classify(hand);
        let action = self
            .first_legal(row, column, legal)
            .or_else(|| self.first_legal(PlayerRow::Hard(hand.points()), column, legal));
        trace!(
            "strategy {} vs {}: {:?}",
            row.label(),
            column.label(),
            action
        );
        action
    }

    fn first_legal(&self, row: PlayerRow, column: DealerColumn, legal: ActionSet) -> Option<Action> {
        self.get(row, column)?
            .iter()
            .copied()
            .find(|action| legal.contains(*action))
    }
}

impl FromStr for StrategyTable {
    type Err = StrategyError;

    /// Parses the text format: a header line of dealer columns, then one line
    /// per player row holding the row label and one cell per column. A cell
    /// is a string of action letters; `-` or `.` leaves it empty. `#` starts a
    /// comment.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut lines = s
            .lines()
            .enumerate()
            .map(|(number, line)| (number + 1, line.split('#').next().unwrap_or("").trim()))
            .filter(|(_, line)| !line.is_empty());

        let (_, header) = lines.next().ok_or(StrategyError::MissingHeader)?;
        let mut columns = Vec::with_capacity(COLUMNS);
        for label in header.split_whitespace() {
            let column = DealerColumn::from_label(label)
                .ok_or_else(|| StrategyError::UnknownColumn(label.to_string()))?;
            if columns.contains(&column) {
                return Err(StrategyError::DuplicateColumn(label.to_string()));
            }
            columns.push(column);
        }

        let mut table = StrategyTable::empty();
        let mut seen = [false; ROWS];
        for (line, text) in lines {
            let mut fields = text.split_whitespace();
            let label = fields.next().unwrap_or_default();
            let unknown_row = || StrategyError::UnknownRow {
                line,
                label: label.to_string(),
            };
            let row = PlayerRow::from_label(label).ok_or_else(unknown_row)?;
            let index = row.index().ok_or_else(unknown_row)?;
            if seen[index] {
                return Err(StrategyError::DuplicateRow {
                    line,
                    label: label.to_string(),
                });
            }
            seen[index] = true;

            let cells: Vec<&str> = fields.collect();
            if cells.len() != columns.len() {
                return Err(StrategyError::RowWidth {
                    line,
                    expected: columns.len(),
                    found: cells.len(),
                });
            }
            for (column, cell) in columns.iter().zip(cells) {
                table.cells[index * COLUMNS + column.index()] = parse_cell(cell);
            }
        }
        Ok(table)
    }
}

// Unknown letters are dropped.
fn parse_cell(cell: &str) -> Option<Vec<Action>> {
    if cell == "-" || cell == "." {
        return None;
    }
    Some(cell.chars().filter_map(Action::from_letter).collect())
}
