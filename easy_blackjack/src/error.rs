use std::io;

use thiserror::Error;

use crate::{Action, ActionSet, RoundPhase};

#[derive(Debug, Error, PartialEq)]
pub enum RoundError {
    #[error("the shoe ran out of cards")]
    ShoeExhausted,
    #[error("{action:?} is not allowed for this hand, allowed actions: {legal}")]
    IllegalAction { action: Action, legal: ActionSet },
    #[error("{operation} is only allowed in {expected:?} phase, round is in {actual:?} phase")]
    WrongPhase {
        operation: &'static str,
        expected: RoundPhase,
        actual: RoundPhase,
    },
    #[error("no hand is waiting for a decision")]
    NoCurrentHand,
}

#[derive(Debug, Error)]
pub enum ShoeError {
    #[error("unknown card symbol `{0}`")]
    UnknownCard(String),
    #[error("cannot access shoe file: {0}")]
    Io(#[from] io::Error),
}

#[derive(Debug, Error)]
pub enum StrategyError {
    #[error("cannot read strategy file: {0}")]
    Io(#[from] io::Error),
    #[error("strategy table has no header line")]
    MissingHeader,
    #[error("unknown dealer column `{0}`")]
    UnknownColumn(String),
    #[error("dealer column `{0}` appears twice")]
    DuplicateColumn(String),
    #[error("line {line}: unknown player row `{label}`")]
    UnknownRow { line: usize, label: String },
    #[error("line {line}: player row `{label}` appears twice")]
    DuplicateRow { line: usize, label: String },
    #[error("line {line}: expected {expected} cells, found {found}")]
    RowWidth {
        line: usize,
        expected: usize,
        found: usize,
    },
}
