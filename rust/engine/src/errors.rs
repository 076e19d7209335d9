use thiserror::Error;

use crate::action::PlayerActionKind;
use crate::cards::Card;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum GameError {
    #[error("Illegal action: {0}")]
    IllegalAction(#[from] ActionError),
    #[error("Insufficient chips: requested {requested}, available {available}")]
    InsufficientChips { requested: u64, available: u64 },
    #[error("Deck exhausted")]
    DeckExhausted,
    #[error("Card holder is full (capacity {capacity})")]
    HolderFull { capacity: usize },
    #[error("Card {0} is already held")]
    DuplicateCard(Card),
    #[error("At least 5 cards are needed to rank a hand, got {available}")]
    NotEnoughCards { available: usize },
    #[error("No hand in progress")]
    NoHandInProgress,
    #[error("A hand is already in progress")]
    HandInProgress,
    #[error("Table is full ({max} players)")]
    TableFull { max: usize },
    #[error("At least 2 players with chips are needed, got {available}")]
    NotEnoughPlayers { available: usize },
    #[error("Unknown player: {0}")]
    UnknownPlayer(String),
    #[error("Player {0} is already seated")]
    DuplicatePlayer(String),
    #[error("Invalid settings: {0}")]
    InvalidSettings(String),
}

/// Reasons a betting action is refused. None of them change engine state.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ActionError {
    #[error("it is {expected}'s turn, not {actual}'s")]
    NotPlayersTurn { expected: String, actual: String },
    #[error("{kind} is not allowed after {after}")]
    OutOfOrder {
        kind: PlayerActionKind,
        after: PlayerActionKind,
    },
    #[error("{0} does not carry a chip amount")]
    AmountNotAllowed(PlayerActionKind),
    #[error("cannot check when facing a bet of {to_call}")]
    CheckFacingBet { to_call: u64 },
    #[error("raise of {amount} is below the minimum of {minimum}")]
    RaiseTooSmall { amount: u64, minimum: u64 },
    #[error("raise requires a chip amount")]
    MissingAmount,
    #[error("player {0} is not active in this hand")]
    PlayerNotActive(String),
}
