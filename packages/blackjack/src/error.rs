use thiserror::Error;

/// Why an action cannot be taken on a hand right now.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Unavailable {
    #[error("hand is already finished")]
    HandLocked,
    #[error("only allowed on the hand's first decision")]
    NotFirstTurn,
    #[error("not enough funds")]
    InsufficientFunds,
    #[error("cards do not share a rank")]
    NotAPair,
    #[error("already holding the maximum of {0} hands")]
    MaxHands(usize),
    #[error("surrender is not allowed at this table")]
    SurrenderDisabled,
}

#[derive(Error, Debug)]
pub enum Error {
    #[error("Invalid rules: {0}")]
    InvalidRules(String),
    #[error("Table is full: at most {0} players")]
    TableFull(usize),
    #[error("Insufficient funds: need {needed}, have {available}")]
    InsufficientFunds { needed: f64, available: f64 },
    #[error("Invalid bet: {0}")]
    InvalidBet(u64),
    #[error("Action unavailable: {0}")]
    ActionUnavailable(Unavailable),
    #[error("No player at index {0}")]
    UnknownPlayer(usize),
    #[error("No hand at index {0}")]
    UnknownHand(usize),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
