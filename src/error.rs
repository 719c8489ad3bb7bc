//! Crate-wide error type.
//!
//! Construction errors are fatal for the given parameters; illegal moves and
//! incomparable positions are caller bugs. Nothing here is retried internally.

use crate::board::Move;

/// Errors produced while building evaluators, evaluating positions, playing
/// moves on the reference board, or converting between orientations.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum Error {
    #[error("board size must be between 1 and 19 inclusive, but was {0}")]
    InvalidBoardSize(usize),

    #[error("channel count must be at least 1, but was {0}")]
    InvalidChannels(usize),

    #[error("evaluator expects {expected}x{expected} positions, got {actual}x{actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("a network of {parameters} parameters cannot be allocated; lower the layer or channel count")]
    TopologyTooLarge { parameters: usize },

    #[error("failed to build a {threads}-thread pool: {reason}")]
    ThreadPool { threads: usize, reason: String },

    #[error("{0} is not a legal move in this position")]
    IllegalMove(Move),

    #[error("a finished position cannot be evaluated")]
    FinishedPosition,

    #[error("coordinate ({column}, {row}) is off a {dimension}x{dimension} board")]
    OffBoard {
        column: usize,
        row: usize,
        dimension: usize,
    },

    #[error("converters only relate equivalent positions, but got {start} and {end}")]
    IncomparablePositions { start: String, end: String },

    #[error("evaluation failed ({reason}) for position:\n{position}")]
    Internal { reason: String, position: String },

    #[error("failed to write game records: {0}")]
    Output(String),
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Output(err.to_string())
    }
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;
