//! Hoshi: a symmetry-aware Go position evaluator.
//!
//! A randomly initialized convolutional network scores every legal move of a
//! position, a canonical hash identifies positions that are equal up to board
//! symmetry and color swap, converters carry moves between such positions,
//! and recommenders pick a move from near-equal scores deterministically.
//!
//! The `board` module holds the `Position` interface the core consumes and a
//! small reference rules engine; `selfplay` drives whole games with it.

pub mod board;
pub mod error;
pub mod nn;
pub mod recommend;
pub mod score;
pub mod selfplay;
pub mod symmetry;

pub use error::{Error, Result};
pub use score::Score;
