//! The interface the evaluator, hasher, and recommenders consume.
//!
//! A rules engine only has to answer these questions; everything else about
//! the game (scoring, SGF, game records) stays on its side.

use std::fmt;

use super::point::{Coordinate, Intersection, Move, Player};
use crate::error::Result;

/// A connected group of stones of one color.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Group {
    pub owner: Player,
    /// Member points in row-major order.
    pub members: Vec<Coordinate>,
    /// Number of distinct empty points adjacent to the group.
    pub liberties: usize,
}

/// A Go position as seen by the core.
///
/// Implementations are immutable snapshots: `play` and `pass` return the next
/// position and leave `self` untouched. They are shared across the
/// evaluator's worker threads, hence `Send + Sync`.
pub trait Position: Clone + fmt::Display + Send + Sync {
    /// Board width (the board is square).
    fn dimension(&self) -> usize;

    fn is_finished(&self) -> bool;

    /// The player to move, or `None` once the game is finished.
    fn current_player(&self) -> Option<Player>;

    fn get(&self, coordinate: Coordinate) -> Intersection;

    /// Every legal move for the current player, pass included. Empty once the
    /// game is finished.
    fn legal_moves(&self) -> Vec<Move>;

    /// True if passing now would end the game.
    fn would_pass_end_game(&self) -> bool;

    fn groups(&self) -> Vec<Group>;

    fn play(&self, mv: Move) -> Result<Self>;

    fn pass(&self) -> Result<Self> {
        self.play(Move::Pass)
    }

    /// The position before the last move, or `None` at the start of the game.
    fn previous_state(&self) -> Option<Self>;

    /// The move that produced this position, or `None` at the start.
    fn previous_move(&self) -> Option<Move>;
}
