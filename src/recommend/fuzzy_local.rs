//! Rounding-tolerant comparison with a local, symmetry-invariant tie-break.

use std::collections::HashMap;

use super::{Recommender, Relationship};
use crate::board::{Coordinate, Move, Position};
use crate::error::Result;
use crate::nn::Evaluation;
use crate::score::Score;
use crate::symmetry::CanonicalHash;

/// Treats scores within rounding noise of each other as equal, then prefers
/// a pass, then the play closest to the last stone played. Remaining ties go
/// to the move whose resulting position has the smaller canonical hash, so
/// the choice does not depend on how the board is oriented.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FuzzyBestLocalInvariantRecommender;

/// Per-evaluation memo of distances and resulting hashes.
#[derive(Debug, Clone)]
pub struct FuzzyState<P: Position> {
    position: P,
    last_play: Option<Coordinate>,
    distances: HashMap<Move, i64>,
    hashes: HashMap<Move, CanonicalHash>,
}

impl<P: Position> FuzzyState<P> {
    pub fn new(position: P) -> Self {
        let last_play = last_play(&position);
        FuzzyState {
            position,
            last_play,
            distances: HashMap::new(),
            hashes: HashMap::new(),
        }
    }

    /// The most recent non-pass move, if any.
    pub fn last_play(&self) -> Option<Coordinate> {
        self.last_play
    }

    /// Squared distance from the last play; 0 for a pass or with no history.
    pub fn distance_from_last_play(&mut self, mv: Move) -> i64 {
        let (Some(last), Move::Play(coordinate)) = (self.last_play, mv) else {
            return 0;
        };
        *self.distances.entry(mv).or_insert_with(|| {
            let dc = coordinate.column() as i64 - last.column() as i64;
            let dr = coordinate.row() as i64 - last.row() as i64;
            dc * dc + dr * dr
        })
    }

    /// Canonical hash of the position after `mv`.
    pub fn hash_after(&mut self, mv: Move) -> Result<&CanonicalHash> {
        if !self.hashes.contains_key(&mv) {
            let next = self.position.play(mv)?;
            self.hashes.insert(mv, CanonicalHash::of(&next));
        }
        Ok(&self.hashes[&mv])
    }
}

fn last_play<P: Position>(position: &P) -> Option<Coordinate> {
    let mut cursor = position.clone();
    loop {
        match cursor.previous_move()? {
            Move::Play(coordinate) => return Some(coordinate),
            Move::Pass => cursor = cursor.previous_state()?,
        }
    }
}

impl<P: Position> Recommender<P> for FuzzyBestLocalInvariantRecommender {
    type State = FuzzyState<P>;

    fn build_comparison_state(&self, evaluation: &Evaluation<P>) -> FuzzyState<P> {
        FuzzyState::new(evaluation.position().clone())
    }

    fn compare_scores(&self, first: &Score, second: &Score, state: &mut FuzzyState<P>) -> Relationship {
        let mut ordering = std::cmp::Ordering::Equal;
        if !first.is_outcome_similar_to(second) {
            ordering = first
                .readable_result()
                .total_cmp(&second.readable_result())
                .then_with(|| first.readable_player().total_cmp(&second.readable_player()));
        }
        // A pass beats a play.
        ordering = ordering.then_with(|| first.mv().is_pass().cmp(&second.mv().is_pass()));
        let ordering = ordering.then_with(|| {
            let first_distance = state.distance_from_last_play(first.mv());
            let second_distance = state.distance_from_last_play(second.mv());
            second_distance.cmp(&first_distance)
        });
        Relationship::from(ordering)
    }

    fn does_first_lose_tie(
        &self,
        first: &Score,
        second: &Score,
        state: &mut FuzzyState<P>,
    ) -> Result<bool> {
        let first_hash = state.hash_after(first.mv())?.canonical().clone();
        let second_hash = state.hash_after(second.mv())?;
        Ok(first_hash > *second_hash.canonical())
    }
}
