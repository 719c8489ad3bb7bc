//! Reducing per-move scores to a recommended move.
//!
//! A recommender first keeps the scores no other score beats (the
//! "equivalent" set), then breaks the remaining tie. Strategies only supply a
//! comparison, a tie-break, and whatever per-evaluation state those need; the
//! set reduction is shared.

pub mod best_raw;
pub mod fuzzy_local;

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use crate::board::{Move, Position};
use crate::error::Result;
use crate::nn::Evaluation;
use crate::score::Score;

pub use best_raw::BestRawScoreRecommender;
pub use fuzzy_local::{FuzzyBestLocalInvariantRecommender, FuzzyState};

/// How two scores compare under a strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Relationship {
    FirstIsBetter,
    Equivalent,
    SecondIsBetter,
}

impl From<Ordering> for Relationship {
    /// `Greater` means the first is better.
    fn from(ordering: Ordering) -> Self {
        match ordering {
            Ordering::Greater => Relationship::FirstIsBetter,
            Ordering::Equal => Relationship::Equivalent,
            Ordering::Less => Relationship::SecondIsBetter,
        }
    }
}

/// Selectable strategies, for configuration files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecommenderKind {
    BestRaw,
    #[default]
    FuzzyLocal,
}

/// A pass score so bad that every play beats it.
pub fn avoid_passing_floor(dimension: usize) -> Score {
    Score::from_readable(
        Move::Pass,
        dimension,
        -f64::MAX / 2.0 + f64::MIN_POSITIVE,
        f64::MAX / 2.0 - f64::MIN_POSITIVE,
    )
}

/// A move-selection strategy over evaluations of `P`.
pub trait Recommender<P: Position> {
    /// Scratch data shared by all comparisons of one evaluation.
    type State;

    fn build_comparison_state(&self, evaluation: &Evaluation<P>) -> Self::State;

    fn compare_scores(&self, first: &Score, second: &Score, state: &mut Self::State) -> Relationship;

    /// True if `first` should give way to `second` when neither is better.
    fn does_first_lose_tie(
        &self,
        first: &Score,
        second: &Score,
        state: &mut Self::State,
    ) -> Result<bool>;

    /// The scores no other score beats, in input order.
    ///
    /// One pass: a candidate beaten by any kept score is dropped, kept scores
    /// it beats are removed, otherwise it joins.
    fn equivalent_among(&self, scores: &[Score], state: &mut Self::State) -> Vec<Score> {
        let mut best: Vec<Score> = Vec::new();
        for candidate in scores {
            let mut keep = true;
            let mut i = 0;
            while keep && i < best.len() {
                match self.compare_scores(candidate, &best[i], state) {
                    Relationship::SecondIsBetter => keep = false,
                    Relationship::FirstIsBetter => {
                        best.remove(i);
                    }
                    Relationship::Equivalent => i += 1,
                }
            }
            if keep {
                best.push(*candidate);
            }
        }
        best
    }

    /// Reduces a set to one score with the tie-break.
    fn break_tie(&self, scores: &[Score], state: &mut Self::State) -> Result<Option<Score>> {
        let mut best: Option<Score> = None;
        for score in scores {
            best = match best {
                Some(current) if !self.does_first_lose_tie(&current, score, state)? => Some(current),
                _ => Some(*score),
            };
        }
        Ok(best)
    }

    /// The best plays of `scores` that are no worse than `no_worse_than`.
    ///
    /// A play is dropped when `no_worse_than` compares better, and on an
    /// equivalent comparison when it loses the tie. The survivors are reduced
    /// to their equivalent set. With no survivor, only the pass scores remain.
    fn resolution_among(
        &self,
        scores: &[Score],
        no_worse_than: &Score,
        state: &mut Self::State,
    ) -> Result<Vec<Score>> {
        let mut plays = Vec::new();
        for score in scores.iter().filter(|s| !s.mv().is_pass()) {
            let keep = match self.compare_scores(score, no_worse_than, state) {
                Relationship::FirstIsBetter => true,
                Relationship::SecondIsBetter => false,
                Relationship::Equivalent => !self.does_first_lose_tie(score, no_worse_than, state)?,
            };
            if keep {
                plays.push(*score);
            }
        }
        if plays.is_empty() {
            return Ok(scores.iter().filter(|s| s.mv().is_pass()).copied().collect());
        }
        Ok(self.equivalent_among(&plays, state))
    }

    fn recommend_equivalent_game_plays(&self, evaluation: &Evaluation<P>) -> Result<Vec<Score>> {
        let mut state = self.build_comparison_state(evaluation);
        Ok(self.equivalent_among(&evaluation.all_scores()?, &mut state))
    }

    /// The single recommended move; `None` only if nothing is legal.
    fn recommend_game_play(&self, evaluation: &Evaluation<P>) -> Result<Option<Score>> {
        let mut state = self.build_comparison_state(evaluation);
        let best = self.equivalent_among(&evaluation.all_scores()?, &mut state);
        self.break_tie(&best, &mut state)
    }

    fn recommend_equivalent_resolution_plays(
        &self,
        evaluation: &Evaluation<P>,
        no_worse_than: &Score,
    ) -> Result<Vec<Score>> {
        let mut state = self.build_comparison_state(evaluation);
        self.resolution_among(&evaluation.all_scores()?, no_worse_than, &mut state)
    }

    /// A play no worse than `no_worse_than`, or a pass if there is none.
    fn recommend_resolution_play(
        &self,
        evaluation: &Evaluation<P>,
        no_worse_than: &Score,
    ) -> Result<Option<Score>> {
        let mut state = self.build_comparison_state(evaluation);
        let resolutions = self.resolution_among(&evaluation.all_scores()?, no_worse_than, &mut state)?;
        self.break_tie(&resolutions, &mut state)
    }

    /// The best play; a pass only when no play is legal.
    fn recommend_game_play_avoiding_pass(&self, evaluation: &Evaluation<P>) -> Result<Option<Score>> {
        self.recommend_resolution_play(evaluation, &avoid_passing_floor(evaluation.dimension()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ordering_maps_to_relationship() {
        assert_eq!(Relationship::from(Ordering::Greater), Relationship::FirstIsBetter);
        assert_eq!(Relationship::from(Ordering::Equal), Relationship::Equivalent);
        assert_eq!(Relationship::from(Ordering::Less), Relationship::SecondIsBetter);
    }

    #[test]
    fn avoid_passing_floor_is_extreme() {
        let floor = avoid_passing_floor(9);
        assert!(floor.mv().is_pass());
        assert!(floor.readable_result() < -1e300);
        assert!(floor.readable_result().is_finite());
    }

    #[test]
    fn kind_names_in_config() {
        let kind: RecommenderKind = serde_json::from_str("\"best_raw\"").unwrap();
        assert_eq!(kind, RecommenderKind::BestRaw);
        assert_eq!(RecommenderKind::default(), RecommenderKind::FuzzyLocal);
    }
}
