//! Highest raw result wins.

use super::{Recommender, Relationship};
use crate::board::Position;
use crate::error::Result;
use crate::nn::Evaluation;
use crate::score::Score;

/// Compares raw results, then raw player values, then prefers a play over a
/// pass. Never breaks ties, so the first equivalent score is kept.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BestRawScoreRecommender;

impl<P: Position> Recommender<P> for BestRawScoreRecommender {
    type State = ();

    fn build_comparison_state(&self, _evaluation: &Evaluation<P>) {}

    fn compare_scores(&self, first: &Score, second: &Score, _state: &mut ()) -> Relationship {
        let ordering = first
            .raw_result()
            .total_cmp(&second.raw_result())
            .then_with(|| first.raw_player().total_cmp(&second.raw_player()))
            // A play beats a pass.
            .then_with(|| second.mv().is_pass().cmp(&first.mv().is_pass()));
        Relationship::from(ordering)
    }

    fn does_first_lose_tie(&self, _first: &Score, _second: &Score, _state: &mut ()) -> Result<bool> {
        Ok(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::{Game, Move};

    fn compare(first: &Score, second: &Score) -> Relationship {
        <BestRawScoreRecommender as Recommender<Game>>::compare_scores(
            &BestRawScoreRecommender,
            first,
            second,
            &mut (),
        )
    }

    fn best(scores: &[Score]) -> Option<Score> {
        let recommender = BestRawScoreRecommender;
        let set = Recommender::<Game>::equivalent_among(&recommender, scores, &mut ());
        Recommender::<Game>::break_tie(&recommender, &set, &mut ()).unwrap()
    }

    #[test]
    fn tiny_raw_differences_count() {
        let low = Score::from_raw(Move::play(1, 1), 9, 0.5, 0.0);
        let high = Score::from_raw(Move::play(2, 2), 9, 0.5 + 1e-12, 0.0);
        assert_eq!(compare(&high, &low), Relationship::FirstIsBetter);
        assert_eq!(best(&[low, high]).map(|s| s.mv()), Some(Move::play(2, 2)));
        assert_eq!(best(&[high, low]).map(|s| s.mv()), Some(Move::play(2, 2)));
    }

    #[test]
    fn raw_player_breaks_equal_results() {
        let a = Score::from_raw(Move::play(1, 1), 9, 0.3, 0.1);
        let b = Score::from_raw(Move::play(1, 2), 9, 0.4, 0.2);
        assert_eq!(compare(&a, &b), Relationship::SecondIsBetter);
    }

    #[test]
    fn play_beats_pass_on_exact_ties() {
        let play = Score::from_raw(Move::play(3, 3), 9, 0.25, 0.0);
        let pass = Score::from_raw(Move::Pass, 9, 0.25, 0.0);
        assert_eq!(compare(&play, &pass), Relationship::FirstIsBetter);
        assert_eq!(compare(&pass, &play), Relationship::SecondIsBetter);
        assert_eq!(best(&[pass, play]).map(|s| s.mv()), Some(Move::play(3, 3)));
    }

    #[test]
    fn equal_plays_keep_the_first() {
        let a = Score::from_raw(Move::play(1, 1), 9, 0.25, 0.0);
        let b = Score::from_raw(Move::play(5, 5), 9, 0.25, 0.0);
        assert_eq!(compare(&a, &b), Relationship::Equivalent);
        assert_eq!(best(&[a, b]).map(|s| s.mv()), Some(Move::play(1, 1)));
    }

    #[test]
    fn resolution_keeps_plays_no_worse_than_the_floor() {
        let recommender = BestRawScoreRecommender;
        let play = Score::from_raw(Move::play(3, 3), 9, 0.1, 0.0);
        let pass = Score::from_raw(Move::Pass, 9, 0.1, 0.0);
        let resolve = |floor: &Score| {
            Recommender::<Game>::resolution_among(&recommender, &[play, pass], floor, &mut ()).unwrap()
        };

        assert_eq!(resolve(&Score::from_raw(Move::Pass, 9, 0.05, 0.0)), vec![play]);
        // An equal play beats the pass floor.
        assert_eq!(resolve(&pass), vec![play]);
        // Nothing beats a high floor, so only the pass is left.
        assert_eq!(resolve(&Score::from_raw(Move::Pass, 9, 0.9, 0.0)), vec![pass]);
    }
}
