//! Per-move value estimates.
//!
//! A `Score` keeps the network's raw outputs next to "readable" values: the
//! raw values scaled by the board area and snapped to quarter points. Equality
//! and hashing only look at the move and the readable values, since raw values
//! carry floating-point noise.

use std::fmt;
use std::hash::{Hash, Hasher};

use crate::board::Move;

/// An immutable value estimate for one move.
#[derive(Debug, Clone, Copy)]
pub struct Score {
    mv: Move,
    area: f64,
    raw_player: f64,
    raw_opponent: f64,
    readable_player: f64,
    readable_opponent: f64,
}

#[inline]
fn board_area(dimension: usize) -> f64 {
    (dimension * dimension) as f64
}

/// Snaps `raw * area` onto quarter points.
///
/// The fraction above the floor is bucketed by eighths: below 1/8 rounds
/// down, below 3/8 to .25, below 5/8 to .5, below 7/8 to .75, else up.
fn to_readable(raw: f64, area: f64) -> f64 {
    let scaled = raw * area;
    let floor = scaled.floor();
    let remainder = scaled - floor;
    let offset = (remainder * 8.0).floor() as i64;
    let fraction = if offset < 1 {
        0.0
    } else if offset < 3 {
        0.25
    } else if offset < 5 {
        0.5
    } else if offset < 7 {
        0.75
    } else {
        1.0
    };
    floor + fraction
}

fn to_raw(readable: f64, area: f64) -> f64 {
    readable * (1.0 / area)
}

/// How far `raw` lies from its snapped-and-unsnapped round trip.
fn distance_from_rounded(raw: f64, area: f64) -> f64 {
    (raw - to_raw(to_readable(raw, area), area)).abs()
}

/// Two raw values are equivalent if they are closer to each other than at
/// least one of them is to its own rounded value.
fn are_equivalent(a: f64, b: f64, area_a: f64, area_b: f64) -> bool {
    let between = (a - b).abs();
    between < distance_from_rounded(a, area_a) || between < distance_from_rounded(b, area_b)
}

impl Score {
    /// Builds a score from network outputs for a board of `dimension`.
    pub fn from_raw(mv: Move, dimension: usize, raw_player: f64, raw_opponent: f64) -> Score {
        let area = board_area(dimension);
        Score {
            mv,
            area,
            raw_player,
            raw_opponent,
            readable_player: to_readable(raw_player, area),
            readable_opponent: to_readable(raw_opponent, area),
        }
    }

    /// Builds a score from readable values, which are stored exactly.
    pub fn from_readable(
        mv: Move,
        dimension: usize,
        readable_player: f64,
        readable_opponent: f64,
    ) -> Score {
        let area = board_area(dimension);
        Score {
            mv,
            area,
            raw_player: to_raw(readable_player, area),
            raw_opponent: to_raw(readable_opponent, area),
            readable_player,
            readable_opponent,
        }
    }

    pub fn mv(&self) -> Move {
        self.mv
    }

    /// Board width this score was built for.
    pub fn dimension(&self) -> usize {
        self.area.sqrt().round() as usize
    }

    pub fn raw_player(&self) -> f64 {
        self.raw_player
    }

    pub fn raw_opponent(&self) -> f64 {
        self.raw_opponent
    }

    pub fn readable_player(&self) -> f64 {
        self.readable_player
    }

    pub fn readable_opponent(&self) -> f64 {
        self.readable_opponent
    }

    pub fn raw_result(&self) -> f64 {
        self.raw_player - self.raw_opponent
    }

    pub fn readable_result(&self) -> f64 {
        self.readable_player - self.readable_opponent
    }

    /// The same move seen from the other side of the board.
    pub fn invert(&self) -> Score {
        Score::from_raw(self.mv, self.dimension(), self.raw_opponent, self.raw_player)
    }

    /// Replaces the raw values with the ones implied by the readable values.
    pub fn tidy_raws(&self) -> Score {
        Score::from_readable(
            self.mv,
            self.dimension(),
            self.readable_player,
            self.readable_opponent,
        )
    }

    /// Returns the same values attached to another move.
    pub fn with_move(&self, mv: Move) -> Score {
        Score::from_raw(mv, self.dimension(), self.raw_player, self.raw_opponent)
    }

    /// True if both raw values are within rounding noise of `other`'s.
    pub fn is_outcome_similar_to(&self, other: &Score) -> bool {
        are_equivalent(self.raw_player, other.raw_player, self.area, other.area)
            && are_equivalent(self.raw_opponent, other.raw_opponent, self.area, other.area)
    }
}

impl PartialEq for Score {
    fn eq(&self, other: &Self) -> bool {
        self.mv == other.mv
            && self.readable_player == other.readable_player
            && self.readable_opponent == other.readable_opponent
    }
}

impl Eq for Score {}

impl Hash for Score {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.mv.hash(state);
        // Adding zero folds -0.0 into 0.0 so equal values hash alike.
        (self.readable_player + 0.0).to_bits().hash(state);
        (self.readable_opponent + 0.0).to_bits().hash(state);
    }
}

impl fmt::Display for Score {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Score {{ move: {}, result: {:+.2}, player: {:+.2}, opponent: {:+.2}, raw player: {:+.6}, raw opponent: {:+.6} }}",
            self.mv,
            self.readable_result(),
            self.readable_player,
            self.readable_opponent,
            self.raw_player,
            self.raw_opponent
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const AREA_9: f64 = 81.0;

    #[test]
    fn bucket_thresholds() {
        let cases = [
            (0.0, 0.0),
            (0.124, 0.0),
            (0.125, 0.25),
            (0.374, 0.25),
            (0.375, 0.5),
            (0.624, 0.5),
            (0.625, 0.75),
            (0.874, 0.75),
            (0.875, 1.0),
            (2.9, 3.0),
            (-0.1, 0.0),
            (-0.2, -0.25),
            (-0.9, -1.0),
        ];
        for (scaled, expected) in cases {
            assert_eq!(to_readable(scaled, 1.0), expected, "scaled {}", scaled);
        }
    }

    #[test]
    fn raw_scaled_by_area() {
        let score = Score::from_raw(Move::play(1, 1), 9, 10.3 / AREA_9, -2.1 / AREA_9);
        assert_eq!(score.readable_player(), 10.25);
        assert_eq!(score.readable_opponent(), -2.0);
        assert_eq!(score.readable_result(), 12.25);
        assert_eq!(score.dimension(), 9);
    }

    #[test]
    fn readable_values_read_back_exactly() {
        let score = Score::from_readable(Move::Pass, 19, 3.75, -12.5);
        assert_eq!(score.readable_player(), 3.75);
        assert_eq!(score.readable_opponent(), -12.5);
        assert_eq!(score.mv(), Move::Pass);
    }

    #[test]
    fn equality_ignores_raw_noise() {
        let a = Score::from_raw(Move::play(2, 3), 9, 0.1, 0.2);
        let b = Score::from_raw(Move::play(2, 3), 9, 0.1 + 1e-15, 0.2);
        assert_eq!(a, b);
        let c = Score::from_raw(Move::play(3, 2), 9, 0.1, 0.2);
        assert_ne!(a, c);
    }

    #[test]
    fn invert_swaps_sides() {
        let score = Score::from_raw(Move::Pass, 9, 0.5, -0.25);
        let inverted = score.invert();
        assert_eq!(inverted.raw_player(), -0.25);
        assert_eq!(inverted.raw_opponent(), 0.5);
        assert_eq!(inverted.invert(), score);
    }

    #[test]
    fn tidy_raws_lands_on_the_grid() {
        let score = Score::from_raw(Move::Pass, 9, 0.0371, 0.0);
        let tidy = score.tidy_raws();
        assert_eq!(tidy, score);
        assert!(distance_from_rounded(tidy.raw_player(), AREA_9) < 1e-12);
    }

    #[test]
    fn outcome_similarity_tolerates_noise() {
        let a = Score::from_raw(Move::play(1, 1), 9, 0.0371, -0.0213);
        let b = Score::from_raw(Move::play(1, 1), 9, 0.0371 + 1e-14, -0.0213 - 1e-14);
        assert!(a.is_outcome_similar_to(&b));
        assert!(b.is_outcome_similar_to(&a));

        let far = Score::from_raw(Move::play(1, 1), 9, 0.5, -0.0213);
        assert!(!a.is_outcome_similar_to(&far));
        assert!(!far.is_outcome_similar_to(&a));
    }

    #[test]
    fn outcome_similarity_is_symmetric() {
        let raws = [-0.3, -0.0123, 0.0, 0.001, 0.0031, 0.0032, 0.25, 0.2501];
        for &p1 in &raws {
            for &p2 in &raws {
                let a = Score::from_raw(Move::Pass, 5, p1, p2);
                let b = Score::from_raw(Move::Pass, 5, p2, p1);
                assert_eq!(a.is_outcome_similar_to(&b), b.is_outcome_similar_to(&a));
            }
        }
    }

    #[test]
    fn exact_grid_values_are_not_similar_to_neighbors() {
        let a = Score::from_readable(Move::Pass, 9, 1.0, 0.0);
        let b = Score::from_readable(Move::Pass, 9, 1.25, 0.0);
        assert!(!a.is_outcome_similar_to(&b));
    }
}
