//! The eight symmetries of a square board.

use std::fmt;

use crate::board::{Coordinate, Move};

/// A board symmetry acting on 1-indexed `(column, row)` coordinates.
///
/// Variant `k` maps a point to the same place that canonical-hash variant `k`
/// writes it, so a hash's canonical index (mod 8) names the transform that
/// takes the original position to the canonical one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Transform {
    Identity,
    FlipHorizontally,
    FlipVertically,
    FlipBoth,
    UpperLeftDiagonal,
    RotateLeft,
    RotateRight,
    UpperRightDiagonal,
}

/// `COMPOSITION[a][b]` is the transform taking a position whose canonical
/// index is `a` onto an equivalent position whose canonical index is `b`:
/// first `a`, then the inverse of `b`. Indices 8..16 are color-inverted
/// variants; inverting colors never moves a stone, so they repeat 0..8.
pub const COMPOSITION: [[u8; 16]; 16] = [
    [0, 1, 2, 3, 4, 6, 5, 7, 0, 1, 2, 3, 4, 6, 5, 7],
    [1, 0, 3, 2, 6, 4, 7, 5, 1, 0, 3, 2, 6, 4, 7, 5],
    [2, 3, 0, 1, 5, 7, 4, 6, 2, 3, 0, 1, 5, 7, 4, 6],
    [3, 2, 1, 0, 7, 5, 6, 4, 3, 2, 1, 0, 7, 5, 6, 4],
    [4, 5, 6, 7, 0, 2, 1, 3, 4, 5, 6, 7, 0, 2, 1, 3],
    [5, 4, 7, 6, 2, 0, 3, 1, 5, 4, 7, 6, 2, 0, 3, 1],
    [6, 7, 4, 5, 1, 3, 0, 2, 6, 7, 4, 5, 1, 3, 0, 2],
    [7, 6, 5, 4, 3, 1, 2, 0, 7, 6, 5, 4, 3, 1, 2, 0],
    [0, 1, 2, 3, 4, 6, 5, 7, 0, 1, 2, 3, 4, 6, 5, 7],
    [1, 0, 3, 2, 6, 4, 7, 5, 1, 0, 3, 2, 6, 4, 7, 5],
    [2, 3, 0, 1, 5, 7, 4, 6, 2, 3, 0, 1, 5, 7, 4, 6],
    [3, 2, 1, 0, 7, 5, 6, 4, 3, 2, 1, 0, 7, 5, 6, 4],
    [4, 5, 6, 7, 0, 2, 1, 3, 4, 5, 6, 7, 0, 2, 1, 3],
    [5, 4, 7, 6, 2, 0, 3, 1, 5, 4, 7, 6, 2, 0, 3, 1],
    [6, 7, 4, 5, 1, 3, 0, 2, 6, 7, 4, 5, 1, 3, 0, 2],
    [7, 6, 5, 4, 3, 1, 2, 0, 7, 6, 5, 4, 3, 1, 2, 0],
];

impl Transform {
    pub const ALL: [Transform; 8] = [
        Transform::Identity,
        Transform::FlipHorizontally,
        Transform::FlipVertically,
        Transform::FlipBoth,
        Transform::UpperLeftDiagonal,
        Transform::RotateLeft,
        Transform::RotateRight,
        Transform::UpperRightDiagonal,
    ];

    pub const fn index(self) -> usize {
        self as usize
    }

    /// The transform at `index % 8`.
    pub const fn from_index(index: usize) -> Transform {
        Transform::ALL[index % 8]
    }

    /// The transform relating canonical indices `start` and `end`.
    pub const fn between(start: usize, end: usize) -> Transform {
        Transform::from_index(COMPOSITION[start % 16][end % 16] as usize)
    }

    /// Maps a point of a `dimension`-wide board.
    pub const fn apply(self, coordinate: Coordinate, dimension: usize) -> Coordinate {
        let c = coordinate.column();
        let r = coordinate.row();
        let (column, row) = match self {
            Transform::Identity => (c, r),
            Transform::FlipHorizontally => (dimension - c + 1, r),
            Transform::FlipVertically => (c, dimension - r + 1),
            Transform::FlipBoth => (dimension - c + 1, dimension - r + 1),
            Transform::UpperLeftDiagonal => (r, c),
            Transform::RotateLeft => (dimension - r + 1, c),
            Transform::RotateRight => (r, dimension - c + 1),
            Transform::UpperRightDiagonal => (dimension - r + 1, dimension - c + 1),
        };
        Coordinate::new(column, row)
    }

    /// Maps a move; pass maps to pass.
    pub const fn apply_move(self, mv: Move, dimension: usize) -> Move {
        match mv {
            Move::Play(coordinate) => Move::Play(self.apply(coordinate, dimension)),
            Move::Pass => Move::Pass,
        }
    }

    /// The transform that undoes this one.
    pub const fn inverse(self) -> Transform {
        match self {
            Transform::RotateLeft => Transform::RotateRight,
            Transform::RotateRight => Transform::RotateLeft,
            other => other,
        }
    }
}

impl fmt::Display for Transform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Transform::Identity => "identity",
            Transform::FlipHorizontally => "flip horizontally",
            Transform::FlipVertically => "flip vertically",
            Transform::FlipBoth => "flip both",
            Transform::UpperLeftDiagonal => "flip along upper-left diagonal",
            Transform::RotateLeft => "rotate left",
            Transform::RotateRight => "rotate right",
            Transform::UpperRightDiagonal => "flip along upper-right diagonal",
        };
        f.write_str(name)
    }
}
