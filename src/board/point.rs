//! Players, intersection contents, coordinates, and moves.

use std::fmt;

use serde::{Deserialize, Serialize};

/// One of the two players.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Player {
    Black,
    White,
}

impl Player {
    /// Returns the other player.
    pub const fn opposite(self) -> Player {
        match self {
            Player::Black => Player::White,
            Player::White => Player::Black,
        }
    }
}

impl fmt::Display for Player {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Player::Black => write!(f, "Black"),
            Player::White => write!(f, "White"),
        }
    }
}

/// The content of a single board intersection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Intersection {
    Empty,
    Stone(Player),
    /// Empty but unplayable for the next move only (a ko point).
    TemporarilyUnplayable,
    /// Never playable for the rest of the game.
    PermanentlyUnplayable,
}

impl Intersection {
    /// Swaps stone colors; every other value is unchanged.
    pub const fn inverted(self) -> Intersection {
        match self {
            Intersection::Stone(player) => Intersection::Stone(player.opposite()),
            other => other,
        }
    }

    /// Returns the board character used by `Display` impls.
    pub const fn symbol(self) -> char {
        match self {
            Intersection::Empty => '.',
            Intersection::Stone(Player::Black) => 'X',
            Intersection::Stone(Player::White) => 'O',
            Intersection::TemporarilyUnplayable => '*',
            Intersection::PermanentlyUnplayable => '#',
        }
    }
}

impl From<Player> for Intersection {
    fn from(player: Player) -> Self {
        Intersection::Stone(player)
    }
}

/// A board point using 1-indexed `(column, row)` coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Coordinate {
    // Field order gives row-major ordering.
    row: usize,
    column: usize,
}

impl Coordinate {
    /// Creates a coordinate. Both values are 1-indexed.
    pub const fn new(column: usize, row: usize) -> Self {
        Coordinate { row, column }
    }

    pub const fn column(self) -> usize {
        self.column
    }

    pub const fn row(self) -> usize {
        self.row
    }

    /// Zero-based `(row, column)` grid indices.
    pub const fn grid_index(self) -> (usize, usize) {
        (self.row - 1, self.column - 1)
    }

    /// Returns true if the coordinate lies on a board of the given dimension.
    pub const fn is_on_board(self, dimension: usize) -> bool {
        self.column >= 1 && self.row >= 1 && self.column <= dimension && self.row <= dimension
    }

    /// Iterates over every point of a board in row-major order.
    pub fn all(dimension: usize) -> impl Iterator<Item = Coordinate> {
        (1..=dimension).flat_map(move |row| (1..=dimension).map(move |column| Coordinate::new(column, row)))
    }

    /// Orthogonal neighbours that lie on the board.
    pub fn neighbors(self, dimension: usize) -> impl Iterator<Item = Coordinate> {
        let Coordinate { row, column } = self;
        [
            (column, row.wrapping_sub(1)),
            (column + 1, row),
            (column, row + 1),
            (column.wrapping_sub(1), row),
        ]
        .into_iter()
        .map(|(c, r)| Coordinate::new(c, r))
        .filter(move |c| c.is_on_board(dimension))
    }
}

impl fmt::Display for Coordinate {
    /// Column letters skip `I`, as on printed boards.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        const LETTERS: &[u8] = b"ABCDEFGHJKLMNOPQRSTUVWXYZ";
        match LETTERS.get(self.column.wrapping_sub(1)) {
            Some(&letter) => write!(f, "{}{}", letter as char, self.row),
            None => write!(f, "({},{})", self.column, self.row),
        }
    }
}

/// A move: a stone placed on an intersection, or a pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Move {
    Play(Coordinate),
    Pass,
}

impl Move {
    /// Shorthand for `Move::Play(Coordinate::new(column, row))`.
    pub const fn play(column: usize, row: usize) -> Move {
        Move::Play(Coordinate::new(column, row))
    }

    pub const fn is_pass(self) -> bool {
        matches!(self, Move::Pass)
    }

    pub const fn coordinate(self) -> Option<Coordinate> {
        match self {
            Move::Play(c) => Some(c),
            Move::Pass => None,
        }
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Move::Play(c) => write!(f, "{}", c),
            Move::Pass => write!(f, "pass"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn opposite_player_roundtrip() {
        assert_eq!(Player::Black.opposite(), Player::White);
        assert_eq!(Player::White.opposite().opposite(), Player::White);
    }

    #[test]
    fn inversion_only_touches_stones() {
        assert_eq!(Intersection::Stone(Player::Black).inverted(), Intersection::Stone(Player::White));
        assert_eq!(Intersection::Empty.inverted(), Intersection::Empty);
        assert_eq!(
            Intersection::TemporarilyUnplayable.inverted(),
            Intersection::TemporarilyUnplayable
        );
    }

    #[test]
    fn coordinates_iterate_row_major() {
        let all: Vec<Coordinate> = Coordinate::all(2).collect();
        assert_eq!(
            all,
            vec![
                Coordinate::new(1, 1),
                Coordinate::new(2, 1),
                Coordinate::new(1, 2),
                Coordinate::new(2, 2)
            ]
        );
        let mut sorted = all.clone();
        sorted.sort();
        assert_eq!(sorted, all);
    }

    #[test]
    fn corner_has_two_neighbors() {
        assert_eq!(Coordinate::new(1, 1).neighbors(9).count(), 2);
        assert_eq!(Coordinate::new(5, 1).neighbors(9).count(), 3);
        assert_eq!(Coordinate::new(5, 5).neighbors(9).count(), 4);
        assert_eq!(Coordinate::new(1, 1).neighbors(1).count(), 0);
    }

    #[test]
    fn display_skips_i() {
        assert_eq!(Coordinate::new(1, 1).to_string(), "A1");
        assert_eq!(Coordinate::new(9, 3).to_string(), "J3");
        assert_eq!(Move::Pass.to_string(), "pass");
    }

    #[test]
    fn pass_sorts_after_plays() {
        assert!(Move::play(19, 19) < Move::Pass);
    }
}
