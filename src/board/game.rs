//! A small reference rules engine implementing [`Position`].
//!
//! Area rules with captures, forbidden suicide, simple ko, optional
//! permanently blocked points, and two consecutive passes ending the game.

use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

use super::point::{Coordinate, Intersection, Move, Player};
use super::position::{Group, Position};
use crate::error::{Error, Result};

/// Largest supported board.
pub const MAX_DIMENSION: usize = 19;

/// Komi used when a builder does not set one.
pub const DEFAULT_KOMI: f64 = 7.5;

/// An immutable game snapshot with a shared link to its history.
#[derive(Debug, Clone)]
pub struct Game {
    dimension: usize,
    /// Never holds `TemporarilyUnplayable`; the ko point is overlaid by `get`.
    cells: Vec<Intersection>,
    to_move: Player,
    ko: Option<Coordinate>,
    passes_in_a_row: u8,
    finished: bool,
    komi: f64,
    last_move: Option<Move>,
    previous: Option<Arc<Game>>,
}

/// Area count of a finished game.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AreaScore {
    pub black: f64,
    /// Includes komi.
    pub white: f64,
}

impl AreaScore {
    /// The winner, or `None` on a tie.
    pub fn winner(&self) -> Option<Player> {
        if self.black > self.white {
            Some(Player::Black)
        } else if self.white > self.black {
            Some(Player::White)
        } else {
            None
        }
    }
}

/// Sets up a starting position.
#[derive(Debug, Clone)]
pub struct GameBuilder {
    dimension: usize,
    stones: Vec<(Coordinate, Player)>,
    blocked: Vec<Coordinate>,
    to_move: Player,
    komi: f64,
}

impl GameBuilder {
    /// Places a stone before the game starts.
    pub fn stone(mut self, coordinate: Coordinate, player: Player) -> Self {
        self.stones.push((coordinate, player));
        self
    }

    /// Marks a point as permanently unplayable.
    pub fn blocked(mut self, coordinate: Coordinate) -> Self {
        self.blocked.push(coordinate);
        self
    }

    pub fn to_move(mut self, player: Player) -> Self {
        self.to_move = player;
        self
    }

    pub fn komi(mut self, komi: f64) -> Self {
        self.komi = komi;
        self
    }

    /// Builds the game. Stones placed without liberties are kept as given.
    pub fn build(self) -> Result<Game> {
        let dimension = self.dimension;
        if dimension == 0 || dimension > MAX_DIMENSION {
            return Err(Error::InvalidBoardSize(dimension));
        }

        let mut cells = vec![Intersection::Empty; dimension * dimension];
        let placements = self
            .stones
            .iter()
            .map(|&(c, p)| (c, Intersection::Stone(p)))
            .chain(self.blocked.iter().map(|&c| (c, Intersection::PermanentlyUnplayable)));
        for (coordinate, value) in placements {
            if !coordinate.is_on_board(dimension) {
                return Err(Error::OffBoard {
                    column: coordinate.column(),
                    row: coordinate.row(),
                    dimension,
                });
            }
            cells[index(dimension, coordinate)] = value;
        }

        Ok(Game {
            dimension,
            cells,
            to_move: self.to_move,
            ko: None,
            passes_in_a_row: 0,
            finished: false,
            komi: self.komi,
            last_move: None,
            previous: None,
        })
    }
}

#[inline]
fn index(dimension: usize, coordinate: Coordinate) -> usize {
    let (row, column) = coordinate.grid_index();
    row * dimension + column
}

/// Collects the group containing `start` and its liberties.
fn flood_group(
    dimension: usize,
    cells: &[Intersection],
    start: Coordinate,
) -> (Vec<Coordinate>, HashSet<Coordinate>) {
    let color = cells[index(dimension, start)];
    let mut members = Vec::new();
    let mut liberties = HashSet::new();
    let mut visited = vec![false; cells.len()];
    let mut stack = vec![start];
    visited[index(dimension, start)] = true;

    while let Some(point) = stack.pop() {
        members.push(point);
        for neighbor in point.neighbors(dimension) {
            let i = index(dimension, neighbor);
            match cells[i] {
                Intersection::Empty => {
                    liberties.insert(neighbor);
                }
                value if value == color && !visited[i] => {
                    visited[i] = true;
                    stack.push(neighbor);
                }
                _ => {}
            }
        }
    }

    members.sort();
    (members, liberties)
}

impl Game {
    /// An empty board with black to move.
    pub fn new(dimension: usize) -> Result<Game> {
        Game::builder(dimension).build()
    }

    pub fn builder(dimension: usize) -> GameBuilder {
        GameBuilder {
            dimension,
            stones: Vec::new(),
            blocked: Vec::new(),
            to_move: Player::Black,
            komi: DEFAULT_KOMI,
        }
    }

    pub fn komi(&self) -> f64 {
        self.komi
    }

    /// Places a stone for the player to move and resolves captures.
    ///
    /// Returns the new cells and the ko point it creates, or `None` if the
    /// point is occupied, the ko point, or suicide.
    fn try_place(&self, coordinate: Coordinate) -> Option<(Vec<Intersection>, Option<Coordinate>)> {
        let dimension = self.dimension;
        if !coordinate.is_on_board(dimension)
            || self.cells[index(dimension, coordinate)] != Intersection::Empty
            || self.ko == Some(coordinate)
        {
            return None;
        }

        let mut cells = self.cells.clone();
        let own = Intersection::Stone(self.to_move);
        let enemy = Intersection::Stone(self.to_move.opposite());
        cells[index(dimension, coordinate)] = own;

        let mut captured = Vec::new();
        for neighbor in coordinate.neighbors(dimension) {
            if cells[index(dimension, neighbor)] != enemy {
                continue;
            }
            let (members, liberties) = flood_group(dimension, &cells, neighbor);
            if liberties.is_empty() {
                for member in members {
                    cells[index(dimension, member)] = Intersection::Empty;
                    captured.push(member);
                }
            }
        }

        let (members, liberties) = flood_group(dimension, &cells, coordinate);
        if liberties.is_empty() {
            return None;
        }

        let ko = match captured.as_slice() {
            [single] if members.len() == 1 && liberties.len() == 1 => Some(*single),
            _ => None,
        };
        Some((cells, ko))
    }

    /// Continues a finished game, e.g. to settle the status of dead stones.
    /// The player who would move next keeps the turn.
    pub fn resume(&self) -> Game {
        let mut next = self.clone();
        next.finished = false;
        next.passes_in_a_row = 0;
        next
    }

    /// Counts stones and single-colored territory after removing `dead`.
    pub fn area_score(&self, dead: &[Group]) -> AreaScore {
        let dimension = self.dimension;
        let mut cells = self.cells.clone();
        for group in dead {
            for &member in &group.members {
                cells[index(dimension, member)] = Intersection::Empty;
            }
        }

        let mut black = 0.0;
        let mut white = self.komi;
        let mut visited = vec![false; cells.len()];
        for coordinate in Coordinate::all(dimension) {
            let i = index(dimension, coordinate);
            match cells[i] {
                Intersection::Stone(Player::Black) => black += 1.0,
                Intersection::Stone(Player::White) => white += 1.0,
                Intersection::Empty if !visited[i] => {
                    let mut region = 0usize;
                    let mut borders = HashSet::new();
                    let mut stack = vec![coordinate];
                    visited[i] = true;
                    while let Some(point) = stack.pop() {
                        region += 1;
                        for neighbor in point.neighbors(dimension) {
                            let j = index(dimension, neighbor);
                            match cells[j] {
                                Intersection::Empty if !visited[j] => {
                                    visited[j] = true;
                                    stack.push(neighbor);
                                }
                                Intersection::Stone(owner) => {
                                    borders.insert(owner);
                                }
                                _ => {}
                            }
                        }
                    }
                    if borders.len() == 1 {
                        match borders.iter().next() {
                            Some(Player::Black) => black += region as f64,
                            Some(Player::White) => white += region as f64,
                            None => {}
                        }
                    }
                }
                _ => {}
            }
        }

        AreaScore { black, white }
    }
}

impl Position for Game {
    fn dimension(&self) -> usize {
        self.dimension
    }

    fn is_finished(&self) -> bool {
        self.finished
    }

    fn current_player(&self) -> Option<Player> {
        if self.finished {
            None
        } else {
            Some(self.to_move)
        }
    }

    fn get(&self, coordinate: Coordinate) -> Intersection {
        if !coordinate.is_on_board(self.dimension) {
            return Intersection::PermanentlyUnplayable;
        }
        if self.ko == Some(coordinate) {
            return Intersection::TemporarilyUnplayable;
        }
        self.cells[index(self.dimension, coordinate)]
    }

    fn legal_moves(&self) -> Vec<Move> {
        if self.finished {
            return Vec::new();
        }
        let mut moves: Vec<Move> = Coordinate::all(self.dimension)
            .filter(|&c| self.try_place(c).is_some())
            .map(Move::Play)
            .collect();
        moves.push(Move::Pass);
        moves
    }

    fn would_pass_end_game(&self) -> bool {
        !self.finished && self.passes_in_a_row == 1
    }

    fn groups(&self) -> Vec<Group> {
        let dimension = self.dimension;
        let mut visited = vec![false; self.cells.len()];
        let mut groups = Vec::new();
        for coordinate in Coordinate::all(dimension) {
            let i = index(dimension, coordinate);
            let owner = match self.cells[i] {
                Intersection::Stone(owner) if !visited[i] => owner,
                _ => continue,
            };
            let (members, liberties) = flood_group(dimension, &self.cells, coordinate);
            for &member in &members {
                visited[index(dimension, member)] = true;
            }
            groups.push(Group {
                owner,
                members,
                liberties: liberties.len(),
            });
        }
        groups
    }

    fn play(&self, mv: Move) -> Result<Game> {
        if self.finished {
            return Err(Error::IllegalMove(mv));
        }

        let mut next = match mv {
            Move::Pass => {
                let mut next = self.clone();
                next.ko = None;
                next.passes_in_a_row = self.passes_in_a_row + 1;
                next.finished = next.passes_in_a_row >= 2;
                next
            }
            Move::Play(coordinate) => {
                let (cells, ko) = self.try_place(coordinate).ok_or(Error::IllegalMove(mv))?;
                let mut next = self.clone();
                next.cells = cells;
                next.ko = ko;
                next.passes_in_a_row = 0;
                next
            }
        };

        next.to_move = self.to_move.opposite();
        next.last_move = Some(mv);
        next.previous = Some(Arc::new(self.clone()));
        Ok(next)
    }

    fn previous_state(&self) -> Option<Game> {
        self.previous.as_deref().cloned()
    }

    fn previous_move(&self) -> Option<Move> {
        self.last_move
    }
}

impl fmt::Display for Game {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.current_player() {
            Some(player) => writeln!(f, "{} to move", player)?,
            None => writeln!(f, "finished")?,
        }
        for row in 1..=self.dimension {
            let line: String = (1..=self.dimension)
                .map(|column| self.get(Coordinate::new(column, row)).symbol())
                .collect();
            writeln!(f, "{}", line)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn play_all(game: Game, moves: &[Move]) -> Game {
        moves.iter().fold(game, |g, &mv| g.play(mv).unwrap())
    }

    #[test]
    fn empty_board_has_every_point_and_pass() {
        let game = Game::new(9).unwrap();
        assert_eq!(game.legal_moves().len(), 82);
        assert_eq!(game.current_player(), Some(Player::Black));
        assert!(game.previous_move().is_none());
        assert!(game.previous_state().is_none());
    }

    #[test]
    fn rejects_bad_dimensions() {
        assert_eq!(Game::new(0).unwrap_err(), Error::InvalidBoardSize(0));
        assert_eq!(Game::new(20).unwrap_err(), Error::InvalidBoardSize(20));
        let err = Game::builder(5).stone(Coordinate::new(6, 1), Player::Black).build();
        assert!(matches!(err, Err(Error::OffBoard { .. })));
    }

    #[test]
    fn capture_removes_stones() {
        let game = Game::builder(5)
            .stone(Coordinate::new(1, 1), Player::White)
            .stone(Coordinate::new(2, 1), Player::Black)
            .build()
            .unwrap();
        let next = game.play(Move::play(1, 2)).unwrap();
        assert_eq!(next.get(Coordinate::new(1, 1)), Intersection::Empty);
        assert_eq!(next.current_player(), Some(Player::White));
    }

    #[test]
    fn suicide_is_illegal() {
        let game = Game::builder(5)
            .stone(Coordinate::new(2, 1), Player::White)
            .stone(Coordinate::new(1, 2), Player::White)
            .build()
            .unwrap();
        assert!(!game.legal_moves().contains(&Move::play(1, 1)));
        assert_eq!(game.play(Move::play(1, 1)).unwrap_err(), Error::IllegalMove(Move::play(1, 1)));
    }

    #[test]
    fn ko_point_is_temporarily_unplayable() {
        // Black to capture at C2, leaving a ko at B2.
        let game = Game::builder(5)
            .stone(Coordinate::new(2, 1), Player::Black)
            .stone(Coordinate::new(1, 2), Player::Black)
            .stone(Coordinate::new(2, 3), Player::Black)
            .stone(Coordinate::new(3, 1), Player::White)
            .stone(Coordinate::new(4, 2), Player::White)
            .stone(Coordinate::new(3, 3), Player::White)
            .stone(Coordinate::new(2, 2), Player::White)
            .build()
            .unwrap();
        let next = game.play(Move::play(3, 2)).unwrap();
        assert_eq!(next.get(Coordinate::new(2, 2)), Intersection::TemporarilyUnplayable);
        assert!(!next.legal_moves().contains(&Move::play(2, 2)));

        let later = play_all(next, &[Move::play(5, 5), Move::play(5, 4)]);
        assert_eq!(later.get(Coordinate::new(2, 2)), Intersection::Empty);
        assert!(later.legal_moves().contains(&Move::play(2, 2)));
    }

    #[test]
    fn two_passes_finish_the_game() {
        let game = Game::new(3).unwrap();
        let once = game.pass().unwrap();
        assert!(once.would_pass_end_game());
        assert!(!once.is_finished());
        let twice = once.pass().unwrap();
        assert!(twice.is_finished());
        assert!(twice.legal_moves().is_empty());
        assert!(twice.current_player().is_none());
        assert!(twice.play(Move::Pass).is_err());

        let resumed = twice.resume();
        assert!(!resumed.is_finished());
        assert!(!resumed.would_pass_end_game());
        assert_eq!(resumed.current_player(), Some(Player::Black));
    }

    #[test]
    fn groups_report_liberties() {
        let game = Game::builder(5)
            .stone(Coordinate::new(1, 1), Player::Black)
            .stone(Coordinate::new(2, 1), Player::Black)
            .stone(Coordinate::new(3, 3), Player::White)
            .build()
            .unwrap();
        let groups = game.groups();
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].owner, Player::Black);
        assert_eq!(groups[0].members.len(), 2);
        assert_eq!(groups[0].liberties, 3);
        assert_eq!(groups[1].liberties, 4);
    }

    #[test]
    fn history_links_back() {
        let game = play_all(Game::new(5).unwrap(), &[Move::play(3, 3), Move::Pass]);
        assert_eq!(game.previous_move(), Some(Move::Pass));
        let before = game.previous_state().unwrap();
        assert_eq!(before.previous_move(), Some(Move::play(3, 3)));
    }

    #[test]
    fn area_score_counts_territory_and_komi() {
        let game = Game::builder(3)
            .stone(Coordinate::new(2, 1), Player::Black)
            .stone(Coordinate::new(2, 2), Player::Black)
            .stone(Coordinate::new(2, 3), Player::Black)
            .komi(0.5)
            .build()
            .unwrap();
        let score = game.area_score(&[]);
        assert_eq!(score.black, 9.0);
        assert_eq!(score.white, 0.5);
        assert_eq!(score.winner(), Some(Player::Black));

        let dead = game.groups();
        let score = game.area_score(&dead);
        assert_eq!(score.black, 0.0);
    }

    #[test]
    fn blocked_points_are_never_legal() {
        let game = Game::builder(3).blocked(Coordinate::new(2, 2)).build().unwrap();
        assert_eq!(game.get(Coordinate::new(2, 2)), Intersection::PermanentlyUnplayable);
        assert_eq!(game.legal_moves().len(), 9);
    }
}
