//! Canonical position fingerprints.
//!
//! A position is written out as 16 symbol sequences: the 8 board symmetries,
//! each with and without swapping colors. Each sequence is read as a base-5
//! number whose least significant digit is the top-left point, and the
//! smallest number is the canonical one. Two positions that differ only by a
//! rotation, a reflection, or a color swap get the same canonical value.

use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};

use crate::board::{Coordinate, Intersection, Player, Position};

/// Number of fingerprint variants: 8 symmetries times 2 colorings.
pub const VARIANTS: usize = 16;

const BASE: u8 = 5;

fn symbol(value: Intersection) -> u8 {
    match value {
        Intersection::Empty => 0,
        Intersection::Stone(Player::Black) => 1,
        Intersection::Stone(Player::White) => 2,
        Intersection::TemporarilyUnplayable => 3,
        Intersection::PermanentlyUnplayable => 4,
    }
}

fn player_symbol(player: Option<Player>) -> u8 {
    player.map_or(0, |p| symbol(Intersection::Stone(p)))
}

/// Swaps black and white symbols.
fn invert_symbol(symbol: u8) -> u8 {
    match symbol {
        1 => 2,
        2 => 1,
        other => other,
    }
}

/// An arbitrary-size base-5 number stored as digits.
///
/// Digit 0 is least significant. Leading zeros are trimmed, so the derived
/// equality and hash agree with numeric equality and `Ord` is numeric order.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct Fingerprint {
    digits: Vec<u8>,
}

impl Fingerprint {
    /// Builds the number `sum(symbols[i] * 5^i)`.
    fn from_symbols(mut digits: Vec<u8>) -> Fingerprint {
        while digits.last() == Some(&0) {
            digits.pop();
        }
        Fingerprint { digits }
    }

    pub fn is_zero(&self) -> bool {
        self.digits.is_empty()
    }

    /// Base-5 digits, least significant first, without leading zeros.
    pub fn digits(&self) -> &[u8] {
        &self.digits
    }

    /// The value as a `u128`, if it fits.
    pub fn to_u128(&self) -> Option<u128> {
        self.digits.iter().rev().try_fold(0u128, |value, &digit| {
            value
                .checked_mul(BASE as u128)?
                .checked_add(digit as u128)
        })
    }
}

impl Ord for Fingerprint {
    fn cmp(&self, other: &Self) -> Ordering {
        self.digits
            .len()
            .cmp(&other.digits.len())
            .then_with(|| self.digits.iter().rev().cmp(other.digits.iter().rev()))
    }
}

impl PartialOrd for Fingerprint {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for Fingerprint {
    /// Base-5, most significant digit first.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.digits.is_empty() {
            return f.write_str("0");
        }
        for &digit in self.digits.iter().rev() {
            write!(f, "{}", digit)?;
        }
        Ok(())
    }
}

/// A position's fingerprint under the symmetry that minimizes it.
///
/// Equality and hashing use only the dimension and canonical fingerprint.
#[derive(Debug, Clone)]
pub struct CanonicalHash {
    dimension: usize,
    original: Fingerprint,
    canonical: Fingerprint,
    canonical_index: usize,
    canonical_player: Option<Player>,
    original_player: Option<Player>,
}

impl CanonicalHash {
    /// Hashes `position`. Finished positions hash with no player to move.
    pub fn of<P: Position>(position: &P) -> CanonicalHash {
        let dimension = position.dimension();
        let points = dimension * dimension;
        let player = position.current_player();
        let after_pass = match player {
            Some(p) if !position.would_pass_end_game() => Some(p.opposite()),
            _ => None,
        };

        let mut variants = vec![vec![0u8; points + 2]; VARIANTS];
        let d = dimension;
        for coordinate in Coordinate::all(dimension) {
            let (r, c) = coordinate.grid_index();
            let value = symbol(position.get(coordinate));
            let inverted = invert_symbol(value);
            let (ro, co) = (d - 1 - r, d - 1 - c);
            let indices = [
                r * d + c,
                r * d + co,
                ro * d + c,
                ro * d + co,
                c * d + r,
                c * d + ro,
                co * d + r,
                co * d + ro,
            ];
            for (variant, &index) in indices.iter().enumerate() {
                variants[variant][index] = value;
                variants[variant + 8][index] = inverted;
            }
        }

        let after_pass = player_symbol(after_pass);
        let current = player_symbol(player);
        for (variant, symbols) in variants.iter_mut().enumerate() {
            let (a, p) = if variant < 8 {
                (after_pass, current)
            } else {
                (invert_symbol(after_pass), invert_symbol(current))
            };
            symbols[points] = a;
            symbols[points + 1] = p;
        }

        let mut fingerprints = variants.into_iter().map(Fingerprint::from_symbols);
        let original = fingerprints.next().unwrap_or_default();
        let mut canonical = original.clone();
        let mut canonical_index = 0;
        for (index, fingerprint) in fingerprints.enumerate() {
            if fingerprint < canonical {
                canonical = fingerprint;
                canonical_index = index + 1;
            }
        }

        let canonical_player = if canonical_index < 8 {
            player
        } else {
            player.map(Player::opposite)
        };

        CanonicalHash {
            dimension,
            original,
            canonical,
            canonical_index,
            canonical_player,
            original_player: player,
        }
    }

    pub fn dimension(&self) -> usize {
        self.dimension
    }

    /// Fingerprint of the position as given.
    pub fn original(&self) -> &Fingerprint {
        &self.original
    }

    pub fn canonical(&self) -> &Fingerprint {
        &self.canonical
    }

    /// Which of the 16 variants is canonical; `>= 8` means colors swapped.
    pub fn canonical_index(&self) -> usize {
        self.canonical_index
    }

    /// The player to move in the canonical variant.
    pub fn canonical_player(&self) -> Option<Player> {
        self.canonical_player
    }

    pub fn original_player(&self) -> Option<Player> {
        self.original_player
    }

    /// True if the two positions are identical, not merely equivalent.
    pub fn exactly_equals(&self, other: &CanonicalHash) -> bool {
        self.dimension == other.dimension && self.original == other.original
    }
}

impl PartialEq for CanonicalHash {
    fn eq(&self, other: &Self) -> bool {
        self.dimension == other.dimension && self.canonical == other.canonical
    }
}

impl Eq for CanonicalHash {}

impl Hash for CanonicalHash {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.dimension.hash(state);
        self.canonical.hash(state);
    }
}

fn player_name(player: Option<Player>) -> String {
    player.map_or_else(|| "none".to_string(), |p| p.to_string())
}

impl fmt::Display for CanonicalHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "CanonicalHash {{ dimension: {}, canonical player: {}, canonical: {}, original player: {}, original: {}, index: {} }}",
            self.dimension,
            player_name(self.canonical_player),
            self.canonical,
            player_name(self.original_player),
            self.original,
            self.canonical_index
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::{Game, Move};

    #[test]
    fn fingerprint_orders_numerically() {
        let small = Fingerprint::from_symbols(vec![4, 4, 0, 0]);
        let large = Fingerprint::from_symbols(vec![0, 0, 1]);
        assert_eq!(small.digits(), &[4, 4]);
        assert!(small < large);
        assert_eq!(small.to_u128(), Some(24));
        assert_eq!(large.to_u128(), Some(25));
        assert_eq!(large.to_string(), "100");
        assert!(Fingerprint::from_symbols(vec![0, 0]).is_zero());

        let a = Fingerprint::from_symbols(vec![1, 2, 3]);
        let b = Fingerprint::from_symbols(vec![2, 1, 3]);
        assert!(b > a);
        assert_eq!(b.to_u128(), Some(2 + 5 + 75));
    }

    #[test]
    fn empty_board_is_canonical_as_given() {
        let game = Game::new(3).unwrap();
        let hash = CanonicalHash::of(&game);
        assert_eq!(hash.canonical_index(), 0);
        assert_eq!(hash.original(), hash.canonical());
        // Black to move, white after a pass: digits 9 and 10.
        assert_eq!(hash.original().digits(), &[0, 0, 0, 0, 0, 0, 0, 0, 0, 2, 1]);
        assert_eq!(hash.canonical_player(), Some(Player::Black));
    }

    #[test]
    fn color_swap_wins_only_when_smaller() {
        // The player to move is the most significant digit, so swapping
        // colors wins whenever white is to move.
        let game = Game::builder(3)
            .stone(Coordinate::new(2, 2), Player::White)
            .to_move(Player::White)
            .build()
            .unwrap();
        let hash = CanonicalHash::of(&game);
        assert_eq!(hash.canonical_index(), 8);
        assert_eq!(hash.original_player(), Some(Player::White));
        assert_eq!(hash.canonical_player(), Some(Player::Black));

        // Once finished, only the stones decide.
        let black = Game::builder(3)
            .stone(Coordinate::new(2, 2), Player::Black)
            .build()
            .unwrap()
            .pass()
            .unwrap()
            .pass()
            .unwrap();
        assert_eq!(CanonicalHash::of(&black).canonical_index(), 0);

        let white = Game::builder(3)
            .stone(Coordinate::new(2, 2), Player::White)
            .build()
            .unwrap()
            .pass()
            .unwrap()
            .pass()
            .unwrap();
        let hash = CanonicalHash::of(&white);
        assert_eq!(hash.canonical_index(), 8);
        assert_eq!(hash.canonical_player(), None);
        assert_eq!(hash, CanonicalHash::of(&black));
    }

    #[test]
    fn corner_stone_moves_to_the_least_significant_corner() {
        // The top-left point is the least significant digit.
        let game = Game::builder(3)
            .stone(Coordinate::new(3, 3), Player::Black)
            .build()
            .unwrap();
        let hash = CanonicalHash::of(&game);
        assert_eq!(hash.canonical().digits()[0], 1);
        assert_eq!(hash.canonical_index(), 3);
    }

    #[test]
    fn equality_ignores_orientation() {
        let a = Game::new(5).unwrap().play(Move::play(1, 2)).unwrap();
        let b = Game::new(5).unwrap().play(Move::play(2, 1)).unwrap();
        let ha = CanonicalHash::of(&a);
        let hb = CanonicalHash::of(&b);
        assert_eq!(ha, hb);
        assert!(!ha.exactly_equals(&hb));
        assert!(ha.exactly_equals(&ha.clone()));
    }

    #[test]
    fn finished_games_hash_without_players() {
        let game = Game::new(2).unwrap().pass().unwrap().pass().unwrap();
        let hash = CanonicalHash::of(&game);
        assert_eq!(hash.original_player(), None);
        assert!(hash.canonical().is_zero());
    }
}
