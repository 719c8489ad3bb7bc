//! Moving moves and scores between equivalent positions.

use std::sync::OnceLock;

use super::hash::CanonicalHash;
use super::transform::Transform;
use crate::board::{Move, MAX_DIMENSION};
use crate::error::{Error, Result};
use crate::score::Score;

/// Maps moves of one orientation of a position onto another.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Converter {
    dimension: usize,
    transform: Transform,
}

impl Converter {
    pub fn dimension(&self) -> usize {
        self.dimension
    }

    pub fn transform(&self) -> Transform {
        self.transform
    }

    /// Maps a move, failing if it is off this converter's board.
    pub fn convert_move(&self, mv: Move) -> Result<Move> {
        if let Move::Play(coordinate) = mv {
            if !coordinate.is_on_board(self.dimension) {
                return Err(Error::OffBoard {
                    column: coordinate.column(),
                    row: coordinate.row(),
                    dimension: self.dimension,
                });
            }
        }
        Ok(self.transform.apply_move(mv, self.dimension))
    }

    /// Maps a score's move and rebuilds it from the raw values.
    pub fn convert(&self, score: &Score) -> Result<Score> {
        if self.transform == Transform::Identity {
            self.convert_move(score.mv())?;
            return Ok(*score);
        }
        let mv = self.convert_move(score.mv())?;
        Ok(score.with_move(mv))
    }
}

/// Lazily built converters for every board size.
///
/// Each dimension's 8 converters are created on first use; concurrent first
/// uses race safely and all observe the same set.
#[derive(Debug)]
pub struct ConverterRegistry {
    by_dimension: [OnceLock<[Converter; 8]>; MAX_DIMENSION + 1],
}

impl Default for ConverterRegistry {
    fn default() -> Self {
        ConverterRegistry::new()
    }
}

impl ConverterRegistry {
    pub fn new() -> Self {
        ConverterRegistry {
            by_dimension: std::array::from_fn(|_| OnceLock::new()),
        }
    }

    /// A process-wide registry.
    pub fn global() -> &'static ConverterRegistry {
        static GLOBAL: OnceLock<ConverterRegistry> = OnceLock::new();
        GLOBAL.get_or_init(ConverterRegistry::new)
    }

    fn converters(&self, dimension: usize) -> Result<&[Converter; 8]> {
        let slot = self
            .by_dimension
            .get(dimension)
            .filter(|_| dimension >= 1)
            .ok_or(Error::InvalidBoardSize(dimension))?;
        Ok(slot.get_or_init(|| {
            log::trace!("creating converters for {}x{}", dimension, dimension);
            Transform::ALL.map(|transform| Converter {
                dimension,
                transform,
            })
        }))
    }

    /// Whether the converters for `dimension` have been built.
    pub fn is_cached(&self, dimension: usize) -> bool {
        self.by_dimension
            .get(dimension)
            .is_some_and(|slot| slot.get().is_some())
    }

    /// The converter from `start`'s orientation to `end`'s.
    ///
    /// Fails with `IncomparablePositions` unless the two hashes are equal.
    pub fn between(&self, start: &CanonicalHash, end: &CanonicalHash) -> Result<Converter> {
        if start != end {
            return Err(Error::IncomparablePositions {
                start: start.to_string(),
                end: end.to_string(),
            });
        }
        let transform = Transform::between(start.canonical_index(), end.canonical_index());
        Ok(self.converters(start.dimension())?[transform.index()])
    }

    /// The converter that leaves moves of `hash`'s board unchanged.
    pub fn identity(&self, hash: &CanonicalHash) -> Result<Converter> {
        Ok(self.converters(hash.dimension())?[Transform::Identity.index()])
    }
}
