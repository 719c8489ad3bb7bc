//! The result of one forward pass.

use super::encoding::FeatureGrid;
use super::network::{OPPONENT_PASS, OPPONENT_PLAY, PLAYER_PASS, PLAYER_PLAY};
use super::plane::Plane;
use crate::board::{Move, Position};
use crate::error::{Error, Result};
use crate::score::Score;

/// Every activation of one evaluated position, plus the position itself.
///
/// Scores are read lazily from the output layer; the hidden activations and
/// orientation planes are kept for inspection.
#[derive(Debug, Clone)]
pub struct Evaluation<P: Position> {
    position: P,
    /// Sorted: plays row-major, pass last.
    legal_moves: Vec<Move>,
    input: FeatureGrid,
    activations: Vec<Vec<Plane>>,
    orientations: Vec<Vec<Option<Vec<u8>>>>,
}

impl<P: Position> Evaluation<P> {
    pub(crate) fn new(
        position: P,
        input: FeatureGrid,
        activations: Vec<Vec<Plane>>,
        orientations: Vec<Vec<Option<Vec<u8>>>>,
    ) -> Result<Self> {
        let outputs = activations.last().map(Vec::as_slice).unwrap_or(&[]);
        if outputs.len() <= OPPONENT_PASS {
            return Err(Error::Internal {
                reason: format!("output layer has {} units, expected 4", outputs.len()),
                position: position.to_string(),
            });
        }
        let dimension = position.dimension();
        for (unit, expected) in [
            (PLAYER_PLAY, dimension),
            (OPPONENT_PLAY, dimension),
            (PLAYER_PASS, 1),
            (OPPONENT_PASS, 1),
        ] {
            let breadth = outputs[unit].breadth();
            if breadth != expected {
                return Err(Error::Internal {
                    reason: format!(
                        "output unit {} is {}x{}, expected {}x{}",
                        unit, breadth, breadth, expected, expected
                    ),
                    position: position.to_string(),
                });
            }
        }
        let mut legal_moves = position.legal_moves();
        legal_moves.sort_unstable();
        legal_moves.dedup();
        Ok(Evaluation {
            position,
            legal_moves,
            input,
            activations,
            orientations,
        })
    }

    pub fn position(&self) -> &P {
        &self.position
    }

    pub fn dimension(&self) -> usize {
        self.position.dimension()
    }

    pub fn input(&self) -> &FeatureGrid {
        &self.input
    }

    /// Legal moves in score order.
    pub fn legal_moves(&self) -> &[Move] {
        &self.legal_moves
    }

    pub fn is_legal(&self, mv: Move) -> bool {
        self.legal_moves.binary_search(&mv).is_ok()
    }

    /// Number of stages, output included.
    pub fn layer_count(&self) -> usize {
        self.activations.len()
    }

    /// Output planes of `layer`, one per unit.
    pub fn layer(&self, layer: usize) -> Option<&[Plane]> {
        self.activations.get(layer).map(Vec::as_slice)
    }

    /// Activation at padded `(row, column)` of `channel` in `layer`.
    pub fn activation(&self, layer: usize, channel: usize, row: usize, column: usize) -> Option<f64> {
        self.activations.get(layer)?.get(channel)?.get(row, column)
    }

    /// Winning orientation at unpadded `(row, column)`; `None` for plain
    /// layers and out-of-range indices.
    pub fn orientation(&self, layer: usize, channel: usize, row: usize, column: usize) -> Option<u8> {
        let cells = self.orientations.get(layer)?.get(channel)?.as_ref()?;
        let breadth = (cells.len() as f64).sqrt().round() as usize;
        if row < breadth && column < breadth {
            cells.get(row * breadth + column).copied()
        } else {
            None
        }
    }

    fn output(&self, unit: usize, row: usize, column: usize) -> Result<f64> {
        self.activations
            .last()
            .and_then(|planes| planes.get(unit))
            .and_then(|plane| plane.get(row, column))
            .ok_or_else(|| Error::Internal {
                reason: format!("output unit {} has no value at ({}, {})", unit, row, column),
                position: self.position.to_string(),
            })
    }

    /// The score of a legal move.
    pub fn score_for(&self, mv: Move) -> Result<Score> {
        if !self.is_legal(mv) {
            return Err(Error::IllegalMove(mv));
        }
        let (player, opponent) = match mv {
            Move::Play(coordinate) => {
                let (row, column) = coordinate.grid_index();
                (
                    self.output(PLAYER_PLAY, row, column)?,
                    self.output(OPPONENT_PLAY, row, column)?,
                )
            }
            Move::Pass => (self.output(PLAYER_PASS, 0, 0)?, self.output(OPPONENT_PASS, 0, 0)?),
        };
        Ok(Score::from_raw(mv, self.dimension(), player, opponent))
    }

    /// One score per legal move, in [`legal_moves`](Self::legal_moves) order.
    pub fn all_scores(&self) -> Result<Vec<Score>> {
        self.legal_moves.iter().map(|&mv| self.score_for(mv)).collect()
    }
}
