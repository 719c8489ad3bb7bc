//! The convolutional evaluator: topology construction and the forward pass.
//!
//! Topology for `hidden_layers = n` on a `D x D` board:
//!
//! | stage          | inputs   | width | units      | kind               | pad |
//! |----------------|----------|-------|------------|--------------------|-----|
//! | hidden 0       | 19       | 5     | `channels` | rotation-invariant | 1*  |
//! | hidden 1..n    | channels | 3     | `channels` | rotation-invariant | 1*  |
//! | output         | channels | 1, D  | 4          | plain              | 0   |
//!
//! (*) the last hidden layer does not pad. The input grid is padded by 2 when
//! `n > 0`, so every hidden layer reads a `(D + 4)` or `(D + 2)` wide input
//! and produces a `D` wide output before padding. Output units 0 and 1 give
//! the player's and opponent's value of playing at each point; units 2 and 3
//! give the pass values.

use std::time::Instant;

use rand::rngs::{SmallRng, StdRng};
use rand::{Rng, SeedableRng};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use super::encoding::{encode, InputChannel};
use super::evaluation::Evaluation;
use super::plane::Plane;
use super::unit::{Unit, UnitKind};
use crate::board::{Position, MAX_DIMENSION};
use crate::error::{Error, Result};

/// Output unit holding the player's per-point values.
pub const PLAYER_PLAY: usize = 0;
/// Output unit holding the opponent's per-point values.
pub const OPPONENT_PLAY: usize = 1;
/// Output unit holding the player's pass value.
pub const PLAYER_PASS: usize = 2;
/// Output unit holding the opponent's pass value.
pub const OPPONENT_PASS: usize = 3;

const OUTPUT_UNITS: usize = 4;
const FIRST_HIDDEN_WIDTH: usize = 5;
const HIDDEN_WIDTH: usize = 3;

/// Evaluator parameters.
///
/// Every field has a default, so a JSON file may set any subset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EvaluatorConfig {
    pub board_size: usize,
    pub hidden_layers: usize,
    pub channels: usize,
    /// Weight seed. Drawn from entropy (and logged) when absent.
    pub seed: Option<u64>,
    /// Threads for the forward pass. 0 uses rayon's global pool.
    pub threads: usize,
}

impl Default for EvaluatorConfig {
    fn default() -> Self {
        EvaluatorConfig {
            board_size: 9,
            hidden_layers: 7,
            channels: 64,
            seed: None,
            threads: 0,
        }
    }
}

/// One stage of the network.
#[derive(Debug, Clone)]
pub struct Layer {
    input_channels: usize,
    /// Width of the first unit; output units 2 and 3 are wider.
    width: usize,
    output_padding: usize,
    kind: UnitKind,
    units: Vec<Unit>,
}

impl Layer {
    pub fn input_channels(&self) -> usize {
        self.input_channels
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn output_padding(&self) -> usize {
        self.output_padding
    }

    pub fn kind(&self) -> UnitKind {
        self.kind
    }

    pub fn units(&self) -> &[Unit] {
        &self.units
    }
}

/// Shape of one stage before its weights are drawn.
struct LayerShape {
    input_channels: usize,
    kind: UnitKind,
    output_padding: usize,
    /// `(width, count)` runs of units; the output stage mixes widths.
    units: Vec<(usize, usize)>,
}

impl LayerShape {
    fn unit_count(&self) -> Option<usize> {
        self.units
            .iter()
            .try_fold(0usize, |total, &(_, count)| total.checked_add(count))
    }
}

fn topology(dimension: usize, hidden_layers: usize, channels: usize) -> Vec<LayerShape> {
    let layers = hidden_layers + 1;
    let mut shapes = Vec::with_capacity(layers);
    for layer in 0..hidden_layers {
        let (input_channels, width) = if layer == 0 {
            (InputChannel::COUNT, FIRST_HIDDEN_WIDTH)
        } else {
            (channels, HIDDEN_WIDTH)
        };
        shapes.push(LayerShape {
            input_channels,
            kind: UnitKind::RotationInvariant,
            output_padding: if layer + 2 < layers { 1 } else { 0 },
            units: vec![(width, channels)],
        });
    }
    shapes.push(LayerShape {
        input_channels: if hidden_layers == 0 {
            InputChannel::COUNT
        } else {
            channels
        },
        kind: UnitKind::Plain,
        output_padding: 0,
        units: vec![(1, OUTPUT_UNITS / 2), (dimension, OUTPUT_UNITS / 2)],
    });
    shapes
}

/// Total parameter count, or `None` if it overflows `usize` or its storage
/// would exceed the address space.
fn parameter_count(shapes: &[LayerShape]) -> Option<usize> {
    let total = shapes.iter().try_fold(0usize, |total, shape| {
        shape.units.iter().try_fold(total, |total, &(width, count)| {
            let per_unit = Unit::parameter_count(shape.input_channels, width)?;
            total.checked_add(per_unit.checked_mul(count)?)
        })
    })?;
    let bytes = total.checked_mul(std::mem::size_of::<f64>())?;
    (bytes <= isize::MAX as usize).then_some(total)
}

/// A randomly initialized scoring network for one board size.
#[derive(Debug)]
pub struct Evaluator {
    config: EvaluatorConfig,
    seed: u64,
    layers: Vec<Layer>,
    pool: Option<rayon::ThreadPool>,
}

impl Evaluator {
    /// Validates `config`, draws every weight from the seeded generator, and
    /// builds the thread pool if a thread count is set.
    pub fn new(config: EvaluatorConfig) -> Result<Evaluator> {
        if config.board_size < 1 || config.board_size > MAX_DIMENSION {
            return Err(Error::InvalidBoardSize(config.board_size));
        }
        if config.channels < 1 {
            return Err(Error::InvalidChannels(config.channels));
        }

        let shapes = topology(config.board_size, config.hidden_layers, config.channels);
        let parameters = parameter_count(&shapes).ok_or(Error::TopologyTooLarge {
            parameters: usize::MAX,
        })?;
        let too_large = || Error::TopologyTooLarge { parameters };

        let seed = config
            .seed
            .unwrap_or_else(|| SmallRng::from_entropy().gen());
        let mut rng = StdRng::seed_from_u64(seed);

        let mut layers = Vec::new();
        layers.try_reserve_exact(shapes.len()).map_err(|_| too_large())?;
        for shape in shapes {
            let unit_count = shape.unit_count().ok_or_else(too_large)?;
            let mut units = Vec::new();
            units.try_reserve_exact(unit_count).map_err(|_| too_large())?;
            for &(width, count) in &shape.units {
                for _ in 0..count {
                    let mut weights = Vec::new();
                    weights
                        .try_reserve_exact(shape.input_channels * width * width)
                        .map_err(|_| too_large())?;
                    units.push(Unit::random(
                        shape.kind,
                        shape.input_channels,
                        width,
                        weights,
                        &mut rng,
                    ));
                }
            }
            layers.push(Layer {
                input_channels: shape.input_channels,
                width: shape.units[0].0,
                output_padding: shape.output_padding,
                kind: shape.kind,
                units,
            });
        }

        let pool = if config.threads > 0 {
            let pool = rayon::ThreadPoolBuilder::new()
                .num_threads(config.threads)
                .build()
                .map_err(|e| Error::ThreadPool {
                    threads: config.threads,
                    reason: e.to_string(),
                })?;
            Some(pool)
        } else {
            None
        };

        log::debug!(
            "built {}x{} evaluator: {} hidden layers, {} channels, {} parameters, seed {}",
            config.board_size,
            config.board_size,
            config.hidden_layers,
            config.channels,
            parameters,
            seed
        );

        Ok(Evaluator {
            config,
            seed,
            layers,
            pool,
        })
    }

    pub fn config(&self) -> &EvaluatorConfig {
        &self.config
    }

    pub fn dimension(&self) -> usize {
        self.config.board_size
    }

    /// The seed actually used, including one drawn from entropy.
    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn layers(&self) -> &[Layer] {
        &self.layers
    }

    /// Padding the input grid needs for this topology.
    pub fn input_padding(&self) -> usize {
        if self.config.hidden_layers > 0 {
            2
        } else {
            0
        }
    }

    /// Runs the network on `position`.
    ///
    /// With `parallel`, the units of each layer run on the rayon pool and the
    /// layer finishes before the next starts. Both paths produce identical
    /// values.
    pub fn evaluate<P: Position>(&self, position: &P, parallel: bool) -> Result<Evaluation<P>> {
        if position.dimension() != self.dimension() {
            return Err(Error::DimensionMismatch {
                expected: self.dimension(),
                actual: position.dimension(),
            });
        }
        if position.is_finished() {
            return Err(Error::FinishedPosition);
        }

        let started = Instant::now();
        let input = encode(position, self.input_padding())?;
        let encoded = started.elapsed();

        let forward = || self.forward(input.planes(), parallel, position);
        let (activations, orientations) = match (&self.pool, parallel) {
            (Some(pool), true) => pool.install(forward)?,
            _ => forward()?,
        };
        log::trace!(
            "evaluated position: encode {:?}, forward {:?} ({})",
            encoded,
            started.elapsed() - encoded,
            if parallel { "parallel" } else { "sequential" }
        );

        Evaluation::new(position.clone(), input, activations, orientations)
    }

    #[allow(clippy::type_complexity)]
    fn forward<P: Position>(
        &self,
        input: &[Plane],
        parallel: bool,
        position: &P,
    ) -> Result<(Vec<Vec<Plane>>, Vec<Vec<Option<Vec<u8>>>>)> {
        let mut activations: Vec<Vec<Plane>> = Vec::with_capacity(self.layers.len());
        let mut orientations = Vec::with_capacity(self.layers.len());

        for layer in &self.layers {
            let source = activations.last().map(Vec::as_slice).unwrap_or(input);
            let outputs: Vec<(Plane, Option<Vec<u8>>)> = if parallel {
                layer
                    .units
                    .par_iter()
                    .map(|unit| run_unit(layer, unit, source, position))
                    .collect::<Result<Vec<_>>>()?
            } else {
                layer
                    .units
                    .iter()
                    .map(|unit| run_unit(layer, unit, source, position))
                    .collect::<Result<Vec<_>>>()?
            };
            let (planes, orientation): (Vec<_>, Vec<_>) = outputs.into_iter().unzip();
            activations.push(planes);
            orientations.push(orientation);
        }
        Ok((activations, orientations))
    }
}

/// Slides `unit` over every window of `input`.
///
/// Returns the padded output plane and, for rotation-invariant units, the
/// unpadded plane of winning orientations.
fn run_unit<P: Position>(
    layer: &Layer,
    unit: &Unit,
    input: &[Plane],
    position: &P,
) -> Result<(Plane, Option<Vec<u8>>)> {
    let in_breadth = input.first().map(Plane::breadth).unwrap_or(0);
    let last = in_breadth
        .checked_sub(unit.width())
        .ok_or_else(|| Error::Internal {
            reason: format!(
                "a {}-wide unit cannot slide over a {}-wide input",
                unit.width(),
                in_breadth
            ),
            position: position.to_string(),
        })?;
    if input.len() < unit.channels() {
        return Err(Error::Internal {
            reason: format!(
                "unit expects {} input channels but the layer has {}",
                unit.channels(),
                input.len()
            ),
            position: position.to_string(),
        });
    }

    let out = last + 1;
    let pad = layer.output_padding;
    let mut plane = Plane::zeros(out + pad * 2);
    let mut orientation = match unit.kind() {
        UnitKind::RotationInvariant => Some(vec![0u8; out * out]),
        UnitKind::Plain => None,
    };

    for row in 0..out {
        for column in 0..out {
            let value = unit.apply(input, row, column);
            plane.set(row + pad, column + pad, value.value);
            if let Some(cells) = orientation.as_mut() {
                cells[row * out + column] = value.orientation;
            }
        }
    }
    Ok((plane, orientation))
}
