//! The randomly initialized convolutional evaluator.
//!
//! `encoding` turns a position into a padded 19-channel feature grid,
//! `network` builds the layers and runs the forward pass, and `evaluation`
//! holds the activations and hands out per-move scores.

pub mod encoding;
pub mod evaluation;
pub mod network;
pub mod plane;
pub mod unit;

pub use encoding::{encode, FeatureGrid, InputChannel};
pub use evaluation::Evaluation;
pub use network::{Evaluator, EvaluatorConfig, Layer};
pub use plane::Plane;
pub use unit::{Unit, UnitKind, UnitValue, ORIENTATIONS};
