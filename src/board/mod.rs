//! Board vocabulary and the position interface.
//!
//! Contains players, intersections, coordinates and moves, the `Position`
//! trait the core consumes, and a reference rules engine implementing it.

pub mod game;
pub mod point;
pub mod position;

pub use game::{AreaScore, Game, GameBuilder, DEFAULT_KOMI, MAX_DIMENSION};
pub use point::{Coordinate, Intersection, Move, Player};
pub use position::{Group, Position};
