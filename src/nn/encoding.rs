//! Position -> feature grid encoding for the evaluator's first layer.
//!
//! Produces a [19, breadth, breadth] grid of 0/1 values. Each board point is
//! placed at `(row - 1 + padding, column - 1 + padding)`; the padding ring is
//! only marked in the off-board channel.
//!
//! Channel layout:
//!   [0:2]   on board, off board
//!   [2:5]   own stone, opponent stone, empty
//!   [5:7]   legal, illegal for the player to move
//!   [7:9]   opponent legal, illegal after a pass
//!   [9:11]  opponent legal, illegal if a pass did not end the game
//!   [11:19] member of a group with 1..7, 8+ liberties

use std::collections::HashSet;

use super::plane::Plane;
use crate::board::{Coordinate, Intersection, Move, Position};
use crate::error::{Error, Result};

/// Input feature channels in grid order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InputChannel {
    OnBoard,
    OffBoard,
    PlayerStone,
    OpponentStone,
    NoStone,
    LegalMove,
    IllegalMove,
    OpponentCouldPlayAfterPass,
    OpponentCouldNotPlayAfterPass,
    OpponentCouldPlayIfPassDidNotEndGame,
    OpponentCouldNotPlayIfPassDidNotEndGame,
    LibertiesOne,
    LibertiesTwo,
    LibertiesThree,
    LibertiesFour,
    LibertiesFive,
    LibertiesSix,
    LibertiesSeven,
    LibertiesEightOrMore,
}

impl InputChannel {
    /// Number of input channels.
    pub const COUNT: usize = 19;

    pub const fn index(self) -> usize {
        self as usize
    }

    /// The liberty bucket for a group, clamping 8 and above into the last.
    pub fn for_liberties(liberties: usize) -> InputChannel {
        match liberties {
            0 | 1 => InputChannel::LibertiesOne,
            2 => InputChannel::LibertiesTwo,
            3 => InputChannel::LibertiesThree,
            4 => InputChannel::LibertiesFour,
            5 => InputChannel::LibertiesFive,
            6 => InputChannel::LibertiesSix,
            7 => InputChannel::LibertiesSeven,
            _ => InputChannel::LibertiesEightOrMore,
        }
    }
}

/// The encoded input of one position.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureGrid {
    padding: usize,
    planes: Vec<Plane>,
}

impl FeatureGrid {
    pub fn padding(&self) -> usize {
        self.padding
    }

    pub fn breadth(&self) -> usize {
        self.planes[0].breadth()
    }

    pub fn channel(&self, channel: InputChannel) -> &Plane {
        &self.planes[channel.index()]
    }

    /// Value at grid `(row, column)` of `channel`; padding cells included.
    pub fn get(&self, channel: InputChannel, row: usize, column: usize) -> Option<f64> {
        self.planes[channel.index()].get(row, column)
    }

    /// Value at a board coordinate, skipping the padding offset.
    pub fn at(&self, channel: InputChannel, coordinate: Coordinate) -> Option<f64> {
        let (row, column) = coordinate.grid_index();
        self.get(channel, row + self.padding, column + self.padding)
    }

    pub(crate) fn planes(&self) -> &[Plane] {
        &self.planes
    }
}

/// Encodes `position` with the given padding.
///
/// Fails with `FinishedPosition` on a finished game and with `Internal` if
/// the position's history contradicts its own pass state.
pub fn encode<P: Position>(position: &P, padding: usize) -> Result<FeatureGrid> {
    let player = position.current_player().ok_or(Error::FinishedPosition)?;
    let opponent = player.opposite();
    let dimension = position.dimension();
    let breadth = dimension + padding * 2;

    let mut planes = vec![Plane::zeros(breadth); InputChannel::COUNT];
    let mut mark = |channel: InputChannel, coordinate: Coordinate| {
        let (row, column) = coordinate.grid_index();
        planes[channel.index()].set(row + padding, column + padding, 1.0);
    };

    let legal: HashSet<Move> = position.legal_moves().into_iter().collect();
    let after_pass = position.pass()?;
    let opponent_after_pass: HashSet<Move> = after_pass.legal_moves().into_iter().collect();
    let opponent_after_play: HashSet<Move> = if position.would_pass_end_game() {
        // The state before the opponent's pass.
        let before = position.previous_state().ok_or_else(|| Error::Internal {
            reason: "a pass would end the game but there is no previous state".to_string(),
            position: position.to_string(),
        })?;
        before.legal_moves().into_iter().collect()
    } else {
        opponent_after_pass.clone()
    };

    for coordinate in Coordinate::all(dimension) {
        mark(InputChannel::OnBoard, coordinate);

        let stone_channel = match position.get(coordinate) {
            Intersection::Stone(owner) if owner == player => InputChannel::PlayerStone,
            Intersection::Stone(owner) if owner == opponent => InputChannel::OpponentStone,
            _ => InputChannel::NoStone,
        };
        mark(stone_channel, coordinate);

        let mv = Move::Play(coordinate);
        mark(
            if legal.contains(&mv) {
                InputChannel::LegalMove
            } else {
                InputChannel::IllegalMove
            },
            coordinate,
        );
        mark(
            if opponent_after_pass.contains(&mv) {
                InputChannel::OpponentCouldPlayAfterPass
            } else {
                InputChannel::OpponentCouldNotPlayAfterPass
            },
            coordinate,
        );
        mark(
            if opponent_after_play.contains(&mv) {
                InputChannel::OpponentCouldPlayIfPassDidNotEndGame
            } else {
                InputChannel::OpponentCouldNotPlayIfPassDidNotEndGame
            },
            coordinate,
        );
    }

    for group in position.groups() {
        let channel = InputChannel::for_liberties(group.liberties);
        for &member in &group.members {
            mark(channel, member);
        }
    }

    let off_board = &mut planes[InputChannel::OffBoard.index()];
    let edge = dimension + padding;
    for row in 0..breadth {
        for column in 0..breadth {
            if row < padding || row >= edge || column < padding || column >= edge {
                off_board.set(row, column, 1.0);
            }
        }
    }

    Ok(FeatureGrid { padding, planes })
}
