//! Error types for game setup and shell-facing operations.

use std::fmt;

use crate::types::Position;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GameError {
    /// A configuration value is outside its accepted range
    InvalidConfig { field: &'static str, reason: String },
    /// The requested step is not in the current legal-move set
    InvalidMove { from: Position, to: Position },
    /// A coordinate lies outside the board
    OutOfBounds { row: usize, col: usize },
    /// A board diagram could not be parsed
    InvalidDiagram { reason: String },
    /// An installed position is not one turn away from the current one
    UnreachablePosition,
    /// The game already has a winner or is drawn
    GameOver,
    /// The side to move is human-controlled
    NotAiTurn,
    /// The side to move is AI-controlled
    AiToMove,
    /// The side to move has nothing to play
    NoLegalMoves,
}

impl fmt::Display for GameError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GameError::InvalidConfig { field, reason } => {
                write!(f, "invalid config field `{field}`: {reason}")
            }
            GameError::InvalidMove { from, to } => write!(
                f,
                "illegal move from ({}, {}) to ({}, {})",
                from.row, from.col, to.row, to.col
            ),
            GameError::OutOfBounds { row, col } => {
                write!(f, "coordinate ({row}, {col}) is outside the board")
            }
            GameError::InvalidDiagram { reason } => write!(f, "invalid board diagram: {reason}"),
            GameError::UnreachablePosition => {
                write!(f, "position is not reachable in one turn")
            }
            GameError::GameOver => write!(f, "game is already over"),
            GameError::NotAiTurn => write!(f, "it is not AI's turn"),
            GameError::AiToMove => write!(f, "the side to move is played by the AI"),
            GameError::NoLegalMoves => write!(f, "side to move has no legal moves"),
        }
    }
}

impl std::error::Error for GameError {}
