use wasm_bindgen::prelude::*;

pub mod ai;
pub mod board;
pub mod config;
pub mod error;
pub mod game;
pub mod movegen;
pub mod turn;
pub mod types;
pub mod wasm;

pub use board::{Board, Outcome};
pub use config::{GameConfig, Rules};
pub use error::GameError;
pub use game::GameSession;
pub use movegen::LegalMoves;
pub use turn::{StepResult, Turn};
pub use types::{Color, Piece, PieceId, Position};

#[wasm_bindgen]
pub fn wasm_ready() -> bool {
    true
}
