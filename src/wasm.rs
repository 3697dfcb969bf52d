//! Browser-facing bindings. Values cross the boundary as plain JS objects.

use serde::Serialize;
use wasm_bindgen::prelude::*;

use crate::config::GameConfig;
use crate::error::GameError;
use crate::game::GameSession;
use crate::types::{MoveHint, Position};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PieceMoves {
    pub from: Position,
    pub moves: Vec<MoveHint>,
}

#[wasm_bindgen]
pub struct WasmGame {
    session: GameSession,
}

#[wasm_bindgen]
impl WasmGame {
    /// Accepts `undefined`/`null` for the default configuration.
    #[wasm_bindgen(constructor)]
    pub fn new(config: JsValue) -> Result<WasmGame, JsValue> {
        let config: GameConfig = if config.is_undefined() || config.is_null() {
            GameConfig::default()
        } else {
            serde_wasm_bindgen::from_value(config)?
        };
        let session = GameSession::with_search(config).map_err(to_js_error)?;
        Ok(WasmGame { session })
    }

    pub fn reset(&mut self) {
        self.session.reset();
    }

    pub fn select_cell(&mut self, row: usize, col: usize) -> bool {
        self.session.select_cell(row, col)
    }

    pub fn is_ai_turn(&self) -> bool {
        self.session.is_ai_turn()
    }

    pub fn play_ai_turn(&mut self) -> Result<JsValue, JsValue> {
        self.session.play_ai_turn().map_err(to_js_error)?;
        self.state()
    }

    pub fn state(&self) -> Result<JsValue, JsValue> {
        to_js(&self.session.to_game_state())
    }

    /// Legal moves of the side to move grouped by origin square.
    pub fn legal_moves(&self) -> Result<JsValue, JsValue> {
        let board = self.session.board();
        let legal = self.session.current_legal_moves();
        let grouped: Vec<PieceMoves> = legal
            .moves
            .iter()
            .filter_map(|(id, dests)| {
                let from = board.piece(*id)?.position;
                let moves = dests
                    .iter()
                    .map(|(&to, &captured)| MoveHint { to, captured })
                    .collect();
                Some(PieceMoves { from, moves })
            })
            .collect();
        to_js(&grouped)
    }
}

fn to_js<T: Serialize>(value: &T) -> Result<JsValue, JsValue> {
    serde_wasm_bindgen::to_value(value).map_err(JsValue::from)
}

fn to_js_error(err: GameError) -> JsValue {
    JsValue::from_str(&err.to_string())
}
