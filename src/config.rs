use serde::Deserialize;

use crate::error::GameError;
use crate::types::Color;

pub const DEFAULT_BOARD_SIZE: u8 = 8;
pub const MIN_BOARD_SIZE: u8 = 4;
pub const MAX_BOARD_SIZE: u8 = 16;
pub const DEFAULT_DRAW_THRESHOLD: u32 = 30;
pub const DEFAULT_AI_DEPTH: u8 = 3;
pub const DEFAULT_JITTER: f32 = 0.01;
/// Keeps the jitter below the positional and material terms of the evaluation.
pub const MAX_JITTER: f32 = 0.05;

/// Parameters owned by the presentation shell.
///
/// Deserializes from JSON or a JS object; missing fields take their defaults.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub board_size: u8,
    /// Search depth for light. `None` means a human plays this side.
    pub light_depth: Option<u8>,
    /// Search depth for dark. `None` means a human plays this side.
    pub dark_depth: Option<u8>,
    pub draw_threshold: u32,
    pub jitter: f32,
    pub seed: u64,
    pub time_limit_ms: Option<u64>,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            board_size: DEFAULT_BOARD_SIZE,
            light_depth: None,
            dark_depth: Some(DEFAULT_AI_DEPTH),
            draw_threshold: DEFAULT_DRAW_THRESHOLD,
            jitter: DEFAULT_JITTER,
            seed: 0,
            time_limit_ms: None,
        }
    }
}

impl GameConfig {
    pub fn validate(&self) -> Result<(), GameError> {
        if self.board_size % 2 != 0 {
            return Err(invalid("board_size", format!("{} is not even", self.board_size)));
        }
        if !(MIN_BOARD_SIZE..=MAX_BOARD_SIZE).contains(&self.board_size) {
            return Err(invalid(
                "board_size",
                format!(
                    "{} is outside {MIN_BOARD_SIZE}..={MAX_BOARD_SIZE}",
                    self.board_size
                ),
            ));
        }
        for (field, depth) in [
            ("light_depth", self.light_depth),
            ("dark_depth", self.dark_depth),
        ] {
            if depth == Some(0) {
                return Err(invalid(field, "AI depth must be at least 1".to_string()));
            }
        }
        if self.draw_threshold == 0 {
            return Err(invalid("draw_threshold", "must be at least 1".to_string()));
        }
        if !self.jitter.is_finite() || !(0.0..=MAX_JITTER).contains(&self.jitter) {
            return Err(invalid(
                "jitter",
                format!("{} is outside 0..={MAX_JITTER}", self.jitter),
            ));
        }
        Ok(())
    }

    pub fn depth_for(&self, color: Color) -> Option<u8> {
        match color {
            Color::Light => self.light_depth,
            Color::Dark => self.dark_depth,
        }
    }

    pub fn rules(&self) -> Rules {
        Rules::new(self.board_size, self.draw_threshold)
    }
}

fn invalid(field: &'static str, reason: String) -> GameError {
    GameError::InvalidConfig { field, reason }
}

/// Movement constants of one color, derived once from the board size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColorRules {
    /// Row delta of a plain forward step.
    pub forward: i8,
    pub promotion_row: u8,
}

/// Board-level rules carried by every `Board` clone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rules {
    pub size: u8,
    pub draw_threshold: u32,
    colors: [ColorRules; 2],
}

impl Rules {
    /// Caller contract: `size` is even and at least `MIN_BOARD_SIZE`.
    pub fn new(size: u8, draw_threshold: u32) -> Self {
        Self {
            size,
            draw_threshold,
            colors: [
                ColorRules {
                    forward: -1,
                    promotion_row: 0,
                },
                ColorRules {
                    forward: 1,
                    promotion_row: size - 1,
                },
            ],
        }
    }

    pub fn color(&self, color: Color) -> ColorRules {
        self.colors[color.index()]
    }

    /// Number of starting rows filled for each side.
    pub fn home_rows(&self) -> u8 {
        self.size / 2 - 1
    }
}

impl Default for Rules {
    fn default() -> Self {
        Self::new(DEFAULT_BOARD_SIZE, DEFAULT_DRAW_THRESHOLD)
    }
}
