use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

use crate::board::{Board, Outcome};
use crate::types::Color;

pub const MAN_VALUE: f32 = 3.0;
pub const KING_VALUE: f32 = 5.0;
/// Weight of the normalized advancement term. Each side's mean distance is a
/// fraction of `size - 1`, so the term spans at most `2 * ADVANCEMENT_WEIGHT`
/// between two positions. Together with jitter on both it stays below 1, the
/// smallest nonzero material gap (two men against a king).
pub const ADVANCEMENT_WEIGHT: f32 = 0.4;

impl Board {
    /// Static score from light's point of view: `+inf` when light has won,
    /// `-inf` when dark has, `0` for a draw, else material plus advancement.
    pub fn evaluate(&self) -> f32 {
        terminal_score(self).unwrap_or_else(|| heuristic(self))
    }
}

/// Leaf evaluator for the search: the static score plus a small symmetric
/// jitter on non-terminal positions.
#[derive(Debug, Clone)]
pub struct Evaluator {
    jitter: f32,
    rng: SmallRng,
}

impl Evaluator {
    pub fn new(jitter: f32, seed: u64) -> Self {
        Self {
            jitter: jitter.max(0.0),
            rng: SmallRng::seed_from_u64(seed),
        }
    }

    /// Evaluator without jitter; equal positions always score equally.
    pub fn deterministic() -> Self {
        Self::new(0.0, 0)
    }

    pub fn evaluate(&mut self, board: &Board) -> f32 {
        if let Some(score) = terminal_score(board) {
            return score;
        }
        let score = heuristic(board);
        if self.jitter > 0.0 {
            score + self.rng.gen_range(-self.jitter..=self.jitter)
        } else {
            score
        }
    }
}

fn terminal_score(board: &Board) -> Option<f32> {
    board.outcome().map(|outcome| match outcome {
        Outcome::Win(Color::Light) => f32::INFINITY,
        Outcome::Win(Color::Dark) => f32::NEG_INFINITY,
        Outcome::Draw => 0.0,
    })
}

fn heuristic(board: &Board) -> f32 {
    let material = material(board, Color::Light) - material(board, Color::Dark);
    // Fewer rows left to travel is better, so dark's distance counts for light.
    let advancement = average_distance(board, Color::Dark) - average_distance(board, Color::Light);
    material + ADVANCEMENT_WEIGHT * advancement
}

fn material(board: &Board, color: Color) -> f32 {
    let kings = board.kings(color) as f32;
    let men = board.pieces_left(color) as f32 - kings;
    men * MAN_VALUE + kings * KING_VALUE
}

/// Mean row distance of `color`'s men to their promotion row as a fraction of
/// `size - 1`; 0 without men.
fn average_distance(board: &Board, color: Color) -> f32 {
    let target = board.rules().color(color).promotion_row as i32;
    let span = (board.size() as f32 - 1.0).max(1.0);
    let (total, men) = board
        .pieces(color)
        .filter(|piece| !piece.king)
        .fold((0i32, 0i32), |(total, men), piece| {
            (total + (piece.position.row as i32 - target).abs(), men + 1)
        });

    if men == 0 {
        0.0
    } else {
        total as f32 / men as f32 / span
    }
}
