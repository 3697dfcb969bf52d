//! Turn resolution: one step at a time for the interactive controller, or
//! whole capture chains at once for the search.

use log::trace;

use crate::board::Board;
use crate::types::{PieceId, Position};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepResult {
    /// The piece captured and has another capture; the turn stays open.
    Continue,
    /// The turn is over and the other side is to move.
    Finished,
}

/// One complete turn and the position it leads to.
#[derive(Debug, Clone, PartialEq)]
pub struct Turn {
    pub piece: PieceId,
    /// Squares visited, origin first.
    pub path: Vec<Position>,
    /// Jumped squares in capture order.
    pub captured: Vec<Position>,
    pub board: Board,
}

impl Turn {
    pub fn is_capture(&self) -> bool {
        !self.captured.is_empty()
    }
}

impl Board {
    /// Plays one step of the side to move: relocate, remove the jumped piece,
    /// update the draw counter, then either keep the chain open or promote
    /// and pass the turn. Returns `None` without changes when the relocation
    /// is rejected.
    ///
    /// Caller contract: `(dest, captured)` comes from `legal_moves`.
    pub fn play_step(
        &mut self,
        id: PieceId,
        dest: Position,
        captured: Option<Position>,
    ) -> Option<StepResult> {
        let moved_king = self.piece(id)?.king;
        if !self.apply_move(id, dest) {
            return None;
        }

        if let Some(at) = captured {
            let removed = self.remove_piece(at);
            debug_assert!(removed.is_some(), "capture target must be occupied");
        }
        self.record_step(moved_king, captured.is_some());

        if captured.is_some() && !self.captures_for(id).is_empty() {
            trace!("piece {} continues its chain from {:?}", id.0, dest);
            self.set_forced_piece(Some(id));
            return Some(StepResult::Continue);
        }

        self.try_promote(id);
        self.end_turn();
        Some(StepResult::Finished)
    }

    /// Every fully resolved turn available to the side to move, in move
    /// generation order. Capture chains branch on each continuation.
    pub fn turns(&self) -> Vec<Turn> {
        let legal = self.legal_moves(self.to_move());
        let mut out = Vec::with_capacity(legal.len());

        for (&id, dests) in &legal.moves {
            let Some(origin) = self.piece(id).map(|piece| piece.position) else {
                continue;
            };
            for (&dest, &captured) in dests {
                let chain = Chain {
                    piece: id,
                    path: vec![origin],
                    captured: Vec::new(),
                };
                resolve_chain(self.clone(), chain, dest, captured, &mut out);
            }
        }

        out
    }
}

struct Chain {
    piece: PieceId,
    path: Vec<Position>,
    captured: Vec<Position>,
}

fn resolve_chain(
    mut board: Board,
    mut chain: Chain,
    dest: Position,
    captured: Option<Position>,
    out: &mut Vec<Turn>,
) {
    let Some(step) = board.play_step(chain.piece, dest, captured) else {
        debug_assert!(false, "generated step must apply");
        return;
    };
    chain.path.push(dest);
    chain.captured.extend(captured);

    match step {
        StepResult::Finished => out.push(Turn {
            piece: chain.piece,
            path: chain.path,
            captured: chain.captured,
            board,
        }),
        StepResult::Continue => {
            for (next, jumped) in board.captures_for(chain.piece) {
                let branch = Chain {
                    piece: chain.piece,
                    path: chain.path.clone(),
                    captured: chain.captured.clone(),
                };
                resolve_chain(board.clone(), branch, next, jumped, out);
            }
        }
    }
}
