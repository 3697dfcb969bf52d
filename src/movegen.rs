//! Legal-move generation: mandatory captures, backward captures for men and
//! flying kings.

use std::collections::BTreeMap;

use crate::board::Board;
use crate::types::{Color, Piece, PieceId, Position};

const DIAGONALS: [(i32, i32); 4] = [(-1, -1), (-1, 1), (1, -1), (1, 1)];

/// Destination -> captured square (`None` for a plain move).
pub type Destinations = BTreeMap<Position, Option<Position>>;

/// All legal destinations of one color, keyed by piece.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LegalMoves {
    pub moves: BTreeMap<PieceId, Destinations>,
    pub has_capture: bool,
}

impl LegalMoves {
    pub fn is_empty(&self) -> bool {
        self.moves.is_empty()
    }

    /// Total destinations over all pieces.
    pub fn len(&self) -> usize {
        self.moves.values().map(BTreeMap::len).sum()
    }

    pub fn destinations(&self, id: PieceId) -> Option<&Destinations> {
        self.moves.get(&id)
    }

    pub fn contains(&self, id: PieceId, dest: Position) -> bool {
        self.moves
            .get(&id)
            .is_some_and(|dests| dests.contains_key(&dest))
    }

    /// `Some(captured)` when `dest` is legal for `id`; the inner option is the
    /// jumped square.
    pub fn captured_at(&self, id: PieceId, dest: Position) -> Option<Option<Position>> {
        self.moves.get(&id).and_then(|dests| dests.get(&dest).copied())
    }
}

impl Board {
    /// Legal moves of `color` with mandatory capture applied. While a capture
    /// chain is open for `color`, only the chaining piece's captures remain.
    pub fn legal_moves(&self, color: Color) -> LegalMoves {
        if let Some(forced) = self.forced_piece()
            && let Some(piece) = self.piece(forced)
            && piece.color == color
        {
            let mut dests = self.moves_for_piece(piece);
            dests.retain(|_, captured| captured.is_some());
            let mut moves = BTreeMap::new();
            if !dests.is_empty() {
                moves.insert(forced, dests);
            }
            return LegalMoves {
                has_capture: !moves.is_empty(),
                moves,
            };
        }

        let mut moves: BTreeMap<PieceId, Destinations> = BTreeMap::new();
        let mut has_capture = false;
        for piece in self.pieces(color) {
            let dests = self.moves_for_piece(piece);
            has_capture |= dests.values().any(Option::is_some);
            if !dests.is_empty() {
                moves.insert(piece.id, dests);
            }
        }

        if has_capture {
            for dests in moves.values_mut() {
                dests.retain(|_, captured| captured.is_some());
            }
            moves.retain(|_, dests| !dests.is_empty());
        }

        LegalMoves { moves, has_capture }
    }

    /// Capturing destinations reachable by one piece from where it stands.
    pub fn captures_for(&self, id: PieceId) -> Destinations {
        let Some(piece) = self.piece(id) else {
            return Destinations::new();
        };
        let mut dests = self.moves_for_piece(piece);
        dests.retain(|_, captured| captured.is_some());
        dests
    }

    /// Every destination of one piece, before mandatory-capture pruning.
    pub fn moves_for_piece(&self, piece: &Piece) -> Destinations {
        let mut dests = Destinations::new();
        for (dr, dc) in DIAGONALS {
            if piece.king {
                self.scan_king_ray(piece, dr, dc, &mut dests);
            } else {
                self.scan_man_step(piece, dr, dc, &mut dests);
            }
        }
        dests
    }

    fn scan_man_step(&self, piece: &Piece, dr: i32, dc: i32, dests: &mut Destinations) {
        let forward = self.rules().color(piece.color).forward as i32;
        let Some(next) = self.offset(piece.position, dr, dc, 1) else {
            return;
        };

        match self.piece_at(next) {
            None => {
                if dr == forward {
                    dests.insert(next, None);
                }
            }
            Some(other) if other.color != piece.color => {
                if let Some(landing) = self.offset(piece.position, dr, dc, 2)
                    && self.is_empty_at(landing)
                {
                    dests.insert(landing, Some(next));
                }
            }
            Some(_) => {}
        }
    }

    fn scan_king_ray(&self, piece: &Piece, dr: i32, dc: i32, dests: &mut Destinations) {
        let mut captured: Option<Position> = None;
        let mut distance = 1;

        while let Some(cell) = self.offset(piece.position, dr, dc, distance) {
            match self.piece_at(cell) {
                None => {
                    dests.insert(cell, captured);
                }
                Some(other) if other.color != piece.color && captured.is_none() => {
                    captured = Some(cell);
                }
                Some(_) => break,
            }
            distance += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Rules;

    fn pos(row: u8, col: u8) -> Position {
        Position::new(row, col)
    }

    fn setup(rows: &[&str]) -> Board {
        Board::from_rows(Rules::default(), rows).unwrap()
    }

    fn id_at(board: &Board, at: Position) -> PieceId {
        board.piece_at(at).map(|p| p.id).unwrap()
    }

    #[test]
    fn initial_light_moves_are_seven_forward_steps() {
        let board = Board::default();
        let legal = board.legal_moves(Color::Light);

        assert!(!legal.has_capture);
        assert_eq!(legal.moves.len(), 4);
        assert_eq!(legal.len(), 7);
        for dests in legal.moves.values() {
            assert!(dests.keys().all(|d| d.row == 4));
            assert!(dests.values().all(Option::is_none));
        }
    }

    #[test]
    fn light_man_captures_toward_row_zero() {
        let board = setup(&[
            "........", "..d.....", ".l......", "........", "........", "........",
            "........", "........",
        ]);
        let light = id_at(&board, pos(2, 1));
        let legal = board.legal_moves(Color::Light);

        assert!(legal.has_capture);
        assert_eq!(legal.captured_at(light, pos(0, 3)), Some(Some(pos(1, 2))));
        assert_eq!(legal.len(), 1);
    }

    #[test]
    fn man_captures_backward_but_only_steps_forward() {
        let board = setup(&[
            "........", "........", "........", "........", "...l....", "........",
            "...d....", "........",
        ]);
        let light = id_at(&board, pos(4, 3));

        let quiet = board.legal_moves(Color::Light);
        assert!(!quiet.has_capture);
        assert_eq!(
            quiet.destinations(light).unwrap().keys().copied().collect::<Vec<_>>(),
            vec![pos(3, 2), pos(3, 4)]
        );

        let board = board_with_backward_target();
        let light = id_at(&board, pos(4, 3));
        let legal = board.legal_moves(Color::Light);
        assert!(legal.has_capture);
        assert_eq!(legal.captured_at(light, pos(6, 5)), Some(Some(pos(5, 4))));
    }

    fn board_with_backward_target() -> Board {
        setup(&[
            "........", "........", "........", "........", "...l....", "....d...",
            "........", "........",
        ])
    }

    #[test]
    fn mandatory_capture_prunes_other_pieces() {
        let board = setup(&[
            "........", "........", "........", "..d.....", ".l......", "........",
            ".....l..", "........",
        ]);
        let capturer = id_at(&board, pos(4, 1));
        let legal = board.legal_moves(Color::Light);

        assert!(legal.has_capture);
        assert_eq!(legal.moves.len(), 1);
        assert!(legal.contains(capturer, pos(2, 3)));
        assert!(legal.moves.values().flat_map(|d| d.values()).all(Option::is_some));
    }

    #[test]
    fn capture_needs_an_on_board_landing_square() {
        let board = setup(&[
            "........", "........", "........", "d.......", ".l......", "........",
            "........", "........",
        ]);
        let legal = board.legal_moves(Color::Light);
        let light = id_at(&board, pos(4, 1));

        assert!(!legal.has_capture);
        assert_eq!(
            legal.destinations(light).unwrap().keys().copied().collect::<Vec<_>>(),
            vec![pos(3, 2)]
        );
    }

    #[test]
    fn king_slides_until_blocked() {
        let board = setup(&[
            "........", "........", "........", "........", "........", "........",
            ".l......", "L.......",
        ]);
        let king = id_at(&board, pos(7, 0));
        let legal = board.legal_moves(Color::Light);

        assert!(legal.destinations(king).is_none());

        let board = board_with_open_king();
        let king = id_at(&board, pos(7, 0));
        let legal = board.legal_moves(Color::Light);
        let dests: Vec<Position> = legal.destinations(king).unwrap().keys().copied().collect();
        assert_eq!(
            dests,
            vec![pos(0, 7), pos(1, 6), pos(2, 5), pos(3, 4), pos(4, 3), pos(5, 2), pos(6, 1)]
        );
    }

    fn board_with_open_king() -> Board {
        setup(&[
            "........", "........", "........", "........", "........", "........",
            "........", "L.......",
        ])
    }

    #[test]
    fn king_capture_offers_every_landing_square_past_the_victim() {
        let board = setup(&[
            "........", "........", "........", "........", "...d....", "........",
            ".L......", "........",
        ]);
        let king = id_at(&board, pos(6, 1));
        let legal = board.legal_moves(Color::Light);

        assert!(legal.has_capture);
        let dests = legal.destinations(king).unwrap();
        assert_eq!(
            dests.keys().copied().collect::<Vec<_>>(),
            vec![pos(0, 7), pos(1, 6), pos(2, 5), pos(3, 4)]
        );
        assert!(dests.values().all(|c| *c == Some(pos(4, 3))));
    }

    #[test]
    fn king_ray_stops_at_two_adjacent_opponents_and_own_pieces() {
        let board = setup(&[
            "........", "........", "........", "........", "...d....", "..d.....",
            ".L......", "........",
        ]);
        let king = id_at(&board, pos(6, 1));
        let legal = board.legal_moves(Color::Light);
        assert!(!legal.has_capture);
        let dests = legal.destinations(king).unwrap();
        assert!(!dests.contains_key(&pos(3, 4)));

        let board = board_with_own_blocker();
        let king = id_at(&board, pos(6, 1));
        let legal = board.legal_moves(Color::Light);
        assert_eq!(
            legal.destinations(king).unwrap().keys().copied().collect::<Vec<_>>(),
            vec![pos(4, 3)]
        );
    }

    fn board_with_own_blocker() -> Board {
        setup(&[
            "........", "........", "........", "....l...", "........", "..d.....",
            ".L......", "........",
        ])
    }

    #[test]
    fn forced_piece_is_the_only_mover() {
        let mut board = setup(&[
            "........", "........", "........", "..d.....", ".l......", "........",
            "...d.l..", "..l.....",
        ]);
        let chaser = id_at(&board, pos(4, 1));
        board.set_forced_piece(Some(chaser));
        let legal = board.legal_moves(Color::Light);

        assert_eq!(legal.moves.keys().copied().collect::<Vec<_>>(), vec![chaser]);
        assert!(legal.contains(chaser, pos(2, 3)));
    }

    #[test]
    fn edge_pieces_never_index_outside_the_grid() {
        let board = setup(&[
            ".D.....D", "........", "........", "........", "........", "........",
            "........", "L.....L.",
        ]);

        assert_eq!(board.legal_moves(Color::Dark).len(), 7 + 6);
        assert!(!board.legal_moves(Color::Light).is_empty());
    }
}
