use crate::config::Rules;
use crate::error::GameError;
use crate::types::{Cell, Color, Piece, PieceId, Position};

/// Result of a finished game, seen from the board alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Win(Color),
    Draw,
}

/// Checkers position: a grid of cells indexing into a piece arena.
///
/// Cloning copies the grid and the arena in bulk, so a search branch can own
/// its board without sharing anything with its siblings.
#[derive(Debug, Clone, PartialEq)]
pub struct Board {
    rules: Rules,
    cells: Vec<Cell>,
    pieces: Vec<Option<Piece>>,
    pieces_left: [u8; 2],
    kings: [u8; 2],
    quiet_king_moves: u32,
    forced: Option<PieceId>,
    to_move: Color,
}

impl Board {
    /// Creates the initial position: dark fills the top `size / 2 - 1` rows,
    /// light the bottom ones, on playable squares only. Light moves first.
    pub fn new(rules: Rules) -> Self {
        let mut board = Self::empty(rules);
        let size = rules.size;
        let home = rules.home_rows();

        for row in 0..size {
            let color = if row < home {
                Color::Dark
            } else if row >= size - home {
                Color::Light
            } else {
                continue;
            };
            for col in 0..size {
                let pos = Position::new(row, col);
                if pos.is_playable() {
                    board.place_piece(pos, color, false);
                }
            }
        }

        board
    }

    /// Creates a board without pieces, light to move.
    pub fn empty(rules: Rules) -> Self {
        let cells = rules.size as usize * rules.size as usize;
        Self {
            rules,
            cells: vec![Cell::Empty; cells],
            pieces: Vec::new(),
            pieces_left: [0; 2],
            kings: [0; 2],
            quiet_king_moves: 0,
            forced: None,
            to_move: Color::Light,
        }
    }

    /// Builds a position from one string per row:
    /// `.` empty, `l`/`L` light man/king, `d`/`D` dark man/king.
    /// Spaces are ignored. Light is to move.
    pub fn from_rows(rules: Rules, rows: &[&str]) -> Result<Self, GameError> {
        let size = rules.size as usize;
        if rows.len() != size {
            return Err(diagram_error(format!(
                "expected {size} rows, got {}",
                rows.len()
            )));
        }

        let mut board = Self::empty(rules);
        for (row, line) in rows.iter().enumerate() {
            let cells: Vec<char> = line.chars().filter(|c| !c.is_whitespace()).collect();
            if cells.len() != size {
                return Err(diagram_error(format!(
                    "row {row} has {} cells, expected {size}",
                    cells.len()
                )));
            }
            for (col, ch) in cells.into_iter().enumerate() {
                let (color, king) = match ch {
                    '.' => continue,
                    'l' => (Color::Light, false),
                    'L' => (Color::Light, true),
                    'd' => (Color::Dark, false),
                    'D' => (Color::Dark, true),
                    other => {
                        return Err(diagram_error(format!(
                            "unknown cell '{other}' at ({row}, {col})"
                        )));
                    }
                };
                let pos = Position::new(row as u8, col as u8);
                if board.place_piece(pos, color, king).is_none() {
                    return Err(diagram_error(format!(
                        "({row}, {col}) is not a playable square"
                    )));
                }
            }
        }

        Ok(board)
    }

    /// Adds a new piece for position setup. Returns `None` when the square is
    /// off-board, unplayable or occupied.
    pub fn place_piece(&mut self, pos: Position, color: Color, king: bool) -> Option<PieceId> {
        let idx = self.cell_index(pos)?;
        if !pos.is_playable() || self.cells[idx] != Cell::Empty {
            return None;
        }

        let id = PieceId(self.pieces.len() as u16);
        self.pieces.push(Some(Piece {
            id,
            color,
            king,
            position: pos,
        }));
        self.cells[idx] = Cell::Occupied(id);
        self.pieces_left[color.index()] += 1;
        if king {
            self.kings[color.index()] += 1;
        }

        Some(id)
    }

    pub fn rules(&self) -> &Rules {
        &self.rules
    }

    pub fn size(&self) -> u8 {
        self.rules.size
    }

    pub fn to_move(&self) -> Color {
        self.to_move
    }

    /// Overrides the side to move, for position setup.
    pub fn set_to_move(&mut self, color: Color) {
        self.to_move = color;
    }

    /// The piece that must continue its capture chain, if a chain is open.
    pub fn forced_piece(&self) -> Option<PieceId> {
        self.forced
    }

    pub(crate) fn set_forced_piece(&mut self, forced: Option<PieceId>) {
        self.forced = forced;
    }

    pub fn pieces_left(&self, color: Color) -> u8 {
        self.pieces_left[color.index()]
    }

    pub fn kings(&self, color: Color) -> u8 {
        self.kings[color.index()]
    }

    /// Consecutive king moves without a capture.
    pub fn quiet_king_moves(&self) -> u32 {
        self.quiet_king_moves
    }

    pub fn piece(&self, id: PieceId) -> Option<&Piece> {
        self.pieces.get(id.index()).and_then(Option::as_ref)
    }

    pub fn piece_at(&self, pos: Position) -> Option<&Piece> {
        let idx = self.cell_index(pos)?;
        self.cells[idx].piece_id().and_then(|id| self.piece(id))
    }

    /// Pieces of `color` still on the board, in creation order.
    pub fn pieces(&self, color: Color) -> impl Iterator<Item = &Piece> + '_ {
        self.pieces
            .iter()
            .flatten()
            .filter(move |piece| piece.color == color)
    }

    pub fn is_empty_at(&self, pos: Position) -> bool {
        self.cell_index(pos)
            .is_some_and(|idx| self.cells[idx] == Cell::Empty)
    }

    /// Steps `(dr, dc) * distance` from `pos`, or `None` off the board.
    pub fn offset(&self, pos: Position, dr: i32, dc: i32, distance: i32) -> Option<Position> {
        let row = pos.row as i32 + dr * distance;
        let col = pos.col as i32 + dc * distance;
        if in_bounds(row, col, self.rules.size) {
            Some(Position::new(row as u8, col as u8))
        } else {
            None
        }
    }

    /// Relocates a piece without resolving captures or promotion.
    /// Returns `false` and leaves the board unchanged when the piece is gone
    /// or `dest` is off-board, unplayable or occupied.
    pub fn apply_move(&mut self, id: PieceId, dest: Position) -> bool {
        let Some(from) = self.piece(id).map(|piece| piece.position) else {
            return false;
        };
        let Some(to_idx) = self.cell_index(dest) else {
            return false;
        };
        if !dest.is_playable() || self.cells[to_idx] != Cell::Empty {
            return false;
        }
        let Some(from_idx) = self.cell_index(from) else {
            return false;
        };

        self.cells[from_idx] = Cell::Empty;
        self.cells[to_idx] = Cell::Occupied(id);
        if let Some(piece) = self.pieces[id.index()].as_mut() {
            piece.position = dest;
        }

        true
    }

    /// Crowns a man standing on its promotion row. Returns whether the piece
    /// was promoted by this call; kings are left untouched.
    pub fn try_promote(&mut self, id: PieceId) -> bool {
        let rules = self.rules;
        let Some(piece) = self.pieces.get_mut(id.index()).and_then(Option::as_mut) else {
            return false;
        };
        if piece.king || piece.position.row != rules.color(piece.color).promotion_row {
            return false;
        }

        piece.king = true;
        self.kings[piece.color.index()] += 1;
        true
    }

    /// Takes the piece at `at` off the board. No-op on an empty cell.
    pub fn remove_piece(&mut self, at: Position) -> Option<Piece> {
        let idx = self.cell_index(at)?;
        let id = self.cells[idx].piece_id()?;
        let piece = self.pieces[id.index()].take()?;

        self.cells[idx] = Cell::Empty;
        self.pieces_left[piece.color.index()] -= 1;
        if piece.king {
            self.kings[piece.color.index()] -= 1;
        }
        if self.forced == Some(id) {
            self.forced = None;
        }

        Some(piece)
    }

    /// Updates the king-shuffle counter after one step.
    pub(crate) fn record_step(&mut self, moved_king: bool, captured: bool) {
        if captured || !moved_king {
            self.quiet_king_moves = 0;
        } else {
            self.quiet_king_moves += 1;
        }
    }

    /// Hands the move to the other side and closes any capture chain.
    pub(crate) fn end_turn(&mut self) {
        self.forced = None;
        self.to_move = self.to_move.opponent();
    }

    /// `true` when `next`, the color about to move, has no piece or no legal move.
    pub fn is_won(&self, next: Color) -> bool {
        self.pieces_left(next) == 0 || self.legal_moves(next).is_empty()
    }

    pub fn is_draw(&self) -> bool {
        self.quiet_king_moves >= self.rules.draw_threshold
    }

    /// A win for the side that just moved takes precedence over a draw.
    pub fn outcome(&self) -> Option<Outcome> {
        if self.is_won(self.to_move) {
            Some(Outcome::Win(self.to_move.opponent()))
        } else if self.is_draw() {
            Some(Outcome::Draw)
        } else {
            None
        }
    }

    /// Converts the board to row-major codes:
    /// 0=empty, 1=light, 2=dark, 3=light king, 4=dark king.
    pub fn to_array(&self) -> Vec<u8> {
        self.cells
            .iter()
            .map(|cell| match cell.piece_id().and_then(|id| self.piece(id)) {
                None => 0,
                Some(piece) => piece.color.code() + if piece.king { 2 } else { 0 },
            })
            .collect()
    }

    /// Recounts the arena and cross-checks it against the grid and the
    /// incremental counters.
    pub fn is_consistent(&self) -> bool {
        let mut left = [0u8; 2];
        let mut kings = [0u8; 2];

        for piece in self.pieces.iter().flatten() {
            let Some(idx) = self.cell_index(piece.position) else {
                return false;
            };
            if !piece.position.is_playable() || self.cells[idx] != Cell::Occupied(piece.id) {
                return false;
            }
            left[piece.color.index()] += 1;
            if piece.king {
                kings[piece.color.index()] += 1;
            }
        }

        let occupied = self.cells.iter().filter(|c| **c != Cell::Empty).count();
        occupied == left.iter().map(|&n| n as usize).sum::<usize>()
            && left == self.pieces_left
            && kings == self.kings
    }

    fn cell_index(&self, pos: Position) -> Option<usize> {
        let size = self.rules.size;
        if pos.row < size && pos.col < size {
            Some(pos.row as usize * size as usize + pos.col as usize)
        } else {
            None
        }
    }
}

impl Default for Board {
    fn default() -> Self {
        Self::new(Rules::default())
    }
}

fn in_bounds(row: i32, col: i32, size: u8) -> bool {
    (0..size as i32).contains(&row) && (0..size as i32).contains(&col)
}

fn diagram_error(reason: String) -> GameError {
    GameError::InvalidDiagram { reason }
}
