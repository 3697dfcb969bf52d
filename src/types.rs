use serde::Serialize;

/// Side of the board. Light moves first and advances toward row 0.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Color {
    Light,
    Dark,
}

impl Color {
    pub fn opponent(self) -> Self {
        match self {
            Color::Light => Color::Dark,
            Color::Dark => Color::Light,
        }
    }

    /// Index into per-color arrays.
    pub fn index(self) -> usize {
        match self {
            Color::Light => 0,
            Color::Dark => 1,
        }
    }

    /// Numeric code used in shell snapshots: 1=light, 2=dark.
    pub fn code(self) -> u8 {
        match self {
            Color::Light => 1,
            Color::Dark => 2,
        }
    }
}

/// A board coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct Position {
    pub row: u8,
    pub col: u8,
}

impl Position {
    pub const fn new(row: u8, col: u8) -> Self {
        Self { row, col }
    }

    /// Only dark squares, where `row + col` is odd, ever hold a piece.
    pub fn is_playable(self) -> bool {
        (u16::from(self.row) + u16::from(self.col)) % 2 == 1
    }
}

/// Stable arena index of a piece, assigned when the piece is created.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PieceId(pub u16);

impl PieceId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Piece {
    pub id: PieceId,
    pub color: Color,
    pub king: bool,
    pub position: Position,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Cell {
    #[default]
    Empty,
    Occupied(PieceId),
}

impl Cell {
    pub fn piece_id(self) -> Option<PieceId> {
        match self {
            Cell::Empty => None,
            Cell::Occupied(id) => Some(id),
        }
    }
}

/// One highlighted destination for the selected piece.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MoveHint {
    pub to: Position,
    pub captured: Option<Position>,
}

/// Public game state returned from WASM APIs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GameState {
    pub size: u8,
    /// Row-major cells: 0=empty, 1=light, 2=dark, 3=light king, 4=dark king.
    pub board: Vec<u8>,
    pub active_color: u8,
    pub light_count: u8,
    pub dark_count: u8,
    pub light_kings: u8,
    pub dark_kings: u8,
    pub selected: Option<Position>,
    pub hints: Vec<MoveHint>,
    /// Contract:
    /// - `Some(position)` while a capture chain must be continued by that piece.
    /// - `None` at all other times.
    pub forced: Option<Position>,
    pub winner: Option<u8>,
    pub is_draw: bool,
    pub is_game_over: bool,
}
