use log::debug;
use web_time::Duration;

use crate::ai::{Evaluator, Searcher};
use crate::board::{Board, Outcome};
use crate::config::GameConfig;
use crate::error::GameError;
use crate::movegen::{Destinations, LegalMoves};
use crate::turn::StepResult;
use crate::types::{Color, GameState, MoveHint, Piece, PieceId, Position};

/// Picks the position an AI-controlled side moves to.
pub trait TurnSelector: Send {
    fn select_turn(&mut self, board: &Board, depth: u8) -> Option<Board>;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct FirstTurnSelector;

impl TurnSelector for FirstTurnSelector {
    fn select_turn(&mut self, board: &Board, _depth: u8) -> Option<Board> {
        board.turns().into_iter().next().map(|turn| turn.board)
    }
}

/// Alpha-beta search configured from the game settings.
pub struct SearchSelector {
    searcher: Searcher,
}

impl SearchSelector {
    pub fn new(config: &GameConfig) -> Self {
        let evaluator = Evaluator::new(config.jitter, config.seed);
        let searcher = match config.time_limit_ms {
            Some(ms) => Searcher::with_timeout(evaluator, Duration::from_millis(ms)),
            None => Searcher::new(evaluator),
        };
        Self { searcher }
    }
}

impl TurnSelector for SearchSelector {
    fn select_turn(&mut self, board: &Board, depth: u8) -> Option<Board> {
        let outcome = self.searcher.search(board, depth);
        debug!(
            "{:?} search: depth {} score {} nodes {} timed_out {}",
            board.to_move(),
            outcome.depth,
            outcome.score,
            outcome.nodes,
            outcome.timed_out
        );
        outcome.best
    }
}

/// One game in progress: the live board plus selection and result state.
pub struct GameSession {
    config: GameConfig,
    board: Board,
    selected: Option<PieceId>,
    pending: Destinations,
    winner: Option<Color>,
    is_draw: bool,
    selector: Box<dyn TurnSelector>,
}

impl GameSession {
    pub fn new(config: GameConfig, selector: Box<dyn TurnSelector>) -> Result<Self, GameError> {
        config.validate()?;
        let board = Board::new(config.rules());
        Ok(Self {
            config,
            board,
            selected: None,
            pending: Destinations::new(),
            winner: None,
            is_draw: false,
            selector,
        })
    }

    /// New game whose AI sides use alpha-beta search.
    pub fn with_search(config: GameConfig) -> Result<Self, GameError> {
        let selector = SearchSelector::new(&config);
        Self::new(config, Box::new(selector))
    }

    /// Starts over with the same configuration and selector.
    pub fn reset(&mut self) {
        self.board = Board::new(self.config.rules());
        self.clear_selection();
        self.winner = None;
        self.is_draw = false;
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn active_color(&self) -> Color {
        self.board.to_move()
    }

    pub fn winner(&self) -> Option<Color> {
        self.winner
    }

    pub fn is_draw(&self) -> bool {
        self.is_draw
    }

    pub fn is_game_over(&self) -> bool {
        self.winner.is_some() || self.is_draw
    }

    pub fn is_ai_turn(&self) -> bool {
        !self.is_game_over() && self.config.depth_for(self.active_color()).is_some()
    }

    pub fn selected(&self) -> Option<&Piece> {
        self.selected.and_then(|id| self.board.piece(id))
    }

    /// Destinations of the selected piece, for highlighting.
    pub fn selected_moves(&self) -> &Destinations {
        &self.pending
    }

    /// Legal moves of the side to move, restricted to the chaining piece
    /// while a capture chain is open.
    pub fn current_legal_moves(&self) -> LegalMoves {
        self.board.legal_moves(self.active_color())
    }

    /// Validates a shell coordinate.
    pub fn position(&self, row: usize, col: usize) -> Result<Position, GameError> {
        let size = self.board.size() as usize;
        if row >= size || col >= size {
            return Err(GameError::OutOfBounds { row, col });
        }
        Ok(Position::new(row as u8, col as u8))
    }

    /// Click handler. With a piece selected, a legal destination plays that
    /// step; anything else drops the selection (unless a chain is open) and
    /// tries to select the clicked piece instead. Returns whether the click
    /// changed the selection or the board.
    pub fn select_cell(&mut self, row: usize, col: usize) -> bool {
        if self.is_game_over() || self.is_ai_turn() {
            return false;
        }
        let Ok(pos) = self.position(row, col) else {
            return false;
        };

        if let Some(selected) = self.selected() {
            let from = selected.position;
            if self.pending.contains_key(&pos) {
                return self.move_piece(from, pos).is_ok();
            }
            if self.board.forced_piece().is_none() {
                self.clear_selection();
            }
        }

        self.select_piece(pos)
    }

    /// Plays one legal step for the side to move.
    pub fn move_piece(&mut self, from: Position, to: Position) -> Result<StepResult, GameError> {
        if self.is_game_over() {
            return Err(GameError::GameOver);
        }
        if self.is_ai_turn() {
            return Err(GameError::AiToMove);
        }
        let color = self.active_color();
        let invalid = GameError::InvalidMove { from, to };
        let id = self
            .board
            .piece_at(from)
            .filter(|piece| piece.color == color)
            .map(|piece| piece.id)
            .ok_or_else(|| invalid.clone())?;
        let captured = self
            .current_legal_moves()
            .captured_at(id, to)
            .ok_or_else(|| invalid.clone())?;

        let step = self.board.play_step(id, to, captured).ok_or(invalid)?;
        match step {
            StepResult::Continue => {
                self.selected = Some(id);
                self.pending = self.board.captures_for(id);
            }
            StepResult::Finished => {
                self.clear_selection();
                self.refresh_status();
            }
        }

        Ok(step)
    }

    /// Installs a position chosen by the search and hands over the turn.
    pub fn apply_ai_move(&mut self, board: Board) -> Result<(), GameError> {
        if self.is_game_over() {
            return Err(GameError::GameOver);
        }
        if !self.board.turns().iter().any(|turn| turn.board == board) {
            return Err(GameError::UnreachablePosition);
        }

        self.board = board;
        self.clear_selection();
        self.refresh_status();
        Ok(())
    }

    /// Lets the configured selector play a full turn for the side to move.
    pub fn play_ai_turn(&mut self) -> Result<(), GameError> {
        if self.is_game_over() {
            return Err(GameError::GameOver);
        }
        let color = self.active_color();
        let depth = self.config.depth_for(color).ok_or(GameError::NotAiTurn)?;

        let best = self
            .selector
            .select_turn(&self.board, depth)
            .ok_or(GameError::NoLegalMoves)?;
        debug!("{color:?} AI turn applied at depth {depth}");
        self.apply_ai_move(best)
    }

    pub fn to_game_state(&self) -> GameState {
        let board = &self.board;
        GameState {
            size: board.size(),
            board: board.to_array(),
            active_color: self.active_color().code(),
            light_count: board.pieces_left(Color::Light),
            dark_count: board.pieces_left(Color::Dark),
            light_kings: board.kings(Color::Light),
            dark_kings: board.kings(Color::Dark),
            selected: self.selected().map(|piece| piece.position),
            hints: self
                .pending
                .iter()
                .map(|(&to, &captured)| MoveHint { to, captured })
                .collect(),
            forced: board
                .forced_piece()
                .and_then(|id| board.piece(id))
                .map(|piece| piece.position),
            winner: self.winner.map(Color::code),
            is_draw: self.is_draw,
            is_game_over: self.is_game_over(),
        }
    }

    fn select_piece(&mut self, pos: Position) -> bool {
        let Some(piece) = self.board.piece_at(pos) else {
            return false;
        };
        let id = piece.id;
        let Some(dests) = self.current_legal_moves().moves.remove(&id) else {
            return false;
        };

        self.selected = Some(id);
        self.pending = dests;
        true
    }

    fn clear_selection(&mut self) {
        self.selected = None;
        self.pending.clear();
    }

    fn refresh_status(&mut self) {
        match self.board.outcome() {
            Some(Outcome::Win(color)) => self.winner = Some(color),
            Some(Outcome::Draw) => self.is_draw = true,
            None => {}
        }
    }

    #[cfg(test)]
    fn set_board_for_test(&mut self, board: Board) {
        self.board = board;
        self.clear_selection();
        self.winner = None;
        self.is_draw = false;
        self.refresh_status();
    }
}
