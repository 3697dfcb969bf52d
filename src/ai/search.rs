use log::debug;
use web_time::{Duration, Instant};

use crate::ai::eval::Evaluator;
use crate::board::Board;
use crate::turn::Turn;
use crate::types::Color;

const MIN_SCORE: f32 = f32::NEG_INFINITY;
const MAX_SCORE: f32 = f32::INFINITY;

#[derive(Debug, Clone, PartialEq)]
pub enum SearchResult {
    /// `best` is the chosen child position, or the position itself at a leaf.
    Complete { score: f32, best: Board },
    TimedOut,
}

/// Result of an iterative-deepening search.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchOutcome {
    /// Position after the chosen turn; `None` when the side to move has none.
    pub best: Option<Board>,
    pub score: f32,
    /// Deepest iteration that completed.
    pub depth: u8,
    pub nodes: u64,
    pub timed_out: bool,
}

#[derive(Debug)]
struct Timeout;

/// Minimax with alpha-beta pruning. Light maximizes, dark minimizes.
pub struct Searcher {
    evaluator: Evaluator,
    start_time: Instant,
    timeout: Option<Duration>,
    root_depth: u8,
    nodes: u64,
    timed_out: bool,
}

impl Searcher {
    pub fn new(evaluator: Evaluator) -> Self {
        Self {
            evaluator,
            start_time: Instant::now(),
            timeout: None,
            root_depth: 0,
            nodes: 0,
            timed_out: false,
        }
    }

    pub fn with_timeout(evaluator: Evaluator, timeout: Duration) -> Self {
        Self {
            timeout: Some(timeout),
            ..Self::new(evaluator)
        }
    }

    /// Searches depths `1..=max_depth` and returns the best turn of the last
    /// depth that completed. Depth 1 always completes.
    pub fn search(&mut self, board: &Board, max_depth: u8) -> SearchOutcome {
        self.start_time = Instant::now();
        self.timed_out = false;
        self.nodes = 0;

        let mut turns = board.turns();
        if turns.is_empty() {
            return SearchOutcome {
                best: None,
                score: board.evaluate(),
                depth: 0,
                nodes: 0,
                timed_out: false,
            };
        }
        if turns.len() == 1 {
            let only = turns.swap_remove(0).board;
            return SearchOutcome {
                score: self.evaluator.evaluate(&only),
                best: Some(only),
                depth: 1,
                nodes: 1,
                timed_out: false,
            };
        }

        let maximizing = board.to_move() == Color::Light;
        let mut outcome = SearchOutcome {
            best: None,
            score: if maximizing { MIN_SCORE } else { MAX_SCORE },
            depth: 0,
            nodes: 0,
            timed_out: false,
        };

        for depth in 1..=max_depth.max(1) {
            self.root_depth = depth;
            match self.minimax(board, depth, maximizing, MIN_SCORE, MAX_SCORE) {
                SearchResult::Complete { score, best } => {
                    debug!(
                        "depth {depth} score {score} nodes {} elapsed {:?}",
                        self.nodes,
                        self.start_time.elapsed()
                    );
                    outcome.best = Some(best);
                    outcome.score = score;
                    outcome.depth = depth;
                    // A proven result cannot change at greater depth.
                    if score.is_infinite() {
                        break;
                    }
                }
                SearchResult::TimedOut => {
                    debug!("depth {depth} timed out after {} nodes", self.nodes);
                    break;
                }
            }
        }

        self.root_depth = 0;
        outcome.nodes = self.nodes;
        outcome.timed_out = self.timed_out;
        outcome
    }

    pub fn timed_out(&self) -> bool {
        self.timed_out
    }

    /// Caller contract: `maximizing` is `true` exactly when light is to move.
    pub fn minimax(
        &mut self,
        position: &Board,
        depth: u8,
        maximizing: bool,
        alpha: f32,
        beta: f32,
    ) -> SearchResult {
        self.nodes += 1;
        if depth == 0 || position.is_draw() {
            return self.leaf(position);
        }

        let mut turns = position.turns();
        match self.pick(&turns, depth, maximizing, alpha, beta) {
            Err(Timeout) => SearchResult::TimedOut,
            Ok(None) => self.leaf(position),
            Ok(Some((idx, score))) => SearchResult::Complete {
                score,
                best: turns.swap_remove(idx).board,
            },
        }
    }

    fn leaf(&mut self, position: &Board) -> SearchResult {
        SearchResult::Complete {
            score: self.evaluator.evaluate(position),
            best: position.clone(),
        }
    }

    fn value(
        &mut self,
        position: &Board,
        depth: u8,
        maximizing: bool,
        alpha: f32,
        beta: f32,
    ) -> Result<f32, Timeout> {
        self.nodes += 1;
        self.check_time()?;

        if depth == 0 || position.is_draw() {
            return Ok(self.evaluator.evaluate(position));
        }

        let turns = position.turns();
        match self.pick(&turns, depth, maximizing, alpha, beta)? {
            Some((_, score)) => Ok(score),
            None => Ok(self.evaluator.evaluate(position)),
        }
    }

    /// Index and score of the best child. The first child reaching the
    /// extreme score is kept.
    fn pick(
        &mut self,
        turns: &[Turn],
        depth: u8,
        maximizing: bool,
        mut alpha: f32,
        mut beta: f32,
    ) -> Result<Option<(usize, f32)>, Timeout> {
        let mut best: Option<(usize, f32)> = None;

        for (idx, turn) in turns.iter().enumerate() {
            let score = self.value(&turn.board, depth - 1, !maximizing, alpha, beta)?;
            let improves = best.is_none_or(|(_, best_score)| {
                if maximizing {
                    score > best_score
                } else {
                    score < best_score
                }
            });
            if improves {
                best = Some((idx, score));
            }

            if maximizing {
                alpha = alpha.max(score);
            } else {
                beta = beta.min(score);
            }
            if beta <= alpha {
                break;
            }
        }

        Ok(best)
    }

    // Keep depth-1 search guaranteed by suppressing timeout checks at root depth 1.
    fn check_time(&mut self) -> Result<(), Timeout> {
        if self.root_depth > 1
            && let Some(timeout) = self.timeout
            && self.start_time.elapsed() >= timeout
        {
            self.timed_out = true;
            return Err(Timeout);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Rules;
    use crate::types::Position;

    fn setup(rows: &[&str]) -> Board {
        Board::from_rows(Rules::default(), rows).unwrap()
    }

    fn searcher() -> Searcher {
        Searcher::new(Evaluator::deterministic())
    }

    fn brute_minimax(position: &Board, depth: u8, maximizing: bool) -> f32 {
        let turns = position.turns();
        if depth == 0 || position.is_draw() || turns.is_empty() {
            return position.evaluate();
        }
        let scores = turns
            .iter()
            .map(|turn| brute_minimax(&turn.board, depth - 1, !maximizing));
        if maximizing {
            scores.fold(MIN_SCORE, f32::max)
        } else {
            scores.fold(MAX_SCORE, f32::min)
        }
    }

    #[test]
    fn depth_one_takes_the_only_capture() {
        let board = setup(&[
            "........", "........", "........", "..d.....", ".l......", "........",
            ".....l..", "........",
        ]);

        let SearchResult::Complete { best, .. } =
            searcher().minimax(&board, 1, true, MIN_SCORE, MAX_SCORE)
        else {
            panic!("untimed search must complete");
        };

        assert_eq!(best.pieces_left(Color::Dark), 0);
        assert!(best.piece_at(Position::new(2, 3)).is_some());
        assert_eq!(best.to_move(), Color::Dark);
    }

    #[test]
    fn equal_scores_keep_the_first_generated_turn() {
        let board = setup(&[
            ".d......", "........", "........", "........", "........", "........",
            "........", "L.......",
        ]);
        let first = board.turns().swap_remove(0).board;

        let SearchResult::Complete { best, .. } =
            searcher().minimax(&board, 1, true, MIN_SCORE, MAX_SCORE)
        else {
            panic!("untimed search must complete");
        };

        assert_eq!(best, first);
    }

    #[test]
    fn depth_two_avoids_hanging_a_man() {
        let board = setup(&[
            "........", "........", "........", "..d.....", "........", "..l.l...",
            "........", "........",
        ]);

        let outcome = searcher().search(&board, 2);
        let best = outcome.best.unwrap();

        assert_eq!(outcome.depth, 2);
        assert!(!best.legal_moves(Color::Dark).has_capture);
        assert_eq!(best.pieces_left(Color::Light), 2);
    }

    #[test]
    fn alpha_beta_matches_plain_minimax() {
        let board = Board::default();
        for depth in 1..=3 {
            let SearchResult::Complete { score, .. } =
                searcher().minimax(&board, depth, true, MIN_SCORE, MAX_SCORE)
            else {
                panic!("untimed search must complete");
            };
            assert_eq!(score, brute_minimax(&board, depth, true), "depth {depth}");
        }
    }

    #[test]
    fn search_leaves_the_input_board_untouched() {
        let board = Board::default();
        let before = board.clone();

        let outcome = searcher().search(&board, 3);

        assert_eq!(board, before);
        let best = outcome.best.unwrap();
        assert!(board.turns().iter().any(|turn| turn.board == best));
    }

    #[test]
    fn search_without_turns_returns_none() {
        let board = setup(&[
            "........", "..d.....", "........", "........", "........", "........",
            "........", "........",
        ]);

        let outcome = searcher().search(&board, 4);

        assert!(outcome.best.is_none());
        assert_eq!(outcome.score, MIN_SCORE);
    }

    #[test]
    fn depth_zero_returns_the_static_evaluation() {
        let board = Board::default();

        let result = searcher().minimax(&board, 0, true, MIN_SCORE, MAX_SCORE);

        assert_eq!(
            result,
            SearchResult::Complete {
                score: board.evaluate(),
                best: board.clone(),
            }
        );
    }

    #[test]
    fn depth_one_completes_before_timeout_cutoff() {
        let mut searcher = Searcher::with_timeout(Evaluator::deterministic(), Duration::ZERO);
        let board = Board::default();

        let outcome = searcher.search(&board, 6);

        assert_eq!(outcome.depth, 1);
        assert!(outcome.timed_out);
        assert!(searcher.timed_out());
        let best = outcome.best.unwrap();
        assert!(board.turns().iter().any(|turn| turn.board == best));
    }

    #[test]
    fn dark_minimizes() {
        let mut board = setup(&[
            "........", "........", "........", "..d.....", ".l......", "........",
            "........", "........",
        ]);
        board.set_to_move(Color::Dark);

        let outcome = searcher().search(&board, 1);
        let best = outcome.best.unwrap();

        assert_eq!(best.pieces_left(Color::Light), 0);
        assert_eq!(outcome.score, MIN_SCORE);
    }
}
