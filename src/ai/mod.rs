pub mod eval;
pub mod search;

pub use eval::Evaluator;
pub use search::{SearchOutcome, SearchResult, Searcher};
