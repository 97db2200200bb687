pub mod analysis;
pub mod engine;
pub mod evaluation;

pub use analysis::{GameReport, analyze};
pub use engine::{
    AiEngine, MinimaxAi, RandomAi, SearchResult, Searcher, best_move, best_move_async,
    position_score,
};
