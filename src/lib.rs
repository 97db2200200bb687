//! Chess rules engine and game-tree search.
//!
//! [`engine`] holds the board model, move generation, legality arbiter and
//! reversible move commands. [`ai`] holds the evaluator, the minimax searcher
//! and post-game analysis.

pub mod ai;
pub mod config;
pub mod engine;
