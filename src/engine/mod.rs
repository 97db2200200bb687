pub mod arbiter;
pub mod attacks;
pub mod board;
pub mod command;
pub mod fen;
pub mod game;
pub mod movegen;
pub mod perft;
pub mod san;
pub mod types;
pub mod zobrist;

pub use arbiter::{all_legal_moves, game_state, legal_moves};
pub use board::Position;
pub use command::MoveCommand;
pub use game::{Game, MoveRecord};
pub use types::*;
