//! Stateful game controller wrapping Position.
//!
//! `Game` owns the live position, the stack of executed move commands, the
//! move records handed to collaborators, and the cached game state. It is
//! the type a UI, the CLI, or a network layer drives.

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::ai::evaluation;
use crate::engine::arbiter;
use crate::engine::board::Position;
use crate::engine::command::MoveCommand;
use crate::engine::san;
use crate::engine::types::{ChessError, Color, GameState, Move, PieceType, Square};

// =========================================================================
// MoveRecord
// =========================================================================

/// A played move as stored for persistence and replay.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveRecord {
    pub from: Square,
    pub to: Square,
    pub promotion: Option<PieceType>,
    /// SAN including the check or mate suffix.
    pub notation: String,
    /// Centipawn score from White's point of view after the move.
    pub eval: i32,
}

impl MoveRecord {
    pub fn mv(&self) -> Move {
        Move {
            from: self.from,
            to: self.to,
            promotion: self.promotion,
        }
    }
}

// =========================================================================
// Game
// =========================================================================

/// A chess game with history, undo and status tracking.
#[derive(Clone, Debug)]
pub struct Game {
    position: Position,
    commands: Vec<MoveCommand>,
    records: Vec<MoveRecord>,
    /// Legal moves of the current position, refreshed after every change.
    legal: Vec<Move>,
    state: GameState,
    starting_fen: String,
}

impl Game {
    // -----------------------------------------------------------------
    // Constructors
    // -----------------------------------------------------------------

    /// Create a new game from the standard starting position.
    pub fn new() -> Self {
        Self::with_position(Position::starting())
    }

    /// Create a game from a FEN string.
    pub fn from_fen(fen: &str) -> Result<Self, ChessError> {
        Ok(Self::with_position(Position::from_fen(fen)?))
    }

    fn with_position(position: Position) -> Self {
        let starting_fen = position.to_fen();
        let mut game = Game {
            position,
            commands: Vec::new(),
            records: Vec::new(),
            legal: Vec::new(),
            state: GameState::InProgress,
            starting_fen,
        };
        game.refresh();
        game
    }

    /// Load a FEN position, discarding all history.
    pub fn load_fen(&mut self, fen: &str) -> Result<(), ChessError> {
        *self = Self::from_fen(fen)?;
        Ok(())
    }

    /// Rebuild a game by replaying `records` from `start_fen`.
    ///
    /// Stored evaluations are kept as they are.
    pub fn replay(start_fen: &str, records: &[MoveRecord]) -> Result<Self, ChessError> {
        let mut game = Self::from_fen(start_fen)?;
        for record in records {
            game.commit_move_with_eval(record.from, record.to, record.promotion, record.eval)?;
        }
        Ok(game)
    }

    // -----------------------------------------------------------------
    // Accessors
    // -----------------------------------------------------------------

    pub fn position(&self) -> &Position {
        &self.position
    }

    pub fn status(&self) -> GameState {
        self.state
    }

    pub fn is_game_over(&self) -> bool {
        self.state.is_game_over()
    }

    pub fn side_to_move(&self) -> Color {
        self.position.side_to_move()
    }

    /// Whether the side to move is in check.
    pub fn is_in_check(&self) -> bool {
        arbiter::is_in_check(&self.position, self.position.side_to_move())
    }

    /// Records of every move played so far, oldest first.
    pub fn records(&self) -> &[MoveRecord] {
        &self.records
    }

    pub fn to_fen(&self) -> String {
        self.position.to_fen()
    }

    /// The FEN the game started from.
    pub fn starting_fen(&self) -> &str {
        &self.starting_fen
    }

    pub fn fullmove_number(&self) -> u16 {
        self.position.fullmove_number()
    }

    pub fn halfmove_clock(&self) -> u16 {
        self.position.halfmove_clock()
    }

    // -----------------------------------------------------------------
    // Move queries
    // -----------------------------------------------------------------

    /// All legal moves in the current position, promotions expanded.
    pub fn legal_moves(&self) -> &[Move] {
        &self.legal
    }

    /// Legal destination squares for the piece on `from`.
    pub fn legal_destinations(&self, from: Square) -> Vec<Square> {
        let mut out: Vec<Square> = Vec::new();
        for mv in self.legal.iter().filter(|m| m.from == from) {
            if !out.contains(&mv.to) {
                out.push(mv.to);
            }
        }
        out
    }

    /// Whether `from → to` is legal and needs a promotion piece. A UI asks
    /// this before calling [`Game::commit_move`] with its choice.
    pub fn is_pending_promotion(&self, from: Square, to: Square) -> bool {
        self.legal
            .iter()
            .any(|m| m.from == from && m.to == to && m.promotion.is_some())
    }

    // -----------------------------------------------------------------
    // Make move
    // -----------------------------------------------------------------

    /// Play `from → to`, promoting to `promotion` (a queen when omitted).
    ///
    /// Returns `ChessError::GameOver` once the game has ended,
    /// `ChessError::InvalidMove` for an illegal move, and
    /// `ChessError::InvalidPromotion` for a promotion piece on a move that
    /// does not promote or a piece a pawn cannot become.
    pub fn commit_move(
        &mut self,
        from: Square,
        to: Square,
        promotion: Option<PieceType>,
    ) -> Result<&MoveRecord, ChessError> {
        self.commit(from, to, promotion, None)
    }

    /// Like [`Game::commit_move`], but records `eval` (typically a search
    /// score) instead of the static evaluation.
    pub fn commit_move_with_eval(
        &mut self,
        from: Square,
        to: Square,
        promotion: Option<PieceType>,
        eval: i32,
    ) -> Result<&MoveRecord, ChessError> {
        self.commit(from, to, promotion, Some(eval))
    }

    /// Play a [`Move`] value.
    pub fn make_move(&mut self, mv: Move) -> Result<&MoveRecord, ChessError> {
        self.commit(mv.from, mv.to, mv.promotion, None)
    }

    /// Play a move given in coordinate notation (`e2e4`, `e7e8q`) or SAN.
    pub fn make_san_move(&mut self, text: &str) -> Result<&MoveRecord, ChessError> {
        let mv = match Move::from_coordinate(text) {
            Some(mv) => mv,
            None => san::parse_san(&mut self.position, text)?,
        };
        self.make_move(mv)
    }

    fn commit(
        &mut self,
        from: Square,
        to: Square,
        promotion: Option<PieceType>,
        eval: Option<i32>,
    ) -> Result<&MoveRecord, ChessError> {
        if self.state.is_game_over() {
            warn!(%from, %to, state = %self.state, "move rejected: game over");
            return Err(ChessError::GameOver(self.state.to_string()));
        }

        if !self.legal.iter().any(|m| m.from == from && m.to == to) {
            warn!(%from, %to, "move rejected: not legal");
            return Err(ChessError::invalid_move(from, to, "not a legal move"));
        }

        let mv = match (self.is_pending_promotion(from, to), promotion) {
            (true, None) => Move::with_promotion(from, to, PieceType::Queen),
            (true, Some(kind)) if PieceType::PROMOTIONS.contains(&kind) => {
                Move::with_promotion(from, to, kind)
            }
            (true, Some(kind)) => {
                return Err(ChessError::InvalidPromotion(format!(
                    "a pawn cannot promote to {kind}"
                )));
            }
            (false, Some(_)) => {
                return Err(ChessError::InvalidPromotion(format!(
                    "{from}{to} is not a promotion"
                )));
            }
            (false, None) => Move::new(from, to),
        };

        // SAN needs the position before the move.
        let notation = san::move_to_san(&self.position, mv, &self.legal);

        let cmd = MoveCommand::execute(&mut self.position, mv)?;
        self.commands.push(cmd);
        self.refresh();

        let notation = match self.state {
            GameState::Checkmate => format!("{notation}#"),
            _ if self.is_in_check() => format!("{notation}+"),
            _ => notation,
        };
        let eval = eval.unwrap_or_else(|| evaluation::evaluate(&self.position));

        debug!(mv = %mv, %notation, eval, fen = %self.position.to_fen(), "move committed");
        if self.state.is_game_over() {
            info!(state = %self.state, moves = self.records.len() + 1, "game over");
        }

        self.records.push(MoveRecord {
            from,
            to,
            promotion: mv.promotion,
            notation,
            eval,
        });
        Ok(&self.records[self.records.len() - 1])
    }

    // -----------------------------------------------------------------
    // Undo move
    // -----------------------------------------------------------------

    /// Undo the last move and return its record.
    pub fn undo_move(&mut self) -> Result<MoveRecord, ChessError> {
        let cmd = self.commands.pop().ok_or(ChessError::NothingToUndo)?;
        cmd.undo(&mut self.position);
        let record = self.records.pop().ok_or(ChessError::NothingToUndo)?;
        self.refresh();
        debug!(notation = %record.notation, "move undone");
        Ok(record)
    }

    // -----------------------------------------------------------------
    // Status
    // -----------------------------------------------------------------

    fn refresh(&mut self) {
        self.state = arbiter::game_state(&mut self.position);
        self.legal = arbiter::all_legal_moves(&mut self.position);
    }
}

impl Default for Game {
    fn default() -> Self {
        Self::new()
    }
}

// =========================================================================
// Tests
// =========================================================================
