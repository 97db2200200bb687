//! AI engine: fixed-depth minimax search plus the `AiEngine` players.
//!
//! The search walks the tree with alpha-beta pruning, White maximizing and
//! Black minimizing, on a private clone of the caller's position. Moves are
//! executed and undone in place with [`MoveCommand`]; a pseudo-legal move
//! that leaves the mover's king attacked is undone and skipped.
//!
//! Two players are provided:
//!   - `RandomAi`: plays a random legal move (used for "harmless" difficulty).
//!   - `MinimaxAi`: searches at a depth and contempt chosen by difficulty.

use std::time::Instant;

use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::ai::evaluation::evaluate;
use crate::config::EngineConfig;
use crate::engine::arbiter::{is_in_check, is_threefold_repetition};
use crate::engine::board::Position;
use crate::engine::command::MoveCommand;
use crate::engine::game::Game;
use crate::engine::movegen::{is_promotion, pseudo_legal_destinations};
use crate::engine::types::{ChessError, Color, Difficulty, Move, PieceType, Square};

/// Checkmate score base. A mate `ply` half-moves from the root scores
/// `MATE - ply`, so nearer mates score higher.
pub const MATE: i32 = 100_000;

/// Is this score a forced-mate score?
#[inline]
pub fn is_mate_score(score: i32) -> bool {
    score.abs() >= MATE - 1_000
}

// =========================================================================
// Search
// =========================================================================

/// Outcome of a search: the chosen move, its score from White's point of
/// view, and the number of nodes visited.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchResult {
    pub mv: Move,
    pub score: i32,
    pub nodes: u64,
}

/// Per-search bookkeeping.
struct SearchContext {
    root_depth: u32,
    nodes: u64,
}

/// Fixed-depth minimax searcher.
///
/// `contempt` is how much the side to move dislikes a repetition draw: a
/// repeated position deeper in the tree scores `-contempt` for White and
/// `+contempt` for Black.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Searcher {
    pub contempt: i32,
}

impl Searcher {
    pub fn new(contempt: i32) -> Self {
        Self { contempt }
    }

    /// Search `depth` plies (at least one) and return the best move, or
    /// `None` when the side to move has no legal move.
    ///
    /// `pos` is cloned once; the caller's position is never touched.
    pub fn best_move(&self, pos: &Position, depth: u32) -> Option<SearchResult> {
        let depth = depth.max(1);
        let start = Instant::now();
        let mut work = pos.clone();
        let mut ctx = SearchContext {
            root_depth: depth,
            nodes: 0,
        };
        let maximizing = work.side_to_move() == Color::White;
        let (score, mv) = self.minimax(&mut work, depth, i32::MIN, i32::MAX, maximizing, &mut ctx);

        debug!(
            depth,
            nodes = ctx.nodes,
            score,
            best = %mv.map_or_else(|| "none".to_string(), |m| m.to_string()),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "search finished"
        );

        mv.map(|mv| SearchResult {
            mv,
            score,
            nodes: ctx.nodes,
        })
    }

    /// Score of `pos` searched `depth` plies deep, from White's point of
    /// view. Depth 0 is the static evaluation.
    pub fn score(&self, pos: &Position, depth: u32) -> i32 {
        if depth == 0 {
            return evaluate(pos);
        }
        let mut work = pos.clone();
        let mut ctx = SearchContext {
            root_depth: depth,
            nodes: 0,
        };
        let maximizing = work.side_to_move() == Color::White;
        self.minimax(&mut work, depth, i32::MIN, i32::MAX, maximizing, &mut ctx)
            .0
    }

    /// Minimax with alpha-beta pruning. Returns the node score and the move
    /// that achieved it (`None` at leaves).
    fn minimax(
        &self,
        pos: &mut Position,
        depth: u32,
        mut alpha: i32,
        mut beta: i32,
        maximizing: bool,
        ctx: &mut SearchContext,
    ) -> (i32, Option<Move>) {
        ctx.nodes += 1;

        if depth == 0 {
            return (evaluate(pos), None);
        }

        let ply = (ctx.root_depth - depth) as i32;

        // The root always searches, so a repeated position still gets a move.
        if ply > 0 && is_threefold_repetition(pos) {
            let draw = if maximizing {
                -self.contempt
            } else {
                self.contempt
            };
            return (draw, None);
        }

        let us = pos.side_to_move();
        let squares: Vec<Square> = pos.pieces(us).map(|(sq, _)| sq).collect();

        let mut best_score = if maximizing { i32::MIN } else { i32::MAX };
        let mut best_move = None;

        'squares: for from in squares {
            let Some(piece) = pos.piece_at(from) else {
                continue;
            };
            for to in pseudo_legal_destinations(pos, from) {
                let mv = if is_promotion(piece, to) {
                    Move::with_promotion(from, to, PieceType::Queen)
                } else {
                    Move::new(from, to)
                };
                let Ok(cmd) = MoveCommand::execute(pos, mv) else {
                    continue;
                };

                let score = if cmd.captured().is_some_and(|p| p.kind == PieceType::King) {
                    // Only reachable from an illegal root; the capture ends it.
                    if maximizing { MATE - ply } else { -(MATE - ply) }
                } else if is_in_check(pos, us) {
                    cmd.undo(pos);
                    continue;
                } else {
                    self.minimax(pos, depth - 1, alpha, beta, !maximizing, ctx).0
                };
                cmd.undo(pos);

                if maximizing {
                    if best_move.is_none() || score > best_score {
                        best_score = score;
                        best_move = Some(mv);
                    }
                    alpha = alpha.max(best_score);
                } else {
                    if best_move.is_none() || score < best_score {
                        best_score = score;
                        best_move = Some(mv);
                    }
                    beta = beta.min(best_score);
                }

                if beta <= alpha {
                    break 'squares;
                }
            }
        }

        if best_move.is_none() {
            let score = if is_in_check(pos, us) {
                if maximizing { -(MATE - ply) } else { MATE - ply }
            } else {
                0
            };
            return (score, None);
        }

        (best_score, best_move)
    }
}

/// Search a private clone of `pos` and return the best move.
pub fn best_move(pos: &Position, depth: u32, contempt: i32) -> Option<SearchResult> {
    Searcher::new(contempt).best_move(pos, depth)
}

/// Searched score of `pos` from White's point of view.
pub fn position_score(pos: &Position, depth: u32, contempt: i32) -> i32 {
    Searcher::new(contempt).score(pos, depth)
}

/// Run [`best_move`] on tokio's blocking pool so an async caller stays
/// responsive. The search itself cannot be cancelled.
pub async fn best_move_async(
    pos: Position,
    depth: u32,
    contempt: i32,
) -> Result<Option<SearchResult>, tokio::task::JoinError> {
    tokio::task::spawn_blocking(move || best_move(&pos, depth, contempt)).await
}

// =========================================================================
// AiEngine trait
// =========================================================================

/// The AI player interface.
pub trait AiEngine: Send + Sync {
    /// Select a move for the side to move in `game`.
    fn choose_move(&self, game: &Game) -> Result<Move, ChessError>;

    /// Human-readable name for this engine.
    fn name(&self) -> &str;
}

fn ensure_playable(game: &Game) -> Result<(), ChessError> {
    if game.is_game_over() {
        return Err(ChessError::GameOver(game.status().to_string()));
    }
    Ok(())
}

// =========================================================================
// RandomAi
// =========================================================================

/// Picks a random legal move. Used for "harmless" difficulty.
pub struct RandomAi;

impl AiEngine for RandomAi {
    fn choose_move(&self, game: &Game) -> Result<Move, ChessError> {
        ensure_playable(game)?;
        let mut rng = rand::thread_rng();
        game.legal_moves()
            .choose(&mut rng)
            .copied()
            .ok_or_else(|| ChessError::GameOver("no legal moves".to_string()))
    }

    fn name(&self) -> &str {
        "RandomAi"
    }
}

// =========================================================================
// MinimaxAi
// =========================================================================

/// Minimax player. A depth of 0 plays like [`RandomAi`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MinimaxAi {
    pub depth: u32,
    pub contempt: i32,
}

impl MinimaxAi {
    pub fn new(depth: u32, contempt: i32) -> Self {
        Self { depth, contempt }
    }

    pub fn from_difficulty(difficulty: Difficulty) -> Self {
        Self::new(difficulty.depth(), difficulty.contempt())
    }

    /// Strength adapted to a player rating.
    pub fn from_elo(elo: u32) -> Self {
        Self::from_difficulty(Difficulty::from_elo(elo))
    }

    pub fn from_config(config: &EngineConfig) -> Self {
        Self::new(config.search_depth, config.contempt)
    }

    /// Full search result for the current position of `game`.
    pub fn search(&self, game: &Game) -> Result<SearchResult, ChessError> {
        ensure_playable(game)?;
        best_move(game.position(), self.depth, self.contempt)
            .ok_or_else(|| ChessError::GameOver("no legal moves".to_string()))
    }
}

impl Default for MinimaxAi {
    fn default() -> Self {
        Self::from_difficulty(Difficulty::Medium)
    }
}

impl AiEngine for MinimaxAi {
    fn choose_move(&self, game: &Game) -> Result<Move, ChessError> {
        if self.depth == 0 {
            return RandomAi.choose_move(game);
        }
        Ok(self.search(game)?.mv)
    }

    fn name(&self) -> &str {
        "MinimaxAi"
    }
}

// =========================================================================
// Tests
// =========================================================================
