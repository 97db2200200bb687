//! Reversible move application.
//!
//! `MoveCommand::execute` applies a move with all of its side effects and
//! returns a snapshot of everything it overwrote. `undo` consumes that
//! snapshot and puts the position back exactly as it was, history
//! included. Nothing is recomputed on the way back.

use crate::engine::board::Position;
use crate::engine::movegen::is_promotion;
use crate::engine::types::{CastlingRights, ChessError, Color, Move, Piece, PieceType, Square};

/// Rook relocation performed alongside a castling king move.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct RookShift {
    from: Square,
    to: Square,
    rook: Piece,
}

/// An executed move together with the state needed to reverse it.
///
/// A command is produced by [`MoveCommand::execute`] and used up by
/// [`MoveCommand::undo`], so it can be undone at most once.
#[derive(Clone, Debug, PartialEq, Eq)]
#[must_use = "dropping a MoveCommand makes the move irreversible"]
pub struct MoveCommand {
    mv: Move,
    moved: Piece,
    captured: Option<Piece>,
    /// Where the captured piece stood: `mv.to`, or the passed pawn's square
    /// for en passant.
    captured_on: Square,
    rook_shift: Option<RookShift>,
    prior_turn: Color,
    prior_castling: CastlingRights,
    prior_en_passant: Option<Square>,
    prior_halfmove: u16,
    prior_fullmove: u16,
    prior_hash: u64,
}

impl MoveCommand {
    // -----------------------------------------------------------------
    // Execute
    // -----------------------------------------------------------------

    /// Apply `mv` to `pos`.
    ///
    /// The move is trusted to come from the generator: only an empty origin
    /// square is rejected. A promotion choice that is not Q/R/B/N falls
    /// back to a queen.
    pub fn execute(pos: &mut Position, mv: Move) -> Result<MoveCommand, ChessError> {
        let moved = pos
            .piece_at(mv.from)
            .ok_or_else(|| ChessError::invalid_move(mv.from, mv.to, "no piece on origin square"))?;
        let us = moved.color;

        let mut cmd = MoveCommand {
            mv,
            moved,
            captured: pos.piece_at(mv.to),
            captured_on: mv.to,
            rook_shift: None,
            prior_turn: pos.side_to_move(),
            prior_castling: pos.castling_rights(),
            prior_en_passant: pos.en_passant(),
            prior_halfmove: pos.halfmove_clock(),
            prior_fullmove: pos.fullmove_number(),
            prior_hash: pos.hash(),
        };

        // 1. Move the piece.
        pos.place(mv.to, Some(moved));
        pos.place(mv.from, None);

        let is_pawn = moved.kind == PieceType::Pawn;
        let file_change = mv.to.file() as i8 - mv.from.file() as i8;

        // 2. En passant: the captured pawn sits behind the destination.
        if is_pawn
            && file_change != 0
            && cmd.captured.is_none()
            && cmd.prior_en_passant == Some(mv.to)
            && let Some(victim) = mv.to.offset(0, -us.forward())
        {
            cmd.captured = pos.piece_at(victim);
            cmd.captured_on = victim;
            pos.place(victim, None);
        }

        // 3. Promotion.
        if is_promotion(moved, mv.to) {
            let kind = mv
                .promotion
                .filter(|p| PieceType::PROMOTIONS.contains(p))
                .unwrap_or(PieceType::Queen);
            pos.place(mv.to, Some(Piece::new(us, kind)));
        }

        // 4. Castling: a king moving two files drags its rook along.
        if moved.kind == PieceType::King && file_change.abs() == 2 {
            let rank = mv.from.rank();
            let (rook_file, rook_dest_file) = if file_change > 0 { (7, 5) } else { (0, 3) };
            let rook_from = Square::from_file_rank(rook_file, rank);
            let rook_to = Square::from_file_rank(rook_dest_file, rank);
            if let Some(rook) = pos.piece_at(rook_from) {
                pos.place(rook_to, Some(rook));
                pos.place(rook_from, None);
                cmd.rook_shift = Some(RookShift {
                    from: rook_from,
                    to: rook_to,
                    rook,
                });
            }
        }

        // 5. Clocks.
        if is_pawn || cmd.captured.is_some() {
            pos.set_halfmove_clock(0);
        } else {
            pos.set_halfmove_clock(cmd.prior_halfmove.saturating_add(1));
        }
        if cmd.prior_turn == Color::Black {
            pos.set_fullmove_number(cmd.prior_fullmove.saturating_add(1));
        }

        // 6. En-passant target and castling rights.
        let double_push = is_pawn && (mv.to.rank() as i8 - mv.from.rank() as i8).abs() == 2;
        pos.set_en_passant(if double_push {
            mv.from.offset(0, us.forward())
        } else {
            None
        });

        let mut rights = cmd.prior_castling;
        rights.revoke_for_square(mv.from);
        if cmd.captured.is_some() {
            rights.revoke_for_square(cmd.captured_on);
        }
        pos.set_castling_rights(rights);

        pos.set_turn(!cmd.prior_turn);
        pos.record_position();
        Ok(cmd)
    }

    // -----------------------------------------------------------------
    // Undo
    // -----------------------------------------------------------------

    /// Restore the position to its state before `execute`.
    pub fn undo(self, pos: &mut Position) {
        pos.pop_position();
        pos.set_turn(self.prior_turn);
        pos.set_castling_rights(self.prior_castling);
        pos.set_en_passant(self.prior_en_passant);
        pos.set_halfmove_clock(self.prior_halfmove);
        pos.set_fullmove_number(self.prior_fullmove);

        if let Some(shift) = self.rook_shift {
            pos.place(shift.to, None);
            pos.place(shift.from, Some(shift.rook));
        }
        pos.place(self.mv.to, None);
        pos.place(self.mv.from, Some(self.moved));
        if let Some(captured) = self.captured {
            pos.place(self.captured_on, Some(captured));
        }

        debug_assert_eq!(pos.hash(), self.prior_hash, "undo of {} left a stale hash", self.mv);
    }

    // -----------------------------------------------------------------
    // Accessors
    // -----------------------------------------------------------------

    pub fn mv(&self) -> Move {
        self.mv
    }

    pub fn moved_piece(&self) -> Piece {
        self.moved
    }

    /// The piece removed by this move, if any.
    pub fn captured(&self) -> Option<Piece> {
        self.captured
    }

    pub fn is_castling(&self) -> bool {
        self.rook_shift.is_some()
    }

    pub fn is_en_passant(&self) -> bool {
        self.captured_on != self.mv.to
    }

    /// Hash of the position the move was played from.
    pub fn prior_hash(&self) -> u64 {
        self.prior_hash
    }
}

// =========================================================================
// Tests
// =========================================================================
