//! Pseudo-legal move generation.
//!
//! Destinations here obey each piece's movement rules but may leave the
//! mover's own king attacked. The arbiter filters them down to legal moves.
//!
//! A pawn move onto its last rank is reported once; callers expand it into
//! promotion choices.

use crate::engine::attacks::{KING_OFFSETS, KNIGHT_OFFSETS, is_square_attacked, slider_directions};
use crate::engine::board::Position;
use crate::engine::types::{CastlingRights, Color, Piece, PieceType, Square};

// =========================================================================
// Public API
// =========================================================================

/// Every square the piece on `from` could move to, ignoring self-check.
/// Empty for an empty square.
pub fn pseudo_legal_destinations(pos: &Position, from: Square) -> Vec<Square> {
    let mut out = Vec::with_capacity(28);
    let Some(piece) = pos.piece_at(from) else {
        return out;
    };

    match piece.kind {
        PieceType::Pawn => pawn_destinations(pos, from, piece.color, &mut out),
        PieceType::Knight => step_destinations(pos, from, piece.color, &KNIGHT_OFFSETS, &mut out),
        PieceType::King => {
            step_destinations(pos, from, piece.color, &KING_OFFSETS, &mut out);
            castling_destinations(pos, from, piece.color, &mut out);
        }
        kind => slide_destinations(pos, from, piece.color, slider_directions(kind), &mut out),
    }
    out
}

/// Whether moving `piece` to `to` lands a pawn on its promotion rank.
#[inline]
pub fn is_promotion(piece: Piece, to: Square) -> bool {
    piece.kind == PieceType::Pawn && to.rank() == (!piece.color).back_rank()
}

// =========================================================================
// Pawns
// =========================================================================

fn pawn_destinations(pos: &Position, from: Square, us: Color, out: &mut Vec<Square>) {
    let forward = us.forward();
    let start_rank = match us {
        Color::White => 1,
        Color::Black => 6,
    };

    // --- Pushes ---
    if let Some(one) = from.offset(0, forward)
        && pos.piece_at(one).is_none()
    {
        out.push(one);
        if from.rank() == start_rank
            && let Some(two) = one.offset(0, forward)
            && pos.piece_at(two).is_none()
        {
            out.push(two);
        }
    }

    // --- Captures, including en passant ---
    for df in [-1, 1] {
        let Some(to) = from.offset(df, forward) else {
            continue;
        };
        match pos.piece_at(to) {
            Some(target) if target.color != us => out.push(to),
            None if pos.en_passant() == Some(to) && pos.side_to_move() == us => out.push(to),
            _ => {}
        }
    }
}

// =========================================================================
// Knights, kings and sliders
// =========================================================================

fn step_destinations(
    pos: &Position,
    from: Square,
    us: Color,
    offsets: &[(i8, i8)],
    out: &mut Vec<Square>,
) {
    for &(df, dr) in offsets {
        if let Some(to) = from.offset(df, dr)
            && pos.piece_at(to).is_none_or(|p| p.color != us)
        {
            out.push(to);
        }
    }
}

fn slide_destinations(
    pos: &Position,
    from: Square,
    us: Color,
    directions: &[(i8, i8)],
    out: &mut Vec<Square>,
) {
    for &(df, dr) in directions {
        let mut cur = from;
        while let Some(to) = cur.offset(df, dr) {
            match pos.piece_at(to) {
                None => {
                    out.push(to);
                    cur = to;
                }
                Some(p) => {
                    if p.color != us {
                        out.push(to);
                    }
                    break;
                }
            }
        }
    }
}

// =========================================================================
// Castling
// =========================================================================

/// Castling destinations for a king on its home square.
///
/// Requires the right, the rook at home, empty squares between king and
/// rook, and that the king neither starts on, passes through, nor lands on
/// an attacked square. The rook's path may be attacked.
fn castling_destinations(pos: &Position, from: Square, us: Color, out: &mut Vec<Square>) {
    let rank = us.back_rank();
    if from != Square::from_file_rank(4, rank) {
        return;
    }
    let rights = pos.castling_rights();
    let can_kingside = rights.has(CastlingRights::kingside_flag(us));
    let can_queenside = rights.has(CastlingRights::queenside_flag(us));
    if !can_kingside && !can_queenside {
        return;
    }

    let them = !us;
    if is_square_attacked(pos, from, them) {
        return;
    }

    let rook = Some(Piece::new(us, PieceType::Rook));
    let at = |file: u8| Square::from_file_rank(file, rank);
    let empty = |files: &[u8]| files.iter().all(|&f| pos.piece_at(at(f)).is_none());
    let safe = |files: &[u8]| files.iter().all(|&f| !is_square_attacked(pos, at(f), them));

    // Kingside: e→g through f.
    if can_kingside && pos.piece_at(at(7)) == rook && empty(&[5, 6]) && safe(&[5, 6]) {
        out.push(at(6));
    }

    // Queenside: e→c through d; b must be empty but may be attacked.
    if can_queenside && pos.piece_at(at(0)) == rook && empty(&[1, 2, 3]) && safe(&[2, 3]) {
        out.push(at(2));
    }
}

// =========================================================================
// Tests
// =========================================================================
