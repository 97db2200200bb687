//! Movement offset tables and the square-attack query.
//!
//! `is_square_attacked` works backwards from the target square: for each
//! piece category it looks where such a piece would have to stand to hit
//! the square, and checks whether one of the attacker's pieces is there.
//! No enemy move list is ever built.

use crate::engine::board::Position;
use crate::engine::types::{Color, Piece, PieceType, Square};

/// (file, rank) steps of a knight.
pub const KNIGHT_OFFSETS: [(i8, i8); 8] = [
    (1, 2),
    (2, 1),
    (2, -1),
    (1, -2),
    (-1, -2),
    (-2, -1),
    (-2, 1),
    (-1, 2),
];

/// (file, rank) steps of a king, also the queen's ray directions.
pub const KING_OFFSETS: [(i8, i8); 8] = [
    (0, 1),
    (1, 1),
    (1, 0),
    (1, -1),
    (0, -1),
    (-1, -1),
    (-1, 0),
    (-1, 1),
];

pub const ROOK_DIRECTIONS: [(i8, i8); 4] = [(0, 1), (1, 0), (0, -1), (-1, 0)];

pub const BISHOP_DIRECTIONS: [(i8, i8); 4] = [(1, 1), (1, -1), (-1, -1), (-1, 1)];

/// Ray directions for a sliding piece; empty for everything else.
pub fn slider_directions(kind: PieceType) -> &'static [(i8, i8)] {
    match kind {
        PieceType::Bishop => &BISHOP_DIRECTIONS,
        PieceType::Rook => &ROOK_DIRECTIONS,
        PieceType::Queen => &KING_OFFSETS,
        _ => &[],
    }
}

/// Is `sq` attacked by any piece of colour `by`?
pub fn is_square_attacked(pos: &Position, sq: Square, by: Color) -> bool {
    // A pawn attacks diagonally forward, so an attacking pawn stands one
    // rank behind `sq` from its own point of view.
    let pawn = Piece::new(by, PieceType::Pawn);
    for df in [-1, 1] {
        if let Some(from) = sq.offset(df, -by.forward())
            && pos.piece_at(from) == Some(pawn)
        {
            return true;
        }
    }

    if steps_hit(pos, sq, &KNIGHT_OFFSETS, Piece::new(by, PieceType::Knight)) {
        return true;
    }
    if steps_hit(pos, sq, &KING_OFFSETS, Piece::new(by, PieceType::King)) {
        return true;
    }

    rays_hit(pos, sq, &ROOK_DIRECTIONS, by, PieceType::Rook)
        || rays_hit(pos, sq, &BISHOP_DIRECTIONS, by, PieceType::Bishop)
}

fn steps_hit(pos: &Position, sq: Square, offsets: &[(i8, i8)], attacker: Piece) -> bool {
    offsets
        .iter()
        .filter_map(|&(df, dr)| sq.offset(df, dr))
        .any(|from| pos.piece_at(from) == Some(attacker))
}

/// Walk each ray until the first occupied square. A `slider` or a queen of
/// colour `by` there is an attacker; anything else blocks the ray.
fn rays_hit(
    pos: &Position,
    sq: Square,
    directions: &[(i8, i8)],
    by: Color,
    slider: PieceType,
) -> bool {
    for &(df, dr) in directions {
        let mut cur = sq;
        while let Some(next) = cur.offset(df, dr) {
            match pos.piece_at(next) {
                None => cur = next,
                Some(p) => {
                    if p.color == by && (p.kind == slider || p.kind == PieceType::Queen) {
                        return true;
                    }
                    break;
                }
            }
        }
    }
    false
}

// =========================================================================
// Tests
// =========================================================================
