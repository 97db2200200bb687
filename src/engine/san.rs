//! Standard Algebraic Notation (SAN) generation and parsing.
//!
//! SAN examples: `e4`, `Nf3`, `Bxe5`, `O-O`, `e8=Q+`, `Raxd1#`.

use crate::engine::arbiter;
use crate::engine::board::Position;
use crate::engine::types::{ChessError, Move, PieceType, Square};

// =========================================================================
// SAN generation
// =========================================================================

/// Convert a move to SAN notation.
///
/// `legal_moves` should be the full list of legal moves in the position
/// (passed in to avoid redundant generation).
///
/// Does NOT append `+` or `#`; the game controller adds those once the
/// resulting state is known.
pub fn move_to_san(pos: &Position, mv: Move, legal_moves: &[Move]) -> String {
    let Some(piece) = pos.piece_at(mv.from) else {
        return mv.to_string();
    };
    let file_change = mv.to.file() as i8 - mv.from.file() as i8;

    // Castling.
    if piece.kind == PieceType::King && file_change.abs() == 2 {
        return if file_change > 0 {
            "O-O".into()
        } else {
            "O-O-O".into()
        };
    }

    let mut san = String::with_capacity(8);

    if piece.kind == PieceType::Pawn {
        // A pawn changing file always captures, en passant included.
        if file_change != 0 {
            san.push(mv.from.file_char());
            san.push('x');
        }
        san.push_str(&mv.to.to_algebraic());

        if let Some(promo) = mv.promotion {
            san.push('=');
            san.push(promo.letter());
        }
    } else {
        san.push(piece.kind.letter());
        san.push_str(&disambiguation(pos, mv, piece.kind, legal_moves));
        if pos.piece_at(mv.to).is_some() {
            san.push('x');
        }
        san.push_str(&mv.to.to_algebraic());
    }

    san
}

/// Determine the disambiguation string needed for a piece move.
///
/// If another piece of the same type can legally reach the same square,
/// add the file, the rank, or both.
fn disambiguation(pos: &Position, mv: Move, kind: PieceType, legal_moves: &[Move]) -> String {
    let us = pos.side_to_move();
    let rivals: Vec<Square> = legal_moves
        .iter()
        .filter(|m| {
            m.to == mv.to
                && m.from != mv.from
                && pos.piece_at(m.from).is_some_and(|p| p.is(us, kind))
        })
        .map(|m| m.from)
        .collect();

    if rivals.is_empty() {
        return String::new();
    }

    let same_file = rivals.iter().any(|sq| sq.file() == mv.from.file());
    let same_rank = rivals.iter().any(|sq| sq.rank() == mv.from.rank());

    match (same_file, same_rank) {
        (false, _) => mv.from.file_char().to_string(),
        (true, false) => mv.from.rank_char().to_string(),
        (true, true) => mv.from.to_algebraic(),
    }
}

// =========================================================================
// SAN parsing
// =========================================================================

fn no_match(san: &str, reason: impl Into<String>) -> ChessError {
    ChessError::InvalidMove {
        from: String::new(),
        to: san.to_string(),
        reason: reason.into(),
    }
}

/// Parse a SAN string and return the corresponding legal move.
///
/// Accepts `e4`, `Nf3`, `Bxe5`, `O-O`, `O-O-O`, `e8=Q`, `e8Q`, and so on.
/// Check, mate and annotation suffixes (`+ # ! ?`) are ignored.
pub fn parse_san(pos: &mut Position, san: &str) -> Result<Move, ChessError> {
    let legal = arbiter::all_legal_moves(pos);
    let san = san.trim().trim_end_matches(['+', '#', '!', '?']);

    // Castling.
    match san {
        "O-O" | "0-0" => return find_castling(pos, &legal, true, san),
        "O-O-O" | "0-0-0" => return find_castling(pos, &legal, false, san),
        _ => {}
    }

    let mut chars: Vec<char> = san.chars().collect();
    if chars.is_empty() {
        return Err(no_match(san, "empty SAN string"));
    }

    // Promotion suffix, with or without '='.
    let mut promotion = None;
    if let Some(&last) = chars.last()
        && chars.len() >= 3
        && (last.is_ascii_uppercase() || chars[chars.len() - 2] == '=')
    {
        promotion = Some(
            PieceType::promotion_from_char(last)
                .ok_or_else(|| ChessError::InvalidPromotion(last.to_string()))?,
        );
        chars.pop();
        if chars.last() == Some(&'=') {
            chars.pop();
        }
    }

    // Piece letter; pawns have none.
    let (kind, rest) = match chars[0] {
        'N' => (PieceType::Knight, &chars[1..]),
        'B' => (PieceType::Bishop, &chars[1..]),
        'R' => (PieceType::Rook, &chars[1..]),
        'Q' => (PieceType::Queen, &chars[1..]),
        'K' => (PieceType::King, &chars[1..]),
        _ => (PieceType::Pawn, &chars[..]),
    };

    let rest: Vec<char> = rest.iter().copied().filter(|&c| c != 'x').collect();
    if rest.len() < 2 {
        return Err(no_match(san, "SAN too short"));
    }

    let dest_str: String = rest[rest.len() - 2..].iter().collect();
    let dest =
        Square::from_algebraic(&dest_str).ok_or_else(|| ChessError::InvalidSquare(dest_str))?;

    // Disambiguation characters (0, 1, or 2 chars before destination).
    let disambig = &rest[..rest.len() - 2];
    let disambig_file = disambig
        .iter()
        .find(|c| ('a'..='h').contains(*c))
        .map(|&c| c as u8 - b'a');
    let disambig_rank = disambig
        .iter()
        .find(|c| ('1'..='8').contains(*c))
        .map(|&c| c as u8 - b'1');

    let us = pos.side_to_move();
    let candidates: Vec<Move> = legal
        .iter()
        .copied()
        .filter(|m| {
            m.to == dest
                && m.promotion == promotion
                && pos.piece_at(m.from).is_some_and(|p| p.is(us, kind))
                && disambig_file.is_none_or(|f| m.from.file() == f)
                && disambig_rank.is_none_or(|r| m.from.rank() == r)
        })
        .collect();

    match candidates.as_slice() {
        [] => Err(no_match(san, format!("no legal move matches SAN '{san}'"))),
        [mv] => Ok(*mv),
        many => Err(no_match(
            san,
            format!("ambiguous SAN '{san}': {} candidates", many.len()),
        )),
    }
}

fn find_castling(
    pos: &Position,
    legal: &[Move],
    kingside: bool,
    san: &str,
) -> Result<Move, ChessError> {
    let king_sq = pos
        .king_square(pos.side_to_move())
        .ok_or_else(|| no_match(san, "no king to castle with"))?;
    let target_file = if kingside { 6 } else { 2 };

    legal
        .iter()
        .find(|m| {
            m.from == king_sq
                && m.to.file() == target_file
                && king_sq.file() == 4
                && m.to.rank() == king_sq.rank()
        })
        .copied()
        .ok_or_else(|| {
            no_match(
                san,
                format!(
                    "castling {} not legal",
                    if kingside { "kingside" } else { "queenside" }
                ),
            )
        })
}

// =========================================================================
// Tests
// =========================================================================
