//! FEN import and export.
//!
//! The piece-placement field is required. The other five may be omitted
//! from the end of the string, in which case they default to `w - - 0 1`.
//! A field that is present but malformed is an error.

use std::sync::Arc;

use crate::engine::board::Position;
use crate::engine::types::{CastlingRights, Color, Piece, PieceType, Square};
use crate::engine::zobrist::{self, ZobristKeys};

pub const STARTING_FEN: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

/// Why a FEN string was rejected.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FenError {
    #[error("empty FEN string")]
    Empty,

    #[error("expected at most 6 fields, got {0}")]
    TooManyFields(usize),

    #[error("expected 8 ranks, got {0}")]
    RankCount(usize),

    #[error("rank {rank} does not describe exactly 8 squares")]
    RankWidth { rank: u8 },

    #[error("invalid character '{0}' in piece placement")]
    InvalidPiece(char),

    #[error("{color} has {count} kings (expected 1)")]
    KingCount { color: Color, count: usize },

    #[error("invalid side to move: '{0}'")]
    SideToMove(String),

    #[error("invalid castling string: '{0}'")]
    Castling(String),

    #[error("invalid en passant square: '{0}'")]
    EnPassant(String),

    #[error("invalid halfmove clock: '{0}'")]
    HalfmoveClock(String),

    #[error("invalid fullmove number: '{0}'")]
    FullmoveNumber(String),
}

impl Position {
    /// Parse a FEN string into a `Position` using the shared key table.
    pub fn from_fen(fen: &str) -> Result<Self, FenError> {
        Self::from_fen_with_keys(fen, zobrist::shared())
    }

    /// Parse a FEN string, hashing with `keys`. The resulting history holds
    /// just the loaded position.
    pub fn from_fen_with_keys(fen: &str, keys: Arc<ZobristKeys>) -> Result<Self, FenError> {
        let fields: Vec<&str> = fen.split_whitespace().collect();
        if fields.is_empty() {
            return Err(FenError::Empty);
        }
        if fields.len() > 6 {
            return Err(FenError::TooManyFields(fields.len()));
        }

        let mut pos = Position::with_keys(keys);

        // ----- Field 1: Piece placement -----
        parse_placement(&mut pos, fields[0])?;

        // ----- Field 2: Side to move -----
        let side = match fields.get(1).copied() {
            None | Some("w") => Color::White,
            Some("b") => Color::Black,
            Some(other) => return Err(FenError::SideToMove(other.to_string())),
        };
        pos.set_turn(side);

        // ----- Field 3: Castling availability -----
        if let Some(&field) = fields.get(2) {
            let rights = CastlingRights::from_fen(field)
                .ok_or_else(|| FenError::Castling(field.to_string()))?;
            pos.set_castling_rights(rights);
        }

        // ----- Field 4: En passant target square -----
        if let Some(&field) = fields.get(3)
            && field != "-"
        {
            let ep = Square::from_algebraic(field)
                .filter(|sq| sq.rank() == 2 || sq.rank() == 5)
                .ok_or_else(|| FenError::EnPassant(field.to_string()))?;
            pos.set_en_passant(Some(ep));
        }

        // ----- Field 5: Halfmove clock -----
        if let Some(&field) = fields.get(4) {
            let clock = field
                .parse::<u16>()
                .map_err(|_| FenError::HalfmoveClock(field.to_string()))?;
            pos.set_halfmove_clock(clock);
        }

        // ----- Field 6: Fullmove number -----
        if let Some(&field) = fields.get(5) {
            let number = field
                .parse::<u16>()
                .ok()
                .filter(|&n| n >= 1)
                .ok_or_else(|| FenError::FullmoveNumber(field.to_string()))?;
            pos.set_fullmove_number(number);
        }

        pos.reset_history();
        Ok(pos)
    }

    /// Export the position as a six-field FEN string.
    pub fn to_fen(&self) -> String {
        let mut fen = String::with_capacity(80);

        // ----- Field 1: Piece placement -----
        for rank in (0..8).rev() {
            let mut empty_count = 0u8;
            for file in 0..8 {
                match self.piece_at(Square::from_file_rank(file, rank)) {
                    Some(piece) => {
                        if empty_count > 0 {
                            fen.push((b'0' + empty_count) as char);
                            empty_count = 0;
                        }
                        fen.push(piece.to_char());
                    }
                    None => empty_count += 1,
                }
            }
            if empty_count > 0 {
                fen.push((b'0' + empty_count) as char);
            }
            if rank > 0 {
                fen.push('/');
            }
        }

        // ----- Fields 2-6 -----
        let side = match self.side_to_move() {
            Color::White => 'w',
            Color::Black => 'b',
        };
        let ep = self
            .en_passant()
            .map_or_else(|| "-".to_string(), Square::to_algebraic);
        fen.push_str(&format!(
            " {side} {} {ep} {} {}",
            self.castling_rights().to_fen(),
            self.halfmove_clock(),
            self.fullmove_number()
        ));

        fen
    }
}

fn parse_placement(pos: &mut Position, field: &str) -> Result<(), FenError> {
    let ranks: Vec<&str> = field.split('/').collect();
    if ranks.len() != 8 {
        return Err(FenError::RankCount(ranks.len()));
    }

    let mut kings = [0usize; 2];
    for (rank_idx, rank_str) in ranks.iter().enumerate() {
        let rank = 7 - rank_idx as u8; // FEN starts from rank 8
        let mut file: u8 = 0;
        for ch in rank_str.chars() {
            if let Some(digit) = ch.to_digit(10) {
                if !(1..=8).contains(&digit) {
                    return Err(FenError::InvalidPiece(ch));
                }
                file += digit as u8;
            } else {
                let piece = Piece::from_char(ch).ok_or(FenError::InvalidPiece(ch))?;
                if file >= 8 {
                    return Err(FenError::RankWidth { rank: rank + 1 });
                }
                if piece.kind == PieceType::King {
                    kings[piece.color.index()] += 1;
                }
                pos.place(Square::from_file_rank(file, rank), Some(piece));
                file += 1;
            }
            if file > 8 {
                return Err(FenError::RankWidth { rank: rank + 1 });
            }
        }
        if file != 8 {
            return Err(FenError::RankWidth { rank: rank + 1 });
        }
    }

    for color in [Color::White, Color::Black] {
        let count = kings[color.index()];
        if count != 1 {
            return Err(FenError::KingCount { color, count });
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
