//! Zobrist key tables.
//!
//! A position's hash XORs one key per occupied square, a side key when
//! Black is to move, one of 16 castling keys and one of 9 en-passant keys
//! (the ninth meaning "none"). Any single change to the position is undone
//! by XORing the same key again.
//!
//! A table is an immutable value. Positions hold it behind an `Arc`, so a
//! test can build its own table from another seed and hand it to
//! `Position::with_keys`.

use std::fmt;
use std::sync::{Arc, OnceLock};

use crate::engine::types::{CastlingRights, Color, Piece, Square};

// ---------------------------------------------------------------------------
// Table dimensions
// ---------------------------------------------------------------------------

/// 16 possible castling-rights bitmasks (0..15).
const CASTLING_KEYS: usize = 16;
/// 8 en-passant files plus one slot for "no en-passant square".
const EP_KEYS: usize = 9;
/// Slot used when there is no en-passant square.
const EP_NONE: usize = 8;

/// Seed of the process-wide table (digits of π).
pub const DEFAULT_SEED: u64 = 0x3243_F6A8_885A_308D;

// ---------------------------------------------------------------------------
// ZobristKeys
// ---------------------------------------------------------------------------

/// Pre-computed Zobrist random keys.
pub struct ZobristKeys {
    seed: u64,
    /// piece\[color\]\[piece_type\]\[square\]: random key for a piece on a square.
    piece: [[[u64; 64]; 6]; 2],
    /// XOR this when it is Black's turn to move.
    side_to_move: u64,
    /// castling\[rights_as_u8\]: one key per possible castling bitmask.
    castling: [u64; CASTLING_KEYS],
    /// en_passant\[file\], with `EP_NONE` for the absent case.
    en_passant: [u64; EP_KEYS],
}

static SHARED: OnceLock<Arc<ZobristKeys>> = OnceLock::new();

/// The process-wide table built from [`DEFAULT_SEED`], created on first use.
pub fn shared() -> Arc<ZobristKeys> {
    Arc::clone(SHARED.get_or_init(|| Arc::new(ZobristKeys::from_seed(DEFAULT_SEED))))
}

impl ZobristKeys {
    /// Generate all keys from a deterministic PRNG. Equal seeds give equal
    /// tables.
    pub fn from_seed(seed: u64) -> Self {
        let mut rng = Xorshift64::new(seed);

        let mut piece = [[[0u64; 64]; 6]; 2];
        for color in &mut piece {
            for pt in color {
                for sq in pt {
                    *sq = rng.next_u64();
                }
            }
        }

        let side_to_move = rng.next_u64();

        let mut castling = [0u64; CASTLING_KEYS];
        for key in &mut castling {
            *key = rng.next_u64();
        }

        let mut en_passant = [0u64; EP_KEYS];
        for key in &mut en_passant {
            *key = rng.next_u64();
        }

        ZobristKeys {
            seed,
            piece,
            side_to_move,
            castling,
            en_passant,
        }
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    // -----------------------------------------------------------------------
    // Lookups
    // -----------------------------------------------------------------------

    /// Key for a specific piece on a specific square.
    #[inline]
    pub fn piece_key(&self, piece: Piece, sq: Square) -> u64 {
        self.piece[piece.color.index()][piece.kind.index()][sq.0 as usize]
    }

    /// Key XORed in while Black is to move.
    #[inline]
    pub fn side_key(&self) -> u64 {
        self.side_to_move
    }

    /// Turn term for `color`: the side key for Black, zero for White.
    #[inline]
    pub fn turn_key(&self, color: Color) -> u64 {
        match color {
            Color::White => 0,
            Color::Black => self.side_to_move,
        }
    }

    /// Key for a specific castling-rights bitmask.
    #[inline]
    pub fn castling_key(&self, rights: CastlingRights) -> u64 {
        self.castling[(rights.0 & 0x0F) as usize]
    }

    /// Key for the en-passant file, or the "none" key.
    #[inline]
    pub fn ep_key(&self, ep: Option<Square>) -> u64 {
        match ep {
            Some(sq) => self.en_passant[sq.file() as usize],
            None => self.en_passant[EP_NONE],
        }
    }
}

impl fmt::Debug for ZobristKeys {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ZobristKeys")
            .field("seed", &format_args!("{:#018x}", self.seed))
            .finish_non_exhaustive()
    }
}

// ---------------------------------------------------------------------------
// Deterministic PRNG (xorshift64)
// ---------------------------------------------------------------------------

/// Minimal deterministic xorshift64 PRNG.
struct Xorshift64 {
    state: u64,
}

impl Xorshift64 {
    fn new(seed: u64) -> Self {
        // Zero is a fixed point of xorshift.
        Xorshift64 {
            state: if seed == 0 { 1 } else { seed },
        }
    }

    fn next_u64(&mut self) -> u64 {
        let mut x = self.state;
        x ^= x << 13;
        x ^= x >> 7;
        x ^= x << 17;
        self.state = x;
        x
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;
    use crate::engine::types::PieceType;

    #[test]
    fn shared_table_is_a_singleton() {
        let a = shared();
        let b = shared();
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(a.seed(), DEFAULT_SEED);
    }

    #[test]
    fn same_seed_same_table() {
        let a = ZobristKeys::from_seed(7);
        let b = ZobristKeys::from_seed(7);
        let king = Piece::new(Color::White, PieceType::King);
        for sq in Square::all() {
            assert_eq!(a.piece_key(king, sq), b.piece_key(king, sq));
        }
        assert_eq!(a.side_key(), b.side_key());
        assert_eq!(a.ep_key(None), b.ep_key(None));
    }

    #[test]
    fn different_seed_different_table() {
        let a = ZobristKeys::from_seed(1);
        let b = ZobristKeys::from_seed(2);
        assert_ne!(a.side_key(), b.side_key());
    }

    #[test]
    fn all_keys_unique() {
        let k = shared();
        let mut set = HashSet::new();
        for color in [Color::White, Color::Black] {
            for kind in PieceType::ALL {
                for sq in Square::all() {
                    assert!(set.insert(k.piece_key(Piece::new(color, kind), sq)));
                }
            }
        }
        assert!(set.insert(k.side_key()));
        for bits in 0..16u8 {
            assert!(set.insert(k.castling_key(CastlingRights(bits))));
        }
        for file in 0..8u8 {
            assert!(set.insert(k.ep_key(Some(Square::from_file_rank(file, 2)))));
        }
        assert!(set.insert(k.ep_key(None)));
        assert_eq!(set.len(), 768 + 1 + 16 + 9);
    }

    #[test]
    fn ep_key_depends_only_on_file() {
        let k = shared();
        let e3 = Square::from_algebraic("e3").unwrap();
        let e6 = Square::from_algebraic("e6").unwrap();
        assert_eq!(k.ep_key(Some(e3)), k.ep_key(Some(e6)));
        assert_ne!(k.ep_key(Some(e3)), k.ep_key(None));
    }

    #[test]
    fn turn_key_is_zero_for_white() {
        let k = shared();
        assert_eq!(k.turn_key(Color::White), 0);
        assert_eq!(k.turn_key(Color::Black), k.side_key());
    }

    #[test]
    fn xorshift_never_zero() {
        let mut rng = Xorshift64::new(0);
        for _ in 0..10_000 {
            assert_ne!(rng.next_u64(), 0, "xorshift produced zero");
        }
    }

    #[test]
    fn debug_output_is_short() {
        let dbg = format!("{:?}", ZobristKeys::from_seed(0x10));
        assert!(dbg.contains("0x0000000000000010"), "{dbg}");
        assert!(dbg.len() < 80);
    }
}
