//! Mailbox chess position with an incrementally maintained Zobrist hash.
//!
//! `Position` stores one `Option<Piece>` per square plus side to move,
//! castling rights, en-passant square, move counters, the hash, the
//! hash history used for repetition counting, and a cache of both king
//! squares.
//!
//! Every mutator that touches a hashed field updates the hash in the same
//! call. `place` is the only way to change the grid.

use std::fmt;
use std::sync::Arc;

use crate::engine::types::{CastlingRights, Color, Piece, PieceType, Square};
use crate::engine::zobrist::{self, ZobristKeys};

/// Back-rank layout shared by both colors, file a first.
const BACK_RANK: [PieceType; 8] = [
    PieceType::Rook,
    PieceType::Knight,
    PieceType::Bishop,
    PieceType::Queen,
    PieceType::King,
    PieceType::Bishop,
    PieceType::Knight,
    PieceType::Rook,
];

// ---------------------------------------------------------------------------
// Position
// ---------------------------------------------------------------------------

/// A complete chess position.
///
/// Board layout follows LERF (Little-Endian Rank-File) mapping:
/// a1 = 0, b1 = 1, … h1 = 7, a2 = 8, … h8 = 63.
///
/// `Clone` is a deep copy, history included. Search clones once per call
/// and then executes/undoes moves on its private copy.
#[derive(Clone, Debug)]
pub struct Position {
    keys: Arc<ZobristKeys>,
    grid: [Option<Piece>; Square::NUM],
    side_to_move: Color,
    castling_rights: CastlingRights,
    /// En-passant target square (the square *behind* the double-pushed pawn).
    en_passant: Option<Square>,
    /// Half-move clock for the 50-move rule (reset on pawn move or capture).
    halfmove_clock: u16,
    /// Full-move number (starts at 1, incremented after Black moves).
    fullmove_number: u16,
    hash: u64,
    /// Hashes of positions reached so far, oldest first.
    history: Vec<u64>,
    kings: [Option<Square>; 2],
}

// ---------------------------------------------------------------------------
// Construction
// ---------------------------------------------------------------------------

impl Position {
    /// An empty board: White to move, no castling rights, full-move 1.
    pub fn new() -> Self {
        Self::with_keys(zobrist::shared())
    }

    /// An empty board hashed with a caller-supplied key table.
    pub fn with_keys(keys: Arc<ZobristKeys>) -> Self {
        let hash = keys.turn_key(Color::White)
            ^ keys.castling_key(CastlingRights::NONE)
            ^ keys.ep_key(None);
        Position {
            keys,
            grid: [None; Square::NUM],
            side_to_move: Color::White,
            castling_rights: CastlingRights::NONE,
            en_passant: None,
            halfmove_clock: 0,
            fullmove_number: 1,
            hash,
            history: Vec::new(),
            kings: [None; 2],
        }
    }

    /// Standard starting position, with its hash recorded in the history.
    pub fn starting() -> Self {
        let mut pos = Position::new();
        for (file, &kind) in BACK_RANK.iter().enumerate() {
            let file = file as u8;
            pos.place(
                Square::from_file_rank(file, 0),
                Some(Piece::new(Color::White, kind)),
            );
            pos.place(
                Square::from_file_rank(file, 1),
                Some(Piece::new(Color::White, PieceType::Pawn)),
            );
            pos.place(
                Square::from_file_rank(file, 6),
                Some(Piece::new(Color::Black, PieceType::Pawn)),
            );
            pos.place(
                Square::from_file_rank(file, 7),
                Some(Piece::new(Color::Black, kind)),
            );
        }
        pos.set_castling_rights(CastlingRights::ALL);
        pos.reset_history();
        pos
    }

    /// The key table this position hashes with.
    pub fn keys(&self) -> &Arc<ZobristKeys> {
        &self.keys
    }

    // -----------------------------------------------------------------------
    // Grid
    // -----------------------------------------------------------------------

    /// The piece on `sq`, or `None` for an empty or off-board square.
    #[inline]
    pub fn piece_at(&self, sq: Square) -> Option<Piece> {
        self.grid.get(sq.0 as usize).copied().flatten()
    }

    /// Set `sq` to `piece` (or clear it with `None`), retiring the old
    /// occupant's hash term and applying the new one. Keeps the king cache
    /// in step. Off-board squares are ignored.
    pub fn place(&mut self, sq: Square, piece: Option<Piece>) {
        let Some(slot) = self.grid.get_mut(sq.0 as usize) else {
            return;
        };
        let old = std::mem::replace(slot, piece);

        if let Some(old) = old {
            self.hash ^= self.keys.piece_key(old, sq);
            if old.kind == PieceType::King && self.kings[old.color.index()] == Some(sq) {
                self.kings[old.color.index()] = None;
            }
        }
        if let Some(new) = piece {
            self.hash ^= self.keys.piece_key(new, sq);
            if new.kind == PieceType::King {
                self.kings[new.color.index()] = Some(sq);
            }
        }
    }

    /// Cached king square for `color`; `None` if that king is not on the board.
    #[inline]
    pub fn king_square(&self, color: Color) -> Option<Square> {
        self.kings[color.index()]
    }

    /// All occupied squares of one color, a1 first.
    pub fn pieces(&self, color: Color) -> impl Iterator<Item = (Square, Piece)> + '_ {
        self.occupied().filter(move |(_, p)| p.color == color)
    }

    /// All occupied squares, a1 first.
    pub fn occupied(&self) -> impl Iterator<Item = (Square, Piece)> + '_ {
        self.grid
            .iter()
            .enumerate()
            .filter_map(|(i, p)| p.map(|p| (Square(i as u8), p)))
    }

    // -----------------------------------------------------------------------
    // Scalar state
    // -----------------------------------------------------------------------

    #[inline]
    pub fn side_to_move(&self) -> Color {
        self.side_to_move
    }

    pub fn set_turn(&mut self, color: Color) {
        self.hash ^= self.keys.turn_key(self.side_to_move) ^ self.keys.turn_key(color);
        self.side_to_move = color;
    }

    #[inline]
    pub fn castling_rights(&self) -> CastlingRights {
        self.castling_rights
    }

    pub fn set_castling_rights(&mut self, rights: CastlingRights) {
        self.hash ^= self.keys.castling_key(self.castling_rights) ^ self.keys.castling_key(rights);
        self.castling_rights = rights;
    }

    #[inline]
    pub fn en_passant(&self) -> Option<Square> {
        self.en_passant
    }

    pub fn set_en_passant(&mut self, ep: Option<Square>) {
        self.hash ^= self.keys.ep_key(self.en_passant) ^ self.keys.ep_key(ep);
        self.en_passant = ep;
    }

    #[inline]
    pub fn halfmove_clock(&self) -> u16 {
        self.halfmove_clock
    }

    pub fn set_halfmove_clock(&mut self, clock: u16) {
        self.halfmove_clock = clock;
    }

    #[inline]
    pub fn fullmove_number(&self) -> u16 {
        self.fullmove_number
    }

    pub fn set_fullmove_number(&mut self, number: u16) {
        self.fullmove_number = number;
    }

    // -----------------------------------------------------------------------
    // Hash & history
    // -----------------------------------------------------------------------

    /// The incrementally maintained Zobrist hash.
    #[inline]
    pub fn hash(&self) -> u64 {
        self.hash
    }

    /// Compute the Zobrist hash from scratch (verification only).
    pub fn compute_hash(&self) -> u64 {
        let zk = &self.keys;
        let mut hash = zk.turn_key(self.side_to_move)
            ^ zk.castling_key(self.castling_rights)
            ^ zk.ep_key(self.en_passant);
        for (sq, piece) in self.occupied() {
            hash ^= zk.piece_key(piece, sq);
        }
        hash
    }

    pub fn history(&self) -> &[u64] {
        &self.history
    }

    /// Append the current hash to the history.
    pub fn record_position(&mut self) {
        self.history.push(self.hash);
    }

    /// Drop the most recent history entry.
    pub fn pop_position(&mut self) -> Option<u64> {
        self.history.pop()
    }

    /// Forget all history and start it again from the current position.
    pub fn reset_history(&mut self) {
        self.history.clear();
        self.history.push(self.hash);
    }

    /// How many times the current hash occurs since the last irreversible
    /// move. Only the newest `halfmove_clock + 1` entries can match: a pawn
    /// move or capture changes the hash for good.
    pub fn repetition_count(&self) -> usize {
        let window = self.halfmove_clock as usize + 1;
        self.history
            .iter()
            .rev()
            .take(window)
            .filter(|&&h| h == self.hash)
            .count()
    }

    // -----------------------------------------------------------------------
    // Board display (8×8 text grid)
    // -----------------------------------------------------------------------

    /// Render the board as an 8-line string (rank 8 at top), useful for debugging.
    pub fn board_string(&self) -> String {
        let mut s = String::with_capacity(200);
        for rank in (0..8).rev() {
            s.push((b'1' + rank) as char);
            s.push(' ');
            for file in 0..8 {
                let ch = self
                    .piece_at(Square::from_file_rank(file, rank))
                    .map_or('.', Piece::to_char);
                s.push(ch);
                if file < 7 {
                    s.push(' ');
                }
            }
            s.push('\n');
        }
        s.push_str("  a b c d e f g h");
        s
    }
}

impl Default for Position {
    fn default() -> Self {
        Self::new()
    }
}

/// Field-for-field equality. The key table is not compared.
impl PartialEq for Position {
    fn eq(&self, other: &Self) -> bool {
        self.grid == other.grid
            && self.side_to_move == other.side_to_move
            && self.castling_rights == other.castling_rights
            && self.en_passant == other.en_passant
            && self.halfmove_clock == other.halfmove_clock
            && self.fullmove_number == other.fullmove_number
            && self.hash == other.hash
            && self.history == other.history
            && self.kings == other.kings
    }
}

impl Eq for Position {}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.board_string())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn sq(name: &str) -> Square {
        Square::from_algebraic(name).unwrap()
    }

    fn piece(c: char) -> Option<Piece> {
        Piece::from_char(c)
    }

    // =================================================================
    // Starting position
    // =================================================================

    #[test]
    fn starting_position_layout() {
        let pos = Position::starting();
        assert_eq!(pos.piece_at(sq("e1")), piece('K'));
        assert_eq!(pos.piece_at(sq("d8")), piece('q'));
        assert_eq!(pos.piece_at(sq("a1")), piece('R'));
        assert_eq!(pos.piece_at(sq("h8")), piece('r'));
        for file in 0..8 {
            assert_eq!(pos.piece_at(Square::from_file_rank(file, 1)), piece('P'));
            assert_eq!(pos.piece_at(Square::from_file_rank(file, 6)), piece('p'));
            for rank in 2..6 {
                assert_eq!(pos.piece_at(Square::from_file_rank(file, rank)), None);
            }
        }
        assert_eq!(pos.occupied().count(), 32);
        assert_eq!(pos.pieces(Color::White).count(), 16);
    }

    #[test]
    fn starting_position_state() {
        let pos = Position::starting();
        assert_eq!(pos.side_to_move(), Color::White);
        assert_eq!(pos.castling_rights(), CastlingRights::ALL);
        assert_eq!(pos.en_passant(), None);
        assert_eq!(pos.halfmove_clock(), 0);
        assert_eq!(pos.fullmove_number(), 1);
        assert_eq!(pos.king_square(Color::White), Some(sq("e1")));
        assert_eq!(pos.king_square(Color::Black), Some(sq("e8")));
        assert_eq!(pos.history(), &[pos.hash()]);
    }

    #[test]
    fn starting_hash_matches_recompute() {
        let pos = Position::starting();
        assert_eq!(pos.hash(), pos.compute_hash());
    }

    // =================================================================
    // place
    // =================================================================

    #[test]
    fn place_updates_hash_incrementally() {
        let mut pos = Position::new();
        let empty_hash = pos.hash();
        pos.place(sq("d4"), piece('N'));
        assert_ne!(pos.hash(), empty_hash);
        assert_eq!(pos.hash(), pos.compute_hash());

        // Overwrite: the knight's term is retired.
        pos.place(sq("d4"), piece('q'));
        assert_eq!(pos.hash(), pos.compute_hash());

        pos.place(sq("d4"), None);
        assert_eq!(pos.hash(), empty_hash);
    }

    #[test]
    fn place_tracks_king_cache() {
        let mut pos = Position::new();
        assert_eq!(pos.king_square(Color::White), None);

        pos.place(sq("e1"), piece('K'));
        assert_eq!(pos.king_square(Color::White), Some(sq("e1")));

        // Moving the king: place at the target, then clear the origin.
        pos.place(sq("f1"), piece('K'));
        pos.place(sq("e1"), None);
        assert_eq!(pos.king_square(Color::White), Some(sq("f1")));

        // Overwriting the king with another piece empties the cache.
        pos.place(sq("f1"), piece('r'));
        assert_eq!(pos.king_square(Color::White), None);
        assert_eq!(pos.king_square(Color::Black), None);
    }

    #[test]
    fn off_board_squares_are_absorbed() {
        let mut pos = Position::starting();
        let before = pos.clone();
        assert_eq!(pos.piece_at(Square(64)), None);
        assert_eq!(pos.piece_at(Square(255)), None);
        pos.place(Square(200), piece('Q'));
        assert_eq!(pos, before);
    }

    // =================================================================
    // Scalar setters
    // =================================================================

    #[test]
    fn scalar_setters_keep_hash_in_sync() {
        let mut pos = Position::starting();
        let h0 = pos.hash();

        pos.set_turn(Color::Black);
        assert_ne!(pos.hash(), h0);
        assert_eq!(pos.hash(), pos.compute_hash());

        pos.set_castling_rights(CastlingRights::from_fen("Kq").unwrap());
        assert_eq!(pos.hash(), pos.compute_hash());

        pos.set_en_passant(Some(sq("e3")));
        assert_eq!(pos.hash(), pos.compute_hash());

        pos.set_en_passant(None);
        pos.set_castling_rights(CastlingRights::ALL);
        pos.set_turn(Color::White);
        assert_eq!(pos.hash(), h0);
    }

    #[test]
    fn setting_same_value_leaves_hash_alone() {
        let mut pos = Position::starting();
        let h0 = pos.hash();
        pos.set_turn(Color::White);
        pos.set_castling_rights(CastlingRights::ALL);
        pos.set_en_passant(None);
        assert_eq!(pos.hash(), h0);
    }

    #[test]
    fn clocks_are_not_hashed() {
        let mut pos = Position::starting();
        let h0 = pos.hash();
        pos.set_halfmove_clock(40);
        pos.set_fullmove_number(30);
        assert_eq!(pos.hash(), h0);
    }

    // =================================================================
    // Key tables
    // =================================================================

    #[test]
    fn substituted_key_table_changes_hashes() {
        let keys = Arc::new(ZobristKeys::from_seed(99));
        let mut custom = Position::with_keys(Arc::clone(&keys));
        let mut shared = Position::new();
        for pos in [&mut custom, &mut shared] {
            pos.place(sq("e1"), piece('K'));
            pos.place(sq("e8"), piece('k'));
        }
        assert_ne!(custom.hash(), shared.hash());
        assert_eq!(custom.hash(), custom.compute_hash());
        assert_eq!(custom.keys().seed(), 99);
        // Equality ignores the key table but not the hash.
        assert_ne!(custom, shared);
    }

    // =================================================================
    // History & repetition
    // =================================================================

    #[test]
    fn clone_is_independent() {
        let original = Position::starting();
        let mut copy = original.clone();
        copy.place(sq("e2"), None);
        copy.record_position();
        assert_eq!(original.piece_at(sq("e2")), piece('P'));
        assert_eq!(original.history().len(), 1);
        assert_eq!(copy.history().len(), 2);
    }

    #[test]
    fn repetition_count_respects_halfmove_window() {
        let mut pos = Position::starting();
        let h = pos.hash();
        pos.record_position();
        pos.record_position();
        // Clock 0: only the newest entry is in the window.
        assert_eq!(pos.repetition_count(), 1);
        pos.set_halfmove_clock(2);
        assert_eq!(pos.repetition_count(), 3);
        assert!(pos.history().iter().all(|&x| x == h));
    }

    #[test]
    fn pop_position_removes_newest() {
        let mut pos = Position::starting();
        pos.set_turn(Color::Black);
        pos.record_position();
        let black_to_move = pos.hash();
        assert_eq!(pos.pop_position(), Some(black_to_move));
        assert_eq!(pos.history().len(), 1);
    }

    // =================================================================
    // Display
    // =================================================================

    #[test]
    fn board_string_starting() {
        let s = Position::starting().board_string();
        let lines: Vec<&str> = s.lines().collect();
        assert_eq!(lines.len(), 9);
        assert_eq!(lines[0], "8 r n b q k b n r");
        assert_eq!(lines[7], "1 R N B Q K B N R");
        assert_eq!(lines[8], "  a b c d e f g h");
    }
}
