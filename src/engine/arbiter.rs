//! Legality filtering and game-state classification.
//!
//! Each pseudo-legal destination is tried on the position itself: the
//! moving piece is placed, the king square is tested for attack, and the
//! grid is put back. The position is therefore borrowed mutably, but it is
//! bit-for-bit unchanged when any function here returns.

use crate::engine::attacks::is_square_attacked;
use crate::engine::board::Position;
use crate::engine::movegen::{is_promotion, pseudo_legal_destinations};
use crate::engine::types::{Color, DrawReason, GameState, Move, Piece, PieceType, Square};

/// Half-moves without a pawn move or capture that end the game.
pub const FIFTY_MOVE_LIMIT: u16 = 100;

// =========================================================================
// Legal moves
// =========================================================================

/// Legal destinations for the piece on `from` (empty if there is none).
pub fn legal_moves(pos: &mut Position, from: Square) -> Vec<Square> {
    let Some(piece) = pos.piece_at(from) else {
        return Vec::new();
    };
    let mut destinations = pseudo_legal_destinations(pos, from);
    destinations.retain(|&to| keeps_king_safe(pos, piece, from, to));
    destinations
}

/// Every legal move for the side to move. Promotions appear once per
/// promotion piece.
pub fn all_legal_moves(pos: &mut Position) -> Vec<Move> {
    let mut moves = Vec::with_capacity(64);
    for from in own_squares(pos) {
        let Some(piece) = pos.piece_at(from) else {
            continue;
        };
        for to in legal_moves(pos, from) {
            if is_promotion(piece, to) {
                moves.extend(
                    PieceType::PROMOTIONS
                        .iter()
                        .map(|&promo| Move::with_promotion(from, to, promo)),
                );
            } else {
                moves.push(Move::new(from, to));
            }
        }
    }
    moves
}

/// Whether `from → to` is a legal pawn move that still needs a promotion
/// piece before it can be committed.
pub fn is_pending_promotion(pos: &mut Position, from: Square, to: Square) -> bool {
    match pos.piece_at(from) {
        Some(piece) if is_promotion(piece, to) => legal_moves(pos, from).contains(&to),
        _ => false,
    }
}

/// Try the move on the grid, test the mover's king, and restore the grid.
///
/// En passant also lifts the captured pawn for the test, so a capture that
/// opens a rank onto the king is rejected.
fn keeps_king_safe(pos: &mut Position, piece: Piece, from: Square, to: Square) -> bool {
    let captured = pos.piece_at(to);
    let ep_victim = if piece.kind == PieceType::Pawn && captured.is_none() && from.file() != to.file()
    {
        to.offset(0, -piece.color.forward())
    } else {
        None
    };
    let ep_piece = ep_victim.and_then(|sq| pos.piece_at(sq));

    pos.place(to, Some(piece));
    pos.place(from, None);
    if let Some(sq) = ep_victim {
        pos.place(sq, None);
    }

    let safe = pos
        .king_square(piece.color)
        .is_none_or(|king| !is_square_attacked(pos, king, !piece.color));

    if let Some(sq) = ep_victim {
        pos.place(sq, ep_piece);
    }
    pos.place(from, Some(piece));
    pos.place(to, captured);
    safe
}

fn own_squares(pos: &Position) -> Vec<Square> {
    pos.pieces(pos.side_to_move()).map(|(sq, _)| sq).collect()
}

// =========================================================================
// Check & game state
// =========================================================================

/// Is `color`'s king attacked? False when that king is not on the board.
pub fn is_in_check(pos: &Position, color: Color) -> bool {
    pos.king_square(color)
        .is_some_and(|king| is_square_attacked(pos, king, !color))
}

pub fn is_draw_by_fifty_move_rule(pos: &Position) -> bool {
    pos.halfmove_clock() >= FIFTY_MOVE_LIMIT
}

/// The current position has occurred three times since the last pawn move
/// or capture.
pub fn is_threefold_repetition(pos: &Position) -> bool {
    pos.repetition_count() >= 3
}

/// Whether the side to move has at least one legal move. Stops at the
/// first one found.
pub fn has_legal_move(pos: &mut Position) -> bool {
    own_squares(pos)
        .into_iter()
        .any(|from| !legal_moves(pos, from).is_empty())
}

/// Classify the position. Draw rules take precedence over mate and
/// stalemate.
pub fn game_state(pos: &mut Position) -> GameState {
    if is_draw_by_fifty_move_rule(pos) {
        return GameState::Draw(DrawReason::FiftyMoveRule);
    }
    if is_threefold_repetition(pos) {
        return GameState::Draw(DrawReason::ThreefoldRepetition);
    }
    if has_legal_move(pos) {
        return GameState::InProgress;
    }
    if is_in_check(pos, pos.side_to_move()) {
        GameState::Checkmate
    } else {
        GameState::Stalemate
    }
}

// =========================================================================
// Tests
// =========================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn sq(name: &str) -> Square {
        Square::from_algebraic(name).unwrap()
    }

    fn pos(fen: &str) -> Position {
        Position::from_fen(fen).unwrap()
    }

    fn count_legal(fen: &str) -> usize {
        all_legal_moves(&mut pos(fen)).len()
    }

    // -------------------------------------------------------------------
    // Move counts of well-known positions
    // -------------------------------------------------------------------

    #[test]
    fn starting_position_has_20_moves() {
        assert_eq!(count_legal(crate::engine::fen::STARTING_FEN), 20);
    }

    #[test]
    fn kiwipete_48_moves() {
        assert_eq!(
            count_legal("r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1"),
            48
        );
    }

    #[test]
    fn position_3_14_moves() {
        assert_eq!(count_legal("8/2p5/3p4/KP5r/1R3p1k/8/4P1P1/8 w - - 0 1"), 14);
    }

    #[test]
    fn position_4_6_moves() {
        assert_eq!(
            count_legal("r3k2r/Pppp1ppp/1b3nbN/nP6/BBP1P3/q4N2/Pp1P2PP/R2Q1RK1 w kq - 0 1"),
            6
        );
    }

    #[test]
    fn position_5_44_moves() {
        assert_eq!(
            count_legal("rnbq1k1r/pp1Pbppp/2p5/8/2B5/8/PPP1NnPP/RNBQK2R w KQ - 1 8"),
            44
        );
    }

    // -------------------------------------------------------------------
    // Filtering
    // -------------------------------------------------------------------

    #[test]
    fn pinned_piece_cannot_leave_the_line() {
        // Bishop e2 is pinned by the rook on e8.
        let mut p = pos("4r1k1/8/8/8/8/8/4B3/4K3 w - - 0 1");
        assert!(legal_moves(&mut p, sq("e2")).is_empty());
    }

    #[test]
    fn king_cannot_step_into_attack() {
        let mut p = pos("4k3/8/8/8/8/8/r7/4K3 w - - 0 1");
        let mut d = legal_moves(&mut p, sq("e1"));
        d.sort();
        assert_eq!(d, vec![sq("d1"), sq("f1")]);
    }

    #[test]
    fn horizontally_pinned_en_passant_rejected() {
        // Taking d6 e.p. would open the fifth rank to the rook on h5.
        let mut p = pos("8/8/8/K2pP2r/8/8/8/7k w - d6 0 1");
        assert_eq!(legal_moves(&mut p, sq("e5")), vec![sq("e6")]);
    }

    #[test]
    fn legality_probe_leaves_position_untouched() {
        let mut p = pos("r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1");
        let before = p.clone();
        let _ = all_legal_moves(&mut p);
        let _ = game_state(&mut p);
        assert_eq!(p, before);
    }

    #[test]
    fn promotions_expand_to_four_moves() {
        let mut p = pos("7k/4P3/8/8/8/8/8/4K3 w - - 0 1");
        let promos: Vec<Move> = all_legal_moves(&mut p)
            .into_iter()
            .filter(|m| m.from == sq("e7"))
            .collect();
        assert_eq!(promos.len(), 4);
        assert!(promos.iter().all(|m| m.promotion.is_some()));
    }

    #[test]
    fn pending_promotion_detection() {
        let mut p = pos("3r3k/4P3/8/8/8/8/8/4K3 w - - 0 1");
        assert!(is_pending_promotion(&mut p, sq("e7"), sq("e8")));
        assert!(is_pending_promotion(&mut p, sq("e7"), sq("d8")));
        // Not a legal destination.
        assert!(!is_pending_promotion(&mut p, sq("e7"), sq("f8")));
        // Not a pawn.
        assert!(!is_pending_promotion(&mut p, sq("e1"), sq("e2")));
    }

    #[test]
    fn empty_square_has_no_legal_moves() {
        let mut p = Position::starting();
        assert!(legal_moves(&mut p, sq("e4")).is_empty());
    }

    // -------------------------------------------------------------------
    // Check & state
    // -------------------------------------------------------------------

    #[test]
    fn fools_mate_is_checkmate() {
        let mut p = pos("rnb1kbnr/pppp1ppp/8/4p3/6Pq/5P2/PPPPP2P/RNBQKBNR w KQkq - 1 3");
        assert!(is_in_check(&p, Color::White));
        assert!(!is_in_check(&p, Color::Black));
        assert_eq!(game_state(&mut p), GameState::Checkmate);
    }

    #[test]
    fn stalemate_is_not_checkmate() {
        let mut p = pos("k7/2K5/1Q6/8/8/8/8/8 b - - 0 1");
        assert!(!is_in_check(&p, Color::Black));
        assert_eq!(game_state(&mut p), GameState::Stalemate);
    }

    #[test]
    fn fifty_move_rule_beats_everything() {
        let mut p = pos("4k3/8/8/8/8/8/8/4K2Q w - - 100 80");
        assert!(is_draw_by_fifty_move_rule(&p));
        assert_eq!(game_state(&mut p), GameState::Draw(DrawReason::FiftyMoveRule));

        let mut p = pos("4k3/8/8/8/8/8/8/4K2Q w - - 99 80");
        assert_eq!(game_state(&mut p), GameState::InProgress);
    }

    #[test]
    fn fifty_move_rule_takes_precedence_over_mate() {
        let mut p = pos("rnb1kbnr/pppp1ppp/8/4p3/6Pq/5P2/PPPPP2P/RNBQKBNR w KQkq - 100 3");
        assert_eq!(game_state(&mut p), GameState::Draw(DrawReason::FiftyMoveRule));
    }

    #[test]
    fn no_king_means_no_check() {
        let mut p = Position::new();
        p.place(sq("e4"), Piece::from_char('q'));
        assert!(!is_in_check(&p, Color::White));
    }

    #[test]
    fn starting_position_in_progress() {
        let mut p = Position::starting();
        assert!(has_legal_move(&mut p));
        assert_eq!(game_state(&mut p), GameState::InProgress);
    }
}
