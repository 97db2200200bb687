//! Perft (PERFormance Test): exhaustive leaf counting for move-generation
//! verification against published node counts.
//!
//! Reference: <https://www.chessprogramming.org/Perft_Results>

use crate::engine::arbiter::all_legal_moves;
use crate::engine::board::Position;
use crate::engine::command::MoveCommand;
use crate::engine::types::Move;

/// Count leaf nodes `depth` plies below `pos`. Promotions count once per
/// promotion piece. The position is unchanged on return.
pub fn count_leaf_nodes(pos: &mut Position, depth: u32) -> u64 {
    if depth == 0 {
        return 1;
    }
    let moves = all_legal_moves(pos);
    if depth == 1 {
        return moves.len() as u64;
    }
    let mut nodes = 0u64;
    for mv in moves {
        // Generated moves always have a piece on their origin square.
        let Ok(cmd) = MoveCommand::execute(pos, mv) else {
            continue;
        };
        nodes += count_leaf_nodes(pos, depth - 1);
        cmd.undo(pos);
    }
    nodes
}

/// Per-root-move leaf counts, in generation order. Comparing this against
/// a reference engine narrows a perft mismatch down to one move.
pub fn divide(pos: &mut Position, depth: u32) -> Vec<(Move, u64)> {
    if depth == 0 {
        return Vec::new();
    }
    let mut out = Vec::new();
    for mv in all_legal_moves(pos) {
        let Ok(cmd) = MoveCommand::execute(pos, mv) else {
            continue;
        };
        out.push((mv, count_leaf_nodes(pos, depth - 1)));
        cmd.undo(pos);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn depth_zero_is_one_node() {
        assert_eq!(count_leaf_nodes(&mut Position::starting(), 0), 1);
    }

    #[test]
    fn start_depth_2() {
        let mut pos = Position::starting();
        let before = pos.clone();
        assert_eq!(count_leaf_nodes(&mut pos, 2), 400);
        assert_eq!(pos, before);
    }

    #[test]
    fn divide_sums_to_total() {
        let mut pos = Position::starting();
        let split = divide(&mut pos, 3);
        assert_eq!(split.len(), 20);
        assert_eq!(split.iter().map(|(_, n)| n).sum::<u64>(), 8_902);
        assert!(split.iter().all(|(_, n)| *n > 0));
    }

    #[test]
    fn divide_depth_zero_is_empty() {
        assert!(divide(&mut Position::starting(), 0).is_empty());
    }
}
