//! Leaf counts against the published perft tables. A wrong count at any
//! depth points at move generation, execute/undo or the legality filter.
//!
//! Reference: <https://www.chessprogramming.org/Perft_Results>

use chess_core::engine::board::Position;
use chess_core::engine::perft::{count_leaf_nodes, divide};

/// (name, FEN, node counts for depth 1, 2, ...).
const CASES: &[(&str, &str, &[u64])] = &[
    (
        "start",
        "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1",
        &[20, 400, 8_902, 197_281],
    ),
    (
        "kiwipete",
        "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1",
        &[48, 2_039, 97_862],
    ),
    (
        "rook endgame",
        "8/2p5/3p4/KP5r/1R3p1k/8/4P1P1/8 w - - 0 1",
        &[14, 191, 2_812, 43_238],
    ),
    (
        "promotions",
        "r3k2r/Pppp1ppp/1b3nbN/nP6/BBP1P3/q4N2/Pp1P2PP/R2Q1RK1 w kq - 0 1",
        &[6, 264, 9_467],
    ),
    (
        "promotions mirrored",
        "r2q1rk1/pP1p2pp/Q4n2/bbp1p3/Np6/1B3NBn/pPPP1PPP/R3K2R b KQ - 0 1",
        &[6, 264, 9_467],
    ),
    (
        "discovered checks",
        "rnbq1k1r/pp1Pbppp/2p5/8/2B5/8/PPP1NnPP/RNBQK2R w KQ - 1 8",
        &[44, 1_486, 62_379],
    ),
    (
        "middlegame",
        "r4rk1/1pp1qppp/p1np1n2/2b1p1B1/2B1P1b1/P1NP1N2/1PP1QPPP/R4RK1 w - - 0 10",
        &[46, 2_079, 89_890],
    ),
];

/// Count leaf nodes and check the walk leaves the position as it found it.
fn perft(pos: &Position, depth: u32) -> u64 {
    let mut work = pos.clone();
    let nodes = count_leaf_nodes(&mut work, depth);
    assert_eq!(&work, pos, "perft walk left the position modified");
    assert_eq!(work.history(), pos.history());
    nodes
}

fn check_case(name: &str) {
    let (_, fen, expected) = CASES
        .iter()
        .find(|(case, _, _)| *case == name)
        .expect("unknown perft case");
    let pos = Position::from_fen(fen).unwrap();
    for (depth, &nodes) in (1..).zip(expected.iter()) {
        assert_eq!(perft(&pos, depth), nodes, "{name} at depth {depth}");
    }
}

#[test]
fn perft_start() {
    check_case("start");
}

#[test]
fn perft_kiwipete() {
    check_case("kiwipete");
}

#[test]
fn perft_rook_endgame() {
    check_case("rook endgame");
}

#[test]
fn perft_promotions() {
    check_case("promotions");
}

#[test]
fn perft_promotions_mirrored() {
    check_case("promotions mirrored");
}

#[test]
fn perft_discovered_checks() {
    check_case("discovered checks");
}

#[test]
fn perft_middlegame() {
    check_case("middlegame");
}

#[test]
fn divide_agrees_with_total() {
    for (name, fen, expected) in CASES {
        let mut pos = Position::from_fen(fen).unwrap();
        let split = divide(&mut pos, 2);
        assert_eq!(split.len() as u64, expected[0], "{name}");
        assert_eq!(split.iter().map(|(_, n)| n).sum::<u64>(), expected[1], "{name}");
    }
}
