//! Whole-game rule checks driven through the public API.

use chess_core::ai::evaluation::evaluate;
use chess_core::ai::{best_move, best_move_async};
use chess_core::engine::arbiter::{all_legal_moves, game_state};
use chess_core::engine::{DrawReason, Game, GameState, MoveCommand, Position};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

const KIWIPETE: &str = "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1";

// =========================================================================
// Execute / undo
// =========================================================================

#[test]
fn random_walk_undoes_cleanly() {
    let mut rng = StdRng::seed_from_u64(0x5EED);

    for start in [Position::starting(), Position::from_fen(KIWIPETE).unwrap()] {
        let mut pos = start.clone();
        let mut trail = Vec::new();
        let mut snapshots = vec![pos.clone()];

        for _ in 0..80 {
            let moves = all_legal_moves(&mut pos);
            let Some(&mv) = moves.choose(&mut rng) else {
                break;
            };
            let cmd = MoveCommand::execute(&mut pos, mv).unwrap();
            assert_eq!(pos.hash(), pos.compute_hash(), "stale hash after {mv}");
            trail.push(cmd);
            snapshots.push(pos.clone());
        }

        snapshots.pop();
        while let Some(cmd) = trail.pop() {
            cmd.undo(&mut pos);
            let expected = snapshots.pop().unwrap();
            assert_eq!(pos, expected);
            assert_eq!(pos.history(), expected.history());
        }
        assert_eq!(pos, start);
    }
}

#[test]
fn fen_survives_move_and_undo() {
    let mut pos = Position::from_fen(KIWIPETE).unwrap();
    for mv in all_legal_moves(&mut pos.clone()) {
        let cmd = MoveCommand::execute(&mut pos, mv).unwrap();
        cmd.undo(&mut pos);
        assert_eq!(pos.to_fen(), KIWIPETE, "undo of {mv} changed the position");
    }
}

// =========================================================================
// Game outcomes
// =========================================================================

#[test]
fn fools_mate() {
    let mut game = Game::new();
    for san in ["f3", "e5", "g4", "Qh4"] {
        game.make_san_move(san).unwrap();
    }
    assert_eq!(game.status(), GameState::Checkmate);
    assert_eq!(game.records().last().unwrap().notation, "Qh4#");
    assert!(game.make_san_move("e4").is_err());
}

#[test]
fn stalemate_position() {
    let mut pos = Position::from_fen("7k/5Q2/6K1/8/8/8/8/8 b - - 0 1").unwrap();
    assert_eq!(game_state(&mut pos), GameState::Stalemate);
}

#[test]
fn knight_shuffle_repeats() {
    let mut game = Game::new();
    for san in ["Nf3", "Nf6", "Ng1", "Ng8", "Nf3", "Nf6", "Ng1"] {
        game.make_san_move(san).unwrap();
        assert_eq!(game.status(), GameState::InProgress);
    }
    game.make_san_move("Ng8").unwrap();
    assert_eq!(
        game.status(),
        GameState::Draw(DrawReason::ThreefoldRepetition)
    );
}

#[test]
fn fifty_move_rule_from_fen() {
    let mut pos = Position::from_fen("4k3/8/8/8/8/8/8/4K2R w - - 100 80").unwrap();
    assert_eq!(
        game_state(&mut pos),
        GameState::Draw(DrawReason::FiftyMoveRule)
    );

    let mut pos = Position::from_fen("4k3/8/8/8/8/8/8/4K2R w - - 99 80").unwrap();
    assert_eq!(game_state(&mut pos), GameState::InProgress);
}

// =========================================================================
// Search
// =========================================================================

#[test]
fn depth_one_matches_brute_force() {
    for fen in [
        "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1",
        KIWIPETE,
        "r1bqkbnr/pppp1ppp/2n5/4p3/3PP3/5N2/PPP2PPP/RNBQKB1R b KQkq - 0 3",
    ] {
        let mut pos = Position::from_fen(fen).unwrap();
        let white = pos.side_to_move() == chess_core::engine::Color::White;

        let mut scores = Vec::new();
        for mv in all_legal_moves(&mut pos.clone()) {
            let cmd = MoveCommand::execute(&mut pos, mv).unwrap();
            scores.push(evaluate(&pos));
            cmd.undo(&mut pos);
        }
        let expected = if white {
            scores.iter().max()
        } else {
            scores.iter().min()
        };

        let result = best_move(&pos, 1, 0).unwrap();
        assert_eq!(Some(&result.score), expected, "{fen}");
    }
}

#[tokio::test]
async fn async_search_matches_sync() {
    let pos = Position::from_fen(KIWIPETE).unwrap();
    let sync = best_move(&pos, 2, 0);
    let async_result = best_move_async(pos, 2, 0).await.unwrap();
    assert_eq!(sync, async_result);
}
