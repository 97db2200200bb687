use std::time::Instant;

use anyhow::{Context, bail};
use clap::{Parser, Subcommand};

use chess_core::ai::{analyze, best_move_async};
use chess_core::config::EngineConfig;
use chess_core::engine::fen::STARTING_FEN;
use chess_core::engine::perft::{count_leaf_nodes, divide};
use chess_core::engine::{Difficulty, Game, Position};

#[derive(Parser)]
#[command(name = "chess-core", version, about = "Chess rules engine and search core")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Count leaf nodes of the legal move tree.
    Perft {
        #[arg(short, long)]
        depth: u32,
        #[arg(long, default_value = STARTING_FEN)]
        fen: String,
        /// Print the count below each root move.
        #[arg(long)]
        divide: bool,
    },
    /// Search a position and print the best move.
    BestMove {
        #[arg(long, default_value = STARTING_FEN)]
        fen: String,
        /// Defaults to CHESS_SEARCH_DEPTH.
        #[arg(short, long)]
        depth: Option<u32>,
        /// Defaults to CHESS_CONTEMPT.
        #[arg(long, allow_hyphen_values = true)]
        contempt: Option<i32>,
        /// harmless, easy, medium or hard; sets depth and contempt.
        #[arg(long, conflicts_with_all = ["depth", "contempt"])]
        difficulty: Option<String>,
    },
    /// Play a sequence of moves (SAN or coordinate) and report the result.
    Play {
        moves: Vec<String>,
        #[arg(long, default_value = STARTING_FEN)]
        fen: String,
        /// Print the move records as JSON.
        #[arg(long)]
        json: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = EngineConfig::from_env();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| config.log_filter.as_str().into()),
        )
        .init();

    let cli = Cli::parse();
    match cli.command {
        Command::Perft { depth, fen, divide: split } => run_perft(&fen, depth, split)?,
        Command::BestMove {
            fen,
            depth,
            contempt,
            difficulty,
        } => {
            let (depth, contempt) = match difficulty {
                Some(name) => {
                    let level: Difficulty = name.parse()?;
                    (level.depth(), level.contempt())
                }
                None => (
                    depth.unwrap_or(config.search_depth),
                    contempt.unwrap_or(config.contempt),
                ),
            };
            run_best_move(&fen, depth, contempt).await?;
        }
        Command::Play { moves, fen, json } => run_play(&fen, &moves, json)?,
    }
    Ok(())
}

fn run_perft(fen: &str, depth: u32, split: bool) -> anyhow::Result<()> {
    let mut pos = Position::from_fen(fen).context("bad --fen")?;
    let started = Instant::now();
    let nodes = if split {
        let mut total = 0;
        for (mv, count) in divide(&mut pos, depth) {
            println!("{mv}: {count}");
            total += count;
        }
        println!();
        total
    } else {
        count_leaf_nodes(&mut pos, depth)
    };
    let elapsed = started.elapsed();
    tracing::info!(depth, nodes, ?elapsed, "perft finished");
    println!("nodes: {nodes}");
    Ok(())
}

async fn run_best_move(fen: &str, depth: u32, contempt: i32) -> anyhow::Result<()> {
    let pos = Position::from_fen(fen).context("bad --fen")?;
    let started = Instant::now();
    let Some(result) = best_move_async(pos, depth, contempt).await? else {
        bail!("no legal moves in this position");
    };
    tracing::info!(depth, contempt, nodes = result.nodes, elapsed = ?started.elapsed(), "search finished");
    println!("bestmove {} score {} nodes {}", result.mv, result.score, result.nodes);
    Ok(())
}

fn run_play(fen: &str, moves: &[String], json: bool) -> anyhow::Result<()> {
    let mut game = Game::from_fen(fen)?;
    for text in moves {
        game.make_san_move(text)
            .with_context(|| format!("move {text:?} rejected"))?;
    }

    if json {
        println!("{}", serde_json::to_string_pretty(game.records())?);
    } else {
        let line: Vec<&str> = game.records().iter().map(|r| r.notation.as_str()).collect();
        println!("{}", line.join(" "));
    }
    println!("fen: {}", game.to_fen());
    println!("state: {}", game.status());
    print!("{}", analyze(game.records()).summary());
    Ok(())
}
