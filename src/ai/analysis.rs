//! Post-game analysis from the evaluations stored in move records.
//!
//! Each move is judged by how far it moved the score against the player
//! who made it. The game starts level (0).

use std::fmt::{self, Write as _};

use serde::{Deserialize, Serialize};

use crate::engine::game::MoveRecord;
use crate::engine::types::Color;

/// Centipawn loss at which a move is a blunder.
pub const BLUNDER_THRESHOLD: i32 = 300;
/// Centipawn loss at which a move is a mistake.
pub const MISTAKE_THRESHOLD: i32 = 100;
/// Centipawn loss at which a move is an inaccuracy.
pub const INACCURACY_THRESHOLD: i32 = 50;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Blunder,
    Mistake,
    Inaccuracy,
}

impl Severity {
    /// Classify a score drop; `None` when it is below every threshold.
    pub fn classify(score_drop: i32) -> Option<Severity> {
        match score_drop {
            d if d >= BLUNDER_THRESHOLD => Some(Severity::Blunder),
            d if d >= MISTAKE_THRESHOLD => Some(Severity::Mistake),
            d if d >= INACCURACY_THRESHOLD => Some(Severity::Inaccuracy),
            _ => None,
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Severity::Blunder => "Blunder",
            Severity::Mistake => "Mistake",
            Severity::Inaccuracy => "Inaccuracy",
        })
    }
}

/// One flagged move.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisComment {
    /// Index into the move records (0 = White's first move).
    pub move_index: usize,
    pub notation: String,
    pub severity: Severity,
    pub message: String,
    pub score_drop: i32,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameReport {
    pub blunders: u32,
    pub mistakes: u32,
    pub inaccuracies: u32,
    pub comments: Vec<AnalysisComment>,
}

impl GameReport {
    /// Plain-text report: counts, then one line per flagged move.
    pub fn summary(&self) -> String {
        let mut out = String::new();
        // Writing to a String cannot fail.
        let _ = writeln!(out, "--- GAME ANALYSIS REPORT ---");
        let _ = writeln!(out, "Blunders: {}", self.blunders);
        let _ = writeln!(out, "Mistakes: {}", self.mistakes);
        let _ = writeln!(out, "Inaccuracies: {}", self.inaccuracies);
        let _ = writeln!(out, "----------------------------");
        if self.comments.is_empty() {
            let _ = writeln!(out, "No errors found.");
        }
        for comment in &self.comments {
            let _ = writeln!(out, "{}", comment.message);
        }
        out
    }
}

/// Walk the records and flag every move whose score drop reaches a
/// threshold. Even indices are White's moves.
pub fn analyze(records: &[MoveRecord]) -> GameReport {
    let mut report = GameReport::default();
    let mut previous = 0;

    for (index, record) in records.iter().enumerate() {
        let mover = if index % 2 == 0 {
            Color::White
        } else {
            Color::Black
        };
        let current = record.eval;
        let score_drop = match mover {
            Color::White => previous - current,
            Color::Black => current - previous,
        };
        previous = current;

        let Some(severity) = Severity::classify(score_drop) else {
            continue;
        };
        match severity {
            Severity::Blunder => report.blunders += 1,
            Severity::Mistake => report.mistakes += 1,
            Severity::Inaccuracy => report.inaccuracies += 1,
        }
        let mover_name = match mover {
            Color::White => "White",
            Color::Black => "Black",
        };
        report.comments.push(AnalysisComment {
            move_index: index,
            notation: record.notation.clone(),
            severity,
            message: format!(
                "{severity} - move {} ({mover_name}): {} lost {score_drop} centipawns",
                index / 2 + 1,
                record.notation
            ),
            score_drop,
        });
    }

    report
}
