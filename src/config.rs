use crate::engine::types::Difficulty;

/// Engine configuration parsed from environment variables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineConfig {
    /// Search depth in plies.
    pub search_depth: u32,
    /// Draw aversion in centipawns.
    pub contempt: i32,
    /// Player rating the engine adapts to. When set, it overrides depth and
    /// contempt.
    pub player_elo: Option<u32>,
    /// `tracing_subscriber` filter directive.
    pub log_filter: String,
}

impl EngineConfig {
    /// Load configuration from environment variables with defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a configuration from an arbitrary key lookup. Unparseable
    /// values fall back to their defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = EngineConfig::default();
        let mut config = EngineConfig {
            search_depth: lookup("CHESS_SEARCH_DEPTH")
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.search_depth),
            contempt: lookup("CHESS_CONTEMPT")
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.contempt),
            player_elo: lookup("CHESS_PLAYER_ELO").and_then(|v| v.parse().ok()),
            log_filter: lookup("CHESS_LOG").unwrap_or(defaults.log_filter),
        };
        if let Some(elo) = config.player_elo {
            let difficulty = Difficulty::from_elo(elo);
            config.search_depth = difficulty.depth();
            config.contempt = difficulty.contempt();
        }
        config
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            search_depth: 3,
            contempt: 0,
            player_elo: None,
            log_filter: "chess_core=info".to_string(),
        }
    }
}
