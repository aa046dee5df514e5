//! Tunable gameplay constants.
//!
//! Every field has a default, so a rules file only needs to name what it overrides:
//!
//! ```json
//! { "reveal_delay_ms": 600, "hint_budget": 5 }
//! ```

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use super::error::ConfigError;

pub const REVEAL_DELAY_MS: u64 = 800;
pub const HINT_DURATION_MS: u64 = 2000;
pub const MATCH_BUMP_MS: u64 = 600;
pub const TICK_MS: u64 = 1000;
pub const HINT_BUDGET: u32 = 3;
pub const STRIKE_LIMIT: u32 = 3;
pub const STRIKE_PENALTY: u32 = 100;
pub const MATCH_BASE_POINTS: u32 = 100;
pub const STREAK_BONUS: u32 = 25;
pub const LEADERBOARD_LIMIT: usize = 10;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameRules {
    pub reveal_delay_ms: u64,
    pub hint_duration_ms: u64,
    pub match_bump_ms: u64,
    pub hint_budget: u32,
    pub strike_limit: u32,
    pub strike_penalty: u32,
    pub match_base_points: u32,
    pub streak_bonus: u32,
    pub leaderboard_limit: usize,
}

impl Default for GameRules {
    fn default() -> Self {
        GameRules {
            reveal_delay_ms: REVEAL_DELAY_MS,
            hint_duration_ms: HINT_DURATION_MS,
            match_bump_ms: MATCH_BUMP_MS,
            hint_budget: HINT_BUDGET,
            strike_limit: STRIKE_LIMIT,
            strike_penalty: STRIKE_PENALTY,
            match_base_points: MATCH_BASE_POINTS,
            streak_bonus: STREAK_BONUS,
            leaderboard_limit: LEADERBOARD_LIMIT,
        }
    }
}

impl GameRules {
    /// Reads rules from a JSON file. A missing file yields the defaults.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = match fs::read_to_string(path) {
            Ok(raw) => raw,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "no rules file, using defaults");
                return Ok(GameRules::default());
            }
            Err(err) => return Err(ConfigError::Read(err)),
        };
        let rules = Self::from_json(&raw)?;
        tracing::info!(path = %path.display(), "loaded game rules");
        Ok(rules)
    }

    pub fn from_json(raw: &str) -> Result<Self, ConfigError> {
        let rules: GameRules = serde_json::from_str(raw)?;
        rules.validate()?;
        Ok(rules)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.strike_limit == 0 {
            return Err(ConfigError::Invalid("strike_limit must be at least 1"));
        }
        if self.leaderboard_limit == 0 {
            return Err(ConfigError::Invalid("leaderboard_limit must be at least 1"));
        }
        if self.reveal_delay_ms == 0 {
            return Err(ConfigError::Invalid("reveal_delay_ms must be positive"));
        }
        Ok(())
    }

    pub fn match_points(&self, streak: u32) -> u32 {
        self.match_base_points
            .saturating_add(self.streak_bonus.saturating_mul(streak))
    }
}
