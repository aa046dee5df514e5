use serde::{Deserialize, Serialize};

use super::rules::GameRules;

pub type TileId = usize;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum TileStatus {
    Hidden,
    Flipped,
    Matched,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tile {
    pub id: TileId,
    pub value: String,
    pub status: TileStatus,
    #[serde(default)]
    pub hinted: bool,
    #[serde(default)]
    pub animate: bool,
}

impl Tile {
    pub fn new(id: TileId, value: impl Into<String>) -> Self {
        Tile {
            id,
            value: value.into(),
            status: TileStatus::Hidden,
            hinted: false,
            animate: false,
        }
    }

    pub fn is_hidden(&self) -> bool {
        self.status == TileStatus::Hidden
    }
}

/// Fixed board layout bound to a difficulty tier.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GameConfig {
    pub pair_count: usize,
    pub columns: usize,
    pub label: &'static str,
    pub time_limit_secs: u32,
}

impl GameConfig {
    pub fn tile_count(&self) -> usize {
        self.pair_count * 2
    }

    pub fn rows(&self) -> usize {
        self.tile_count().div_ceil(self.columns.max(1))
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    #[default]
    Easy,
    Medium,
    Hard,
}

impl Difficulty {
    pub const ALL: [Difficulty; 3] = [Difficulty::Easy, Difficulty::Medium, Difficulty::Hard];

    pub fn config(self) -> GameConfig {
        match self {
            Difficulty::Easy => GameConfig {
                pair_count: 4,
                columns: 4,
                label: "Easy",
                time_limit_secs: 60,
            },
            Difficulty::Medium => GameConfig {
                pair_count: 6,
                columns: 4,
                label: "Normal",
                time_limit_secs: 90,
            },
            Difficulty::Hard => GameConfig {
                pair_count: 8,
                columns: 4,
                label: "Hard",
                time_limit_secs: 120,
            },
        }
    }

    pub fn name(self) -> &'static str {
        self.config().label
    }

    pub fn code(self) -> &'static str {
        match self {
            Difficulty::Easy => "easy",
            Difficulty::Medium => "medium",
            Difficulty::Hard => "hard",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        match code.trim().to_ascii_lowercase().as_str() {
            "easy" => Some(Difficulty::Easy),
            "medium" | "normal" => Some(Difficulty::Medium),
            "hard" => Some(Difficulty::Hard),
            _ => None,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Outcome {
    Won,
    TimeUp,
}

/// Everything that belongs to one board, from deal to game over.
#[derive(Clone, Debug)]
pub struct GameSession {
    pub game_id: u64,
    pub difficulty: Difficulty,
    pub player_name: String,
    pub tiles: Vec<Tile>,
    pub pending_flips: Vec<TileId>,
    pub move_count: u32,
    pub match_count: usize,
    pub hint_budget: u32,
    pub score: u32,
    pub streak: u32,
    pub strike_count: u32,
    pub time_left_secs: u32,
    pub is_over: bool,
    pub outcome: Option<Outcome>,
}

impl GameSession {
    pub fn new(
        game_id: u64,
        difficulty: Difficulty,
        player_name: impl Into<String>,
        tiles: Vec<Tile>,
        rules: &GameRules,
    ) -> Self {
        GameSession {
            game_id,
            difficulty,
            player_name: player_name.into(),
            tiles,
            pending_flips: Vec::with_capacity(2),
            move_count: 0,
            match_count: 0,
            hint_budget: rules.hint_budget,
            score: 0,
            streak: 0,
            strike_count: 0,
            time_left_secs: difficulty.config().time_limit_secs,
            is_over: false,
            outcome: None,
        }
    }

    pub fn config(&self) -> GameConfig {
        self.difficulty.config()
    }

    pub fn pair_count(&self) -> usize {
        self.tiles.len() / 2
    }

    pub fn tile(&self, id: TileId) -> Option<&Tile> {
        self.tiles.get(id)
    }

    pub fn is_resolving(&self) -> bool {
        self.pending_flips.len() >= 2
    }

    pub fn all_matched(&self) -> bool {
        self.match_count >= self.pair_count()
    }

    pub fn elapsed_secs(&self) -> u32 {
        self.config()
            .time_limit_secs
            .saturating_sub(self.time_left_secs)
    }

    pub fn hinted_tiles(&self) -> Vec<TileId> {
        self.tiles
            .iter()
            .filter(|tile| tile.hinted)
            .map(|tile| tile.id)
            .collect()
    }

    pub fn clear_hints(&mut self) -> bool {
        let mut cleared = false;
        for tile in &mut self.tiles {
            cleared |= tile.hinted;
            tile.hinted = false;
        }
        cleared
    }
}

pub fn format_mm_ss(total_secs: u32) -> String {
    let mins = total_secs / 60;
    let secs = total_secs % 60;
    format!("{:02}:{:02}", mins, secs)
}
