use serde::{Deserialize, Serialize};

use super::board::is_well_paired;
use super::state::{Difficulty, GameSession, Tile, TileStatus};
use super::store::KeyValueStore;

pub const SAVE_KEY: &str = "recall.last-run";
const SAVE_VERSION: u8 = 1;

/// Snapshot of a running session, enough to pick the game up again later.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SavedRun {
    pub version: u8,
    pub difficulty: Difficulty,
    pub player_name: String,
    pub tiles: Vec<Tile>,
    pub move_count: u32,
    pub match_count: usize,
    pub hint_budget: u32,
    pub score: u32,
    pub streak: u32,
    pub strike_count: u32,
    pub time_left_secs: u32,
}

impl SavedRun {
    /// Snapshots `session`.
    ///
    /// A pair still waiting on its reveal delay is turned back down on restore without scoring,
    /// so the move it cost is not kept either.
    pub fn capture(session: &GameSession) -> Self {
        let move_count = if session.is_resolving() {
            session.move_count.saturating_sub(1)
        } else {
            session.move_count
        };
        SavedRun {
            version: SAVE_VERSION,
            difficulty: session.difficulty,
            player_name: session.player_name.clone(),
            tiles: session.tiles.clone(),
            move_count,
            match_count: session.match_count,
            hint_budget: session.hint_budget,
            score: session.score,
            streak: session.streak,
            strike_count: session.strike_count,
            time_left_secs: session.time_left_secs,
        }
    }

    /// Rebuilds a live session. Unresolved face-up tiles go back down and cosmetic flags reset.
    pub fn into_session(self, game_id: u64) -> GameSession {
        let tiles = self
            .tiles
            .into_iter()
            .map(|mut tile| {
                if tile.status == TileStatus::Flipped {
                    tile.status = TileStatus::Hidden;
                }
                tile.hinted = false;
                tile.animate = false;
                tile
            })
            .collect();
        GameSession {
            game_id,
            difficulty: self.difficulty,
            player_name: self.player_name,
            tiles,
            pending_flips: Vec::with_capacity(2),
            move_count: self.move_count,
            match_count: self.match_count,
            hint_budget: self.hint_budget,
            score: self.score,
            streak: self.streak,
            strike_count: self.strike_count,
            time_left_secs: self.time_left_secs,
            is_over: false,
            outcome: None,
        }
    }

    fn is_consistent(&self) -> bool {
        let config = self.difficulty.config();
        let matched_tiles = self
            .tiles
            .iter()
            .filter(|tile| tile.status == TileStatus::Matched)
            .count();
        self.version == SAVE_VERSION
            && self.tiles.len() == config.tile_count()
            && is_well_paired(&self.tiles)
            && matched_tiles == self.match_count * 2
            && self.match_count < config.pair_count
            && self.time_left_secs > 0
            && self.time_left_secs <= config.time_limit_secs
    }
}

pub fn load_saved_run<S: KeyValueStore + ?Sized>(store: &S) -> Option<SavedRun> {
    let raw = match store.get(SAVE_KEY) {
        Ok(raw) => raw?,
        Err(err) => {
            tracing::warn!(%err, "could not read saved run");
            return None;
        }
    };
    let run: SavedRun = match serde_json::from_str(&raw) {
        Ok(run) => run,
        Err(err) => {
            tracing::warn!(%err, "ignoring corrupt saved run");
            return None;
        }
    };
    if !run.is_consistent() {
        tracing::warn!("ignoring inconsistent saved run");
        return None;
    }
    Some(run)
}

pub fn has_saved_run<S: KeyValueStore + ?Sized>(store: &S) -> bool {
    load_saved_run(store).is_some()
}

pub fn save_current_run<S: KeyValueStore + ?Sized>(store: &mut S, session: &GameSession) {
    if session.is_over || session.tiles.is_empty() {
        return;
    }
    let raw = match serde_json::to_string(&SavedRun::capture(session)) {
        Ok(raw) => raw,
        Err(err) => {
            tracing::warn!(%err, "could not encode saved run");
            return;
        }
    };
    if let Err(err) = store.set(SAVE_KEY, &raw) {
        tracing::warn!(%err, "could not write saved run");
    }
}

pub fn clear_saved_run<S: KeyValueStore + ?Sized>(store: &mut S) {
    if let Err(err) = store.remove(SAVE_KEY) {
        tracing::warn!(%err, "could not remove saved run");
    }
}
