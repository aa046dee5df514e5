//! Ranked leaderboard and the all-time high score.
//!
//! Both live in a [`KeyValueStore`] as JSON. Reads never fail: a missing or unreadable value is
//! an empty leaderboard (or a zero high score). Failed writes are logged and dropped; the game
//! carries on and the leaderboard simply does not show the entry.

use chrono::{Local, Utc};
use serde::{Deserialize, Serialize};

use super::rules::LEADERBOARD_LIMIT;
use super::state::Difficulty;
use super::store::KeyValueStore;

pub const LEADERBOARD_KEY: &str = "recall.leaderboard";
pub const HIGH_SCORE_KEY: &str = "recall.high-score";

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreEntry {
    pub id: u64,
    pub name: String,
    pub moves: u32,
    pub elapsed_seconds: u32,
    pub date: String,
    pub difficulty: Difficulty,
}

impl ScoreEntry {
    pub fn new(
        name: impl Into<String>,
        moves: u32,
        elapsed_seconds: u32,
        difficulty: Difficulty,
    ) -> Self {
        ScoreEntry {
            id: Utc::now().timestamp_millis().max(0) as u64,
            name: name.into(),
            moves,
            elapsed_seconds,
            date: now_date_label(),
            difficulty,
        }
    }

    fn rank_key(&self) -> (u32, u32) {
        (self.moves, self.elapsed_seconds)
    }
}

fn now_date_label() -> String {
    Local::now().format("%Y-%m-%d %H:%M").to_string()
}

fn sort_entries(entries: &mut [ScoreEntry]) {
    entries.sort_by_key(ScoreEntry::rank_key);
}

pub struct LeaderboardStore<S> {
    store: S,
    limit: usize,
}

impl<S: KeyValueStore> LeaderboardStore<S> {
    pub fn new(store: S) -> Self {
        Self::with_limit(store, LEADERBOARD_LIMIT)
    }

    pub fn with_limit(store: S, limit: usize) -> Self {
        LeaderboardStore {
            store,
            limit: limit.max(1),
        }
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    pub fn into_inner(self) -> S {
        self.store
    }

    /// Persisted entries in rank order; empty when nothing usable is stored.
    pub fn load(&self) -> Vec<ScoreEntry> {
        let raw = match self.store.get(LEADERBOARD_KEY) {
            Ok(Some(raw)) => raw,
            Ok(None) => return Vec::new(),
            Err(err) => {
                tracing::warn!(%err, "could not read leaderboard");
                return Vec::new();
            }
        };
        match serde_json::from_str::<Vec<ScoreEntry>>(&raw) {
            Ok(entries) => entries,
            Err(err) => {
                tracing::warn!(%err, "ignoring corrupt leaderboard");
                Vec::new()
            }
        }
    }

    /// Adds an entry, re-ranks by moves then time, keeps the top `limit` and persists.
    ///
    /// Returns the entry's zero-based rank, or `None` when it did not make the cut.
    pub fn record(&mut self, entry: ScoreEntry) -> Option<usize> {
        let mut entries = self.load();
        sort_entries(&mut entries);
        // Ties go after existing entries, same as appending and stable-sorting.
        let rank = entries.partition_point(|existing| existing.rank_key() <= entry.rank_key());
        tracing::info!(
            name = %entry.name,
            moves = entry.moves,
            elapsed = entry.elapsed_seconds,
            rank,
            "recording score"
        );
        entries.insert(rank, entry);
        entries.truncate(self.limit);
        self.persist(&entries);
        (rank < self.limit).then_some(rank)
    }

    /// Empties the leaderboard. Asking the player to confirm is up to the caller.
    pub fn clear(&mut self) {
        self.persist(&[]);
    }

    fn persist(&mut self, entries: &[ScoreEntry]) {
        let raw = match serde_json::to_string(entries) {
            Ok(raw) => raw,
            Err(err) => {
                tracing::warn!(%err, "could not encode leaderboard");
                return;
            }
        };
        if let Err(err) = self.store.set(LEADERBOARD_KEY, &raw) {
            tracing::warn!(%err, "could not write leaderboard");
        }
    }
}

pub fn load_high_score<S: KeyValueStore + ?Sized>(store: &S) -> u32 {
    match store.get(HIGH_SCORE_KEY) {
        Ok(Some(raw)) => serde_json::from_str(raw.trim()).unwrap_or_else(|err| {
            tracing::warn!(%err, "ignoring corrupt high score");
            0
        }),
        Ok(None) => 0,
        Err(err) => {
            tracing::warn!(%err, "could not read high score");
            0
        }
    }
}

pub fn save_high_score<S: KeyValueStore + ?Sized>(store: &mut S, score: u32) {
    if let Err(err) = store.set(HIGH_SCORE_KEY, &score.to_string()) {
        tracing::warn!(%err, "could not write high score");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::error::StoreError;
    use crate::engine::store::MemoryStore;

    fn entry(name: &str, moves: u32, secs: u32) -> ScoreEntry {
        ScoreEntry::new(name, moves, secs, Difficulty::Easy)
    }

    struct BrokenStore;

    impl KeyValueStore for BrokenStore {
        fn get(&self, _key: &str) -> Result<Option<String>, StoreError> {
            Err(StoreError::InvalidKey("broken".into()))
        }

        fn set(&mut self, _key: &str, _value: &str) -> Result<(), StoreError> {
            Err(StoreError::InvalidKey("broken".into()))
        }

        fn remove(&mut self, _key: &str) -> Result<(), StoreError> {
            Err(StoreError::InvalidKey("broken".into()))
        }
    }

    #[test]
    fn ranks_by_moves_then_time() {
        let mut board = LeaderboardStore::new(MemoryStore::new());
        board.record(entry("a", 10, 30));
        board.record(entry("b", 5, 40));
        board.record(entry("c", 5, 20));
        let ranked: Vec<(u32, u32)> = board
            .load()
            .iter()
            .map(|e| (e.moves, e.elapsed_seconds))
            .collect();
        assert_eq!(ranked, vec![(5, 20), (5, 40), (10, 30)]);
    }

    #[test]
    fn keeps_only_the_top_ten() {
        let mut board = LeaderboardStore::new(MemoryStore::new());
        for moves in (1..=12).rev() {
            board.record(entry("p", moves, 10));
        }
        let entries = board.load();
        assert_eq!(entries.len(), 10);
        assert_eq!(entries.first().map(|e| e.moves), Some(1));
        assert_eq!(entries.last().map(|e| e.moves), Some(10));
        assert_eq!(board.record(entry("slow", 50, 10)), None);
        assert_eq!(board.record(entry("fast", 1, 5)), Some(0));
    }

    #[test]
    fn ties_keep_arrival_order() {
        let mut board = LeaderboardStore::new(MemoryStore::new());
        board.record(entry("first", 6, 30));
        assert_eq!(board.record(entry("second", 6, 30)), Some(1));
        let names: Vec<String> = board.load().into_iter().map(|e| e.name).collect();
        assert_eq!(names, vec!["first", "second"]);
    }

    #[test]
    fn corrupt_data_reads_as_empty() {
        let mut store = MemoryStore::new();
        store.set(LEADERBOARD_KEY, "{ definitely not a list").unwrap();
        let mut board = LeaderboardStore::new(store);
        assert!(board.load().is_empty());
        assert_eq!(board.record(entry("a", 3, 3)), Some(0));
        assert_eq!(board.load().len(), 1);
    }

    #[test]
    fn clear_persists_empty_list() {
        let mut board = LeaderboardStore::new(MemoryStore::new());
        board.record(entry("a", 3, 3));
        board.clear();
        assert!(board.load().is_empty());
        assert_eq!(
            board.store().get(LEADERBOARD_KEY).unwrap().as_deref(),
            Some("[]")
        );
    }

    #[test]
    fn broken_store_is_swallowed() {
        let mut board = LeaderboardStore::new(BrokenStore);
        assert_eq!(board.record(entry("a", 3, 3)), Some(0));
        assert!(board.load().is_empty());
        board.clear();
    }

    #[test]
    fn serialized_field_names() {
        let json = serde_json::to_value(entry("ana", 7, 42)).unwrap();
        assert_eq!(json["elapsedSeconds"], 42);
        assert_eq!(json["difficulty"], "easy");
        assert!(json["date"].is_string());
    }

    #[test]
    fn high_score_roundtrip_and_corruption() {
        let mut store = MemoryStore::new();
        assert_eq!(load_high_score(&store), 0);
        save_high_score(&mut store, 875);
        assert_eq!(load_high_score(&store), 875);
        store.set(HIGH_SCORE_KEY, "lots").unwrap();
        assert_eq!(load_high_score(&store), 0);
    }
}
