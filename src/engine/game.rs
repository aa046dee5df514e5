//! The session driver.
//!
//! `Game` owns the one active [`GameSession`] together with every timer armed on its behalf.
//! Hosts feed it click intents and elapsed time; it answers through the [`EventSink`].
//! Each timer carries the id of the session that armed it and is dropped if that session has
//! since been replaced, on top of all timers being cancelled whenever a session is discarded.

use rand::SeedableRng;
use rand::rngs::StdRng;

use super::board::build_board;
use super::content::{AvatarFiller, FillerSource, resolve_content};
use super::error::ConfigError;
use super::events::{EventSink, GameEvent};
use super::flip::{FlipOutcome, request_flip};
use super::hint;
use super::records::{LeaderboardStore, ScoreEntry, load_high_score, save_high_score};
use super::resolve::{Resolution, clear_animation, resolve};
use super::rules::{GameRules, TICK_MS};
use super::scheduler::Scheduler;
use super::scoring::{self, GameSummary};
use super::session_save;
use super::state::{Difficulty, GameSession, Outcome, TileId};
use super::store::KeyValueStore;

const AVATAR_STYLE: &str = "bottts";

/// What the player picked on the way into a game.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SessionSetup {
    pub difficulty: Difficulty,
    pub player_name: String,
    /// Caller-supplied content (e.g. uploaded pictures); filler covers any shortfall.
    pub content: Vec<String>,
}

impl SessionSetup {
    pub fn new(difficulty: Difficulty, player_name: impl Into<String>) -> Self {
        SessionSetup {
            difficulty,
            player_name: player_name.into(),
            content: Vec::new(),
        }
    }

    pub fn with_content(mut self, content: Vec<String>) -> Self {
        self.content = content;
        self
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
enum Task {
    Resolve { game_id: u64, pair: [TileId; 2] },
    Tick { game_id: u64 },
    ClearHints { game_id: u64 },
    ClearAnimation { game_id: u64, tiles: [TileId; 2] },
}

impl Task {
    fn game_id(&self) -> u64 {
        match self {
            Task::Resolve { game_id, .. }
            | Task::Tick { game_id }
            | Task::ClearHints { game_id }
            | Task::ClearAnimation { game_id, .. } => *game_id,
        }
    }
}

pub struct Game<S, E = Vec<GameEvent>> {
    rules: GameRules,
    records: LeaderboardStore<S>,
    sink: E,
    rng: StdRng,
    filler: Box<dyn FillerSource>,
    scheduler: Scheduler<Task>,
    session: Option<GameSession>,
    setup: Option<SessionSetup>,
    high_score: u32,
    last_game_id: u64,
    paused: bool,
}

impl<S: KeyValueStore, E: EventSink> Game<S, E> {
    pub fn new(rules: GameRules, store: S, sink: E) -> Result<Self, ConfigError> {
        Self::build(
            rules,
            store,
            sink,
            StdRng::from_os_rng(),
            Box::new(AvatarFiller::new(AVATAR_STYLE)),
        )
    }

    /// Same as [`Game::new`] but every shuffle, hint pick and filler item follows `seed`.
    pub fn with_seed(rules: GameRules, store: S, sink: E, seed: u64) -> Result<Self, ConfigError> {
        Self::build(
            rules,
            store,
            sink,
            StdRng::seed_from_u64(seed),
            Box::new(AvatarFiller::with_seed(AVATAR_STYLE, seed.rotate_left(17))),
        )
    }

    fn build(
        rules: GameRules,
        store: S,
        sink: E,
        rng: StdRng,
        filler: Box<dyn FillerSource>,
    ) -> Result<Self, ConfigError> {
        rules.validate()?;
        let high_score = load_high_score(&store);
        let records = LeaderboardStore::with_limit(store, rules.leaderboard_limit);
        Ok(Game {
            rules,
            records,
            sink,
            rng,
            filler,
            scheduler: Scheduler::new(),
            session: None,
            setup: None,
            high_score,
            last_game_id: 0,
            paused: false,
        })
    }

    pub fn set_filler(&mut self, filler: Box<dyn FillerSource>) {
        self.filler = filler;
    }

    pub fn rules(&self) -> &GameRules {
        &self.rules
    }

    pub fn session(&self) -> Option<&GameSession> {
        self.session.as_ref()
    }

    pub fn high_score(&self) -> u32 {
        self.high_score
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn now_ms(&self) -> u64 {
        self.scheduler.now_ms()
    }

    pub fn pending_timers(&self) -> usize {
        self.scheduler.len()
    }

    pub fn sink(&self) -> &E {
        &self.sink
    }

    pub fn sink_mut(&mut self) -> &mut E {
        &mut self.sink
    }

    pub fn store(&self) -> &S {
        self.records.store()
    }

    pub fn leaderboard(&self) -> Vec<ScoreEntry> {
        self.records.load()
    }

    pub fn clear_leaderboard(&mut self) {
        self.records.clear();
    }

    /// Deals a fresh board and starts the countdown, discarding any session in progress.
    pub fn start(&mut self, setup: SessionSetup) -> &GameSession {
        self.teardown();
        session_save::clear_saved_run(self.records.store_mut());

        let config = setup.difficulty.config();
        let content = resolve_content(&setup.content, config.pair_count, &mut *self.filler);
        let tiles = build_board(&content, &mut self.rng);
        let game_id = self.next_game_id();
        let session = GameSession::new(
            game_id,
            setup.difficulty,
            setup.player_name.trim(),
            tiles,
            &self.rules,
        );
        tracing::info!(
            game_id,
            difficulty = setup.difficulty.code(),
            pairs = config.pair_count,
            time_limit = config.time_limit_secs,
            "session started"
        );
        self.setup = Some(setup);
        self.activate(session)
    }

    /// Starts over with the setup of the last [`Game::start`]. No-op before the first start.
    pub fn restart(&mut self) -> Option<&GameSession> {
        let setup = self.setup.clone()?;
        Some(self.start(setup))
    }

    /// Leaves the current session. An unfinished game stays available to continue.
    pub fn quit(&mut self) {
        if let Some(session) = &self.session {
            session_save::save_current_run(self.records.store_mut(), session);
            tracing::info!(game_id = session.game_id, "session discarded");
        }
        self.teardown();
    }

    pub fn has_saved_run(&self) -> bool {
        session_save::has_saved_run(self.records.store())
    }

    /// Picks up the stored unfinished run, if there is a usable one.
    pub fn continue_saved_run(&mut self) -> Option<&GameSession> {
        let run = session_save::load_saved_run(self.records.store())?;
        self.teardown();
        let game_id = self.next_game_id();
        let session = run.into_session(game_id);

        let mut content: Vec<String> = Vec::with_capacity(session.pair_count());
        for tile in &session.tiles {
            if !content.contains(&tile.value) {
                content.push(tile.value.clone());
            }
        }
        self.setup = Some(SessionSetup {
            difficulty: session.difficulty,
            player_name: session.player_name.clone(),
            content,
        });
        tracing::info!(
            game_id,
            matched = session.match_count,
            time_left = session.time_left_secs,
            "continuing saved run"
        );
        Some(self.activate(session))
    }

    fn activate(&mut self, session: GameSession) -> &GameSession {
        self.scheduler.schedule_repeating(
            TICK_MS,
            Task::Tick {
                game_id: session.game_id,
            },
        );
        self.session.insert(session)
    }

    fn next_game_id(&mut self) -> u64 {
        self.last_game_id = self.last_game_id.wrapping_add(1);
        self.last_game_id
    }

    fn teardown(&mut self) {
        self.scheduler.clear();
        self.session = None;
        self.paused = false;
    }

    pub fn pause(&mut self) -> bool {
        let Some(session) = &self.session else {
            return false;
        };
        if self.paused || session.is_over {
            return false;
        }
        self.paused = true;
        session_save::save_current_run(self.records.store_mut(), session);
        tracing::debug!(game_id = session.game_id, "paused");
        true
    }

    pub fn resume(&mut self) -> bool {
        if !self.paused {
            return false;
        }
        self.paused = false;
        true
    }

    pub fn click(&mut self, tile_id: TileId) -> FlipOutcome {
        if self.paused {
            return FlipOutcome::Ignored;
        }
        let Some(session) = self.session.as_mut() else {
            return FlipOutcome::Ignored;
        };
        let outcome = request_flip(session, tile_id, &mut self.sink);
        if let FlipOutcome::PairComplete(pair) = outcome {
            self.scheduler.schedule_once(
                self.rules.reveal_delay_ms,
                Task::Resolve {
                    game_id: session.game_id,
                    pair,
                },
            );
        }
        outcome
    }

    pub fn request_hint(&mut self) -> Option<[TileId; 2]> {
        if self.paused {
            return None;
        }
        let session = self.session.as_mut()?;
        let pair = hint::request_hint(session, &mut self.rng, &mut self.sink)?;
        self.scheduler.schedule_once(
            self.rules.hint_duration_ms,
            Task::ClearHints {
                game_id: session.game_id,
            },
        );
        Some(pair)
    }

    /// Lets `elapsed_ms` of game time pass, firing every timer that comes due on the way.
    pub fn advance(&mut self, elapsed_ms: u64) {
        if self.paused {
            return;
        }
        let until = self.scheduler.now_ms().saturating_add(elapsed_ms);
        while let Some((_, task)) = self.scheduler.next_due(until) {
            self.run_task(task);
        }
        self.scheduler.advance_to(until);
    }

    /// Ends the running session now; won if every pair is matched, out of time otherwise.
    ///
    /// Calling it on a finished session does nothing and returns `None`.
    pub fn finish_session(&mut self) -> Option<GameSummary> {
        let session = self.session.as_ref()?;
        let outcome = if session.all_matched() {
            Outcome::Won
        } else {
            Outcome::TimeUp
        };
        self.end_game(outcome)
    }

    fn run_task(&mut self, task: Task) {
        let Some(session) = self.session.as_mut() else {
            return;
        };
        if task.game_id() != session.game_id {
            tracing::debug!(?task, active = session.game_id, "dropping stale timer");
            return;
        }

        match task {
            Task::Resolve { game_id, pair } => {
                let resolution = resolve(session, pair, &self.rules, &mut self.sink);
                if resolution == Resolution::Matched {
                    self.scheduler.schedule_once(
                        self.rules.match_bump_ms,
                        Task::ClearAnimation {
                            game_id,
                            tiles: pair,
                        },
                    );
                }
                if session.all_matched() {
                    self.end_game(Outcome::Won);
                } else if resolution != Resolution::Stale {
                    session_save::save_current_run(self.records.store_mut(), session);
                }
            }
            Task::Tick { .. } => {
                if scoring::tick(session, &mut self.sink) {
                    self.end_game(Outcome::TimeUp);
                }
            }
            Task::ClearHints { .. } => {
                if session.clear_hints() {
                    self.sink.emit(GameEvent::HintsCleared);
                }
            }
            Task::ClearAnimation { tiles, .. } => clear_animation(session, tiles),
        }
    }

    fn end_game(&mut self, outcome: Outcome) -> Option<GameSummary> {
        let session = self.session.as_mut()?;
        let summary = scoring::finish(session, outcome, &mut self.sink)?;
        let game_id = session.game_id;

        // The board freezes: no more countdown and no pending pair gets settled.
        self.scheduler.cancel_where(|task| {
            task.game_id() == game_id && matches!(task, Task::Tick { .. } | Task::Resolve { .. })
        });

        if summary.score > self.high_score {
            self.high_score = summary.score;
            save_high_score(self.records.store_mut(), summary.score);
        }
        if summary.is_win() && !summary.player_name.trim().is_empty() {
            self.records.record(ScoreEntry::new(
                summary.player_name.trim(),
                summary.moves,
                summary.elapsed_secs,
                summary.difficulty,
            ));
        }
        session_save::clear_saved_run(self.records.store_mut());
        Some(summary)
    }
}

impl<S: KeyValueStore> Game<S, Vec<GameEvent>> {
    /// Hands over everything emitted since the last call.
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.sink)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::state::TileStatus;
    use crate::engine::store::MemoryStore;

    fn game(seed: u64) -> Game<MemoryStore> {
        Game::with_seed(GameRules::default(), MemoryStore::new(), Vec::new(), seed).unwrap()
    }

    fn partner_of(session: &GameSession, id: TileId) -> TileId {
        session
            .tiles
            .iter()
            .find(|t| t.id != id && t.value == session.tiles[id].value)
            .map(|t| t.id)
            .unwrap()
    }

    #[test]
    fn start_deals_a_full_board() {
        let mut g = game(1);
        let session = g.start(SessionSetup::new(Difficulty::Medium, "ana"));
        assert_eq!(session.tiles.len(), 12);
        assert_eq!(session.time_left_secs, 90);
        assert_eq!(session.hint_budget, 3);
        assert_eq!(g.pending_timers(), 1);
    }

    #[test]
    fn resolution_waits_for_the_reveal_delay() {
        let mut g = game(2);
        g.start(SessionSetup::new(Difficulty::Easy, ""));
        let partner = partner_of(g.session().unwrap(), 0);
        g.click(0);
        g.click(partner);
        g.advance(799);
        assert_eq!(g.session().unwrap().tiles[0].status, TileStatus::Flipped);
        g.advance(1);
        let session = g.session().unwrap();
        assert_eq!(session.tiles[0].status, TileStatus::Matched);
        assert_eq!(session.match_count, 1);
        assert!(session.pending_flips.is_empty());
    }

    #[test]
    fn stale_timers_from_a_replaced_session_are_dropped() {
        let mut g = game(3);
        g.start(SessionSetup::new(Difficulty::Easy, ""));
        g.click(0);
        g.click(1);
        // Sneak an old-session timer back in past the teardown.
        g.restart();
        g.scheduler.schedule_once(
            10,
            Task::Resolve {
                game_id: 1,
                pair: [0, 1],
            },
        );
        g.advance(50);
        let session = g.session().unwrap();
        assert_eq!(session.game_id, 2);
        assert!(session.tiles.iter().all(|t| t.status == TileStatus::Hidden));
    }

    #[test]
    fn hint_marks_clear_after_the_duration() {
        let mut g = game(4);
        g.start(SessionSetup::new(Difficulty::Easy, ""));
        let pair = g.request_hint().unwrap();
        assert!(g.session().unwrap().tiles[pair[0]].hinted);
        g.advance(1999);
        assert_eq!(g.session().unwrap().hinted_tiles().len(), 2);
        g.advance(1);
        assert!(g.session().unwrap().hinted_tiles().is_empty());
        assert!(g.drain_events().contains(&GameEvent::HintsCleared));
    }

    #[test]
    fn pause_freezes_clock_and_input() {
        let mut g = game(5);
        g.start(SessionSetup::new(Difficulty::Easy, ""));
        assert!(g.pause());
        assert!(g.has_saved_run());
        g.advance(10_000);
        assert_eq!(g.session().unwrap().time_left_secs, 60);
        assert_eq!(g.click(0), FlipOutcome::Ignored);
        assert!(g.request_hint().is_none());
        assert!(g.resume());
        g.advance(3_000);
        assert_eq!(g.session().unwrap().time_left_secs, 57);
    }
}
