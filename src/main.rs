//! Headless demo: plays one session with a scripted player and prints the leaderboard.

use std::collections::HashMap;
use std::path::PathBuf;

use anyhow::{Context, bail};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use recall_engine::{
    Difficulty, FileStore, FlipOutcome, Game, GameEvent, GameRules, KeyValueStore, MemoryStore,
    SessionSetup, TileId, TileStatus, format_mm_ss,
};

#[derive(Debug, Parser)]
#[command(name = "recall-sim", about = "Play a Recall session without a UI")]
struct Args {
    /// easy, normal or hard
    #[arg(long, default_value = "easy")]
    difficulty: String,

    /// Name for the leaderboard; leave empty to skip recording.
    #[arg(long, default_value = "")]
    name: String,

    #[arg(long)]
    seed: Option<u64>,

    /// Where records are kept. Defaults to the user config directory.
    #[arg(long)]
    store_dir: Option<PathBuf>,

    /// Keep everything in memory.
    #[arg(long)]
    ephemeral: bool,

    /// Optional JSON rules file.
    #[arg(long)]
    rules: Option<PathBuf>,

    /// Hints the player asks for before guessing.
    #[arg(long, default_value_t = 0)]
    hints: u32,

    /// Deliberate wrong guesses at the start.
    #[arg(long, default_value_t = 0)]
    mistakes: u32,

    /// Milliseconds the player waits between moves. At least 1.
    #[arg(
        long,
        default_value_t = 1500,
        value_parser = clap::value_parser!(u64).range(1..)
    )]
    think_ms: u64,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();
    let Some(difficulty) = Difficulty::from_code(&args.difficulty) else {
        bail!("unknown difficulty {:?}", args.difficulty);
    };
    let rules = match &args.rules {
        Some(path) => GameRules::load(path).context("loading rules")?,
        None => GameRules::default(),
    };

    if args.ephemeral {
        return play(&args, difficulty, rules, MemoryStore::new());
    }
    let store = match &args.store_dir {
        Some(dir) => FileStore::new(dir),
        None => FileStore::default_location().context("no config directory on this platform")?,
    };
    tracing::info!(dir = %store.dir().display(), "using file store");
    play(&args, difficulty, rules, store)
}

fn play<S: KeyValueStore>(
    args: &Args,
    difficulty: Difficulty,
    rules: GameRules,
    store: S,
) -> anyhow::Result<()> {
    let mut game: Game<S> = match args.seed {
        Some(seed) => Game::with_seed(rules, store, Vec::new(), seed)?,
        None => Game::new(rules, store, Vec::new())?,
    };
    game.start(SessionSetup::new(difficulty, args.name.clone()));

    let mut player = ScriptedPlayer::new(args.hints, args.mistakes);
    play_out(&mut game, &mut player, args.think_ms);

    let Some(session) = game.session() else {
        bail!("session vanished");
    };
    println!(
        "{:?}: score {} in {} moves, {} on the clock (high score {})",
        session.outcome,
        session.score,
        session.move_count,
        format_mm_ss(session.time_left_secs),
        game.high_score()
    );
    let leaderboard = game.leaderboard();
    if !leaderboard.is_empty() {
        println!("Leaderboard:");
        for (rank, entry) in leaderboard.iter().enumerate() {
            println!(
                "{:>2}. {:<12} {:>3} moves {:>6}  {:<6} {}",
                rank + 1,
                entry.name,
                entry.moves,
                format_mm_ss(entry.elapsed_seconds),
                entry.difficulty.name(),
                entry.date
            );
        }
    }
    Ok(())
}

/// Takes turns until the session ends. Each turn lets at least a millisecond pass.
fn play_out<S: KeyValueStore>(game: &mut Game<S>, player: &mut ScriptedPlayer, think_ms: u64) {
    while game.session().is_some_and(|s| !s.is_over) {
        player.take_turn(game);
        game.advance(think_ms.max(1));
        log_events(game.drain_events());
    }
}

fn log_events(events: Vec<GameEvent>) {
    for event in events {
        match event {
            GameEvent::Tick { .. } | GameEvent::Flip { .. } => tracing::trace!(?event),
            _ => tracing::debug!(?event),
        }
    }
}

/// Remembers every face it has seen and only guesses when it has to.
struct ScriptedPlayer {
    seen: HashMap<TileId, String>,
    hints_left: u32,
    mistakes_left: u32,
}

impl ScriptedPlayer {
    fn new(hints: u32, mistakes: u32) -> Self {
        ScriptedPlayer {
            seen: HashMap::new(),
            hints_left: hints,
            mistakes_left: mistakes,
        }
    }

    fn take_turn<S: KeyValueStore>(&mut self, game: &mut Game<S>) {
        let hidden: Vec<TileId> = match game.session() {
            Some(session) => session
                .tiles
                .iter()
                .filter(|t| t.status == TileStatus::Hidden)
                .map(|t| t.id)
                .collect(),
            None => return,
        };
        self.seen.retain(|id, _| hidden.contains(id));

        if self.hints_left > 0 {
            self.hints_left -= 1;
            if let Some([a, b]) = game.request_hint() {
                self.flip_pair(game, a, b);
                return;
            }
        }

        if self.mistakes_left == 0 {
            if let Some((a, b)) = self.known_pair() {
                self.flip_pair(game, a, b);
                return;
            }
        }

        let mut unknown = hidden
            .iter()
            .copied()
            .filter(|id| !self.seen.contains_key(id));
        let Some(first) = unknown.next().or_else(|| hidden.first().copied()) else {
            return;
        };
        self.flip(game, first);
        let first_value = self.seen.get(&first).cloned();

        let remembered = first_value.as_ref().and_then(|value| {
            self.seen
                .iter()
                .find(|(id, seen)| **id != first && *seen == value)
                .map(|(id, _)| *id)
        });
        let fresh = hidden
            .iter()
            .copied()
            .find(|&id| id != first && !self.seen.contains_key(&id));
        let any_other = hidden.iter().copied().find(|&id| id != first);
        let second = match remembered {
            Some(id) if self.mistakes_left == 0 => Some(id),
            Some(id) => {
                self.mistakes_left -= 1;
                hidden
                    .iter()
                    .copied()
                    .find(|&other| other != first && other != id)
                    .or(Some(id))
            }
            None => fresh.or(any_other),
        };
        if let Some(second) = second {
            self.flip(game, second);
        }
    }

    fn known_pair(&self) -> Option<(TileId, TileId)> {
        let mut by_value: HashMap<&str, TileId> = HashMap::new();
        for (&id, value) in &self.seen {
            if let Some(&other) = by_value.get(value.as_str()) {
                return Some((other, id));
            }
            by_value.insert(value, id);
        }
        None
    }

    fn flip_pair<S: KeyValueStore>(&mut self, game: &mut Game<S>, a: TileId, b: TileId) {
        self.flip(game, a);
        self.flip(game, b);
    }

    fn flip<S: KeyValueStore>(&mut self, game: &mut Game<S>, id: TileId) {
        if game.click(id) == FlipOutcome::Ignored {
            return;
        }
        if let Some(tile) = game.session().and_then(|s| s.tile(id)) {
            self.seen.insert(id, tile.value.clone());
        }
    }
}
