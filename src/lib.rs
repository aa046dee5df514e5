//! Recall engine: the rules of a pair-matching memory game, without any UI.
//!
//! A host creates a [`Game`], starts a session for a [`Difficulty`], forwards tile clicks with
//! [`Game::click`] and lets time pass with [`Game::advance`]. Everything the player should see
//! or hear arrives as a [`GameEvent`] through the sink the game was built with.
//!
//! ```
//! use recall_engine::{Difficulty, Game, GameRules, MemoryStore, SessionSetup};
//!
//! let mut game: Game<MemoryStore> =
//!     Game::with_seed(GameRules::default(), MemoryStore::new(), Vec::new(), 42).unwrap();
//! game.start(SessionSetup::new(Difficulty::Easy, "ana"));
//! game.click(0);
//! game.click(1);
//! game.advance(1_000);
//! assert_eq!(game.session().unwrap().move_count, 1);
//! ```

pub mod engine;

pub use engine::content::{AvatarFiller, FillerSource, SymbolFiller, resolve_content};
pub use engine::error::{ConfigError, StoreError};
pub use engine::events::{EventSink, GameEvent, NullSink};
pub use engine::flip::FlipOutcome;
pub use engine::game::{Game, SessionSetup};
pub use engine::records::{LeaderboardStore, ScoreEntry};
pub use engine::rules::GameRules;
pub use engine::scoring::GameSummary;
pub use engine::state::{
    Difficulty, GameConfig, GameSession, Outcome, Tile, TileId, TileStatus, format_mm_ss,
};
pub use engine::store::{FileStore, KeyValueStore, MemoryStore};
