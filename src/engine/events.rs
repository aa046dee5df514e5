//! Notifications for the presentation layer (sound, animation, HUD refresh).
//!
//! Events are emitted in the order the engine applies them and never wait for a reply.

use serde::Serialize;

use super::state::{Difficulty, TileId};

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "event", rename_all = "camelCase")]
pub enum GameEvent {
    Flip {
        tile: TileId,
    },
    Match {
        tiles: [TileId; 2],
        points: u32,
        streak: u32,
        score: u32,
    },
    Miss {
        tiles: [TileId; 2],
        strikes: u32,
        penalty: u32,
        score: u32,
    },
    Win {
        score: u32,
        moves: u32,
        elapsed_secs: u32,
        difficulty: Difficulty,
    },
    TimeUp {
        score: u32,
        moves: u32,
    },
    Hint {
        tiles: [TileId; 2],
        remaining: u32,
    },
    HintsCleared,
    Tick {
        time_left_secs: u32,
    },
}

pub trait EventSink {
    fn emit(&mut self, event: GameEvent);
}

impl EventSink for Vec<GameEvent> {
    fn emit(&mut self, event: GameEvent) {
        self.push(event);
    }
}

impl<F> EventSink for F
where
    F: FnMut(GameEvent),
{
    fn emit(&mut self, event: GameEvent) {
        self(event)
    }
}

/// Discards everything.
#[derive(Clone, Copy, Debug, Default)]
pub struct NullSink;

impl EventSink for NullSink {
    fn emit(&mut self, _event: GameEvent) {}
}
