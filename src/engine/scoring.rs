//! Score, streak, strike and countdown bookkeeping.
//!
//! A match pays `match_base_points + streak_bonus * streak` and clears strikes. A miss clears
//! the streak and adds a strike; hitting `strike_limit` strikes costs `strike_penalty` points
//! (never below zero) and starts the strike count over.

use super::events::{EventSink, GameEvent};
use super::rules::GameRules;
use super::state::{Difficulty, GameSession, Outcome, TileId};

/// Snapshot taken at the moment a session ends.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GameSummary {
    pub outcome: Outcome,
    pub difficulty: Difficulty,
    pub player_name: String,
    pub score: u32,
    pub moves: u32,
    pub elapsed_secs: u32,
}

impl GameSummary {
    pub fn is_win(&self) -> bool {
        self.outcome == Outcome::Won
    }
}

pub fn on_match(
    session: &mut GameSession,
    tiles: [TileId; 2],
    rules: &GameRules,
    sink: &mut dyn EventSink,
) -> u32 {
    let points = rules.match_points(session.streak);
    session.score = session.score.saturating_add(points);
    session.streak = session.streak.saturating_add(1);
    session.strike_count = 0;
    sink.emit(GameEvent::Match {
        tiles,
        points,
        streak: session.streak,
        score: session.score,
    });
    points
}

/// Returns the penalty actually deducted (zero unless the strike limit was hit).
pub fn on_miss(
    session: &mut GameSession,
    tiles: [TileId; 2],
    rules: &GameRules,
    sink: &mut dyn EventSink,
) -> u32 {
    session.streak = 0;
    session.strike_count = session.strike_count.saturating_add(1);
    let strikes = session.strike_count;

    let mut penalty = 0;
    if session.strike_count >= rules.strike_limit {
        penalty = rules.strike_penalty.min(session.score);
        session.score -= penalty;
        session.strike_count = 0;
        tracing::debug!(game_id = session.game_id, penalty, "strike limit reached");
    }

    sink.emit(GameEvent::Miss {
        tiles,
        strikes,
        penalty,
        score: session.score,
    });
    penalty
}

/// One second of countdown. Returns true when the clock has just run out.
pub fn tick(session: &mut GameSession, sink: &mut dyn EventSink) -> bool {
    if session.is_over {
        return false;
    }
    session.time_left_secs = session.time_left_secs.saturating_sub(1);
    sink.emit(GameEvent::Tick {
        time_left_secs: session.time_left_secs,
    });
    session.time_left_secs == 0
}

/// Moves the session to game over.
///
/// Only the first call has any effect; later calls return `None` and leave the session alone.
pub fn finish(
    session: &mut GameSession,
    outcome: Outcome,
    sink: &mut dyn EventSink,
) -> Option<GameSummary> {
    if session.is_over {
        return None;
    }
    session.is_over = true;
    session.outcome = Some(outcome);

    let summary = GameSummary {
        outcome,
        difficulty: session.difficulty,
        player_name: session.player_name.clone(),
        score: session.score,
        moves: session.move_count,
        elapsed_secs: session.elapsed_secs(),
    };

    match outcome {
        Outcome::Won => sink.emit(GameEvent::Win {
            score: summary.score,
            moves: summary.moves,
            elapsed_secs: summary.elapsed_secs,
            difficulty: summary.difficulty,
        }),
        Outcome::TimeUp => sink.emit(GameEvent::TimeUp {
            score: summary.score,
            moves: summary.moves,
        }),
    }
    tracing::info!(
        game_id = session.game_id,
        ?outcome,
        score = summary.score,
        moves = summary.moves,
        elapsed = summary.elapsed_secs,
        "game over"
    );
    Some(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::events::NullSink;
    use crate::engine::state::Tile;

    fn session() -> GameSession {
        let tiles = (0..8)
            .map(|id| Tile::new(id, format!("v{}", id / 2)))
            .collect();
        GameSession::new(7, Difficulty::Easy, "ana", tiles, &GameRules::default())
    }

    #[test]
    fn consecutive_matches_build_a_streak() {
        let rules = GameRules::default();
        let mut s = session();
        let mut sink = NullSink;
        let points: Vec<u32> = (0..3)
            .map(|_| on_match(&mut s, [0, 1], &rules, &mut sink))
            .collect();
        assert_eq!(points, vec![100, 125, 150]);
        assert_eq!(s.score, 375);
        assert_eq!(s.streak, 3);
    }

    #[test]
    fn streak_sum_matches_closed_form() {
        let rules = GameRules::default();
        let mut s = session();
        for _ in 0..6 {
            on_match(&mut s, [0, 1], &rules, &mut NullSink);
        }
        let expected: u32 = (0..6).map(|k| 100 + 25 * k).sum();
        assert_eq!(s.score, expected);
    }

    #[test]
    fn miss_resets_streak_and_match_resets_strikes() {
        let rules = GameRules::default();
        let mut s = session();
        on_match(&mut s, [0, 1], &rules, &mut NullSink);
        on_miss(&mut s, [2, 4], &rules, &mut NullSink);
        assert_eq!(s.streak, 0);
        assert_eq!(s.strike_count, 1);
        on_match(&mut s, [2, 3], &rules, &mut NullSink);
        assert_eq!(s.strike_count, 0);
        // Streak restarted, so the second match pays base points only.
        assert_eq!(s.score, 200);
    }

    #[test]
    fn third_strike_costs_points_once() {
        let rules = GameRules::default();
        let mut s = session();
        s.score = 250;
        let mut events: Vec<GameEvent> = Vec::new();
        let penalties: Vec<u32> = (0..4)
            .map(|_| on_miss(&mut s, [0, 2], &rules, &mut events))
            .collect();
        assert_eq!(penalties, vec![0, 0, 100, 0]);
        assert_eq!(s.score, 150);
        assert_eq!(s.strike_count, 1);
        assert!(matches!(
            events[2],
            GameEvent::Miss {
                strikes: 3,
                penalty: 100,
                score: 150,
                ..
            }
        ));
    }

    #[test]
    fn penalty_is_floored_at_zero() {
        let rules = GameRules::default();
        let mut s = session();
        s.score = 40;
        for _ in 0..3 {
            on_miss(&mut s, [0, 2], &rules, &mut NullSink);
        }
        assert_eq!(s.score, 0);
        assert_eq!(s.strike_count, 0);
    }

    #[test]
    fn countdown_reports_expiry() {
        let mut s = session();
        s.time_left_secs = 2;
        assert!(!tick(&mut s, &mut NullSink));
        assert!(tick(&mut s, &mut NullSink));
        assert_eq!(s.time_left_secs, 0);
    }

    #[test]
    fn finish_is_idempotent() {
        let mut s = session();
        s.score = 300;
        s.move_count = 5;
        let mut events: Vec<GameEvent> = Vec::new();
        let summary = finish(&mut s, Outcome::Won, &mut events).unwrap();
        assert!(summary.is_win());
        assert_eq!(summary.player_name, "ana");

        assert!(finish(&mut s, Outcome::TimeUp, &mut events).is_none());
        assert_eq!(s.outcome, Some(Outcome::Won));
        assert_eq!(s.score, 300);
        assert_eq!(s.move_count, 5);
        assert_eq!(events.len(), 1);
        assert!(!tick(&mut s, &mut events));
    }
}
