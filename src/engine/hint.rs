use rand::Rng;
use rand::seq::IndexedRandom;

use super::events::{EventSink, GameEvent};
use super::state::{GameSession, TileId};

/// Marks one still-hidden pair as hinted and spends one hint.
///
/// Refused (returns `None`, nothing changes) when the budget is spent, a flip is pending, or the
/// game is over. The caller is expected to clear the marks after the hint duration.
pub fn request_hint<R: Rng + ?Sized>(
    session: &mut GameSession,
    rng: &mut R,
    sink: &mut dyn EventSink,
) -> Option<[TileId; 2]> {
    if session.hint_budget == 0 || !session.pending_flips.is_empty() || session.is_over {
        return None;
    }

    let hidden: Vec<TileId> = session
        .tiles
        .iter()
        .filter(|tile| tile.is_hidden())
        .map(|tile| tile.id)
        .collect();
    let &chosen = hidden.choose(rng)?;
    let value = &session.tiles[chosen].value;
    let partner = hidden
        .iter()
        .copied()
        .find(|&idx| idx != chosen && session.tiles[idx].value == *value)?;

    session.tiles[chosen].hinted = true;
    session.tiles[partner].hinted = true;
    session.hint_budget -= 1;
    sink.emit(GameEvent::Hint {
        tiles: [chosen, partner],
        remaining: session.hint_budget,
    });
    tracing::debug!(
        game_id = session.game_id,
        chosen,
        partner,
        remaining = session.hint_budget,
        "hint shown"
    );
    Some([chosen, partner])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::events::NullSink;
    use crate::engine::rules::GameRules;
    use crate::engine::state::{Difficulty, Tile, TileStatus};
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn session(values: &[&str]) -> GameSession {
        let tiles = values
            .iter()
            .enumerate()
            .map(|(id, value)| Tile::new(id, *value))
            .collect();
        GameSession::new(1, Difficulty::Easy, "", tiles, &GameRules::default())
    }

    #[test]
    fn hint_marks_a_real_pair() {
        let mut s = session(&["a", "b", "c", "a", "b", "c"]);
        let mut rng = StdRng::seed_from_u64(11);
        let [x, y] = request_hint(&mut s, &mut rng, &mut NullSink).unwrap();
        assert_ne!(x, y);
        assert_eq!(s.tiles[x].value, s.tiles[y].value);
        assert!(s.tiles[x].hinted && s.tiles[y].hinted);
        assert_eq!(s.tiles[x].status, TileStatus::Hidden);
        assert_eq!(s.hint_budget, 2);
        assert_eq!(s.hinted_tiles().len(), 2);
    }

    #[test]
    fn budget_runs_out() {
        let mut s = session(&["a", "b", "c", "a", "b", "c"]);
        let mut rng = StdRng::seed_from_u64(5);
        for _ in 0..3 {
            assert!(request_hint(&mut s, &mut rng, &mut NullSink).is_some());
            s.clear_hints();
        }
        assert_eq!(s.hint_budget, 0);
        assert!(request_hint(&mut s, &mut rng, &mut NullSink).is_none());
        assert!(s.hinted_tiles().is_empty());
        assert_eq!(s.hint_budget, 0);
    }

    #[test]
    fn refused_while_a_flip_is_pending() {
        let mut s = session(&["a", "b", "a", "b"]);
        s.tiles[0].status = TileStatus::Flipped;
        s.pending_flips.push(0);
        let mut rng = StdRng::seed_from_u64(5);
        assert!(request_hint(&mut s, &mut rng, &mut NullSink).is_none());
        assert_eq!(s.hint_budget, 3);
    }

    #[test]
    fn refused_after_game_over() {
        let mut s = session(&["a", "a"]);
        s.is_over = true;
        let mut rng = StdRng::seed_from_u64(5);
        assert!(request_hint(&mut s, &mut rng, &mut NullSink).is_none());
    }

    #[test]
    fn only_hidden_tiles_are_candidates() {
        let mut s = session(&["a", "b", "a", "b"]);
        s.tiles[0].status = TileStatus::Matched;
        s.tiles[2].status = TileStatus::Matched;
        let mut rng = StdRng::seed_from_u64(9);
        let pair = request_hint(&mut s, &mut rng, &mut NullSink).unwrap();
        let mut sorted = pair;
        sorted.sort();
        assert_eq!(sorted, [1, 3]);
    }

    #[test]
    fn lone_hidden_tile_has_no_partner() {
        let mut s = session(&["a", "a"]);
        s.tiles[1].status = TileStatus::Matched;
        let mut rng = StdRng::seed_from_u64(9);
        assert!(request_hint(&mut s, &mut rng, &mut NullSink).is_none());
        assert_eq!(s.hint_budget, 3);
    }
}
