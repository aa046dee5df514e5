use super::events::EventSink;
use super::rules::GameRules;
use super::scoring;
use super::state::{GameSession, TileId, TileStatus};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Resolution {
    Matched,
    Missed,
    /// The pair is not the one currently pending; nothing was touched.
    Stale,
}

/// Settles the pending pair once the reveal delay has passed.
///
/// This is the only place a tile leaves `Flipped`: equal content locks both tiles as `Matched`,
/// anything else turns them face down again. The pending list is empty afterwards.
pub fn resolve(
    session: &mut GameSession,
    pair: [TileId; 2],
    rules: &GameRules,
    sink: &mut dyn EventSink,
) -> Resolution {
    let [a, b] = pair;
    if session.pending_flips.as_slice() != [a, b] {
        return Resolution::Stale;
    }
    let both_flipped = [a, b].iter().all(|&idx| {
        session
            .tile(idx)
            .is_some_and(|tile| tile.status == TileStatus::Flipped)
    });
    if !both_flipped {
        session.pending_flips.clear();
        return Resolution::Stale;
    }

    session.pending_flips.clear();
    let is_match = session.tiles[a].value == session.tiles[b].value;

    if is_match {
        for idx in pair {
            let tile = &mut session.tiles[idx];
            tile.status = TileStatus::Matched;
            tile.animate = true;
        }
        session.match_count += 1;
        scoring::on_match(session, pair, rules, sink);
        Resolution::Matched
    } else {
        for idx in pair {
            session.tiles[idx].status = TileStatus::Hidden;
        }
        scoring::on_miss(session, pair, rules, sink);
        Resolution::Missed
    }
}

/// Drops the cosmetic match highlight from the given tiles.
pub fn clear_animation(session: &mut GameSession, tiles: [TileId; 2]) {
    for idx in tiles {
        if let Some(tile) = session.tiles.get_mut(idx) {
            tile.animate = false;
        }
    }
}
