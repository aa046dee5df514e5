use super::events::{EventSink, GameEvent};
use super::state::{GameSession, TileId, TileStatus};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FlipOutcome {
    /// Click rejected; nothing changed.
    Ignored,
    /// First tile of a pair is face up.
    Pending,
    /// Second tile is face up; the pair must be resolved after the reveal delay.
    PairComplete([TileId; 2]),
}

/// Turns a hidden tile face up.
///
/// Rejected while a pair is waiting for resolution, after game over, for an unknown id, and for
/// tiles that are already face up or matched. This gate is what keeps a third click from
/// interrupting an unresolved pair.
pub fn request_flip(
    session: &mut GameSession,
    tile_id: TileId,
    sink: &mut dyn EventSink,
) -> FlipOutcome {
    if session.is_over || session.pending_flips.len() >= 2 {
        return FlipOutcome::Ignored;
    }
    let Some(tile) = session.tiles.get_mut(tile_id) else {
        return FlipOutcome::Ignored;
    };
    if tile.status != TileStatus::Hidden {
        return FlipOutcome::Ignored;
    }

    tile.status = TileStatus::Flipped;
    tile.hinted = false;
    session.pending_flips.push(tile_id);
    sink.emit(GameEvent::Flip { tile: tile_id });

    match session.pending_flips.as_slice() {
        &[first, second] => {
            session.move_count = session.move_count.saturating_add(1);
            tracing::debug!(
                game_id = session.game_id,
                first,
                second,
                moves = session.move_count,
                "pair flipped"
            );
            FlipOutcome::PairComplete([first, second])
        }
        _ => FlipOutcome::Pending,
    }
}
