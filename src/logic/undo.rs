//! Undo of the last completed turn.

use crate::models::{ClockError, GameSession, GameStatus};

/// Restore the state from before the most recent completed turn. The clock is left paused.
pub fn undo(session: &mut GameSession) -> Result<(), ClockError> {
    if session.is_blocked() {
        return Err(ClockError::Blocked);
    }
    let entry = session
        .undo_history
        .pop_front()
        .ok_or(ClockError::NothingToUndo)?;

    session.stop_warning();
    session.players = entry.players;
    session.active_index = entry.active_index;
    session.round = entry.round;
    session.elapsed_seconds = entry.elapsed_seconds;
    session.status = GameStatus::Paused;
    session.pending_timeout = None;
    session.winner = None;
    log::debug!(
        "Session {}: undo, {} step(s) left",
        session.id,
        session.undo_history.len()
    );
    Ok(())
}
