//! Clock ticking, pause/resume, timeout decisions and manual time adjustments.

use crate::logic::time::{apply_delta, warning_volume};
use crate::logic::turns::{advance_turn, conclude_game};
use crate::models::{ClockError, ClockEvent, GameSession, GameStatus, PlayerId, TimeoutDecision};
use serde::Serialize;

/// What one tick did.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum TickOutcome {
    /// Clock not running (paused, blocked, setup or concluded). Nothing changed.
    Idle,
    /// One second came off the active player's clock.
    Ticked { player_id: PlayerId, remaining: u32 },
    /// Active player's clock hit zero; the session is paused awaiting a decision.
    TimedOut { player_id: PlayerId },
}

/// Advance the clock by one second. Driven once per second by the caller.
///
/// The active player loses a second; reaching zero pauses the game and raises a pending
/// timeout. Elapsed game time moves in step, except on the tick that times a player out.
/// There is no grace second at 00:00: the tick that reaches zero is the one that flags.
pub fn tick(session: &mut GameSession) -> TickOutcome {
    if session.status != GameStatus::Playing || session.is_blocked() {
        return TickOutcome::Idle;
    }
    let Some(index) = session.active_index else {
        return TickOutcome::Idle;
    };
    let Some(player) = session.players.get_mut(index).filter(|p| p.is_active()) else {
        return TickOutcome::Idle;
    };

    let player_id = player.id;
    player.remaining_seconds = player.remaining_seconds.saturating_sub(1);
    let remaining = player.remaining_seconds;

    if remaining == 0 {
        session.stop_warning();
        session.status = GameStatus::Paused;
        session.pending_timeout = Some(player_id);
        session.emit(ClockEvent::TimeoutAlarm { player_id });
        log::info!("Session {}: player {} ran out of time", session.id, player_id);
        return TickOutcome::TimedOut { player_id };
    }

    session.elapsed_seconds = session.elapsed_seconds.saturating_add(1);
    match warning_volume(remaining, &session.rules) {
        Some(volume) => {
            session.warning_active = true;
            session.emit(ClockEvent::WarningCue { player_id, volume });
        }
        None => session.stop_warning(),
    }
    TickOutcome::Ticked { player_id, remaining }
}

/// Stop the clock.
pub fn pause(session: &mut GameSession) -> Result<(), ClockError> {
    if session.is_blocked() {
        return Err(ClockError::Blocked);
    }
    if session.status != GameStatus::Playing {
        return Err(ClockError::NotPlaying);
    }
    session.status = GameStatus::Paused;
    session.stop_warning();
    Ok(())
}

/// Restart the clock after a pause.
pub fn resume(session: &mut GameSession) -> Result<(), ClockError> {
    if session.is_blocked() {
        return Err(ClockError::Blocked);
    }
    if session.status != GameStatus::Paused {
        return Err(ClockError::NotPaused);
    }
    session.status = GameStatus::Playing;
    Ok(())
}

/// Pause if running, resume if paused.
pub fn toggle_pause(session: &mut GameSession) -> Result<(), ClockError> {
    match session.status {
        GameStatus::Playing => pause(session),
        _ => resume(session),
    }
}

/// Settle a pending timeout.
///
/// `Eliminate` removes the player; if one or no players remain the game concludes, otherwise
/// play resumes with the next player. `GrantExtraTime` adds the extra-time bonus to every
/// remaining player and the same player continues.
pub fn resolve_timeout(session: &mut GameSession, decision: TimeoutDecision) -> Result<(), ClockError> {
    let Some(timed_out) = session.pending_timeout else {
        return Err(ClockError::NoPendingTimeout);
    };
    session.stop_warning();

    match decision {
        TimeoutDecision::Eliminate => {
            if let Some(p) = session.get_player_mut(timed_out) {
                p.eliminate();
                log::info!("Player {} eliminated", p.name);
            }
            session.pending_timeout = None;

            let mut remaining = session.players.iter().filter(|p| p.is_active());
            let first = remaining.next().map(|p| p.id);
            if remaining.next().is_none() {
                conclude_game(session, first, false);
            } else {
                session.status = GameStatus::Playing;
                advance_turn(session);
            }
        }
        TimeoutDecision::GrantExtraTime => {
            let bonus = session.rules.extra_time_on_timeout;
            for p in session.players.iter_mut().filter(|p| p.is_active()) {
                p.remaining_seconds = p.remaining_seconds.saturating_add(bonus);
            }
            session.pending_timeout = None;
            session.status = GameStatus::Playing;
            log::info!("Session {}: {}s extra time granted to all players", session.id, bonus);
        }
    }
    Ok(())
}

/// Add (or with a negative delta, remove) time for every remaining player. Floors at zero.
pub fn adjust_bulk_time(session: &mut GameSession, delta: i64) -> Result<(), ClockError> {
    if session.is_blocked() {
        return Err(ClockError::Blocked);
    }
    if !session.in_progress() {
        return Err(ClockError::NotInProgress);
    }
    for p in session.players.iter_mut().filter(|p| p.is_active()) {
        p.remaining_seconds = apply_delta(p.remaining_seconds, delta);
    }
    Ok(())
}

/// Adjust one player's clock while paused. Floors at zero.
pub fn adjust_individual_time(
    session: &mut GameSession,
    player_id: PlayerId,
    delta: i64,
) -> Result<(), ClockError> {
    if session.is_blocked() {
        return Err(ClockError::Blocked);
    }
    if session.status != GameStatus::Paused {
        return Err(ClockError::NotPaused);
    }
    let player = session
        .get_player_mut(player_id)
        .ok_or(ClockError::PlayerNotFound(player_id))?;
    if player.eliminated {
        return Err(ClockError::PlayerEliminated(player_id));
    }
    player.remaining_seconds = apply_delta(player.remaining_seconds, delta);
    Ok(())
}
