//! Turn rotation: starting a game, completing turns, concluding.

use crate::models::{
    ClockError, ClockEvent, GameCompletion, GameSession, GameSettings, GameStatus, PlayerId,
    PlayerState,
};

/// Start a game from `settings`: fresh player clocks, round 1, empty history, first player active.
///
/// Settings are expected to be validated by the caller (see `GameSettings::validate`).
pub fn initialize(session: &mut GameSession, settings: &GameSettings) {
    session.reset();
    session.players = settings.players.iter().map(PlayerState::from_config).collect();
    session.increment_per_move = settings.increment_per_move;
    session.active_index = session.first_active_index();
    session.status = GameStatus::Playing;
    log::info!(
        "Session {} started with {} players (increment {}s)",
        session.id,
        session.players.len(),
        session.increment_per_move
    );
}

/// Pass the turn to the next remaining player.
///
/// With no remaining players the game ends in a draw; with one it ends with that player as
/// winner. Otherwise the next remaining player after the current one becomes active, and the
/// round advances when the rotation wraps back to the first remaining player.
pub fn advance_turn(session: &mut GameSession) {
    let Some(current) = session.active_index else {
        return;
    };
    if session.players.is_empty() {
        return;
    }

    let remaining: Vec<PlayerId> = session
        .players
        .iter()
        .filter(|p| p.is_active())
        .map(|p| p.id)
        .collect();
    match remaining.as_slice() {
        [] => {
            session.active_index = None;
            conclude_game(session, None, false);
            return;
        }
        [sole] => {
            let sole = *sole;
            session.active_index = None;
            conclude_game(session, Some(sole), false);
            return;
        }
        _ => {}
    }

    let len = session.players.len();
    let Some(next) = (1..=len)
        .map(|step| (current + step) % len)
        .find(|&i| session.players[i].is_active())
    else {
        return;
    };

    let wrapped = next <= current;
    if wrapped && Some(next) == session.first_active_index() && session.status == GameStatus::Playing {
        session.round += 1;
        log::debug!("Session {} entering round {}", session.id, session.round);
    }
    session.active_index = Some(next);
}

/// The active player finished their move: snapshot for undo, credit the increment, pass the turn.
pub fn record_player_action(session: &mut GameSession) -> Result<(), ClockError> {
    if session.is_blocked() {
        return Err(ClockError::Blocked);
    }
    if session.status != GameStatus::Playing {
        return Err(ClockError::NotPlaying);
    }
    let Some(current) = session.active_index else {
        return Err(ClockError::NotPlaying);
    };

    session.push_undo();
    session.stop_warning();
    let increment = session.increment_per_move;
    if let Some(player) = session.players.get_mut(current).filter(|p| p.is_active()) {
        player.remaining_seconds = player.remaining_seconds.saturating_add(increment);
    }
    advance_turn(session);
    Ok(())
}

/// End the game and freeze the result for the ranking step. Only save or discard leave this state.
pub fn conclude_game(session: &mut GameSession, winner: Option<PlayerId>, manually_ended: bool) {
    session.stop_warning();
    session.status = GameStatus::Completing;
    session.pending_timeout = None;
    session.reset_requested = false;
    session.winner = winner;
    session.completion = Some(GameCompletion {
        players: session.players.clone(),
        winner,
        manually_ended,
        duration_seconds: session.elapsed_seconds,
        rounds: session.round,
    });
    session.emit(ClockEvent::CompletionChime);

    match winner.and_then(|id| session.player(id)) {
        Some(p) => log::info!("Session {} concluded, winner {}", session.id, p.name),
        None if manually_ended => log::info!("Session {} ended manually", session.id),
        None => log::info!("Session {} concluded without a winner", session.id),
    }
}

/// Stop the game by hand. The winner, if any, is picked when the result is saved.
pub fn manual_end(session: &mut GameSession) -> Result<(), ClockError> {
    if !session.in_progress() {
        return Err(ClockError::NotInProgress);
    }
    session.status = GameStatus::Paused;
    conclude_game(session, None, true);
    Ok(())
}
