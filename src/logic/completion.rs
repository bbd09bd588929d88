//! Leaving a game: reset confirmation, and saving or discarding a concluded game.

use crate::logic::ranking::{add_record, create_record, RecordOutcome};
use crate::models::{ClockError, GameRecord, GameSession, GameStatus, MatchGroup, PlayerId};
use crate::providers::{IdSource, TimeSource};

/// Open the reset confirmation. The clock is paused while it is up.
pub fn request_reset(session: &mut GameSession) -> Result<(), ClockError> {
    if !session.in_progress() {
        return Err(ClockError::NotInProgress);
    }
    session.stop_warning();
    session.status = GameStatus::Paused;
    session.reset_requested = true;
    Ok(())
}

/// Close the reset confirmation. The game stays paused.
pub fn cancel_reset(session: &mut GameSession) -> Result<(), ClockError> {
    if !session.reset_requested {
        return Err(ClockError::NoPendingReset);
    }
    session.reset_requested = false;
    Ok(())
}

/// Throw the game away (nothing is recorded) and go back to setup.
pub fn confirm_reset(session: &mut GameSession) -> Result<(), ClockError> {
    if !session.reset_requested {
        return Err(ClockError::NoPendingReset);
    }
    log::info!("Session {} reset", session.id);
    session.reset();
    Ok(())
}

/// Labels a person attaches to a finished game before saving it.
#[derive(Clone, Debug, Default)]
pub struct SaveRequest {
    pub name: Option<String>,
    pub note: Option<String>,
    /// Winner picked by hand. Only used when the game was ended manually.
    pub winner_id: Option<PlayerId>,
}

/// Record a concluded game in `groups` and reset the session to setup.
///
/// A natural ending keeps its winner; a manual ending uses `request.winner_id`, which must be
/// one of the eligible players (or None for no winner). Persisting `groups` is up to the caller.
pub fn save_completed_game(
    session: &mut GameSession,
    groups: &mut Vec<MatchGroup>,
    request: &SaveRequest,
    ids: &dyn IdSource,
    clock: &dyn TimeSource,
) -> Result<GameRecord, ClockError> {
    let completion = match (&session.completion, session.status) {
        (Some(c), GameStatus::Completing) => c,
        _ => return Err(ClockError::NotCompleting),
    };

    let winner_name = if completion.manually_ended {
        match request.winner_id {
            Some(id) => {
                let chosen = completion.player(id).ok_or(ClockError::PlayerNotFound(id))?;
                if !completion.eligible_winners().any(|p| p.id == id) {
                    return Err(ClockError::PlayerEliminated(id));
                }
                Some(chosen.name.as_str())
            }
            None => None,
        }
    } else {
        completion
            .winner
            .and_then(|id| completion.player(id))
            .map(|p| p.name.as_str())
    };

    let record = create_record(
        RecordOutcome {
            players: &completion.players,
            winner_name,
            name: request.name.as_deref(),
            note: request.note.as_deref(),
            duration_seconds: completion.duration_seconds,
            rounds: completion.rounds,
        },
        ids,
        clock,
    );
    add_record(groups, record.clone(), ids);
    log::info!("Session {}: game saved as record {}", session.id, record.id);
    session.reset();
    Ok(record)
}

/// Drop a concluded game without recording it and reset the session to setup.
pub fn discard_completed_game(session: &mut GameSession) -> Result<(), ClockError> {
    if session.status != GameStatus::Completing {
        return Err(ClockError::NotCompleting);
    }
    log::info!("Session {}: finished game discarded", session.id);
    session.reset();
    Ok(())
}
