//! Integration tests for ticking down to zero and settling the timeout.

use game_clock_web::{
    adjust_bulk_time, manual_end, pause, record_player_action, resolve_timeout, tick, undo,
    ClockError, ClockEvent, ClockRules, GameSession, GameSettings, GameStatus, PlayerConfig,
    SequentialIds, TickOutcome, TimeoutDecision,
};
use uuid::Uuid;

fn started(players: &[(&str, u32)], increment: u32) -> GameSession {
    let players: Vec<PlayerConfig> = players
        .iter()
        .enumerate()
        .map(|(i, (name, secs))| {
            PlayerConfig::new(Uuid::from_u128(i as u128 + 1), *name, secs / 60, secs % 60)
        })
        .collect();
    let settings = GameSettings {
        num_players: players.len(),
        players,
        increment_per_move: increment,
    };
    GameSession::start(&settings, ClockRules::default(), &SequentialIds::new())
}

#[test]
fn two_player_game_ends_when_second_player_flags() {
    let mut s = started(&[("A", 10), ("B", 10)], 0);
    let (a, b) = (s.players[0].id, s.players[1].id);

    record_player_action(&mut s).unwrap();
    assert_eq!(s.players[0].remaining_seconds, 10);
    assert_eq!(s.active_index, Some(1));

    for _ in 0..9 {
        assert!(matches!(tick(&mut s), TickOutcome::Ticked { .. }));
    }
    assert_eq!(s.players[1].remaining_seconds, 1);
    assert_eq!(s.pending_timeout, None);

    assert_eq!(tick(&mut s), TickOutcome::TimedOut { player_id: b });
    assert_eq!(s.players[1].remaining_seconds, 0);
    assert_eq!(s.status, GameStatus::Paused);
    assert_eq!(s.pending_timeout, Some(b));

    resolve_timeout(&mut s, TimeoutDecision::Eliminate).unwrap();
    assert_eq!(s.status, GameStatus::Completing);
    assert_eq!(s.winner, Some(a));
    assert!(s.players[1].eliminated);
    let completion = s.completion.as_ref().unwrap();
    assert_eq!(completion.winner, Some(a));
    assert_eq!(completion.duration_seconds, 9);
}

#[test]
fn no_clock_moves_while_timeout_is_pending() {
    let mut s = started(&[("A", 2), ("B", 30)], 0);
    tick(&mut s);
    tick(&mut s);
    assert!(s.pending_timeout.is_some());
    let elapsed = s.elapsed_seconds;
    for _ in 0..5 {
        assert_eq!(tick(&mut s), TickOutcome::Idle);
    }
    assert_eq!(s.players[0].remaining_seconds, 0);
    assert_eq!(s.players[1].remaining_seconds, 30);
    assert_eq!(s.elapsed_seconds, elapsed);
}

#[test]
fn remaining_time_never_goes_negative() {
    let mut s = started(&[("A", 3), ("B", 3)], 0);
    for _ in 0..20 {
        tick(&mut s);
        // Keep the clock running past the flag.
        if s.pending_timeout.is_some() {
            s.pending_timeout = None;
            s.status = GameStatus::Playing;
        }
    }
    assert_eq!(s.players[0].remaining_seconds, 0);
}

#[test]
fn clock_already_at_zero_flags_on_next_tick() {
    let mut s = started(&[("A", 20), ("B", 40)], 0);
    adjust_bulk_time(&mut s, -30).unwrap();
    assert_eq!(s.players[0].remaining_seconds, 0);
    assert_eq!(s.players[1].remaining_seconds, 10);
    let a = s.players[0].id;
    assert_eq!(tick(&mut s), TickOutcome::TimedOut { player_id: a });
}

#[test]
fn eliminate_with_players_left_resumes_with_next_player() {
    let mut s = started(&[("A", 1), ("B", 30), ("C", 30)], 0);
    tick(&mut s);
    assert!(s.pending_timeout.is_some());
    resolve_timeout(&mut s, TimeoutDecision::Eliminate).unwrap();
    assert_eq!(s.status, GameStatus::Playing);
    assert_eq!(s.pending_timeout, None);
    assert!(s.players[0].eliminated);
    assert_eq!(s.players[0].remaining_seconds, 0);
    assert_eq!(s.active_index, Some(1));
    assert_eq!(s.round, 1);
}

#[test]
fn eliminate_last_in_order_wraps_to_next_round() {
    let mut s = started(&[("A", 30), ("B", 30), ("C", 1)], 0);
    record_player_action(&mut s).unwrap();
    record_player_action(&mut s).unwrap();
    tick(&mut s);
    resolve_timeout(&mut s, TimeoutDecision::Eliminate).unwrap();
    assert_eq!(s.active_index, Some(0));
    assert_eq!(s.round, 2);
}

#[test]
fn extra_time_goes_to_everyone_left_and_same_player_continues() {
    let mut s = started(&[("A", 50), ("B", 1), ("C", 70)], 0);
    s.players[2].eliminate();
    record_player_action(&mut s).unwrap();
    tick(&mut s);
    assert_eq!(s.pending_timeout, Some(s.players[1].id));

    resolve_timeout(&mut s, TimeoutDecision::GrantExtraTime).unwrap();
    assert_eq!(s.status, GameStatus::Playing);
    assert_eq!(s.pending_timeout, None);
    assert_eq!(s.active_index, Some(1));
    assert_eq!(s.players[0].remaining_seconds, 650);
    assert_eq!(s.players[1].remaining_seconds, 600);
    assert_eq!(s.players[2].remaining_seconds, 0);
}

#[test]
fn resolve_without_pending_timeout_is_ignored() {
    let mut s = started(&[("A", 50), ("B", 50)], 0);
    assert_eq!(
        resolve_timeout(&mut s, TimeoutDecision::GrantExtraTime),
        Err(ClockError::NoPendingTimeout)
    );
    assert_eq!(s.players[0].remaining_seconds, 50);
}

#[test]
fn pending_timeout_blocks_other_commands() {
    let mut s = started(&[("A", 1), ("B", 50)], 0);
    record_player_action(&mut s).unwrap();
    s.active_index = Some(0);
    tick(&mut s);
    assert_eq!(record_player_action(&mut s), Err(ClockError::Blocked));
    assert_eq!(pause(&mut s), Err(ClockError::Blocked));
    assert_eq!(undo(&mut s), Err(ClockError::Blocked));
    assert_eq!(adjust_bulk_time(&mut s, 30), Err(ClockError::Blocked));
    assert_eq!(s.undo_history.len(), 1);
    assert_eq!(s.players[1].remaining_seconds, 50);
}

#[test]
fn manual_end_during_timeout_clears_the_decision() {
    let mut s = started(&[("A", 1), ("B", 50)], 0);
    tick(&mut s);
    manual_end(&mut s).unwrap();
    assert_eq!(s.status, GameStatus::Completing);
    assert_eq!(s.pending_timeout, None);
}

#[test]
fn warning_cue_grows_louder_and_stops_on_pause() {
    let mut s = started(&[("A", 12), ("B", 50)], 0);
    tick(&mut s);
    assert!(s.drain_events().is_empty());

    tick(&mut s);
    let events = s.drain_events();
    match events.as_slice() {
        [ClockEvent::WarningCue { volume, .. }] => assert!((volume - 0.2).abs() < 1e-6),
        other => panic!("unexpected events: {:?}", other),
    }

    for _ in 0..9 {
        tick(&mut s);
    }
    assert_eq!(s.players[0].remaining_seconds, 1);
    match s.drain_events().last() {
        Some(ClockEvent::WarningCue { volume, .. }) => assert!((volume - 1.0).abs() < 1e-6),
        other => panic!("unexpected event: {:?}", other),
    }

    pause(&mut s).unwrap();
    assert_eq!(s.drain_events(), vec![ClockEvent::WarningStopped]);
}

#[test]
fn timeout_fires_alarm_and_conclusion_fires_chime() {
    let mut s = started(&[("A", 1), ("B", 50)], 0);
    let a = s.players[0].id;
    tick(&mut s);
    assert_eq!(s.drain_events(), vec![ClockEvent::TimeoutAlarm { player_id: a }]);
    resolve_timeout(&mut s, TimeoutDecision::Eliminate).unwrap();
    assert_eq!(s.drain_events(), vec![ClockEvent::CompletionChime]);
}
