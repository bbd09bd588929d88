//! Integration tests for record creation, grouping by player set, standings and CSV export.

use chrono::{DateTime, Duration, Utc};
use game_clock_web::{
    add_record, clear_all, create_record, export_csv, signature, standings, FixedClock,
    GameRecord, MatchGroup, PlayerState, RecordOutcome, SequentialIds, TimeSource,
};
use uuid::Uuid;

fn clock() -> FixedClock {
    FixedClock::at(DateTime::<Utc>::from_timestamp(1_700_000_000, 0).unwrap())
}

fn players(names: &[&str]) -> Vec<PlayerState> {
    names
        .iter()
        .enumerate()
        .map(|(i, name)| PlayerState {
            id: Uuid::from_u128(100 + i as u128),
            name: name.to_string(),
            remaining_seconds: 60 * (i as u32 + 1),
            eliminated: false,
        })
        .collect()
}

fn record(
    names: &[&str],
    winner: Option<&str>,
    ids: &SequentialIds,
    clock: &FixedClock,
) -> GameRecord {
    let players = players(names);
    create_record(
        RecordOutcome {
            players: &players,
            winner_name: winner,
            name: None,
            note: None,
            duration_seconds: 300,
            rounds: 4,
        },
        ids,
        clock,
    )
}

#[test]
fn signature_ignores_case_whitespace_and_order() {
    assert_eq!(signature(&["Bob", "Alice"]), "alice|bob");
    assert_eq!(signature(&["alice", "bob"]), "alice|bob");
    assert_eq!(signature(&["  BOB ", "Alice"]), signature(&["alice", "bob"]));
    assert_ne!(signature(&["Alice", "Bob", "Carol"]), signature(&["Alice", "Bob"]));
}

#[test]
fn create_record_copies_final_clocks_and_normalizes_labels() {
    let ids = SequentialIds::new();
    let clock = clock();
    let players = players(&["Alice", "Bob"]);
    let r = create_record(
        RecordOutcome {
            players: &players,
            winner_name: Some("Bob"),
            name: Some("   "),
            note: Some("  close one "),
            duration_seconds: 754,
            rounds: 12,
        },
        &ids,
        &clock,
    );
    assert_eq!(r.id, Uuid::from_u128(1));
    assert_eq!(r.name, None);
    assert_eq!(r.note.as_deref(), Some("close one"));
    assert_eq!(r.winner_name.as_deref(), Some("Bob"));
    assert_eq!(r.played_at, clock.now());
    assert_eq!(r.players.len(), 2);
    assert_eq!(r.players[1].name, "Bob");
    assert_eq!(r.players[1].final_seconds, 120);
    assert_eq!(r.duration_seconds, 754);
    assert_eq!(r.rounds, 12);
}

#[test]
fn same_player_set_lands_in_one_group_newest_first() {
    let ids = SequentialIds::new();
    let clock = clock();
    let mut groups: Vec<MatchGroup> = Vec::new();

    let first = record(&["Alice", "bob "], Some("Alice"), &ids, &clock);
    add_record(&mut groups, first.clone(), &ids);
    clock.advance(Duration::minutes(30));
    let second = record(&["BOB", "  alice"], None, &ids, &clock);
    add_record(&mut groups, second.clone(), &ids);

    assert_eq!(groups.len(), 1);
    let g = &groups[0];
    assert_eq!(g.signature, "alice|bob");
    assert_eq!(g.display_names, vec!["Alice".to_string(), "bob ".to_string()]);
    assert_eq!(g.records.len(), 2);
    assert_eq!(g.records[0].id, second.id);
    assert_eq!(g.records[1].id, first.id);
}

#[test]
fn different_player_sets_get_separate_groups_sorted_by_names() {
    let ids = SequentialIds::new();
    let clock = clock();
    let mut groups = Vec::new();
    add_record(&mut groups, record(&["Zed", "Yan"], None, &ids, &clock), &ids);
    add_record(&mut groups, record(&["bo", "Amy"], None, &ids, &clock), &ids);
    add_record(&mut groups, record(&["Amy", "Bo", "Cy"], None, &ids, &clock), &ids);

    assert_eq!(groups.len(), 3);
    let names: Vec<String> = groups.iter().map(|g| g.display_names.join(",")).collect();
    assert_eq!(names, vec!["Amy,bo", "Amy,Bo,Cy", "Yan,Zed"]);
}

#[test]
fn records_sorted_by_timestamp_even_when_added_out_of_order() {
    let ids = SequentialIds::new();
    let clock = clock();
    let mut groups = Vec::new();
    clock.advance(Duration::hours(2));
    let late = record(&["A", "B"], None, &ids, &clock);
    let early = GameRecord {
        played_at: late.played_at - Duration::hours(1),
        id: Uuid::from_u128(500),
        ..late.clone()
    };
    add_record(&mut groups, late.clone(), &ids);
    add_record(&mut groups, early.clone(), &ids);
    assert_eq!(groups[0].records[0].id, late.id);
    assert_eq!(groups[0].records[1].id, early.id);
}

#[test]
fn standings_count_wins_case_insensitively() {
    let ids = SequentialIds::new();
    let clock = clock();
    let mut groups = Vec::new();
    for winner in [Some("alice "), Some("Bob"), Some("ALICE"), None] {
        add_record(&mut groups, record(&["Alice", "Bob", "Carol"], winner, &ids, &clock), &ids);
    }
    let table = standings(&groups[0]);
    let rows: Vec<(&str, u32)> = table.iter().map(|s| (s.name.as_str(), s.wins)).collect();
    assert_eq!(rows, vec![("Alice", 2), ("Bob", 1), ("Carol", 0)]);
}

#[test]
fn standings_ties_are_alphabetical() {
    let ids = SequentialIds::new();
    let clock = clock();
    let mut groups = Vec::new();
    add_record(&mut groups, record(&["Zoe", "Max"], Some("Zoe"), &ids, &clock), &ids);
    add_record(&mut groups, record(&["Zoe", "Max"], Some("max"), &ids, &clock), &ids);
    let table = standings(&groups[0]);
    assert_eq!(table[0].name, "Max");
    assert_eq!(table[1].name, "Zoe");
    assert!(table.iter().all(|s| s.wins == 1));
}

#[test]
fn clear_all_empties_the_collection() {
    let ids = SequentialIds::new();
    let clock = clock();
    let mut groups = Vec::new();
    add_record(&mut groups, record(&["A", "B"], None, &ids, &clock), &ids);
    clear_all(&mut groups);
    assert!(groups.is_empty());
}

#[test]
fn csv_export_has_one_row_per_record() {
    let ids = SequentialIds::new();
    let clock = clock();
    let mut groups = Vec::new();
    add_record(&mut groups, record(&["Alice", "Bob"], Some("Bob"), &ids, &clock), &ids);
    add_record(&mut groups, record(&["Alice", "Bob"], None, &ids, &clock), &ids);
    add_record(&mut groups, record(&["Cy", "Di"], Some("Cy"), &ids, &clock), &ids);

    let csv = export_csv(&groups).unwrap();
    let lines: Vec<&str> = csv.lines().collect();
    assert_eq!(lines.len(), 4);
    assert_eq!(lines[0], "group,record_id,played_at,name,winner,duration,rounds,players,note");
    assert!(lines[1].contains("Bob"));
    assert!(lines[1].contains("05:00"));
    assert!(lines[1].contains(",3,"));
    assert!(lines[1].contains("Alice (01:00); Bob (02:00)"));
}

#[test]
fn csv_export_shows_first_lap_games_as_zero_rounds() {
    let ids = SequentialIds::new();
    let clock = clock();
    let players = players(&["Alice", "Bob"]);
    let quick = create_record(
        RecordOutcome {
            players: &players,
            winner_name: None,
            name: None,
            note: None,
            duration_seconds: 42,
            rounds: 1,
        },
        &ids,
        &clock,
    );
    let mut groups = Vec::new();
    add_record(&mut groups, quick, &ids);
    let csv = export_csv(&groups).unwrap();
    let row = csv.lines().nth(1).unwrap();
    assert!(row.contains(",00:42,0,"));
}
