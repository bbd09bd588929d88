//! Ranking: group finished games by the set of players who played them.

use crate::logic::time::{format_time_detailed, rounds_for_display};
use crate::models::{GameRecord, MatchGroup, PlayerState, RecordedPlayer, Standing};
use crate::providers::{IdSource, TimeSource};
use serde::Serialize;
use std::cmp::Ordering;

/// Joins canonical names in a signature. Not expected to appear in player names.
pub const SIGNATURE_SEPARATOR: &str = "|";

/// Name as used for grouping: trimmed and lowercased.
pub fn canonical_name(name: &str) -> String {
    name.trim().to_lowercase()
}

/// Group key for a set of player names, independent of case, surrounding whitespace and order.
///
/// `["Bob", "Alice"]` and `["alice", " bob"]` both give `"alice|bob"`.
pub fn signature<S: AsRef<str>>(names: &[S]) -> String {
    let mut canonical: Vec<String> = names.iter().map(|n| canonical_name(n.as_ref())).collect();
    canonical.sort();
    canonical.join(SIGNATURE_SEPARATOR)
}

/// Everything needed to write a record for a finished game.
#[derive(Clone, Copy, Debug)]
pub struct RecordOutcome<'a> {
    pub players: &'a [PlayerState],
    pub winner_name: Option<&'a str>,
    pub name: Option<&'a str>,
    pub note: Option<&'a str>,
    pub duration_seconds: u32,
    pub rounds: u32,
}

/// Build an immutable record with a fresh id and the current time. Blank name/note become None.
pub fn create_record(outcome: RecordOutcome<'_>, ids: &dyn IdSource, clock: &dyn TimeSource) -> GameRecord {
    let players = outcome
        .players
        .iter()
        .map(|p| RecordedPlayer {
            id: p.id,
            name: p.name.clone(),
            final_seconds: p.remaining_seconds,
        })
        .collect();
    GameRecord {
        id: ids.next_id(),
        name: non_blank(outcome.name),
        note: non_blank(outcome.note),
        played_at: clock.now(),
        players,
        winner_name: outcome.winner_name.filter(|w| !w.is_empty()).map(str::to_string),
        duration_seconds: outcome.duration_seconds,
        rounds: outcome.rounds,
    }
}

fn non_blank(text: Option<&str>) -> Option<String> {
    text.map(str::trim).filter(|t| !t.is_empty()).map(str::to_string)
}

/// File `record` under the group of its player set, creating the group on first sight.
///
/// Records in a group are kept newest first. New groups take the record's names as display
/// names, and the collection is kept sorted by those names.
pub fn add_record(groups: &mut Vec<MatchGroup>, record: GameRecord, ids: &dyn IdSource) {
    let names: Vec<&str> = record.players.iter().map(|p| p.name.as_str()).collect();
    let sig = signature(&names);

    if let Some(group) = groups.iter_mut().find(|g| g.signature == sig) {
        group.records.push(record);
        group.records.sort_by(|a, b| b.played_at.cmp(&a.played_at));
        return;
    }

    let mut display_names: Vec<String> = names.iter().map(|n| n.to_string()).collect();
    display_names.sort_by_cached_key(|n| canonical_name(n));
    log::info!("New match group: {}", display_names.join(", "));
    groups.push(MatchGroup {
        id: ids.next_id(),
        signature: sig,
        display_names,
        records: vec![record],
    });
    groups.sort_by(|a, b| compare_names(&a.display_names.join(","), &b.display_names.join(",")));
}

/// Forget every group and record.
pub fn clear_all(groups: &mut Vec<MatchGroup>) {
    groups.clear();
}

/// Case-insensitive first, then exact, so ordering is stable across casing.
fn compare_names(a: &str, b: &str) -> Ordering {
    a.to_lowercase().cmp(&b.to_lowercase()).then_with(|| a.cmp(b))
}

/// Wins per display name, most wins first, ties alphabetical.
pub fn standings(group: &MatchGroup) -> Vec<Standing> {
    let mut table: Vec<Standing> = group
        .display_names
        .iter()
        .map(|name| {
            let key = canonical_name(name);
            let wins = group
                .records
                .iter()
                .filter_map(|r| r.winner_name.as_deref())
                .filter(|w| canonical_name(w) == key)
                .count();
            Standing {
                name: name.clone(),
                wins: wins as u32,
            }
        })
        .collect();
    table.sort_by(|a, b| b.wins.cmp(&a.wins).then_with(|| compare_names(&a.name, &b.name)));
    table
}

#[derive(Serialize)]
struct CsvRow<'a> {
    group: String,
    record_id: String,
    played_at: String,
    name: &'a str,
    winner: &'a str,
    duration: String,
    rounds: u32,
    players: String,
    note: &'a str,
}

/// Every record of every group as CSV, one row per game.
pub fn export_csv(groups: &[MatchGroup]) -> Result<String, csv::Error> {
    let mut buf = Vec::new();
    let mut writer = csv::Writer::from_writer(&mut buf);
    for group in groups {
        for record in &group.records {
            let players = record
                .players
                .iter()
                .map(|p| format!("{} ({})", p.name, format_time_detailed(i64::from(p.final_seconds))))
                .collect::<Vec<_>>()
                .join("; ");
            writer.serialize(CsvRow {
                group: group.display_names.join(", "),
                record_id: record.id.to_string(),
                played_at: record.played_at.to_rfc3339(),
                name: record.name.as_deref().unwrap_or(""),
                winner: record.winner_name.as_deref().unwrap_or(""),
                duration: format_time_detailed(i64::from(record.duration_seconds)),
                rounds: rounds_for_display(record.rounds),
                players,
                note: record.note.as_deref().unwrap_or(""),
            })?;
        }
    }
    writer.flush()?;
    drop(writer);
    Ok(String::from_utf8_lossy(&buf).into_owned())
}
