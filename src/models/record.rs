//! GameRecord (one finished game) and MatchGroup (all games of one player set).

use crate::models::player::PlayerId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a saved game record.
pub type RecordId = Uuid;

/// Unique identifier for a match group.
pub type GroupId = Uuid;

/// A player as stored in a record: name as entered for that game, plus final clock.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct RecordedPlayer {
    pub id: PlayerId,
    pub name: String,
    pub final_seconds: u32,
}

/// One finished game. Immutable once created.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct GameRecord {
    pub id: RecordId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    /// Stored as epoch milliseconds.
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub played_at: DateTime<Utc>,
    pub players: Vec<RecordedPlayer>,
    /// None for a draw or when no winner was picked.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub winner_name: Option<String>,
    pub duration_seconds: u32,
    /// Raw round counter at the end of the game (see `rounds_for_display`).
    pub rounds: u32,
}

/// All records of one set of players, keyed by the canonical signature of their names.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct MatchGroup {
    pub id: GroupId,
    /// Trimmed, lowercased, sorted names joined with `|`.
    pub signature: String,
    /// Names as first entered, in signature order.
    pub display_names: Vec<String>,
    /// Newest first.
    pub records: Vec<GameRecord>,
}

/// Win count of one player within a group (read-time view, never stored).
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Standing {
    pub name: String,
    pub wins: u32,
}
