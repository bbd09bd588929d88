//! GameSettings (what the setup form produces) and ClockRules (fixed clock constants).

use crate::models::player::PlayerConfig;
use crate::providers::IdSource;
use serde::{Deserialize, Serialize};

pub const MIN_PLAYERS: usize = 2;
pub const MAX_PLAYERS: usize = 8;
pub const MAX_NAME_LEN: usize = 20;
pub const MAX_STARTING_MINUTES: u32 = 999;
pub const MAX_STARTING_SECONDS: u32 = 59;
/// Increment is capped at 5 minutes.
pub const MAX_INCREMENT_SECONDS: u32 = 300;

const DEFAULT_PLAYER_COUNT: usize = 3;
const DEFAULT_STARTING_MINUTES: u32 = 10;
const DEFAULT_INCREMENT_SECONDS: u32 = 5;

/// Errors reported by [`GameSettings::validate`]. Invalid settings never reach `initialize`.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum SettingsError {
    /// Player count outside 2..=8.
    PlayerCountOutOfRange(usize),
    /// `num_players` disagrees with the number of configured players.
    PlayerCountMismatch { declared: usize, configured: usize },
    /// Player at this position has an empty (or whitespace-only) name.
    BlankName(usize),
    /// Player at this position has a name longer than 20 characters.
    NameTooLong(usize),
    /// Minutes or seconds out of range for the player at this position.
    StartingTimeOutOfRange(usize),
    /// Increment above the 300 second cap.
    IncrementOutOfRange(u32),
    /// Player at this position starts with no time and there is no increment to give them any.
    NoTime(usize),
}

impl std::fmt::Display for SettingsError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SettingsError::PlayerCountOutOfRange(n) => {
                write!(f, "Need between {} and {} players (got {})", MIN_PLAYERS, MAX_PLAYERS, n)
            }
            SettingsError::PlayerCountMismatch { declared, configured } => write!(
                f,
                "Player count is {} but {} players are configured",
                declared, configured
            ),
            SettingsError::BlankName(i) => write!(f, "Player {} needs a name", i + 1),
            SettingsError::NameTooLong(i) => {
                write!(f, "Name of player {} is longer than {} characters", i + 1, MAX_NAME_LEN)
            }
            SettingsError::StartingTimeOutOfRange(i) => write!(
                f,
                "Starting time of player {} must be at most {}:{}",
                i + 1,
                MAX_STARTING_MINUTES,
                MAX_STARTING_SECONDS
            ),
            SettingsError::IncrementOutOfRange(s) => {
                write!(f, "Increment must be at most {} seconds (got {})", MAX_INCREMENT_SECONDS, s)
            }
            SettingsError::NoTime(i) => write!(
                f,
                "Player {} has no starting time and there is no increment",
                i + 1
            ),
        }
    }
}

/// Everything the setup form hands to `initialize`.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct GameSettings {
    pub num_players: usize,
    /// Turn order is the order of this list.
    pub players: Vec<PlayerConfig>,
    /// Seconds credited to a player right after they complete a turn.
    #[serde(default)]
    pub increment_per_move: u32,
}

impl GameSettings {
    /// Default form: three players with 10 minutes each and a 5 second increment.
    pub fn with_defaults(ids: &dyn IdSource) -> Self {
        let players = (0..DEFAULT_PLAYER_COUNT)
            .map(|i| default_player(i, ids))
            .collect();
        Self {
            num_players: DEFAULT_PLAYER_COUNT,
            players,
            increment_per_move: DEFAULT_INCREMENT_SECONDS,
        }
    }

    /// Change the player count. Existing entries are kept; new slots get default names and times.
    pub fn resize_players(&mut self, count: usize, ids: &dyn IdSource) {
        if count < self.players.len() {
            self.players.truncate(count);
        }
        while self.players.len() < count {
            let i = self.players.len();
            self.players.push(default_player(i, ids));
        }
        self.num_players = count;
    }

    /// Check the form before a game can start.
    pub fn validate(&self) -> Result<(), SettingsError> {
        let n = self.players.len();
        if !(MIN_PLAYERS..=MAX_PLAYERS).contains(&n) {
            return Err(SettingsError::PlayerCountOutOfRange(n));
        }
        if self.num_players != n {
            return Err(SettingsError::PlayerCountMismatch {
                declared: self.num_players,
                configured: n,
            });
        }
        if self.increment_per_move > MAX_INCREMENT_SECONDS {
            return Err(SettingsError::IncrementOutOfRange(self.increment_per_move));
        }
        for (i, p) in self.players.iter().enumerate() {
            let name = p.name.trim();
            if name.is_empty() {
                return Err(SettingsError::BlankName(i));
            }
            if p.name.chars().count() > MAX_NAME_LEN {
                return Err(SettingsError::NameTooLong(i));
            }
            if p.starting_minutes > MAX_STARTING_MINUTES || p.starting_seconds > MAX_STARTING_SECONDS {
                return Err(SettingsError::StartingTimeOutOfRange(i));
            }
            if p.total_seconds() == 0 && self.increment_per_move == 0 {
                return Err(SettingsError::NoTime(i));
            }
        }
        Ok(())
    }
}

fn default_player(index: usize, ids: &dyn IdSource) -> PlayerConfig {
    PlayerConfig::new(
        ids.next_id(),
        format!("Player {}", index + 1),
        DEFAULT_STARTING_MINUTES,
        0,
    )
}

/// Fixed amounts used by the clock. Defaults match the tabletop app behaviour.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ClockRules {
    /// Seconds given to every remaining player when a timeout is resolved with extra time.
    pub extra_time_on_timeout: u32,
    /// Step used by the "add/remove time for everyone" controls.
    pub bulk_adjustment: u32,
    /// Step used by the per-player +/- controls while paused.
    pub individual_adjustment: u32,
    /// The low-time warning plays at or below this many seconds.
    pub warning_threshold: u32,
    /// Quietest warning volume, as a fraction of full volume.
    pub min_warning_volume: f32,
    /// Maximum depth of the undo history.
    pub undo_capacity: usize,
}

impl Default for ClockRules {
    fn default() -> Self {
        Self {
            extra_time_on_timeout: 600,
            bulk_adjustment: 30,
            individual_adjustment: 30,
            warning_threshold: 10,
            min_warning_volume: 0.2,
            undo_capacity: 10,
        }
    }
}
