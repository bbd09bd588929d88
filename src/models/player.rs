//! PlayerConfig (setup form entry) and PlayerState (live clock of one player).

use crate::logic::time::parse_time_to_seconds;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a player (stable from setup through the saved record).
pub type PlayerId = Uuid;

/// One player as entered during setup. Mutable until the game starts.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct PlayerConfig {
    #[serde(default = "Uuid::new_v4")]
    pub id: PlayerId,
    pub name: String,
    #[serde(default)]
    pub starting_minutes: u32,
    #[serde(default)]
    pub starting_seconds: u32,
}

impl PlayerConfig {
    pub fn new(id: PlayerId, name: impl Into<String>, starting_minutes: u32, starting_seconds: u32) -> Self {
        Self {
            id,
            name: name.into(),
            starting_minutes,
            starting_seconds,
        }
    }

    /// Starting time on the clock, in seconds.
    pub fn total_seconds(&self) -> u32 {
        parse_time_to_seconds(self.starting_minutes, self.starting_seconds)
    }
}

/// Live clock of one player during a session.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct PlayerState {
    pub id: PlayerId,
    pub name: String,
    /// Seconds left on the clock; increments are added here after each completed turn.
    pub remaining_seconds: u32,
    /// Flips to true once, on elimination after a timeout.
    pub eliminated: bool,
}

impl PlayerState {
    pub fn from_config(config: &PlayerConfig) -> Self {
        Self {
            id: config.id,
            name: config.name.clone(),
            remaining_seconds: config.total_seconds(),
            eliminated: false,
        }
    }

    pub fn is_active(&self) -> bool {
        !self.eliminated
    }

    /// Remove the player from the rotation. Their clock is forced to zero.
    pub fn eliminate(&mut self) {
        self.eliminated = true;
        self.remaining_seconds = 0;
    }
}
