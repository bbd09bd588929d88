//! Data structures for the game clock: players, settings, the live session, saved records.

mod player;
mod record;
mod session;
mod settings;

pub use player::{PlayerConfig, PlayerId, PlayerState};
pub use record::{GameRecord, GroupId, MatchGroup, RecordId, RecordedPlayer, Standing};
pub use session::{
    ClockError, ClockEvent, GameCompletion, GameSession, GameStatus, SessionId, TimeoutDecision,
    UndoEntry,
};
pub use settings::{
    ClockRules, GameSettings, SettingsError, MAX_INCREMENT_SECONDS, MAX_NAME_LEN, MAX_PLAYERS,
    MAX_STARTING_MINUTES, MAX_STARTING_SECONDS, MIN_PLAYERS,
};
