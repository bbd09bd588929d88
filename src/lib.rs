//! Multi-player game clock: library with models, clock logic, rankings and storage.

pub mod logic;
pub mod models;
pub mod providers;
pub mod storage;

pub use logic::ranking::{
    add_record, canonical_name, clear_all, create_record, export_csv, signature, standings,
    RecordOutcome,
};
pub use logic::time::{
    apply_delta, format_time, format_time_detailed, parse_time_to_seconds, rounds_for_display,
    warning_volume,
};
pub use logic::{
    adjust_bulk_time, adjust_individual_time, advance_turn, cancel_reset, conclude_game,
    confirm_reset, discard_completed_game, initialize, manual_end, pause, record_player_action,
    request_reset, resolve_timeout, resume, save_completed_game, tick, toggle_pause, undo,
    SaveRequest, TickOutcome,
};
pub use models::{
    ClockError, ClockEvent, ClockRules, GameCompletion, GameRecord, GameSession, GameSettings,
    GameStatus, MatchGroup, PlayerConfig, PlayerId, PlayerState, RecordedPlayer, SessionId,
    SettingsError, Standing, TimeoutDecision, UndoEntry,
};
pub use providers::{FixedClock, IdSource, RandomIds, SequentialIds, SystemClock, TimeSource};
pub use storage::{load_rankings, save_rankings, FileStore, KeyValueStore, MemoryStore, StoreError};
