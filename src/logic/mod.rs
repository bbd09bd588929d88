//! Game clock logic: turns, ticking, undo, completion, ranking, time helpers.

mod completion;
pub mod ranking;
pub mod time;
mod timing;
mod turns;
mod undo;

pub use completion::{
    cancel_reset, confirm_reset, discard_completed_game, request_reset, save_completed_game,
    SaveRequest,
};
pub use timing::{
    adjust_bulk_time, adjust_individual_time, pause, resolve_timeout, resume, tick, toggle_pause,
    TickOutcome,
};
pub use turns::{advance_turn, conclude_game, initialize, manual_end, record_player_action};
pub use undo::undo;
