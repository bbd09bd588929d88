//! GameSession: the single aggregate owned by the clock. Status, turn pointer, undo history.

use crate::models::player::{PlayerId, PlayerState};
use crate::models::settings::{ClockRules, GameSettings};
use crate::providers::IdSource;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use uuid::Uuid;

/// Unique identifier for a session.
pub type SessionId = Uuid;

/// Errors returned when a command is not allowed in the current state.
/// The session is left exactly as it was.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum ClockError {
    /// A timeout decision, reset confirmation or completion overlay is pending.
    Blocked,
    /// Command needs a running clock.
    NotPlaying,
    /// Command needs the clock to be paused.
    NotPaused,
    /// Command needs a game in progress (playing or paused).
    NotInProgress,
    /// No timeout is waiting for a decision.
    NoPendingTimeout,
    /// No reset confirmation is open.
    NoPendingReset,
    /// Undo history is empty.
    NothingToUndo,
    /// The game has not concluded yet.
    NotCompleting,
    /// Player not found in this session.
    PlayerNotFound(PlayerId),
    /// Player is eliminated and cannot be adjusted or chosen.
    PlayerEliminated(PlayerId),
}

impl std::fmt::Display for ClockError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ClockError::Blocked => write!(f, "Waiting for a decision; the clock is locked"),
            ClockError::NotPlaying => write!(f, "The clock is not running"),
            ClockError::NotPaused => write!(f, "Pause the clock first"),
            ClockError::NotInProgress => write!(f, "No game in progress"),
            ClockError::NoPendingTimeout => write!(f, "No timeout is waiting for a decision"),
            ClockError::NoPendingReset => write!(f, "No reset is waiting for confirmation"),
            ClockError::NothingToUndo => write!(f, "Nothing to undo"),
            ClockError::NotCompleting => write!(f, "The game has not ended"),
            ClockError::PlayerNotFound(_) => write!(f, "Player not found"),
            ClockError::PlayerEliminated(_) => write!(f, "Player is eliminated"),
        }
    }
}

/// Lifecycle of a session.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GameStatus {
    /// No game; settings are being edited.
    #[default]
    Setup,
    /// Active player's clock is counting down.
    Playing,
    /// Clock stopped (manually, on timeout, after undo, or while a reset is confirmed).
    Paused,
    /// Game over; waiting for the result to be saved or discarded.
    Completing,
}

/// What to do with a player whose clock ran out.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimeoutDecision {
    /// Remove the player from the rotation.
    Eliminate,
    /// Give every remaining player the extra-time bonus; the same player continues.
    GrantExtraTime,
}

/// Snapshot pushed before each completed turn, restored verbatim by undo.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct UndoEntry {
    pub players: Vec<PlayerState>,
    pub active_index: Option<usize>,
    pub round: u32,
    pub elapsed_seconds: u32,
}

/// Frozen result handed to the ranking step when a game concludes.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct GameCompletion {
    pub players: Vec<PlayerState>,
    /// Natural winner (last player standing). None for a draw or a manual ending.
    pub winner: Option<PlayerId>,
    pub manually_ended: bool,
    pub duration_seconds: u32,
    pub rounds: u32,
}

impl GameCompletion {
    /// Players a human may pick as winner after a manual ending.
    pub fn eligible_winners(&self) -> impl Iterator<Item = &PlayerState> {
        self.players
            .iter()
            .filter(|p| !p.eliminated || p.remaining_seconds > 0)
    }

    pub fn player(&self, id: PlayerId) -> Option<&PlayerState> {
        self.players.iter().find(|p| p.id == id)
    }
}

/// Side effects for the cue player (audio). Fire-and-forget; never read back by the clock.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "cue", rename_all = "snake_case")]
pub enum ClockEvent {
    /// Low-time warning loop for the active player; volume is a fraction of full volume.
    WarningCue { player_id: PlayerId, volume: f32 },
    /// The running warning loop was stopped.
    WarningStopped,
    /// A player's clock ran out.
    TimeoutAlarm { player_id: PlayerId },
    /// The game concluded.
    CompletionChime,
}

/// Full session state. Players are kept in turn order.
#[derive(Clone, Debug, Serialize)]
pub struct GameSession {
    pub id: SessionId,
    pub status: GameStatus,
    pub players: Vec<PlayerState>,
    /// Index into `players` of the player whose clock runs. Never points at an eliminated player.
    pub active_index: Option<usize>,
    /// Starts at 1; +1 each time the rotation wraps back to the first remaining player.
    pub round: u32,
    /// Seconds the clock has been running (frozen while paused or blocked).
    pub elapsed_seconds: u32,
    pub increment_per_move: u32,
    /// Player whose clock ran out and who is waiting for a decision.
    pub pending_timeout: Option<PlayerId>,
    /// Reset confirmation overlay is open.
    pub reset_requested: bool,
    /// Declared winner, set on a natural ending.
    pub winner: Option<PlayerId>,
    /// Set while status is Completing.
    pub completion: Option<GameCompletion>,
    /// Newest first, at most `rules.undo_capacity` entries.
    pub undo_history: VecDeque<UndoEntry>,
    pub rules: ClockRules,
    /// Low-time warning loop currently playing.
    pub warning_active: bool,
    #[serde(skip)]
    events: Vec<ClockEvent>,
}

impl GameSession {
    /// Create an empty session in Setup, with an id from `ids`.
    pub fn new(rules: ClockRules, ids: &dyn IdSource) -> Self {
        Self::with_id(ids.next_id(), rules)
    }

    fn with_id(id: SessionId, rules: ClockRules) -> Self {
        Self {
            id,
            status: GameStatus::Setup,
            players: Vec::new(),
            active_index: None,
            round: 1,
            elapsed_seconds: 0,
            increment_per_move: 0,
            pending_timeout: None,
            reset_requested: false,
            winner: None,
            completion: None,
            undo_history: VecDeque::new(),
            rules,
            warning_active: false,
            events: Vec::new(),
        }
    }

    /// Create a session and immediately start it from `settings`.
    pub fn start(settings: &GameSettings, rules: ClockRules, ids: &dyn IdSource) -> Self {
        let mut session = Self::new(rules, ids);
        crate::logic::initialize(&mut session, settings);
        session
    }

    pub fn active_player(&self) -> Option<&PlayerState> {
        self.active_index.and_then(|i| self.players.get(i))
    }

    pub fn player(&self, id: PlayerId) -> Option<&PlayerState> {
        self.players.iter().find(|p| p.id == id)
    }

    pub fn get_player_mut(&mut self, id: PlayerId) -> Option<&mut PlayerState> {
        self.players.iter_mut().find(|p| p.id == id)
    }

    /// Number of players still in the rotation.
    pub fn active_count(&self) -> usize {
        self.players.iter().filter(|p| p.is_active()).count()
    }

    pub fn first_active_index(&self) -> Option<usize> {
        self.players.iter().position(|p| p.is_active())
    }

    /// A timeout decision, reset confirmation or completion overlay is up.
    pub fn is_blocked(&self) -> bool {
        self.pending_timeout.is_some() || self.reset_requested || self.status == GameStatus::Completing
    }

    /// Clock is in a game (not in setup, not concluded).
    pub fn in_progress(&self) -> bool {
        matches!(self.status, GameStatus::Playing | GameStatus::Paused)
    }

    pub fn can_undo(&self) -> bool {
        !self.undo_history.is_empty() && !self.is_blocked()
    }

    /// Push a snapshot of the current turn state, dropping the oldest beyond capacity.
    pub fn push_undo(&mut self) {
        let entry = UndoEntry {
            players: self.players.clone(),
            active_index: self.active_index,
            round: self.round,
            elapsed_seconds: self.elapsed_seconds,
        };
        self.undo_history.push_front(entry);
        self.undo_history.truncate(self.rules.undo_capacity);
    }

    pub(crate) fn emit(&mut self, event: ClockEvent) {
        self.events.push(event);
    }

    /// Stop the low-time warning if it is playing.
    pub(crate) fn stop_warning(&mut self) {
        if self.warning_active {
            self.warning_active = false;
            self.emit(ClockEvent::WarningStopped);
        }
    }

    /// Take the cue events recorded since the last call.
    pub fn drain_events(&mut self) -> Vec<ClockEvent> {
        std::mem::take(&mut self.events)
    }

    /// Back to Setup: players, history and overlays are discarded. Rules stay.
    pub fn reset(&mut self) {
        self.stop_warning();
        let events = self.drain_events();
        *self = Self {
            events,
            ..Self::with_id(self.id, self.rules)
        };
    }
}
