use rally_core::{
    MatchSnapshot, PacingConfig, PlayerDynamics, PlayerId, PlayerStats, SessionEvent,
    SpeedMultiplier,
};
use serde::{Deserialize, Serialize};

/// Position in the session event stream.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct EventCursor(pub u64);

/// A published event with its stream position.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct StampedEvent {
    pub sequence: u64,
    /// Match the event belongs to, 1-based. Announcements made before the
    /// first match of a session carry 0.
    pub match_number: u64,
    #[serde(flatten)]
    pub event: SessionEvent,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct EventBatch {
    pub events: Vec<StampedEvent>,
    /// Pass back to continue after the last returned event.
    pub next: EventCursor,
    /// Events that fell out of the buffer before they could be read.
    pub skipped: u64,
}

/// Snapshot of the session for status queries.
#[derive(Clone, Debug, Serialize)]
pub struct SessionStatus {
    pub active: (PlayerId, PlayerId),
    pub bench: PlayerId,
    pub streaks: Vec<(PlayerId, u32)>,
    pub stats: Vec<(PlayerId, PlayerStats)>,
    pub dynamics: Vec<(PlayerId, PlayerDynamics)>,
    /// Score of the match in progress, near player first.
    pub score: Option<(u32, u32)>,
    pub last_match: Option<MatchSnapshot>,
    pub matches_played: usize,
    pub points_played: u64,
    pub paused: bool,
    pub speed: f32,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Events kept for cursor polling.
    pub event_buffer_capacity: usize,
    pub pacing: PacingConfig,
    pub initial_speed: SpeedMultiplier,
    /// Hold the session after the initial announcement until resumed.
    pub start_paused: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            event_buffer_capacity: 4096,
            pacing: PacingConfig::default(),
            initial_speed: SpeedMultiplier::NORMAL,
            start_paused: false,
        }
    }
}
