use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::timer::TimerMode;

/// Every state change of the pomodoro timer produces an Event.
/// Front ends render them; the completion notifier subscribes to them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Event {
    TimerStarted {
        mode: TimerMode,
        remaining_secs: u64,
        at: DateTime<Utc>,
    },
    TimerPaused {
        remaining_secs: u64,
        at: DateTime<Utc>,
    },
    TimerReset {
        remaining_secs: u64,
        at: DateTime<Utc>,
    },
    /// An interval ran down to zero and the timer switched modes.
    IntervalCompleted {
        finished: TimerMode,
        next: TimerMode,
        /// Length of the finished interval.
        duration_min: u64,
        completed_sessions: u64,
        /// Whether the user wants an audible notification.
        sound: bool,
        at: DateTime<Utc>,
    },
    SettingsApplied {
        work_minutes: u64,
        break_minutes: u64,
        remaining_secs: u64,
        at: DateTime<Utc>,
    },
    SoundToggled {
        enabled: bool,
        at: DateTime<Utc>,
    },
    StateSnapshot {
        mode: TimerMode,
        remaining_secs: u64,
        total_secs: u64,
        is_running: bool,
        completed_sessions: u64,
        sound_enabled: bool,
        progress: f64,
        at: DateTime<Utc>,
    },
}
