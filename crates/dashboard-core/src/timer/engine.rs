//! Pomodoro timer state machine.
//!
//! The timer does not own a clock or a thread. The caller drives it by
//! calling `tick()` once per second while it is running, passing the
//! [`TickToken`] obtained after `start()`.
//!
//! ## State Transitions
//!
//! ```text
//! Work --(remaining hits 0)--> Break --(remaining hits 0)--> Work
//! ```
//!
//! Only Work -> Break increments the completed session count. `pause()`,
//! `reset()` and every new `start()` invalidate the previous token, so a
//! late tick from a cancelled scheduler can never decrement twice.
//!
//! ## Usage
//!
//! ```ignore
//! let mut timer = PomodoroTimer::new(TimerSettings::default());
//! timer.start();
//! let token = timer.tick_token().unwrap();
//! // once per second:
//! if let Some(event) = timer.tick(token) { /* interval completed */ }
//! ```

use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::events::Event;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimerMode {
    Work,
    Break,
}

impl TimerMode {
    pub fn other(self) -> Self {
        match self {
            TimerMode::Work => TimerMode::Break,
            TimerMode::Break => TimerMode::Work,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            TimerMode::Work => "Work Time",
            TimerMode::Break => "Break Time",
        }
    }
}

/// Identifies the tick source that is currently allowed to advance the timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TickToken(u64);

/// User-adjustable timer settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimerSettings {
    pub work_minutes: u64,
    pub break_minutes: u64,
    pub sound_enabled: bool,
    /// Keep running into the next interval after a completion.
    pub auto_continue: bool,
}

impl TimerSettings {
    /// Build settings, rejecting zero durations.
    ///
    /// Any positive value is accepted; range limits belong to the UI.
    pub fn new(work_minutes: u64, break_minutes: u64) -> Result<Self, ValidationError> {
        validate_minutes("work_minutes", work_minutes)?;
        validate_minutes("break_minutes", break_minutes)?;
        Ok(Self {
            work_minutes,
            break_minutes,
            ..Self::default()
        })
    }

    pub fn with_sound(mut self, enabled: bool) -> Self {
        self.sound_enabled = enabled;
        self
    }

    pub fn with_auto_continue(mut self, enabled: bool) -> Self {
        self.auto_continue = enabled;
        self
    }

    pub fn minutes_for(&self, mode: TimerMode) -> u64 {
        match mode {
            TimerMode::Work => self.work_minutes,
            TimerMode::Break => self.break_minutes,
        }
    }
}

impl Default for TimerSettings {
    fn default() -> Self {
        Self {
            work_minutes: 25,
            break_minutes: 5,
            sound_enabled: true,
            auto_continue: false,
        }
    }
}

fn validate_minutes(field: &str, minutes: u64) -> Result<(), ValidationError> {
    if minutes == 0 {
        return Err(ValidationError::InvalidValue {
            field: field.to_string(),
            message: "must be a positive number of minutes".into(),
        });
    }
    Ok(())
}

/// Work/break countdown.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PomodoroTimer {
    settings: TimerSettings,
    mode: TimerMode,
    remaining_secs: u64,
    running: bool,
    completed_sessions: u64,
    /// Bumped whenever the active tick source is replaced or cancelled.
    generation: u64,
}

impl PomodoroTimer {
    /// Create a stopped timer in Work mode with a full interval.
    pub fn new(settings: TimerSettings) -> Self {
        Self {
            settings,
            mode: TimerMode::Work,
            remaining_secs: settings.work_minutes.saturating_mul(60),
            running: false,
            completed_sessions: 0,
            generation: 0,
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn mode(&self) -> TimerMode {
        self.mode
    }

    pub fn remaining_secs(&self) -> u64 {
        self.remaining_secs
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn completed_sessions(&self) -> u64 {
        self.completed_sessions
    }

    pub fn sound_enabled(&self) -> bool {
        self.settings.sound_enabled
    }

    pub fn settings(&self) -> &TimerSettings {
        &self.settings
    }

    /// Full length of the active interval in seconds.
    pub fn total_secs(&self) -> u64 {
        self.interval_secs(self.mode)
    }

    pub fn interval_secs(&self, mode: TimerMode) -> u64 {
        self.settings.minutes_for(mode).saturating_mul(60)
    }

    /// 0.0 .. 1.0 progress within the active interval.
    pub fn progress(&self) -> f64 {
        let total = self.total_secs();
        if total == 0 {
            return 0.0;
        }
        1.0 - (self.remaining_secs as f64 / total as f64)
    }

    /// Remaining time as `mm:ss`.
    pub fn display(&self) -> String {
        format_clock(self.remaining_secs)
    }

    /// Token of the active tick source, `None` while stopped.
    pub fn tick_token(&self) -> Option<TickToken> {
        self.running.then_some(TickToken(self.generation))
    }

    /// Build a full state snapshot event.
    pub fn snapshot(&self) -> Event {
        Event::StateSnapshot {
            mode: self.mode,
            remaining_secs: self.remaining_secs,
            total_secs: self.total_secs(),
            is_running: self.running,
            completed_sessions: self.completed_sessions,
            sound_enabled: self.settings.sound_enabled,
            progress: self.progress(),
            at: Utc::now(),
        }
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Start counting down. Returns `None` if already running.
    pub fn start(&mut self) -> Option<Event> {
        if self.running {
            return None;
        }
        self.running = true;
        self.generation += 1;
        Some(Event::TimerStarted {
            mode: self.mode,
            remaining_secs: self.remaining_secs,
            at: Utc::now(),
        })
    }

    /// Freeze the countdown. Returns `None` if not running.
    pub fn pause(&mut self) -> Option<Event> {
        if !self.running {
            return None;
        }
        self.stop();
        Some(Event::TimerPaused {
            remaining_secs: self.remaining_secs,
            at: Utc::now(),
        })
    }

    /// Stop and return to the start of a Work interval.
    ///
    /// The completed session count is preserved.
    pub fn reset(&mut self) -> Event {
        self.stop();
        self.mode = TimerMode::Work;
        self.remaining_secs = self.interval_secs(TimerMode::Work);
        Event::TimerReset {
            remaining_secs: self.remaining_secs,
            at: Utc::now(),
        }
    }

    /// Replace the configured durations and restart the active interval
    /// with its new length. The mode is left as is.
    pub fn apply_settings(
        &mut self,
        work_minutes: u64,
        break_minutes: u64,
    ) -> Result<Event, ValidationError> {
        validate_minutes("work_minutes", work_minutes)?;
        validate_minutes("break_minutes", break_minutes)?;
        self.settings.work_minutes = work_minutes;
        self.settings.break_minutes = break_minutes;
        self.remaining_secs = self.total_secs();
        Ok(Event::SettingsApplied {
            work_minutes,
            break_minutes,
            remaining_secs: self.remaining_secs,
            at: Utc::now(),
        })
    }

    pub fn toggle_sound(&mut self) -> Event {
        self.settings.sound_enabled = !self.settings.sound_enabled;
        Event::SoundToggled {
            enabled: self.settings.sound_enabled,
            at: Utc::now(),
        }
    }

    /// Advance the countdown by one second.
    ///
    /// Ignored unless the timer is running and `token` belongs to the
    /// current tick source. Returns `Some(Event::IntervalCompleted)` when
    /// the interval reaches zero.
    pub fn tick(&mut self, token: TickToken) -> Option<Event> {
        if !self.running || token.0 != self.generation {
            return None;
        }
        self.remaining_secs = self.remaining_secs.saturating_sub(1);
        if self.remaining_secs == 0 {
            return Some(self.complete());
        }
        None
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn stop(&mut self) {
        self.running = false;
        self.generation += 1;
    }

    fn complete(&mut self) -> Event {
        let finished = self.mode;
        if finished == TimerMode::Work {
            self.completed_sessions += 1;
        }
        self.mode = finished.other();
        self.remaining_secs = self.interval_secs(self.mode);
        if !self.settings.auto_continue {
            self.stop();
        }
        Event::IntervalCompleted {
            finished,
            next: self.mode,
            duration_min: self.settings.minutes_for(finished),
            completed_sessions: self.completed_sessions,
            sound: self.settings.sound_enabled,
            at: Utc::now(),
        }
    }
}

impl Default for PomodoroTimer {
    fn default() -> Self {
        Self::new(TimerSettings::default())
    }
}

/// Format seconds as zero-padded `mm:ss`.
pub fn format_clock(secs: u64) -> String {
    format!("{:02}:{:02}", secs / 60, secs % 60)
}
