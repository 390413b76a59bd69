//! Audible notification on interval completion.
//!
//! The timer only emits [`Event::IntervalCompleted`]; the
//! [`CompletionNotifier`] subscribes to events and hands a [`Tone`] to
//! whatever [`ToneEmitter`] the front end provides. Emitter failures are
//! logged and swallowed so they never reach the state machine.

use tracing::warn;

use crate::events::Event;

/// A short sine tone with an exponential gain decay.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tone {
    pub frequency_hz: f32,
    pub duration_secs: f32,
    pub start_gain: f32,
    pub end_gain: f32,
}

impl Default for Tone {
    fn default() -> Self {
        Self {
            frequency_hz: 800.0,
            duration_secs: 0.5,
            start_gain: 0.3,
            end_gain: 0.01,
        }
    }
}

impl Tone {
    /// Gain at `t` seconds into the tone.
    pub fn gain_at(&self, t: f32) -> f32 {
        if self.duration_secs <= 0.0 || self.start_gain <= 0.0 {
            return 0.0;
        }
        let t = t.clamp(0.0, self.duration_secs);
        let ratio = self.end_gain / self.start_gain;
        self.start_gain * ratio.powf(t / self.duration_secs)
    }

    /// Mono PCM samples in `-1.0..=1.0` at the given sample rate.
    pub fn samples(&self, sample_rate: u32) -> Vec<f32> {
        let count = (self.duration_secs * sample_rate as f32).round() as usize;
        let step = std::f32::consts::TAU * self.frequency_hz / sample_rate as f32;
        (0..count)
            .map(|n| {
                let t = n as f32 / sample_rate as f32;
                (step * n as f32).sin() * self.gain_at(t)
            })
            .collect()
    }
}

/// Plays tones. Implementations should return quickly and never block the
/// caller for the duration of the tone.
pub trait ToneEmitter {
    fn play_tone(&self, tone: &Tone) -> Result<(), Box<dyn std::error::Error + Send + Sync>>;
}

/// Subscribes to timer events and plays a tone when an interval completes
/// with sound enabled.
pub struct CompletionNotifier<E> {
    emitter: E,
    tone: Tone,
}

impl<E: ToneEmitter> CompletionNotifier<E> {
    pub fn new(emitter: E) -> Self {
        Self {
            emitter,
            tone: Tone::default(),
        }
    }

    pub fn with_tone(mut self, tone: Tone) -> Self {
        self.tone = tone;
        self
    }

    pub fn emitter(&self) -> &E {
        &self.emitter
    }

    /// Handle one event. Returns whether a tone was played successfully.
    pub fn handle(&self, event: &Event) -> bool {
        match event {
            Event::IntervalCompleted { sound: true, .. } => {
                match self.emitter.play_tone(&self.tone) {
                    Ok(()) => true,
                    Err(e) => {
                        warn!(error = %e, "completion tone could not be played");
                        false
                    }
                }
            }
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::timer::{PomodoroTimer, TimerMode};
    use chrono::Utc;
    use std::cell::Cell;

    #[derive(Default)]
    struct CountingEmitter {
        played: Cell<u32>,
    }

    impl ToneEmitter for CountingEmitter {
        fn play_tone(&self, _tone: &Tone) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
            self.played.set(self.played.get() + 1);
            Ok(())
        }
    }

    struct BrokenEmitter;

    impl ToneEmitter for BrokenEmitter {
        fn play_tone(&self, _tone: &Tone) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
            Err("no audio device".into())
        }
    }

    fn completed(sound: bool) -> Event {
        Event::IntervalCompleted {
            finished: TimerMode::Work,
            next: TimerMode::Break,
            duration_min: 25,
            completed_sessions: 1,
            sound,
            at: Utc::now(),
        }
    }

    #[test]
    fn plays_only_on_completion_with_sound() {
        let notifier = CompletionNotifier::new(CountingEmitter::default());
        assert!(notifier.handle(&completed(true)));
        assert!(!notifier.handle(&completed(false)));
        assert!(!notifier.handle(&PomodoroTimer::default().snapshot()));
        assert_eq!(notifier.emitter().played.get(), 1);
    }

    #[test]
    fn emitter_failure_is_swallowed() {
        let notifier = CompletionNotifier::new(BrokenEmitter);
        assert!(!notifier.handle(&completed(true)));
    }

    #[test]
    fn tone_decays_from_start_to_end_gain() {
        let tone = Tone::default();
        assert!((tone.gain_at(0.0) - 0.3).abs() < 1e-6);
        assert!((tone.gain_at(0.5) - 0.01).abs() < 1e-6);
        assert!(tone.gain_at(0.25) < 0.3 && tone.gain_at(0.25) > 0.01);
    }

    #[test]
    fn samples_cover_duration_and_stay_in_range() {
        let samples = Tone::default().samples(8_000);
        assert_eq!(samples.len(), 4_000);
        assert!(samples.iter().all(|s| s.abs() <= 0.3 + 1e-6));
        assert!(samples.iter().any(|s| s.abs() > 0.1));
    }
}
