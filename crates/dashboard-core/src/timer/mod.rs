mod engine;
mod notifier;

pub use engine::{format_clock, PomodoroTimer, TickToken, TimerMode, TimerSettings};
pub use notifier::{CompletionNotifier, Tone, ToneEmitter};
