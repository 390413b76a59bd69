//! Interactive pomodoro timer.
//!
//! Reads one command per line from stdin and writes every timer event to
//! stdout as a JSON line. The countdown is driven by a tokio interval on
//! the current thread; starting creates the interval and stopping drops it.

use std::io::Write;
use std::time::Duration;

use clap::Subcommand;
use dashboard_core::{
    CompletionNotifier, Config, Event, PomodoroTimer, RemoteClient, TimerMode, TimerSettings,
    Tone, ToneEmitter,
};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::time::{self, Instant, Interval, MissedTickBehavior};
use tracing::{debug, info, warn};

use super::{print_json, remote_client, CmdResult};

const WORK_RANGE: std::ops::RangeInclusive<u64> = 1..=60;
const BREAK_RANGE: std::ops::RangeInclusive<u64> = 1..=30;

#[derive(Subcommand)]
pub enum TimerAction {
    /// Run the timer, reading commands from stdin
    ///
    /// Commands: start, pause, reset, sound, settings <work> <break>,
    /// status, quit.
    Run {
        /// Work minutes (1-60), defaults to timer.work_minutes
        #[arg(long, value_parser = clap::value_parser!(u64).range(1..=60))]
        work: Option<u64>,
        /// Break minutes (1-30), defaults to timer.break_minutes
        #[arg(long = "break", value_parser = clap::value_parser!(u64).range(1..=30))]
        break_minutes: Option<u64>,
        /// Start counting down immediately
        #[arg(long)]
        start: bool,
        /// Do not log completed work sessions to the API
        #[arg(long)]
        offline: bool,
        #[arg(long, default_value_t = 1000, hide = true)]
        tick_ms: u64,
    },
    /// Print the initial timer state for the configured settings
    Status,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Command {
    Start,
    Pause,
    Reset,
    Sound,
    Settings { work: u64, brk: u64 },
    Status,
    Quit,
}

fn parse_command(line: &str) -> Result<Command, String> {
    let mut words = line.split_whitespace();
    let Some(name) = words.next() else {
        return Err("empty command".into());
    };
    let command = match name.to_ascii_lowercase().as_str() {
        "start" | "s" => Command::Start,
        "pause" | "p" => Command::Pause,
        "reset" | "r" => Command::Reset,
        "sound" => Command::Sound,
        "status" => Command::Status,
        "quit" | "q" | "exit" => Command::Quit,
        "settings" => {
            let work = parse_minutes(words.next(), "work", &WORK_RANGE)?;
            let brk = parse_minutes(words.next(), "break", &BREAK_RANGE)?;
            Command::Settings { work, brk }
        }
        other => return Err(format!("unknown command: {other}")),
    };
    if words.next().is_some() {
        return Err(format!("too many arguments for {name}"));
    }
    Ok(command)
}

fn parse_minutes(
    word: Option<&str>,
    field: &str,
    range: &std::ops::RangeInclusive<u64>,
) -> Result<u64, String> {
    let word = word.ok_or_else(|| "usage: settings <work> <break>".to_string())?;
    let minutes: u64 = word
        .parse()
        .map_err(|_| format!("{field} minutes must be a whole number"))?;
    if !range.contains(&minutes) {
        return Err(format!(
            "{field} minutes must be between {} and {}",
            range.start(),
            range.end()
        ));
    }
    Ok(minutes)
}

/// Rings the terminal bell. A terminal cannot shape the tone, so only its
/// presence is honoured.
struct TerminalBell;

impl ToneEmitter for TerminalBell {
    fn play_tone(&self, tone: &Tone) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        debug!(frequency_hz = tone.frequency_hz, "ringing bell");
        let mut stderr = std::io::stderr().lock();
        stderr.write_all(b"\x07")?;
        stderr.flush()?;
        Ok(())
    }
}

fn emit(event: &Event) -> Result<(), serde_json::Error> {
    println!("{}", serde_json::to_string(event)?);
    Ok(())
}

async fn next_tick(ticker: &mut Option<Interval>) {
    match ticker {
        Some(interval) => {
            interval.tick().await;
        }
        None => std::future::pending().await,
    }
}

fn new_ticker(period: Duration) -> Interval {
    let mut interval = time::interval_at(Instant::now() + period, period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
    interval
}

struct Session {
    timer: PomodoroTimer,
    notifier: CompletionNotifier<TerminalBell>,
    remote: Option<RemoteClient>,
    ticker: Option<Interval>,
    period: Duration,
}

impl Session {
    /// Keep the interval in step with the timer's running state.
    fn sync_ticker(&mut self) {
        match (self.timer.is_running(), self.ticker.is_some()) {
            (true, false) => self.ticker = Some(new_ticker(self.period)),
            (false, true) => self.ticker = None,
            _ => {}
        }
    }

    fn restart_ticker(&mut self) {
        self.ticker = None;
        self.sync_ticker();
    }

    async fn handle(&mut self, command: Command) -> CmdResult {
        match command {
            Command::Start => {
                // Starting a running timer keeps the current deadline.
                if let Some(event) = self.timer.start() {
                    emit(&event)?;
                    self.restart_ticker();
                }
            }
            Command::Pause => {
                if let Some(event) = self.timer.pause() {
                    emit(&event)?;
                }
                self.sync_ticker();
            }
            Command::Reset => {
                emit(&self.timer.reset())?;
                self.sync_ticker();
            }
            Command::Sound => emit(&self.timer.toggle_sound())?,
            Command::Settings { work, brk } => {
                emit(&self.timer.apply_settings(work, brk)?)?;
                if self.timer.is_running() {
                    self.restart_ticker();
                }
            }
            Command::Status => emit(&self.timer.snapshot())?,
            Command::Quit => {}
        }
        Ok(())
    }

    async fn on_tick(&mut self) -> CmdResult {
        let Some(token) = self.timer.tick_token() else {
            self.sync_ticker();
            return Ok(());
        };
        if let Some(event) = self.timer.tick(token) {
            emit(&event)?;
            self.notifier.handle(&event);
            if let Event::IntervalCompleted {
                finished: TimerMode::Work,
                duration_min,
                ..
            } = event
            {
                self.log_session(duration_min).await;
            }
            self.sync_ticker();
        }
        Ok(())
    }

    async fn log_session(&self, duration_min: u64) {
        let Some(remote) = &self.remote else {
            return;
        };
        match remote.log_session(duration_min).await {
            Ok(session) => info!(id = session.id, duration_min, "session logged"),
            Err(e) => warn!(error = %e, "could not log session"),
        }
    }
}

async fn run_interactive(mut session: Session, start: bool) -> CmdResult {
    emit(&session.timer.snapshot())?;
    if start {
        session.handle(Command::Start).await?;
    }

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdin_open = true;

    loop {
        // With stdin closed, finish the running interval and stop.
        if !stdin_open && session.ticker.is_none() {
            break;
        }
        tokio::select! {
            line = lines.next_line(), if stdin_open => {
                let Some(line) = line? else {
                    stdin_open = false;
                    continue;
                };
                if line.trim().is_empty() {
                    continue;
                }
                match parse_command(&line) {
                    Ok(Command::Quit) => break,
                    Ok(command) => {
                        if let Err(e) = session.handle(command).await {
                            eprintln!("error: {e}");
                        }
                    }
                    Err(message) => eprintln!("error: {message}"),
                }
            }
            _ = next_tick(&mut session.ticker) => session.on_tick().await?,
        }
    }
    Ok(())
}

fn settings_from(
    config: &Config,
    work: Option<u64>,
    break_minutes: Option<u64>,
) -> Result<TimerSettings, Box<dyn std::error::Error>> {
    let base = config.timer_settings()?;
    let settings = TimerSettings::new(
        work.unwrap_or(base.work_minutes),
        break_minutes.unwrap_or(base.break_minutes),
    )?;
    Ok(settings
        .with_sound(base.sound_enabled)
        .with_auto_continue(base.auto_continue))
}

pub async fn run(action: TimerAction) -> CmdResult {
    let config = Config::load()?;

    match action {
        TimerAction::Run {
            work,
            break_minutes,
            start,
            offline,
            tick_ms,
        } => {
            let settings = settings_from(&config, work, break_minutes)?;
            let remote = if offline {
                None
            } else {
                Some(remote_client(&config)?)
            };
            let session = Session {
                timer: PomodoroTimer::new(settings),
                notifier: CompletionNotifier::new(TerminalBell),
                remote,
                ticker: None,
                period: Duration::from_millis(tick_ms.max(1)),
            };
            run_interactive(session, start).await
        }
        TimerAction::Status => {
            let settings = settings_from(&config, None, None)?;
            print_json(&PomodoroTimer::new(settings).snapshot())?;
            Ok(())
        }
    }
}
