//! # Dashboard Core Library
//!
//! Business logic for the personal dashboard. The REST server and the
//! terminal front end are thin layers over this crate.
//!
//! ## Architecture
//!
//! - **Timer**: a tick-driven work/break state machine. The caller owns the
//!   clock and feeds one `tick()` per second with the token issued by
//!   `start()`; completion events drive the [`CompletionNotifier`].
//! - **Resources**: notes, tasks and quick links behind a
//!   [`ResourceStore`] that talks to the REST API when it is reachable and
//!   falls back to on-device snapshots when it is not.
//! - **Storage**: SQLite relational store for the server, a SQLite
//!   key-value file for snapshots, and TOML configuration.
//! - **Weather**: Open-Meteo current conditions.
//!
//! ## Key Components
//!
//! - [`PomodoroTimer`]: timer state machine
//! - [`ResourceStore`]: dual-persistence store, one per resource kind
//! - [`RemoteClient`]: HTTP client for the REST API
//! - [`Database`]: relational persistence
//! - [`Config`]: application configuration

pub mod api;
pub mod error;
pub mod events;
pub mod resource;
pub mod storage;
pub mod timer;
pub mod validate;
pub mod weather;

pub use api::{ApiFailure, ApiSuccess, DeletedId};
pub use error::{ConfigError, CoreError, DatabaseError, RemoteError, ValidationError};
pub use events::Event;
pub use resource::{
    LinkDraft, LinkPatch, LinkPosition, MemorySnapshotStore, Note, NoteDraft, NotePatch,
    Priority, QuickLink, RecordId, RemoteApi, RemoteClient, Resource, ResourceKind,
    ResourceStore, SnapshotStore, StorageMode, Task, TaskDraft, TaskPatch,
};
pub use storage::{Config, Database, KvStore, PomodoroSession, PomodoroStats, TaskStatus};
pub use timer::{CompletionNotifier, PomodoroTimer, TimerMode, TimerSettings, Tone, ToneEmitter};
pub use weather::{Location, WeatherClient, WeatherCondition, WeatherReport};
