//! SQLite-backed relational store used by the REST server.
//!
//! Provides persistent storage for:
//! - Notes, tasks and quick links
//! - Completed pomodoro sessions and their statistics
//!
//! Timestamps are stored as RFC 3339 UTC strings with millisecond precision,
//! so lexical order equals chronological order.

use std::path::Path;
use std::str::FromStr;

use chrono::{DateTime, Duration, NaiveTime, SecondsFormat, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::{data_dir, migrations};
use crate::error::{CoreError, DatabaseError, Result, ValidationError};
use crate::resource::{
    LinkDraft, LinkPatch, LinkPosition, Note, NoteDraft, NotePatch, Priority, QuickLink,
    RecordId, Resource, Task, TaskDraft, TaskPatch,
};
use crate::validate::validate_positive;

/// A logged work interval.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PomodoroSession {
    pub id: i64,
    /// Minutes.
    pub duration: u64,
    pub completed_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PomodoroStats {
    pub total_sessions: u64,
    pub total_minutes: u64,
    pub sessions_today: u64,
    /// Sessions completed on or after the date seven days ago.
    pub sessions_this_week: u64,
}

/// Task list filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskStatus {
    Active,
    Completed,
}

impl TaskStatus {
    pub fn matches(self, task: &Task) -> bool {
        task.completed == (self == TaskStatus::Completed)
    }
}

impl FromStr for TaskStatus {
    type Err = ValidationError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "active" => Ok(TaskStatus::Active),
            "completed" => Ok(TaskStatus::Completed),
            other => Err(ValidationError::InvalidValue {
                field: "status".into(),
                message: format!("expected active or completed, got '{other}'"),
            }),
        }
    }
}

fn timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Millis, true)
}

fn parse_timestamp(raw: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|_| Utc::now())
}

fn row_to_note(row: &Row) -> rusqlite::Result<Note> {
    Ok(Note {
        id: RecordId::from(row.get::<_, i64>(0)?),
        title: row.get(1)?,
        content: row.get(2)?,
        created_at: parse_timestamp(&row.get::<_, String>(3)?),
        updated_at: parse_timestamp(&row.get::<_, String>(4)?),
    })
}

fn row_to_task(row: &Row) -> rusqlite::Result<Task> {
    let priority: String = row.get(3)?;
    Ok(Task {
        id: RecordId::from(row.get::<_, i64>(0)?),
        title: row.get(1)?,
        completed: row.get(2)?,
        priority: Priority::from_str(&priority).unwrap_or_default(),
        due_date: row.get(4)?,
        created_at: parse_timestamp(&row.get::<_, String>(5)?),
    })
}

fn row_to_link(row: &Row) -> rusqlite::Result<QuickLink> {
    Ok(QuickLink {
        id: RecordId::from(row.get::<_, i64>(0)?),
        title: row.get(1)?,
        url: row.get(2)?,
        icon: row.get(3)?,
        position: row.get(4)?,
        created_at: parse_timestamp(&row.get::<_, String>(5)?),
    })
}

const NOTE_COLUMNS: &str = "id, title, content, created_at, updated_at";
const TASK_COLUMNS: &str = "id, title, completed, priority, due_date, created_at";
const LINK_COLUMNS: &str = "id, title, url, icon, position, created_at";

/// SQLite database for dashboard resources.
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Get a reference to the underlying SQLite connection.
    pub fn conn(&self) -> &Connection {
        &self.conn
    }

    /// Open the database at `<data dir>/dashboard.db`.
    ///
    /// # Errors
    /// Returns an error if the database cannot be opened or migrated.
    pub fn open() -> Result<Self> {
        Self::open_at(&data_dir()?.join("dashboard.db"))
    }

    /// Open (creating if needed) the database file at `path`.
    pub fn open_at(path: &Path) -> Result<Self> {
        let conn = Connection::open(path).map_err(|source| DatabaseError::OpenFailed {
            path: path.to_path_buf(),
            source,
        })?;
        info!(path = %path.display(), "database opened");
        Self::with_connection(conn)
    }

    /// Open an in-memory database.
    pub fn open_memory() -> Result<Self> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(conn: Connection) -> Result<Self> {
        migrations::migrate(&conn).map_err(|e| DatabaseError::MigrationFailed(e.to_string()))?;
        Ok(Self { conn })
    }

    fn last_id(&self) -> i64 {
        self.conn.last_insert_rowid()
    }

    // ── Notes ────────────────────────────────────────────────────────

    /// Most recently updated first.
    pub fn list_notes(&self) -> Result<Vec<Note>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {NOTE_COLUMNS} FROM notes ORDER BY updated_at DESC, id DESC"
        ))?;
        let notes = stmt
            .query_map([], row_to_note)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(notes)
    }

    pub fn get_note(&self, id: i64) -> Result<Note> {
        self.conn
            .query_row(
                &format!("SELECT {NOTE_COLUMNS} FROM notes WHERE id = ?1"),
                params![id],
                row_to_note,
            )
            .optional()?
            .ok_or_else(|| CoreError::not_found(Note::KIND.label(), id.to_string()))
    }

    pub fn create_note(&self, draft: NoteDraft) -> Result<Note> {
        let draft = Note::prepare_draft(draft)?;
        let now = timestamp(Utc::now());
        self.conn.execute(
            "INSERT INTO notes (title, content, created_at, updated_at) VALUES (?1, ?2, ?3, ?3)",
            params![draft.title, draft.content, now],
        )?;
        self.get_note(self.last_id())
    }

    pub fn update_note(&self, id: i64, patch: NotePatch) -> Result<Note> {
        let mut note = self.get_note(id)?;
        let patch = Note::prepare_patch(patch)?;
        note.apply_patch(&patch, Utc::now());
        self.conn.execute(
            "UPDATE notes SET title = ?1, content = ?2, updated_at = ?3 WHERE id = ?4",
            params![note.title, note.content, timestamp(note.updated_at), id],
        )?;
        self.get_note(id)
    }

    pub fn delete_note(&self, id: i64) -> Result<()> {
        self.delete_from("notes", Note::KIND.label(), id)
    }

    // ── Tasks ────────────────────────────────────────────────────────

    /// Newest first, optionally filtered by completion.
    pub fn list_tasks(&self, status: Option<TaskStatus>) -> Result<Vec<Task>> {
        let filter = match status {
            Some(TaskStatus::Active) => "WHERE completed = 0",
            Some(TaskStatus::Completed) => "WHERE completed = 1",
            None => "",
        };
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {TASK_COLUMNS} FROM tasks {filter} ORDER BY created_at DESC, id DESC"
        ))?;
        let tasks = stmt
            .query_map([], row_to_task)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(tasks)
    }

    pub fn get_task(&self, id: i64) -> Result<Task> {
        self.conn
            .query_row(
                &format!("SELECT {TASK_COLUMNS} FROM tasks WHERE id = ?1"),
                params![id],
                row_to_task,
            )
            .optional()?
            .ok_or_else(|| CoreError::not_found(Task::KIND.label(), id.to_string()))
    }

    pub fn create_task(&self, draft: TaskDraft) -> Result<Task> {
        let draft = Task::prepare_draft(draft)?;
        self.conn.execute(
            "INSERT INTO tasks (title, priority, due_date, created_at) VALUES (?1, ?2, ?3, ?4)",
            params![
                draft.title,
                draft.priority.as_str(),
                draft.due_date,
                timestamp(Utc::now())
            ],
        )?;
        self.get_task(self.last_id())
    }

    pub fn update_task(&self, id: i64, patch: TaskPatch) -> Result<Task> {
        let mut task = self.get_task(id)?;
        let patch = Task::prepare_patch(patch)?;
        task.apply_patch(&patch, Utc::now());
        self.write_task(id, &task)?;
        self.get_task(id)
    }

    /// Flip the completed flag.
    pub fn toggle_task(&self, id: i64) -> Result<Task> {
        let mut task = self.get_task(id)?;
        task.completed = !task.completed;
        self.write_task(id, &task)?;
        Ok(task)
    }

    fn write_task(&self, id: i64, task: &Task) -> Result<()> {
        self.conn.execute(
            "UPDATE tasks SET title = ?1, completed = ?2, priority = ?3, due_date = ?4 WHERE id = ?5",
            params![
                task.title,
                task.completed,
                task.priority.as_str(),
                task.due_date,
                id
            ],
        )?;
        Ok(())
    }

    pub fn delete_task(&self, id: i64) -> Result<()> {
        self.delete_from("tasks", Task::KIND.label(), id)
    }

    // ── Links ────────────────────────────────────────────────────────

    /// In display order.
    pub fn list_links(&self) -> Result<Vec<QuickLink>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {LINK_COLUMNS} FROM links ORDER BY position ASC, id ASC"
        ))?;
        let links = stmt
            .query_map([], row_to_link)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(links)
    }

    pub fn get_link(&self, id: i64) -> Result<QuickLink> {
        self.conn
            .query_row(
                &format!("SELECT {LINK_COLUMNS} FROM links WHERE id = ?1"),
                params![id],
                row_to_link,
            )
            .optional()?
            .ok_or_else(|| CoreError::not_found(QuickLink::KIND.label(), id.to_string()))
    }

    /// Appends the link after the current last position.
    pub fn create_link(&self, draft: LinkDraft) -> Result<QuickLink> {
        let draft = QuickLink::prepare_draft(draft)?;
        let max: i64 = self.conn.query_row(
            "SELECT COALESCE(MAX(position), -1) FROM links",
            [],
            |row| row.get(0),
        )?;
        self.conn.execute(
            "INSERT INTO links (title, url, icon, position, created_at) VALUES (?1, ?2, ?3, ?4, ?5)",
            params![draft.title, draft.url, draft.icon, max + 1, timestamp(Utc::now())],
        )?;
        self.get_link(self.last_id())
    }

    pub fn update_link(&self, id: i64, patch: LinkPatch) -> Result<QuickLink> {
        let mut link = self.get_link(id)?;
        let patch = QuickLink::prepare_patch(patch)?;
        link.apply_patch(&patch, Utc::now());
        self.conn.execute(
            "UPDATE links SET title = ?1, url = ?2, icon = ?3 WHERE id = ?4",
            params![link.title, link.url, link.icon, id],
        )?;
        self.get_link(id)
    }

    /// Assign positions in one transaction and return the reordered list.
    ///
    /// Entries naming ids that do not exist are ignored.
    pub fn reorder_links(&self, positions: &[LinkPosition]) -> Result<Vec<QuickLink>> {
        let mut updates = Vec::with_capacity(positions.len());
        for entry in positions {
            let id = entry.id.as_i64().ok_or_else(|| ValidationError::InvalidValue {
                field: "links".into(),
                message: "each link must have a valid id".into(),
            })?;
            updates.push((id, entry.position));
        }

        let tx = self.conn.unchecked_transaction()?;
        {
            let mut stmt = tx.prepare("UPDATE links SET position = ?1 WHERE id = ?2")?;
            for (id, position) in &updates {
                stmt.execute(params![position, id])?;
            }
        }
        tx.commit()?;
        debug!(count = updates.len(), "links reordered");
        self.list_links()
    }

    pub fn delete_link(&self, id: i64) -> Result<()> {
        self.delete_from("links", QuickLink::KIND.label(), id)
    }

    fn delete_from(&self, table: &str, kind: &str, id: i64) -> Result<()> {
        let changed = self
            .conn
            .execute(&format!("DELETE FROM {table} WHERE id = ?1"), params![id])?;
        if changed == 0 {
            return Err(CoreError::not_found(kind, id.to_string()));
        }
        Ok(())
    }

    // ── Pomodoro sessions ────────────────────────────────────────────

    /// Log a completed work session of `duration` minutes.
    pub fn record_pomodoro_session(&self, duration: u64) -> Result<PomodoroSession> {
        self.record_pomodoro_session_at(duration, Utc::now())
    }

    pub fn record_pomodoro_session_at(
        &self,
        duration: u64,
        completed_at: DateTime<Utc>,
    ) -> Result<PomodoroSession> {
        validate_positive(duration as f64, "duration")?;
        self.conn.execute(
            "INSERT INTO pomodoro_sessions (duration, completed_at) VALUES (?1, ?2)",
            params![duration as i64, timestamp(completed_at)],
        )?;
        let id = self.last_id();
        let session = self.conn.query_row(
            "SELECT id, duration, completed_at FROM pomodoro_sessions WHERE id = ?1",
            params![id],
            |row| {
                Ok(PomodoroSession {
                    id: row.get(0)?,
                    duration: row.get::<_, i64>(1)? as u64,
                    completed_at: parse_timestamp(&row.get::<_, String>(2)?),
                })
            },
        )?;
        Ok(session)
    }

    pub fn pomodoro_stats(&self) -> Result<PomodoroStats> {
        self.pomodoro_stats_at(Utc::now())
    }

    /// Stats relative to `now`: "today" starts at UTC midnight, "this week"
    /// at UTC midnight seven days earlier.
    pub fn pomodoro_stats_at(&self, now: DateTime<Utc>) -> Result<PomodoroStats> {
        let today = now.date_naive().and_time(NaiveTime::MIN).and_utc();
        let week = today - Duration::days(7);

        let (total_sessions, total_minutes): (i64, i64) = self.conn.query_row(
            "SELECT COUNT(*), COALESCE(SUM(duration), 0) FROM pomodoro_sessions",
            [],
            |row| Ok((row.get(0)?, row.get(1)?)),
        )?;
        let count_since = |since: DateTime<Utc>| -> rusqlite::Result<i64> {
            self.conn.query_row(
                "SELECT COUNT(*) FROM pomodoro_sessions WHERE completed_at >= ?1",
                params![timestamp(since)],
                |row| row.get(0),
            )
        };

        Ok(PomodoroStats {
            total_sessions: total_sessions as u64,
            total_minutes: total_minutes as u64,
            sessions_today: count_since(today)? as u64,
            sessions_this_week: count_since(week)? as u64,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn db() -> Database {
        Database::open_memory().unwrap()
    }

    fn link(title: &str, url: &str) -> LinkDraft {
        LinkDraft {
            title: title.into(),
            url: url.into(),
            icon: None,
        }
    }

    #[test]
    fn note_crud() {
        let db = db();
        let note = db
            .create_note(NoteDraft {
                title: "Groceries".into(),
                content: "eggs".into(),
            })
            .unwrap();
        assert_eq!(note.id, RecordId::from(1));
        assert_eq!(note.created_at, note.updated_at);

        let updated = db
            .update_note(
                1,
                NotePatch {
                    title: Some("Shopping".into()),
                    ..NotePatch::default()
                },
            )
            .unwrap();
        assert_eq!(updated.title, "Shopping");
        assert_eq!(updated.content, "eggs");
        assert!(updated.updated_at >= note.updated_at);

        db.delete_note(1).unwrap();
        assert!(db.get_note(1).unwrap_err().is_not_found());
        assert!(db.delete_note(1).unwrap_err().is_not_found());
    }

    #[test]
    fn note_content_may_be_empty() {
        let db = db();
        let note = db
            .create_note(NoteDraft {
                title: "Heading only".into(),
                content: String::new(),
            })
            .unwrap();
        assert_eq!(db.get_note(1).unwrap().content, "");
        db.update_note(
            1,
            NotePatch {
                content: Some("body".into()),
                ..NotePatch::default()
            },
        )
        .unwrap();
        let emptied = db
            .update_note(
                1,
                NotePatch {
                    content: Some(String::new()),
                    ..NotePatch::default()
                },
            )
            .unwrap();
        assert_eq!(emptied.content, "");
        assert_eq!(emptied.title, note.title);
    }

    #[test]
    fn notes_listed_most_recent_first() {
        let db = db();
        for title in ["first", "second"] {
            db.create_note(NoteDraft {
                title: title.into(),
                content: "x".into(),
            })
            .unwrap();
        }
        std::thread::sleep(std::time::Duration::from_millis(5));
        db.update_note(
            1,
            NotePatch {
                content: Some("touched".into()),
                ..NotePatch::default()
            },
        )
        .unwrap();
        let titles: Vec<_> = db.list_notes().unwrap().into_iter().map(|n| n.title).collect();
        assert_eq!(titles, ["first", "second"]);
    }

    #[test]
    fn empty_patch_is_rejected() {
        let db = db();
        db.create_task(TaskDraft::new("x")).unwrap();
        let err = db.update_task(1, TaskPatch::default()).unwrap_err();
        assert!(matches!(
            err,
            CoreError::Validation(ValidationError::NoFieldsToUpdate)
        ));
    }

    #[test]
    fn update_of_missing_record_is_not_found_before_validation() {
        let db = db();
        assert!(db.update_task(9, TaskPatch::default()).unwrap_err().is_not_found());
    }

    #[test]
    fn task_filter_and_toggle() {
        let db = db();
        let first = db.create_task(TaskDraft::new("write report")).unwrap();
        db.create_task(TaskDraft {
            title: "call bank".into(),
            priority: Priority::High,
            due_date: Some("2026-11-01".into()),
        })
        .unwrap();
        assert_eq!(first.priority, Priority::Medium);
        assert!(!first.completed);

        let toggled = db.toggle_task(1).unwrap();
        assert!(toggled.completed);

        let active = db.list_tasks(Some(TaskStatus::Active)).unwrap();
        let done = db.list_tasks(Some(TaskStatus::Completed)).unwrap();
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].title, "call bank");
        assert_eq!(active[0].due_date.as_deref(), Some("2026-11-01"));
        assert_eq!(done.len(), 1);
        assert_eq!(db.list_tasks(None).unwrap().len(), 2);

        assert!(!db.toggle_task(1).unwrap().completed);
    }

    #[test]
    fn due_date_can_be_cleared() {
        let db = db();
        let mut draft = TaskDraft::new("renew passport");
        draft.due_date = Some("2026-12-01".into());
        db.create_task(draft).unwrap();

        let cleared = db
            .update_task(
                1,
                TaskPatch {
                    due_date: Some(None),
                    ..TaskPatch::default()
                },
            )
            .unwrap();
        assert_eq!(cleared.due_date, None);
        assert_eq!(db.get_task(1).unwrap().due_date, None);
        assert_eq!(cleared.title, "renew passport");
    }

    #[test]
    fn task_validation() {
        let db = db();
        assert!(db.create_task(TaskDraft::new("  ")).unwrap_err().is_validation());
        let mut bad_date = TaskDraft::new("x");
        bad_date.due_date = Some("tomorrow".into());
        assert!(db.create_task(bad_date).unwrap_err().is_validation());
        assert!(db.list_tasks(None).unwrap().is_empty());
    }

    #[test]
    fn task_status_parses() {
        assert_eq!("active".parse::<TaskStatus>().unwrap(), TaskStatus::Active);
        assert!("done".parse::<TaskStatus>().is_err());

        let mut task = Task::from_draft(RecordId::from(1), TaskDraft::new("x"), &[], Utc::now());
        assert!(TaskStatus::Active.matches(&task));
        task.completed = true;
        assert!(TaskStatus::Completed.matches(&task));
        assert!(!TaskStatus::Active.matches(&task));
    }

    #[test]
    fn link_positions_and_reorder() {
        let db = db();
        let a = db.create_link(link("A", "a.example")).unwrap();
        let b = db.create_link(link("B", "https://b.example")).unwrap();
        let c = db.create_link(link("C", "http://c.example")).unwrap();
        assert_eq!((a.position, b.position, c.position), (0, 1, 2));
        assert_eq!(a.url, "https://a.example");
        assert_eq!(a.icon, None);

        let reordered = db
            .reorder_links(&[
                LinkPosition {
                    id: c.id.clone(),
                    position: 0,
                },
                LinkPosition {
                    id: a.id.clone(),
                    position: 1,
                },
                LinkPosition {
                    id: b.id.clone(),
                    position: 2,
                },
            ])
            .unwrap();
        let titles: Vec<_> = reordered.iter().map(|l| l.title.as_str()).collect();
        assert_eq!(titles, ["C", "A", "B"]);

        db.delete_link(2).unwrap();
        let d = db.create_link(link("D", "d.example")).unwrap();
        assert_eq!(d.position, 2);
    }

    #[test]
    fn reorder_rejects_non_numeric_ids() {
        let db = db();
        db.create_link(link("A", "a.example")).unwrap();
        let err = db
            .reorder_links(&[LinkPosition {
                id: RecordId::from("abc"),
                position: 3,
            }])
            .unwrap_err();
        assert!(err.is_validation());
        assert_eq!(db.get_link(1).unwrap().position, 0);
    }

    #[test]
    fn pomodoro_stats_windows() {
        let db = db();
        let now: DateTime<Utc> = "2026-10-18T12:00:00Z".parse().unwrap();
        db.record_pomodoro_session_at(25, now).unwrap();
        db.record_pomodoro_session_at(25, now - Duration::hours(13)).unwrap();
        db.record_pomodoro_session_at(50, now - Duration::days(3)).unwrap();
        db.record_pomodoro_session_at(15, now - Duration::days(30)).unwrap();

        let stats = db.pomodoro_stats_at(now).unwrap();
        assert_eq!(
            stats,
            PomodoroStats {
                total_sessions: 4,
                total_minutes: 115,
                sessions_today: 1,
                sessions_this_week: 3,
            }
        );
    }

    #[test]
    fn pomodoro_session_requires_positive_duration() {
        let db = db();
        assert!(db.record_pomodoro_session(0).unwrap_err().is_validation());
        let session = db.record_pomodoro_session(25).unwrap();
        assert_eq!(session.duration, 25);
        assert_eq!(db.pomodoro_stats().unwrap().sessions_today, 1);
    }

    #[test]
    fn open_at_persists_between_connections() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dashboard.db");
        {
            let db = Database::open_at(&path).unwrap();
            db.create_task(TaskDraft::new("persist me")).unwrap();
        }
        let db = Database::open_at(&path).unwrap();
        assert_eq!(db.list_tasks(None).unwrap()[0].title, "persist me");
    }
}
