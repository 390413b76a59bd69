//! Notes, tasks and quick links.
//!
//! Every kind implements [`Resource`], which tells the generic store how to
//! validate input, build a record locally and merge a partial update.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use super::url::normalize_url;
use crate::error::ValidationError;
use crate::validate::{require_text, validate_date, validate_url};

/// Record identifier.
///
/// The server assigns integers and local mode assigns timestamp-derived
/// tokens; both are carried as strings and either form is accepted on input.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RecordId(String);

impl RecordId {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Numeric form, as used by the relational store.
    pub fn as_i64(&self) -> Option<i64> {
        self.0.parse().ok()
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for RecordId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for RecordId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<i64> for RecordId {
    fn from(value: i64) -> Self {
        Self(value.to_string())
    }
}

impl Serialize for RecordId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self.as_i64() {
            Some(n) if n.to_string() == self.0 => serializer.serialize_i64(n),
            _ => serializer.serialize_str(&self.0),
        }
    }
}

impl<'de> Deserialize<'de> for RecordId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Int(i64),
            Str(String),
        }
        Ok(match Raw::deserialize(deserializer)? {
            Raw::Int(n) => RecordId::from(n),
            Raw::Str(s) => RecordId(s),
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ResourceKind {
    Note,
    Task,
    Link,
}

impl ResourceKind {
    pub fn label(self) -> &'static str {
        match self {
            ResourceKind::Note => "Note",
            ResourceKind::Task => "Task",
            ResourceKind::Link => "Link",
        }
    }

    /// Key of the on-device snapshot for this kind.
    pub fn snapshot_key(self) -> &'static str {
        match self {
            ResourceKind::Note => "notes",
            ResourceKind::Task => "tasks",
            ResourceKind::Link => "quickLinks",
        }
    }

    /// Collection path on the REST API.
    pub fn path(self) -> &'static str {
        match self {
            ResourceKind::Note => "notes",
            ResourceKind::Task => "tasks",
            ResourceKind::Link => "links",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
}

impl Priority {
    pub fn as_str(self) -> &'static str {
        match self {
            Priority::Low => "low",
            Priority::Medium => "medium",
            Priority::High => "high",
        }
    }
}

impl FromStr for Priority {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "low" => Ok(Priority::Low),
            "medium" => Ok(Priority::Medium),
            "high" => Ok(Priority::High),
            _ => Err(ValidationError::InvalidPriority),
        }
    }
}

/// A kind of user data managed by a resource store.
pub trait Resource:
    Clone + fmt::Debug + Serialize + DeserializeOwned + Send + Sync + 'static
{
    /// Creation input.
    type Draft: Clone + fmt::Debug + Serialize + Send + Sync;
    /// Partial update; `None` fields are left untouched.
    type Patch: Clone + fmt::Debug + Serialize + Send + Sync;

    const KIND: ResourceKind;

    fn id(&self) -> &RecordId;

    /// Normalize and validate creation input.
    fn prepare_draft(draft: Self::Draft) -> Result<Self::Draft, ValidationError>;

    /// Normalize and validate a partial update.
    fn prepare_patch(patch: Self::Patch) -> Result<Self::Patch, ValidationError>;

    /// Build a record without a server, as local mode does.
    fn from_draft(id: RecordId, draft: Self::Draft, existing: &[Self], now: DateTime<Utc>)
        -> Self;

    fn apply_patch(&mut self, patch: &Self::Patch, now: DateTime<Utc>);

    /// Collection used when no local snapshot exists yet.
    fn seed(_now: DateTime<Utc>) -> Vec<Self> {
        Vec::new()
    }

    /// Put records in display order.
    fn sort(_records: &mut [Self]) {}
}

// ── Notes ───────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Note {
    pub id: RecordId,
    pub title: String,
    #[serde(default)]
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NoteDraft {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub content: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NotePatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
}

impl Resource for Note {
    type Draft = NoteDraft;
    type Patch = NotePatch;

    const KIND: ResourceKind = ResourceKind::Note;

    fn id(&self) -> &RecordId {
        &self.id
    }

    fn prepare_draft(draft: NoteDraft) -> Result<NoteDraft, ValidationError> {
        require_text(&draft.title, "title")?;
        Ok(draft)
    }

    fn prepare_patch(patch: NotePatch) -> Result<NotePatch, ValidationError> {
        if patch.title.is_none() && patch.content.is_none() {
            return Err(ValidationError::NoFieldsToUpdate);
        }
        if let Some(title) = &patch.title {
            require_text(title, "title")?;
        }
        Ok(patch)
    }

    fn from_draft(id: RecordId, draft: NoteDraft, _existing: &[Self], now: DateTime<Utc>) -> Self {
        Note {
            id,
            title: draft.title,
            content: draft.content,
            created_at: now,
            updated_at: now,
        }
    }

    fn apply_patch(&mut self, patch: &NotePatch, now: DateTime<Utc>) {
        if let Some(title) = &patch.title {
            self.title = title.clone();
        }
        if let Some(content) = &patch.content {
            self.content = content.clone();
        }
        self.updated_at = now;
    }
}

// ── Tasks ───────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub id: RecordId,
    pub title: String,
    #[serde(default)]
    pub completed: bool,
    #[serde(default)]
    pub priority: Priority,
    #[serde(default)]
    pub due_date: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskDraft {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub priority: Priority,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_date: Option<String>,
}

impl TaskDraft {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            priority: Priority::default(),
            due_date: None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TaskPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<Priority>,
    /// `Some(None)` clears the due date; an absent field leaves it alone.
    #[serde(
        default,
        deserialize_with = "present",
        skip_serializing_if = "Option::is_none"
    )]
    pub due_date: Option<Option<String>>,
}

/// Maps a present field to `Some`, so an explicit `null` survives as `Some(None)`.
fn present<'de, T, D>(deserializer: D) -> Result<Option<T>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    T::deserialize(deserializer).map(Some)
}

impl TaskPatch {
    pub fn completed(completed: bool) -> Self {
        Self {
            completed: Some(completed),
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.completed.is_none()
            && self.priority.is_none()
            && self.due_date.is_none()
    }
}

impl Resource for Task {
    type Draft = TaskDraft;
    type Patch = TaskPatch;

    const KIND: ResourceKind = ResourceKind::Task;

    fn id(&self) -> &RecordId {
        &self.id
    }

    fn prepare_draft(mut draft: TaskDraft) -> Result<TaskDraft, ValidationError> {
        require_text(&draft.title, "title")?;
        draft.due_date = draft.due_date.filter(|d| !d.trim().is_empty());
        if let Some(due) = &draft.due_date {
            validate_date(due)?;
        }
        Ok(draft)
    }

    fn prepare_patch(patch: TaskPatch) -> Result<TaskPatch, ValidationError> {
        if patch.is_empty() {
            return Err(ValidationError::NoFieldsToUpdate);
        }
        if let Some(title) = &patch.title {
            require_text(title, "title")?;
        }
        if let Some(Some(due)) = &patch.due_date {
            validate_date(due)?;
        }
        Ok(patch)
    }

    fn from_draft(id: RecordId, draft: TaskDraft, _existing: &[Self], now: DateTime<Utc>) -> Self {
        Task {
            id,
            title: draft.title,
            completed: false,
            priority: draft.priority,
            due_date: draft.due_date,
            created_at: now,
        }
    }

    fn apply_patch(&mut self, patch: &TaskPatch, _now: DateTime<Utc>) {
        if let Some(title) = &patch.title {
            self.title = title.clone();
        }
        if let Some(completed) = patch.completed {
            self.completed = completed;
        }
        if let Some(priority) = patch.priority {
            self.priority = priority;
        }
        if let Some(due) = &patch.due_date {
            self.due_date = due.clone();
        }
    }
}

// ── Quick links ─────────────────────────────────────────────────────

pub const DEFAULT_LINK_ICON: &str = "🔗";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuickLink {
    pub id: RecordId,
    pub title: String,
    pub url: String,
    #[serde(default)]
    pub icon: Option<String>,
    #[serde(default)]
    pub position: i64,
    pub created_at: DateTime<Utc>,
}

impl QuickLink {
    /// Icon to render, falling back to [`DEFAULT_LINK_ICON`].
    pub fn display_icon(&self) -> &str {
        self.icon.as_deref().unwrap_or(DEFAULT_LINK_ICON)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinkDraft {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LinkPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
}

/// One entry of a reorder request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinkPosition {
    pub id: RecordId,
    pub position: i64,
}

/// Blank icons are stored as absent.
fn non_blank_icon(icon: Option<String>) -> Option<String> {
    icon.filter(|icon| !icon.trim().is_empty())
}

fn prepare_url(url: &str) -> Result<String, ValidationError> {
    require_text(url, "url")?;
    let url = normalize_url(url.trim());
    validate_url(&url)?;
    Ok(url)
}

impl Resource for QuickLink {
    type Draft = LinkDraft;
    type Patch = LinkPatch;

    const KIND: ResourceKind = ResourceKind::Link;

    fn id(&self) -> &RecordId {
        &self.id
    }

    fn prepare_draft(draft: LinkDraft) -> Result<LinkDraft, ValidationError> {
        require_text(&draft.title, "title")?;
        Ok(LinkDraft {
            url: prepare_url(&draft.url)?,
            icon: non_blank_icon(draft.icon),
            title: draft.title,
        })
    }

    fn prepare_patch(mut patch: LinkPatch) -> Result<LinkPatch, ValidationError> {
        if patch.title.is_none() && patch.url.is_none() && patch.icon.is_none() {
            return Err(ValidationError::NoFieldsToUpdate);
        }
        if let Some(title) = &patch.title {
            require_text(title, "title")?;
        }
        if let Some(url) = &patch.url {
            patch.url = Some(prepare_url(url)?);
        }
        Ok(patch)
    }

    fn from_draft(id: RecordId, draft: LinkDraft, existing: &[Self], now: DateTime<Utc>) -> Self {
        QuickLink {
            id,
            title: draft.title,
            url: draft.url,
            icon: draft.icon,
            position: next_position(existing),
            created_at: now,
        }
    }

    fn apply_patch(&mut self, patch: &LinkPatch, _now: DateTime<Utc>) {
        if let Some(title) = &patch.title {
            self.title = title.clone();
        }
        if let Some(url) = &patch.url {
            self.url = url.clone();
        }
        if let Some(icon) = &patch.icon {
            self.icon = non_blank_icon(Some(icon.clone()));
        }
    }

    fn seed(now: DateTime<Utc>) -> Vec<Self> {
        [
            ("1", "GitHub", "https://github.com", "🐙"),
            ("2", "Gmail", "https://gmail.com", "📧"),
            ("3", "Calendar", "https://calendar.google.com", "📅"),
        ]
        .into_iter()
        .enumerate()
        .map(|(position, (id, title, url, icon))| QuickLink {
            id: RecordId::from(id),
            title: title.to_string(),
            url: url.to_string(),
            icon: Some(icon.to_string()),
            position: position as i64,
            created_at: now,
        })
        .collect()
    }

    fn sort(records: &mut [Self]) {
        records.sort_by_key(|link| link.position);
    }
}

/// One past the highest position, or 0 for an empty collection.
pub fn next_position(links: &[QuickLink]) -> i64 {
    links.iter().map(|l| l.position).max().map_or(0, |max| max + 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_id_accepts_numbers_and_strings() {
        let from_int: RecordId = serde_json::from_str("42").unwrap();
        let from_str: RecordId = serde_json::from_str("\"1729180000000\"").unwrap();
        assert_eq!(from_int.as_str(), "42");
        assert_eq!(from_str.as_i64(), Some(1_729_180_000_000));
        assert_eq!(serde_json::to_string(&from_int).unwrap(), "42");
        assert_eq!(
            serde_json::to_string(&RecordId::from("local-1")).unwrap(),
            "\"local-1\""
        );
    }

    #[test]
    fn priority_parses_known_values() {
        assert_eq!("high".parse::<Priority>().unwrap(), Priority::High);
        assert_eq!(
            "urgent".parse::<Priority>(),
            Err(ValidationError::InvalidPriority)
        );
        assert_eq!(Priority::default(), Priority::Medium);
    }

    #[test]
    fn task_patch_distinguishes_null_from_absent_due_date() {
        let cleared: TaskPatch = serde_json::from_str(r#"{"due_date":null}"#).unwrap();
        assert_eq!(cleared.due_date, Some(None));
        assert!(!cleared.is_empty());
        let absent: TaskPatch = serde_json::from_str(r#"{"title":"x"}"#).unwrap();
        assert_eq!(absent.due_date, None);
        assert_eq!(serde_json::to_string(&cleared).unwrap(), r#"{"due_date":null}"#);

        let mut task = Task::from_draft(
            RecordId::from("1"),
            TaskDraft {
                title: "call bank".into(),
                priority: Priority::High,
                due_date: Some("2026-11-01".into()),
            },
            &[],
            Utc::now(),
        );
        task.apply_patch(&absent, Utc::now());
        assert_eq!(task.due_date.as_deref(), Some("2026-11-01"));
        task.apply_patch(&Task::prepare_patch(cleared).unwrap(), Utc::now());
        assert_eq!(task.due_date, None);
    }

    #[test]
    fn task_draft_defaults_to_medium() {
        let draft: TaskDraft = serde_json::from_str(r#"{"title":"Buy milk"}"#).unwrap();
        assert_eq!(draft.priority, Priority::Medium);
        let task = Task::from_draft(RecordId::from("1"), draft, &[], Utc::now());
        assert!(!task.completed);
    }

    #[test]
    fn note_requires_only_a_title() {
        let draft: NoteDraft = serde_json::from_str(r#"{"title":"Groceries"}"#).unwrap();
        assert_eq!(Note::prepare_draft(draft).unwrap().content, "");
        let untitled = NoteDraft {
            title: "  ".into(),
            content: "eggs".into(),
        };
        assert_eq!(
            Note::prepare_draft(untitled),
            Err(ValidationError::Required("title".into()))
        );
        let emptied = NotePatch {
            content: Some(String::new()),
            ..NotePatch::default()
        };
        assert!(Note::prepare_patch(emptied).is_ok());
        assert_eq!(
            Note::prepare_patch(NotePatch::default()),
            Err(ValidationError::NoFieldsToUpdate)
        );
    }

    #[test]
    fn note_patch_refreshes_updated_at() {
        let created = Utc::now() - chrono::Duration::hours(1);
        let mut note = Note::from_draft(
            RecordId::from("1"),
            NoteDraft {
                title: "a".into(),
                content: "b".into(),
            },
            &[],
            created,
        );
        let now = Utc::now();
        note.apply_patch(
            &NotePatch {
                content: Some("c".into()),
                ..NotePatch::default()
            },
            now,
        );
        assert_eq!(note.title, "a");
        assert_eq!(note.content, "c");
        assert_eq!(note.created_at, created);
        assert_eq!(note.updated_at, now);
    }

    #[test]
    fn link_draft_is_normalized() {
        let draft = LinkDraft {
            title: "Docs".into(),
            url: "docs.rs".into(),
            icon: None,
        };
        let prepared = QuickLink::prepare_draft(draft).unwrap();
        assert_eq!(prepared.url, "https://docs.rs");
        assert_eq!(prepared.icon, None);

        let blank = LinkDraft {
            title: "Blank".into(),
            url: "example.com".into(),
            icon: Some("  ".into()),
        };
        assert_eq!(QuickLink::prepare_draft(blank).unwrap().icon, None);

        let bad = LinkDraft {
            title: "Broken".into(),
            url: "exa mple".into(),
            icon: None,
        };
        assert_eq!(
            QuickLink::prepare_draft(bad),
            Err(ValidationError::InvalidUrl)
        );
    }

    #[test]
    fn missing_icon_renders_the_default() {
        let mut link = QuickLink::from_draft(
            RecordId::from(1),
            LinkDraft {
                title: "Docs".into(),
                url: "https://docs.rs".into(),
                icon: None,
            },
            &[],
            Utc::now(),
        );
        assert_eq!(link.icon, None);
        assert_eq!(link.display_icon(), DEFAULT_LINK_ICON);

        link.apply_patch(
            &LinkPatch {
                icon: Some("📚".into()),
                ..LinkPatch::default()
            },
            Utc::now(),
        );
        assert_eq!(link.display_icon(), "📚");
    }

    #[test]
    fn link_positions_follow_the_maximum() {
        let links = QuickLink::seed(Utc::now());
        assert_eq!(next_position(&links), 3);
        assert_eq!(next_position(&[]), 0);

        let mut shuffled = links.clone();
        shuffled[0].position = 10;
        QuickLink::sort(&mut shuffled);
        assert_eq!(shuffled[2].title, "GitHub");
        assert_eq!(next_position(&shuffled), 11);
    }
}
