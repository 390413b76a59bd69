//! User data (notes, tasks, quick links) and the stores that persist it.

mod model;
mod remote;
mod snapshot;
mod store;
mod url;

pub use model::{
    next_position, LinkDraft, LinkPatch, LinkPosition, Note, NoteDraft, NotePatch, Priority,
    QuickLink, RecordId, Resource, ResourceKind, Task, TaskDraft, TaskPatch, DEFAULT_LINK_ICON,
};
pub use remote::{LinkRemote, RemoteApi, RemoteClient, TaskRemote};
pub use snapshot::{MemorySnapshotStore, SnapshotStore};
pub use store::{ResourceStore, StorageMode};
pub use self::url::normalize_url;
