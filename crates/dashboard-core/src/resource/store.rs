//! Dual-persistence resource store.
//!
//! A store prefers the remote API and degrades to on-device snapshots:
//!
//! - `load()` probes the remote with a list call. Success selects
//!   [`StorageMode::Remote`]; any failure selects [`StorageMode::Local`] and
//!   reads the snapshot for the kind (seeding and persisting defaults when
//!   none exists).
//! - Every mutation is routed by the selected mode. Remote mutations update
//!   the mirror only after the server confirms; local mutations rewrite the
//!   whole snapshot before the mirror changes.
//! - The mode is never re-evaluated implicitly. `reprobe()` is the only way
//!   back from Local to Remote.
//!
//! A failed mutation leaves the mirror untouched, is logged, and is returned
//! to the caller.

use chrono::Utc;
use serde::Serialize;
use tracing::{info, warn};

use super::model::{LinkPosition, QuickLink, RecordId, Resource, Task, TaskPatch};
use super::remote::{LinkRemote, RemoteApi, TaskRemote};
use super::snapshot::SnapshotStore;
use crate::error::{CoreError, RemoteError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageMode {
    Remote,
    Local,
}

pub struct ResourceStore<R: Resource, A, S> {
    remote: A,
    snapshots: S,
    mode: StorageMode,
    mirror: Vec<R>,
    /// Last provisional id handed out in local mode (epoch millis).
    last_local_id: i64,
}

impl<R, A, S> ResourceStore<R, A, S>
where
    R: Resource,
    A: RemoteApi<R>,
    S: SnapshotStore,
{
    /// Create an unloaded store. Call [`load`](Self::load) before use.
    pub fn new(remote: A, snapshots: S) -> Self {
        Self {
            remote,
            snapshots,
            mode: StorageMode::Local,
            mirror: Vec::new(),
            last_local_id: 0,
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn mode(&self) -> StorageMode {
        self.mode
    }

    /// The mirror, in display order.
    pub fn records(&self) -> &[R] {
        &self.mirror
    }

    pub fn get(&self, id: &RecordId) -> Option<&R> {
        self.mirror.iter().find(|r| r.id() == id)
    }

    pub fn snapshots(&self) -> &S {
        &self.snapshots
    }

    pub fn remote(&self) -> &A {
        &self.remote
    }

    // ── Loading ──────────────────────────────────────────────────────

    /// Decide the storage mode and fill the mirror.
    pub async fn load(&mut self) -> Result<&[R]> {
        match self.remote.list_all().await {
            Ok(mut records) => {
                R::sort(&mut records);
                info!(kind = R::KIND.label(), count = records.len(), "loaded from remote");
                self.mode = StorageMode::Remote;
                self.mirror = records;
            }
            Err(e) => {
                warn!(
                    kind = R::KIND.label(),
                    error = %e,
                    "remote unavailable, using on-device storage"
                );
                self.mode = StorageMode::Local;
                self.mirror = self.read_snapshot()?;
            }
        }
        Ok(&self.mirror)
    }

    /// Try to move a local store back to the remote.
    ///
    /// Returns whether the store is in Remote mode afterwards. On success the
    /// mirror is replaced by the remote collection.
    pub async fn reprobe(&mut self) -> bool {
        if self.mode == StorageMode::Remote {
            return true;
        }
        match self.remote.list_all().await {
            Ok(mut records) => {
                R::sort(&mut records);
                info!(kind = R::KIND.label(), "remote reachable again");
                self.mode = StorageMode::Remote;
                self.mirror = records;
                true
            }
            Err(e) => {
                warn!(kind = R::KIND.label(), error = %e, "remote still unavailable");
                false
            }
        }
    }

    fn read_snapshot(&self) -> Result<Vec<R>> {
        let key = R::KIND.snapshot_key();
        if let Some(json) = self.snapshots.get(key)? {
            match serde_json::from_str::<Vec<R>>(&json) {
                Ok(mut records) => {
                    R::sort(&mut records);
                    return Ok(records);
                }
                Err(e) => {
                    warn!(key, error = %e, "discarding unreadable snapshot");
                }
            }
        }
        let seeded = R::seed(Utc::now());
        self.write_snapshot(&seeded)?;
        Ok(seeded)
    }

    fn write_snapshot(&self, records: &[R]) -> Result<()> {
        let json = serde_json::to_string(records)?;
        self.snapshots.set(R::KIND.snapshot_key(), &json)
    }

    // ── Mutations ────────────────────────────────────────────────────

    pub async fn create(&mut self, draft: R::Draft) -> Result<R> {
        self.try_create(draft)
            .await
            .inspect_err(|e| self.log_failure("create", e))
    }

    async fn try_create(&mut self, draft: R::Draft) -> Result<R> {
        let draft = R::prepare_draft(draft)?;
        match self.mode {
            StorageMode::Local => {
                let id = self.next_local_id();
                let record = R::from_draft(id, draft, &self.mirror, Utc::now());
                let mut next = self.mirror.clone();
                next.push(record.clone());
                R::sort(&mut next);
                self.commit_local(next)?;
                Ok(record)
            }
            StorageMode::Remote => {
                let record = self
                    .remote
                    .create(&draft)
                    .await
                    .map_err(|e| remote_error::<R>(e, None))?;
                self.mirror.push(record.clone());
                R::sort(&mut self.mirror);
                Ok(record)
            }
        }
    }

    pub async fn update(&mut self, id: &RecordId, patch: R::Patch) -> Result<R> {
        self.try_update(id, patch)
            .await
            .inspect_err(|e| self.log_failure("update", e))
    }

    async fn try_update(&mut self, id: &RecordId, patch: R::Patch) -> Result<R> {
        let index = self.index_of(id)?;
        let patch = R::prepare_patch(patch)?;
        match self.mode {
            StorageMode::Local => {
                let mut next = self.mirror.clone();
                next[index].apply_patch(&patch, Utc::now());
                let updated = next[index].clone();
                R::sort(&mut next);
                self.commit_local(next)?;
                Ok(updated)
            }
            StorageMode::Remote => {
                let updated = self
                    .remote
                    .update(id, &patch)
                    .await
                    .map_err(|e| remote_error::<R>(e, Some(id)))?;
                self.replace_confirmed(index, updated.clone());
                Ok(updated)
            }
        }
    }

    pub async fn delete(&mut self, id: &RecordId) -> Result<()> {
        self.try_delete(id)
            .await
            .inspect_err(|e| self.log_failure("delete", e))
    }

    async fn try_delete(&mut self, id: &RecordId) -> Result<()> {
        let index = self.index_of(id)?;
        match self.mode {
            StorageMode::Local => {
                let mut next = self.mirror.clone();
                next.remove(index);
                self.commit_local(next)
            }
            StorageMode::Remote => {
                self.remote
                    .delete(id)
                    .await
                    .map_err(|e| remote_error::<R>(e, Some(id)))?;
                self.mirror.remove(index);
                Ok(())
            }
        }
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn index_of(&self, id: &RecordId) -> Result<usize> {
        self.mirror
            .iter()
            .position(|r| r.id() == id)
            .ok_or_else(|| CoreError::not_found(R::KIND.label(), id.as_str()))
    }

    /// Persist `next` as the snapshot, then make it the mirror.
    fn commit_local(&mut self, next: Vec<R>) -> Result<()> {
        self.write_snapshot(&next)?;
        self.mirror = next;
        Ok(())
    }

    fn replace_confirmed(&mut self, index: usize, record: R) {
        self.mirror[index] = record;
        R::sort(&mut self.mirror);
    }

    /// Timestamp-derived id, strictly increasing within this store and
    /// distinct from every id already in the mirror.
    fn next_local_id(&mut self) -> RecordId {
        let mut candidate = Utc::now().timestamp_millis().max(self.last_local_id + 1);
        loop {
            let id = RecordId::from(candidate);
            if self.get(&id).is_none() {
                self.last_local_id = candidate;
                return id;
            }
            candidate += 1;
        }
    }

    fn log_failure(&self, op: &str, error: &CoreError) {
        warn!(
            kind = R::KIND.label(),
            op,
            mode = ?self.mode,
            error = %error,
            "mutation failed, state left unchanged"
        );
    }
}

fn remote_error<R: Resource>(error: RemoteError, id: Option<&RecordId>) -> CoreError {
    match (error, id) {
        (RemoteError::NotFound(_), Some(id)) => CoreError::not_found(R::KIND.label(), id.as_str()),
        (other, _) => CoreError::Remote(other),
    }
}

impl<A, S> ResourceStore<Task, A, S>
where
    A: TaskRemote,
    S: SnapshotStore,
{
    /// Flip a task's completed flag.
    pub async fn toggle(&mut self, id: &RecordId) -> Result<Task> {
        self.try_toggle(id)
            .await
            .inspect_err(|e| self.log_failure("toggle", e))
    }

    async fn try_toggle(&mut self, id: &RecordId) -> Result<Task> {
        let index = self.index_of(id)?;
        match self.mode {
            StorageMode::Local => {
                let patch = TaskPatch::completed(!self.mirror[index].completed);
                let mut next = self.mirror.clone();
                next[index].apply_patch(&patch, Utc::now());
                let updated = next[index].clone();
                self.commit_local(next)?;
                Ok(updated)
            }
            StorageMode::Remote => {
                let updated = self
                    .remote
                    .toggle(id)
                    .await
                    .map_err(|e| remote_error::<Task>(e, Some(id)))?;
                self.replace_confirmed(index, updated.clone());
                Ok(updated)
            }
        }
    }
}

impl<A, S> ResourceStore<QuickLink, A, S>
where
    A: LinkRemote,
    S: SnapshotStore,
{
    /// Assign explicit positions and re-sort the links.
    pub async fn reorder(&mut self, positions: &[LinkPosition]) -> Result<&[QuickLink]> {
        if let Err(e) = self.try_reorder(positions).await {
            self.log_failure("reorder", &e);
            return Err(e);
        }
        Ok(&self.mirror)
    }

    async fn try_reorder(&mut self, positions: &[LinkPosition]) -> Result<()> {
        for entry in positions {
            self.index_of(&entry.id)?;
        }
        match self.mode {
            StorageMode::Local => {
                let mut next = self.mirror.clone();
                for entry in positions {
                    if let Some(link) = next.iter_mut().find(|l| l.id == entry.id) {
                        link.position = entry.position;
                    }
                }
                QuickLink::sort(&mut next);
                self.commit_local(next)
            }
            StorageMode::Remote => {
                let mut links = self
                    .remote
                    .reorder(positions)
                    .await
                    .map_err(|e| remote_error::<QuickLink>(e, None))?;
                QuickLink::sort(&mut links);
                self.mirror = links;
                Ok(())
            }
        }
    }

    /// Reorder so that `ids` appear first, in the given order, followed by
    /// the remaining links in their current order.
    pub async fn move_to_front(&mut self, ids: &[RecordId]) -> Result<&[QuickLink]> {
        let mut ordered: Vec<RecordId> = ids.to_vec();
        for link in &self.mirror {
            if !ordered.contains(&link.id) {
                ordered.push(link.id.clone());
            }
        }
        let positions: Vec<LinkPosition> = ordered
            .into_iter()
            .enumerate()
            .map(|(position, id)| LinkPosition {
                id,
                position: position as i64,
            })
            .collect();
        self.reorder(&positions).await
    }
}
