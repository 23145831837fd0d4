//! In-memory record store

use crate::error::LibraryError;
use crate::model::{ChangeLogEntry, Library, Snapshot};
use crate::store::{RecordStore, SnapshotCommit};
use arca_bio::SequenceRecord;
use async_trait::async_trait;
use parking_lot::RwLock;
use std::collections::{HashMap, HashSet};
use uuid::Uuid;

#[derive(Default)]
struct State {
    libraries: HashMap<Uuid, Library>,
    snapshots: HashMap<Uuid, Snapshot>,
    records: HashMap<Uuid, Vec<SequenceRecord>>,
    logs: HashMap<Uuid, Vec<ChangeLogEntry>>,
}

/// Record store backed by process memory. A single write lock over the
/// whole state makes every commit trivially atomic.
#[derive(Default)]
pub struct MemoryStore {
    state: RwLock<State>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl RecordStore for MemoryStore {
    async fn create_library(&self, library: Library) -> Result<(), LibraryError> {
        let mut state = self.state.write();
        state.libraries.insert(library.id, library);
        Ok(())
    }

    async fn library(&self, id: Uuid) -> Result<Library, LibraryError> {
        self.state
            .read()
            .libraries
            .get(&id)
            .cloned()
            .ok_or(LibraryError::LibraryNotFound(id))
    }

    async fn create_snapshot(&self, snapshot: Snapshot) -> Result<(), LibraryError> {
        let mut state = self.state.write();
        if !state.libraries.contains_key(&snapshot.library_id) {
            return Err(LibraryError::LibraryNotFound(snapshot.library_id));
        }
        state.records.entry(snapshot.id).or_default();
        state.logs.entry(snapshot.id).or_default();
        state.snapshots.insert(snapshot.id, snapshot);
        Ok(())
    }

    async fn snapshot(&self, id: Uuid) -> Result<Snapshot, LibraryError> {
        self.state
            .read()
            .snapshots
            .get(&id)
            .cloned()
            .ok_or(LibraryError::SnapshotNotFound(id))
    }

    async fn snapshots(&self, library_id: Uuid) -> Result<Vec<Snapshot>, LibraryError> {
        let state = self.state.read();
        let mut snapshots: Vec<Snapshot> = state
            .snapshots
            .values()
            .filter(|s| s.library_id == library_id)
            .cloned()
            .collect();
        snapshots.sort_by_key(|s| s.created);
        Ok(snapshots)
    }

    async fn latest_sealed(&self, library_id: Uuid) -> Result<Option<Snapshot>, LibraryError> {
        let state = self.state.read();
        Ok(state
            .snapshots
            .values()
            .filter(|s| s.library_id == library_id && s.locked)
            .max_by_key(|s| s.version)
            .cloned())
    }

    async fn records(&self, snapshot_id: Uuid) -> Result<Vec<SequenceRecord>, LibraryError> {
        let state = self.state.read();
        if !state.snapshots.contains_key(&snapshot_id) {
            return Err(LibraryError::SnapshotNotFound(snapshot_id));
        }
        Ok(state.records.get(&snapshot_id).cloned().unwrap_or_default())
    }

    async fn change_log(&self, snapshot_id: Uuid) -> Result<Vec<ChangeLogEntry>, LibraryError> {
        let state = self.state.read();
        if !state.snapshots.contains_key(&snapshot_id) {
            return Err(LibraryError::SnapshotNotFound(snapshot_id));
        }
        Ok(state.logs.get(&snapshot_id).cloned().unwrap_or_default())
    }

    async fn commit(&self, commit: SnapshotCommit) -> Result<(), LibraryError> {
        let mut state = self.state.write();
        let snapshot_id = commit.snapshot.id;

        let stored = state
            .snapshots
            .get(&snapshot_id)
            .ok_or(LibraryError::SnapshotNotFound(snapshot_id))?;
        if stored.locked {
            return Err(LibraryError::SnapshotLocked);
        }

        // Validate inserts against ownership and per-snapshot uniqueness
        // before touching anything, so a rejected commit changes nothing.
        let records = state.records.entry(snapshot_id).or_default();
        let mut accessions: HashSet<&str> =
            records.iter().map(|r| r.accession.as_str()).collect();
        for record in &commit.insert {
            if record.owner_snapshot != Some(snapshot_id) {
                return Err(LibraryError::Store(format!(
                    "record {} does not belong to snapshot {}",
                    record.accession, snapshot_id
                )));
            }
            if !accessions.insert(record.accession.as_str()) {
                return Err(LibraryError::Store(format!(
                    "duplicate accession {} in snapshot {}",
                    record.accession, snapshot_id
                )));
            }
        }

        records.extend(commit.insert);
        for updated in commit.update {
            if let Some(existing) = records.iter_mut().find(|r| r.id == updated.id) {
                *existing = updated;
            }
        }
        if !commit.delete.is_empty() {
            let doomed: HashSet<Uuid> = commit.delete.into_iter().collect();
            records.retain(|r| !doomed.contains(&r.id));
        }

        state.logs.entry(snapshot_id).or_default().extend(commit.log);
        state.snapshots.insert(snapshot_id, commit.snapshot);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use arca_core::SnapshotVersion;

    async fn seeded() -> (MemoryStore, Library, Snapshot) {
        let store = MemoryStore::new();
        let library = Library::new("fishes", "curator");
        store.create_library(library.clone()).await.unwrap();
        let snapshot = Snapshot::new(library.id);
        store.create_snapshot(snapshot.clone()).await.unwrap();
        (store, library, snapshot)
    }

    fn owned_record(snapshot: &Snapshot, accession: &str) -> SequenceRecord {
        let mut record =
            SequenceRecord::new(accession, format!("{accession}.1")).with_sequence("ACGT");
        record.owner_snapshot = Some(snapshot.id);
        record
    }

    #[tokio::test]
    async fn test_commit_applies_data_and_log_together() {
        let (store, _, snapshot) = seeded().await;

        let mut commit = SnapshotCommit::new(snapshot.clone());
        commit.insert.push(owned_record(&snapshot, "A1"));
        commit
            .log
            .push(ChangeLogEntry::new("Added sequences", "A1.1"));
        store.commit(commit).await.unwrap();

        assert_eq!(store.records(snapshot.id).await.unwrap().len(), 1);
        let log = store.change_log(snapshot.id).await.unwrap();
        assert_eq!(log.len(), 1);
        assert_eq!(log[0].summary, "Added sequences");
    }

    #[tokio::test]
    async fn test_rejected_commit_changes_nothing() {
        let (store, _, snapshot) = seeded().await;

        let mut first = SnapshotCommit::new(snapshot.clone());
        first.insert.push(owned_record(&snapshot, "A1"));
        store.commit(first).await.unwrap();

        // duplicate accession plus a log entry that must not land
        let mut second = SnapshotCommit::new(snapshot.clone());
        second.insert.push(owned_record(&snapshot, "A1"));
        second.log.push(ChangeLogEntry::new("Added sequences", "dup"));
        let err = store.commit(second).await.unwrap_err();
        assert!(matches!(err, LibraryError::Store(_)));

        assert_eq!(store.records(snapshot.id).await.unwrap().len(), 1);
        assert!(store.change_log(snapshot.id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_commit_to_locked_snapshot_is_rejected() {
        let (store, _, snapshot) = seeded().await;

        let mut sealed = snapshot.clone();
        sealed.locked = true;
        store.commit(SnapshotCommit::new(sealed)).await.unwrap();

        let mut commit = SnapshotCommit::new(snapshot.clone());
        commit.insert.push(owned_record(&snapshot, "A1"));
        let err = store.commit(commit).await.unwrap_err();
        assert!(matches!(err, LibraryError::SnapshotLocked));
    }

    #[tokio::test]
    async fn test_record_ownership_is_enforced() {
        let (store, _, snapshot) = seeded().await;

        let stray = SequenceRecord::new("A1", "A1.1").with_sequence("ACGT");
        let mut commit = SnapshotCommit::new(snapshot.clone());
        commit.insert.push(stray);
        let err = store.commit(commit).await.unwrap_err();
        assert!(matches!(err, LibraryError::Store(_)));
    }

    #[tokio::test]
    async fn test_latest_sealed_picks_highest_version() {
        let (store, library, first) = seeded().await;

        let mut sealed_first = first.clone();
        sealed_first.locked = true;
        sealed_first.version = SnapshotVersion::new(1, 0, 0);
        store.commit(SnapshotCommit::new(sealed_first)).await.unwrap();

        let second = Snapshot::new(library.id);
        store.create_snapshot(second.clone()).await.unwrap();
        let mut sealed_second = second.clone();
        sealed_second.locked = true;
        sealed_second.version = SnapshotVersion::new(2, 0, 0);
        store
            .commit(SnapshotCommit::new(sealed_second))
            .await
            .unwrap();

        let third = Snapshot::new(library.id);
        store.create_snapshot(third.clone()).await.unwrap();

        let latest = store.latest_sealed(library.id).await.unwrap().unwrap();
        assert_eq!(latest.id, second.id);
        assert_eq!(latest.version, SnapshotVersion::new(2, 0, 0));
    }

    #[tokio::test]
    async fn test_unknown_snapshot_is_reported() {
        let store = MemoryStore::new();
        let missing = Uuid::new_v4();
        let err = store.records(missing).await.unwrap_err();
        assert!(matches!(err, LibraryError::SnapshotNotFound(_)));
    }
}
