//! Abstract record store

pub mod memory;

pub use memory::MemoryStore;

use crate::error::LibraryError;
use crate::model::{ChangeLogEntry, Library, Snapshot};
use arca_bio::SequenceRecord;
use async_trait::async_trait;
use uuid::Uuid;

/// One atomic unit of change applied to a snapshot: record mutations and
/// their change-log entries land together or not at all.
#[derive(Debug, Clone)]
pub struct SnapshotCommit {
    /// Updated snapshot metadata
    pub snapshot: Snapshot,
    pub insert: Vec<SequenceRecord>,
    pub update: Vec<SequenceRecord>,
    /// Record ids to remove
    pub delete: Vec<Uuid>,
    pub log: Vec<ChangeLogEntry>,
}

impl SnapshotCommit {
    pub fn new(snapshot: Snapshot) -> Self {
        Self {
            snapshot,
            insert: Vec::new(),
            update: Vec::new(),
            delete: Vec::new(),
            log: Vec::new(),
        }
    }
}

/// Storage abstraction for libraries, snapshots, records and change logs.
///
/// The persistent engine behind it is not this crate's concern; the
/// in-tree [`MemoryStore`] backs tests and embedded use.
#[async_trait]
pub trait RecordStore: Send + Sync {
    async fn create_library(&self, library: Library) -> Result<(), LibraryError>;
    async fn library(&self, id: Uuid) -> Result<Library, LibraryError>;

    async fn create_snapshot(&self, snapshot: Snapshot) -> Result<(), LibraryError>;
    async fn snapshot(&self, id: Uuid) -> Result<Snapshot, LibraryError>;
    async fn snapshots(&self, library_id: Uuid) -> Result<Vec<Snapshot>, LibraryError>;

    /// The library's most recently sealed snapshot, by version order
    async fn latest_sealed(&self, library_id: Uuid) -> Result<Option<Snapshot>, LibraryError>;

    async fn records(&self, snapshot_id: Uuid) -> Result<Vec<SequenceRecord>, LibraryError>;
    async fn change_log(&self, snapshot_id: Uuid) -> Result<Vec<ChangeLogEntry>, LibraryError>;

    /// Apply a data mutation and its change-log entries as one atomic step
    async fn commit(&self, commit: SnapshotCommit) -> Result<(), LibraryError>;
}
