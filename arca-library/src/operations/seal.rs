//! The one-way seal transition

use crate::diff::diff;
use crate::error::LibraryError;
use crate::locks::AdvisoryLocks;
use crate::model::{ChangeLogEntry, Snapshot};
use crate::store::{RecordStore, SnapshotCommit};
use arca_bio::formats::fasta::write_fasta;
use arca_core::{ArcaError, SnapshotVersion};
use arca_tools::IndexBuilder;
use chrono::Utc;
use std::path::PathBuf;
use std::sync::Arc;
use uuid::Uuid;

/// Seals unlocked snapshots: assigns the next version from the diff
/// against the previously sealed snapshot, materializes the record set
/// for the external index builder, and marks the snapshot immutable.
///
/// At most one seal is in flight per library; concurrent attempts queue
/// on the library's advisory lock.
pub struct SnapshotSealer {
    store: Arc<dyn RecordStore>,
    builder: Arc<dyn IndexBuilder>,
    locks: AdvisoryLocks,
    export_dir: PathBuf,
}

impl SnapshotSealer {
    pub fn new(
        store: Arc<dyn RecordStore>,
        builder: Arc<dyn IndexBuilder>,
        export_dir: PathBuf,
    ) -> Self {
        Self {
            store,
            builder,
            locks: AdvisoryLocks::new(),
            export_dir,
        }
    }

    /// Seal a snapshot. Fails with [`LibraryError::SnapshotLocked`] when
    /// it is already sealed, and with [`LibraryError::Build`] when the
    /// index builder fails, in which case the snapshot stays unlocked and
    /// unchanged and the seal may simply be retried.
    pub async fn seal(&self, snapshot_id: Uuid) -> Result<Snapshot, LibraryError> {
        let library_id = self.store.snapshot(snapshot_id).await?.library_id;
        let _guard = self.locks.acquire(library_id).await;

        // re-read under the lock
        let mut snapshot = self.store.snapshot(snapshot_id).await?;
        if snapshot.locked {
            return Err(LibraryError::SnapshotLocked);
        }
        let library = self.store.library(snapshot.library_id).await?;
        let current = self.store.records(snapshot_id).await?;

        let previous = self.store.latest_sealed(library.id).await?;
        let (version, summary) = match &previous {
            Some(prev) => {
                let prev_records = self.store.records(prev.id).await?;
                let summary = diff(&prev_records, &current);
                let version = SnapshotVersion::next(Some(prev.version), &summary);
                (version, Some(summary))
            }
            None => (SnapshotVersion::FIRST, None),
        };

        let artifact_dir = self
            .export_dir
            .join(library.id.to_string())
            .join(version.to_string());
        std::fs::create_dir_all(&artifact_dir).map_err(ArcaError::from)?;
        let fasta_path = artifact_dir.join("database.fasta");
        write_fasta(&fasta_path, &current)?;

        self.builder
            .build(&fasta_path, &artifact_dir.join("database"), &library.name)?;

        snapshot.version = version;
        snapshot.locked = true;
        snapshot.sealed_at = Some(Utc::now());

        let detail = match &summary {
            Some(summary) => format!("version {} ({})", version, summary.describe()),
            None => format!("version {} (first sealed snapshot)", version),
        };
        let mut commit = SnapshotCommit::new(snapshot.clone());
        commit.log.push(ChangeLogEntry::new("Locked database", detail));
        self.store.commit(commit).await?;

        tracing::info!(library = %library.name, version = %version, "snapshot sealed");
        Ok(snapshot)
    }
}
