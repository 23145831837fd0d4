//! Error types for collection operations

use arca_core::ArcaError;
use arca_registry::FetchError;
use arca_tools::BuildError;
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum LibraryError {
    /// The target snapshot has been sealed and can no longer change
    #[error("snapshot is locked and can no longer be edited")]
    SnapshotLocked,

    /// Requested additions clash with accessions already in the snapshot
    #[error("{} accession(s) already exist in the snapshot", .conflicting.len())]
    AccessionsAlreadyExist { conflicting: Vec<String> },

    /// Requested accessions are absent from the snapshot
    #[error("{} accession(s) were not found in the snapshot", .missing.len())]
    AccessionsNotFound { missing: Vec<String> },

    #[error("library {0} not found")]
    LibraryNotFound(Uuid),

    #[error("snapshot {0} not found")]
    SnapshotNotFound(Uuid),

    #[error(transparent)]
    Fetch(#[from] FetchError),

    /// External index build failed; the seal attempt is aborted
    #[error("index build failed: {0}")]
    Build(#[from] BuildError),

    #[error("store error: {0}")]
    Store(String),

    #[error(transparent)]
    Core(#[from] ArcaError),
}
