//! Libraries, snapshots and the per-snapshot change log

use arca_core::SnapshotVersion;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Durable, named container for a line of versioned snapshots
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Library {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub owner: String,
    /// Visible outside the owner's account
    pub public: bool,
    pub created: DateTime<Utc>,
}

impl Library {
    pub fn new(name: impl Into<String>, owner: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            description: String::new(),
            owner: owner.into(),
            public: false,
            created: Utc::now(),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_visibility(mut self, public: bool) -> Self {
        self.public = public;
        self
    }
}

/// Point-in-time state of a library's record set.
///
/// A snapshot is created unlocked and freely editable. Sealing assigns a
/// version, sets `locked`, and is one-way: a locked snapshot's record set
/// and version never change afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub id: Uuid,
    pub library_id: Uuid,
    pub version: SnapshotVersion,
    pub locked: bool,
    pub description: String,
    pub created: DateTime<Utc>,
    pub sealed_at: Option<DateTime<Utc>>,
}

impl Snapshot {
    pub fn new(library_id: Uuid) -> Self {
        Self {
            id: Uuid::new_v4(),
            library_id,
            version: SnapshotVersion::default(),
            locked: false,
            description: String::new(),
            created: Utc::now(),
            sealed_at: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn label(&self) -> String {
        if self.locked {
            format!("version {}", self.version)
        } else {
            "unpublished".to_string()
        }
    }
}

/// Append-only audit entry, written atomically with the data change it
/// describes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChangeLogEntry {
    pub at: DateTime<Utc>,
    pub summary: String,
    pub detail: String,
}

impl ChangeLogEntry {
    pub fn new(summary: impl Into<String>, detail: impl Into<String>) -> Self {
        Self {
            at: Utc::now(),
            summary: summary.into(),
            detail: detail.into(),
        }
    }
}
