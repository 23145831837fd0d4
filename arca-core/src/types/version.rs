//! Snapshot version numbers and the bump policy

use super::summary::UpdateSummary;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Three-part snapshot version, ordered lexicographically.
///
/// The leading component tracks content-identity changes against the
/// external registry, the middle component metadata-only changes, and the
/// trailing component no-op republishing.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct SnapshotVersion {
    pub genbank: u32,
    pub major: u32,
    pub minor: u32,
}

impl SnapshotVersion {
    /// Version assigned to the first sealed snapshot of a library
    pub const FIRST: Self = Self {
        genbank: 1,
        major: 0,
        minor: 0,
    };

    pub fn new(genbank: u32, major: u32, minor: u32) -> Self {
        Self {
            genbank,
            major,
            minor,
        }
    }

    /// Compute the version for a new sealed snapshot.
    ///
    /// Strict precedence ladder: content-identity changes (added, deleted,
    /// or version-changed accessions) bump the leading component and reset
    /// the rest; metadata-only changes bump the middle component; an
    /// unchanged record set still gets a new trailing component. With no
    /// previously sealed snapshot the result is always [`Self::FIRST`].
    pub fn next(previous: Option<SnapshotVersion>, summary: &UpdateSummary) -> Self {
        let Some(prev) = previous else {
            return Self::FIRST;
        };
        if summary.has_content_changes() {
            Self::new(prev.genbank + 1, 0, 0)
        } else if summary.has_metadata_changes() {
            Self::new(prev.genbank, prev.major + 1, 0)
        } else {
            Self::new(prev.genbank, prev.major, prev.minor + 1)
        }
    }
}

impl fmt::Display for SnapshotVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.genbank, self.major, self.minor)
    }
}
