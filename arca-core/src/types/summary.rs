//! Classification of the differences between two record sets

use serde::{Deserialize, Serialize};

/// Partition of accession identifiers produced by comparing two record sets.
///
/// Every accession present in either set lands in exactly one bucket.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateSummary {
    /// Present in the current set only
    pub added: Vec<String>,
    /// Present in the previous set only
    pub deleted: Vec<String>,
    /// Version tag or sequence payload differs
    pub version_changed: Vec<String>,
    /// Descriptive metadata differs; version tag and sequence identical
    pub metadata_changed: Vec<String>,
    /// Nothing differs
    pub unchanged: Vec<String>,
}

impl UpdateSummary {
    /// Any change that alters the content identity of the collection
    pub fn has_content_changes(&self) -> bool {
        !self.added.is_empty() || !self.deleted.is_empty() || !self.version_changed.is_empty()
    }

    pub fn has_metadata_changes(&self) -> bool {
        !self.metadata_changed.is_empty()
    }

    /// Total number of classified accessions
    pub fn total(&self) -> usize {
        self.added.len()
            + self.deleted.len()
            + self.version_changed.len()
            + self.metadata_changed.len()
            + self.unchanged.len()
    }

    /// One-line description for change logs
    pub fn describe(&self) -> String {
        format!(
            "{} added, {} deleted, {} version changes, {} metadata changes, {} unchanged",
            self.added.len(),
            self.deleted.len(),
            self.version_changed.len(),
            self.metadata_changed.len(),
            self.unchanged.len()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_change_detection() {
        let mut summary = UpdateSummary::default();
        assert!(!summary.has_content_changes());
        assert!(!summary.has_metadata_changes());

        summary.metadata_changed.push("AB1".into());
        assert!(!summary.has_content_changes());
        assert!(summary.has_metadata_changes());

        summary.deleted.push("AB2".into());
        assert!(summary.has_content_changes());
    }

    #[test]
    fn test_describe() {
        let summary = UpdateSummary {
            added: vec!["A".into(), "B".into()],
            unchanged: vec!["C".into()],
            ..Default::default()
        };
        assert_eq!(summary.total(), 3);
        assert_eq!(
            summary.describe(),
            "2 added, 0 deleted, 0 version changes, 0 metadata changes, 1 unchanged"
        );
    }
}
