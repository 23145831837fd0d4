//! Record removal criteria

use arca_bio::SequenceRecord;
use serde::{Deserialize, Serialize};

/// Criteria for removing records from a working snapshot.
///
/// Predicates combine with logical OR: violating any single condition is
/// sufficient for removal. `None` bounds are unbounded.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FilterCriteria {
    pub min_length: Option<usize>,
    pub max_length: Option<usize>,
    /// Maximum count of symbols outside the canonical four-base alphabet
    pub max_ambiguous_bases: Option<usize>,
    /// Identifiers to remove, matched by accession or version tag
    pub blacklist: Vec<String>,
    /// Remove records missing any of the eight taxonomic rank links
    pub require_taxonomy: bool,
}

impl FilterCriteria {
    pub fn is_empty(&self) -> bool {
        self.min_length.is_none()
            && self.max_length.is_none()
            && self.max_ambiguous_bases.is_none()
            && self.blacklist.is_empty()
            && !self.require_taxonomy
    }

    /// True when the record violates at least one criterion
    pub fn violates(&self, record: &SequenceRecord) -> bool {
        if self
            .blacklist
            .iter()
            .any(|id| id == &record.accession || id == &record.version)
        {
            return true;
        }
        if let Some(min) = self.min_length {
            if record.len() < min {
                return true;
            }
        }
        if let Some(max) = self.max_length {
            if record.len() > max {
                return true;
            }
        }
        if let Some(max) = self.max_ambiguous_bases {
            if record.ambiguous_bases() > max {
                return true;
            }
        }
        if self.require_taxonomy && !record.has_complete_lineage() {
            return true;
        }
        false
    }

    /// Description of the applied criteria for the change log
    pub fn describe(&self) -> String {
        let mut parts = Vec::new();
        if !self.blacklist.is_empty() {
            parts.push(format!(
                "remove blacklisted identifiers {}",
                self.blacklist.join(", ")
            ));
        }
        if let Some(min) = self.min_length {
            parts.push(format!("delete length < {} bp", min));
        }
        if let Some(max) = self.max_length {
            parts.push(format!("delete length > {} bp", max));
        }
        if let Some(max) = self.max_ambiguous_bases {
            parts.push(format!("delete if ambiguous bases > {}", max));
        }
        if self.require_taxonomy {
            parts.push("delete if taxonomy incomplete".to_string());
        }
        if parts.is_empty() {
            "no criteria".to_string()
        } else {
            parts.join("; ")
        }
    }
}
