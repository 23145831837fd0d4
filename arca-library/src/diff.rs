//! Set reconciliation between two record collections

use arca_bio::SequenceRecord;
use arca_core::UpdateSummary;
use std::collections::HashMap;

/// Classify every accession present in either record set into exactly one
/// of the five summary buckets.
///
/// Sets are treated as unordered and keyed by accession. A version-tag or
/// sequence difference classifies as `version_changed` and takes priority
/// over any metadata difference.
pub fn diff(previous: &[SequenceRecord], current: &[SequenceRecord]) -> UpdateSummary {
    let prev_by_accession: HashMap<&str, &SequenceRecord> = previous
        .iter()
        .map(|record| (record.accession.as_str(), record))
        .collect();
    let curr_by_accession: HashMap<&str, &SequenceRecord> = current
        .iter()
        .map(|record| (record.accession.as_str(), record))
        .collect();

    let mut summary = UpdateSummary::default();

    for record in previous {
        if !curr_by_accession.contains_key(record.accession.as_str()) {
            summary.deleted.push(record.accession.clone());
        }
    }

    for record in current {
        match prev_by_accession.get(record.accession.as_str()) {
            None => summary.added.push(record.accession.clone()),
            Some(prev) => {
                if record.version != prev.version || record.sequence != prev.sequence {
                    summary.version_changed.push(record.accession.clone());
                } else if record.metadata_fields() != prev.metadata_fields() {
                    summary.metadata_changed.push(record.accession.clone());
                } else {
                    summary.unchanged.push(record.accession.clone());
                }
            }
        }
    }

    summary
}
