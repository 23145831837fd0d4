//! Mutation operations on unlocked snapshots

use crate::error::LibraryError;
use crate::locks::AdvisoryLocks;
use crate::model::{ChangeLogEntry, Snapshot};
use crate::operations::filter::FilterCriteria;
use crate::store::{RecordStore, SnapshotCommit};
use arca_bio::SequenceRecord;
use arca_registry::{FetchError, FetchMode, RecordFetcher, TaxonomyResolver};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use uuid::Uuid;

/// Result of an addition, distinguishing a clean success from a success
/// with downgraded warnings
#[derive(Debug)]
pub struct AddOutcome {
    pub added: Vec<SequenceRecord>,
    pub warnings: Vec<String>,
}

impl AddOutcome {
    pub fn is_clean(&self) -> bool {
        self.warnings.is_empty()
    }
}

/// Result of a bulk update
#[derive(Debug)]
pub struct UpdateOutcome {
    pub updated: Vec<SequenceRecord>,
    /// Accessions the registry no longer carries; their records were removed
    pub deleted: Vec<String>,
    pub warnings: Vec<String>,
}

impl UpdateOutcome {
    pub fn is_clean(&self) -> bool {
        self.warnings.is_empty()
    }
}

/// Mutates working snapshots: add, update, delete, filter, clone.
///
/// Every operation requires the target snapshot to be unlocked, holds the
/// snapshot's advisory lock for its duration, and finishes with a single
/// atomic commit of record changes plus change-log entries.
pub struct CollectionEditor {
    store: Arc<dyn RecordStore>,
    fetcher: RecordFetcher,
    resolver: TaxonomyResolver,
    locks: AdvisoryLocks,
}

impl CollectionEditor {
    pub fn new(
        store: Arc<dyn RecordStore>,
        fetcher: RecordFetcher,
        resolver: TaxonomyResolver,
    ) -> Self {
        Self {
            store,
            fetcher,
            resolver,
            locks: AdvisoryLocks::new(),
        }
    }

    async fn editable(&self, snapshot_id: Uuid) -> Result<Snapshot, LibraryError> {
        let snapshot = self.store.snapshot(snapshot_id).await?;
        if snapshot.locked {
            return Err(LibraryError::SnapshotLocked);
        }
        Ok(snapshot)
    }

    /// Fetch the requested accessions and/or search results, resolve
    /// taxonomy, filter the incoming set, and bulk-insert the survivors.
    ///
    /// Fails with [`LibraryError::AccessionsAlreadyExist`] before any
    /// network interaction when a requested accession is already present.
    /// In lenient mode, partial registry data and lineage-service failures
    /// are downgraded to warnings carried in the outcome.
    pub async fn add_records(
        &self,
        snapshot_id: Uuid,
        accessions: &[String],
        search_term: Option<&str>,
        criteria: &FilterCriteria,
        mode: FetchMode,
    ) -> Result<AddOutcome, LibraryError> {
        let _guard = self.locks.acquire(snapshot_id).await;
        let snapshot = self.editable(snapshot_id).await?;

        let mut existing: HashSet<String> = self
            .store
            .records(snapshot_id)
            .await?
            .into_iter()
            .map(|r| r.accession)
            .collect();

        let conflicting: Vec<String> = accessions
            .iter()
            .filter(|a| existing.contains(a.as_str()))
            .cloned()
            .collect();
        if !conflicting.is_empty() {
            return Err(LibraryError::AccessionsAlreadyExist { conflicting });
        }

        let mut warnings = Vec::new();
        let mut fetched = self.fetcher.fetch(accessions, search_term, mode).await?;

        if mode == FetchMode::Lenient {
            let returned: HashSet<&str> = fetched
                .iter()
                .flat_map(|r| [r.accession.as_str(), r.version.as_str()])
                .collect();
            let missing: Vec<&String> = accessions
                .iter()
                .filter(|a| !returned.contains(a.as_str()))
                .collect();
            if !missing.is_empty() {
                warnings.push(format!(
                    "registry response omitted {} accession(s)",
                    missing.len()
                ));
            }
        }

        match self.resolver.resolve(&mut fetched).await {
            Ok(()) => {}
            Err(err @ FetchError::TaxonomyConnection { .. }) if mode == FetchMode::Lenient => {
                tracing::warn!(error = %err, "proceeding with unannotated records");
                warnings.push(err.to_string());
            }
            Err(err) => return Err(err.into()),
        }

        let mut inserted = Vec::new();
        for mut record in fetched {
            // search results may overlap records already present
            if existing.contains(&record.accession) {
                continue;
            }
            if criteria.violates(&record) {
                continue;
            }
            record.owner_snapshot = Some(snapshot_id);
            existing.insert(record.accession.clone());
            inserted.push(record);
        }

        let mut detail = inserted
            .iter()
            .map(|r| r.version.clone())
            .collect::<Vec<_>>()
            .join(", ");
        if let Some(term) = search_term {
            detail.push_str(&format!(" (search term: \"{}\")", term));
        }

        let mut commit = SnapshotCommit::new(snapshot);
        commit.insert = inserted.clone();
        commit.log.push(ChangeLogEntry::new("Added sequences", detail));
        self.store.commit(commit).await?;

        tracing::info!(snapshot = %snapshot_id, added = inserted.len(), "records added");
        Ok(AddOutcome {
            added: inserted,
            warnings,
        })
    }

    /// Re-fetch authoritative registry data for the given accessions
    /// (empty means all) and overwrite matching fields in place. Records
    /// whose accessions the registry no longer returns are removed and
    /// reported in the outcome.
    pub async fn update_records(
        &self,
        snapshot_id: Uuid,
        accessions: &[String],
        mode: FetchMode,
    ) -> Result<UpdateOutcome, LibraryError> {
        let _guard = self.locks.acquire(snapshot_id).await;
        let snapshot = self.editable(snapshot_id).await?;
        let current = self.store.records(snapshot_id).await?;

        let targets: Vec<&SequenceRecord> = if accessions.is_empty() {
            current.iter().collect()
        } else {
            let requested: HashSet<&str> = accessions.iter().map(String::as_str).collect();
            let present: HashSet<&str> = current.iter().map(|r| r.accession.as_str()).collect();
            let missing: Vec<String> = requested
                .iter()
                .filter(|a| !present.contains(**a))
                .map(|a| a.to_string())
                .collect();
            if !missing.is_empty() {
                return Err(LibraryError::AccessionsNotFound { missing });
            }
            current
                .iter()
                .filter(|r| requested.contains(r.accession.as_str()))
                .collect()
        };

        if targets.is_empty() {
            return Ok(UpdateOutcome {
                updated: Vec::new(),
                deleted: Vec::new(),
                warnings: Vec::new(),
            });
        }

        let ids: Vec<String> = targets.iter().map(|r| r.accession.clone()).collect();
        let fetched = self.fetcher.fetch(&ids, None, mode).await?;
        let by_accession: HashMap<&str, &SequenceRecord> = fetched
            .iter()
            .map(|r| (r.accession.as_str(), r))
            .collect();

        let mut warnings = Vec::new();
        let mut updated = Vec::new();
        let mut removed = Vec::new();
        for record in targets {
            match by_accession.get(record.accession.as_str()) {
                Some(fresh) => {
                    let mut next = record.clone();
                    next.apply_registry_data(fresh);
                    updated.push(next);
                }
                None => removed.push(record.clone()),
            }
        }
        if !removed.is_empty() {
            warnings.push(format!(
                "{} record(s) no longer present in the registry were removed",
                removed.len()
            ));
        }

        let mut detail = format!("{} record(s) refreshed", updated.len());
        if !removed.is_empty() {
            detail.push_str(&format!(
                "; removed {}",
                removed
                    .iter()
                    .map(|r| r.version.clone())
                    .collect::<Vec<_>>()
                    .join(", ")
            ));
        }

        let deleted: Vec<String> = removed.iter().map(|r| r.accession.clone()).collect();
        let mut commit = SnapshotCommit::new(snapshot);
        commit.update = updated.clone();
        commit.delete = removed.iter().map(|r| r.id).collect();
        commit
            .log
            .push(ChangeLogEntry::new("Updated sequences", detail));
        self.store.commit(commit).await?;

        Ok(UpdateOutcome {
            updated,
            deleted,
            warnings,
        })
    }

    /// Remove the given accessions. Unmatched identifiers are ignored;
    /// removing zero records is valid.
    pub async fn delete_records(
        &self,
        snapshot_id: Uuid,
        accessions: &[String],
    ) -> Result<usize, LibraryError> {
        let _guard = self.locks.acquire(snapshot_id).await;
        let snapshot = self.editable(snapshot_id).await?;
        let current = self.store.records(snapshot_id).await?;

        let requested: HashSet<&str> = accessions.iter().map(String::as_str).collect();
        let doomed: Vec<&SequenceRecord> = current
            .iter()
            .filter(|r| requested.contains(r.accession.as_str()))
            .collect();
        let count = doomed.len();

        let detail = doomed
            .iter()
            .map(|r| r.version.clone())
            .collect::<Vec<_>>()
            .join(", ");
        let mut commit = SnapshotCommit::new(snapshot);
        commit.delete = doomed.iter().map(|r| r.id).collect();
        commit
            .log
            .push(ChangeLogEntry::new("Deleted sequences", detail));
        self.store.commit(commit).await?;

        tracing::info!(snapshot = %snapshot_id, removed = count, "records deleted");
        Ok(count)
    }

    /// Remove every record violating the criteria and return the removed
    /// records. The applied criteria are always recorded in the change
    /// log, even when nothing was removed.
    pub async fn filter_records(
        &self,
        snapshot_id: Uuid,
        criteria: &FilterCriteria,
    ) -> Result<Vec<SequenceRecord>, LibraryError> {
        let _guard = self.locks.acquire(snapshot_id).await;
        let snapshot = self.editable(snapshot_id).await?;
        let current = self.store.records(snapshot_id).await?;

        let removed: Vec<SequenceRecord> = current
            .into_iter()
            .filter(|r| criteria.violates(r))
            .collect();

        let detail = format!("{} ({} removed)", criteria.describe(), removed.len());
        let mut commit = SnapshotCommit::new(snapshot);
        commit.delete = removed.iter().map(|r| r.id).collect();
        commit
            .log
            .push(ChangeLogEntry::new("Filtered sequences", detail));
        self.store.commit(commit).await?;

        Ok(removed)
    }

    /// Create a new unlocked snapshot carrying copies of a base
    /// snapshot's records. Records are copied with fresh identities,
    /// never re-parented.
    pub async fn clone_snapshot(
        &self,
        base_snapshot_id: Uuid,
        description: impl Into<String>,
    ) -> Result<Snapshot, LibraryError> {
        let base = self.store.snapshot(base_snapshot_id).await?;
        let records = self.store.records(base_snapshot_id).await?;

        let snapshot = Snapshot::new(base.library_id).with_description(description);
        self.store.create_snapshot(snapshot.clone()).await?;

        let mut commit = SnapshotCommit::new(snapshot.clone());
        commit.insert = records.iter().map(|r| r.clone_into(snapshot.id)).collect();
        commit.log.push(ChangeLogEntry::new(
            "Cloned record set",
            format!("from {} ({})", base.id, base.label()),
        ));
        self.store.commit(commit).await?;

        Ok(snapshot)
    }
}
