//! Failure classification for registry operations

use arca_core::TaxonId;
use std::time::Duration;
use thiserror::Error;

/// Errors surfaced by the fetch pipeline and taxonomy resolver.
///
/// The client never retries on its own beyond the rate-limit backoff;
/// retry policy belongs to the caller.
#[derive(Debug, Error)]
pub enum FetchError {
    /// Neither accessions nor a search term were provided
    #[error("no accessions or search term were provided")]
    EmptyQuery,

    /// More accessions requested than one operation allows; raised before
    /// any network interaction
    #[error("{requested} accessions requested but at most {max} are allowed per operation")]
    AccessionLimitExceeded { requested: usize, max: usize },

    /// Transport-level failure talking to the registry
    #[error("could not reach the sequence registry ({} accessions, term {:?})", .accessions.len(), .term)]
    RegistryConnection {
        accessions: Vec<String>,
        term: Option<String>,
    },

    /// The registry responded but omitted requested identifiers,
    /// signalling retired or mistyped accessions
    #[error("registry response was missing {} requested accession(s)", .missing.len())]
    InsufficientData { missing: Vec<String> },

    /// Transport-level failure talking to the lineage service; fetched
    /// sequence data is not lost, callers may proceed unannotated
    #[error("could not reach the taxonomy service ({} lineage ids)", .taxids.len())]
    TaxonomyConnection { taxids: Vec<TaxonId> },

    /// The overall fetch deadline elapsed; nothing was applied
    #[error("fetch did not complete within {0:?}")]
    DeadlineExceeded(Duration),
}
