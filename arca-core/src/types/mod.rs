//! Shared types used across the Arca workspace

pub mod summary;
pub mod taxonomy;
pub mod version;

pub use summary::UpdateSummary;
pub use taxonomy::{TaxonId, TaxonomicRank};
pub use version::SnapshotVersion;
