//! Taxonomic lineage nodes

use arca_core::{TaxonId, TaxonomicRank};
use serde::{Deserialize, Serialize};

/// One node of an external-registry lineage.
///
/// Nodes are deduplicated by external id and shared between records; the
/// arena lives in the registry crate's taxonomy cache, records hold
/// `Arc` references.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TaxonomyNode {
    pub taxid: TaxonId,
    pub rank: TaxonomicRank,
    pub scientific_name: String,
}

impl TaxonomyNode {
    pub fn new(taxid: TaxonId, rank: TaxonomicRank, scientific_name: impl Into<String>) -> Self {
        Self {
            taxid,
            rank,
            scientific_name: scientific_name.into(),
        }
    }
}

/// Substrings in a record's lineage or definition that signal taxonomic
/// uncertainty and trigger an auto-annotation.
pub const UNCERTAINTY_KEYWORDS: [&str; 11] = [
    "cf.",
    "aff.",
    "sp.",
    "environment",
    "undescribed",
    "uncultured",
    "complex",
    "unclassified",
    "nom.",
    "nud.",
    "unidentif",
];
