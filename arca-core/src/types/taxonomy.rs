//! Taxonomy identifiers and ranks

use serde::{Deserialize, Serialize};
use std::fmt;

/// External registry taxonomy identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TaxonId(pub u32);

impl TaxonId {
    /// Create a new TaxonId
    pub fn new(id: u32) -> Self {
        Self(id)
    }

    /// Get the inner value
    pub fn value(&self) -> u32 {
        self.0
    }
}

impl fmt::Display for TaxonId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u32> for TaxonId {
    fn from(id: u32) -> Self {
        Self(id)
    }
}

/// The eight taxonomic ranks tracked on every record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaxonomicRank {
    Superkingdom,
    Kingdom,
    Phylum,
    Class,
    Order,
    Family,
    Genus,
    Species,
}

impl TaxonomicRank {
    /// All ranks, outermost first
    pub const ALL: [TaxonomicRank; 8] = [
        TaxonomicRank::Superkingdom,
        TaxonomicRank::Kingdom,
        TaxonomicRank::Phylum,
        TaxonomicRank::Class,
        TaxonomicRank::Order,
        TaxonomicRank::Family,
        TaxonomicRank::Genus,
        TaxonomicRank::Species,
    ];

    /// Map a registry rank string onto a tracked rank.
    ///
    /// Intermediate ranks (suborder, tribe, "no rank", ...) return `None`
    /// and are skipped during lineage attachment.
    pub fn from_registry(rank: &str) -> Option<Self> {
        match rank {
            "superkingdom" => Some(TaxonomicRank::Superkingdom),
            "kingdom" => Some(TaxonomicRank::Kingdom),
            "phylum" => Some(TaxonomicRank::Phylum),
            "class" => Some(TaxonomicRank::Class),
            "order" => Some(TaxonomicRank::Order),
            "family" => Some(TaxonomicRank::Family),
            "genus" => Some(TaxonomicRank::Genus),
            "species" => Some(TaxonomicRank::Species),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TaxonomicRank::Superkingdom => "superkingdom",
            TaxonomicRank::Kingdom => "kingdom",
            TaxonomicRank::Phylum => "phylum",
            TaxonomicRank::Class => "class",
            TaxonomicRank::Order => "order",
            TaxonomicRank::Family => "family",
            TaxonomicRank::Genus => "genus",
            TaxonomicRank::Species => "species",
        }
    }
}

impl fmt::Display for TaxonomicRank {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
