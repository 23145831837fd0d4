//! The accession-identified sequence record

use crate::taxonomy::TaxonomyNode;
use arca_core::{TaxonId, TaxonomicRank};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

/// One record retrieved from the external sequence registry.
///
/// Identity within a snapshot is the accession; the version tag changes
/// whenever the registry revises the record's content.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SequenceRecord {
    pub id: Uuid,
    /// Snapshot this record belongs to; set when the record is inserted
    pub owner_snapshot: Option<Uuid>,

    pub accession: String,
    /// The accession.version tag assigned by the registry
    pub version: String,
    pub definition: String,
    /// Raw nucleotide payload
    pub sequence: String,
    pub keywords: String,

    // First bibliographic reference
    pub authors: String,
    pub title: String,
    pub journal: String,

    // Source-feature metadata
    pub organism: String,
    pub organelle: String,
    pub isolate: String,
    pub country: String,
    pub specimen_voucher: String,
    pub type_material: String,
    pub lat_lon: String,
    pub identified_by: String,
    pub collected_by: String,
    pub collection_date: String,

    /// Taxonomy cross-reference from the source feature
    pub taxid: Option<TaxonId>,
    /// Lineage annotation text as given by the registry
    pub lineage_text: String,
    pub modification_date: Option<NaiveDate>,

    // Resolved lineage, shared from the taxonomy cache
    pub taxon_superkingdom: Option<Arc<TaxonomyNode>>,
    pub taxon_kingdom: Option<Arc<TaxonomyNode>>,
    pub taxon_phylum: Option<Arc<TaxonomyNode>>,
    pub taxon_class: Option<Arc<TaxonomyNode>>,
    pub taxon_order: Option<Arc<TaxonomyNode>>,
    pub taxon_family: Option<Arc<TaxonomyNode>>,
    pub taxon_genus: Option<Arc<TaxonomyNode>>,
    pub taxon_species: Option<Arc<TaxonomyNode>>,

    pub annotations: Vec<Annotation>,

    pub created: DateTime<Utc>,
    pub updated: DateTime<Utc>,
}

impl SequenceRecord {
    pub fn new(accession: impl Into<String>, version: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            owner_snapshot: None,
            accession: accession.into(),
            version: version.into(),
            definition: String::new(),
            sequence: String::new(),
            keywords: String::new(),
            authors: String::new(),
            title: String::new(),
            journal: String::new(),
            organism: String::new(),
            organelle: String::new(),
            isolate: String::new(),
            country: String::new(),
            specimen_voucher: String::new(),
            type_material: String::new(),
            lat_lon: String::new(),
            identified_by: String::new(),
            collected_by: String::new(),
            collection_date: String::new(),
            taxid: None,
            lineage_text: String::new(),
            modification_date: None,
            taxon_superkingdom: None,
            taxon_kingdom: None,
            taxon_phylum: None,
            taxon_class: None,
            taxon_order: None,
            taxon_family: None,
            taxon_genus: None,
            taxon_species: None,
            annotations: Vec::new(),
            created: now,
            updated: now,
        }
    }

    pub fn with_sequence(mut self, sequence: impl Into<String>) -> Self {
        self.sequence = sequence.into();
        self
    }

    pub fn with_definition(mut self, definition: impl Into<String>) -> Self {
        self.definition = definition.into();
        self
    }

    pub fn with_organism(mut self, organism: impl Into<String>) -> Self {
        self.organism = organism.into();
        self
    }

    pub fn len(&self) -> usize {
        self.sequence.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sequence.is_empty()
    }

    /// Count of symbols outside the canonical four-base alphabet,
    /// case-insensitive.
    pub fn ambiguous_bases(&self) -> usize {
        self.sequence
            .bytes()
            .filter(|b| !matches!(b.to_ascii_uppercase(), b'A' | b'C' | b'G' | b'T'))
            .count()
    }

    /// True when all eight taxonomic rank links are resolved
    pub fn has_complete_lineage(&self) -> bool {
        TaxonomicRank::ALL.iter().all(|r| self.rank_link(*r).is_some())
    }

    pub fn rank_link(&self, rank: TaxonomicRank) -> Option<&Arc<TaxonomyNode>> {
        match rank {
            TaxonomicRank::Superkingdom => self.taxon_superkingdom.as_ref(),
            TaxonomicRank::Kingdom => self.taxon_kingdom.as_ref(),
            TaxonomicRank::Phylum => self.taxon_phylum.as_ref(),
            TaxonomicRank::Class => self.taxon_class.as_ref(),
            TaxonomicRank::Order => self.taxon_order.as_ref(),
            TaxonomicRank::Family => self.taxon_family.as_ref(),
            TaxonomicRank::Genus => self.taxon_genus.as_ref(),
            TaxonomicRank::Species => self.taxon_species.as_ref(),
        }
    }

    pub fn set_rank_link(&mut self, rank: TaxonomicRank, node: Arc<TaxonomyNode>) {
        let slot = match rank {
            TaxonomicRank::Superkingdom => &mut self.taxon_superkingdom,
            TaxonomicRank::Kingdom => &mut self.taxon_kingdom,
            TaxonomicRank::Phylum => &mut self.taxon_phylum,
            TaxonomicRank::Class => &mut self.taxon_class,
            TaxonomicRank::Order => &mut self.taxon_order,
            TaxonomicRank::Family => &mut self.taxon_family,
            TaxonomicRank::Genus => &mut self.taxon_genus,
            TaxonomicRank::Species => &mut self.taxon_species,
        };
        *slot = Some(node);
    }

    /// The fixed metadata fields compared when classifying an update as
    /// metadata-only.
    pub fn metadata_fields(&self) -> [&str; 8] {
        [
            &self.definition,
            &self.organism,
            &self.organelle,
            &self.isolate,
            &self.country,
            &self.specimen_voucher,
            &self.type_material,
            &self.lat_lon,
        ]
    }

    /// Overwrite every registry-derived field with freshly fetched data,
    /// leaving identity, ownership and resolved lineage links untouched,
    /// and stamp the update time.
    pub fn apply_registry_data(&mut self, fetched: &SequenceRecord) {
        self.version = fetched.version.clone();
        self.definition = fetched.definition.clone();
        self.sequence = fetched.sequence.clone();
        self.keywords = fetched.keywords.clone();
        self.authors = fetched.authors.clone();
        self.title = fetched.title.clone();
        self.journal = fetched.journal.clone();
        self.organism = fetched.organism.clone();
        self.organelle = fetched.organelle.clone();
        self.isolate = fetched.isolate.clone();
        self.country = fetched.country.clone();
        self.specimen_voucher = fetched.specimen_voucher.clone();
        self.type_material = fetched.type_material.clone();
        self.lat_lon = fetched.lat_lon.clone();
        self.identified_by = fetched.identified_by.clone();
        self.collected_by = fetched.collected_by.clone();
        self.collection_date = fetched.collection_date.clone();
        self.taxid = fetched.taxid;
        self.lineage_text = fetched.lineage_text.clone();
        self.modification_date = fetched.modification_date;
        self.updated = Utc::now();
    }

    /// Copy this record into another snapshot. Always a copy with a fresh
    /// identity, never a re-parenting.
    pub fn clone_into(&self, snapshot: Uuid) -> Self {
        let mut copy = self.clone();
        copy.id = Uuid::new_v4();
        copy.owner_snapshot = Some(snapshot);
        copy
    }
}

/// Automatic annotation attached to a record during processing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Annotation {
    pub kind: AnnotationKind,
    pub comment: String,
    pub created: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AnnotationKind {
    UnresolvedTaxonomy,
}

impl Annotation {
    pub fn unresolved_taxonomy(keyword: &str) -> Self {
        Self {
            kind: AnnotationKind::UnresolvedTaxonomy,
            comment: format!(
                "Potential taxonomic uncertainty due to presence of \"{}\" within lineage or definition.",
                keyword
            ),
            created: Utc::now(),
        }
    }
}
