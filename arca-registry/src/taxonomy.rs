//! Lineage resolution and the shared taxonomy-node arena

use crate::client::{EntrezClient, TaxonSummary};
use crate::error::FetchError;
use arca_bio::record::{Annotation, SequenceRecord};
use arca_bio::taxonomy::{TaxonomyNode, UNCERTAINTY_KEYWORDS};
use arca_core::{TaxonId, TaxonomicRank};
use dashmap::DashMap;
use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

/// Process-wide arena of lineage nodes, keyed by external id.
///
/// At most one node exists per id; records hold `Arc` references into the
/// arena. Creation is race-safe: concurrent resolution of the same new id
/// lands on a single node, and an existing node is never overwritten.
#[derive(Debug, Default)]
pub struct TaxonomyCache {
    nodes: DashMap<TaxonId, Arc<TaxonomyNode>>,
}

impl TaxonomyCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, taxid: TaxonId) -> Option<Arc<TaxonomyNode>> {
        self.nodes.get(&taxid).map(|node| node.clone())
    }

    /// Atomic insert-if-absent; returns the canonical node for the id.
    pub fn get_or_create(
        &self,
        taxid: TaxonId,
        rank: TaxonomicRank,
        scientific_name: &str,
    ) -> Arc<TaxonomyNode> {
        self.nodes
            .entry(taxid)
            .or_insert_with(|| Arc::new(TaxonomyNode::new(taxid, rank, scientific_name)))
            .clone()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

/// Resolves taxonomic lineages for fetched records and annotates
/// taxonomic uncertainty.
pub struct TaxonomyResolver {
    client: EntrezClient,
    cache: Arc<TaxonomyCache>,
}

impl TaxonomyResolver {
    pub fn new(client: EntrezClient, cache: Arc<TaxonomyCache>) -> Self {
        Self { client, cache }
    }

    pub fn cache(&self) -> &Arc<TaxonomyCache> {
        &self.cache
    }

    /// Resolve lineages for every distinct taxonomy id referenced by the
    /// records, in one batched lookup through the shared rate limiter.
    ///
    /// On lineage-service failure the records keep their fetched sequence
    /// data; callers choosing to suppress the error simply proceed with
    /// unannotated records.
    pub async fn resolve(&self, records: &mut [SequenceRecord]) -> Result<(), FetchError> {
        let taxids: Vec<TaxonId> = records
            .iter()
            .filter_map(|r| r.taxid)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();

        let summaries: HashMap<TaxonId, TaxonSummary> = if taxids.is_empty() {
            HashMap::new()
        } else {
            tracing::info!(ids = taxids.len(), "resolving taxonomic lineages");
            let list = self.client.fetch_lineages(&taxids).await.map_err(|err| {
                tracing::error!(error = %err, "lineage lookup failed");
                FetchError::TaxonomyConnection {
                    taxids: taxids.clone(),
                }
            })?;
            list.into_iter()
                .map(|summary| (TaxonId::new(summary.taxid), summary))
                .collect()
        };

        for record in records.iter_mut() {
            if let Some(taxid) = record.taxid {
                if let Some(summary) = summaries.get(&taxid) {
                    for level in &summary.lineage {
                        if let Some(rank) = TaxonomicRank::from_registry(&level.rank) {
                            let node = self.cache.get_or_create(
                                TaxonId::new(level.taxid),
                                rank,
                                &level.scientific_name,
                            );
                            record.set_rank_link(rank, node);
                        }
                    }
                    // the queried taxon itself provides the species link
                    let node = self.cache.get_or_create(
                        taxid,
                        TaxonomicRank::Species,
                        &summary.scientific_name,
                    );
                    record.set_rank_link(TaxonomicRank::Species, node);
                }
            }
            annotate_uncertainty(record);
        }

        Ok(())
    }
}

/// Attach an annotation for every uncertainty keyword appearing in the
/// record's lineage text or definition.
pub fn annotate_uncertainty(record: &mut SequenceRecord) {
    for keyword in UNCERTAINTY_KEYWORDS {
        if record.lineage_text.contains(keyword) || record.definition.contains(keyword) {
            record
                .annotations
                .push(Annotation::unresolved_taxonomy(keyword));
        }
    }
}
