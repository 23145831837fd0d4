//! Batched, rate-limited record retrieval

use crate::client::{ClientError, EntrezClient};
use crate::error::FetchError;
use arca_bio::formats::genbank::parse_genbank;
use arca_bio::SequenceRecord;
use arca_core::config::RegistryConfig;
use std::collections::HashSet;
use std::time::Duration;

/// How to treat identifiers the registry fails to return
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchMode {
    /// Missing identifiers fail the whole fetch
    Strict,
    /// Proceed with partial results; the omission is logged
    Lenient,
}

/// Retrieves records from the registry in fixed-size sequential batches.
///
/// A hard ceiling on the number of accessions per operation is enforced
/// before any network interaction. Batches are never issued concurrently;
/// the shared rate limiter inside the client spaces individual requests
/// and an explicit cooldown separates batches.
pub struct RecordFetcher {
    client: EntrezClient,
    max_accessions: usize,
    batch_size: usize,
    cooldown: Duration,
}

impl RecordFetcher {
    pub fn new(client: EntrezClient) -> Self {
        Self {
            client,
            max_accessions: 1500,
            batch_size: 300,
            cooldown: Duration::from_secs(1),
        }
    }

    pub fn with_limits(mut self, max_accessions: usize, batch_size: usize) -> Self {
        self.max_accessions = max_accessions;
        self.batch_size = batch_size.max(1);
        self
    }

    pub fn with_cooldown(mut self, cooldown: Duration) -> Self {
        self.cooldown = cooldown;
        self
    }

    /// Build a fetcher, with its own shared limiter, from configuration.
    ///
    /// The taxonomy resolver must share the limiter: construct it from a
    /// clone of [`Self::client`].
    pub fn from_config(config: &RegistryConfig) -> Result<Self, ClientError> {
        let limiter = crate::limiter::shared(Duration::from_millis(config.request_period_ms));
        let client = EntrezClient::new(config.base_url.clone(), limiter)?
            .with_identity(config.tool.clone(), config.email.clone());
        Ok(Self::new(client)
            .with_limits(config.max_accessions, config.batch_size)
            .with_cooldown(Duration::from_millis(config.batch_cooldown_ms)))
    }

    pub fn client(&self) -> &EntrezClient {
        &self.client
    }

    pub fn max_accessions(&self) -> usize {
        self.max_accessions
    }

    /// Fetch records for the given accessions and/or search term.
    pub async fn fetch(
        &self,
        accessions: &[String],
        term: Option<&str>,
        mode: FetchMode,
    ) -> Result<Vec<SequenceRecord>, FetchError> {
        let term = term.map(str::trim).filter(|t| !t.is_empty());
        let unique = dedup_preserving_order(accessions);

        if unique.is_empty() && term.is_none() {
            return Err(FetchError::EmptyQuery);
        }
        if unique.len() > self.max_accessions {
            return Err(FetchError::AccessionLimitExceeded {
                requested: unique.len(),
                max: self.max_accessions,
            });
        }

        let mut records = Vec::new();

        if let Some(term) = term {
            let session = self
                .client
                .search(term)
                .await
                .map_err(|err| classify(err, &[], Some(term)))?;
            tracing::info!(term, count = session.count, "registry search complete");

            if session.count > self.max_accessions {
                return Err(FetchError::AccessionLimitExceeded {
                    requested: session.count,
                    max: self.max_accessions,
                });
            }

            let mut start = 0;
            while start < session.count {
                let text = self
                    .client
                    .fetch_search_page(&session, start, self.batch_size)
                    .await
                    .map_err(|err| classify(err, &[], Some(term)))?;
                records.extend(parse_genbank(&text));
                start += self.batch_size;
                if start < session.count {
                    tokio::time::sleep(self.cooldown).await;
                }
            }
        }

        for (index, batch) in unique.chunks(self.batch_size).enumerate() {
            if index > 0 {
                tokio::time::sleep(self.cooldown).await;
            }
            tracing::debug!(batch = index + 1, size = batch.len(), "requesting record batch");
            let text = self
                .client
                .fetch_by_ids(batch)
                .await
                .map_err(|err| classify(err, batch, None))?;
            records.extend(parse_genbank(&text));
        }

        // A successful response that omits requested identifiers signals
        // retired or mistyped accessions, not a transport problem.
        let returned: HashSet<&str> = records
            .iter()
            .flat_map(|r| [r.accession.as_str(), r.version.as_str()])
            .collect();
        let missing: Vec<String> = unique
            .iter()
            .filter(|a| !returned.contains(a.as_str()))
            .cloned()
            .collect();
        if !missing.is_empty() {
            match mode {
                FetchMode::Strict => return Err(FetchError::InsufficientData { missing }),
                FetchMode::Lenient => tracing::warn!(
                    missing = missing.len(),
                    "registry response omitted requested accessions"
                ),
            }
        }

        Ok(records)
    }

    /// Fetch with an overall deadline. A timed-out fetch yields nothing:
    /// results are only returned after the full pipeline completes.
    pub async fn fetch_with_deadline(
        &self,
        accessions: &[String],
        term: Option<&str>,
        mode: FetchMode,
        deadline: Duration,
    ) -> Result<Vec<SequenceRecord>, FetchError> {
        tokio::time::timeout(deadline, self.fetch(accessions, term, mode))
            .await
            .map_err(|_| FetchError::DeadlineExceeded(deadline))?
    }
}

fn dedup_preserving_order(accessions: &[String]) -> Vec<String> {
    let mut seen = HashSet::new();
    accessions
        .iter()
        .filter(|a| seen.insert(a.as_str()))
        .cloned()
        .collect()
}

fn classify(err: ClientError, accessions: &[String], term: Option<&str>) -> FetchError {
    match err {
        // The registry answers a request naming unknown identifiers with
        // a client-error status rather than a partial body
        ClientError::Status(400) => FetchError::InsufficientData {
            missing: accessions.to_vec(),
        },
        other => {
            tracing::error!(error = %other, "registry request failed");
            FetchError::RegistryConnection {
                accessions: accessions.to_vec(),
                term: term.map(str::to_string),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dedup_preserves_first_seen_order() {
        let input = vec![
            "B".to_string(),
            "A".to_string(),
            "B".to_string(),
            "C".to_string(),
            "A".to_string(),
        ];
        assert_eq!(dedup_preserving_order(&input), vec!["B", "A", "C"]);
    }

    #[test]
    fn test_from_config_applies_limits() {
        let config = RegistryConfig {
            max_accessions: 10,
            batch_size: 5,
            ..Default::default()
        };
        let fetcher = RecordFetcher::from_config(&config).unwrap();
        assert_eq!(fetcher.max_accessions(), 10);
        assert_eq!(fetcher.batch_size, 5);
    }

    #[test]
    fn test_classify_bad_request_as_insufficient_data() {
        let accessions = vec!["AB1".to_string()];
        match classify(ClientError::Status(400), &accessions, None) {
            FetchError::InsufficientData { missing } => assert_eq!(missing, accessions),
            other => panic!("unexpected classification: {other:?}"),
        }
        match classify(ClientError::Status(502), &accessions, Some("fish")) {
            FetchError::RegistryConnection { accessions: a, term } => {
                assert_eq!(a, accessions);
                assert_eq!(term.as_deref(), Some("fish"));
            }
            other => panic!("unexpected classification: {other:?}"),
        }
    }
}
