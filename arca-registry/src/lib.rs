//! Rate-limited, batched client for the external sequence registry

pub mod client;
pub mod error;
pub mod fetch;
pub mod limiter;
pub mod taxonomy;

pub use client::{ClientError, EntrezClient, LineageLevel, SearchSession, TaxonSummary};
pub use error::FetchError;
pub use fetch::{FetchMode, RecordFetcher};
pub use limiter::RegistryLimiter;
pub use taxonomy::{TaxonomyCache, TaxonomyResolver};
