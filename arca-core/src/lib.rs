//! Core utilities and types shared across all Arca crates

pub mod config;
pub mod error;
pub mod logging;
pub mod types;

// Re-export commonly used types
pub use config::{default_config_path, load_config, save_config, Config};
pub use error::{ArcaError, ArcaResult};
pub use types::{SnapshotVersion, TaxonId, TaxonomicRank, UpdateSummary};

/// Version information for the Arca project
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const DESCRIPTION: &str = env!("CARGO_PKG_DESCRIPTION");
