//! Configuration types for Arca

use crate::ArcaError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub registry: RegistryConfig,
    #[serde(default)]
    pub build: BuildConfig,
    #[serde(default)]
    pub library: LibraryConfig,
}

/// Settings for the external sequence registry client
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegistryConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Client identification sent with every request
    #[serde(default = "default_tool")]
    pub tool: String,
    #[serde(default)]
    pub email: Option<String>,
    /// Hard ceiling on accessions per fetch operation
    #[serde(default = "default_max_accessions")]
    pub max_accessions: usize,
    /// Accessions per registry request
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,
    /// Minimum spacing between outbound requests
    #[serde(default = "default_request_period_ms")]
    pub request_period_ms: u64,
    /// Extra delay inserted between consecutive batches
    #[serde(default = "default_batch_cooldown_ms")]
    pub batch_cooldown_ms: u64,
    /// Overall deadline for one fetch operation, if any
    #[serde(default)]
    pub fetch_deadline_secs: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuildConfig {
    /// Path to the index builder binary; discovered on PATH when unset
    #[serde(default)]
    pub builder_path: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LibraryConfig {
    /// Directory where sealed snapshot artifacts are written
    #[serde(default)]
    pub export_dir: Option<String>,
}

// Default value functions
fn default_base_url() -> String {
    "https://eutils.ncbi.nlm.nih.gov/entrez/eutils".to_string()
}
fn default_tool() -> String {
    "arca".to_string()
}
fn default_max_accessions() -> usize {
    1500
}
fn default_batch_size() -> usize {
    300
}
fn default_request_period_ms() -> u64 {
    1000
}
fn default_batch_cooldown_ms() -> u64 {
    1000
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            tool: default_tool(),
            email: None,
            max_accessions: default_max_accessions(),
            batch_size: default_batch_size(),
            request_period_ms: default_request_period_ms(),
            batch_cooldown_ms: default_batch_cooldown_ms(),
            fetch_deadline_secs: None,
        }
    }
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self { builder_path: None }
    }
}

impl Default for LibraryConfig {
    fn default() -> Self {
        Self { export_dir: None }
    }
}

/// Load configuration from a TOML file
pub fn load_config(path: &Path) -> Result<Config, ArcaError> {
    let content = std::fs::read_to_string(path)?;
    let config = toml::from_str(&content)?;
    Ok(config)
}

/// Save configuration to a TOML file
pub fn save_config(config: &Config, path: &Path) -> Result<(), ArcaError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let content = toml::to_string_pretty(config)?;
    std::fs::write(path, content)?;
    Ok(())
}

/// Default location of the user configuration file
pub fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("arca")
        .join("config.toml")
}
