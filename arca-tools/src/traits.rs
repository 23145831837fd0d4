//! Traits for index-building tools

use crate::error::BuildError;
use std::path::Path;

/// An external tool that turns an exported record set into a queryable
/// index artifact. The core only depends on its exit status.
pub trait IndexBuilder: Send + Sync {
    /// Build an index from `input` (FASTA) into `output`, titled `title`.
    fn build(&self, input: &Path, output: &Path, title: &str) -> Result<(), BuildError>;

    /// Check if the tool is available
    fn is_available(&self) -> bool;

    /// Get tool version
    fn version(&self) -> Result<String, BuildError>;
}
