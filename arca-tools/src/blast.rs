//! BLAST index builder integration

use crate::error::BuildError;
use crate::traits::IndexBuilder;
use std::path::{Path, PathBuf};
use std::process::Command;

/// Wrapper around the `makeblastdb` binary
#[derive(Debug)]
pub struct MakeBlastDb {
    binary_path: PathBuf,
}

impl MakeBlastDb {
    /// Create a builder for an explicit binary path
    pub fn new(binary_path: PathBuf) -> Result<Self, BuildError> {
        if !binary_path.exists() {
            return Err(BuildError::BinaryNotFound(binary_path));
        }
        Ok(Self { binary_path })
    }

    /// Locate the binary on PATH
    pub fn discover() -> Option<Self> {
        which::which("makeblastdb")
            .ok()
            .map(|binary_path| Self { binary_path })
    }

    pub fn binary_path(&self) -> &Path {
        &self.binary_path
    }
}

impl IndexBuilder for MakeBlastDb {
    fn build(&self, input: &Path, output: &Path, title: &str) -> Result<(), BuildError> {
        let mut cmd = Command::new(&self.binary_path);
        cmd.arg("-in")
            .arg(input)
            .arg("-dbtype")
            .arg("nucl")
            .arg("-out")
            .arg(output)
            .arg("-title")
            .arg(title)
            .arg("-parse_seqids");

        tracing::info!(input = %input.display(), output = %output.display(), "building index");
        let result = cmd.output()?;

        if !result.status.success() {
            return Err(BuildError::Failed {
                status: result.status.to_string(),
                stderr: String::from_utf8_lossy(&result.stderr).trim().to_string(),
            });
        }
        Ok(())
    }

    fn is_available(&self) -> bool {
        self.binary_path.exists()
    }

    fn version(&self) -> Result<String, BuildError> {
        let output = Command::new(&self.binary_path).arg("-version").output()?;
        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }
}
