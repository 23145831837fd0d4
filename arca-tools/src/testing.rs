//! Mock index builder for tests

use crate::error::BuildError;
use crate::traits::IndexBuilder;
use parking_lot::Mutex;
use std::path::{Path, PathBuf};

/// One recorded build invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildInvocation {
    pub input: PathBuf,
    pub output: PathBuf,
    pub title: String,
}

/// Mock builder that records invocations and can be primed to fail
#[derive(Default)]
pub struct MockIndexBuilder {
    invocations: Mutex<Vec<BuildInvocation>>,
    fail_with: Mutex<Option<String>>,
}

impl MockIndexBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent build call fail with the given message
    pub fn fail_with(&self, message: impl Into<String>) {
        *self.fail_with.lock() = Some(message.into());
    }

    pub fn invocations(&self) -> Vec<BuildInvocation> {
        self.invocations.lock().clone()
    }
}

impl IndexBuilder for MockIndexBuilder {
    fn build(&self, input: &Path, output: &Path, title: &str) -> Result<(), BuildError> {
        self.invocations.lock().push(BuildInvocation {
            input: input.to_path_buf(),
            output: output.to_path_buf(),
            title: title.to_string(),
        });
        if let Some(message) = self.fail_with.lock().clone() {
            return Err(BuildError::Failed {
                status: "exit status: 1".to_string(),
                stderr: message,
            });
        }
        Ok(())
    }

    fn is_available(&self) -> bool {
        true
    }

    fn version(&self) -> Result<String, BuildError> {
        Ok("MockIndexBuilder 1.0.0".to_string())
    }
}
