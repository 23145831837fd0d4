//! Errors from external build-tool invocation

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum BuildError {
    #[error("index builder binary not found at {0:?}")]
    BinaryNotFound(PathBuf),

    #[error("failed to launch index builder: {0}")]
    Launch(#[from] std::io::Error),

    #[error("index builder exited with {status}: {stderr}")]
    Failed { status: String, stderr: String },
}
