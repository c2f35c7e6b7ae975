//! Error types for the supervisor.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SupervisorError {
    #[error("no list named {0:?} is configured")]
    ListNotConfigured(String),

    #[error("array {array:?} not found in {}", path.display())]
    ArrayBlockNotFound { array: String, path: PathBuf },

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}
