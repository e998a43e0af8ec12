// ABOUTME: Application-wide error types for storefleet.
// ABOUTME: Uses thiserror for ergonomic error handling.

use std::path::PathBuf;
use thiserror::Error;

use crate::orchestrator::LifecycleError;
use crate::repo::RepoError;

#[derive(Debug, Error)]
pub enum Error {
    #[error("file already exists: {0}")]
    AlreadyExists(PathBuf),

    #[error("configuration file not found: {0}")]
    ConfigNotFound(PathBuf),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Lifecycle(#[from] LifecycleError),

    #[error("lifecycle store error: {0}")]
    Repo(#[from] RepoError),

    #[error("not ready: {0}")]
    NotReady(String),
}

pub type Result<T> = std::result::Result<T, Error>;
