use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ArmatureError {
    #[error("corrupt state document at {path}: {source}")]
    CorruptState {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("unsupported schema version '{found}' (expected major {expected})")]
    SchemaVersionMismatch { found: String, expected: u64 },

    #[error("checkpoint not found: {0}")]
    CheckpointNotFound(String),

    #[error("duplicate feature id: {0}")]
    DuplicateFeatureId(String),

    #[error("feature not found: {0}")]
    FeatureNotFound(String),

    #[error("feature '{feature}' depends on unknown feature '{dependency}'")]
    InvalidDependency { feature: String, dependency: String },

    #[error("invalid transition for '{id}' from {from} to {to}: {reason}")]
    InvalidTransition {
        id: String,
        from: String,
        to: String,
        reason: String,
    },

    #[error("session '{id}' is still active: complete it before starting another")]
    SessionAlreadyActive { id: String },

    #[error("no session has been started")]
    NoSession,

    #[error("invalid slug '{0}': must be lowercase alphanumeric with hyphens")]
    InvalidSlug(String),

    #[error("invalid phase: {0}")]
    InvalidPhase(String),

    #[error("invalid status: {0}")]
    InvalidStatus(String),

    #[error("{op} {path}: {source}")]
    Io {
        op: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),
}

impl ArmatureError {
    /// Wrap an I/O error with the operation and the path it touched.
    pub fn io(op: &'static str, path: &Path, source: std::io::Error) -> Self {
        ArmatureError::Io {
            op,
            path: path.to_path_buf(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, ArmatureError>;
