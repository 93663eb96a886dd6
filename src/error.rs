//! Error types for permtree

/// The main error type for permtree operations
#[derive(Debug, thiserror::Error)]
pub enum PermtreeError {
    #[error("invalid role {role:?}: {reason}")]
    InvalidRole { role: String, reason: String },

    #[error("invalid input: {reason}")]
    InvalidInput { reason: String },

    #[error("{kind} not found: {reference}")]
    NotFound { kind: &'static str, reference: String },

    #[error("conflict: {reason}")]
    Conflict { reason: String },

    #[error("storage error: {0}")]
    Storage(#[from] heed::Error),

    #[error("corrupt record: {reason}")]
    Corrupt { reason: String },

    #[error("resolution cancelled")]
    Cancelled,

    #[error("deadline exceeded by {overrun_ms}ms")]
    DeadlineExceeded { overrun_ms: u128 },

    #[error("config error: {reason}")]
    Config { reason: String },

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("yaml error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

/// Result type alias for permtree operations
pub type Result<T> = std::result::Result<T, PermtreeError>;

pub(crate) fn invalid(reason: impl Into<String>) -> PermtreeError {
    PermtreeError::InvalidInput { reason: reason.into() }
}

pub(crate) fn conflict(reason: impl Into<String>) -> PermtreeError {
    PermtreeError::Conflict { reason: reason.into() }
}

pub(crate) fn corrupt(reason: impl Into<String>) -> PermtreeError {
    PermtreeError::Corrupt { reason: reason.into() }
}
