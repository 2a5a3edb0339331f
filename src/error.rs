use thiserror::Error;

/// Failures surfaced by the user store and its key-value backend.
///
/// "Not found" is never one of these; lookups return `None` instead.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("storage error: {0}")]
    Storage(#[from] rusqlite::Error),

    #[error("malformed value under {key}: {source}")]
    Malformed {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("serialization failed: {0}")]
    Serialize(#[source] serde_json::Error),

    #[error("invalid user data: {0}")]
    Validation(String),

    #[error("credential scheme failed: {0}")]
    Credential(String),
}

impl StoreError {
    /// Stable code used on the IPC wire.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Storage(_) => "storage_failed",
            Self::Malformed { .. } => "malformed_data",
            Self::Serialize(_) => "storage_failed",
            Self::Validation(_) => "validation_failed",
            Self::Credential(_) => "credential_failed",
        }
    }
}

pub type StoreResult<T> = Result<T, StoreError>;
