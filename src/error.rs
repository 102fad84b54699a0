//! Error types for the board and its collaborators.

use std::path::PathBuf;

/// Failures reported by a [`crate::store::DealStore`].
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The request never produced an HTTP response.
    #[error("transport error: {0}")]
    Transport(String),

    /// The store answered with a non-success status.
    #[error("store returned HTTP {status}: {message}")]
    Status { status: u16, message: String },

    /// The record does not exist.
    #[error("{collection} not found: {id}")]
    NotFound { collection: String, id: String },

    /// The store refused the write (e.g. a dangling stage reference).
    #[error("update rejected: {reason}")]
    Rejected { reason: String },

    /// The response body could not be decoded.
    #[error("failed to decode {what}: {message}")]
    Decode { what: String, message: String },

    /// The request was never sent because its input was invalid.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Simulated outage of an in-process store.
    #[error("store unavailable")]
    Unavailable,
}

impl From<reqwest::Error> for StoreError {
    fn from(err: reqwest::Error) -> Self {
        if let Some(status) = err.status() {
            StoreError::Status {
                status: status.as_u16(),
                message: err.to_string(),
            }
        } else {
            StoreError::Transport(err.to_string())
        }
    }
}

/// Board-level failures surfaced to the user.
#[derive(Debug, thiserror::Error)]
pub enum BoardError {
    /// Loading or refreshing the board snapshot failed.
    #[error("failed to load pipeline: {source}")]
    FetchFailed {
        #[source]
        source: StoreError,
    },

    /// Persisting a stage change failed. Local state is untouched.
    #[error("failed to move deal {deal_id} to stage {stage_id}: {source}")]
    PersistenceFailed {
        deal_id: String,
        stage_id: String,
        #[source]
        source: StoreError,
    },
}

/// Configuration loading failures.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("config file not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("failed to read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("invalid configuration: {0}")]
    Invalid(String),

    #[error("no backend URL configured (set [backend] url, DEALBOARD_URL, or use --demo)")]
    MissingBackend,
}
