//! Error types for the attribute store client.

use thiserror::Error;

/// Errors produced by store and remote-loading operations.
#[derive(Error, Debug)]
pub enum CloudError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("network error: {0}")]
    Network(String),

    /// The store answered with a non-success status.
    #[error("store returned HTTP {code}: {body}")]
    Status { code: u16, body: String },

    /// A row or payload did not have the expected shape.
    #[error("decode error: {0}")]
    Decode(String),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("runtime error: {0}")]
    Runtime(String),

    #[error("core error: {0}")]
    Core(#[from] depomap_core::Error),
}

impl CloudError {
    /// Whether a read that failed this way is worth retrying.
    pub fn is_transient(&self) -> bool {
        match self {
            CloudError::Http(e) => e.is_timeout() || e.is_connect(),
            CloudError::Status { code, .. } => *code >= 500,
            _ => false,
        }
    }
}

/// Result alias for cloud operations.
pub type Result<T> = std::result::Result<T, CloudError>;
