//! Error types for depomap

use thiserror::Error;

/// Main error type for depomap operations
#[derive(Error, Debug)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The base map document could not be read or parsed.
    #[error("Geometry source unavailable: {source_name} ({reason})")]
    GeometrySourceUnavailable { source_name: String, reason: String },

    /// An identifier did not match any region.
    #[error("Region not found: {0}")]
    RegionNotFound(String),

    #[error("Invalid parameter: {name} = {value} ({reason})")]
    InvalidParameter {
        name: &'static str,
        value: String,
        reason: String,
    },

    #[error("Invalid SVG path data: {0}")]
    PathData(String),

    #[error("Configuration error: {0}")]
    Config(#[from] serde_json::Error),

    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Shorthand for rejecting a numeric input at the boundary.
    pub fn invalid_number(name: &'static str, value: f64, reason: impl Into<String>) -> Self {
        Error::InvalidParameter {
            name,
            value: value.to_string(),
            reason: reason.into(),
        }
    }
}

/// Result type alias for depomap operations
pub type Result<T> = std::result::Result<T, Error>;
