//! Error types for SlotGrid core parsing and configuration.

use std::path::PathBuf;

use thiserror::Error;

/// Result type alias for core operations.
pub type CoreResult<T> = Result<T, CoreError>;

/// Errors raised while parsing identifiers or loading a layout.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("unknown request kind: {0}")]
    UnknownRequestKind(String),

    #[error("unknown capacity class: {0}")]
    UnknownCapacityClass(String),

    #[error("failed to read layout {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse layout: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("failed to serialize layout: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("invalid layout: {0}")]
    Invalid(String),
}
