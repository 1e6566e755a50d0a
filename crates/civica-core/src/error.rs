use thiserror::Error;

/// Top-level error type for Civica.
///
/// Subsystem crates define their own error types and implement
/// `From<CivicaError>` so that `?` works across crate boundaries.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum CivicaError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<toml::de::Error> for CivicaError {
    fn from(err: toml::de::Error) -> Self {
        CivicaError::Config(err.to_string())
    }
}

impl From<toml::ser::Error> for CivicaError {
    fn from(err: toml::ser::Error) -> Self {
        CivicaError::Serialization(err.to_string())
    }
}

impl From<serde_json::Error> for CivicaError {
    fn from(err: serde_json::Error) -> Self {
        CivicaError::Serialization(err.to_string())
    }
}

/// A specialized `Result` type for Civica operations.
pub type Result<T> = std::result::Result<T, CivicaError>;
