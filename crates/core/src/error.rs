use thiserror::Error;

/// Result type alias for daybook-core
pub type Result<T> = std::result::Result<T, Error>;

/// Core error types for the daybook journal
#[derive(Debug, Error)]
pub enum Error {
    /// I/O error for file operations
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration errors (missing journal root, bad offset, malformed TOML)
    #[error("configuration error: {0}")]
    Config(String),

    /// Parse/serialization errors
    #[error("parse error: {0}")]
    Parse(String),

    /// Validation errors for caller-supplied values
    #[error("validation error: {0}")]
    Validation(String),

    /// Generic errors
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create a parse error with a message
    pub fn parse(msg: impl Into<String>) -> Self {
        Self::Parse(msg.into())
    }

    /// Create a validation error with a message
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Create a configuration error with a message
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }
}

impl From<serde_yml::Error> for Error {
    fn from(err: serde_yml::Error) -> Self {
        Error::Parse(format!("invalid YAML front matter: {err}"))
    }
}
