use std::fmt;
use std::path::PathBuf;

/// Result type for forgescan-runtime operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur in the runtime layer
#[derive(Debug)]
pub enum Error {
    /// Corpus root directory does not exist
    CorpusNotFound(PathBuf),

    /// No session file with this id anywhere in the corpus
    SessionNotFound(String),

    /// A date filter was not a `YYYY-MM-DD` calendar date
    InvalidDate(String),

    /// Configuration error
    Config(String),

    /// A configured detection rule did not compile
    Rules(forgescan_engine::Error),

    /// Provider layer error
    Provider(forgescan_providers::Error),

    /// IO operation failed
    Io(std::io::Error),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::CorpusNotFound(path) => {
                write!(f, "No projects directory found: {}", path.display())
            }
            Error::SessionNotFound(id) => write!(f, "Session {} not found", id),
            Error::InvalidDate(value) => {
                write!(f, "Invalid date '{}': expected YYYY-MM-DD", value)
            }
            Error::Config(msg) => write!(f, "Configuration error: {}", msg),
            Error::Rules(err) => write!(f, "Rule error: {}", err),
            Error::Provider(err) => write!(f, "Provider error: {}", err),
            Error::Io(err) => write!(f, "IO error: {}", err),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Rules(err) => Some(err),
            Error::Provider(err) => Some(err),
            Error::Io(err) => Some(err),
            Error::CorpusNotFound(_)
            | Error::SessionNotFound(_)
            | Error::InvalidDate(_)
            | Error::Config(_) => None,
        }
    }
}

impl From<forgescan_providers::Error> for Error {
    fn from(err: forgescan_providers::Error) -> Self {
        match err {
            forgescan_providers::Error::CorpusNotFound(path) => Error::CorpusNotFound(path),
            other => Error::Provider(other),
        }
    }
}

impl From<forgescan_engine::Error> for Error {
    fn from(err: forgescan_engine::Error) -> Self {
        Error::Rules(err)
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Io(err)
    }
}

impl From<toml::de::Error> for Error {
    fn from(err: toml::de::Error) -> Self {
        Error::Config(err.to_string())
    }
}
