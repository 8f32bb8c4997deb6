use std::fmt;

/// Result type for forgescan-engine operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur in the engine layer
#[derive(Debug)]
pub enum Error {
    /// A detection rule pattern failed to compile
    InvalidRule { label: String, source: regex::Error },
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::InvalidRule { label, source } => {
                write!(f, "Invalid rule '{}': {}", label, source)
            }
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::InvalidRule { source, .. } => Some(source),
        }
    }
}
