use std::fmt;

/// Result type for voxcheck-types operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur in the types layer
#[derive(Debug)]
pub enum Error {
    /// A decoded artifact is internally inconsistent (e.g., buffer/dimension mismatch)
    InvalidData(String),

    /// A stats row lacks a required column or holds the wrong type for it
    MissingColumn(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::InvalidData(msg) => write!(f, "Invalid data: {}", msg),
            Error::MissingColumn(msg) => write!(f, "Missing column: {}", msg),
        }
    }
}

impl std::error::Error for Error {}
