use std::fmt;

/// Result type for voxcheck-engine operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur in the engine layer
///
/// Tolerance violations are not errors; they travel as data in
/// [`voxcheck_types::ComparisonReport`].
#[derive(Debug)]
pub enum Error {
    /// Artifact layer error (missing files, decode failures)
    Artifact(voxcheck_artifacts::Error),

    /// Malformed or incomplete tolerance/keyword configuration
    Config(String),

    /// An artifact loaded but is structurally wrong for its role
    /// (non-integral segmentation storage, duplicate SegId, ...)
    InvalidArtifact(String),

    /// IO operation failed
    Io(std::io::Error),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Artifact(err) => write!(f, "Artifact error: {}", err),
            Error::Config(msg) => write!(f, "Configuration error: {}", msg),
            Error::InvalidArtifact(msg) => write!(f, "Invalid artifact: {}", msg),
            Error::Io(err) => write!(f, "IO error: {}", err),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Artifact(err) => Some(err),
            Error::Io(err) => Some(err),
            Error::Config(_) | Error::InvalidArtifact(_) => None,
        }
    }
}

impl From<voxcheck_artifacts::Error> for Error {
    fn from(err: voxcheck_artifacts::Error) -> Self {
        Error::Artifact(err)
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Io(err)
    }
}

impl From<serde_yaml::Error> for Error {
    fn from(err: serde_yaml::Error) -> Self {
        Error::Config(err.to_string())
    }
}

impl From<voxcheck_types::Error> for Error {
    fn from(err: voxcheck_types::Error) -> Self {
        Error::InvalidArtifact(err.to_string())
    }
}
