use std::fmt;
use std::path::PathBuf;

/// Result type for voxcheck-artifacts operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur in the artifacts layer
#[derive(Debug)]
pub enum Error {
    /// IO operation failed
    Io(std::io::Error),

    /// An expected artifact is absent from the subject directory
    MissingArtifact(PathBuf),

    /// A subject root does not exist or is not a directory
    NotADirectory(PathBuf),

    /// Lookup table parsing failed
    Csv(csv::Error),

    /// YAML document parsing failed
    Yaml(serde_yaml::Error),

    /// Artifact decoding failed (reader-specific format error)
    Parse(String),

    /// Decoded artifact is internally inconsistent
    Types(voxcheck_types::Error),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Io(err) => write!(f, "IO error: {}", err),
            Error::MissingArtifact(path) => {
                write!(f, "Expected artifact does not exist: {}", path.display())
            }
            Error::NotADirectory(path) => {
                write!(f, "Subject root is not a directory: {}", path.display())
            }
            Error::Csv(err) => write!(f, "Lookup table error: {}", err),
            Error::Yaml(err) => write!(f, "YAML error: {}", err),
            Error::Parse(msg) => write!(f, "Parse error: {}", msg),
            Error::Types(err) => write!(f, "Data error: {}", err),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Io(err) => Some(err),
            Error::Csv(err) => Some(err),
            Error::Yaml(err) => Some(err),
            Error::Types(err) => Some(err),
            Error::MissingArtifact(_) | Error::NotADirectory(_) | Error::Parse(_) => None,
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Io(err)
    }
}

impl From<csv::Error> for Error {
    fn from(err: csv::Error) -> Self {
        Error::Csv(err)
    }
}

impl From<serde_yaml::Error> for Error {
    fn from(err: serde_yaml::Error) -> Self {
        Error::Yaml(err)
    }
}

impl From<voxcheck_types::Error> for Error {
    fn from(err: voxcheck_types::Error) -> Self {
        Error::Types(err)
    }
}
