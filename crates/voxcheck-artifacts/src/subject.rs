use crate::error::{Error, Result};
use std::fmt;
use std::path::{Path, PathBuf};

/// One processed case on disk: a name (directory basename) plus the
/// directory holding its output artifacts.
///
/// The root must exist and be a directory at construction time;
/// anything else is a construction error, never a deferred failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Subject {
    name: String,
    root: PathBuf,
}

impl Subject {
    pub fn new(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        if !root.is_dir() {
            return Err(Error::NotADirectory(root));
        }
        let name = match root.file_name() {
            Some(name) => name.to_string_lossy().into_owned(),
            None => return Err(Error::NotADirectory(root)),
        };
        Ok(Self { name, root })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// An equivalent subject handle rooted under a different parent
    /// directory. Pairs a reference instance with a test instance of
    /// the same logical subject.
    pub fn with_subjects_dir(&self, subjects_dir: &Path) -> Result<Subject> {
        Subject::new(subjects_dir.join(&self.name))
    }
}

impl fmt::Display for Subject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Subject<{}>", self.name)
    }
}
