//! Self-contained validation environments for integration tests.
//!
//! A `ValidationWorld` owns a temporary directory holding a reference
//! root, a test (subjects) root, and a configuration directory in the
//! layout the check runner expects.

use anyhow::Result;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tempfile::TempDir;
use voxcheck_artifacts::{ArtifactStore, JsonImageReader, JsonStatsReader, Subject};

pub struct ValidationWorld {
    root: TempDir,
}

impl ValidationWorld {
    pub fn new() -> Result<Self> {
        let root = TempDir::new()?;
        fs::create_dir_all(root.path().join("reference"))?;
        fs::create_dir_all(root.path().join("subjects"))?;
        fs::create_dir_all(root.path().join("config"))?;
        Ok(Self { root })
    }

    pub fn reference_dir(&self) -> PathBuf {
        self.root.path().join("reference")
    }

    pub fn subjects_dir(&self) -> PathBuf {
        self.root.path().join("subjects")
    }

    pub fn config_dir(&self) -> PathBuf {
        self.root.path().join("config")
    }

    /// Create a subject directory under the reference root.
    pub fn add_reference_subject(&self, name: &str) -> Result<PathBuf> {
        let path = self.reference_dir().join(name);
        fs::create_dir_all(&path)?;
        Ok(path)
    }

    /// Create a subject directory under the test root.
    pub fn add_test_subject(&self, name: &str) -> Result<PathBuf> {
        let path = self.subjects_dir().join(name);
        fs::create_dir_all(&path)?;
        Ok(path)
    }

    /// Write a label lookup table into the config directory.
    pub fn write_lut(&self, filename: &str, entries: &[(i64, &str)]) -> Result<PathBuf> {
        let path = self.config_dir().join(filename);
        let contents: String = entries
            .iter()
            .map(|(id, name)| format!("{}\t{}\n", id, name))
            .collect();
        fs::write(&path, contents)?;
        Ok(path)
    }

    /// Write a tolerance specification `<artifact>.yaml` into the
    /// config directory.
    pub fn write_tolerance_spec(&self, artifact: &str, yaml: &str) -> Result<PathBuf> {
        let path = self.config_dir().join(format!("{}.yaml", artifact));
        fs::write(&path, yaml)?;
        Ok(path)
    }

    /// Write an arbitrary YAML document into the config directory.
    pub fn write_config(&self, filename: &str, yaml: &str) -> Result<PathBuf> {
        let path = self.config_dir().join(filename);
        fs::write(&path, yaml)?;
        Ok(path)
    }

    /// An artifact store over a reference subject, wired to the JSON
    /// readers.
    pub fn reference_store(&self, name: &str) -> Result<ArtifactStore> {
        store_at(&self.reference_dir().join(name))
    }

    /// An artifact store over a test subject, wired to the JSON
    /// readers.
    pub fn test_store(&self, name: &str) -> Result<ArtifactStore> {
        store_at(&self.subjects_dir().join(name))
    }
}

/// An artifact store over an existing subject directory, wired to the
/// JSON readers.
pub fn store_at(subject_root: &Path) -> Result<ArtifactStore> {
    let subject = Subject::new(subject_root)?;
    Ok(ArtifactStore::new(
        subject,
        Arc::new(JsonImageReader),
        Arc::new(JsonStatsReader),
    ))
}
