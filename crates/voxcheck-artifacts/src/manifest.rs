use crate::error::Result;
use serde::Deserialize;
use std::collections::HashSet;
use std::fs;
use std::path::Path;
use walkdir::WalkDir;

/// List of relative paths a subject directory must contain.
#[derive(Debug, Clone, Deserialize)]
pub struct FileManifest {
    files: Vec<String>,
}

impl FileManifest {
    pub fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        Ok(serde_yaml::from_str(&contents)?)
    }

    pub fn files(&self) -> &[String] {
        &self.files
    }

    /// Manifest entries absent from the subject tree, in manifest order.
    pub fn missing_in(&self, subject_root: &Path) -> Vec<String> {
        let present: HashSet<String> = WalkDir::new(subject_root)
            .into_iter()
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.file_type().is_file())
            .filter_map(|entry| {
                entry
                    .path()
                    .strip_prefix(subject_root)
                    .ok()
                    .map(|rel| rel.to_string_lossy().into_owned())
            })
            .collect();

        self.files
            .iter()
            .filter(|file| !present.contains(*file))
            .cloned()
            .collect()
    }
}
