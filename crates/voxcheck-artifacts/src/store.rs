use crate::error::{Error, Result};
use crate::subject::Subject;
use crate::traits::{ImageReader, StatsReader};
use log::debug;
use once_cell::sync::Lazy;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

/// Subdirectory holding volume images.
pub const IMAGE_DIR: &str = "mri";
/// Subdirectory holding statistics files.
pub const STATS_DIR: &str = "stats";
/// Subdirectory holding pipeline log files.
pub const LOG_DIR: &str = "scripts";

// Process-wide decoded-artifact caches, keyed by canonical path so
// every store in the process reuses one decode per on-disk file.
// Append-only; cached artifacts are never mutated after first load.
static IMAGE_CACHE: Lazy<Mutex<HashMap<PathBuf, Arc<voxcheck_types::VolumeImage>>>> =
    Lazy::new(|| Mutex::new(HashMap::new()));
static STATS_CACHE: Lazy<Mutex<HashMap<PathBuf, Arc<voxcheck_types::StatsTable>>>> =
    Lazy::new(|| Mutex::new(HashMap::new()));

/// Cached, lazily-loaded access to one subject's named artifacts.
///
/// Binds a [`Subject`] to the collaborator readers that decode its
/// image and statistics formats.
pub struct ArtifactStore {
    subject: Subject,
    images: Arc<dyn ImageReader>,
    stats: Arc<dyn StatsReader>,
}

impl ArtifactStore {
    pub fn new(subject: Subject, images: Arc<dyn ImageReader>, stats: Arc<dyn StatsReader>) -> Self {
        Self {
            subject,
            images,
            stats,
        }
    }

    pub fn subject(&self) -> &Subject {
        &self.subject
    }

    /// An equivalent store for the same subject name rooted under a
    /// different parent directory, sharing the same readers.
    pub fn with_subjects_dir(&self, subjects_dir: &Path) -> Result<ArtifactStore> {
        Ok(ArtifactStore {
            subject: self.subject.with_subjects_dir(subjects_dir)?,
            images: Arc::clone(&self.images),
            stats: Arc::clone(&self.stats),
        })
    }

    /// Expected on-disk location of a named image.
    pub fn image_path(&self, filename: &str) -> PathBuf {
        self.subject.root().join(IMAGE_DIR).join(filename)
    }

    /// Expected on-disk location of a named statistics file.
    pub fn stats_path(&self, filename: &str) -> PathBuf {
        self.subject.root().join(STATS_DIR).join(filename)
    }

    /// Expected on-disk location of a named log file.
    pub fn log_path(&self, filename: &str) -> PathBuf {
        self.subject.root().join(LOG_DIR).join(filename)
    }

    /// Load (or return the cached decode of) a named image.
    pub fn load_image(&self, filename: &str) -> Result<(PathBuf, Arc<voxcheck_types::VolumeImage>)> {
        let path = self.image_path(filename);
        if !path.is_file() {
            return Err(Error::MissingArtifact(path));
        }
        let key = path.canonicalize()?;

        if let Some(image) = IMAGE_CACHE.lock().unwrap().get(&key) {
            debug!("image cache hit: {}", key.display());
            return Ok((path, Arc::clone(image)));
        }

        debug!("decoding image {}", path.display());
        let image = Arc::new(self.images.read_image(&path)?);
        IMAGE_CACHE
            .lock()
            .unwrap()
            .entry(key)
            .or_insert_with(|| Arc::clone(&image));
        Ok((path, image))
    }

    /// Load (or return the cached parse of) a named statistics file.
    pub fn load_stats(&self, filename: &str) -> Result<(PathBuf, Arc<voxcheck_types::StatsTable>)> {
        let path = self.stats_path(filename);
        if !path.is_file() {
            return Err(Error::MissingArtifact(path));
        }
        let key = path.canonicalize()?;

        if let Some(table) = STATS_CACHE.lock().unwrap().get(&key) {
            debug!("stats cache hit: {}", key.display());
            return Ok((path, Arc::clone(table)));
        }

        debug!("parsing stats file {}", path.display());
        let table = Arc::new(self.stats.read_stats(&path)?);
        STATS_CACHE
            .lock()
            .unwrap()
            .entry(key)
            .or_insert_with(|| Arc::clone(&table));
        Ok((path, table))
    }

    /// Read a named log file into lines. Logs are consumed once per
    /// scan and are not cached.
    pub fn read_log(&self, filename: &str) -> Result<(PathBuf, Vec<String>)> {
        let path = self.log_path(filename);
        if !path.is_file() {
            return Err(Error::MissingArtifact(path));
        }
        let contents = fs::read_to_string(&path)?;
        let lines = contents.lines().map(str::to_string).collect();
        Ok((path, lines))
    }
}
