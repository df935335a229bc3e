// Artifacts module - subject location, artifact loading and caching
// Decision logic (tolerances, comparisons) lives in voxcheck-engine.

mod error;
mod json;
mod lut;
mod manifest;
mod store;
mod subject;
mod traits;

pub use error::{Error, Result};
pub use json::{JsonImageReader, JsonStatsReader};
pub use lut::LabelLookup;
pub use manifest::FileManifest;
pub use store::{ArtifactStore, IMAGE_DIR, LOG_DIR, STATS_DIR};
pub use subject::Subject;
pub use traits::{ImageReader, StatsReader};
