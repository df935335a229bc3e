use crate::error::Result;
use std::path::Path;
use voxcheck_types::{StatsTable, VolumeImage};

/// Decoder for a 3-D/4-D image container format.
///
/// The production container formats are external collaborators; the
/// suite only needs a header plus a voxel buffer back.
pub trait ImageReader: Send + Sync {
    fn read_image(&self, path: &Path) -> Result<VolumeImage>;
}

/// Parser for a statistics file format.
///
/// Produces the measure-annotation map and the ordered row table.
pub trait StatsReader: Send + Sync {
    fn read_stats(&self, path: &Path) -> Result<StatsTable>;
}
