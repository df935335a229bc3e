// Types module - shared data model for the voxcheck validation suite
// This layer holds schemas only; decision logic lives in voxcheck-engine.

mod error;
mod report;
mod stats;
mod volume;

pub use error::{Error, Result};
pub use report::{CheckOutcome, ComparisonReport, Violation};
pub use stats::{
    CellValue, Measure, StatsRow, StatsTable, SEG_ID_COLUMN, STRUCT_NAME_COLUMN,
};
pub use volume::{
    HeaderFieldDiff, ImageHeader, LabelIter, ScalarKind, ValueIter, VolumeImage, VoxelData,
};
