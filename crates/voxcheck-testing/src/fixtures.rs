//! Fixtures for sample artifact generation and placement.
//!
//! Builders for in-memory volumes, stats tables and measures, plus
//! writers that place them in a subject tree using the JSON
//! interchange formats understood by the JSON readers.

use anyhow::Result;
use std::fs;
use std::path::{Path, PathBuf};
use voxcheck_artifacts::{IMAGE_DIR, LOG_DIR, STATS_DIR};
use voxcheck_types::{
    CellValue, ImageHeader, Measure, ScalarKind, StatsRow, StatsTable, VolumeImage, VoxelData,
    SEG_ID_COLUMN, STRUCT_NAME_COLUMN,
};

fn flat_header(len: usize, kind: ScalarKind) -> ImageHeader {
    ImageHeader {
        dims: vec![len, 1, 1],
        voxel_sizes: vec![1.0, 1.0, 1.0],
        scalar_kind: kind,
        affine: [
            [1.0, 0.0, 0.0, 0.0],
            [0.0, 1.0, 0.0, 0.0],
            [0.0, 0.0, 1.0, 0.0],
            [0.0, 0.0, 0.0, 1.0],
        ],
        intent: String::new(),
    }
}

/// A flat u8 segmentation volume (dims `[n, 1, 1]`).
pub fn segmentation_volume(voxels: Vec<u8>) -> VolumeImage {
    let header = flat_header(voxels.len(), ScalarKind::U8);
    VolumeImage::new(header, VoxelData::U8(voxels)).expect("fixture volume is consistent")
}

/// A flat f32 intensity volume (dims `[n, 1, 1]`).
pub fn intensity_volume(voxels: Vec<f32>) -> VolumeImage {
    let header = flat_header(voxels.len(), ScalarKind::F32);
    VolumeImage::new(header, VoxelData::F32(voxels)).expect("fixture volume is consistent")
}

/// A well-formed measure annotation.
pub fn measure(display: &str, description: &str, value: f64, unit: &str) -> Measure {
    Measure(vec![
        CellValue::from(display),
        CellValue::from(description),
        CellValue::Float(value),
        CellValue::from(unit),
    ])
}

/// A minimal stats row: SegId, StructName and one volume column.
pub fn volume_row(seg_id: i64, name: &str, volume: f64) -> StatsRow {
    StatsRow::from_pairs([
        (SEG_ID_COLUMN, CellValue::Int(seg_id)),
        (STRUCT_NAME_COLUMN, CellValue::from(name)),
        ("Volume_mm3", CellValue::Float(volume)),
    ])
}

/// Write an image into `<subject_root>/mri/<filename>`.
pub fn write_image(subject_root: &Path, filename: &str, image: &VolumeImage) -> Result<PathBuf> {
    let dir = subject_root.join(IMAGE_DIR);
    fs::create_dir_all(&dir)?;
    let path = dir.join(filename);
    fs::write(&path, serde_json::to_string(image)?)?;
    Ok(path)
}

/// Write a stats table into `<subject_root>/stats/<filename>`.
pub fn write_stats(subject_root: &Path, filename: &str, table: &StatsTable) -> Result<PathBuf> {
    let dir = subject_root.join(STATS_DIR);
    fs::create_dir_all(&dir)?;
    let path = dir.join(filename);
    fs::write(&path, serde_json::to_string(table)?)?;
    Ok(path)
}

/// Write a log into `<subject_root>/scripts/<filename>`.
pub fn write_log(subject_root: &Path, filename: &str, lines: &[&str]) -> Result<PathBuf> {
    let dir = subject_root.join(LOG_DIR);
    fs::create_dir_all(&dir)?;
    let path = dir.join(filename);
    fs::write(&path, lines.join("\n"))?;
    Ok(path)
}
