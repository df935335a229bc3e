use crate::error::{Error, Result};
use crate::traits::{ImageReader, StatsReader};
use std::fs;
use std::path::Path;
use voxcheck_types::{StatsTable, VolumeImage};

// JSON-backed reference readers for the collaborator traits.
//
// The production image container and stats text formats are decoded by
// external collaborators; these readers handle the suite's JSON
// interchange representation of the same data model and back the test
// fixtures and the CLI.

/// Reads a [`VolumeImage`] serialized as JSON.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonImageReader;

impl ImageReader for JsonImageReader {
    fn read_image(&self, path: &Path) -> Result<VolumeImage> {
        let contents = fs::read_to_string(path)?;
        let image: VolumeImage = serde_json::from_str(&contents)
            .map_err(|err| Error::Parse(format!("{}: {}", path.display(), err)))?;
        if image.header.voxel_count() != image.data.len() {
            return Err(Error::Parse(format!(
                "{}: header dims contradict voxel buffer length",
                path.display()
            )));
        }
        Ok(image)
    }
}

/// Reads a [`StatsTable`] serialized as JSON.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonStatsReader;

impl StatsReader for JsonStatsReader {
    fn read_stats(&self, path: &Path) -> Result<StatsTable> {
        let contents = fs::read_to_string(path)?;
        serde_json::from_str(&contents)
            .map_err(|err| Error::Parse(format!("{}: {}", path.display(), err)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;
    use voxcheck_types::{CellValue, ImageHeader, ScalarKind, StatsRow, VoxelData};

    #[test]
    fn test_image_round_trip() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("orig.json");
        let image = VolumeImage::new(
            ImageHeader {
                dims: vec![2, 1, 1],
                voxel_sizes: vec![1.0, 1.0, 1.0],
                scalar_kind: ScalarKind::F32,
                affine: [[1.0, 0.0, 0.0, 0.0]; 4],
                intent: "intensity".to_string(),
            },
            VoxelData::F32(vec![0.5, 1.5]),
        )
        .unwrap();
        fs::write(&path, serde_json::to_string(&image).unwrap()).unwrap();

        let loaded = JsonImageReader.read_image(&path).unwrap();
        assert_eq!(loaded, image);
    }

    #[test]
    fn test_corrupt_image_is_parse_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("orig.json");
        fs::write(&path, "{not json").unwrap();
        assert!(matches!(
            JsonImageReader.read_image(&path),
            Err(Error::Parse(_))
        ));
    }

    #[test]
    fn test_stats_round_trip() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("aseg.stats.json");
        let mut table = StatsTable::default();
        table.rows.push(StatsRow::from_pairs([
            ("SegId", CellValue::Int(17)),
            ("StructName", CellValue::from("Left-Hippocampus")),
            ("Volume_mm3", CellValue::Float(4100.5)),
        ]));
        fs::write(&path, serde_json::to_string(&table).unwrap()).unwrap();

        let loaded = JsonStatsReader.read_stats(&path).unwrap();
        assert_eq!(loaded, table);
    }
}
