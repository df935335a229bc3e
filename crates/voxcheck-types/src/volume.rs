use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Storage type of a voxel buffer.
///
/// Segmentation volumes must use an integral kind; intensity volumes
/// typically use a floating-point kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScalarKind {
    U8,
    I16,
    I32,
    F32,
    F64,
}

impl ScalarKind {
    /// Whether voxels of this kind carry label ids (as opposed to intensities).
    pub fn is_integral(&self) -> bool {
        matches!(self, ScalarKind::U8 | ScalarKind::I16 | ScalarKind::I32)
    }
}

impl fmt::Display for ScalarKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ScalarKind::U8 => "u8",
            ScalarKind::I16 => "i16",
            ScalarKind::I32 => "i32",
            ScalarKind::F32 => "f32",
            ScalarKind::F64 => "f64",
        };
        write!(f, "{}", name)
    }
}

/// Decoded voxel buffer in its on-disk storage type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum VoxelData {
    U8(Vec<u8>),
    I16(Vec<i16>),
    I32(Vec<i32>),
    F32(Vec<f32>),
    F64(Vec<f64>),
}

impl VoxelData {
    pub fn kind(&self) -> ScalarKind {
        match self {
            VoxelData::U8(_) => ScalarKind::U8,
            VoxelData::I16(_) => ScalarKind::I16,
            VoxelData::I32(_) => ScalarKind::I32,
            VoxelData::F32(_) => ScalarKind::F32,
            VoxelData::F64(_) => ScalarKind::F64,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            VoxelData::U8(v) => v.len(),
            VoxelData::I16(v) => v.len(),
            VoxelData::I32(v) => v.len(),
            VoxelData::F32(v) => v.len(),
            VoxelData::F64(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Iterate over voxels as label ids. Returns None for non-integral storage.
    pub fn labels(&self) -> Option<LabelIter<'_>> {
        match self {
            VoxelData::U8(v) => Some(LabelIter::U8(v.iter())),
            VoxelData::I16(v) => Some(LabelIter::I16(v.iter())),
            VoxelData::I32(v) => Some(LabelIter::I32(v.iter())),
            VoxelData::F32(_) | VoxelData::F64(_) => None,
        }
    }

    /// Iterate over voxels as f64 values (lossless for every storage kind).
    pub fn values(&self) -> ValueIter<'_> {
        match self {
            VoxelData::U8(v) => ValueIter::U8(v.iter()),
            VoxelData::I16(v) => ValueIter::I16(v.iter()),
            VoxelData::I32(v) => ValueIter::I32(v.iter()),
            VoxelData::F32(v) => ValueIter::F32(v.iter()),
            VoxelData::F64(v) => ValueIter::F64(v.iter()),
        }
    }
}

/// Iterator over integral voxels widened to i64.
pub enum LabelIter<'a> {
    U8(std::slice::Iter<'a, u8>),
    I16(std::slice::Iter<'a, i16>),
    I32(std::slice::Iter<'a, i32>),
}

impl Iterator for LabelIter<'_> {
    type Item = i64;

    fn next(&mut self) -> Option<i64> {
        match self {
            LabelIter::U8(it) => it.next().map(|v| *v as i64),
            LabelIter::I16(it) => it.next().map(|v| *v as i64),
            LabelIter::I32(it) => it.next().map(|v| *v as i64),
        }
    }
}

/// Iterator over voxels widened to f64.
pub enum ValueIter<'a> {
    U8(std::slice::Iter<'a, u8>),
    I16(std::slice::Iter<'a, i16>),
    I32(std::slice::Iter<'a, i32>),
    F32(std::slice::Iter<'a, f32>),
    F64(std::slice::Iter<'a, f64>),
}

impl Iterator for ValueIter<'_> {
    type Item = f64;

    fn next(&mut self) -> Option<f64> {
        match self {
            ValueIter::U8(it) => it.next().map(|v| *v as f64),
            ValueIter::I16(it) => it.next().map(|v| *v as f64),
            ValueIter::I32(it) => it.next().map(|v| *v as f64),
            ValueIter::F32(it) => it.next().map(|v| *v as f64),
            ValueIter::F64(it) => it.next().map(|v| *v),
        }
    }
}

/// Geometry and type metadata of a volume image.
///
/// Header fields carry no tolerance: any mismatch between a reference
/// and a test header is a hard failure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageHeader {
    /// Volume dimensions (3 or 4 entries).
    pub dims: Vec<usize>,
    /// Voxel edge lengths in millimeters, one entry per spatial dimension.
    pub voxel_sizes: Vec<f64>,
    /// Storage type of the voxel buffer.
    pub scalar_kind: ScalarKind,
    /// Voxel-to-world affine.
    pub affine: [[f64; 4]; 4],
    /// Intent/description string.
    #[serde(default)]
    pub intent: String,
}

/// One header field that differs between two images.
#[derive(Debug, Clone, PartialEq)]
pub struct HeaderFieldDiff {
    pub field: &'static str,
    pub expected: String,
    pub actual: String,
}

impl ImageHeader {
    /// Total number of voxels implied by the dimensions.
    pub fn voxel_count(&self) -> usize {
        self.dims.iter().product()
    }

    /// Field-by-field structural diff against another header.
    ///
    /// Returns one entry per differing field, with both values rendered.
    /// An empty result means the headers are structurally identical.
    pub fn diff(&self, other: &ImageHeader) -> Vec<HeaderFieldDiff> {
        let mut diffs = Vec::new();
        if self.dims != other.dims {
            diffs.push(HeaderFieldDiff {
                field: "dims",
                expected: format!("{:?}", self.dims),
                actual: format!("{:?}", other.dims),
            });
        }
        if self.voxel_sizes != other.voxel_sizes {
            diffs.push(HeaderFieldDiff {
                field: "voxel_sizes",
                expected: format!("{:?}", self.voxel_sizes),
                actual: format!("{:?}", other.voxel_sizes),
            });
        }
        if self.scalar_kind != other.scalar_kind {
            diffs.push(HeaderFieldDiff {
                field: "scalar_kind",
                expected: self.scalar_kind.to_string(),
                actual: other.scalar_kind.to_string(),
            });
        }
        if self.affine != other.affine {
            diffs.push(HeaderFieldDiff {
                field: "affine",
                expected: format!("{:?}", self.affine),
                actual: format!("{:?}", other.affine),
            });
        }
        if self.intent != other.intent {
            diffs.push(HeaderFieldDiff {
                field: "intent",
                expected: self.intent.clone(),
                actual: other.intent.clone(),
            });
        }
        diffs
    }
}

/// A decoded volume: header plus voxel buffer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VolumeImage {
    pub header: ImageHeader,
    pub data: VoxelData,
}

impl VolumeImage {
    /// Bind a header to a voxel buffer.
    ///
    /// Fails when the buffer length does not match the header dimensions
    /// or the buffer storage kind contradicts the header.
    pub fn new(header: ImageHeader, data: VoxelData) -> Result<Self> {
        if header.voxel_count() != data.len() {
            return Err(Error::InvalidData(format!(
                "volume has {} voxels but header dims {:?} imply {}",
                data.len(),
                header.dims,
                header.voxel_count()
            )));
        }
        if header.scalar_kind != data.kind() {
            return Err(Error::InvalidData(format!(
                "header declares {} storage but buffer holds {}",
                header.scalar_kind,
                data.kind()
            )));
        }
        Ok(Self { header, data })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn header(dims: Vec<usize>, kind: ScalarKind) -> ImageHeader {
        ImageHeader {
            dims,
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

    #[test]
    fn test_volume_rejects_buffer_length_mismatch() {
        let err = VolumeImage::new(
            header(vec![2, 2, 2], ScalarKind::U8),
            VoxelData::U8(vec![0; 7]),
        );
        assert!(err.is_err());
    }

    #[test]
    fn test_volume_rejects_kind_mismatch() {
        let err = VolumeImage::new(
            header(vec![2, 2, 2], ScalarKind::F32),
            VoxelData::U8(vec![0; 8]),
        );
        assert!(err.is_err());
    }

    #[test]
    fn test_header_diff_reports_each_field() {
        let a = header(vec![2, 2, 2], ScalarKind::U8);
        let mut b = a.clone();
        b.dims = vec![3, 2, 2];
        b.scalar_kind = ScalarKind::I16;
        let diffs = a.diff(&b);
        let fields: Vec<&str> = diffs.iter().map(|d| d.field).collect();
        assert_eq!(fields, vec!["dims", "scalar_kind"]);
    }

    #[test]
    fn test_header_diff_empty_for_identical() {
        let a = header(vec![4, 4, 4], ScalarKind::F32);
        assert!(a.diff(&a.clone()).is_empty());
    }

    #[test]
    fn test_labels_none_for_float_storage() {
        assert!(VoxelData::F32(vec![1.0]).labels().is_none());
        assert!(VoxelData::U8(vec![1]).labels().is_some());
    }

    #[test]
    fn test_values_widen_losslessly() {
        let values: Vec<f64> = VoxelData::I16(vec![-3, 0, 7]).values().collect();
        assert_eq!(values, vec![-3.0, 0.0, 7.0]);
    }
}
