use crate::approx::values_close;
use crate::error::{Error, Result};
use crate::tolerances::Tolerances;
use log::debug;
use std::collections::BTreeMap;
use voxcheck_types::{ComparisonReport, Violation, VolumeImage, VoxelData};

/// Fixed relative tolerance for intensity volumes. There is no
/// absolute floor; values must match to four significant decimals.
pub const INTENSITY_RTOL: f64 = 1e-4;

/// Per-label overlap between two segmentation volumes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LabelOverlap {
    /// Dice distance: 1 − 2·|A∩B| / (|A|+|B|). 0 = identical masks.
    pub dice: f64,
    pub reference_voxels: usize,
    pub test_voxels: usize,
}

/// Compare two image headers field by field.
///
/// Headers carry no tolerance; every differing field is a violation.
pub fn compare_headers(
    artifact: &str,
    reference: &VolumeImage,
    test: &VolumeImage,
) -> ComparisonReport {
    let mut report = ComparisonReport::new(artifact);
    for diff in reference.header.diff(&test.header) {
        report.push(Violation::exact(
            format!("header field {}", diff.field),
            diff.expected,
            diff.actual,
        ));
    }
    report
}

/// Dice distance per label over the union of labels present in either
/// buffer, keyed ascending.
///
/// Fails when either buffer is non-integral or the voxel counts differ.
pub fn dice_distances(
    reference: &VoxelData,
    test: &VoxelData,
) -> Result<BTreeMap<i64, LabelOverlap>> {
    let (Some(reference_labels), Some(test_labels)) = (reference.labels(), test.labels()) else {
        return Err(Error::InvalidArtifact(
            "segmentation voxels are not integral".to_string(),
        ));
    };
    if reference.len() != test.len() {
        return Err(Error::InvalidArtifact(format!(
            "voxel counts differ: reference {} vs test {}",
            reference.len(),
            test.len()
        )));
    }

    #[derive(Default)]
    struct Counts {
        reference: usize,
        test: usize,
        overlap: usize,
    }

    let mut counts: BTreeMap<i64, Counts> = BTreeMap::new();
    for (ref_label, test_label) in reference_labels.zip(test_labels) {
        counts.entry(ref_label).or_default().reference += 1;
        counts.entry(test_label).or_default().test += 1;
        if ref_label == test_label {
            counts.entry(ref_label).or_default().overlap += 1;
        }
    }

    Ok(counts
        .into_iter()
        .map(|(label, c)| {
            let total = c.reference + c.test;
            // A label absent from both masks overlaps trivially.
            let dice = if total == 0 {
                0.0
            } else {
                1.0 - 2.0 * c.overlap as f64 / total as f64
            };
            (
                label,
                LabelOverlap {
                    dice,
                    reference_voxels: c.reference,
                    test_voxels: c.test,
                },
            )
        })
        .collect())
}

/// Compare two segmentation volumes by per-label dice distance.
///
/// Each label's tolerance is resolved through the tolerance table; a
/// label passes iff its dice distance stays within the tolerance of 0.
/// All failing labels are reported by resolved name, ascending by id.
pub fn compare_segmentation(
    artifact: &str,
    reference: &VolumeImage,
    test: &VolumeImage,
    tolerances: &Tolerances,
) -> Result<ComparisonReport> {
    if !test.data.kind().is_integral() {
        return Err(Error::InvalidArtifact(format!(
            "{} is not an integer segmentation (storage {})",
            artifact,
            test.data.kind()
        )));
    }
    if !reference.data.kind().is_integral() {
        return Err(Error::InvalidArtifact(format!(
            "reference {} is not an integer segmentation (storage {})",
            artifact,
            reference.data.kind()
        )));
    }

    let mut report = ComparisonReport::new(artifact);
    for (label, overlap) in dice_distances(&reference.data, &test.data)? {
        let (name, threshold) = tolerances.threshold_for_label(label);
        debug!("label {}: dice {:.4}", name, overlap.dice);
        if !values_close(0.0, overlap.dice, threshold, 0.0) {
            report.push(Violation::with_tolerance(
                format!("label {}", name),
                "overlap 1".to_string(),
                format!(
                    "overlap {:.6} ({} reference voxels, {} test voxels)",
                    1.0 - overlap.dice,
                    overlap.reference_voxels,
                    overlap.test_voxels
                ),
                threshold,
            ));
        }
    }
    Ok(report)
}

/// Compare two intensity volumes element-wise with the fixed relative
/// tolerance. The check is global across all voxels; the report holds
/// a single summary violation naming the worst element.
pub fn compare_intensity(
    artifact: &str,
    reference: &VolumeImage,
    test: &VolumeImage,
) -> Result<ComparisonReport> {
    if reference.data.len() != test.data.len() {
        return Err(Error::InvalidArtifact(format!(
            "{}: voxel counts differ: reference {} vs test {}",
            artifact,
            reference.data.len(),
            test.data.len()
        )));
    }

    let mut mismatched = 0usize;
    let mut worst: Option<(usize, f64, f64)> = None;
    for (index, (expected, actual)) in reference.data.values().zip(test.data.values()).enumerate() {
        if values_close(expected, actual, 0.0, INTENSITY_RTOL) {
            continue;
        }
        mismatched += 1;
        let deviation = (expected - actual).abs();
        if worst.is_none_or(|(_, e, a)| deviation > (e - a).abs()) {
            worst = Some((index, expected, actual));
        }
    }

    let mut report = ComparisonReport::new(artifact);
    if let Some((index, expected, actual)) = worst {
        report.push(Violation {
            entity: format!(
                "intensity ({} of {} voxels out of tolerance)",
                mismatched,
                reference.data.len()
            ),
            expected: format!("voxel {}: {}", index, expected),
            actual: format!("voxel {}: {}", index, actual),
            tolerance: format!("rtol {}", INTENSITY_RTOL),
        });
    }
    Ok(report)
}
