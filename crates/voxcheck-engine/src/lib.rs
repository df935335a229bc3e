// Engine module - tolerance resolution and structured comparison
// This layer holds all pass/fail decision logic; I/O plumbing lives in
// voxcheck-artifacts and presentation in voxcheck-cli.
//
// Comparators never fail-fast on discrepancies: every tolerance
// violation in a run is accumulated and returned, so a single report
// names every deviating entity, not just the first. Errors are
// reserved for structural problems (bad config, missing or malformed
// artifacts) and abort only the check that hit them.

mod approx;
mod error;
mod image;
mod logscan;
mod stats;
mod tolerances;

pub use approx::{cells_close, rows_match, values_close};
pub use error::{Error, Result};
pub use image::{
    compare_headers, compare_intensity, compare_segmentation, dice_distances, LabelOverlap,
    INTENSITY_RTOL,
};
pub use logscan::{LogScanReport, LogScanner, ScanConfig};
pub use stats::{
    check_measure_meta, check_measure_values, check_measures_exist, check_row_identity,
    check_row_values, compare_stats, StatsComparison, ROW_KEY_COLUMNS,
};
pub use tolerances::Tolerances;
