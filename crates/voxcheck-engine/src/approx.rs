use voxcheck_types::{CellValue, StatsRow};

/// Scalar closeness: |expected − actual| ≤ abs_tol + rel_tol·|expected|.
///
/// Exactly equal values (including infinities) always match; NaN never
/// matches anything.
pub fn values_close(expected: f64, actual: f64, abs_tol: f64, rel_tol: f64) -> bool {
    if expected == actual {
        return true;
    }
    if expected.is_nan() || actual.is_nan() {
        return false;
    }
    (expected - actual).abs() <= abs_tol + rel_tol * expected.abs()
}

/// Cell closeness under an absolute tolerance: numeric cells compare
/// within tolerance (Int vs Float allowed), anything else compares
/// exactly.
pub fn cells_close(expected: &CellValue, actual: &CellValue, abs_tol: f64) -> bool {
    match (expected.as_f64(), actual.as_f64()) {
        (Some(e), Some(a)) => values_close(e, a, abs_tol, 0.0),
        _ => expected == actual,
    }
}

/// Row closeness under an absolute tolerance, with `skip` columns
/// excluded from the comparison on both sides.
///
/// Mirrors dict comparison semantics: both rows must carry the same
/// non-skipped columns, and every shared column must be close.
pub fn rows_match(expected: &StatsRow, actual: &StatsRow, abs_tol: f64, skip: &[&str]) -> bool {
    let mut expected_count = 0;
    for (name, expected_cell) in expected.columns() {
        if skip.contains(&name) {
            continue;
        }
        expected_count += 1;
        match actual.get(name) {
            Some(actual_cell) if cells_close(expected_cell, actual_cell, abs_tol) => {}
            _ => return false,
        }
    }
    let actual_count = actual
        .columns()
        .filter(|(name, _)| !skip.contains(name))
        .count();
    expected_count == actual_count
}
