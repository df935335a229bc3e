use crate::approx::{rows_match, values_close};
use crate::error::{Error, Result};
use crate::tolerances::Tolerances;
use log::debug;
use std::collections::BTreeMap;
use std::collections::HashMap;
use voxcheck_types::{
    CellValue, ComparisonReport, Measure, StatsRow, StatsTable, Violation, SEG_ID_COLUMN,
    STRUCT_NAME_COLUMN,
};

/// Key columns excluded from cell-wise row comparison.
pub const ROW_KEY_COLUMNS: [&str; 2] = [SEG_ID_COLUMN, STRUCT_NAME_COLUMN];

/// Every measure the tolerance spec declares relevant must exist in
/// the test annotations as a well-formed entry. All missing or
/// malformed names are reported together.
pub fn check_measures_exist(
    artifact: &str,
    test: &StatsTable,
    tolerances: &Tolerances,
) -> ComparisonReport {
    let names = tolerances.measure_names();
    if names.is_empty() {
        return ComparisonReport::skipped(artifact);
    }

    let mut report = ComparisonReport::new(artifact);
    for name in &names {
        match test.measure(name) {
            Some(measure) if measure.is_well_formed() => {}
            Some(_) => report.push(Violation::exact(
                format!("measure {}", name),
                "well-formed measure entry",
                "malformed entry",
            )),
            None => report.push(Violation::exact(
                format!("measure {}", name),
                "present",
                "missing",
            )),
        }
    }
    report
}

fn format_meta(measure: &Measure) -> String {
    let fields: Vec<String> = measure
        .meta_fields()
        .iter()
        .map(|field| match field {
            Some(value) => value.to_string(),
            None => "<value>".to_string(),
        })
        .collect();
    format!("({})", fields.join(", "))
}

/// Compare every relevant measure's annotation fields except the raw
/// value. Metadata mismatches are independent of the numeric tolerance.
pub fn check_measure_meta(
    artifact: &str,
    reference: &StatsTable,
    test: &StatsTable,
    tolerances: &Tolerances,
) -> ComparisonReport {
    let names = tolerances.measure_names();
    if names.is_empty() {
        return ComparisonReport::skipped(artifact);
    }

    let mut report = ComparisonReport::new(artifact);
    for name in &names {
        match (reference.measure(name), test.measure(name)) {
            (Some(expected), Some(actual)) => {
                if expected.meta_fields() != actual.meta_fields() {
                    report.push(Violation::exact(
                        format!("measure {}", name),
                        format_meta(expected),
                        format_meta(actual),
                    ));
                }
            }
            (None, _) => report.push(Violation::exact(
                format!("measure {}", name),
                "present in reference",
                "missing from reference",
            )),
            // Missing from the test side is the existence check's finding.
            (_, None) => {}
        }
    }
    report
}

/// Compare every relevant measure's value within its absolute
/// tolerance. Violations carry both raw values.
pub fn check_measure_values(
    artifact: &str,
    reference: &StatsTable,
    test: &StatsTable,
    tolerances: &Tolerances,
) -> ComparisonReport {
    let names = tolerances.measure_names();
    if names.is_empty() {
        return ComparisonReport::skipped(artifact);
    }

    let mut report = ComparisonReport::new(artifact);
    for name in &names {
        let expected = reference.measure(name).and_then(Measure::value);
        let actual = test.measure(name).and_then(Measure::value);
        let (Some(expected), Some(actual)) = (expected, actual) else {
            // Absent or non-numeric entries are the existence check's finding.
            continue;
        };
        let threshold = tolerances.threshold_for_measure(name);
        debug!("measure {}: {} <> {} (abs {})", name, expected, actual, threshold);
        if !values_close(expected, actual, threshold, 0.0) {
            report.push(Violation::with_tolerance(
                format!("measure {}", name),
                expected.to_string(),
                actual.to_string(),
                threshold,
            ));
        }
    }
    report
}

fn identity_map(
    table: &StatsTable,
    side: &str,
    duplicates_fatal: bool,
) -> Result<BTreeMap<i64, Option<String>>> {
    let mut map = BTreeMap::new();
    for row in &table.rows {
        let seg_id = row
            .seg_id()
            .map_err(|err| Error::InvalidArtifact(format!("{} table: {}", side, err)))?;
        let name = row.struct_name().map(str::to_string);
        if map.insert(seg_id, name).is_some() && duplicates_fatal {
            return Err(Error::InvalidArtifact(format!(
                "duplicate SegId {} in {} table",
                seg_id, side
            )));
        }
    }
    Ok(map)
}

/// The SegId → StructName pairs must be identical between reference
/// and test: added, removed, or relabeled structures fail regardless
/// of any value closeness. Duplicate SegId in the reference table is a
/// data error, not a tolerance failure.
pub fn check_row_identity(
    artifact: &str,
    reference: &StatsTable,
    test: &StatsTable,
) -> Result<ComparisonReport> {
    let expected = identity_map(reference, "reference", true)?;
    let actual = identity_map(test, "test", false)?;

    let mut report = ComparisonReport::new(artifact);
    let none = "<none>";
    for (seg_id, expected_name) in &expected {
        let expected_name = expected_name.as_deref().unwrap_or(none);
        match actual.get(seg_id) {
            Some(actual_name) => {
                let actual_name = actual_name.as_deref().unwrap_or(none);
                if expected_name != actual_name {
                    report.push(Violation::exact(
                        format!("SegId {}", seg_id),
                        expected_name,
                        actual_name,
                    ));
                }
            }
            None => report.push(Violation::exact(
                format!("SegId {}", seg_id),
                expected_name,
                "absent",
            )),
        }
    }
    for (seg_id, actual_name) in &actual {
        if !expected.contains_key(seg_id) {
            report.push(Violation::exact(
                format!("SegId {}", seg_id),
                "absent",
                actual_name.as_deref().unwrap_or(none),
            ));
        }
    }
    Ok(report)
}

/// Cell-wise comparison of each reference row against the test row
/// with the same SegId, under the absolute tolerance resolved for that
/// SegId. A row with at least one out-of-tolerance cell is reported
/// once, rendering both full rows.
pub fn check_row_values(
    artifact: &str,
    reference: &StatsTable,
    test: &StatsTable,
    tolerances: &Tolerances,
) -> Result<ComparisonReport> {
    let mut test_rows: HashMap<i64, &StatsRow> = HashMap::new();
    for row in &test.rows {
        let seg_id = row
            .seg_id()
            .map_err(|err| Error::InvalidArtifact(format!("test table: {}", err)))?;
        test_rows.entry(seg_id).or_insert(row);
    }

    let mut report = ComparisonReport::new(artifact);
    for expected in &reference.rows {
        let seg_id = expected
            .seg_id()
            .map_err(|err| Error::InvalidArtifact(format!("reference table: {}", err)))?;
        // Rows missing from the test side are the identity check's finding.
        let Some(actual) = test_rows.get(&seg_id) else {
            continue;
        };
        let (_, threshold) = tolerances.threshold_for_label(seg_id);
        if !rows_match(expected, actual, threshold, &ROW_KEY_COLUMNS) {
            report.push(Violation::with_tolerance(
                format!("SegId {}", seg_id),
                expected.to_string(),
                actual.to_string(),
                threshold,
            ));
        }
    }
    Ok(report)
}

/// Result of comparing two statistics tables at every granularity.
#[derive(Debug)]
pub struct StatsComparison {
    pub report: ComparisonReport,
    /// True when the tolerance spec declared no relevant measures, so
    /// the measure-level checks were skipped rather than run.
    pub measures_skipped: bool,
}

/// Run all five stats checks and merge their violations, preserving
/// check order then reference order within each check.
pub fn compare_stats(
    artifact: &str,
    reference: &StatsTable,
    test: &StatsTable,
    tolerances: &Tolerances,
) -> Result<StatsComparison> {
    let measures_skipped = tolerances.measure_names().is_empty();

    // Row checks always run, so the merged report is never "skipped"
    // even when the measure block had nothing configured.
    let mut report = ComparisonReport::new(artifact);
    report.merge(check_measures_exist(artifact, test, tolerances));
    report.merge(check_measure_meta(artifact, reference, test, tolerances));
    report.merge(check_measure_values(artifact, reference, test, tolerances));
    report.merge(check_row_identity(artifact, reference, test)?);
    report.merge(check_row_values(artifact, reference, test, tolerances)?);

    Ok(StatsComparison {
        report,
        measures_skipped,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn tolerances(dir: &TempDir, yaml_tail: &str) -> Tolerances {
        fs::write(dir.path().join("labels.tsv"), "1\tA\n2\tB\n3\tC\n").unwrap();
        let spec = dir.path().join("aseg.stats.yaml");
        fs::write(
            &spec,
            format!("lut: labels.tsv\ndefault_threshold: 0.1\n{}", yaml_tail),
        )
        .unwrap();
        Tolerances::load(&spec, dir.path()).unwrap()
    }

    fn measure(display: &str, desc: &str, value: f64, unit: &str) -> Measure {
        Measure(vec![
            CellValue::from(display),
            CellValue::from(desc),
            CellValue::Float(value),
            CellValue::from(unit),
        ])
    }

    fn row(seg_id: i64, name: &str, volume: f64) -> StatsRow {
        StatsRow::from_pairs([
            (SEG_ID_COLUMN, CellValue::Int(seg_id)),
            (STRUCT_NAME_COLUMN, CellValue::from(name)),
            ("Volume_mm3", CellValue::Float(volume)),
        ])
    }

    fn table(rows: Vec<StatsRow>) -> StatsTable {
        StatsTable {
            annotations: BTreeMap::new(),
            rows,
        }
    }

    #[test]
    fn test_measures_skipped_when_none_configured() {
        let dir = TempDir::new().unwrap();
        let tols = tolerances(&dir, "");
        let report = check_measures_exist("aseg.stats", &table(vec![]), &tols);
        assert_eq!(report.outcome(), voxcheck_types::CheckOutcome::Skipped);
    }

    #[test]
    fn test_missing_measures_reported_together() {
        let dir = TempDir::new().unwrap();
        let tols = tolerances(&dir, "measure_thresholds:\n  BrainSeg: 1.0\n  eTIV: 1.0\n");
        let mut test_table = table(vec![]);
        test_table
            .annotations
            .insert("Malformed".to_string(), Measure(vec![CellValue::from("x")]));

        let report = check_measures_exist("aseg.stats", &test_table, &tols);
        assert_eq!(report.violations.len(), 2);
    }

    #[test]
    fn test_measure_meta_ignores_value() {
        let dir = TempDir::new().unwrap();
        let tols = tolerances(&dir, "measure_thresholds:\n  BrainSeg: 0.001\n");
        let mut reference = table(vec![]);
        reference
            .annotations
            .insert("BrainSeg".to_string(), measure("BrainSeg", "Brain Volume", 100.0, "mm^3"));
        let mut test_table = table(vec![]);
        test_table
            .annotations
            .insert("BrainSeg".to_string(), measure("BrainSeg", "Brain Volume", 999.0, "mm^3"));

        // Values differ wildly; metadata must still be clean.
        let meta = check_measure_meta("aseg.stats", &reference, &test_table, &tols);
        assert!(meta.passed());
        // And the value check must separately fail.
        let values = check_measure_values("aseg.stats", &reference, &test_table, &tols);
        assert_eq!(values.violations.len(), 1);
        assert_eq!(values.violations[0].expected, "100");
        assert_eq!(values.violations[0].actual, "999");
    }

    #[test]
    fn test_measure_meta_flags_unit_change() {
        let dir = TempDir::new().unwrap();
        let tols = tolerances(&dir, "measure_thresholds:\n  BrainSeg: 1000.0\n");
        let mut reference = table(vec![]);
        reference
            .annotations
            .insert("BrainSeg".to_string(), measure("BrainSeg", "Brain Volume", 100.0, "mm^3"));
        let mut test_table = table(vec![]);
        test_table
            .annotations
            .insert("BrainSeg".to_string(), measure("BrainSeg", "Brain Volume", 100.0, "mL"));

        let meta = check_measure_meta("aseg.stats", &reference, &test_table, &tols);
        assert_eq!(meta.violations.len(), 1);
        assert!(meta.violations[0].expected.contains("<value>"));
    }

    #[test]
    fn test_measure_value_within_tolerance() {
        let dir = TempDir::new().unwrap();
        let tols = tolerances(&dir, "measure_thresholds:\n  eTIV: 12.0\n");
        let mut reference = table(vec![]);
        reference
            .annotations
            .insert("eTIV".to_string(), measure("eTIV", "Intracranial Volume", 1500000.0, "mm^3"));
        let mut test_table = table(vec![]);
        test_table
            .annotations
            .insert("eTIV".to_string(), measure("eTIV", "Intracranial Volume", 1500011.0, "mm^3"));

        let report = check_measure_values("aseg.stats", &reference, &test_table, &tols);
        assert!(report.passed());
    }

    #[test]
    fn test_row_identity_ignores_order() {
        let reference = table(vec![row(1, "A", 10.0), row(2, "B", 20.0), row(3, "C", 30.0)]);
        let permuted = table(vec![row(3, "C", 31.0), row(1, "A", 11.0), row(2, "B", 19.0)]);
        let report = check_row_identity("aseg.stats", &reference, &permuted).unwrap();
        assert!(report.passed());
    }

    #[test]
    fn test_row_identity_reports_changed_set() {
        let reference = table(vec![row(1, "A", 10.0), row(2, "B", 20.0), row(3, "C", 30.0)]);
        let changed = table(vec![row(1, "A", 10.0), row(2, "B", 20.0), row(4, "D", 30.0)]);
        let report = check_row_identity("aseg.stats", &reference, &changed).unwrap();

        let entities: Vec<&str> = report.violations.iter().map(|v| v.entity.as_str()).collect();
        assert_eq!(entities, vec!["SegId 3", "SegId 4"]);
        assert_eq!(report.violations[0].actual, "absent");
        assert_eq!(report.violations[1].expected, "absent");
    }

    #[test]
    fn test_row_identity_flags_relabeled_structure() {
        let reference = table(vec![row(1, "A", 10.0)]);
        let relabeled = table(vec![row(1, "Z", 10.0)]);
        let report = check_row_identity("aseg.stats", &reference, &relabeled).unwrap();
        assert_eq!(report.violations.len(), 1);
        assert_eq!(report.violations[0].expected, "A");
        assert_eq!(report.violations[0].actual, "Z");
    }

    #[test]
    fn test_duplicate_reference_seg_id_is_data_error() {
        let reference = table(vec![row(1, "A", 10.0), row(1, "A", 11.0)]);
        let test_table = table(vec![row(1, "A", 10.0)]);
        assert!(matches!(
            check_row_identity("aseg.stats", &reference, &test_table),
            Err(Error::InvalidArtifact(_))
        ));
    }

    #[test]
    fn test_row_values_within_tolerance_pass() {
        let dir = TempDir::new().unwrap();
        let tols = tolerances(&dir, "");
        let reference = table(vec![row(1, "A", 100.0)]);
        let test_table = table(vec![row(1, "A", 100.04)]);
        let report = check_row_values("aseg.stats", &reference, &test_table, &tols).unwrap();
        assert!(report.passed());
    }

    #[test]
    fn test_row_values_out_of_tolerance_reports_full_rows() {
        let dir = TempDir::new().unwrap();
        let tols = tolerances(&dir, "");
        let reference = table(vec![row(1, "A", 100.0)]);
        let test_table = table(vec![row(1, "A", 101.0)]);
        let report = check_row_values("aseg.stats", &reference, &test_table, &tols).unwrap();

        assert_eq!(report.violations.len(), 1);
        let violation = &report.violations[0];
        assert_eq!(violation.entity, "SegId 1");
        assert_eq!(violation.expected, "{SegId: 1, StructName: A, Volume_mm3: 100}");
        assert_eq!(violation.actual, "{SegId: 1, StructName: A, Volume_mm3: 101}");
        assert_eq!(violation.tolerance, "0.1");
    }

    #[test]
    fn test_row_values_matching_is_by_seg_id_not_position() {
        let dir = TempDir::new().unwrap();
        let tols = tolerances(&dir, "");
        let reference = table(vec![row(1, "A", 100.0), row(2, "B", 200.0)]);
        let permuted = table(vec![row(2, "B", 200.0), row(1, "A", 100.0)]);
        let report = check_row_values("aseg.stats", &reference, &permuted, &tols).unwrap();
        assert!(report.passed());
    }

    #[test]
    fn test_compare_stats_accumulates_all_checks() {
        let dir = TempDir::new().unwrap();
        let tols = tolerances(&dir, "measure_thresholds:\n  BrainSeg: 1.0\n");

        let mut reference = table(vec![row(1, "A", 100.0), row(2, "B", 200.0)]);
        reference
            .annotations
            .insert("BrainSeg".to_string(), measure("BrainSeg", "Brain Volume", 300.0, "mm^3"));
        // Test side: measure missing, row 2 relabeled, row 1 out of tolerance.
        let test_table = table(vec![row(1, "A", 150.0), row(2, "Wrong", 200.0)]);

        let comparison = compare_stats("aseg.stats", &reference, &test_table, &tols).unwrap();
        assert!(!comparison.measures_skipped);
        assert!(!comparison.report.passed());
        assert!(comparison.report.violations.len() >= 3);
    }

    #[test]
    fn test_compare_stats_skips_measures_without_config() {
        let dir = TempDir::new().unwrap();
        let tols = tolerances(&dir, "");
        let reference = table(vec![row(1, "A", 100.0)]);
        let comparison = compare_stats("aseg.stats", &reference, &reference.clone(), &tols).unwrap();
        assert!(comparison.measures_skipped);
        assert!(comparison.report.passed());
    }
}
