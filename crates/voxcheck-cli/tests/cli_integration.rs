use assert_cmd::Command;
use predicates::prelude::*;
use std::path::Path;
use voxcheck_testing::{
    intensity_volume, measure, segmentation_volume, volume_row, write_image, write_log,
    write_stats, ValidationWorld,
};
use voxcheck_types::StatsTable;

fn voxcheck(world: &ValidationWorld) -> Command {
    let mut cmd = Command::cargo_bin("voxcheck").unwrap();
    cmd.arg("--reference-dir")
        .arg(world.reference_dir())
        .arg("--subjects-dir")
        .arg(world.subjects_dir())
        .arg("--config-dir")
        .arg(world.config_dir());
    cmd
}

fn write_suite_config(world: &ValidationWorld) {
    world
        .write_lut("labels.tsv", &[(0, "Unknown"), (1, "Left-Struct"), (2, "Right-Struct")])
        .unwrap();
    world
        .write_config(
            "image.type.yaml",
            "segmentation:\n  - aseg.json\nintensity:\n  - orig.json\n",
        )
        .unwrap();
    world
        .write_config("aseg.json.yaml", "lut: labels.tsv\ndefault_threshold: 0.05\n")
        .unwrap();
    world
        .write_tolerance_spec(
            "aseg.stats",
            "lut: labels.tsv\n\
             default_threshold: 0.1\n\
             measure_thresholds:\n  BrainSeg: 2.0\n",
        )
        .unwrap();
    world
        .write_config(
            "logfile.errors.yaml",
            "logfiles:\n  - seg.log\nerrors:\n  - error\nwhitelist:\n  - not an error\n",
        )
        .unwrap();
    world
        .write_config(
            "expected-files.yaml",
            "files:\n  - mri/aseg.json\n  - mri/orig.json\n  - stats/aseg.stats\n  - scripts/seg.log\n",
        )
        .unwrap();
}

fn stats_table(volume: f64) -> StatsTable {
    let mut table = StatsTable::default();
    table
        .annotations
        .insert("BrainSeg".to_string(), measure("BrainSeg", "Brain Volume", 1000.0, "mm^3"));
    table.rows = vec![volume_row(1, "Left-Struct", volume), volume_row(2, "Right-Struct", 200.0)];
    table
}

fn populate_subject(root: &Path, labels: Vec<u8>, volume: f64, log_lines: &[&str]) {
    write_image(root, "aseg.json", &segmentation_volume(labels)).unwrap();
    write_image(root, "orig.json", &intensity_volume(vec![0.0, 110.5, 98.25])).unwrap();
    write_stats(root, "aseg.stats", &stats_table(volume)).unwrap();
    write_log(root, "seg.log", log_lines).unwrap();
}

#[test]
fn clean_suite_passes_every_check() {
    let world = ValidationWorld::new().unwrap();
    write_suite_config(&world);

    let reference = world.add_reference_subject("case-001").unwrap();
    let test = world.add_test_subject("case-001").unwrap();
    let log = ["recon started", "recon finished without issues"];
    populate_subject(&reference, vec![0, 1, 1, 2], 100.0, &log);
    populate_subject(&test, vec![0, 1, 1, 2], 100.0, &log);

    voxcheck(&world)
        .assert()
        .success()
        .stdout(predicate::str::contains("PASS case-001 / expected files"))
        .stdout(predicate::str::contains("PASS case-001 / headers aseg.json"))
        .stdout(predicate::str::contains("PASS case-001 / segmentation aseg.json"))
        .stdout(predicate::str::contains("PASS case-001 / intensity orig.json"))
        .stdout(predicate::str::contains("PASS case-001 / stats aseg.stats"))
        .stdout(predicate::str::contains("PASS case-001 / log seg.log"))
        .stdout(predicate::str::contains("7 passed, 0 failed, 0 skipped, 0 errors"));
}

#[test]
fn drifted_subject_fails_with_violation_details() {
    let world = ValidationWorld::new().unwrap();
    write_suite_config(&world);

    let reference = world.add_reference_subject("case-002").unwrap();
    let test = world.add_test_subject("case-002").unwrap();
    let log = ["recon finished"];
    populate_subject(&reference, vec![0, 1, 1, 2], 100.0, &log);
    // Volume drifts past the 0.1 default tolerance.
    populate_subject(&test, vec![0, 1, 1, 2], 101.0, &log);

    voxcheck(&world)
        .assert()
        .failure()
        .stdout(predicate::str::contains("FAIL case-002 / stats aseg.stats"))
        .stdout(predicate::str::contains("SegId 1"))
        .stderr(predicate::str::contains("1 check(s) failed"));
}

#[test]
fn flagged_log_line_fails_with_context() {
    let world = ValidationWorld::new().unwrap();
    write_suite_config(&world);

    let reference = world.add_reference_subject("case-003").unwrap();
    let test = world.add_test_subject("case-003").unwrap();
    populate_subject(&reference, vec![1, 2], 100.0, &["recon finished"]);
    populate_subject(
        &test,
        vec![1, 2],
        100.0,
        &["recon started", "fatal ERROR in step 3", "aborting"],
    );

    voxcheck(&world)
        .assert()
        .failure()
        .stdout(predicate::str::contains("FAIL case-003 / log seg.log"))
        .stdout(predicate::str::contains("fatal ERROR in step 3"));
}

#[test]
fn missing_artifact_is_an_error_not_a_crash() {
    let world = ValidationWorld::new().unwrap();
    write_suite_config(&world);

    let reference = world.add_reference_subject("case-004").unwrap();
    let test = world.add_test_subject("case-004").unwrap();
    let log = ["recon finished"];
    populate_subject(&reference, vec![1, 2], 100.0, &log);
    populate_subject(&test, vec![1, 2], 100.0, &log);
    std::fs::remove_file(test.join("mri/orig.json")).unwrap();

    // The intensity check errors and the manifest check fails, but the
    // remaining checks still run and report.
    voxcheck(&world)
        .assert()
        .failure()
        .stdout(predicate::str::contains("FAIL case-004 / expected files"))
        .stdout(predicate::str::contains("mri/orig.json: missing"))
        .stdout(predicate::str::contains("ERROR case-004 / headers orig.json"))
        .stdout(predicate::str::contains("ERROR case-004 / intensity orig.json"))
        .stdout(predicate::str::contains("PASS case-004 / stats aseg.stats"))
        .stderr(predicate::str::contains("errored"));
}

#[test]
fn subject_filter_selects_one_subject() {
    let world = ValidationWorld::new().unwrap();
    write_suite_config(&world);

    for name in ["case-005", "case-006"] {
        let reference = world.add_reference_subject(name).unwrap();
        let test = world.add_test_subject(name).unwrap();
        let log = ["done"];
        populate_subject(&reference, vec![1, 2], 100.0, &log);
        populate_subject(&test, vec![1, 2], 100.0, &log);
    }

    voxcheck(&world)
        .arg("--subject")
        .arg("case-006")
        .assert()
        .success()
        .stdout(predicate::str::contains("case-006"))
        .stdout(predicate::str::contains("case-005").not());
}

#[test]
fn directories_fall_back_to_environment_variables() {
    let world = ValidationWorld::new().unwrap();
    write_suite_config(&world);

    let reference = world.add_reference_subject("case-007").unwrap();
    let test = world.add_test_subject("case-007").unwrap();
    let log = ["done"];
    populate_subject(&reference, vec![1, 2], 100.0, &log);
    populate_subject(&test, vec![1, 2], 100.0, &log);

    Command::cargo_bin("voxcheck")
        .unwrap()
        .env("VOXCHECK_REF_DIR", world.reference_dir())
        .env("VOXCHECK_SUBJECTS_DIR", world.subjects_dir())
        .env("VOXCHECK_CONFIG_DIR", world.config_dir())
        .assert()
        .success()
        .stdout(predicate::str::contains("PASS case-007 / stats aseg.stats"));
}

#[test]
fn explicit_flag_overrides_environment_variable() {
    let world = ValidationWorld::new().unwrap();
    write_suite_config(&world);

    let reference = world.add_reference_subject("case-008").unwrap();
    let test = world.add_test_subject("case-008").unwrap();
    let log = ["done"];
    populate_subject(&reference, vec![1, 2], 100.0, &log);
    populate_subject(&test, vec![1, 2], 100.0, &log);

    // The environment points at a root with no subjects; the flag must
    // win and find case-008.
    Command::cargo_bin("voxcheck")
        .unwrap()
        .env("VOXCHECK_REF_DIR", world.config_dir())
        .arg("--reference-dir")
        .arg(world.reference_dir())
        .env("VOXCHECK_SUBJECTS_DIR", world.subjects_dir())
        .env("VOXCHECK_CONFIG_DIR", world.config_dir())
        .assert()
        .success()
        .stdout(predicate::str::contains("case-008"));
}

#[test]
fn empty_reference_root_is_an_error() {
    let world = ValidationWorld::new().unwrap();
    write_suite_config(&world);

    voxcheck(&world)
        .assert()
        .failure()
        .stderr(predicate::str::contains("no subjects found"));
}
