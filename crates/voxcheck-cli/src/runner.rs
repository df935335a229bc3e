use anyhow::{Context, Result};
use log::debug;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use voxcheck_artifacts::{
    ArtifactStore, FileManifest, JsonImageReader, JsonStatsReader, Subject,
};
use voxcheck_engine::{
    compare_headers, compare_intensity, compare_segmentation, compare_stats, LogScanner,
    ScanConfig, Tolerances,
};
use voxcheck_types::{CheckOutcome, ComparisonReport};

/// Filename of the image classification document in the config directory.
const IMAGE_TYPES_FILE: &str = "image.type.yaml";
/// Filename of the error-keyword configuration in the config directory.
const LOG_ERRORS_FILE: &str = "logfile.errors.yaml";
/// Filename of the expected-files manifest in the config directory.
const MANIFEST_FILE: &str = "expected-files.yaml";
/// Suffix of stats tolerance specifications in the config directory.
const STATS_SPEC_SUFFIX: &str = ".stats.yaml";

/// Which named images are segmentations and which are intensity
/// volumes, plus which log files to scan.
#[derive(Debug, Default, Deserialize)]
struct ImageTypes {
    #[serde(default)]
    segmentation: Vec<String>,
    #[serde(default)]
    intensity: Vec<String>,
}

#[derive(Debug, Default, Deserialize)]
struct LogFiles {
    #[serde(default)]
    logfiles: Vec<String>,
}

/// Status of one executed check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStatus {
    Passed,
    Failed,
    Skipped,
    Error,
}

/// One check executed for one subject.
#[derive(Debug)]
pub struct CheckResult {
    pub subject: String,
    pub check: String,
    pub status: RunStatus,
    /// Violation renderings or the error message, one entry per line.
    pub details: Vec<String>,
}

impl CheckResult {
    fn from_report(subject: &str, check: String, report: &ComparisonReport) -> Self {
        let status = match report.outcome() {
            CheckOutcome::Passed => RunStatus::Passed,
            CheckOutcome::Failed => RunStatus::Failed,
            CheckOutcome::Skipped => RunStatus::Skipped,
        };
        Self {
            subject: subject.to_string(),
            check,
            status,
            details: report.violations.iter().map(|v| v.to_string()).collect(),
        }
    }

    fn from_error(subject: &str, check: String, err: impl std::fmt::Display) -> Self {
        Self {
            subject: subject.to_string(),
            check,
            status: RunStatus::Error,
            details: vec![err.to_string()],
        }
    }
}

/// The whole check suite for one run.
pub struct SuiteConfig {
    pub reference_dir: PathBuf,
    pub subjects_dir: PathBuf,
    pub config_dir: PathBuf,
    pub subject_filter: Option<String>,
}

fn load_yaml_if_present<T: Default + serde::de::DeserializeOwned>(path: &Path) -> Result<T> {
    if !path.is_file() {
        return Ok(T::default());
    }
    let contents = fs::read_to_string(path)?;
    serde_yaml::from_str(&contents).with_context(|| format!("parsing {}", path.display()))
}

/// Stats tolerance specs in the config directory, sorted by filename.
/// `aseg.stats.yaml` configures checks for the artifact `aseg.stats`.
fn stats_artifacts(config_dir: &Path) -> Result<Vec<String>> {
    let mut artifacts = Vec::new();
    for entry in fs::read_dir(config_dir)? {
        let entry = entry?;
        let name = entry.file_name().to_string_lossy().into_owned();
        if let Some(artifact) = name.strip_suffix(".yaml")
            && name.ends_with(STATS_SPEC_SUFFIX)
        {
            artifacts.push(artifact.to_string());
        }
    }
    artifacts.sort();
    Ok(artifacts)
}

/// Subject directories under the reference root, sorted by name.
fn reference_subjects(config: &SuiteConfig) -> Result<Vec<PathBuf>> {
    let mut subjects = Vec::new();
    for entry in fs::read_dir(&config.reference_dir)
        .with_context(|| format!("reading {}", config.reference_dir.display()))?
    {
        let entry = entry?;
        if !entry.file_type()?.is_dir() {
            continue;
        }
        let name = entry.file_name().to_string_lossy().into_owned();
        if let Some(filter) = &config.subject_filter
            && *filter != name
        {
            continue;
        }
        subjects.push(entry.path());
    }
    subjects.sort();
    Ok(subjects)
}

/// Execute every configured check for every subject under the
/// reference root. Per-check errors are captured as results, never
/// aborting the remaining checks.
pub fn run_suite(config: &SuiteConfig) -> Result<Vec<CheckResult>> {
    let image_types: ImageTypes =
        load_yaml_if_present(&config.config_dir.join(IMAGE_TYPES_FILE))?;
    let log_files: LogFiles = load_yaml_if_present(&config.config_dir.join(LOG_ERRORS_FILE))?;
    let stats_specs = stats_artifacts(&config.config_dir)?;

    let manifest_path = config.config_dir.join(MANIFEST_FILE);
    let manifest = manifest_path
        .is_file()
        .then(|| FileManifest::load(&manifest_path))
        .transpose()?;

    let scanner_config_path = config.config_dir.join(LOG_ERRORS_FILE);
    let scanner = scanner_config_path
        .is_file()
        .then(|| ScanConfig::load(&scanner_config_path).map(LogScanner::new))
        .transpose()?;

    let mut results = Vec::new();
    for reference_root in reference_subjects(config)? {
        run_subject_checks(
            config,
            &reference_root,
            &image_types,
            &log_files.logfiles,
            &stats_specs,
            manifest.as_ref(),
            scanner.as_ref(),
            &mut results,
        );
    }
    Ok(results)
}

#[allow(clippy::too_many_arguments)]
fn run_subject_checks(
    config: &SuiteConfig,
    reference_root: &Path,
    image_types: &ImageTypes,
    log_files: &[String],
    stats_specs: &[String],
    manifest: Option<&FileManifest>,
    scanner: Option<&LogScanner>,
    results: &mut Vec<CheckResult>,
) {
    let name = reference_root
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    debug!("validating subject {}", name);

    let reference = match Subject::new(reference_root) {
        Ok(subject) => subject,
        Err(err) => {
            results.push(CheckResult::from_error(&name, "subject".to_string(), err));
            return;
        }
    };
    let reference_store = ArtifactStore::new(
        reference,
        Arc::new(JsonImageReader),
        Arc::new(JsonStatsReader),
    );
    let test_store = match reference_store.with_subjects_dir(&config.subjects_dir) {
        Ok(store) => store,
        Err(err) => {
            results.push(CheckResult::from_error(&name, "subject".to_string(), err));
            return;
        }
    };

    if let Some(manifest) = manifest {
        let missing = manifest.missing_in(test_store.subject().root());
        results.push(CheckResult {
            subject: name.clone(),
            check: "expected files".to_string(),
            status: if missing.is_empty() {
                RunStatus::Passed
            } else {
                RunStatus::Failed
            },
            details: missing
                .into_iter()
                .map(|file| format!("{}: missing", file))
                .collect(),
        });
    }

    let all_images = image_types
        .segmentation
        .iter()
        .map(|image| (image, true))
        .chain(image_types.intensity.iter().map(|image| (image, false)));
    for (image, is_segmentation) in all_images {
        run_image_checks(
            config,
            &name,
            image,
            is_segmentation,
            &reference_store,
            &test_store,
            results,
        );
    }

    for artifact in stats_specs {
        let check = format!("stats {}", artifact);
        match run_stats_check(config, artifact, &reference_store, &test_store) {
            Ok(report) => results.push(CheckResult::from_report(&name, check, &report)),
            Err(err) => results.push(CheckResult::from_error(&name, check, err)),
        }
    }

    if let Some(scanner) = scanner {
        for log_file in log_files {
            let check = format!("log {}", log_file);
            match test_store.read_log(log_file) {
                Ok((_, lines)) => {
                    let report = scanner.scan(log_file, &lines);
                    results.push(CheckResult {
                        subject: name.clone(),
                        check,
                        status: if report.passed() {
                            RunStatus::Passed
                        } else {
                            RunStatus::Failed
                        },
                        details: report.context,
                    });
                }
                Err(err) => results.push(CheckResult::from_error(&name, check, err)),
            }
        }
    }
}

fn run_image_checks(
    config: &SuiteConfig,
    subject: &str,
    image: &str,
    is_segmentation: bool,
    reference_store: &ArtifactStore,
    test_store: &ArtifactStore,
    results: &mut Vec<CheckResult>,
) {
    let header_check = format!("headers {}", image);
    let data_check = if is_segmentation {
        format!("segmentation {}", image)
    } else {
        format!("intensity {}", image)
    };

    let loaded = reference_store
        .load_image(image)
        .and_then(|(_, reference)| {
            test_store.load_image(image).map(|(_, test)| (reference, test))
        });
    let (reference, test) = match loaded {
        Ok(pair) => pair,
        Err(err) => {
            // Both checks for this image errored, so the suite keeps a
            // stable per-subject check count.
            results.push(CheckResult::from_error(subject, header_check, &err));
            results.push(CheckResult::from_error(subject, data_check, err));
            return;
        }
    };

    results.push(CheckResult::from_report(
        subject,
        header_check,
        &compare_headers(image, &reference, &test),
    ));

    let outcome = if is_segmentation {
        Tolerances::load(&config.config_dir.join(format!("{}.yaml", image)), &config.config_dir)
            .and_then(|tolerances| compare_segmentation(image, &reference, &test, &tolerances))
    } else {
        compare_intensity(image, &reference, &test)
    };
    match outcome {
        Ok(report) => results.push(CheckResult::from_report(subject, data_check, &report)),
        Err(err) => results.push(CheckResult::from_error(subject, data_check, err)),
    }
}

fn run_stats_check(
    config: &SuiteConfig,
    artifact: &str,
    reference_store: &ArtifactStore,
    test_store: &ArtifactStore,
) -> voxcheck_engine::Result<ComparisonReport> {
    let tolerances = Tolerances::load(
        &config.config_dir.join(format!("{}.yaml", artifact)),
        &config.config_dir,
    )?;
    let (_, reference) = reference_store.load_stats(artifact)?;
    let (_, test) = test_store.load_stats(artifact)?;
    let comparison = compare_stats(artifact, &reference, &test, &tolerances)?;
    Ok(comparison.report)
}
