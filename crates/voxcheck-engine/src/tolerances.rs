use crate::error::{Error, Result};
use log::{debug, warn};
use serde::Deserialize;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use voxcheck_artifacts::LabelLookup;

/// On-disk shape of a tolerance specification document.
///
/// `measure_thresholds` is kept as a raw value so a malformed section
/// (not a mapping) degrades gracefully instead of failing the load.
#[derive(Debug, Deserialize)]
struct ToleranceConfig {
    lut: Option<String>,
    default_threshold: f64,
    #[serde(default)]
    thresholds: HashMap<String, f64>,
    #[serde(default)]
    measure_thresholds: Option<serde_yaml::Value>,
}

/// Resolves "how different is too different" for structure labels and
/// measure names. Immutable after load.
#[derive(Debug)]
pub struct Tolerances {
    config_path: PathBuf,
    default_threshold: f64,
    thresholds: HashMap<String, f64>,
    measure_thresholds: Option<serde_yaml::Value>,
    lookup: LabelLookup,
}

impl Tolerances {
    /// Parse a tolerance specification and eagerly load its label
    /// lookup table (resolved relative to `lut_anchor`).
    ///
    /// A document without the required `lut` key is a configuration
    /// error.
    pub fn load(config_path: &Path, lut_anchor: &Path) -> Result<Self> {
        debug!("reading tolerance spec {}", config_path.display());
        let contents = fs::read_to_string(config_path).map_err(|err| {
            Error::Config(format!("cannot read {}: {}", config_path.display(), err))
        })?;
        let config: ToleranceConfig = serde_yaml::from_str(&contents)?;

        let lut = config.lut.ok_or_else(|| {
            Error::Config(format!("lut not found in {}", config_path.display()))
        })?;
        let lookup = LabelLookup::from_tsv(&lut_anchor.join(lut))?;

        Ok(Self {
            config_path: config_path.to_path_buf(),
            default_threshold: config.default_threshold,
            thresholds: config.thresholds,
            measure_thresholds: config.measure_thresholds,
            lookup,
        })
    }

    pub fn default_threshold(&self) -> f64 {
        self.default_threshold
    }

    /// Resolve the tolerance for a numeric label.
    ///
    /// The label id is translated to a structure name through the
    /// lookup table, falling back to the stringified id; a name
    /// without a specific threshold falls back to the default. Total
    /// over the label domain, never fails.
    pub fn threshold_for_label(&self, label: i64) -> (String, f64) {
        let name = match self.lookup.name(label) {
            Some(name) => name.to_string(),
            None => label.to_string(),
        };
        let threshold = self
            .thresholds
            .get(&name)
            .copied()
            .unwrap_or(self.default_threshold);
        (name, threshold)
    }

    fn measure_map(&self) -> Option<&serde_yaml::Mapping> {
        match &self.measure_thresholds {
            None => None,
            Some(serde_yaml::Value::Mapping(map)) => Some(map),
            Some(_) => {
                warn!(
                    "measure_thresholds for {} are not a mapping",
                    self.config_path.display()
                );
                None
            }
        }
    }

    /// Resolve the tolerance for a named measure, falling back to the
    /// default when the section is absent, malformed, or lacks the key.
    pub fn threshold_for_measure(&self, measure: &str) -> f64 {
        self.measure_map()
            .and_then(|map| {
                map.iter()
                    .find(|(key, _)| key.as_str() == Some(measure))
                    .and_then(|(_, value)| value.as_f64())
            })
            .unwrap_or(self.default_threshold)
    }

    /// Names of the measures this specification declares relevant, in
    /// document order. Empty means "nothing configured to check" and
    /// callers must skip, not fail.
    pub fn measure_names(&self) -> Vec<String> {
        self.measure_map()
            .map(|map| {
                map.keys()
                    .filter_map(|key| key.as_str().map(str::to_string))
                    .collect()
            })
            .unwrap_or_default()
    }
}
