// CLI layer - drives the check suite and renders results.
// All decision logic lives in voxcheck-engine; this crate only wires
// configuration, subjects and presentation together.

mod args;
mod render;
mod runner;

pub use args::Cli;
pub use render::{render, Summary};
pub use runner::{run_suite, CheckResult, RunStatus, SuiteConfig};

use anyhow::{bail, Result};
use is_terminal::IsTerminal;
use std::path::PathBuf;

/// Resolve a directory setting: explicit flag first, then environment
/// variable.
fn resolve_dir(explicit: Option<PathBuf>, env_var: &str) -> Result<PathBuf> {
    if let Some(path) = explicit {
        return Ok(path);
    }
    if let Ok(env_path) = std::env::var(env_var) {
        return Ok(PathBuf::from(env_path));
    }
    bail!("missing required directory: pass the flag or set {}", env_var)
}

pub fn run(cli: Cli) -> Result<()> {
    let config = SuiteConfig {
        reference_dir: resolve_dir(cli.reference_dir, "VOXCHECK_REF_DIR")?,
        subjects_dir: resolve_dir(cli.subjects_dir, "VOXCHECK_SUBJECTS_DIR")?,
        config_dir: resolve_dir(cli.config_dir, "VOXCHECK_CONFIG_DIR")?,
        subject_filter: cli.subject,
    };

    let results = run_suite(&config)?;
    if results.is_empty() {
        bail!(
            "no subjects found under {}",
            config.reference_dir.display()
        );
    }

    let mut stdout = std::io::stdout();
    let color = stdout.is_terminal();
    let summary = render(&results, color, &mut stdout)?;
    if !summary.clean() {
        bail!(
            "{} check(s) failed, {} errored",
            summary.failed,
            summary.errors
        );
    }
    Ok(())
}
