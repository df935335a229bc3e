use clap::Parser;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "voxcheck")]
#[command(about = "Validate pipeline output subjects against trusted references", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Directory holding trusted reference subjects, one directory per
    /// subject (falls back to VOXCHECK_REF_DIR)
    #[arg(long)]
    pub reference_dir: Option<PathBuf>,

    /// Directory holding the subjects under evaluation (falls back to
    /// VOXCHECK_SUBJECTS_DIR)
    #[arg(long)]
    pub subjects_dir: Option<PathBuf>,

    /// Directory holding tolerance specifications, the error-keyword
    /// configuration and the expected-files manifest (falls back to
    /// VOXCHECK_CONFIG_DIR)
    #[arg(long)]
    pub config_dir: Option<PathBuf>,

    /// Validate only the named subject
    #[arg(long)]
    pub subject: Option<String>,
}
