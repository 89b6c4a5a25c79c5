use std::path::PathBuf;

use clap::Parser;
use clap_verbosity_flag::{Verbosity, WarnLevel};

/// Check npm packages against the GitHub Security Advisory database
#[derive(Parser)]
#[command(name = "pkgguard", version)]
pub struct Cli {
    /// Packages to check, as name@version
    pub packages: Vec<String>,

    /// JSON file holding {"packages": [{"name", "version"}]}; "-" reads stdin
    #[arg(short, long)]
    pub file: Option<PathBuf>,

    /// Print advisories as a JSON array
    #[arg(long)]
    pub json: bool,

    /// GitHub token used to authenticate advisory queries
    #[arg(long, env = "GITHUB_TOKEN", hide_env_values = true)]
    pub github_token: Option<String>,

    /// Emit logs as JSON lines
    #[arg(long)]
    pub log_json: bool,

    #[command(flatten)]
    pub verbosity: Verbosity<WarnLevel>,
}
