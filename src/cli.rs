use std::path::PathBuf;

use batlint::output::OutputFormat;
use clap::Parser;

#[derive(Parser)]
#[command(
    name = "batlint",
    version,
    about = "Static analyzer for Windows batch scripts (.bat / .cmd)"
)]
pub struct Cli {
    /// Batch file or directory to lint
    #[arg(required_unless_present = "create_config")]
    pub path: Option<PathBuf>,

    /// Show aggregate counts after per-file output
    #[arg(long)]
    pub summary: bool,

    /// Maximum line length for S011/S020
    #[arg(long, value_name = "N")]
    pub max_line_length: Option<usize>,

    /// Do not recurse into subdirectories
    #[arg(long)]
    pub no_recursive: bool,

    /// Follow CALLed scripts and import their variable definitions
    #[arg(long)]
    pub follow_calls: bool,

    /// Ignore the on-disk configuration file
    #[arg(long)]
    pub no_config: bool,

    /// Use this configuration file instead of batlint.toml
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Write a default batlint.toml and exit
    #[arg(long)]
    pub create_config: bool,

    /// Output format
    #[arg(long, short, default_value = "pretty", value_enum)]
    pub format: OutputFormat,
}
