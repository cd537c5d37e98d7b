//! CLI argument parsing for cartlab

use clap::{Parser, ValueEnum};
use std::path::PathBuf;

/// Output format for the dashboard report
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text report (default)
    Text,
    /// JSON snapshot for machine parsing
    Json,
}

#[derive(Parser, Debug)]
#[command(name = "cartlab")]
#[command(version)]
#[command(about = "Class dashboard statistics for cart-mass experiments", long_about = None)]
pub struct Cli {
    /// JSON array of submission records
    #[arg(short, long, value_name = "FILE")]
    pub records: PathBuf,

    /// JSON array of class records (code, name)
    #[arg(long, value_name = "FILE")]
    pub classes: Option<PathBuf>,

    /// Narrow the dashboard to one class code (ALL for every class)
    #[arg(short = 'k', long = "class", value_name = "CODE", default_value = "ALL")]
    pub class: String,

    /// TOML file overriding engine settings
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Output format (text or json)
    #[arg(long = "format", value_enum, default_value = "text")]
    pub format: OutputFormat,

    /// Enable debug tracing output to stderr
    #[arg(long)]
    pub debug: bool,
}
