//! CLI argument parsing for radar-sig

use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Output format for reports
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text format (default)
    Text,
    /// JSON format for machine parsing
    Json,
}

#[derive(Parser, Debug)]
#[command(name = "radar-sig")]
#[command(version)]
#[command(about = "Flag commits whose benchmark metrics changed significantly", long_about = None)]
pub struct Cli {
    /// Enable debug tracing output to stderr
    #[arg(long = "debug", global = true)]
    pub debug: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Classify the most recent commit pairs of a history
    Analyze(AnalyzeArgs),

    /// Print the per-metric quantiles computed from a history
    Quantiles(QuantilesArgs),

    /// Show which rule and steps a metric is routed to
    Rules(RulesArgs),
}

/// Where significance thresholds come from
#[derive(Args, Debug, Clone)]
pub struct ConfigArgs {
    /// Load significance config from a TOML file
    #[arg(long = "config", value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Use strict preset (fewer significant pairs)
    #[arg(long = "strict", conflicts_with_all = ["permissive", "config"])]
    pub strict: bool,

    /// Use permissive preset (more significant pairs)
    #[arg(long = "permissive", conflicts_with = "config")]
    pub permissive: bool,
}

#[derive(Args, Debug, Clone)]
pub struct AnalyzeArgs {
    /// Repository whose rule table applies (e.g. lean4, mathlib4)
    pub repo: String,

    /// JSON Lines history file, one commit per line, oldest first
    #[arg(value_name = "DATA")]
    pub data: PathBuf,

    /// Number of commit pairs to analyze
    #[arg(short = 'n', long = "amount", default_value = "30")]
    pub amount: usize,

    /// Number of newest commits to leave out
    #[arg(short = 's', long = "skip", default_value = "0")]
    pub skip: usize,

    /// Load rule tables from a TOML file instead of the builtin ones
    #[arg(long = "rules", value_name = "FILE")]
    pub rules: Option<PathBuf>,

    #[command(flatten)]
    pub thresholds: ConfigArgs,

    /// Output format (text or json)
    #[arg(long = "format", value_enum, default_value = "text")]
    pub format: OutputFormat,
}

#[derive(Args, Debug, Clone)]
pub struct QuantilesArgs {
    /// JSON Lines history file
    #[arg(value_name = "DATA")]
    pub data: PathBuf,

    #[command(flatten)]
    pub thresholds: ConfigArgs,

    /// Output format (text or json)
    #[arg(long = "format", value_enum, default_value = "text")]
    pub format: OutputFormat,
}

#[derive(Args, Debug, Clone)]
pub struct RulesArgs {
    /// Repository name
    pub repo: String,

    /// Full metric name, `topic//category`
    pub metric: String,

    /// Load rule tables from a TOML file instead of the builtin ones
    #[arg(long = "rules", value_name = "FILE")]
    pub rules: Option<PathBuf>,
}
