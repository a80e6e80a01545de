//! CLI argument definitions.

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// Calibrated keep/drop filtering for satellite imagery tiles.
#[derive(Debug, Parser)]
#[command(name = "tilegate")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Subcommand to run.
    #[command(subcommand)]
    pub command: Command,

    /// Options shared by every subcommand.
    #[command(flatten)]
    pub global: GlobalArgs,
}

/// Options shared by every subcommand.
#[derive(Debug, Args)]
pub struct GlobalArgs {
    /// Suppress progress output.
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Increase verbosity (-v: debug, -vv: trace+ORT info, -vvv: full trace).
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Enable CUDA GPU acceleration.
    #[arg(long, global = true, conflicts_with = "cpu")]
    pub gpu: bool,

    /// Force CPU inference.
    #[arg(long, global = true, conflicts_with = "gpu")]
    pub cpu: bool,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Calibrate a deployment threshold against a recall target.
    Calibrate(CalibrateArgs),
    /// Score a labeled validation split and write the validation log.
    Telemetry(TelemetryArgs),
    /// Filter incoming tiles, staging kept ones for downlink.
    Filter(FilterArgs),
    /// Reconcile logs and calibration into a metrics report.
    Summarize(SummarizeArgs),
    /// Manage configuration.
    Config {
        /// Configuration action to perform.
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Config subcommand actions.
#[derive(Debug, Clone, Copy, Subcommand)]
pub enum ConfigAction {
    /// Create default configuration file.
    Init,
    /// Display current configuration.
    Show,
    /// Print configuration file path.
    Path,
}

/// Options shared by the scoring subcommands.
#[derive(Debug, Args)]
pub struct ScorerArgs {
    /// Path to the ONNX model file.
    #[arg(short, long, env = "TILEGATE_MODEL")]
    pub model: Option<PathBuf>,

    /// Tile edge length in pixels.
    #[arg(long, env = "TILEGATE_TILE_SIZE")]
    pub size: Option<u32>,

    /// Temperature divisor for logits (must be positive).
    #[arg(short = 't', long, value_parser = parse_temperature, env = "TILEGATE_TEMPERATURE")]
    pub temperature: Option<f64>,
}

/// Arguments for the calibrate command.
#[derive(Debug, Args)]
pub struct CalibrateArgs {
    /// Scorer options.
    #[command(flatten)]
    pub scorer: ScorerArgs,

    /// Path to the labeled validation split (background/, event/).
    #[arg(short, long)]
    pub data: PathBuf,

    /// Recall target in (0.0, 1.0].
    #[arg(long, value_parser = parse_recall, env = "TILEGATE_TARGET_RECALL")]
    pub target_recall: Option<f64>,

    /// Output path for the calibration artifact.
    #[arg(short, long, default_value = crate::constants::filenames::CALIBRATION)]
    pub out: PathBuf,
}

/// Arguments for the telemetry command.
#[derive(Debug, Args)]
pub struct TelemetryArgs {
    /// Scorer options.
    #[command(flatten)]
    pub scorer: ScorerArgs,

    /// Path to the labeled validation split (background/, event/).
    #[arg(short, long)]
    pub data: PathBuf,

    /// Calibration artifact supplying threshold and temperature.
    #[arg(long)]
    pub calibration: Option<PathBuf>,

    /// Keep threshold (0.0-1.0); overrides the calibration artifact.
    #[arg(long, value_parser = parse_probability)]
    pub threshold: Option<f64>,

    /// Output path for the validation log.
    #[arg(short, long, default_value = crate::constants::filenames::VAL_LOG)]
    pub out: PathBuf,
}

/// Arguments for the filter command.
#[derive(Debug, Args)]
pub struct FilterArgs {
    /// Scorer options.
    #[command(flatten)]
    pub scorer: ScorerArgs,

    /// Directory of incoming tiles (searched recursively for PNGs).
    #[arg(short, long)]
    pub data: PathBuf,

    /// Calibration artifact supplying threshold and temperature.
    #[arg(long)]
    pub calibration: Option<PathBuf>,

    /// Keep threshold (0.0-1.0); overrides the calibration artifact.
    #[arg(long, value_parser = parse_probability)]
    pub threshold: Option<f64>,

    /// Directory where kept tiles are staged.
    #[arg(long, default_value = crate::constants::filenames::DOWNLINK_DIR)]
    pub downlink_out: PathBuf,

    /// Optional downlink decision log path.
    #[arg(long)]
    pub log: Option<PathBuf>,
}

/// Arguments for the summarize command.
#[derive(Debug, Args)]
pub struct SummarizeArgs {
    /// Validation log path.
    #[arg(long)]
    pub val_log: PathBuf,

    /// Downlink log path.
    #[arg(long)]
    pub downlink_log: PathBuf,

    /// Calibration artifact path.
    #[arg(long)]
    pub calibration: PathBuf,

    /// Output directory for metrics.json and summary.md.
    #[arg(long)]
    pub out_dir: PathBuf,

    /// Validation split root; tile count is cross-checked against the log.
    #[arg(long)]
    pub val_dir: Option<PathBuf>,
}

/// Parse and validate a probability value.
fn parse_probability(s: &str) -> Result<f64, String> {
    let value: f64 = s
        .parse()
        .map_err(|_| format!("'{s}' is not a valid number"))?;

    if !(0.0..=1.0).contains(&value) {
        return Err(format!(
            "probability must be between 0.0 and 1.0, got {value}"
        ));
    }

    Ok(value)
}

/// Parse and validate a recall target.
fn parse_recall(s: &str) -> Result<f64, String> {
    let value: f64 = s
        .parse()
        .map_err(|_| format!("'{s}' is not a valid number"))?;

    if !(value > 0.0 && value <= 1.0) {
        return Err(format!(
            "recall target must be in (0.0, 1.0], got {value}"
        ));
    }

    Ok(value)
}

/// Parse and validate a temperature divisor.
fn parse_temperature(s: &str) -> Result<f64, String> {
    let value: f64 = s
        .parse()
        .map_err(|_| format!("'{s}' is not a valid number"))?;

    if !(value.is_finite() && value > 0.0) {
        return Err(format!("temperature must be a positive number, got {value}"));
    }

    Ok(value)
}
