//! Tilegate - calibrated keep/drop filtering for satellite imagery tiles.
//!
//! This crate implements an on-board bandwidth-reduction pipeline: an
//! ONNX classifier scores each tile, a calibrated threshold turns scores
//! into keep/drop decisions, and an assurance summarizer reconciles the
//! resulting decision logs into auditable metrics.

#![warn(missing_docs)]

pub mod calibrate;
pub mod cli;
pub mod config;
pub mod constants;
pub mod error;
pub mod filter;
pub mod gate;
pub mod progress;
pub mod scorer;
pub mod summarize;
pub mod telemetry;
pub mod tiles;
pub mod utils;

use calibrate::{CalibrationOptions, ScoreSample};
use clap::Parser;
use cli::{
    CalibrateArgs, Cli, Command, FilterArgs, GlobalArgs, ScorerArgs, SummarizeArgs, TelemetryArgs,
};
use config::{Config, InferenceDevice, config_file_path, load_default_config, save_default_config};
use constants::DEFAULT_FILTER_THRESHOLD;
use scorer::{ScorerOptions, TileScorer};
use std::path::PathBuf;
use std::time::Instant;
use tracing::{info, warn};

pub use error::{Error, Result};

/// Main entry point for the tilegate CLI.
pub fn run() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    init_logging(cli.global.verbose, cli.global.quiet);

    // Load configuration
    let config = load_default_config()?;

    match cli.command {
        Command::Config { action } => handle_config_command(action),
        // Summarize is a pure log reduction; it must work without an
        // inference runtime on the machine.
        Command::Summarize(args) => run_summarize(&args),
        Command::Calibrate(args) => {
            init_runtime()?;
            run_calibrate(&args, &cli.global, &config)
        }
        Command::Telemetry(args) => {
            init_runtime()?;
            run_telemetry(&args, &cli.global, &config)
        }
        Command::Filter(args) => {
            init_runtime()?;
            run_filter(&args, &cli.global, &config)
        }
    }
}

/// Initialize the ONNX runtime environment.
fn init_runtime() -> Result<()> {
    ort::init().with_name(constants::APP_NAME).commit();
    Ok(())
}

/// Calibrate a deployment threshold from a labeled validation split.
fn run_calibrate(args: &CalibrateArgs, global: &GlobalArgs, config: &Config) -> Result<()> {
    let target_recall = args.target_recall.unwrap_or(config.defaults.target_recall);
    let temperature = args
        .scorer
        .temperature
        .unwrap_or(config.defaults.temperature);

    let tiles = tiles::collect_labeled_tiles(&args.data)?;
    if tiles.is_empty() {
        return Err(Error::NoValidationTiles {
            path: args.data.clone(),
        });
    }
    info!("Found {} validation tile(s)", tiles.len());

    let mut scorer = build_scorer(&args.scorer, global, config, temperature)?;

    let progress_enabled = !global.quiet;
    let pb = progress::create_tile_progress(tiles.len(), progress_enabled);
    let start = Instant::now();
    let mut samples = Vec::with_capacity(tiles.len());
    for (path, class) in &tiles {
        let score = scorer.score_tile(path)?;
        samples.push(ScoreSample {
            score: score.prob_event,
            true_label: class.is_event(),
        });
        progress::inc_progress(pb.as_ref());
    }
    progress::finish_progress(pb, "Scoring complete");
    let duration_s = start.elapsed().as_secs_f64();

    let mut operating_point = calibrate::calibrate(
        &samples,
        &CalibrationOptions {
            target_recall,
            temperature,
        },
    )?;
    operating_point.duration_s = duration_s;

    if operating_point.recall_fallback {
        warn!(
            "no threshold reaches target recall {}; falling back to best achievable recall {:.4}",
            target_recall, operating_point.achieved_recall
        );
    }

    operating_point.save(&args.out)?;
    info!(
        "Saved {}: threshold {:.6}, achieved recall {:.4} (target {}), precision {:.4}, AUC {}",
        args.out.display(),
        operating_point.threshold,
        operating_point.achieved_recall,
        target_recall,
        operating_point.precision_at_threshold,
        operating_point
            .auc_roc
            .map_or_else(|| "n/a".to_string(), |auc| format!("{auc:.4}")),
    );

    Ok(())
}

/// Score a validation split and write the validation decision log.
fn run_telemetry(args: &TelemetryArgs, global: &GlobalArgs, config: &Config) -> Result<()> {
    let artifact = match &args.calibration {
        Some(path) => Some(calibrate::OperatingPoint::load(path)?),
        None => None,
    };

    let threshold = args
        .threshold
        .or(artifact.as_ref().map(|a| a.threshold))
        .unwrap_or(config.defaults.threshold);
    let temperature = args
        .scorer
        .temperature
        .or(artifact.as_ref().map(|a| a.temperature))
        .unwrap_or(config.defaults.temperature);

    let tiles = tiles::collect_labeled_tiles(&args.data)?;
    if tiles.is_empty() {
        warn!("No validation tiles under {}", args.data.display());
    }

    let mut scorer = build_scorer(&args.scorer, global, config, temperature)?;
    telemetry::write_validation_log(
        &mut scorer,
        &tiles,
        &telemetry::TelemetryOptions {
            threshold,
            out: args.out.clone(),
            progress_enabled: !global.quiet,
        },
    )?;

    Ok(())
}

/// Filter incoming tiles, staging kept ones for downlink.
fn run_filter(args: &FilterArgs, global: &GlobalArgs, config: &Config) -> Result<()> {
    let artifact = match &args.calibration {
        Some(path) => Some(calibrate::OperatingPoint::load(path)?),
        None => None,
    };

    let threshold = args
        .threshold
        .or(artifact.as_ref().map(|a| a.threshold))
        .unwrap_or(DEFAULT_FILTER_THRESHOLD);
    let temperature = args
        .scorer
        .temperature
        .or(artifact.as_ref().map(|a| a.temperature))
        .unwrap_or(config.defaults.temperature);

    let tiles = tiles::collect_tiles(&args.data)?;
    if tiles.is_empty() {
        warn!("No tiles found under {}", args.data.display());
    }
    info!(
        "Filtering {} tile(s) at threshold {:.6}",
        tiles.len(),
        threshold
    );

    let mut scorer = build_scorer(&args.scorer, global, config, temperature)?;
    filter::run_filter(
        &mut scorer,
        &tiles,
        &filter::FilterOptions {
            threshold,
            temperature,
            downlink_dir: args.downlink_out.clone(),
            log: args.log.clone(),
            progress_enabled: !global.quiet,
        },
    )?;

    Ok(())
}

/// Reconcile logs and calibration into a metrics report.
fn run_summarize(args: &SummarizeArgs) -> Result<()> {
    let report = summarize::run_summarize(&summarize::SummarizeOptions {
        val_log: args.val_log.clone(),
        downlink_log: args.downlink_log.clone(),
        calibration: args.calibration.clone(),
        out_dir: args.out_dir.clone(),
        val_dir: args.val_dir.clone(),
    })?;

    info!(
        "tiles_total {} tiles_kept {} bandwidth_saved {:.1}%",
        report.tiles_total, report.tiles_kept, report.bandwidth_saved_pct
    );
    Ok(())
}

/// Resolve the model path and build the tile scorer.
fn build_scorer(
    scorer_args: &ScorerArgs,
    global: &GlobalArgs,
    config: &Config,
    temperature: f64,
) -> Result<TileScorer> {
    let model = resolve_model(scorer_args, config)?;
    let tile_size = scorer_args.size.unwrap_or(config.defaults.tile_size);
    let device = resolve_device(global, config);

    info!("Loading model: {}", model.display());
    TileScorer::from_model(
        &model,
        ScorerOptions {
            tile_size,
            temperature,
            device,
        },
    )
}

fn resolve_model(scorer_args: &ScorerArgs, config: &Config) -> Result<PathBuf> {
    scorer_args
        .model
        .clone()
        .or_else(|| config.defaults.model.clone())
        .ok_or_else(|| Error::ConfigValidation {
            message: "no model specified (use -m or set defaults.model in config)".to_string(),
        })
}

fn resolve_device(global: &GlobalArgs, config: &Config) -> InferenceDevice {
    if global.gpu {
        InferenceDevice::Gpu
    } else if global.cpu {
        InferenceDevice::Cpu
    } else {
        config.inference.device
    }
}

fn init_logging(verbose: u8, quiet: bool) {
    use tracing_subscriber::{EnvFilter, fmt};

    // Build filter string based on verbosity level.
    // ORT logging is suppressed by default because CPU fallback is expected
    // in auto mode. Use -v to see ORT warnings, -vv for info, -vvv for full
    // trace.
    let filter_str = if quiet {
        "warn,ort=off".to_string()
    } else {
        match verbose {
            0 => "info,ort=off".to_string(),
            1 => "debug,ort=warn".to_string(),
            2 => "trace,ort=info".to_string(),
            _ => "trace".to_string(), // -vvv: no ORT filter, full trace
        }
    };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&filter_str));

    fmt().with_env_filter(filter).init();
}

fn handle_config_command(action: cli::ConfigAction) -> Result<()> {
    use cli::ConfigAction;

    match action {
        ConfigAction::Init => {
            let path = config_file_path()?;
            if path.exists() {
                println!("Configuration file already exists: {}", path.display());
            } else {
                let config = Config::default();
                let saved_path = save_default_config(&config)?;
                println!("Created configuration file: {}", saved_path.display());
                println!("\nNext steps:");
                println!("  set defaults.model to your ONNX model path");
            }
            Ok(())
        }
        ConfigAction::Show => {
            let config = load_default_config()?;
            println!("{config:#?}");
            Ok(())
        }
        ConfigAction::Path => {
            let path = config_file_path()?;
            println!("{}", path.display());
            Ok(())
        }
    }
}
