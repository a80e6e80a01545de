//! Validation-time decision logging.
//!
//! Scores every tile of a labeled validation split and writes one
//! [`ValRecord`] per tile. The keep flag in each record comes from the
//! same [`crate::gate::decide`] the deployment filter uses, so the
//! validation log is an honest preview of deployment behavior at the
//! calibrated operating point.

mod record;
mod writer;

pub use record::{DownlinkRecord, ValRecord};
pub use writer::JsonlWriter;

use crate::error::Result;
use crate::gate;
use crate::progress;
use crate::scorer::TileScorer;
use crate::tiles::TileClass;
use chrono::Utc;
use std::path::{Path, PathBuf};
use tracing::info;

/// Options for a validation telemetry run.
#[derive(Debug, Clone)]
pub struct TelemetryOptions {
    /// Keep threshold to log decisions against.
    pub threshold: f64,
    /// Output log path.
    pub out: PathBuf,
    /// Whether to render a progress bar.
    pub progress_enabled: bool,
}

/// Score a labeled validation split and write the validation log.
///
/// Returns the number of records written. An empty tile set produces an
/// empty log and a warning rather than an error; only calibration
/// requires a non-empty split.
pub fn write_validation_log(
    scorer: &mut TileScorer,
    tiles: &[(PathBuf, TileClass)],
    options: &TelemetryOptions,
) -> Result<usize> {
    let mut writer = JsonlWriter::create(&options.out)?;
    let pb = progress::create_tile_progress(tiles.len(), options.progress_enabled);

    for (path, class) in tiles {
        let record = score_to_record(scorer, path, *class, options.threshold)?;
        writer.write_record(&record)?;
        progress::inc_progress(pb.as_ref());
    }

    progress::finish_progress(pb, "Telemetry complete");
    writer.finish()?;

    info!(
        "Wrote {} validation record(s) to {}",
        tiles.len(),
        options.out.display()
    );
    Ok(tiles.len())
}

fn score_to_record(
    scorer: &mut TileScorer,
    path: &Path,
    class: TileClass,
    threshold: f64,
) -> Result<ValRecord> {
    let score = scorer.score_tile(path)?;
    Ok(ValRecord {
        timestamp: Utc::now(),
        file: path.display().to_string(),
        true_class: class.index(),
        pred_class: score.pred_class,
        max_prob: score.max_prob,
        prob_event: score.prob_event,
        threshold,
        ok_flag: gate::decide(score.prob_event, threshold),
        latency_ms: score.latency_ms,
        model_sha256: scorer.model_sha256().to_string(),
    })
}
