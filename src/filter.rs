//! Deployment-time bandwidth filtering.
//!
//! Scores every incoming tile, keeps those passing the gate, stages kept
//! tiles into the downlink directory, and optionally writes the downlink
//! decision log. The downlink directory is recreated on each run: it is
//! a staging area, not an archive.

use crate::error::{Error, Result};
use crate::gate;
use crate::progress;
use crate::scorer::TileScorer;
use crate::telemetry::{DownlinkRecord, JsonlWriter};
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::info;

/// Options for a bandwidth filter run.
#[derive(Debug, Clone)]
pub struct FilterOptions {
    /// Keep threshold on the event probability.
    pub threshold: f64,
    /// Temperature divisor recorded in the downlink log.
    pub temperature: f64,
    /// Directory where kept tiles are staged.
    pub downlink_dir: PathBuf,
    /// Optional downlink decision log path.
    pub log: Option<PathBuf>,
    /// Whether to render a progress bar.
    pub progress_enabled: bool,
}

/// Aggregate outcome of a filter run.
#[derive(Debug, Clone, Copy)]
pub struct FilterSummary {
    /// Tiles scored.
    pub tiles: usize,
    /// Tiles kept for downlink.
    pub kept: usize,
    /// Total bytes across all scored tiles.
    pub bytes_total: u64,
    /// Bytes staged for downlink.
    pub bytes_sent: u64,
    /// Wall-clock seconds for the whole run.
    pub elapsed_s: f64,
}

impl FilterSummary {
    /// Fraction of bandwidth saved, in percent of total tile bytes.
    pub fn saved_pct(&self) -> f64 {
        if self.bytes_total == 0 {
            return 0.0;
        }
        #[allow(clippy::cast_precision_loss)]
        let saved = 1.0 - self.bytes_sent as f64 / self.bytes_total as f64;
        saved * 100.0
    }
}

/// Run the bandwidth filter over a set of tiles.
pub fn run_filter(
    scorer: &mut TileScorer,
    tiles: &[PathBuf],
    options: &FilterOptions,
) -> Result<FilterSummary> {
    let start = Instant::now();

    recreate_downlink_dir(&options.downlink_dir)?;
    let mut writer = match &options.log {
        Some(path) => Some(JsonlWriter::create(path)?),
        None => None,
    };

    let pb = progress::create_tile_progress(tiles.len(), options.progress_enabled);
    let mut kept = 0usize;
    let mut bytes_total = 0u64;
    let mut bytes_sent = 0u64;

    for path in tiles {
        let size = std::fs::metadata(path)?.len();
        bytes_total += size;

        let score = scorer.score_tile(path)?;
        let keep = gate::decide(score.prob_event, options.threshold);
        if keep {
            kept += 1;
            bytes_sent += size;
            stage_tile(path, &options.downlink_dir)?;
        }

        if let Some(writer) = writer.as_mut() {
            writer.write_record(&DownlinkRecord {
                file: path.display().to_string(),
                model_sha256: scorer.model_sha256().to_string(),
                size,
                prob_event: score.prob_event,
                pred_class: score.pred_class,
                kept: keep,
                latency_ms: score.latency_ms,
                threshold: options.threshold,
                temperature: options.temperature,
            })?;
        }
        progress::inc_progress(pb.as_ref());
    }

    progress::finish_progress(pb, "Filter complete");
    if let Some(writer) = writer {
        writer.finish()?;
    }

    let summary = FilterSummary {
        tiles: tiles.len(),
        kept,
        bytes_total,
        bytes_sent,
        elapsed_s: start.elapsed().as_secs_f64(),
    };
    info!(
        "tiles {} kept {} saved_bandwidth {:.1}% elapsed_s {:.2}",
        summary.tiles,
        summary.kept,
        summary.saved_pct(),
        summary.elapsed_s
    );
    Ok(summary)
}

fn recreate_downlink_dir(dir: &Path) -> Result<()> {
    if dir.exists() {
        std::fs::remove_dir_all(dir).map_err(|e| Error::OutputDirCreate {
            path: dir.to_path_buf(),
            source: e,
        })?;
    }
    std::fs::create_dir_all(dir).map_err(|e| Error::OutputDirCreate {
        path: dir.to_path_buf(),
        source: e,
    })
}

fn stage_tile(path: &Path, downlink_dir: &Path) -> Result<()> {
    let name = path.file_name().ok_or_else(|| Error::DownlinkCopy {
        path: path.to_path_buf(),
        source: std::io::Error::new(std::io::ErrorKind::InvalidInput, "tile has no file name"),
    })?;
    std::fs::copy(path, downlink_dir.join(name)).map_err(|e| Error::DownlinkCopy {
        path: path.to_path_buf(),
        source: e,
    })?;
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::float_cmp)]
mod tests {
    use super::*;

    #[test]
    fn test_saved_pct_empty_run() {
        let summary = FilterSummary {
            tiles: 0,
            kept: 0,
            bytes_total: 0,
            bytes_sent: 0,
            elapsed_s: 0.0,
        };
        assert_eq!(summary.saved_pct(), 0.0);
    }

    #[test]
    fn test_saved_pct_partial_keep() {
        let summary = FilterSummary {
            tiles: 4,
            kept: 1,
            bytes_total: 1000,
            bytes_sent: 250,
            elapsed_s: 0.1,
        };
        assert_eq!(summary.saved_pct(), 75.0);
    }

    #[test]
    fn test_recreate_downlink_dir_clears_stale_content() {
        let dir = tempfile::tempdir().unwrap();
        let downlink = dir.path().join("downlink");
        std::fs::create_dir_all(&downlink).unwrap();
        std::fs::write(downlink.join("stale.png"), b"old").unwrap();

        recreate_downlink_dir(&downlink).unwrap();
        assert!(downlink.exists());
        assert_eq!(std::fs::read_dir(&downlink).unwrap().count(), 0);
    }
}
