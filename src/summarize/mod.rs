//! Assurance summarization.
//!
//! Reconciles the calibration artifact with the independently produced
//! validation and downlink logs into one auditable metrics report. Every
//! run is a pure reduction over its three inputs; nothing is carried
//! across invocations.

mod keep;
mod report;

pub use keep::{KeepSignal, record_is_kept};
pub use report::{MetricsReport, harmonic_f1, write_report};

use crate::calibrate::OperatingPoint;
use crate::error::{Error, Result};
use crate::tiles;
use serde::Deserialize;
use std::io::BufRead;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// A decision record as read back from either log.
///
/// Superset view over both emitters' schemas: every field is optional and
/// unknown fields are ignored, so the two logs (and logs from older
/// tooling) parse through one type.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LogRecord {
    /// Explicit keep flag, when the emitter wrote one.
    #[serde(default)]
    pub kept: Option<bool>,
    /// Enumerated decision string, when the emitter wrote one.
    #[serde(default)]
    pub decision: Option<String>,
    /// Event probability.
    #[serde(default)]
    pub prob_event: Option<f64>,
    /// Legacy name for the event probability.
    #[serde(default)]
    pub prob: Option<f64>,
    /// Keep threshold recorded with the decision.
    #[serde(default)]
    pub threshold: Option<f64>,
    /// Inference latency in milliseconds.
    #[serde(default)]
    pub latency_ms: Option<f64>,
    /// Path of the scored tile.
    #[serde(default)]
    pub file: Option<String>,
}

/// Options for an assurance summarization run.
#[derive(Debug, Clone)]
pub struct SummarizeOptions {
    /// Validation log path.
    pub val_log: PathBuf,
    /// Downlink log path.
    pub downlink_log: PathBuf,
    /// Calibration artifact path.
    pub calibration: PathBuf,
    /// Directory for `metrics.json` and `summary.md`.
    pub out_dir: PathBuf,
    /// Validation split root; when given, its tile count is checked
    /// against the validation log.
    pub val_dir: Option<PathBuf>,
}

/// Read a line-delimited JSON decision log.
///
/// Blank lines are skipped; any unparseable line aborts the run. A
/// silently skipped record would bias every aggregate below, so the
/// failure is loud and carries the line number.
pub fn read_jsonl(path: &Path) -> Result<Vec<LogRecord>> {
    let file = std::fs::File::open(path).map_err(|e| Error::LogOpen {
        path: path.to_path_buf(),
        source: e,
    })?;

    let mut records = Vec::new();
    for (idx, line) in std::io::BufReader::new(file).lines().enumerate() {
        let line = line.map_err(|e| Error::LogOpen {
            path: path.to_path_buf(),
            source: e,
        })?;
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        let record = serde_json::from_str(trimmed).map_err(|e| Error::MalformedRecord {
            path: path.to_path_buf(),
            line: idx + 1,
            source: e,
        })?;
        records.push(record);
    }

    Ok(records)
}

/// Reduce the three inputs to a metrics report.
///
/// The tile population comes from the validation log; the keep count
/// from the downlink log, resolved per the keep-signal precedence with
/// the artifact threshold as the score fallback. Total over all inputs:
/// degenerate populations produce defined values, never errors.
pub fn summarize(
    val: &[LogRecord],
    downlink: &[LogRecord],
    artifact: &OperatingPoint,
) -> MetricsReport {
    let tiles_total = val.len();
    let tiles_kept = downlink
        .iter()
        .filter(|r| record_is_kept(r, Some(artifact.threshold)))
        .count();

    #[allow(clippy::cast_precision_loss)]
    let saved = 100.0 * (1.0 - tiles_kept as f64 / tiles_total.max(1) as f64);
    let bandwidth_saved_pct = (saved * 10.0).round() / 10.0;

    #[allow(clippy::cast_precision_loss)]
    let avg_latency_ms = if val.is_empty() {
        0.0
    } else {
        val.iter().map(|r| r.latency_ms.unwrap_or(0.0)).sum::<f64>() / val.len() as f64
    };

    MetricsReport {
        threshold: artifact.threshold,
        target_recall: artifact.target_recall,
        achieved_recall: artifact.achieved_recall,
        precision: artifact.precision_at_threshold,
        f1: harmonic_f1(artifact.precision_at_threshold, artifact.achieved_recall),
        auc_roc: artifact.auc_roc,
        avg_latency_ms,
        tiles_total,
        tiles_kept,
        bandwidth_saved_pct,
    }
}

/// Run a full summarization: read inputs, reduce, write both report
/// files.
pub fn run_summarize(options: &SummarizeOptions) -> Result<MetricsReport> {
    let val = read_jsonl(&options.val_log)?;
    let downlink = read_jsonl(&options.downlink_log)?;
    let artifact = OperatingPoint::load(&options.calibration)?;

    if artifact.recall_fallback {
        warn!(
            "calibration artifact is a fallback operating point (achieved recall {} < target {})",
            artifact.achieved_recall, artifact.target_recall
        );
    }

    if let Some(val_dir) = &options.val_dir {
        let on_disk = tiles::collect_labeled_tiles(val_dir)?.len();
        if on_disk != val.len() {
            warn!(
                "population mismatch: validation log has {} record(s) but {} tile(s) exist under {}",
                val.len(),
                on_disk,
                val_dir.display()
            );
        }
    }

    let report = summarize(&val, &downlink, &artifact);
    let (metrics_path, summary_path) = write_report(&report, &options.out_dir)?;
    info!(
        "wrote {} and {}",
        metrics_path.display(),
        summary_path.display()
    );

    Ok(report)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::float_cmp)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn artifact() -> OperatingPoint {
        OperatingPoint {
            threshold: 0.8,
            target_recall: 0.95,
            achieved_recall: 0.97,
            precision_at_threshold: 0.85,
            auc_roc: Some(0.91),
            temperature: 1.0,
            val_samples: 100,
            duration_s: 2.0,
            recall_fallback: false,
        }
    }

    fn val_record(latency_ms: f64) -> LogRecord {
        LogRecord {
            latency_ms: Some(latency_ms),
            ..LogRecord::default()
        }
    }

    fn kept_record(kept: bool) -> LogRecord {
        LogRecord {
            kept: Some(kept),
            ..LogRecord::default()
        }
    }

    #[test]
    fn test_end_to_end_scenario() {
        // 100 validation records at 12.5 ms, 40 downlink records all kept.
        let val: Vec<LogRecord> = (0..100).map(|_| val_record(12.5)).collect();
        let downlink: Vec<LogRecord> = (0..40).map(|_| kept_record(true)).collect();

        let report = summarize(&val, &downlink, &artifact());
        assert_eq!(report.tiles_total, 100);
        assert_eq!(report.tiles_kept, 40);
        assert_eq!(report.bandwidth_saved_pct, 60.0);
        assert_eq!(report.avg_latency_ms, 12.5);
        assert_eq!(report.f1, 2.0 * 0.85 * 0.97 / (0.85 + 0.97));
        assert_eq!(report.threshold, 0.8);
        assert_eq!(report.auc_roc, Some(0.91));
    }

    #[test]
    fn test_empty_population_saves_everything() {
        let report = summarize(&[], &[], &artifact());
        assert_eq!(report.tiles_total, 0);
        assert_eq!(report.tiles_kept, 0);
        assert_eq!(report.bandwidth_saved_pct, 100.0);
        assert_eq!(report.avg_latency_ms, 0.0);
    }

    #[test]
    fn test_f1_zero_guard_flows_through() {
        let mut art = artifact();
        art.precision_at_threshold = 0.0;
        art.achieved_recall = 0.0;
        let report = summarize(&[], &[], &art);
        assert_eq!(report.f1, 0.0);
    }

    #[test]
    fn test_downlink_kept_resolved_with_artifact_threshold() {
        // Records carrying only a score use the artifact threshold (0.8).
        let downlink = vec![
            LogRecord {
                prob_event: Some(0.85),
                ..LogRecord::default()
            },
            LogRecord {
                prob_event: Some(0.75),
                ..LogRecord::default()
            },
        ];
        let report = summarize(&[val_record(1.0)], &downlink, &artifact());
        assert_eq!(report.tiles_kept, 1);
    }

    #[test]
    fn test_missing_latency_counts_as_zero() {
        let val = vec![val_record(10.0), LogRecord::default()];
        let report = summarize(&val, &[], &artifact());
        assert_eq!(report.avg_latency_ms, 5.0);
    }

    #[test]
    fn test_bandwidth_rounded_to_one_decimal() {
        let val: Vec<LogRecord> = (0..3).map(|_| val_record(1.0)).collect();
        let downlink = vec![kept_record(true)];
        let report = summarize(&val, &downlink, &artifact());
        // 100 * (1 - 1/3) = 66.666... -> 66.7
        assert_eq!(report.bandwidth_saved_pct, 66.7);
    }

    #[test]
    fn test_read_jsonl_skips_blank_lines() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, r#"{{"kept": true}}"#).unwrap();
        writeln!(file).unwrap();
        writeln!(file, r#"  {{"kept": false}}  "#).unwrap();
        file.flush().unwrap();

        let records = read_jsonl(file.path()).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].kept, Some(true));
        assert_eq!(records[1].kept, Some(false));
    }

    #[test]
    fn test_read_jsonl_tolerates_unknown_fields() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"{{"kept": true, "model_sha256": "abc", "timestamp": "2026-08-07T00:00:00Z"}}"#
        )
        .unwrap();
        file.flush().unwrap();

        let records = read_jsonl(file.path()).unwrap();
        assert_eq!(records[0].kept, Some(true));
    }

    #[test]
    fn test_read_jsonl_malformed_line_is_fatal_with_line_number() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, r#"{{"kept": true}}"#).unwrap();
        writeln!(file, "not json").unwrap();
        file.flush().unwrap();

        let err = read_jsonl(file.path()).unwrap_err();
        match err {
            Error::MalformedRecord { line, .. } => assert_eq!(line, 2),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_read_jsonl_missing_file() {
        let err = read_jsonl(Path::new("/nonexistent/val.jsonl")).unwrap_err();
        assert!(matches!(err, Error::LogOpen { .. }));
    }
}
