//! The metrics report and its two output renderings.

use crate::constants::filenames;
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Aggregate metrics reconciling one calibration artifact with the
/// validation and downlink logs.
///
/// Field order is the serialization order; reruns over identical inputs
/// produce byte-identical JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricsReport {
    /// Keep threshold from the calibration artifact.
    pub threshold: f64,
    /// Recall target from the calibration artifact.
    pub target_recall: f64,
    /// Recall achieved at the threshold on the validation set.
    pub achieved_recall: f64,
    /// Precision at the threshold on the validation set.
    pub precision: f64,
    /// Harmonic mean of precision and achieved recall; 0.0 when either
    /// is zero.
    pub f1: f64,
    /// AUC-ROC from the calibration artifact; `None` when undefined.
    pub auc_roc: Option<f64>,
    /// Mean validation-log latency in milliseconds; 0.0 for an empty log.
    pub avg_latency_ms: f64,
    /// Validation-log record count: the tile population size.
    pub tiles_total: usize,
    /// Downlink-log records that resolved as kept.
    pub tiles_kept: usize,
    /// `100 * (1 - kept/total)`, rounded to one decimal. An empty
    /// validation population yields 100.0 by policy ("nothing to send"),
    /// never a division error.
    pub bandwidth_saved_pct: f64,
}

impl MetricsReport {
    /// Render the flat human-readable listing.
    pub fn to_summary_markdown(&self) -> String {
        let mut out = String::from("# Run summary\n\n");
        push_line(&mut out, "threshold", format_float(self.threshold));
        push_line(&mut out, "target_recall", format_float(self.target_recall));
        push_line(
            &mut out,
            "achieved_recall",
            format_float(self.achieved_recall),
        );
        push_line(&mut out, "precision", format_float(self.precision));
        push_line(&mut out, "f1", format_float(self.f1));
        push_line(
            &mut out,
            "auc_roc",
            self.auc_roc.map_or_else(|| "n/a".to_string(), format_float),
        );
        push_line(&mut out, "avg_latency_ms", format_float(self.avg_latency_ms));
        push_line(&mut out, "tiles_total", self.tiles_total.to_string());
        push_line(&mut out, "tiles_kept", self.tiles_kept.to_string());
        push_line(
            &mut out,
            "bandwidth_saved_pct",
            format_float(self.bandwidth_saved_pct),
        );
        out
    }
}

fn push_line(out: &mut String, key: &str, value: String) {
    out.push_str("- **");
    out.push_str(key);
    out.push_str("**: ");
    out.push_str(&value);
    out.push('\n');
}

fn format_float(value: f64) -> String {
    // `Display` drops a trailing ".0"; keep it so integral metrics still
    // read as floats in the listing.
    if value.fract() == 0.0 && value.is_finite() {
        format!("{value:.1}")
    } else {
        format!("{value}")
    }
}

/// Harmonic mean of precision and recall with an explicit zero guard.
pub fn harmonic_f1(precision: f64, recall: f64) -> f64 {
    if precision > 0.0 && recall > 0.0 && (precision + recall) > 0.0 {
        2.0 * precision * recall / (precision + recall)
    } else {
        0.0
    }
}

/// Write `metrics.json` and `summary.md` under `out_dir`.
///
/// Both renderings are produced in memory before the first file is
/// created, so a failed run leaves no partial report behind.
pub fn write_report(report: &MetricsReport, out_dir: &Path) -> Result<(PathBuf, PathBuf)> {
    let mut json =
        serde_json::to_string_pretty(report).map_err(|e| Error::ReportSerialize { source: e })?;
    json.push('\n');
    let markdown = report.to_summary_markdown();

    std::fs::create_dir_all(out_dir).map_err(|e| Error::OutputDirCreate {
        path: out_dir.to_path_buf(),
        source: e,
    })?;

    let metrics_path = out_dir.join(filenames::METRICS);
    std::fs::write(&metrics_path, json).map_err(|e| Error::ReportWrite {
        path: metrics_path.clone(),
        source: e,
    })?;

    let summary_path = out_dir.join(filenames::SUMMARY);
    std::fs::write(&summary_path, markdown).map_err(|e| Error::ReportWrite {
        path: summary_path.clone(),
        source: e,
    })?;

    Ok((metrics_path, summary_path))
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::float_cmp)]
mod tests {
    use super::*;

    fn report() -> MetricsReport {
        MetricsReport {
            threshold: 0.8,
            target_recall: 0.95,
            achieved_recall: 0.97,
            precision: 0.85,
            f1: harmonic_f1(0.85, 0.97),
            auc_roc: Some(0.91),
            avg_latency_ms: 12.5,
            tiles_total: 100,
            tiles_kept: 40,
            bandwidth_saved_pct: 60.0,
        }
    }

    #[test]
    fn test_harmonic_f1_known_value() {
        let f1 = harmonic_f1(0.85, 0.97);
        assert!((f1 - 2.0 * 0.85 * 0.97 / (0.85 + 0.97)).abs() < 1e-12);
    }

    #[test]
    fn test_harmonic_f1_zero_guard() {
        assert_eq!(harmonic_f1(0.0, 0.0), 0.0);
        assert_eq!(harmonic_f1(0.0, 0.9), 0.0);
        assert_eq!(harmonic_f1(0.9, 0.0), 0.0);
    }

    #[test]
    fn test_json_key_order_is_stable() {
        let json = serde_json::to_string_pretty(&report()).unwrap();
        let threshold_at = json.find("\"threshold\"").unwrap();
        let f1_at = json.find("\"f1\"").unwrap();
        let saved_at = json.find("\"bandwidth_saved_pct\"").unwrap();
        assert!(threshold_at < f1_at && f1_at < saved_at);
    }

    #[test]
    fn test_summary_markdown_lists_every_metric() {
        let md = report().to_summary_markdown();
        assert!(md.starts_with("# Run summary\n"));
        assert!(md.contains("- **threshold**: 0.8\n"));
        assert!(md.contains("- **tiles_total**: 100\n"));
        assert!(md.contains("- **bandwidth_saved_pct**: 60.0\n"));
        assert!(md.contains("- **auc_roc**: 0.91\n"));
    }

    #[test]
    fn test_summary_markdown_degenerate_auc() {
        let mut r = report();
        r.auc_roc = None;
        assert!(r.to_summary_markdown().contains("- **auc_roc**: n/a\n"));
    }

    #[test]
    fn test_write_report_emits_both_files() {
        let dir = tempfile::tempdir().unwrap();
        let out_dir = dir.path().join("reports");

        let (metrics_path, summary_path) = write_report(&report(), &out_dir).unwrap();
        let json = std::fs::read_to_string(&metrics_path).unwrap();
        let parsed: MetricsReport = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, report());
        assert!(
            std::fs::read_to_string(&summary_path)
                .unwrap()
                .contains("tiles_kept")
        );
    }

    #[test]
    fn test_write_report_is_deterministic() {
        let dir = tempfile::tempdir().unwrap();
        let out_a = dir.path().join("a");
        let out_b = dir.path().join("b");

        let (path_a, _) = write_report(&report(), &out_a).unwrap();
        let (path_b, _) = write_report(&report(), &out_b).unwrap();
        assert_eq!(
            std::fs::read(&path_a).unwrap(),
            std::fs::read(&path_b).unwrap()
        );
    }
}
