//! Threshold calibration.
//!
//! Converts a validation score distribution into a deployment operating
//! point meeting a recall target. The chosen threshold is the largest
//! distinct score whose recall still reaches the target, which keeps
//! precision (and therefore bandwidth savings) as high as the recall
//! contract allows. When no threshold reaches the target, calibration
//! falls back to the point of maximal achievable recall and flags the
//! artifact so the shortfall is never silent.

mod curve;

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

pub(crate) use curve::{precision_recall_curve, roc_auc};

/// One scored validation tile.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoreSample {
    /// Event probability in `[0, 1]` produced by the scorer.
    pub score: f64,
    /// Ground truth: `true` for an event tile.
    pub true_label: bool,
}

/// Calibration parameters.
#[derive(Debug, Clone, Copy)]
pub struct CalibrationOptions {
    /// Minimum fraction of event tiles that must be kept, in `(0, 1]`.
    pub target_recall: f64,
    /// Temperature divisor that was applied to logits when producing the
    /// samples. Recorded in the artifact; calibration itself never
    /// rescales scores.
    pub temperature: f64,
}

impl Default for CalibrationOptions {
    fn default() -> Self {
        Self {
            target_recall: crate::constants::DEFAULT_TARGET_RECALL,
            temperature: crate::constants::DEFAULT_TEMPERATURE,
        }
    }
}

/// The calibration artifact: a deployment operating point and the
/// statistics measured at it.
///
/// Produced once per calibration run and immutable afterwards; every
/// downstream consumer (telemetry logger, bandwidth filter, summarizer)
/// only reads it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OperatingPoint {
    /// Keep threshold on the event probability.
    pub threshold: f64,
    /// The recall target calibration was asked for.
    pub target_recall: f64,
    /// Recall measured at `threshold` on the validation set.
    pub achieved_recall: f64,
    /// Precision measured at `threshold` on the validation set.
    pub precision_at_threshold: f64,
    /// AUC-ROC over the validation set; `None` when the label set is
    /// degenerate (single class).
    pub auc_roc: Option<f64>,
    /// Temperature divisor applied to logits upstream of the softmax.
    pub temperature: f64,
    /// Number of validation samples calibrated over.
    pub val_samples: usize,
    /// Wall-clock seconds spent scoring the validation set.
    pub duration_s: f64,
    /// `true` when no threshold met `target_recall` and the operating
    /// point is the best-achievable-recall fallback. Absent in artifacts
    /// from older tooling, which never recorded fallbacks.
    #[serde(default)]
    pub recall_fallback: bool,
}

impl OperatingPoint {
    /// Load an operating point from a JSON artifact file.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| Error::ArtifactRead {
            path: path.to_path_buf(),
            source: e,
        })?;
        serde_json::from_str(&contents).map_err(|e| Error::ArtifactParse {
            path: path.to_path_buf(),
            source: e,
        })
    }

    /// Persist the operating point as a JSON artifact file.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent).map_err(|e| Error::OutputDirCreate {
                path: parent.to_path_buf(),
                source: e,
            })?;
        }

        let mut contents =
            serde_json::to_string_pretty(self).map_err(|e| Error::ArtifactSerialize { source: e })?;
        contents.push('\n');
        std::fs::write(path, contents).map_err(|e| Error::ArtifactWrite {
            path: path.to_path_buf(),
            source: e,
        })
    }
}

/// Calibrate an operating point from scored validation samples.
///
/// Scans the precision-recall curve in descending threshold order and
/// selects the first (largest-threshold) point whose recall reaches the
/// target. If none qualifies, selects the first point achieving the
/// maximal recall on the curve and sets `recall_fallback`.
///
/// `duration_s` is left at zero; the caller that scored the samples fills
/// in the measured wall-clock before persisting.
///
/// # Errors
///
/// Returns [`Error::EmptyCalibrationSet`] when `samples` is empty: there
/// is no implicit zero threshold.
pub fn calibrate(samples: &[ScoreSample], options: &CalibrationOptions) -> Result<OperatingPoint> {
    if samples.is_empty() {
        return Err(Error::EmptyCalibrationSet);
    }

    let curve = precision_recall_curve(samples);
    let nominal = curve.iter().find(|p| p.recall >= options.target_recall);
    let (point, recall_fallback) = match nominal {
        Some(p) => (p, false),
        None => {
            let max_recall = curve.iter().map(|p| p.recall).fold(0.0, f64::max);
            let p = curve
                .iter()
                .find(|p| p.recall >= max_recall)
                .unwrap_or(&curve[0]);
            (p, true)
        }
    };

    Ok(OperatingPoint {
        threshold: point.threshold,
        target_recall: options.target_recall,
        achieved_recall: point.recall,
        precision_at_threshold: point.precision,
        auc_roc: roc_auc(samples),
        temperature: options.temperature,
        val_samples: samples.len(),
        duration_s: 0.0,
        recall_fallback,
    })
}
