//! Decision record types.
//!
//! One record per scored tile, line-delimited JSON. The validation-time
//! and deployment-time emitters share the gate and the score fields but
//! carry emitter-specific extras; the summarizer reads both through a
//! tolerant superset view (see `summarize::LogRecord`).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A validation-time decision record, one per validation tile.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValRecord {
    /// When the tile was scored.
    pub timestamp: DateTime<Utc>,
    /// Path of the scored tile.
    pub file: String,
    /// Ground-truth class index: 0 background, 1 event.
    pub true_class: u8,
    /// Predicted class index.
    pub pred_class: u8,
    /// The larger of the two class probabilities.
    pub max_prob: f64,
    /// Event probability the gate decided on.
    pub prob_event: f64,
    /// Keep threshold in force for this run.
    pub threshold: f64,
    /// Gate outcome: `prob_event >= threshold`.
    pub ok_flag: bool,
    /// Inference latency in milliseconds.
    pub latency_ms: f64,
    /// SHA-256 of the model file that produced the score.
    pub model_sha256: String,
}

/// A deployment-time decision record, one per tile seen by the filter.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DownlinkRecord {
    /// Path of the scored tile.
    pub file: String,
    /// SHA-256 of the model file that produced the score.
    pub model_sha256: String,
    /// Tile size in bytes (the bandwidth at stake).
    pub size: u64,
    /// Event probability the gate decided on.
    pub prob_event: f64,
    /// Predicted class index.
    pub pred_class: u8,
    /// Gate outcome: `true` when the tile was staged for downlink.
    pub kept: bool,
    /// Inference latency in milliseconds.
    pub latency_ms: f64,
    /// Keep threshold in force for this run.
    pub threshold: f64,
    /// Temperature divisor in force for this run.
    pub temperature: f64,
}
