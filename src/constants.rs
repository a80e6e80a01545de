//! Application-wide constants.
//!
//! All magic numbers and strings are defined here to ensure consistency
//! and make changes easy to track.

/// Application name used for config directories and user-facing messages.
pub const APP_NAME: &str = "tilegate";

/// Default recall target for threshold calibration.
pub const DEFAULT_TARGET_RECALL: f64 = 0.95;

/// Default temperature divisor applied to logits before softmax.
pub const DEFAULT_TEMPERATURE: f64 = 1.0;

/// Default tile edge length in pixels (tiles are square).
pub const DEFAULT_TILE_SIZE: u32 = 64;

/// Default keep threshold for validation telemetry runs without a
/// calibration artifact.
pub const DEFAULT_TELEMETRY_THRESHOLD: f64 = 0.6;

/// Default keep threshold for deployment filtering without a calibration
/// artifact.
pub const DEFAULT_FILTER_THRESHOLD: f64 = 0.9;

/// Class subdirectory names of a labeled tile split, in class-index order.
///
/// Index 0 is the background (drop) class, index 1 the event (keep) class.
pub const CLASS_DIRS: [&str; 2] = ["background", "event"];

/// Tile image file extension.
pub const TILE_EXTENSION: &str = "png";

/// Input tensor name assumed when the model does not report one.
pub const DEFAULT_INPUT_NAME: &str = "input";

/// Chunk size for streaming file hashing.
pub const HASH_CHUNK_SIZE: usize = 8192;

/// Decision strings that resolve to "kept" (matched case-insensitively).
pub const KEEP_DECISION_STRINGS: &[&str] = &["keep", "kept", "true", "1"];

/// Default file and directory names.
pub mod filenames {
    /// Calibration artifact written by `calibrate`.
    pub const CALIBRATION: &str = "calibration.json";
    /// Validation telemetry log written by `telemetry`.
    pub const VAL_LOG: &str = "logs/val.jsonl";
    /// Downlink staging directory populated by `filter`.
    pub const DOWNLINK_DIR: &str = "downlink";
    /// Structured metrics report written by `summarize`.
    pub const METRICS: &str = "metrics.json";
    /// Human-readable report written by `summarize`.
    pub const SUMMARY: &str = "summary.md";
}

/// Probability value bounds.
pub mod probability {
    /// Minimum valid probability value.
    pub const MIN: f64 = 0.0;
    /// Maximum valid probability value.
    pub const MAX: f64 = 1.0;
}
