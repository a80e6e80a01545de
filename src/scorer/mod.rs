//! ONNX tile scoring.
//!
//! Wraps an ONNX Runtime session behind the two-class contract the rest
//! of the pipeline relies on: tile in, background/event probabilities
//! out. Temperature scaling is applied here, to logits before the
//! softmax, so every downstream consumer sees calibrated probabilities.

mod onnx;
mod preprocess;

pub use onnx::{ScorerOptions, TileScorer};
pub(crate) use preprocess::tile_to_tensor;

/// The scorer's verdict on one tile.
#[derive(Debug, Clone, Copy)]
pub struct TileScore {
    /// Probability of the background (drop) class.
    pub prob_background: f64,
    /// Probability of the event (keep) class.
    pub prob_event: f64,
    /// Argmax class index: 0 background, 1 event.
    pub pred_class: u8,
    /// The larger of the two probabilities.
    pub max_prob: f64,
    /// Wall-clock milliseconds spent in the inference call.
    pub latency_ms: f64,
}

/// Numerically stable two-class softmax.
pub(crate) fn softmax2(logits: [f32; 2]) -> [f64; 2] {
    let max = logits[0].max(logits[1]);
    let e0 = f64::from(logits[0] - max).exp();
    let e1 = f64::from(logits[1] - max).exp();
    let sum = e0 + e1;
    [e0 / sum, e1 / sum]
}
