//! The keep/drop decision gate.
//!
//! Every call site that turns an event probability into a keep/drop
//! decision goes through [`decide`]: the validation telemetry logger, the
//! deployment bandwidth filter, and the summarizer's score-signal
//! resolution. Temperature scaling happens strictly upstream, on logits
//! before the softmax; the gate never adjusts for it.

/// Decide whether a tile is kept for downlink.
///
/// A tile is kept when its event probability reaches the threshold.
/// Pure, total, deterministic.
#[inline]
pub fn decide(prob_event: f64, threshold: f64) -> bool {
    prob_event >= threshold
}
