//! Keep-signal resolution.
//!
//! Decision logs have grown three independent encodings of "was this tile
//! kept": an explicit boolean, an enumerated decision string, and a raw
//! score to compare against a threshold. Readers resolve them through one
//! tagged signal with a fixed precedence so both logs are interpreted
//! identically.

use crate::constants::KEEP_DECISION_STRINGS;
use crate::gate;
use crate::summarize::LogRecord;

/// The keep signal extracted from one decision record.
#[derive(Debug, Clone, PartialEq)]
pub enum KeepSignal {
    /// An explicit `kept` boolean. Highest precedence.
    Explicit(bool),
    /// An enumerated decision string such as `"keep"`.
    Decision(String),
    /// A score to compare against a threshold; the threshold may come
    /// from the record itself or from the calibration artifact.
    Score {
        /// Event probability from the record.
        prob: f64,
        /// Threshold from the record, if present.
        threshold: Option<f64>,
    },
    /// No signal present. Resolves to not-kept: undecidable records must
    /// never count toward bandwidth savings.
    Absent,
}

impl KeepSignal {
    /// Extract the highest-precedence signal present in a record.
    ///
    /// The score signal prefers `prob_event` and falls back to the
    /// legacy `prob` field.
    pub fn from_record(record: &LogRecord) -> Self {
        if let Some(kept) = record.kept {
            return Self::Explicit(kept);
        }
        if let Some(decision) = &record.decision {
            return Self::Decision(decision.clone());
        }
        if let Some(prob) = record.prob_event.or(record.prob) {
            return Self::Score {
                prob,
                threshold: record.threshold,
            };
        }
        Self::Absent
    }

    /// Resolve the signal to a keep/drop outcome.
    ///
    /// `fallback_threshold` is consulted only for a [`KeepSignal::Score`]
    /// whose record carried no threshold of its own.
    pub fn resolve(&self, fallback_threshold: Option<f64>) -> bool {
        match self {
            Self::Explicit(kept) => *kept,
            Self::Decision(decision) => {
                let lowered = decision.to_lowercase();
                KEEP_DECISION_STRINGS.contains(&lowered.as_str())
            }
            Self::Score { prob, threshold } => threshold
                .or(fallback_threshold)
                .is_some_and(|t| gate::decide(*prob, t)),
            Self::Absent => false,
        }
    }
}

/// Resolve whether a record was kept, per the documented precedence.
pub fn record_is_kept(record: &LogRecord, fallback_threshold: Option<f64>) -> bool {
    KeepSignal::from_record(record).resolve(fallback_threshold)
}
