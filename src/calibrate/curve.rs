//! Precision-recall and ROC curve computation over scored samples.

use crate::calibrate::ScoreSample;

/// One point of the precision-recall curve at a distinct score threshold.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct CurvePoint {
    /// The threshold; tiles with `score >= threshold` are kept.
    pub threshold: f64,
    /// Precision of the keep set at this threshold.
    pub precision: f64,
    /// Recall of the keep set at this threshold.
    pub recall: f64,
}

/// Indices of `samples` sorted by descending score (stable).
fn descending_order(samples: &[ScoreSample]) -> Vec<usize> {
    let mut order: Vec<usize> = (0..samples.len()).collect();
    order.sort_by(|&a, &b| samples[b].score.total_cmp(&samples[a].score));
    order
}

/// Compute the precision-recall curve, one point per distinct threshold,
/// in descending threshold order.
///
/// The walk stops after the first point reaching maximal recall: lower
/// thresholds only keep more negatives, so they add no recall and are
/// never candidate operating points. With zero positives every recall is
/// defined as 0.0.
pub(crate) fn precision_recall_curve(samples: &[ScoreSample]) -> Vec<CurvePoint> {
    let order = descending_order(samples);
    let total_pos = samples.iter().filter(|s| s.true_label).count();

    let mut points = Vec::new();
    let mut tps = 0usize;
    let mut fps = 0usize;

    for (i, &idx) in order.iter().enumerate() {
        if samples[idx].true_label {
            tps += 1;
        } else {
            fps += 1;
        }

        let at_boundary = order
            .get(i + 1)
            .is_none_or(|&next| samples[next].score != samples[idx].score);
        if !at_boundary {
            continue;
        }

        #[allow(clippy::cast_precision_loss)]
        let precision = tps as f64 / (tps + fps) as f64;
        #[allow(clippy::cast_precision_loss)]
        let recall = if total_pos == 0 {
            0.0
        } else {
            tps as f64 / total_pos as f64
        };
        points.push(CurvePoint {
            threshold: samples[idx].score,
            precision,
            recall,
        });

        if total_pos > 0 && tps == total_pos {
            break;
        }
    }

    points
}

/// Area under the ROC curve by trapezoidal integration.
///
/// Returns `None` when either class is absent: AUC is undefined for a
/// degenerate label set and any stand-in number would be misleading.
pub(crate) fn roc_auc(samples: &[ScoreSample]) -> Option<f64> {
    let total_pos = samples.iter().filter(|s| s.true_label).count();
    let total_neg = samples.len() - total_pos;
    if total_pos == 0 || total_neg == 0 {
        return None;
    }

    let order = descending_order(samples);
    let mut auc = 0.0;
    let mut tps = 0usize;
    let mut fps = 0usize;
    let mut prev_tpr = 0.0;
    let mut prev_fpr = 0.0;

    for (i, &idx) in order.iter().enumerate() {
        if samples[idx].true_label {
            tps += 1;
        } else {
            fps += 1;
        }

        let at_boundary = order
            .get(i + 1)
            .is_none_or(|&next| samples[next].score != samples[idx].score);
        if !at_boundary {
            continue;
        }

        #[allow(clippy::cast_precision_loss)]
        let tpr = tps as f64 / total_pos as f64;
        #[allow(clippy::cast_precision_loss)]
        let fpr = fps as f64 / total_neg as f64;
        auc += (fpr - prev_fpr) * (tpr + prev_tpr) / 2.0;
        prev_tpr = tpr;
        prev_fpr = fpr;
    }

    Some(auc)
}

#[cfg(test)]
#[allow(clippy::float_cmp, clippy::unwrap_used)]
mod tests {
    use super::*;

    fn sample(score: f64, true_label: bool) -> ScoreSample {
        ScoreSample { score, true_label }
    }

    #[test]
    fn test_curve_points_descending_thresholds() {
        let samples = vec![
            sample(0.9, true),
            sample(0.8, false),
            sample(0.7, true),
            sample(0.3, false),
        ];
        let curve = precision_recall_curve(&samples);

        assert_eq!(curve.len(), 3);
        assert_eq!(curve[0].threshold, 0.9);
        assert_eq!(curve[0].precision, 1.0);
        assert_eq!(curve[0].recall, 0.5);
        assert_eq!(curve[1].threshold, 0.8);
        assert_eq!(curve[1].precision, 0.5);
        assert_eq!(curve[1].recall, 0.5);
        assert_eq!(curve[2].threshold, 0.7);
        assert_eq!(curve[2].recall, 1.0);
    }

    #[test]
    fn test_curve_truncates_after_full_recall() {
        // The 0.3 negative adds no recall, so no point is emitted for it.
        let samples = vec![sample(0.9, true), sample(0.3, false)];
        let curve = precision_recall_curve(&samples);
        assert_eq!(curve.len(), 1);
        assert_eq!(curve[0].threshold, 0.9);
        assert_eq!(curve[0].recall, 1.0);
    }

    #[test]
    fn test_curve_groups_tied_scores() {
        let samples = vec![sample(0.5, true), sample(0.5, false), sample(0.2, true)];
        let curve = precision_recall_curve(&samples);
        assert_eq!(curve[0].threshold, 0.5);
        assert_eq!(curve[0].precision, 0.5);
        assert_eq!(curve[0].recall, 0.5);
        assert_eq!(curve[1].threshold, 0.2);
        assert_eq!(curve[1].recall, 1.0);
    }

    #[test]
    fn test_curve_all_negative_labels() {
        let samples = vec![sample(0.9, false), sample(0.1, false)];
        let curve = precision_recall_curve(&samples);
        assert_eq!(curve.len(), 2);
        assert!(curve.iter().all(|p| p.recall == 0.0));
        assert!(curve.iter().all(|p| p.precision == 0.0));
    }

    #[test]
    fn test_roc_auc_known_value() {
        // One discordant (pos 0.7 vs neg 0.8) out of four pos/neg pairs.
        let samples = vec![
            sample(0.9, true),
            sample(0.8, false),
            sample(0.7, true),
            sample(0.3, false),
        ];
        let auc = roc_auc(&samples).unwrap();
        assert!((auc - 0.75).abs() < 1e-12);
    }

    #[test]
    fn test_roc_auc_perfect_separation() {
        let samples = vec![
            sample(0.9, true),
            sample(0.8, true),
            sample(0.2, false),
            sample(0.1, false),
        ];
        assert_eq!(roc_auc(&samples).unwrap(), 1.0);
    }

    #[test]
    fn test_roc_auc_undefined_for_single_class() {
        assert!(roc_auc(&[sample(0.9, true), sample(0.1, true)]).is_none());
        assert!(roc_auc(&[sample(0.9, false)]).is_none());
        assert!(roc_auc(&[]).is_none());
    }

    #[test]
    fn test_roc_auc_ties_score_half() {
        // All scores equal: AUC is exactly 0.5 under trapezoidal tie handling.
        let samples = vec![sample(0.5, true), sample(0.5, false)];
        assert_eq!(roc_auc(&samples).unwrap(), 0.5);
    }
}
