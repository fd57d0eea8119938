//! Score aggregation and label mapping

use shared_types::{Reason, RiskLabel};

/// Label cut points, `0 <= low < high <= 1`.
#[derive(Debug, Clone, Copy, serde::Serialize, serde::Deserialize)]
pub struct Thresholds {
    pub low: f64,
    pub high: f64,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            low: 0.25,
            high: 0.60,
        }
    }
}

/// Saturating sum of triggered weights, clamped to [0, 1]. Many weak
/// signals cannot push past the cap; strong ones dominate quickly.
pub fn aggregate(reasons: &[Reason]) -> f64 {
    reasons
        .iter()
        .map(|r| r.weight)
        .sum::<f64>()
        .clamp(0.0, 1.0)
}

/// `< low` is low, `>= high` is high, everything between is medium.
pub fn map_label(score01: f64, thresholds: &Thresholds) -> RiskLabel {
    if score01 < thresholds.low {
        RiskLabel::Low
    } else if score01 >= thresholds.high {
        RiskLabel::High
    } else {
        RiskLabel::Medium
    }
}

/// Integer score on 1..=100. Never 0, so "no signal" stays distinguishable
/// from a missing result.
pub fn score100(score01: f64) -> u8 {
    ((score01 * 100.0).round() as i64).clamp(1, 100) as u8
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use shared_types::ReasonCode;

    fn reasons_with_weights(weights: &[f64]) -> Vec<Reason> {
        weights
            .iter()
            .map(|w| Reason::new(ReasonCode::OcrTextTooShort, "test", *w))
            .collect()
    }

    #[test]
    fn sum_saturates_at_one() {
        // 0.20 + 0.15 + 0.25 + 0.25 + 0.25 + 0.25 = 1.35
        let reasons = reasons_with_weights(&[0.20, 0.15, 0.25, 0.25, 0.25, 0.25]);
        assert_eq!(aggregate(&reasons), 1.0);
    }

    #[test]
    fn no_reasons_scores_zero_but_reports_one() {
        assert_eq!(aggregate(&[]), 0.0);
        assert_eq!(score100(0.0), 1);
    }

    #[test]
    fn label_boundaries_are_inclusive_as_specified() {
        let t = Thresholds {
            low: 0.25,
            high: 0.60,
        };
        assert_eq!(map_label(0.2499, &t), RiskLabel::Low);
        assert_eq!(map_label(0.25, &t), RiskLabel::Medium);
        assert_eq!(map_label(0.5999, &t), RiskLabel::Medium);
        assert_eq!(map_label(0.60, &t), RiskLabel::High);
        assert_eq!(map_label(1.0, &t), RiskLabel::High);
    }

    #[test]
    fn score100_is_clamped_to_1_100() {
        assert_eq!(score100(1.0), 100);
        assert_eq!(score100(0.004), 1);
        assert_eq!(score100(0.5), 50);
    }

    proptest! {
        #[test]
        fn aggregate_stays_in_unit_interval(weights in proptest::collection::vec(0.0f64..=0.25, 0..20)) {
            let score = aggregate(&reasons_with_weights(&weights));
            prop_assert!((0.0..=1.0).contains(&score));
        }

        #[test]
        fn label_is_consistent_with_thresholds(score in 0.0f64..=1.0) {
            let t = Thresholds::default();
            let label = map_label(score, &t);
            match label {
                RiskLabel::Low => prop_assert!(score < t.low),
                RiskLabel::Medium => prop_assert!(score >= t.low && score < t.high),
                RiskLabel::High => prop_assert!(score >= t.high),
            }
        }
    }
}
