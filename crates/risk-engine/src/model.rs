//! Trained-model artifact loading and prediction (inference side only).
//!
//! Training happens offline; this module loads the persisted artifacts and
//! enforces the one hard configuration invariant: the model's column list
//! and the FeatureSpec must match exactly. A mismatch is fatal, never
//! auto-corrected, because a silently re-ordered or padded row would
//! corrupt every prediction.

use std::path::Path;

use shared_types::RiskLabel;
use thiserror::Error;

use crate::features::FeatureSpec;

#[derive(Debug, Error)]
pub enum ModelError {
    #[error("failed to read model artifact: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse model artifact: {0}")]
    Json(#[from] serde_json::Error),

    #[error("model artifact does not match feature spec: {0}")]
    FeatureSpecMismatch(String),

    #[error("model has {coefficients} coefficients for {features} features")]
    MalformedModel {
        coefficients: usize,
        features: usize,
    },
}

/// Anything that can score a projected feature row.
pub trait Regressor: Send + Sync {
    /// Predicted risk in [0, 1] for a row in the spec's column order.
    fn predict(&self, row: &[f64]) -> f64;
}

/// Linear model persisted as JSON alongside its own column list.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct LinearModel {
    pub version: u32,
    pub features: Vec<String>,
    pub intercept: f64,
    pub coefficients: Vec<f64>,
}

impl LinearModel {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ModelError> {
        let raw = std::fs::read_to_string(path)?;
        let model: Self = serde_json::from_str(&raw)?;
        if model.coefficients.len() != model.features.len() {
            return Err(ModelError::MalformedModel {
                coefficients: model.coefficients.len(),
                features: model.features.len(),
            });
        }
        Ok(model)
    }

    /// Check the artifact against the spec used to build rows. Any
    /// divergence in length, order, or names is a configuration error.
    pub fn validate_spec(&self, spec: &FeatureSpec) -> Result<(), ModelError> {
        if self.features.len() != spec.features.len() {
            return Err(ModelError::FeatureSpecMismatch(format!(
                "model declares {} columns, spec declares {}",
                self.features.len(),
                spec.features.len()
            )));
        }
        for (i, (m, s)) in self.features.iter().zip(&spec.features).enumerate() {
            if m != s {
                return Err(ModelError::FeatureSpecMismatch(format!(
                    "column {} is {:?} in the model but {:?} in the spec",
                    i, m, s
                )));
            }
        }
        Ok(())
    }
}

impl Regressor for LinearModel {
    fn predict(&self, row: &[f64]) -> f64 {
        let dot: f64 = self
            .coefficients
            .iter()
            .zip(row)
            .map(|(c, x)| c * x)
            .sum();
        (self.intercept + dot).clamp(0.0, 1.0)
    }
}

/// Fixed cut points of the ML path (independent of the heuristic
/// thresholds, which are calibrated separately).
pub fn ml_label(score01: f64) -> RiskLabel {
    if score01 < 0.34 {
        RiskLabel::Low
    } else if score01 < 0.67 {
        RiskLabel::Medium
    } else {
        RiskLabel::High
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn spec(features: &[&str]) -> FeatureSpec {
        FeatureSpec {
            version: 1,
            features: features.iter().map(|s| s.to_string()).collect(),
            target: "y_score_1_100".to_string(),
            target_scaling: "minmax_01_if_needed".to_string(),
        }
    }

    fn model(features: &[&str]) -> LinearModel {
        LinearModel {
            version: 1,
            features: features.iter().map(|s| s.to_string()).collect(),
            intercept: 0.1,
            coefficients: vec![0.2; features.len()],
        }
    }

    #[test]
    fn matching_columns_validate() {
        let m = model(&["a", "b"]);
        assert!(m.validate_spec(&spec(&["a", "b"])).is_ok());
    }

    #[test]
    fn any_column_divergence_is_fatal() {
        let m = model(&["a", "b"]);
        assert!(matches!(
            m.validate_spec(&spec(&["a"])),
            Err(ModelError::FeatureSpecMismatch(_))
        ));
        assert!(matches!(
            m.validate_spec(&spec(&["b", "a"])),
            Err(ModelError::FeatureSpecMismatch(_))
        ));
    }

    #[test]
    fn prediction_is_clamped() {
        let m = LinearModel {
            version: 1,
            features: vec!["x".to_string()],
            intercept: 0.0,
            coefficients: vec![10.0],
        };
        assert_eq!(m.predict(&[1.0]), 1.0);
        assert_eq!(m.predict(&[-1.0]), 0.0);
        assert_eq!(m.predict(&[0.05]), 0.5);
    }

    #[test]
    fn ml_label_cut_points() {
        assert_eq!(ml_label(0.0), RiskLabel::Low);
        assert_eq!(ml_label(0.34), RiskLabel::Medium);
        assert_eq!(ml_label(0.67), RiskLabel::High);
    }
}
