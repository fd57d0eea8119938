//! ML scoring path: the same extraction pass projected through the
//! FeatureSpec into a trained regressor.

use std::path::Path;

use risk_engine::features::{build_feature_row, project, FeatureInputs, FeatureSpec};
use risk_engine::model::{ml_label, LinearModel, ModelError, Regressor};
use risk_engine::rules;
use shared_types::{DocumentType, MlRiskResult, Reason};

use crate::analyze::{AnalyzeOptions, Analyzer, Extraction};
use crate::error::AnalyzeError;

/// Artifact file names inside a model directory.
pub const FEATURE_SPEC_FILE: &str = "feature_spec.json";
pub const MODEL_FILE: &str = "model.json";

/// A loaded, spec-validated model. Construction fails on any column
/// divergence between the two artifacts; there is no auto-correction.
pub struct MlScorer {
    spec: FeatureSpec,
    model: LinearModel,
}

impl MlScorer {
    pub fn load(model_dir: &Path) -> Result<Self, ModelError> {
        let spec = FeatureSpec::load(model_dir.join(FEATURE_SPEC_FILE))?;
        let model = LinearModel::load(model_dir.join(MODEL_FILE))?;
        model.validate_spec(&spec)?;
        Ok(Self { spec, model })
    }

    pub fn spec(&self) -> &FeatureSpec {
        &self.spec
    }

    /// Score one document. Rule derivation matches the dataset builder:
    /// every family runs, with the declared document type applied to the
    /// type gates.
    pub fn score(
        &self,
        analyzer: &Analyzer,
        path: &Path,
        doc_type: DocumentType,
        options: &AnalyzeOptions,
    ) -> Result<MlRiskResult, AnalyzeError> {
        let ex = analyzer.extract(path, options)?;
        let reasons = derive_reasons(doc_type, &ex);
        let row = feature_row(&ex, &reasons);
        let x = project(&self.spec, &row);
        let y01 = self.model.predict(&x);

        Ok(MlRiskResult {
            risk_score: ((y01 * 100.0) * 100.0).round() / 100.0,
            risk_label: ml_label(y01),
            features_used: self.spec.features.clone(),
            reasons,
            ocr_stats: ex.ocr_stats,
        })
    }
}

/// Full catalog, ungated by feature toggles: the training dataset was built
/// with every family enabled, so inference must be too.
pub(crate) fn derive_reasons(doc_type: DocumentType, ex: &Extraction) -> Vec<Reason> {
    let mut reasons = rules::check_metadata(&ex.meta);
    reasons.extend(rules::check_text(doc_type, &ex.summary));
    reasons.extend(rules::check_images(&ex.image_summary));
    reasons
}

pub(crate) fn feature_row(ex: &Extraction, reasons: &[Reason]) -> Vec<(String, f64)> {
    build_feature_row(&FeatureInputs {
        summary: &ex.summary,
        images: &ex.image_summary,
        meta: &ex.meta,
        reasons,
        num_pages: ex.num_pages,
        file_size_bytes: ex.file_size_bytes,
        dpi_used: ex.doc.dpi_used,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyze::test_support::analyzer_with_text;
    use pretty_assertions::assert_eq;
    use shared_types::MetadataMap;

    fn write_artifacts(dir: &Path, spec_cols: &[&str], model_cols: &[&str]) {
        let spec = serde_json::json!({
            "version": 1,
            "features": spec_cols,
            "target": "y_score_1_100",
            "target_scaling": "minmax_01_if_needed",
        });
        let model = serde_json::json!({
            "version": 1,
            "features": model_cols,
            "intercept": 0.05,
            "coefficients": model_cols.iter().map(|_| 0.1).collect::<Vec<f64>>(),
        });
        std::fs::write(dir.join(FEATURE_SPEC_FILE), spec.to_string()).unwrap();
        std::fs::write(dir.join(MODEL_FILE), model.to_string()).unwrap();
    }

    #[test]
    fn loading_rejects_column_mismatch() {
        let dir = tempfile::tempdir().unwrap();
        write_artifacts(dir.path(), &["has_date", "num_pages"], &["num_pages"]);
        assert!(matches!(
            MlScorer::load(dir.path()),
            Err(ModelError::FeatureSpecMismatch(_))
        ));
    }

    #[test]
    fn scoring_runs_end_to_end_with_stub_collaborators() {
        let artifacts = tempfile::tempdir().unwrap();
        write_artifacts(
            artifacts.path(),
            &["has_date", "has_patente", "rule_OCR_TEXT_TOO_SHORT"],
            &["has_date", "has_patente", "rule_OCR_TEXT_TOO_SHORT"],
        );
        let scorer = MlScorer::load(artifacts.path()).unwrap();

        let docs = tempfile::tempdir().unwrap();
        let path = docs.path().join("vtv.png");
        std::fs::write(&path, b"png bytes").unwrap();
        let analyzer = analyzer_with_text(&["VTV 01/05/2024 dominio AB123CD"], MetadataMap::new());

        let result = scorer
            .score(&analyzer, &path, DocumentType::Vtv, &AnalyzeOptions::default())
            .unwrap();

        // has_date=1, has_patente=1, short text=1 -> 0.05 + 0.3 = 0.35
        assert_eq!(result.risk_score, 35.0);
        assert_eq!(result.features_used.len(), 3);
    }

    #[test]
    fn feature_row_is_reproducible_across_runs() {
        let docs = tempfile::tempdir().unwrap();
        let path = docs.path().join("seguro.png");
        std::fs::write(&path, b"png bytes").unwrap();
        let analyzer = analyzer_with_text(
            &["Póliza vigencia 01/05/2024", "Aseguradora Zurich"],
            MetadataMap::new(),
        );

        let build = || {
            let ex = analyzer.extract(&path, &AnalyzeOptions::default()).unwrap();
            let reasons = derive_reasons(DocumentType::Seguro, &ex);
            feature_row(&ex, &reasons)
        };
        assert_eq!(build(), build());
    }
}
