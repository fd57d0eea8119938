//! Single-document analysis: strict sequence of normalize, recognize,
//! extract signals, evaluate rules, aggregate.

use std::path::Path;

use risk_engine::config::EngineConfig;
use risk_engine::image::{summarize_images, ImageSummary, LaplacianSharpness, SharpnessEstimator};
use risk_engine::text::{summarize_text, TextSummary};
use risk_engine::RiskEngine;
use shared_types::{DocumentType, MetadataMap, OcrStats, PageScore, RiskResult};

use crate::error::AnalyzeError;
use crate::hash::file_sha256;
use crate::metadata::{ExiftoolReader, MetadataReader};
use crate::normalize::{normalize, NormalizedDocument};
use crate::ocr::{OcrOutput, TesseractRecognizer, TextRecognizer};
use crate::render::{PageRenderer, PdftoppmRenderer};

/// Per-call options; configuration defaults apply where unset.
#[derive(Debug, Clone)]
pub struct AnalyzeOptions {
    /// OCR language; defaults to the configured one
    pub language: Option<String>,
    pub ocr_enabled: bool,
}

impl Default for AnalyzeOptions {
    fn default() -> Self {
        Self {
            language: None,
            ocr_enabled: true,
        }
    }
}

/// Everything one extraction pass produces. The heuristic scorer, the ML
/// feature row, and the dataset builder all consume this same struct; that
/// is what keeps the three paths byte-for-byte consistent.
pub struct Extraction {
    pub doc: NormalizedDocument,
    pub texts: Vec<String>,
    pub ocr_stats: OcrStats,
    pub meta: MetadataMap,
    pub summary: TextSummary,
    pub image_summary: ImageSummary,
    pub num_pages: usize,
    pub file_size_bytes: u64,
    pub file_hash: String,
}

/// Owns the collaborators and the rule engine. One analyzer is shared,
/// immutably, across batch workers; documents never share mutable state.
pub struct Analyzer {
    config: EngineConfig,
    engine: RiskEngine,
    renderer: Box<dyn PageRenderer>,
    recognizer: Box<dyn TextRecognizer>,
    metadata: Box<dyn MetadataReader>,
    sharpness: Option<Box<dyn SharpnessEstimator>>,
}

impl Analyzer {
    /// Analyzer with the default subprocess collaborators.
    pub fn new(config: EngineConfig) -> Self {
        Self::with_collaborators(
            config,
            Box::new(PdftoppmRenderer),
            Box::new(TesseractRecognizer),
            Box::new(ExiftoolReader),
            Some(Box::new(LaplacianSharpness)),
        )
    }

    /// Inject collaborators; tests use stubs, deployments may swap tools.
    /// `sharpness: None` withholds the blur signal without failing.
    pub fn with_collaborators(
        config: EngineConfig,
        renderer: Box<dyn PageRenderer>,
        recognizer: Box<dyn TextRecognizer>,
        metadata: Box<dyn MetadataReader>,
        sharpness: Option<Box<dyn SharpnessEstimator>>,
    ) -> Self {
        let engine = RiskEngine::new(config.features.clone(), config.thresholds);
        Self {
            config,
            engine,
            renderer,
            recognizer,
            metadata,
            sharpness,
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn engine(&self) -> &RiskEngine {
        &self.engine
    }

    /// Shared extraction pass: pages, text, metadata, and both signal
    /// summaries. Metadata is always read here; the feature toggles decide
    /// which rule families consume it.
    pub fn extract(&self, path: &Path, options: &AnalyzeOptions) -> Result<Extraction, AnalyzeError> {
        let file_hash = file_sha256(path).map_err(crate::error::IngestError::Io)?;
        let file_size_bytes = std::fs::metadata(path)
            .map(|m| m.len())
            .unwrap_or_default();

        let doc = normalize(
            path,
            self.renderer.as_ref(),
            self.config.ocr.pdf_render_dpi,
            &self.config.paths.workdir,
            self.config.paths.keep_temp,
        )?;

        let lang = options
            .language
            .as_deref()
            .unwrap_or(&self.config.ocr.default_lang);

        let OcrOutput { texts, stats } = if let Some(text) = &doc.html_text {
            OcrOutput {
                stats: OcrStats {
                    pages: 1,
                    total_chars: text.chars().count(),
                    time_ms: 0,
                },
                texts: vec![text.clone()],
            }
        } else if options.ocr_enabled {
            self.recognizer.recognize(&doc.images, lang)?
        } else {
            OcrOutput::default()
        };

        let meta = self.metadata.read(path);
        let summary = summarize_text(&texts);
        let image_summary = summarize_images(&doc.images, self.sharpness.as_deref());
        let num_pages = if texts.is_empty() {
            doc.images.len()
        } else {
            texts.len()
        };

        Ok(Extraction {
            doc,
            texts,
            ocr_stats: stats,
            meta,
            summary,
            image_summary,
            num_pages,
            file_size_bytes,
            file_hash,
        })
    }

    /// Heuristic path: evaluate the catalog and fold into a risk result.
    pub fn analyze(
        &self,
        path: &Path,
        doc_type: DocumentType,
        options: &AnalyzeOptions,
    ) -> Result<RiskResult, AnalyzeError> {
        let ex = self.extract(path, options)?;

        let reasons = self
            .engine
            .evaluate(doc_type, &ex.meta, &ex.summary, &ex.image_summary);
        let (score01, score100, label) = self.engine.score(&reasons);

        let per_page = (1..=ex.doc.images.len())
            .map(|page| PageScore {
                page,
                score: score01,
                reasons: Vec::new(),
            })
            .collect();

        tracing::info!(
            path = %path.display(),
            doc_type = %doc_type,
            score01,
            label = %label,
            reasons = reasons.len(),
            "document analyzed"
        );

        Ok(RiskResult {
            risk_score01: (score01 * 10_000.0).round() / 10_000.0,
            risk_score100: score100,
            risk_label: label,
            reasons,
            per_page,
            file_hash: ex.file_hash,
            ocr_stats: ex.ocr_stats,
        })
    }
}


#[cfg(test)]
mod tests {
    use super::test_support::*;
    use super::*;
    use pretty_assertions::assert_eq;
    use shared_types::ReasonCode;

    fn fake_document(dir: &tempfile::TempDir) -> std::path::PathBuf {
        let path = dir.path().join("cedula.jpg");
        std::fs::write(&path, b"not really a jpeg").unwrap();
        path
    }

    #[test]
    fn analyze_produces_bounded_scores_and_reasons() {
        let dir = tempfile::tempdir().unwrap();
        let path = fake_document(&dir);
        let analyzer = analyzer_with_text(&["texto corto"], MetadataMap::new());

        let result = analyzer
            .analyze(&path, DocumentType::Cedula, &AnalyzeOptions::default())
            .unwrap();

        assert!((0.0..=1.0).contains(&result.risk_score01));
        assert!((1..=100).contains(&result.risk_score100));
        assert!(result.file_hash.starts_with("sha256:"));
        let codes: Vec<_> = result.reasons.iter().map(|r| r.code).collect();
        assert!(codes.contains(&ReasonCode::MetaProducerMissing));
        assert!(codes.contains(&ReasonCode::OcrFieldMissingDate));
    }

    #[test]
    fn analyze_is_deterministic_for_the_same_document() {
        let dir = tempfile::tempdir().unwrap();
        let path = fake_document(&dir);
        let analyzer = analyzer_with_text(&["dominio AB123CD"], MetadataMap::new());

        let a = analyzer
            .analyze(&path, DocumentType::Vtv, &AnalyzeOptions::default())
            .unwrap();
        let b = analyzer
            .analyze(&path, DocumentType::Vtv, &AnalyzeOptions::default())
            .unwrap();

        assert_eq!(a.risk_score01, b.risk_score01);
        let codes_a: Vec<_> = a.reasons.iter().map(|r| r.code).collect();
        let codes_b: Vec<_> = b.reasons.iter().map(|r| r.code).collect();
        assert_eq!(codes_a, codes_b);
    }

    #[test]
    fn unsupported_extension_errors_without_touching_collaborators() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("factura.docx");
        std::fs::write(&path, b"doc").unwrap();
        let analyzer = analyzer_with_text(&[], MetadataMap::new());

        let err = analyzer
            .analyze(&path, DocumentType::Otro, &AnalyzeOptions::default())
            .unwrap_err();
        assert!(matches!(
            err,
            AnalyzeError::Ingest(crate::error::IngestError::UnsupportedFormat(_))
        ));
    }

    #[test]
    fn ocr_can_be_disabled() {
        let dir = tempfile::tempdir().unwrap();
        let path = fake_document(&dir);
        let analyzer = analyzer_with_text(&["should not be used"], MetadataMap::new());

        let options = AnalyzeOptions {
            ocr_enabled: false,
            ..AnalyzeOptions::default()
        };
        let ex = analyzer.extract(&path, &options).unwrap();
        assert!(ex.texts.is_empty());
        assert_eq!(ex.num_pages, 1); // the single image page
    }
}
