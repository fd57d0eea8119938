pub mod config;
pub mod features;
pub mod image;
pub mod model;
pub mod patterns;
pub mod rules;
pub mod score;
pub mod text;

use shared_types::{DocumentType, MetadataMap, Reason, RiskLabel};

use crate::config::FeatureToggles;
use crate::image::ImageSummary;
use crate::score::Thresholds;
use crate::text::TextSummary;

/// Rule-catalog entry point: evaluates every rule family over the extracted
/// signals and folds the triggered reasons into a bounded score.
pub struct RiskEngine {
    toggles: FeatureToggles,
    thresholds: Thresholds,
}

impl RiskEngine {
    pub fn new(toggles: FeatureToggles, thresholds: Thresholds) -> Self {
        Self {
            toggles,
            thresholds,
        }
    }

    /// Run the full catalog in fixed order: metadata, text, image. Disabled
    /// families are skipped, which withholds their signals.
    pub fn evaluate(
        &self,
        doc_type: DocumentType,
        meta: &MetadataMap,
        summary: &TextSummary,
        images: &ImageSummary,
    ) -> Vec<Reason> {
        let mut reasons = Vec::new();
        if self.toggles.enable_metadata {
            reasons.extend(rules::check_metadata(meta));
        }
        if self.toggles.enable_text {
            reasons.extend(rules::check_text(doc_type, summary));
        }
        if self.toggles.enable_visual {
            reasons.extend(rules::check_images(images));
        }
        reasons
    }

    /// Fold reasons into `(score01, score100, label)`.
    pub fn score(&self, reasons: &[Reason]) -> (f64, u8, RiskLabel) {
        let score01 = score::aggregate(reasons);
        (
            score01,
            score::score100(score01),
            score::map_label(score01, &self.thresholds),
        )
    }
}

impl Default for RiskEngine {
    fn default() -> Self {
        Self::new(FeatureToggles::default(), Thresholds::default())
    }
}
