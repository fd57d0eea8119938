//! Feature row construction for the ML path.
//!
//! The row is derived from the very same `TextSummary`, `ImageSummary` and
//! triggered reasons the heuristic scorer uses. A row built at inference
//! time must be reproducible column-for-column from the derivation used
//! when the training dataset was built; there is exactly one derivation in
//! this crate, on purpose.

use std::path::Path;

use shared_types::{MetadataMap, Reason, ReasonCode};

use crate::image::ImageSummary;
use crate::model::ModelError;
use crate::text::TextSummary;

/// `rule_*` columns in dataset order. The first four predate the rest, so
/// this is not catalog order; the training CSV header fixes it.
pub const RULE_COLUMNS: [ReasonCode; 15] = [
    ReasonCode::MetaProducerSuspicious,
    ReasonCode::OcrFieldMissingDate,
    ReasonCode::OcrTextTooShort,
    ReasonCode::ImageLowRes,
    ReasonCode::MetaProducerUnknown,
    ReasonCode::MetaProducerMissing,
    ReasonCode::MetaCreatorPersonName,
    ReasonCode::MetaDateMismatch,
    ReasonCode::MetaDateLargeGap,
    ReasonCode::OcrInvalidCuit,
    ReasonCode::OcrVinFormatSuspect,
    ReasonCode::OcrMissingVigencia,
    ReasonCode::OcrMissingEmisor,
    ReasonCode::ImageOvercompressed,
    ReasonCode::ImageBlurry,
];

/// Versioned contract of what a trained model expects as input.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct FeatureSpec {
    pub version: u32,
    pub features: Vec<String>,
    pub target: String,
    pub target_scaling: String,
}

impl FeatureSpec {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ModelError> {
        let raw = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&raw)?)
    }
}

/// Everything the row is derived from. All of it comes out of the one
/// shared extraction pass.
#[derive(Debug)]
pub struct FeatureInputs<'a> {
    pub summary: &'a TextSummary,
    pub images: &'a ImageSummary,
    pub meta: &'a MetadataMap,
    pub reasons: &'a [Reason],
    pub num_pages: usize,
    pub file_size_bytes: u64,
    pub dpi_used: u32,
}

fn flag(b: bool) -> f64 {
    if b {
        1.0
    } else {
        0.0
    }
}

fn triggered(reasons: &[Reason], code: ReasonCode) -> bool {
    reasons.iter().any(|r| r.code == code)
}

/// Build the named feature row in the fixed dataset column order.
pub fn build_feature_row(inputs: &FeatureInputs<'_>) -> Vec<(String, f64)> {
    let s = inputs.summary;
    let img = inputs.images;

    let mut row: Vec<(String, f64)> = vec![
        ("num_pages".into(), inputs.num_pages as f64),
        ("file_size_bytes".into(), inputs.file_size_bytes as f64),
        ("has_metadata".into(), flag(!inputs.meta.is_empty())),
        (
            "producer_suspicious".into(),
            flag(triggered(inputs.reasons, ReasonCode::MetaProducerSuspicious)),
        ),
        ("ocr_total_chars".into(), s.length as f64),
        ("ocr_pages_with_text".into(), s.pages_with_text as f64),
        ("ocr_chars_per_page_mean".into(), s.chars_per_page_mean),
        ("has_date".into(), flag(s.has_date)),
        ("has_patente".into(), flag(s.has_plate)),
        ("has_vin".into(), flag(s.has_vin)),
        ("has_cuit".into(), flag(s.has_cuit)),
        ("has_vencimiento".into(), flag(s.has_vigency)),
        ("has_entidad_emisora".into(), flag(s.has_issuer)),
        (
            "same_patente_all_pages".into(),
            flag(s.same_plate_all_pages),
        ),
        (
            "min_resolution_px".into(),
            img.min_area_px.map_or(0.0, |a| a as f64),
        ),
        ("low_res_flag".into(), flag(img.low_res)),
        ("dpi_used".into(), f64::from(inputs.dpi_used)),
    ];

    for code in RULE_COLUMNS {
        row.push((
            format!("rule_{}", code.as_str()),
            flag(triggered(inputs.reasons, code)),
        ));
    }
    row.push(("reasons_count".into(), inputs.reasons.len() as f64));

    row
}

/// Project a named row onto the spec's declared column order. Declared
/// columns the row does not produce are zero-filled; the declared list
/// itself is ground truth and is never altered here.
pub fn project(spec: &FeatureSpec, row: &[(String, f64)]) -> Vec<f64> {
    spec.features
        .iter()
        .map(|name| {
            row.iter()
                .find(|(k, _)| k == name)
                .map(|(_, v)| *v)
                .unwrap_or(0.0)
        })
        .collect()
}
