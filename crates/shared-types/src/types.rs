use std::collections::BTreeMap;
use std::fmt;

/// Flat key/value map of document properties (Producer, Creator, dates, ...).
/// May be empty when the underlying metadata tool is unavailable.
pub type MetadataMap = BTreeMap<String, String>;

/// Declared document type of an Argentine vehicle document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum DocumentType {
    #[serde(rename = "TITULO")]
    Titulo,
    #[serde(rename = "CEDULA")]
    Cedula,
    #[serde(rename = "VTV")]
    Vtv,
    #[serde(rename = "SEGURO")]
    Seguro,
    #[serde(rename = "INFORME")]
    Informe,
    #[serde(rename = "SERVICIO")]
    Servicio,
    #[serde(rename = "OTRO")]
    Otro,
}

impl DocumentType {
    /// Parse a declared type, case-insensitively. Unknown strings map to `Otro`.
    pub fn parse(s: &str) -> Self {
        match s.trim().to_uppercase().as_str() {
            "TITULO" => Self::Titulo,
            "CEDULA" => Self::Cedula,
            "VTV" => Self::Vtv,
            "SEGURO" => Self::Seguro,
            "INFORME" => Self::Informe,
            "SERVICIO" => Self::Servicio,
            _ => Self::Otro,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Titulo => "TITULO",
            Self::Cedula => "CEDULA",
            Self::Vtv => "VTV",
            Self::Seguro => "SEGURO",
            Self::Informe => "INFORME",
            Self::Servicio => "SERVICIO",
            Self::Otro => "OTRO",
        }
    }
}

impl fmt::Display for DocumentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Fixed catalog of fraud-indicator codes. The string form doubles as the
/// `rule_*` column suffix in the training dataset, so it must stay stable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum ReasonCode {
    #[serde(rename = "META_PRODUCER_SUSPICIOUS")]
    MetaProducerSuspicious,
    #[serde(rename = "META_PRODUCER_MISSING")]
    MetaProducerMissing,
    #[serde(rename = "META_PRODUCER_UNKNOWN")]
    MetaProducerUnknown,
    #[serde(rename = "META_CREATOR_PERSON_NAME")]
    MetaCreatorPersonName,
    #[serde(rename = "META_DATE_MISMATCH")]
    MetaDateMismatch,
    #[serde(rename = "META_DATE_LARGE_GAP")]
    MetaDateLargeGap,
    #[serde(rename = "OCR_FIELD_MISSING_DATE")]
    OcrFieldMissingDate,
    #[serde(rename = "OCR_TEXT_TOO_SHORT")]
    OcrTextTooShort,
    #[serde(rename = "OCR_INVALID_CUIT")]
    OcrInvalidCuit,
    #[serde(rename = "OCR_VIN_FORMAT_SUSPECT")]
    OcrVinFormatSuspect,
    #[serde(rename = "OCR_MISSING_VIGENCIA")]
    OcrMissingVigencia,
    #[serde(rename = "OCR_MISSING_EMISOR")]
    OcrMissingEmisor,
    #[serde(rename = "IMAGE_LOW_RES")]
    ImageLowRes,
    #[serde(rename = "IMAGE_OVERCOMPRESSED")]
    ImageOvercompressed,
    #[serde(rename = "IMAGE_BLURRY")]
    ImageBlurry,
}

impl ReasonCode {
    /// Every code in catalog order. Feature columns and dataset headers
    /// derive from this list, so the order is part of the contract.
    pub const ALL: [ReasonCode; 15] = [
        Self::MetaProducerSuspicious,
        Self::MetaProducerMissing,
        Self::MetaProducerUnknown,
        Self::MetaCreatorPersonName,
        Self::MetaDateMismatch,
        Self::MetaDateLargeGap,
        Self::OcrFieldMissingDate,
        Self::OcrTextTooShort,
        Self::OcrInvalidCuit,
        Self::OcrVinFormatSuspect,
        Self::OcrMissingVigencia,
        Self::OcrMissingEmisor,
        Self::ImageLowRes,
        Self::ImageOvercompressed,
        Self::ImageBlurry,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::MetaProducerSuspicious => "META_PRODUCER_SUSPICIOUS",
            Self::MetaProducerMissing => "META_PRODUCER_MISSING",
            Self::MetaProducerUnknown => "META_PRODUCER_UNKNOWN",
            Self::MetaCreatorPersonName => "META_CREATOR_PERSON_NAME",
            Self::MetaDateMismatch => "META_DATE_MISMATCH",
            Self::MetaDateLargeGap => "META_DATE_LARGE_GAP",
            Self::OcrFieldMissingDate => "OCR_FIELD_MISSING_DATE",
            Self::OcrTextTooShort => "OCR_TEXT_TOO_SHORT",
            Self::OcrInvalidCuit => "OCR_INVALID_CUIT",
            Self::OcrVinFormatSuspect => "OCR_VIN_FORMAT_SUSPECT",
            Self::OcrMissingVigencia => "OCR_MISSING_VIGENCIA",
            Self::OcrMissingEmisor => "OCR_MISSING_EMISOR",
            Self::ImageLowRes => "IMAGE_LOW_RES",
            Self::ImageOvercompressed => "IMAGE_OVERCOMPRESSED",
            Self::ImageBlurry => "IMAGE_BLURRY",
        }
    }
}

impl fmt::Display for ReasonCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A triggered rule: code, human-readable message, and weight in (0, 1].
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct Reason {
    pub code: ReasonCode,
    pub message: String,
    pub weight: f64,
}

impl Reason {
    pub fn new(code: ReasonCode, message: impl Into<String>, weight: f64) -> Self {
        Self {
            code,
            message: message.into(),
            weight,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum RiskLabel {
    #[serde(rename = "low")]
    Low,
    #[serde(rename = "medium")]
    Medium,
    #[serde(rename = "high")]
    High,
}

impl RiskLabel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }
}

impl fmt::Display for RiskLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Recognition statistics reported alongside results.
#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
pub struct OcrStats {
    pub pages: usize,
    pub total_chars: usize,
    pub time_ms: u64,
}

/// Per-page score entry of a heuristic result.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct PageScore {
    pub page: usize,
    pub score: f64,
    pub reasons: Vec<Reason>,
}

/// Aggregated heuristic analysis result for one document.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct RiskResult {
    pub risk_score01: f64,
    pub risk_score100: u8,
    pub risk_label: RiskLabel,
    pub reasons: Vec<Reason>,
    pub per_page: Vec<PageScore>,
    pub file_hash: String,
    pub ocr_stats: OcrStats,
}

/// Result of the ML scoring path. `features_used` echoes the FeatureSpec
/// column order the prediction was computed from.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct MlRiskResult {
    pub risk_score: f64,
    pub risk_label: RiskLabel,
    pub features_used: Vec<String>,
    pub reasons: Vec<Reason>,
    pub ocr_stats: OcrStats,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn document_type_parses_case_insensitively() {
        assert_eq!(DocumentType::parse("seguro"), DocumentType::Seguro);
        assert_eq!(DocumentType::parse(" VTV "), DocumentType::Vtv);
        assert_eq!(DocumentType::parse("recibo"), DocumentType::Otro);
    }

    #[test]
    fn reason_code_string_form_is_stable() {
        assert_eq!(
            ReasonCode::MetaProducerSuspicious.as_str(),
            "META_PRODUCER_SUSPICIOUS"
        );
        assert_eq!(ReasonCode::ALL.len(), 15);
    }

    #[test]
    fn reason_serializes_with_upper_snake_code() {
        let r = Reason::new(ReasonCode::OcrInvalidCuit, "bad check digit", 0.10);
        let json = serde_json::to_string(&r).unwrap();
        assert!(json.contains("\"OCR_INVALID_CUIT\""));
    }
}
