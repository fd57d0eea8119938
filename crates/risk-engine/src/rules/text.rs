// Text rules: required fields, OCR quality, identifier validity
use shared_types::{DocumentType, Reason, ReasonCode};

use crate::patterns::{CUIT_RE, LONG_ALNUM_RE, VIN_RE};
use crate::text::{cuit_is_valid, TextSummary};

const W_MISSING_DATE: f64 = 0.20;
const W_TEXT_TOO_SHORT: f64 = 0.10;
const W_INVALID_CUIT: f64 = 0.10;
const W_VIN_FORMAT_SUSPECT: f64 = 0.08;
const W_MISSING_VIGENCIA: f64 = 0.06;
const W_MISSING_EMISOR: f64 = 0.04;

/// Below this many recognized characters the scan is probably unusable
const MIN_TEXT_CHARS: usize = 120;

/// Types for which a date must appear somewhere in the text
const DATE_REQUIRED: &[DocumentType] = &[
    DocumentType::Vtv,
    DocumentType::Seguro,
    DocumentType::Titulo,
    DocumentType::Informe,
    DocumentType::Cedula,
    DocumentType::Servicio,
];

/// Types expected to carry an expiry/validity field
const VIGENCY_REQUIRED: &[DocumentType] = &[DocumentType::Seguro, DocumentType::Vtv];

/// Types expected to name an issuing entity
const ISSUER_REQUIRED: &[DocumentType] = &[
    DocumentType::Seguro,
    DocumentType::Vtv,
    DocumentType::Informe,
];

/// Evaluate all text rules for the declared document type. `Otro` is never
/// subject to the type-gated rules.
pub fn check_text(doc_type: DocumentType, summary: &TextSummary) -> Vec<Reason> {
    let mut reasons = Vec::new();

    if DATE_REQUIRED.contains(&doc_type) && !summary.has_date {
        reasons.push(Reason::new(
            ReasonCode::OcrFieldMissingDate,
            "No valid date detected in the text",
            W_MISSING_DATE,
        ));
    }

    if summary.length < MIN_TEXT_CHARS {
        reasons.push(Reason::new(
            ReasonCode::OcrTextTooShort,
            "Very little recognized text (possible low quality)",
            W_TEXT_TOO_SHORT,
        ));
    }

    if let Some(m) = CUIT_RE.find(&summary.raw_text) {
        if !cuit_is_valid(m.as_str()) {
            reasons.push(Reason::new(
                ReasonCode::OcrInvalidCuit,
                "CUIT/CUIL detected with invalid check digit",
                W_INVALID_CUIT,
            ));
        }
    }

    // A 17-char block that would be a VIN except for I/O/Q characters is a
    // typical retype artifact.
    for token in LONG_ALNUM_RE.find_iter(&summary.raw_text) {
        let token = token.as_str();
        if token.len() == 17
            && !VIN_RE.is_match(token)
            && token.chars().any(|c| matches!(c, 'I' | 'O' | 'Q'))
        {
            reasons.push(Reason::new(
                ReasonCode::OcrVinFormatSuspect,
                "VIN-like sequence with invalid characters (I/O/Q)",
                W_VIN_FORMAT_SUSPECT,
            ));
            break;
        }
    }

    if VIGENCY_REQUIRED.contains(&doc_type) && !summary.has_vigency {
        reasons.push(Reason::new(
            ReasonCode::OcrMissingVigencia,
            "Expected validity/expiry field not detected",
            W_MISSING_VIGENCIA,
        ));
    }

    if ISSUER_REQUIRED.contains(&doc_type) && !summary.has_issuer {
        reasons.push(Reason::new(
            ReasonCode::OcrMissingEmisor,
            "No issuing entity/company detected in the text",
            W_MISSING_EMISOR,
        ));
    }

    reasons
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::text::summarize_text;

    fn summary_of(text: &str) -> TextSummary {
        summarize_text(&[text.to_string()])
    }

    fn codes(reasons: &[Reason]) -> Vec<ReasonCode> {
        reasons.iter().map(|r| r.code).collect()
    }

    #[test]
    fn missing_date_applies_to_gated_types_only() {
        let s = summary_of("texto sin fecha alguna pero con bastante contenido para superar el minimo de caracteres del detector de calidad de escaneo");
        assert!(codes(&check_text(DocumentType::Vtv, &s)).contains(&ReasonCode::OcrFieldMissingDate));
        assert!(
            !codes(&check_text(DocumentType::Otro, &s)).contains(&ReasonCode::OcrFieldMissingDate)
        );
    }

    #[test]
    fn otro_never_triggers_type_gated_rules() {
        let s = summary_of("x");
        let codes = codes(&check_text(DocumentType::Otro, &s));
        assert!(!codes.contains(&ReasonCode::OcrFieldMissingDate));
        assert!(!codes.contains(&ReasonCode::OcrMissingVigencia));
        assert!(!codes.contains(&ReasonCode::OcrMissingEmisor));
        // the ungated short-text rule still applies
        assert!(codes.contains(&ReasonCode::OcrTextTooShort));
    }

    #[test]
    fn short_text_cutoff_is_120_chars() {
        let short = summary_of(&"a".repeat(119));
        assert!(codes(&check_text(DocumentType::Otro, &short)).contains(&ReasonCode::OcrTextTooShort));

        let long = summary_of(&"a".repeat(120));
        assert!(!codes(&check_text(DocumentType::Otro, &long)).contains(&ReasonCode::OcrTextTooShort));
    }

    #[test]
    fn invalid_cuit_fires_only_when_checksum_fails() {
        let bad = summary_of("CUIT 20-12345678-9");
        assert!(codes(&check_text(DocumentType::Otro, &bad)).contains(&ReasonCode::OcrInvalidCuit));

        let good = summary_of("CUIT 20-12345678-3");
        assert!(!codes(&check_text(DocumentType::Otro, &good)).contains(&ReasonCode::OcrInvalidCuit));
    }

    #[test]
    fn vin_with_ioq_is_suspect() {
        let s = summary_of("chasis 8AD12345678901IOQ");
        assert!(
            codes(&check_text(DocumentType::Otro, &s)).contains(&ReasonCode::OcrVinFormatSuspect)
        );

        let valid = summary_of("chasis 8AD12345678901234");
        assert!(!codes(&check_text(DocumentType::Otro, &valid))
            .contains(&ReasonCode::OcrVinFormatSuspect));
    }

    #[test]
    fn vigency_and_issuer_gates() {
        let s = summary_of("documento generico con suficiente texto para no disparar la regla de escaneo corto, sin palabras clave de vigencia ni de entidades emisoras");
        let seguro = codes(&check_text(DocumentType::Seguro, &s));
        assert!(seguro.contains(&ReasonCode::OcrMissingVigencia));
        assert!(seguro.contains(&ReasonCode::OcrMissingEmisor));

        let informe = codes(&check_text(DocumentType::Informe, &s));
        assert!(!informe.contains(&ReasonCode::OcrMissingVigencia));
        assert!(informe.contains(&ReasonCode::OcrMissingEmisor));

        let titulo = codes(&check_text(DocumentType::Titulo, &s));
        assert!(!titulo.contains(&ReasonCode::OcrMissingVigencia));
        assert!(!titulo.contains(&ReasonCode::OcrMissingEmisor));
    }

    #[test]
    fn reprocessing_yields_identical_code_set() {
        let text = "VTV dominio AB123CD sin fecha";
        let a = codes(&check_text(DocumentType::Vtv, &summary_of(text)));
        let b = codes(&check_text(DocumentType::Vtv, &summary_of(text)));
        assert_eq!(a, b);
    }
}
