// Metadata rules: producer/creator fingerprints and timestamp consistency
use chrono::{Datelike, NaiveDateTime};
use shared_types::{MetadataMap, Reason, ReasonCode};

use crate::patterns::{PERSON_LIKE_RE, SUSPICIOUS_SOFTWARE, TRUSTED_PRODUCERS};

const W_PRODUCER_SUSPICIOUS: f64 = 0.15;
const W_PRODUCER_MISSING: f64 = 0.03;
const W_PRODUCER_UNKNOWN: f64 = 0.03;
const W_CREATOR_PERSON_NAME: f64 = 0.05;
const W_DATE_MISMATCH: f64 = 0.05;
const W_DATE_LARGE_GAP: f64 = 0.03;

/// Modification this many calendar years after creation is its own signal
const LARGE_GAP_YEARS: i32 = 2;

/// Parse a metadata timestamp in EXIF (`YYYY:MM:DD HH:MM:SS`) or ISO
/// (`YYYY-MM-DDTHH:MM:SS`) form. Malformed values yield `None`: the
/// date-consistency rules then simply stay silent.
pub fn parse_meta_datetime(s: &str) -> Option<NaiveDateTime> {
    // Char-based truncation: metadata values are attacker-controlled free
    // text and may put a multibyte char across any byte offset.
    let head: String = s.trim().chars().take(19).collect();
    if head.chars().count() < 19 {
        return None;
    }
    NaiveDateTime::parse_from_str(&head, "%Y:%m:%d %H:%M:%S")
        .or_else(|_| NaiveDateTime::parse_from_str(&head, "%Y-%m-%dT%H:%M:%S"))
        .ok()
}

fn get<'a>(meta: &'a MetadataMap, key: &str) -> &'a str {
    meta.get(key).map(String::as_str).unwrap_or("").trim()
}

/// Evaluate all metadata rules. An empty map is valid input: only the
/// producer-missing rule fires.
pub fn check_metadata(meta: &MetadataMap) -> Vec<Reason> {
    let mut reasons = Vec::new();

    let producer = get(meta, "Producer");
    let creator = get(meta, "Creator");

    let combo = format!("{} {}", producer, creator).to_lowercase();
    if SUSPICIOUS_SOFTWARE.iter().any(|w| combo.contains(w)) {
        reasons.push(Reason::new(
            ReasonCode::MetaProducerSuspicious,
            "Metadata suggests editing with graphics software",
            W_PRODUCER_SUSPICIOUS,
        ));
    }

    if producer.is_empty() {
        reasons.push(Reason::new(
            ReasonCode::MetaProducerMissing,
            "Document exposes no Producer",
            W_PRODUCER_MISSING,
        ));
    } else {
        let producer_low = producer.to_lowercase();
        let known = TRUSTED_PRODUCERS
            .iter()
            .chain(SUSPICIOUS_SOFTWARE)
            .any(|w| producer_low.contains(w));
        if !known {
            reasons.push(Reason::new(
                ReasonCode::MetaProducerUnknown,
                format!("Unusual producer: {}", producer),
                W_PRODUCER_UNKNOWN,
            ));
        }
    }

    if !creator.is_empty() && PERSON_LIKE_RE.is_match(creator) {
        reasons.push(Reason::new(
            ReasonCode::MetaCreatorPersonName,
            format!("Creator looks like a personal name: {}", creator),
            W_CREATOR_PERSON_NAME,
        ));
    }

    let created = meta
        .get("CreateDate")
        .or_else(|| meta.get("CreationDate"))
        .map(String::as_str)
        .unwrap_or("");
    let modified = get(meta, "ModifyDate");
    if let (Some(created), Some(modified)) =
        (parse_meta_datetime(created), parse_meta_datetime(modified))
    {
        if modified < created {
            reasons.push(Reason::new(
                ReasonCode::MetaDateMismatch,
                "ModifyDate precedes CreateDate",
                W_DATE_MISMATCH,
            ));
        }
        if modified.year() - created.year() > LARGE_GAP_YEARS {
            reasons.push(Reason::new(
                ReasonCode::MetaDateLargeGap,
                "Modification long after creation",
                W_DATE_LARGE_GAP,
            ));
        }
    }

    reasons
}

#[cfg(test)]
mod tests {
    use super::*;

    fn meta(pairs: &[(&str, &str)]) -> MetadataMap {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    fn codes(reasons: &[Reason]) -> Vec<ReasonCode> {
        reasons.iter().map(|r| r.code).collect()
    }

    #[test]
    fn empty_map_fires_producer_missing_only() {
        let reasons = check_metadata(&MetadataMap::new());
        assert_eq!(codes(&reasons), vec![ReasonCode::MetaProducerMissing]);
    }

    #[test]
    fn suspicious_software_in_creator_counts() {
        let m = meta(&[("Producer", "Acme PDF"), ("Creator", "Adobe Photoshop CC")]);
        let reasons = check_metadata(&m);
        assert!(codes(&reasons).contains(&ReasonCode::MetaProducerSuspicious));
    }

    #[test]
    fn unknown_producer_is_a_weak_signal() {
        let m = meta(&[("Producer", "Acme PDF Writer")]);
        let reasons = check_metadata(&m);
        assert!(codes(&reasons).contains(&ReasonCode::MetaProducerUnknown));

        let trusted = meta(&[("Producer", "Microsoft Word 2019")]);
        assert!(!codes(&check_metadata(&trusted)).contains(&ReasonCode::MetaProducerUnknown));
    }

    #[test]
    fn creator_person_name_is_flagged() {
        let m = meta(&[("Producer", "Foxit"), ("Creator", "Juan Pérez")]);
        assert!(codes(&check_metadata(&m)).contains(&ReasonCode::MetaCreatorPersonName));
    }

    #[test]
    fn modify_before_create_is_a_mismatch() {
        let m = meta(&[
            ("CreateDate", "2024:05:01 10:00:00"),
            ("ModifyDate", "2024:04:01 10:00:00"),
        ]);
        assert!(codes(&check_metadata(&m)).contains(&ReasonCode::MetaDateMismatch));
    }

    #[test]
    fn large_gap_needs_more_than_two_years() {
        let m = meta(&[
            ("CreateDate", "2020-01-01T00:00:00"),
            ("ModifyDate", "2024-01-01T00:00:00"),
        ]);
        assert!(codes(&check_metadata(&m)).contains(&ReasonCode::MetaDateLargeGap));

        let small = meta(&[
            ("CreateDate", "2022:01:01 00:00:00"),
            ("ModifyDate", "2024:01:01 00:00:00"),
        ]);
        assert!(!codes(&check_metadata(&small)).contains(&ReasonCode::MetaDateLargeGap));
    }

    #[test]
    fn malformed_dates_stay_silent() {
        let m = meta(&[
            ("Producer", "Foxit"),
            ("CreateDate", "hace dos años"),
            ("ModifyDate", "2024:01:01 00:00:00"),
        ]);
        let reasons = check_metadata(&m);
        assert!(!codes(&reasons).contains(&ReasonCode::MetaDateMismatch));
        assert!(!codes(&reasons).contains(&ReasonCode::MetaDateLargeGap));
    }

    #[test]
    fn multibyte_free_text_dates_stay_silent() {
        // 'ñ' straddles the 19-byte cut; must yield None, not panic
        assert!(parse_meta_datetime("quince de agosto añ 2020").is_none());
        assert!(parse_meta_datetime("ññññññññññññññññññññ").is_none());

        let m = meta(&[
            ("CreateDate", "quince de agosto añ 2020"),
            ("ModifyDate", "2024:01:01 00:00:00"),
        ]);
        let reasons = check_metadata(&m);
        assert!(!codes(&reasons).contains(&ReasonCode::MetaDateMismatch));
        assert!(!codes(&reasons).contains(&ReasonCode::MetaDateLargeGap));
    }

    #[test]
    fn exif_and_iso_forms_both_parse() {
        assert!(parse_meta_datetime("2024:05:01 10:00:00").is_some());
        assert!(parse_meta_datetime("2024-05-01T10:00:00").is_some());
        assert!(parse_meta_datetime("2024-05-01T10:00:00-03:00").is_some());
        assert!(parse_meta_datetime("01/05/2024").is_none());
    }
}
