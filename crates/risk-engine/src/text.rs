//! Text-derived signals: the summary every downstream consumer shares.
//!
//! The heuristic scorer and the ML feature row are built from the same
//! summary, so everything here must be a pure function of the input text.

use std::collections::HashMap;

use crate::patterns::{CUIT_RE, DATE_RE, ISSUER_RE, PLATE_RE, VIGENCY_RE, VIN_RE};

/// Read-only summary of the recognized text of all pages.
#[derive(Debug, Clone, PartialEq)]
pub struct TextSummary {
    /// Total characters of the newline-joined text
    pub length: usize,
    /// Number of pages the summary was built from
    pub pages: usize,
    /// Pages with at least one non-whitespace character
    pub pages_with_text: usize,
    pub chars_per_page_mean: f64,
    pub has_date: bool,
    pub has_plate: bool,
    pub has_vin: bool,
    pub has_cuit: bool,
    pub has_vigency: bool,
    pub has_issuer: bool,
    pub same_plate_all_pages: bool,
    /// Joined text, retained for rule matching only. Never serialized.
    pub raw_text: String,
}

/// Build the summary from per-page texts. Deterministic: the same input
/// always yields the same summary.
pub fn summarize_text(texts: &[String]) -> TextSummary {
    let joined = texts.join("\n");
    let pages_with_text = texts.iter().filter(|t| !t.trim().is_empty()).count();
    let length = joined.chars().count();
    let chars_per_page_mean = if texts.is_empty() {
        0.0
    } else {
        length as f64 / texts.len() as f64
    };

    TextSummary {
        length,
        pages: texts.len(),
        pages_with_text,
        chars_per_page_mean,
        has_date: DATE_RE.is_match(&joined),
        has_plate: PLATE_RE.is_match(&joined),
        has_vin: VIN_RE.is_match(&joined),
        has_cuit: CUIT_RE.is_match(&joined),
        has_vigency: VIGENCY_RE.is_match(&joined),
        has_issuer: ISSUER_RE.is_match(&joined),
        same_plate_all_pages: same_plate_across_pages(texts),
        raw_text: joined,
    }
}

/// Tamper signal: do all pages show the same vehicle plate?
///
/// Any page without a plate match fails the check. Otherwise the most
/// frequent plate on page 1 must appear on every later page (pages swapped
/// in from a different vehicle break this).
pub fn same_plate_across_pages(texts: &[String]) -> bool {
    let per_page: Vec<Vec<&str>> = texts
        .iter()
        .map(|t| PLATE_RE.find_iter(t).map(|m| m.as_str()).collect())
        .collect();

    if per_page.is_empty() || per_page.iter().any(|p| p.is_empty()) {
        return false;
    }

    let mut counts: HashMap<&str, usize> = HashMap::new();
    for plate in &per_page[0] {
        *counts.entry(plate).or_insert(0) += 1;
    }
    // Most frequent plate on page 1; ties broken lexicographically so the
    // result does not depend on hash iteration order.
    let top = counts
        .iter()
        .max_by(|a, b| a.1.cmp(b.1).then(b.0.cmp(a.0)))
        .map(|(plate, _)| *plate);

    match top {
        Some(top) => per_page[1..].iter().all(|p| p.contains(&top)),
        None => false,
    }
}

/// CUIT/CUIL check-digit validation.
///
/// Detection (`has_cuit`) and arithmetic validity are separate signals: a
/// token can look like a CUIT and still fail the checksum.
pub fn cuit_is_valid(raw: &str) -> bool {
    let digits: Vec<u32> = raw.chars().filter_map(|c| c.to_digit(10)).collect();
    if digits.len() != 11 {
        return false;
    }
    const COEFS: [u32; 10] = [5, 4, 3, 2, 7, 6, 5, 4, 3, 2];
    let sum: u32 = digits[..10].iter().zip(COEFS).map(|(d, c)| d * c).sum();
    let check = match 11 - (sum % 11) {
        11 => 0,
        10 => 9,
        n => n,
    };
    check == digits[10]
}
