//! Regex patterns and keyword lists for document signal extraction

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    /// Dates as DD/MM/YYYY, DD-MM-YYYY, YYYY/MM/DD or YYYY-MM-DD
    pub static ref DATE_RE: Regex =
        Regex::new(r"\b(\d{2}[/-]\d{2}[/-]\d{4}|\d{4}[/-]\d{2}[/-]\d{2})\b").unwrap();

    /// Argentine vehicle plates: AA999AA (Mercosur) or AAA999 (legacy,
    /// optional space between letters and digits)
    pub static ref PLATE_RE: Regex =
        Regex::new(r"\b([A-Z]{2}\d{3}[A-Z]{2}|[A-Z]{3}\s?\d{3})\b").unwrap();

    /// VIN: 17 characters, alphabet excludes I, O and Q
    pub static ref VIN_RE: Regex = Regex::new(r"\b([A-HJ-NPR-Z0-9]{17})\b").unwrap();

    /// CUIT/CUIL, with or without dashes; only the valid two-digit prefixes
    pub static ref CUIT_RE: Regex =
        Regex::new(r"\b(20|23|24|27|30|33|34)-?\d{8}-?\d\b").unwrap();

    /// Keywords that mark expiry/validity dates
    pub static ref VIGENCY_RE: Regex =
        Regex::new(r"(?i)\b(venc(?:imiento)?|vto\.?|expira|vigencia|validez)\b").unwrap();

    /// Keywords typical of issuing entities
    pub static ref ISSUER_RE: Regex = Regex::new(
        r"(?i)\b(aseguradora|compañ[ií]a|provincia seguros|sancor|zurich|seguro|registro|ministerio|entidad|dnrpa|vtv|verificaci[oó]n)\b"
    )
    .unwrap();

    /// "Firstname Lastname" capitalization, Spanish alphabet included
    pub static ref PERSON_LIKE_RE: Regex =
        Regex::new(r"^[A-ZÁÉÍÓÚÑ][a-záéíóúñ]+(?:\s+[A-ZÁÉÍÓÚÑ][a-záéíóúñ]+)+$").unwrap();

    /// Long alphanumeric blocks that could be malformed VINs
    pub static ref LONG_ALNUM_RE: Regex = Regex::new(r"\b[A-Z0-9]{15,20}\b").unwrap();
}

/// Image-editing software whose fingerprints in Producer/Creator are suspect
pub const SUSPICIOUS_SOFTWARE: &[&str] = &[
    "photoshop",
    "gimp",
    "illustrator",
    "corel",
    "paint.net",
    "canva",
    "inkscape",
];

/// Producers commonly emitted by legitimate document toolchains
pub const TRUSTED_PRODUCERS: &[&str] = &[
    "adobe pdf library",
    "microsoft word",
    "libreoffice",
    "pdf-xchange",
    "foxit",
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn date_matches_both_orders() {
        assert!(DATE_RE.is_match("vence el 01/12/2024"));
        assert!(DATE_RE.is_match("emitido 2024-12-01"));
        assert!(!DATE_RE.is_match("1/2/24"));
    }

    #[test]
    fn plate_matches_both_formats() {
        assert!(PLATE_RE.is_match("dominio AB123CD"));
        assert!(PLATE_RE.is_match("dominio ABC 123"));
        assert!(PLATE_RE.is_match("dominio ABC123"));
        assert!(!PLATE_RE.is_match("A123BCD"));
    }

    #[test]
    fn vin_rejects_ioq() {
        assert!(VIN_RE.is_match("8AD12345678901234"));
        assert!(!VIN_RE.is_match("8AD1234567890123O"));
    }

    #[test]
    fn cuit_requires_known_prefix() {
        assert!(CUIT_RE.is_match("CUIT 20-12345678-3"));
        assert!(CUIT_RE.is_match("30123456781"));
        assert!(!CUIT_RE.is_match("99-12345678-3"));
    }

    #[test]
    fn person_like_requires_two_capitalized_words() {
        assert!(PERSON_LIKE_RE.is_match("Juan Pérez"));
        assert!(!PERSON_LIKE_RE.is_match("Juan"));
        assert!(!PERSON_LIKE_RE.is_match("adobe acrobat"));
    }
}
