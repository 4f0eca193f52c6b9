//! Language code helpers.

/// ISO 639-2 code for an undetermined language.
pub const UNDETERMINED: &str = "und";

/// Known languages: (ISO 639-1, ISO 639-2, English name).
const LANGUAGES: &[(&str, &str, &str)] = &[
    ("ar", "ara", "arabic"),
    ("cs", "ces", "czech"),
    ("da", "dan", "danish"),
    ("de", "deu", "german"),
    ("el", "ell", "greek"),
    ("en", "eng", "english"),
    ("es", "spa", "spanish"),
    ("fi", "fin", "finnish"),
    ("fr", "fra", "french"),
    ("he", "heb", "hebrew"),
    ("hi", "hin", "hindi"),
    ("hu", "hun", "hungarian"),
    ("it", "ita", "italian"),
    ("ja", "jpn", "japanese"),
    ("ko", "kor", "korean"),
    ("nl", "nld", "dutch"),
    ("no", "nor", "norwegian"),
    ("pl", "pol", "polish"),
    ("pt", "por", "portuguese"),
    ("ro", "ron", "romanian"),
    ("ru", "rus", "russian"),
    ("sv", "swe", "swedish"),
    ("th", "tha", "thai"),
    ("tr", "tur", "turkish"),
    ("uk", "ukr", "ukrainian"),
    ("zh", "zho", "chinese"),
];

/// Bibliographic ISO 639-2 variants mapped to their terminology codes.
const BIBLIOGRAPHIC: &[(&str, &str)] = &[
    ("cze", "ces"),
    ("chi", "zho"),
    ("dut", "nld"),
    ("fre", "fra"),
    ("ger", "deu"),
    ("gre", "ell"),
    ("rum", "ron"),
];

/// Normalize a language code or English name to ISO 639-2.
///
/// Returns `None` for anything not recognized.
pub fn normalize_language(value: &str) -> Option<&'static str> {
    let lower = value.trim().to_ascii_lowercase();
    if lower.is_empty() {
        return None;
    }
    if let Some((_, code)) = BIBLIOGRAPHIC.iter().find(|(b, _)| *b == lower) {
        return Some(code);
    }
    LANGUAGES
        .iter()
        .find(|(two, three, name)| *two == lower || *three == lower || *name == lower)
        .map(|(_, three, _)| *three)
}

/// Check if a language tag means "unknown".
pub fn is_undetermined(language: &str) -> bool {
    let trimmed = language.trim();
    trimmed.is_empty() || trimmed.eq_ignore_ascii_case(UNDETERMINED)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalizes_codes_and_names() {
        assert_eq!(normalize_language("en"), Some("eng"));
        assert_eq!(normalize_language("ENG"), Some("eng"));
        assert_eq!(normalize_language("French"), Some("fra"));
        assert_eq!(normalize_language("ger"), Some("deu"));
        assert_eq!(normalize_language("forced"), None);
    }

    #[test]
    fn undetermined_detection() {
        assert!(is_undetermined("und"));
        assert!(is_undetermined(""));
        assert!(!is_undetermined("eng"));
    }
}
