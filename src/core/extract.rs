//! Product code extraction from free-text product names.
//!
//! The code is the content of the first `(...)` group, cut at the first `/`.
//! Annotations that start with a Hangul syllable (`(가나다)`) or that are a
//! count with a unit (`(4단)`) are not codes.

use regex::Regex;
use std::sync::LazyLock;

static PARENTHESIZED: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\((.*?)\)").expect("valid parenthesized pattern"));

static HANGUL_INITIAL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[가-힣]").expect("valid hangul pattern"));

static COUNT_WITH_UNIT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9]+[가-힣]$").expect("valid count pattern"));

pub fn extract_code(product_name: &str) -> Option<String> {
    let candidate = PARENTHESIZED
        .captures(product_name)
        .and_then(|captures| captures.get(1))?
        .as_str();

    let candidate = candidate.split('/').next().unwrap_or(candidate);

    if HANGUL_INITIAL.is_match(candidate) || COUNT_WITH_UNIT.is_match(candidate) {
        return None;
    }

    let code = candidate.trim();
    if code.is_empty() {
        None
    } else {
        Some(code.to_string())
    }
}

/// Join-key form of a code: trimmed and uppercased. Blank codes become `None`.
pub fn normalize_code(code: &str) -> Option<String> {
    let code = code.trim();
    if code.is_empty() {
        None
    } else {
        Some(code.to_uppercase())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_code() {
        assert_eq!(extract_code("상품명(ABC123)"), Some("ABC123".to_string()));
    }

    #[test]
    fn test_no_parentheses() {
        assert_eq!(extract_code("상품명"), None);
        assert_eq!(extract_code(""), None);
        assert_eq!(extract_code("unclosed (ABC"), None);
    }

    #[test]
    fn test_count_with_unit_is_not_a_code() {
        assert_eq!(extract_code("상품명(4단)"), None);
        assert_eq!(extract_code("선반(12개)"), None);
    }

    #[test]
    fn test_hangul_annotation_is_not_a_code() {
        assert_eq!(extract_code("상품명(가나다)"), None);
    }

    #[test]
    fn test_slash_truncates_candidate() {
        assert_eq!(extract_code("상품명(XY/추가설명)"), Some("XY".to_string()));
        assert_eq!(extract_code("상품명(4단/2열)"), None);
    }

    #[test]
    fn test_first_group_wins() {
        assert_eq!(extract_code("A(B1) C(D2)"), Some("B1".to_string()));
        assert_eq!(extract_code("A(가) C(D2)"), None);
    }

    #[test]
    fn test_surrounding_whitespace_is_trimmed() {
        assert_eq!(extract_code("상품( ab-12 )"), Some("ab-12".to_string()));
        assert_eq!(extract_code("상품(   )"), None);
        assert_eq!(extract_code("상품()"), None);
    }

    #[test]
    fn test_digits_with_latin_suffix_is_a_code() {
        assert_eq!(extract_code("볼트(12A)"), Some("12A".to_string()));
    }

    #[test]
    fn test_normalize_code() {
        assert_eq!(normalize_code(" abc123 "), Some("ABC123".to_string()));
        assert_eq!(normalize_code("  "), None);
    }
}
