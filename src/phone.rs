//! Phone number shape rules.

use once_cell::sync::Lazy;
use regex::Regex;

static E164_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\+[0-9]{7,15}$").expect("valid e164 regex"));
static NANP_PLUS_ONE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\+1[1-9][0-9]{1,10}$").expect("valid +1 regex"));
static NANP_ONE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^1[1-9][0-9]{1,10}$").expect("valid 1 regex"));
static NANP_LOCAL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[1-9][0-9]{1,10}$").expect("valid local regex"));

/// `+` followed by 7 to 15 ASCII digits.
pub fn is_e164(number: &str) -> bool {
    E164_RE.is_match(number)
}

/// Rewrite a North American number to `+1…`.
///
/// Spaces, hyphens and parentheses are dropped first. Returns `None` when the input is
/// not recognisably a `+1` number.
pub fn normalize_nanp(raw: &str) -> Option<String> {
    let digits: String = raw
        .chars()
        .filter(|c| !matches!(c, '-' | ' ' | '(' | ')'))
        .collect();
    if NANP_PLUS_ONE_RE.is_match(&digits) {
        Some(digits)
    } else if NANP_ONE_RE.is_match(&digits) {
        Some(format!("+{}", digits))
    } else if NANP_LOCAL_RE.is_match(&digits) {
        Some(format!("+1{}", digits))
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn e164_shape() {
        assert!(is_e164("+15551234567"));
        assert!(is_e164("+1234567"));
        assert!(is_e164("+123456789012345"));
        assert!(!is_e164("5551234567"));
        assert!(!is_e164("+123456"));
        assert!(!is_e164("+1234567890123456"));
        assert!(!is_e164("+1 555 123 4567"));
        assert!(!is_e164("+١٢٣٤٥٦٧٨"));
    }

    #[test]
    fn normalizes_north_american_spellings() {
        for raw in [
            "+12223334444",
            "12223334444",
            "2223334444",
            "(222) 333-4444",
            "222-333-4444",
        ] {
            assert_eq!(normalize_nanp(raw).as_deref(), Some("+12223334444"), "{}", raw);
        }
    }

    #[test]
    fn rejects_other_inputs() {
        assert_eq!(normalize_nanp("+2223334444"), None);
        assert_eq!(normalize_nanp("NOT_A_NUMBER"), None);
        assert_eq!(normalize_nanp(""), None);
    }
}
