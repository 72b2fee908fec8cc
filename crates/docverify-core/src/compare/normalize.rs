//! String normalization shared by the result normalizer and the comparators.

use std::str::FromStr;

use lazy_static::lazy_static;
use regex::Regex;
use rust_decimal::Decimal;

lazy_static! {
    static ref WHITESPACE: Regex = Regex::new(r"\s+").unwrap();

    /// Everything that cannot appear in a canonical decimal string.
    static ref NON_NUMERIC: Regex = Regex::new(r"[^0-9.\-]").unwrap();

    /// Number written with a dot decimal separator and no thousands grouping.
    static ref DOT_DECIMAL: Regex = Regex::new(r"^-?[0-9]+\.[0-9]{1,2}$").unwrap();
}

/// Trim, collapse whitespace runs and replace the typographic apostrophe.
///
/// `None` normalizes to an empty string.
pub fn normalize_text<'a>(s: impl Into<Option<&'a str>>) -> String {
    let Some(s) = s.into() else {
        return String::new();
    };

    let s = s.trim().replace('\u{2019}', "'");
    WHITESPACE.replace_all(&s, " ").into_owned()
}

/// Convert Brazilian-formatted numbers to dot-decimal and drop every other
/// character.
///
/// `"1.234,56"` becomes `"1234.56"`. The result may still fail to parse when
/// the input had no numeric content.
pub fn normalize_value<'a>(s: impl Into<Option<&'a str>>) -> String {
    let Some(s) = s.into() else {
        return String::new();
    };

    let s = s.trim().replace('.', "").replace(',', ".");
    NON_NUMERIC.replace_all(&s, "").into_owned()
}

/// Parse a numeric value out of OCR or metadata text.
///
/// Text that is unambiguously dot-decimal (`"150.00"`, `"R$ 7.5"`) is read
/// as-is; everything else goes through [`normalize_value`].
pub fn parse_decimal(s: &str) -> Option<Decimal> {
    let candidate: String = s
        .trim()
        .chars()
        .filter(|c| c.is_ascii_digit() || matches!(c, '.' | ',' | '-'))
        .collect();

    if DOT_DECIMAL.is_match(&candidate) {
        return Decimal::from_str(&candidate).ok();
    }

    Decimal::from_str(&normalize_value(s)).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn test_normalize_text() {
        assert_eq!(normalize_text("  Maria   da\tSilva \n"), "Maria da Silva");
        assert_eq!(normalize_text("D\u{2019}Ávila"), "D'Ávila");
        assert_eq!(normalize_text(None), "");
    }

    #[test]
    fn test_normalize_value() {
        assert_eq!(normalize_value("1.234,56"), "1234.56");
        assert_eq!(normalize_value("R$ 10,00"), "10.00");
        assert_eq!(normalize_value("-5,5"), "-5.5");
        assert_eq!(normalize_value("Total"), "");
        assert_eq!(normalize_value(None), "");
    }

    #[test]
    fn test_parse_decimal_brazilian() {
        assert_eq!(parse_decimal("1.234,56"), Some(dec("1234.56")));
        assert_eq!(parse_decimal("R$ 10,00"), Some(dec("10.00")));
        assert_eq!(parse_decimal("1.234"), Some(dec("1234")));
        assert_eq!(parse_decimal("12.345.678"), Some(dec("12345678")));
    }

    #[test]
    fn test_parse_decimal_dot_decimal() {
        assert_eq!(parse_decimal("150.00"), Some(dec("150.00")));
        assert_eq!(parse_decimal("R$ 7.5"), Some(dec("7.5")));
        assert_eq!(parse_decimal("-0.99"), Some(dec("-0.99")));
    }

    #[test]
    fn test_parse_decimal_rejects_non_numeric() {
        assert_eq!(parse_decimal("Razão Social"), None);
        assert_eq!(parse_decimal(""), None);
        assert_eq!(parse_decimal("-"), None);
        assert_eq!(parse_decimal("1-2"), None);
    }
}
