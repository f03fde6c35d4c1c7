//! Numeric literal recognition.
//!
//! A string only becomes a number when it can be converted without losing
//! anything the author wrote: `1.50` is `1.5`, but `0.1000000000000000055511` stays text.
use crate::NumberOptions;
use once_cell::sync::Lazy;
use regex::Regex;

static HEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^([-+])?0x([a-fA-F0-9]+)$").expect("valid regex"));

static DECIMAL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^([-+])?(0*)(\.[0-9]+([eE]-?[0-9]+)?|[0-9]+(\.[0-9]+)?([eE]-?[0-9]+)?)$")
        .expect("valid regex")
});

/// A number recognized in text.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Number {
    /// A literal without fractional part or exponent
    Integer(i64),

    /// Any other literal
    Float(f64),
}

/// Converts `text` into a number if it is a valid literal under `options`.
///
/// Returns `None` for anything else; the caller keeps the original string.
#[must_use]
pub fn to_number(text: &str, options: &NumberOptions) -> Option<Number> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return None;
    }

    if let Some(skip) = &options.skip_like {
        if skip.is_match(trimmed) {
            return None;
        }
    }

    if options.hex {
        if let Some(caps) = HEX.captures(trimmed) {
            let value = i64::from_str_radix(&caps[2], 16).ok()?;
            return Some(match caps.get(1).map(|m| m.as_str()) {
                Some("-") => Number::Integer(-value),
                _ => Number::Integer(value),
            });
        }
    }

    let caps = DECIMAL.captures(trimmed)?;
    let sign = caps.get(1).map_or("", |m| m.as_str());
    let leading_zeros = caps.get(2).map_or("", |m| m.as_str());
    let body = caps.get(3).map_or("", |m| m.as_str());
    let has_exponent = caps.get(4).is_some() || caps.get(6).is_some();

    if !options.leading_zeros && !leading_zeros.is_empty() {
        // A single zero before the decimal point is not a leading zero
        if !trimmed[sign.len() + 1..].starts_with('.') {
            return None;
        }
    }

    if has_exponent {
        if !options.e_notation {
            return None;
        }
        return trimmed.parse::<f64>().ok().map(Number::Float);
    }

    if body.contains('.') {
        let value = trimmed.parse::<f64>().ok()?;
        let expected = trim_zeros(body);
        let rendered = value.to_string();
        if rendered == expected || (sign == "-" && rendered == format!("-{expected}")) {
            return Some(Number::Float(value));
        }
        return None;
    }

    format!("{sign}{body}").parse::<i64>().ok().map(Number::Integer)
}

/// Removes insignificant zeros from the fractional part: `.500` -> `0.5`, `3.0` -> `3`.
fn trim_zeros(body: &str) -> String {
    let trimmed = body.trim_end_matches('0');
    if trimmed == "." {
        "0".to_string()
    } else if let Some(fraction) = trimmed.strip_prefix('.') {
        format!("0.{fraction}")
    } else if let Some(whole) = trimmed.strip_suffix('.') {
        whole.to_string()
    } else {
        trimmed.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(text: &str) -> Option<Number> {
        to_number(text, &NumberOptions::default())
    }

    #[test]
    fn test_integers() {
        assert_eq!(parse("2"), Some(Number::Integer(2)));
        assert_eq!(parse("-12"), Some(Number::Integer(-12)));
        assert_eq!(parse("+7"), Some(Number::Integer(7)));
        assert_eq!(parse(" 42 "), Some(Number::Integer(42)));
        assert_eq!(parse("0"), Some(Number::Integer(0)));
    }

    #[test]
    fn test_not_numbers() {
        assert_eq!(parse(""), None);
        assert_eq!(parse("abc"), None);
        assert_eq!(parse("1a"), None);
        assert_eq!(parse("1."), None);
        assert_eq!(parse("1 2"), None);
        assert_eq!(parse("99999999999999999999"), None);
    }

    #[test]
    fn test_decimals() {
        assert_eq!(parse("1.5"), Some(Number::Float(1.5)));
        assert_eq!(parse("1.50"), Some(Number::Float(1.5)));
        assert_eq!(parse("-0.25"), Some(Number::Float(-0.25)));
        assert_eq!(parse(".5"), Some(Number::Float(0.5)));
        assert_eq!(parse("3.0"), Some(Number::Float(3.0)));
        assert_eq!(parse("0.1000000000000000055511"), None);
    }

    #[test]
    fn test_hex() {
        assert_eq!(parse("0x1F"), Some(Number::Integer(31)));
        assert_eq!(parse("-0x10"), Some(Number::Integer(-16)));

        let options = NumberOptions {
            hex: false,
            ..NumberOptions::default()
        };
        assert_eq!(to_number("0x1F", &options), None);
    }

    #[test]
    fn test_leading_zeros() {
        assert_eq!(parse("007"), Some(Number::Integer(7)));

        let options = NumberOptions {
            leading_zeros: false,
            ..NumberOptions::default()
        };
        assert_eq!(to_number("007", &options), None);
        assert_eq!(to_number("0.5", &options), Some(Number::Float(0.5)));
        assert_eq!(to_number("-0.5", &options), Some(Number::Float(-0.5)));
    }

    #[test]
    fn test_exponent() {
        assert_eq!(parse("1e3"), Some(Number::Float(1000.0)));
        assert_eq!(parse("1.5E-2"), Some(Number::Float(0.015)));

        let options = NumberOptions {
            e_notation: false,
            ..NumberOptions::default()
        };
        assert_eq!(to_number("1e3", &options), None);
    }

    #[test]
    fn test_skip_like() {
        let options = NumberOptions {
            skip_like: Some(Regex::new(r"^\+").unwrap()),
            ..NumberOptions::default()
        };
        assert_eq!(to_number("+91", &options), None);
        assert_eq!(to_number("91", &options), Some(Number::Integer(91)));
    }
}
