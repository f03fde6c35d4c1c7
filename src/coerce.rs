//! Turning text into booleans and numbers.
use crate::{Number, NumberOptions, Scalar, to_number};

/// Decide whether `text` becomes a boolean, a number, or stays a string.
///
/// With coercion disabled the text is returned as-is.
/// Otherwise the exact (trimmed) literals `true` / `false` become booleans,
/// and anything [`to_number`] accepts becomes a number.
#[must_use]
pub fn coerce(text: &str, enabled: bool, options: &NumberOptions) -> Scalar {
    if !enabled {
        return Scalar::Text(text.to_string());
    }

    match text.trim() {
        "true" => Scalar::Bool(true),
        "false" => Scalar::Bool(false),
        _ => match to_number(text, options) {
            Some(Number::Integer(value)) => Scalar::Integer(value),
            Some(Number::Float(value)) => Scalar::Float(value),
            None => Scalar::Text(text.to_string()),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_disabled_keeps_text() {
        let options = NumberOptions::default();
        assert_eq!(coerce("2", false, &options), Scalar::Text("2".to_string()));
        assert_eq!(coerce("", false, &options), Scalar::Text(String::new()));
        assert_eq!(coerce("true", false, &options), Scalar::Text("true".to_string()));
    }

    #[test]
    fn test_booleans_are_case_sensitive() {
        let options = NumberOptions::default();
        assert_eq!(coerce("true", true, &options), Scalar::Bool(true));
        assert_eq!(coerce(" false ", true, &options), Scalar::Bool(false));
        assert_eq!(coerce("True", true, &options), Scalar::Text("True".to_string()));
    }

    #[test]
    fn test_numbers() {
        let options = NumberOptions::default();
        assert_eq!(coerce("2", true, &options), Scalar::Integer(2));
        assert_eq!(coerce("2.5", true, &options), Scalar::Float(2.5));
        assert_eq!(coerce("2 apples", true, &options), Scalar::Text("2 apples".to_string()));
    }
}
