//! Entity resolution
//!
//! Handles:
//! - Entities declared in the DOCTYPE internal subset: `&name;`
//! - Built-in entities: `&lt;` `&gt;` `&amp;` `&quot;` `&apos;`
//! - Numeric references to the built-in characters, decimal and hex: `&#60;` `&#x3C;`
//! - Optionally the HTML entity set
//!
//! Uses Cow to avoid copying when no entities are present.
use htmlentity::entity::{ICodedDataTrait, decode};
use indexmap::IndexMap;
use memchr::memchr;
use std::borrow::Cow;

/// Resolves entity references in text and attribute values.
///
/// One resolver is created per parse; DTD-declared entities never leak between documents.
#[derive(Debug, Clone, Default)]
pub struct EntityResolver {
    declared: IndexMap<String, String>,
    html: bool,
}
impl EntityResolver {
    /// Creates a resolver that knows only the built-in entities.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Also resolve the HTML entity set after the declared entities.
    #[must_use]
    pub fn with_html_entities(mut self, enabled: bool) -> Self {
        self.html = enabled;
        self
    }

    /// Add entities declared in a DOCTYPE. The first declaration of a name wins.
    pub fn declare<I>(&mut self, entities: I)
    where
        I: IntoIterator<Item = (String, String)>,
    {
        for (name, value) in entities {
            self.declared.entry(name).or_insert(value);
        }
    }

    /// Number of declared entities.
    #[must_use]
    pub fn declared_len(&self) -> usize {
        self.declared.len()
    }

    /// Replace every entity reference in `text`.
    ///
    /// Declared entities are applied first, in declaration order, so their values may contain
    /// built-in references that are reduced by the final pass.
    #[must_use]
    pub fn resolve<'a>(&self, text: &'a str) -> Cow<'a, str> {
        if memchr(b'&', text.as_bytes()).is_none() {
            return Cow::Borrowed(text);
        }

        let mut text = Cow::Borrowed(text);
        for (name, value) in &self.declared {
            let reference = format!("&{name};");
            if text.contains(&reference) {
                text = Cow::Owned(text.replace(&reference, value));
            }
        }

        if self.html {
            let decoded = decode(text.as_bytes()).to_string();
            return match decoded {
                Ok(decoded) => Cow::Owned(decoded),
                Err(e) => {
                    tracing::warn!("HTML entity decoding failed: {e}");
                    text
                }
            };
        }

        let decoded = match decode_built_in(&text) {
            Cow::Owned(decoded) => Some(decoded),
            Cow::Borrowed(_) => None,
        };
        decoded.map_or(text, Cow::Owned)
    }
}

/// Single pass over `input` replacing built-in references.
///
/// Unknown references and stray `&` are kept as written.
fn decode_built_in(input: &str) -> Cow<'_, str> {
    let bytes = input.as_bytes();
    let Some(first) = memchr(b'&', bytes) else {
        return Cow::Borrowed(input);
    };

    let mut result = String::with_capacity(input.len());
    let mut copied = 0;
    let mut pos = first;

    while pos < bytes.len() {
        let Some(amp) = memchr(b'&', &bytes[pos..]) else {
            break;
        };
        pos += amp;

        let decoded = memchr(b';', &bytes[pos + 1..])
            .and_then(|semi| lookup_built_in(&input[pos + 1..pos + 1 + semi]).map(|c| (c, semi)));

        match decoded {
            Some((c, semi)) => {
                result.push_str(&input[copied..pos]);
                result.push(c);
                pos += semi + 2;
                copied = pos;
            }
            None => pos += 1,
        }
    }

    if copied == 0 {
        return Cow::Borrowed(input);
    }
    result.push_str(&input[copied..]);
    Cow::Owned(result)
}

/// Decode the body of a reference (between `&` and `;`) if it names a built-in character.
fn lookup_built_in(name: &str) -> Option<char> {
    let c = match name {
        "amp" | "#38" | "#x26" => '&',
        "apos" | "#39" | "#x27" => '\'',
        "gt" | "#62" | "#x3E" => '>',
        "lt" | "#60" | "#x3C" => '<',
        "quot" | "#34" | "#x22" => '"',
        _ => return None,
    };
    Some(c)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_entities_is_borrowed() {
        let resolver = EntityResolver::new();
        assert!(matches!(resolver.resolve("plain text"), Cow::Borrowed(_)));
        assert!(matches!(resolver.resolve("a & b"), Cow::Borrowed(_)));
    }

    #[test]
    fn test_built_in() {
        let resolver = EntityResolver::new();
        assert_eq!(resolver.resolve("&lt;hello&gt;"), "<hello>");
        assert_eq!(resolver.resolve("&quot;&apos;&amp;"), "\"'&");
        assert_eq!(resolver.resolve("test&amp;\nmore"), "test&\nmore");
    }

    #[test]
    fn test_single_pass() {
        let resolver = EntityResolver::new();
        assert_eq!(resolver.resolve("&amp;lt;"), "&lt;");
    }

    #[test]
    fn test_numeric_only_for_built_in_characters() {
        let resolver = EntityResolver::new();
        assert_eq!(resolver.resolve("&#60;&#x3C;&#x3E;&#38;&#x22;"), "<<>&\"");
        assert_eq!(resolver.resolve("&#x441;&#65;"), "&#x441;&#65;");

        // Other spellings of the same code points are left alone
        assert_eq!(
            resolver.resolve("&#x3e;&#060;&#x0026;&#X3C;"),
            "&#x3e;&#060;&#x0026;&#X3C;"
        );
    }

    #[test]
    fn test_unknown_and_unterminated() {
        let resolver = EntityResolver::new();
        assert_eq!(resolver.resolve("2foo&ampbar&apos;"), "2foo&ampbar'");
        assert_eq!(resolver.resolve("&nbsp; &"), "&nbsp; &");
    }

    #[test]
    fn test_declared_before_built_in() {
        let mut resolver = EntityResolver::new();
        resolver.declare([
            ("foo".to_string(), "bar".to_string()),
            ("lt2".to_string(), "&lt;&lt;".to_string()),
        ]);
        assert_eq!(resolver.resolve("&foo;/&foo;"), "bar/bar");
        assert_eq!(resolver.resolve("&lt2;"), "<<");
    }

    #[test]
    fn test_first_declaration_wins() {
        let mut resolver = EntityResolver::new();
        resolver.declare([("a".to_string(), "first".to_string())]);
        resolver.declare([("a".to_string(), "second".to_string())]);
        assert_eq!(resolver.declared_len(), 1);
        assert_eq!(resolver.resolve("&a;"), "first");
    }

    #[test]
    fn test_reescape_is_identity() {
        let resolver = EntityResolver::new();
        let source = "a &lt; b &amp;&amp; c &gt; &quot;d&quot; &apos;e&apos;";
        let resolved = resolver.resolve(source);
        let escaped = resolved
            .replace('&', "&amp;")
            .replace('<', "&lt;")
            .replace('>', "&gt;")
            .replace('"', "&quot;")
            .replace('\'', "&apos;");
        assert_eq!(escaped, source);
    }

    #[test]
    fn test_html_entities() {
        let resolver = EntityResolver::new().with_html_entities(true);
        assert_eq!(resolver.resolve("a&nbsp;b &lt;"), "a\u{a0}b <");
    }
}
