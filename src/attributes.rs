//! Attribute extraction
//!
//! Turns the attribute part of a tag (everything after the tag name) into an
//! ordered map of values.
use crate::{AttributeMap, EntityResolver, ParserOptions, Scalar, coerce};
use indexmap::IndexMap;
use memchr::memchr;
use std::borrow::Cow;

/// Extracts attributes from tag expressions using the parser options and the
/// entities known to the current parse.
pub struct AttributeExtractor<'a> {
    options: &'a ParserOptions,
    entities: &'a EntityResolver,
}
impl<'a> AttributeExtractor<'a> {
    /// Create an extractor for one parse.
    #[must_use]
    pub fn new(options: &'a ParserOptions, entities: &'a EntityResolver) -> Self {
        Self { options, entities }
    }

    /// Extract the attributes in `expr`, for the element at `jpath`.
    ///
    /// Returns `None` when attributes are ignored or none survive, never an empty map.
    #[must_use]
    pub fn extract(&self, expr: &str, jpath: &str) -> Option<AttributeMap> {
        if self.options.ignore_attributes {
            return None;
        }

        let mut entries = IndexMap::new();
        for (raw_name, raw_value) in RawAttributes::new(expr) {
            let name = resolve_namespace(raw_name, self.options.remove_ns_prefix);
            if name.is_empty() {
                continue;
            }
            let key = format!("{}{name}", self.options.attribute_name_prefix);

            match raw_value {
                Some(value) => {
                    let value = self.value(name, value, jpath);
                    entries.insert(key, value);
                }
                None if self.options.allow_boolean_attributes => {
                    entries.insert(key, Scalar::Bool(true));
                }
                None => {}
            }
        }

        if entries.is_empty() {
            return None;
        }
        Some(AttributeMap::new(
            self.options.attributes_group_name.clone(),
            entries,
        ))
    }

    fn value(&self, name: &str, value: &str, jpath: &str) -> Scalar {
        let value = if self.options.trim_values {
            value.trim()
        } else {
            value
        };
        let value = if self.options.process_entities {
            self.entities.resolve(value)
        } else {
            Cow::Borrowed(value)
        };

        match (self.options.attribute_value_processor)(name, &*value, jpath) {
            None => Scalar::Text(value.into_owned()),
            Some(Scalar::Text(processed)) if processed == value => coerce(
                &value,
                self.options.parse_attribute_value,
                &self.options.number_parse_options,
            ),
            Some(processed) => processed,
        }
    }
}

/// Apply the namespace policy to an attribute name.
///
/// With `remove_ns_prefix`, `prefix:name` becomes `name` and any `xmlns` declaration
/// becomes the empty name, which callers drop.
#[must_use]
pub fn resolve_namespace(name: &str, remove_ns_prefix: bool) -> &str {
    if !remove_ns_prefix {
        return name;
    }

    let mut parts = name.split(':');
    let first = parts.next().unwrap_or_default();
    if first == "xmlns" {
        return "";
    }
    match (parts.next(), parts.next()) {
        (Some(local), None) => local,
        _ => name,
    }
}

/// Quote-aware tokenizer over an attribute expression, yielding `(name, value)` pairs.
///
/// A name is any run of characters other than whitespace and `=`.
/// A value is only recognized when the name is followed by `=` and a quoted string
/// with a matching closing quote; otherwise the attribute has no value.
struct RawAttributes<'s> {
    src: &'s str,
    pos: usize,
}
impl<'s> RawAttributes<'s> {
    fn new(src: &'s str) -> Self {
        Self { src, pos: 0 }
    }

    fn skip_whitespace(&self, mut pos: usize) -> usize {
        let bytes = self.src.as_bytes();
        while pos < bytes.len() && bytes[pos].is_ascii_whitespace() {
            pos += 1;
        }
        pos
    }
}
impl<'s> Iterator for RawAttributes<'s> {
    type Item = (&'s str, Option<&'s str>);

    fn next(&mut self) -> Option<Self::Item> {
        let bytes = self.src.as_bytes();

        while self.pos < bytes.len()
            && (bytes[self.pos].is_ascii_whitespace() || bytes[self.pos] == b'=')
        {
            self.pos += 1;
        }
        if self.pos >= bytes.len() {
            return None;
        }

        let name_start = self.pos;
        while self.pos < bytes.len()
            && !bytes[self.pos].is_ascii_whitespace()
            && bytes[self.pos] != b'='
        {
            self.pos += 1;
        }
        let name = &self.src[name_start..self.pos];
        self.pos = self.skip_whitespace(self.pos);

        if bytes.get(self.pos) != Some(&b'=') {
            return Some((name, None));
        }

        let quote_pos = self.skip_whitespace(self.pos + 1);
        let quote = match bytes.get(quote_pos) {
            Some(&q @ (b'"' | b'\'')) => q,
            _ => return Some((name, None)),
        };

        let value_start = quote_pos + 1;
        let Some(len) = memchr(quote, &bytes[value_start..]) else {
            return Some((name, None));
        };

        self.pos = value_start + len + 1;
        Some((name, Some(&self.src[value_start..value_start + len])))
    }
}
