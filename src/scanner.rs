//! The single-pass scanner
//!
//! Walks the (line-ending normalized) input once, recognizing each construct at a `<`
//! by a fixed-length lookahead, and drives the [`TreeBuilder`]:
//! - `</` closing tag
//! - `<?` processing instruction, skipped
//! - `<!--` comment, skipped or captured
//! - `<!D` DOCTYPE, whose entities feed the resolver
//! - `<![` CDATA section
//! - anything else is an opening, self-closing, or unpaired tag
//!
//! Everything between constructs accumulates as pending text, flushed into the current
//! element at the next structural boundary.
use crate::{
    AttributeExtractor, Document, EntityResolver, ParserOptions, Scalar, StrSpan, Value,
    arena::NodeId,
    builder::TreeBuilder,
    coerce,
    dtd::read_doctype,
    error::{XmlErrorKind, XmlResult, bail},
};
use memchr::{memchr, memmem};
use std::borrow::Cow;

/// A reusable parser holding one set of options.
///
/// ```rust
/// use tagtree::{ParserOptions, Scalar, XmlParser};
///
/// let parser = XmlParser::new(ParserOptions::new().ignore_attributes(false));
/// let doc = parser.parse(r#"<item id="7">hello</item>"#).unwrap();
///
/// let item = doc.get("item").and_then(|v| v.as_node()).unwrap();
/// assert_eq!(item.attribute("@_id"), Some(&Scalar::from("7")));
/// ```
#[derive(Debug, Clone, Default)]
pub struct XmlParser {
    options: ParserOptions,
}
impl XmlParser {
    /// Create a parser with the given options.
    #[must_use]
    pub fn new(options: ParserOptions) -> Self {
        Self { options }
    }

    /// The options used by this parser.
    #[must_use]
    pub fn options(&self) -> &ParserOptions {
        &self.options
    }

    /// Parse a document.
    ///
    /// # Errors
    /// Returns an error if a construct is never terminated.
    pub fn parse(&self, src: &str) -> XmlResult<Document> {
        Document::parse_with(src, &self.options)
    }
}

/// Parse `src` into the top-level entries of a document.
pub(crate) fn scan(src: &str, options: &ParserOptions) -> XmlResult<Vec<(String, Value)>> {
    tracing::debug!(len = src.len(), "parsing document");

    let src = normalize_line_endings(src);
    let scanner = Scanner {
        src: &src,
        options,
        entities: EntityResolver::new().with_html_entities(options.html_entities),
        builder: TreeBuilder::new(),
        text: String::new(),
    };
    let children = scanner.run()?;

    tracing::debug!(entries = children.len(), "parsed document");
    Ok(children)
}

/// Replace `\r\n` and lone `\r` with `\n`.
fn normalize_line_endings(src: &str) -> Cow<'_, str> {
    if memchr(b'\r', src.as_bytes()).is_none() {
        return Cow::Borrowed(src);
    }
    Cow::Owned(src.replace("\r\n", "\n").replace('\r', "\n"))
}

/// Per-parse state. Dropped once the tree is returned.
struct Scanner<'a> {
    src: &'a str,
    options: &'a ParserOptions,
    entities: EntityResolver,
    builder: TreeBuilder,

    /// Text seen since the last structural event
    text: String,
}
impl Scanner<'_> {
    fn run(mut self) -> XmlResult<Vec<(String, Value)>> {
        let src = self.src;
        let bytes = src.as_bytes();

        let mut pos = 0;
        while let Some(offset) = memchr(b'<', &bytes[pos..]) {
            let lt = pos + offset;
            self.text.push_str(&src[pos..lt]);

            pos = match &bytes[lt + 1..] {
                [b'/', ..] => self.closing_tag(lt)?,
                [b'?', ..] => self.processing_instruction(lt)?,
                [b'!', b'-', b'-', ..] => self.comment(lt)?,
                [b'!', b'D', ..] => self.doctype(lt)?,
                [b'!', b'[', ..] => self.cdata(lt)?,
                _ => self.opening_tag(lt)?,
            };
        }

        // Trailing text never reaches the tree; open elements are kept as they are
        if self.builder.depth() > 0 {
            tracing::debug!(
                open = self.builder.depth(),
                "input ended with unclosed elements"
            );
        }
        Ok(self.builder.finish())
    }

    /// `</name>`
    fn closing_tag(&mut self, lt: usize) -> XmlResult<usize> {
        let src = self.src;
        let Some(close) = find(src, lt, b">") else {
            bail!(
                src,
                StrSpan::new(src, lt, src.len()),
                XmlErrorKind::UnclosedClosingTag
            );
        };

        let mut name = src[lt + 2..close].trim();
        if self.options.remove_ns_prefix {
            if let Some(colon) = name.find(':') {
                name = &name[colon + 1..];
            }
        }
        tracing::trace!(tag = name, "closing tag");

        // Unpaired tags were never pushed, so there is nothing to close
        if self.options.is_unpaired(name) {
            tracing::debug!(tag = name, "ignoring closing tag of an unpaired tag");
            return Ok(close + 1);
        }
        if self.builder.at_root() {
            bail!(
                src,
                StrSpan::new(src, lt, close + 1),
                XmlErrorKind::UnexpectedClosingTag(name.to_string())
            );
        }

        let current = self.builder.current();
        if self.builder.tag_name(current) != name {
            tracing::debug!(
                expected = self.builder.tag_name(current),
                found = name,
                "closing tag does not match the open element"
            );
        }

        let is_leaf = self.builder.is_leaf(current);
        self.flush_text(current, is_leaf);
        self.builder.close_element();

        Ok(close + 1)
    }

    /// `<?target ...?>`
    fn processing_instruction(&mut self, lt: usize) -> XmlResult<usize> {
        let src = self.src;
        let Some(close) = find(src, lt + 1, b"?>") else {
            bail!(
                src,
                StrSpan::new(src, lt, src.len()),
                XmlErrorKind::UnclosedPi
            );
        };

        tracing::trace!(pi = &src[lt..close + 2], "skipping processing instruction");
        Ok(close + 2)
    }

    /// `<!-- ... -->`
    fn comment(&mut self, lt: usize) -> XmlResult<usize> {
        let src = self.src;
        let Some(close) = find(src, lt + 4, b"-->") else {
            bail!(
                src,
                StrSpan::new(src, lt, src.len()),
                XmlErrorKind::UnclosedComment
            );
        };

        // Without a comment key the surrounding text continues across the comment
        let options = self.options;
        if let Some(key) = &options.comment_prop_name {
            tracing::trace!("capturing comment");
            let current = self.builder.current();
            let is_leaf = self.builder.is_leaf(current);
            self.flush_text(current, is_leaf);

            let comment = Scalar::Text(src[lt + 4..close].to_string());
            self.builder.add_text(current, key, comment);
        }

        Ok(close + 3)
    }

    /// `<!DOCTYPE ...>`
    fn doctype(&mut self, lt: usize) -> XmlResult<usize> {
        let doctype = read_doctype(self.src, lt)?;
        if !doctype.entities.is_empty() {
            tracing::debug!(
                doctype = %doctype.name,
                entities = doctype.entities.len(),
                "DOCTYPE declares entities"
            );
        }

        self.entities.declare(doctype.entity_pairs());
        Ok(doctype.end + 1)
    }

    /// `<![CDATA[ ... ]]>`
    fn cdata(&mut self, lt: usize) -> XmlResult<usize> {
        let src = self.src;
        let Some(close) = find(src, lt + 2, b"]]>") else {
            bail!(
                src,
                StrSpan::new(src, lt, src.len()),
                XmlErrorKind::UnclosedCdata
            );
        };
        let content = src.get(lt + 9..close).unwrap_or_default();
        tracing::trace!(len = content.len(), "CDATA section");

        let current = self.builder.current();
        let is_leaf = self.builder.is_leaf(current);
        self.flush_text(current, is_leaf);

        let options = self.options;
        if !self.builder.at_root() {
            // An empty section is still recorded, as an empty string
            match &options.cdata_prop_name {
                Some(key) => {
                    let jpath = format!("{}.{key}", self.builder.path());
                    let value = self
                        .text_value(content, key, &jpath, false, true, TextSource::Cdata)
                        .unwrap_or_else(|| Scalar::Text(String::new()));
                    self.builder.add_text(current, key, value);
                }
                None => {
                    let tag_name = self.builder.tag_name(current);
                    let jpath = self.builder.path();
                    let value = self
                        .text_value(content, tag_name, jpath, false, true, TextSource::Cdata)
                        .unwrap_or_else(|| Scalar::Text(String::new()));
                    self.builder
                        .add_text(current, &options.text_node_name, value);
                }
            }
        }

        Ok(close + 3)
    }

    /// `<name attrs>`, `<name attrs/>`, or an unpaired `<name attrs>`
    fn opening_tag(&mut self, lt: usize) -> XmlResult<usize> {
        let src = self.src;
        let Some((expr, close)) = read_tag_expression(src, lt + 1) else {
            bail!(
                src,
                StrSpan::new(src, lt, src.len()),
                XmlErrorKind::UnclosedOpeningTag
            );
        };

        let (raw_name, attributes) = split_tag_expression(&expr);
        let (raw_name, attributes, self_closing) = match attributes {
            None => match raw_name.strip_suffix('/') {
                Some(name) => (name, None, true),
                None => (raw_name, None, false),
            },
            Some(attributes) => match attributes.strip_suffix('/') {
                Some(attributes) => (raw_name, Some(attributes), true),
                None => (raw_name, Some(attributes), false),
            },
        };

        let name = match raw_name.find(':') {
            Some(colon) if self.options.remove_ns_prefix => &raw_name[colon + 1..],
            _ => raw_name,
        };
        let unpaired = self.options.is_unpaired(name);
        tracing::trace!(tag = name, self_closing, unpaired, "opening tag");

        let parent = self.builder.current();
        self.flush_text(parent, false);

        let id = self.builder.start_element(name);
        let attributes = attributes.and_then(|expr| {
            AttributeExtractor::new(self.options, &self.entities).extract(expr, self.builder.path())
        });
        self.builder.set_details(id, attributes, close);
        self.builder.add_child(parent, id);

        if self_closing || unpaired {
            self.builder.leave_path();
            return Ok(close + 1);
        }

        self.builder.descend(id);
        if self.options.is_stop_node(self.builder.path()) {
            return self.stop_node(id, raw_name);
        }
        Ok(close + 1)
    }

    /// Capture the content of a stop node verbatim, up to its matching closing tag.
    fn stop_node(&mut self, id: NodeId, raw_name: &str) -> XmlResult<usize> {
        let src = self.src;
        let start = self.builder.start_index(id) + 1;
        let (end, close) = find_stop_node_end(src, raw_name, start)?;

        tracing::debug!(
            path = self.builder.path(),
            len = end - start,
            "captured stop node"
        );
        let raw = Scalar::Text(src[start..end].to_string());
        self.builder
            .replace_children(id, &self.options.text_node_name, raw);
        self.builder.close_element();

        Ok(close + 1)
    }

    /// Move the pending text into `node`. Text at the document level is discarded.
    fn flush_text(&mut self, node: NodeId, is_leaf: bool) {
        if self.text.is_empty() {
            return;
        }
        let text = std::mem::take(&mut self.text);
        if self.builder.at_root() {
            return;
        }

        let has_attributes = self.builder.has_attributes(node);
        let tag_name = self.builder.tag_name(node);
        let jpath = self.builder.path();
        let value =
            self.text_value(&text, tag_name, jpath, has_attributes, is_leaf, TextSource::Text);

        match value {
            Some(Scalar::Text(value)) if value.is_empty() => {}
            Some(value) => {
                self.builder
                    .add_text(node, &self.options.text_node_name, value);
            }
            None => {}
        }
    }

    /// Trim, resolve, post-process, and coerce a run of text.
    ///
    /// Returns `None` when nothing is left after trimming.
    fn text_value(
        &self,
        raw: &str,
        tag_name: &str,
        jpath: &str,
        has_attributes: bool,
        is_leaf: bool,
        source: TextSource,
    ) -> Option<Scalar> {
        let value = match source {
            TextSource::Text if self.options.trim_values => raw.trim(),
            _ => raw,
        };
        if value.is_empty() {
            return None;
        }

        let value = match source {
            TextSource::Text if self.options.process_entities => self.entities.resolve(value),
            _ => Cow::Borrowed(value),
        };

        let processed =
            (self.options.tag_value_processor)(tag_name, &*value, jpath, has_attributes, is_leaf);

        Some(match processed {
            None => Scalar::Text(value.into_owned()),

            // Untrimmed text is only coerced when trimming would not have changed it
            Some(Scalar::Text(processed)) if processed == value => {
                if self.options.trim_values || value.trim() == value {
                    coerce(
                        &value,
                        self.options.parse_tag_value,
                        &self.options.number_parse_options,
                    )
                } else {
                    Scalar::Text(value.into_owned())
                }
            }

            Some(processed) => processed,
        })
    }
}

/// Where a run of text came from; CDATA is neither trimmed nor entity-resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TextSource {
    Text,
    Cdata,
}

/// Index of the first `needle` at or after `from`.
fn find(src: &str, from: usize, needle: &[u8]) -> Option<usize> {
    let haystack = src.as_bytes().get(from..)?;
    memmem::find(haystack, needle).map(|offset| from + offset)
}

/// Read a tag expression starting at `start` (just after the `<`), up to the first `>`
/// outside of quotes. Tabs outside of quotes become spaces.
///
/// Returns the expression and the index of the `>`.
fn read_tag_expression(src: &str, start: usize) -> Option<(Cow<'_, str>, usize)> {
    let mut quote = None;
    let mut has_tab = false;

    for (pos, &b) in src.as_bytes().iter().enumerate().skip(start) {
        match (quote, b) {
            (Some(q), _) if b == q => quote = None,
            (Some(_), _) => {}
            (None, b'"' | b'\'') => quote = Some(b),
            (None, b'\t') => has_tab = true,
            (None, b'>') => {
                let expr = &src[start..pos];
                let expr = if has_tab {
                    Cow::Owned(untab(expr))
                } else {
                    Cow::Borrowed(expr)
                };
                return Some((expr, pos));
            }
            _ => {}
        }
    }

    None
}

fn untab(expr: &str) -> String {
    let mut quote = None;
    expr.chars()
        .map(|c| match (quote, c) {
            (Some(q), _) if c == q => {
                quote = None;
                c
            }
            (None, '"' | '\'') => {
                quote = Some(c);
                c
            }
            (None, '\t') => ' ',
            _ => c,
        })
        .collect()
}

/// Split a tag expression into the name and, if present, everything after the first whitespace.
fn split_tag_expression(expr: &str) -> (&str, Option<&str>) {
    match expr.char_indices().find(|(_, c)| c.is_whitespace()) {
        Some((sep, c)) => (&expr[..sep], Some(&expr[sep + c.len_utf8()..])),
        None => (expr, None),
    }
}

/// Find the closing tag of a stop node named `name` whose content starts at `from`.
///
/// Only tags named `name` are looked at, so nested same-named elements are balanced.
/// Comments, CDATA and processing instructions are skipped whole. Any other `<` is text.
///
/// Returns the index of the closing tag's `<` and of its `>`.
fn find_stop_node_end(src: &str, name: &str, from: usize) -> XmlResult<(usize, usize)> {
    let bytes = src.as_bytes();
    let mut depth = 1usize;
    let mut pos = from;

    while let Some(offset) = memchr(b'<', &bytes[pos..]) {
        let lt = pos + offset;
        let next = match &bytes[lt + 1..] {
            [b'/', rest @ ..] => Some(match closing_tag_len(rest, name) {
                Some(len) => {
                    depth -= 1;
                    lt + 2 + len
                }
                None => lt + 1,
            }),
            [b'?', ..] => find(src, lt + 1, b"?>").map(|close| close + 2),
            [b'!', b'-', b'-', ..] => find(src, lt + 4, b"-->").map(|close| close + 3),
            [b'!', b'[', ..] => find(src, lt + 2, b"]]>").map(|close| close + 3),
            rest if opens_tag(rest, name) => Some(match read_tag_expression(src, lt + 1) {
                Some((expr, close)) => {
                    if !expr.ends_with('/') {
                        depth += 1;
                    }
                    close + 1
                }
                None => lt + 1,
            }),
            _ => Some(lt + 1),
        };

        let Some(next) = next else {
            break;
        };
        if depth == 0 {
            return Ok((lt, next - 1));
        }
        pos = next;
    }

    bail!(
        src,
        StrSpan::new(src, from, src.len()),
        XmlErrorKind::UnclosedStopNode(name.to_string())
    );
}

/// Return true if `rest` (after a `<`) starts an opening tag named `name`.
fn opens_tag(rest: &[u8], name: &str) -> bool {
    matches!(
        rest.strip_prefix(name.as_bytes()),
        Some([b'/' | b'>' | b' ' | b'\t' | b'\n', ..])
    )
}

/// Length of `name>` at the start of `rest` (after a `</`), allowing whitespace around the name.
fn closing_tag_len(rest: &[u8], name: &str) -> Option<usize> {
    let leading = rest.iter().take_while(|b| b.is_ascii_whitespace()).count();
    let after = rest[leading..].strip_prefix(name.as_bytes())?;
    let trailing = after.iter().take_while(|b| b.is_ascii_whitespace()).count();
    (after.get(trailing) == Some(&b'>')).then_some(leading + name.len() + trailing + 1)
}
