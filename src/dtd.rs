//! DOCTYPE handling
//!
//! Finds where a `<!DOCTYPE ...>` construct ends and collects the internal
//! general entities it declares. Nothing else in the DTD is interpreted.
use crate::{
    StrSpan,
    error::{ErrorContext, XmlError, XmlErrorKind, XmlResult, bail},
};
use memchr::memmem;
use xmlparser::{EntityDefinition, Token, Tokenizer};

const DOCTYPE: &str = "<!DOCTYPE";

/// Markup allowed to open inside the internal subset (comments are skipped separately).
const SUBSET_MARKUP: [&str; 5] = ["<!ENTITY", "<!ELEMENT", "<!ATTLIST", "<!NOTATION", "<?"];

/// An internal general entity declared in a DTD: `<!ENTITY name "value">`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DtdEntity {
    /// The name of the entity.
    pub name: String,

    /// The literal replacement text.
    pub value: String,
}

/// A scanned DOCTYPE construct.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Doctype {
    /// The root element name given by the DOCTYPE.
    pub name: String,

    /// Entities declared in the internal subset, in declaration order.
    pub entities: Vec<DtdEntity>,

    /// Index of the `>` that closes the construct.
    pub end: usize,
}
impl Doctype {
    /// The entities as `(name, value)` pairs.
    pub fn entity_pairs(&self) -> impl Iterator<Item = (String, String)> + '_ {
        self.entities
            .iter()
            .map(|e| (e.name.clone(), e.value.clone()))
    }
}

/// Read the DOCTYPE construct starting at `start` (the index of its `<`).
///
/// # Errors
/// - `Unclosed DOCTYPE` if the input ends before the construct is balanced
/// - `Invalid Tag instead of DOCTYPE` if `start` does not begin `<!DOCTYPE`
/// - `Invalid DOCTYPE` for markup other than declarations or comments in the internal subset
pub fn read_doctype(src: &str, start: usize) -> XmlResult<Doctype> {
    let end = find_doctype_end(src, start)?;
    let Some(text) = src.get(start..=end) else {
        bail!(
            src,
            StrSpan::new(src, start, end + 1),
            XmlErrorKind::InvalidDoctypeTag
        );
    };

    let mut doctype = Doctype {
        name: String::new(),
        entities: Vec::new(),
        end,
    };

    for token in Tokenizer::from(text) {
        let token = match token {
            Ok(token) => token,
            Err(e) => {
                return Err(XmlError::new(
                    XmlErrorKind::Dtd(e),
                    ErrorContext::new(src, StrSpan::new(src, start, end + 1)),
                ));
            }
        };

        match token {
            Token::DtdStart { name, .. } | Token::EmptyDtd { name, .. } => {
                doctype.name = name.as_str().to_string();
            }

            Token::EntityDeclaration {
                name,
                definition: EntityDefinition::EntityValue(value),
                ..
            } => {
                doctype.entities.push(DtdEntity {
                    name: name.as_str().to_string(),
                    value: value.as_str().to_string(),
                });
            }

            // External entities and everything else carry no replacement text
            _ => {}
        }
    }

    Ok(doctype)
}

/// Returns the index of the `>` closing the DOCTYPE at `start`.
fn find_doctype_end(src: &str, start: usize) -> XmlResult<usize> {
    if !src.get(start..).is_some_and(|rest| rest.starts_with(DOCTYPE)) {
        bail!(
            src,
            StrSpan::new(src, start, start + 3),
            XmlErrorKind::InvalidDoctypeTag
        );
    }

    let bytes = src.as_bytes();
    let unclosed = StrSpan::new(src, start, src.len());

    let mut pos = start + DOCTYPE.len();
    let mut depth = 1usize;
    let mut in_subset = false;
    let mut quote = None;

    while pos < bytes.len() {
        let b = bytes[pos];
        if let Some(q) = quote {
            if b == q {
                quote = None;
            }
            pos += 1;
            continue;
        }

        match b {
            b'"' | b'\'' => quote = Some(b),
            b'[' if depth == 1 => in_subset = true,
            b']' if depth == 1 => in_subset = false,
            b'<' => {
                let rest = &src[pos..];
                if in_subset && rest.starts_with("<!--") {
                    let Some(len) = memmem::find(&bytes[pos + 4..], b"-->") else {
                        bail!(src, unclosed, XmlErrorKind::UnclosedDoctype);
                    };
                    pos += 4 + len + 3;
                    continue;
                }

                if !in_subset || !SUBSET_MARKUP.iter().any(|m| rest.starts_with(m)) {
                    bail!(
                        src,
                        StrSpan::new(src, pos, pos + 1),
                        XmlErrorKind::InvalidDoctype
                    );
                }
                depth += 1;
            }
            b'>' => {
                depth -= 1;
                if depth == 0 {
                    return Ok(pos);
                }
            }
            _ => {}
        }
        pos += 1;
    }

    bail!(src, unclosed, XmlErrorKind::UnclosedDoctype);
}
