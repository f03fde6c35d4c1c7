//! Error handling for XML parsing
use super::{StrSpan, StringSpan};

/// A result type for XML parsing, which can be either a successful value or an error.
pub type XmlResult<T> = std::result::Result<T, XmlError>;

/// Build an [`XmlError`] pointing into the source and return it from the current function.
///
/// `bail!(src, span, kind)`
macro_rules! bail {
    ($src:expr, $span:expr, $kind:expr) => {
        return Err($crate::error::XmlError::new(
            $kind,
            $crate::error::ErrorContext::new($src, $span),
        ))
    };
}
pub(crate) use bail;

/// An error that occurred while parsing a document.
///
/// All errors are fatal; the parser never returns a partial tree.
#[derive(Debug)]
pub struct XmlError {
    /// The context of the error
    pub context: Box<ErrorContext>,

    /// The kind of error that occurred while parsing a document
    pub kind: XmlErrorKind,
}
impl XmlError {
    /// Creates a new `XmlError`
    #[must_use]
    pub fn new(kind: XmlErrorKind, context: ErrorContext) -> Self {
        Self {
            context: Box::new(context),
            kind,
        }
    }

    /// The fixed message of the error, without location information.
    #[must_use]
    pub fn message(&self) -> String {
        self.kind.to_string()
    }
}
impl std::fmt::Display for XmlError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.context)?;

        for line in self.kind.to_string().lines() {
            writeln!(f, "= {line}")?;
        }
        Ok(())
    }
}
impl std::error::Error for XmlError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.kind)
    }
}

/// The kind of error that occurred while parsing a document.
///
/// The messages of the `Unclosed*` variants are part of the public contract and never change.
#[derive(Debug, thiserror::Error)]
pub enum XmlErrorKind {
    /// A `<!DOCTYPE` construct was never terminated
    #[error("Unclosed DOCTYPE")]
    UnclosedDoctype,

    /// A `<!--` comment was never terminated
    #[error("Unclosed Comment")]
    UnclosedComment,

    /// A `<![CDATA[` section was never terminated
    #[error("Unclosed CDATA")]
    UnclosedCdata,

    /// A `</name` closing tag has no `>`
    #[error("Closing Tag is not closed.")]
    UnclosedClosingTag,

    /// A `<?` processing instruction has no `?>`
    #[error("Pi Tag is not closed.")]
    UnclosedPi,

    /// An opening tag has no un-quoted `>`
    #[error("Opening Tag is not closed.")]
    UnclosedOpeningTag,

    /// A stop node's content runs to the end of the input without its closing tag
    #[error("Unexpected end of {0}")]
    UnclosedStopNode(String),

    /// A closing tag appeared while no element was open
    #[error("Closing tag </{0}> has no matching opening tag")]
    UnexpectedClosingTag(String),

    /// `<!D` was not the start of `<!DOCTYPE`
    #[error("Invalid Tag instead of DOCTYPE")]
    InvalidDoctypeTag,

    /// The internal subset contained markup other than declarations and comments
    #[error("Invalid DOCTYPE")]
    InvalidDoctype,

    /// The DOCTYPE declarations could not be tokenized
    #[error("Invalid DOCTYPE: {0}")]
    Dtd(#[from] xmlparser::Error),
}

/// Context describing the error location in the source code.
#[derive(Debug, Clone)]
pub struct ErrorContext {
    /// Full source code of the document that was parsed, for row/col calculation.
    pub source: String,

    /// Position of the error in the source code.
    pub span: StringSpan,
}
impl ErrorContext {
    /// Creates a new `ErrorContext` with the given source, and span.
    #[must_use]
    pub fn new(source: &str, span: StrSpan) -> Self {
        Self {
            source: source.to_string(),
            span: span.into(),
        }
    }

    /// Returns the row and column of the error in the source code.
    #[must_use]
    pub fn position(&self) -> (usize, usize) {
        self.span.position(&self.source)
    }
}
impl std::fmt::Display for ErrorContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let span = self.span.as_ref();
        let line = span.split('\n').next().unwrap_or(span);

        let (row, col) = self.span.position(&self.source);

        if !line.is_empty() {
            writeln!(f, "| {line}")?;
        }

        if self.span.start() > 0 {
            writeln!(f, "= At {row}:{col}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixed_messages() {
        assert_eq!(XmlErrorKind::UnclosedDoctype.to_string(), "Unclosed DOCTYPE");
        assert_eq!(XmlErrorKind::UnclosedComment.to_string(), "Unclosed Comment");
        assert_eq!(XmlErrorKind::UnclosedCdata.to_string(), "Unclosed CDATA");
        assert_eq!(
            XmlErrorKind::UnclosedClosingTag.to_string(),
            "Closing Tag is not closed."
        );
        assert_eq!(XmlErrorKind::UnclosedPi.to_string(), "Pi Tag is not closed.");
    }

    #[test]
    fn test_display_with_position() {
        let src = "<a>\n  <!-- oops";
        let err = XmlError::new(
            XmlErrorKind::UnclosedComment,
            ErrorContext::new(src, StrSpan::new(src, 6, src.len())),
        );
        let display = err.to_string();
        assert!(display.contains("| <!-- oops"));
        assert!(display.contains("= At 2:3"));
        assert!(display.ends_with("= Unclosed Comment\n"));
        assert_eq!(err.message(), "Unclosed Comment");
    }
}
