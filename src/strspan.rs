/// A span of a string in the input XML.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct StrSpan<'a> {
    /// The string slice.
    pub text: &'a str,

    /// The start position of the span in the input XML.
    pub start: usize,
}
impl<'a> StrSpan<'a> {
    /// Create a span covering `src[start..end]`.
    #[must_use]
    pub fn new(src: &'a str, start: usize, end: usize) -> Self {
        let end = end.min(src.len());
        let start = start.min(end);
        StrSpan {
            text: src.get(start..end).unwrap_or_default(),
            start,
        }
    }

    /// Returns the start position of the span in the input XML.
    #[inline]
    #[must_use]
    pub fn start(&self) -> usize {
        self.start
    }

    /// Returns this span as a string slice.
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &'a str {
        self.text
    }

    /// Calculates the row and column of the span in the input XML.
    ///
    /// Warning: This is an expensive operation, and should be used for error reporting only.
    #[must_use]
    pub fn position(&self, source: &str) -> (usize, usize) {
        Self::position_in_text(self.start, source)
    }

    pub(crate) fn position_in_text(start: usize, source: &str) -> (usize, usize) {
        let mut row = 1;
        let mut col = 1;
        for (i, c) in source.char_indices() {
            if i == start {
                break;
            }
            if c == '\n' {
                row += 1;
                col = 1;
            } else {
                col += 1;
            }
        }

        (row, col)
    }
}

/// Owned variant of `StrSpan`, used where the span must outlive the source.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct StringSpan {
    /// The string slice.
    pub text: String,

    /// The start position of the span in the input XML.
    pub start: usize,
}
impl StringSpan {
    /// Calculates the row and column of the span in the input XML.
    ///
    /// Warning: This is an expensive operation, and should be used for error reporting only.
    #[must_use]
    pub fn position(&self, source: &str) -> (usize, usize) {
        StrSpan::position_in_text(self.start, source)
    }

    /// Returns the start position of the span in the input XML.
    #[inline]
    #[must_use]
    pub fn start(&self) -> usize {
        self.start
    }

    /// Returns this span as a string slice.
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.text
    }
}
impl From<StrSpan<'_>> for StringSpan {
    #[inline]
    fn from(span: StrSpan<'_>) -> StringSpan {
        StringSpan {
            text: span.text.to_string(),
            start: span.start,
        }
    }
}
impl AsRef<str> for StringSpan {
    #[inline]
    fn as_ref(&self) -> &str {
        &self.text
    }
}
