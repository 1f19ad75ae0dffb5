use serde::Serialize;

/// A byte range into the source document, stored as `start` plus `length`.
///
/// Tokens never copy text out of the document; slicing the source with a
/// span reproduces the exact bytes the token was scanned from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct Span {
    /// Inclusive start byte offset.
    pub start: usize,
    /// Length in bytes.
    pub length: usize,
}

impl Span {
    pub fn new(start: usize, length: usize) -> Self {
        Self { start, length }
    }

    /// Builds a span from a `[start, end)` pair. Uses saturating subtraction for safety.
    pub fn from_bounds(start: usize, end: usize) -> Self {
        Self {
            start,
            length: end.saturating_sub(start),
        }
    }

    /// Exclusive end byte offset.
    #[must_use]
    pub fn end(self) -> usize {
        self.start + self.length
    }

    #[must_use]
    pub fn is_empty(self) -> bool {
        self.length == 0
    }

    /// Returns the text this span covers, or `None` if it falls outside `source`
    /// or does not sit on character boundaries.
    pub fn slice(self, source: &str) -> Option<&str> {
        source.get(self.start..self.end())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn end_is_start_plus_length() {
        let span = Span::new(6, 20);
        assert_eq!(span.end(), 26);
        assert!(!span.is_empty());
    }

    #[test]
    fn from_bounds_saturates() {
        assert_eq!(Span::from_bounds(10, 4), Span::new(10, 0));
        assert!(Span::from_bounds(10, 4).is_empty());
    }

    #[test]
    fn slice_returns_covered_text() {
        let source = "Before<!-- wp:separator /-->";
        assert_eq!(Span::new(0, 6).slice(source), Some("Before"));
        assert_eq!(Span::new(20, 50).slice(source), None);
    }
}
