/// A cursor for byte-by-byte scanning with position tracking.
///
/// Operates over a string slice while tracking the absolute byte position
/// in the original document (via `base` offset).
#[derive(Clone)]
pub struct Cursor<'a> {
    /// The string being scanned.
    pub s: &'a str,
    /// Base offset in the document (added to local index for absolute positions).
    pub base: usize,
    /// Current local index into `s`.
    pub i: usize,
}

impl<'a> Cursor<'a> {
    /// Creates a new cursor at the start of `s` with the given base offset.
    pub fn new(s: &'a str, base: usize) -> Self {
        Self { s, base, i: 0 }
    }

    /// Returns the current absolute byte position (base + local index).
    pub fn pos(&self) -> usize {
        self.base + self.i
    }

    /// Peeks at the current byte without advancing.
    pub fn peek(&self) -> Option<u8> {
        self.s.as_bytes().get(self.i).copied()
    }

    /// Checks if the remaining input starts with the given byte pattern.
    pub fn starts_with(&self, pat: &[u8]) -> bool {
        self.s
            .as_bytes()
            .get(self.i..)
            .is_some_and(|rest| rest.starts_with(pat))
    }

    /// Consumes `b` if it is the next byte.
    pub fn eat(&mut self, b: u8) -> bool {
        if self.peek() == Some(b) {
            self.i += 1;
            true
        } else {
            false
        }
    }

    /// Consumes `pat` if the remaining input starts with it.
    pub fn eat_str(&mut self, pat: &[u8]) -> bool {
        if self.starts_with(pat) {
            self.i += pat.len();
            true
        } else {
            false
        }
    }

    /// Consumes a run of whitespace, returning how many bytes were eaten.
    pub fn eat_whitespace(&mut self) -> usize {
        let start = self.i;
        while self.peek().is_some_and(is_space) {
            self.i += 1;
        }
        self.i - start
    }

    /// Consumes a block name segment: `[a-z][a-z0-9_-]*`.
    pub fn eat_name(&mut self) -> Option<&'a str> {
        let start = self.i;
        if !self.peek().is_some_and(|b| b.is_ascii_lowercase()) {
            return None;
        }
        self.i += 1;
        while self
            .peek()
            .is_some_and(|b| b.is_ascii_lowercase() || b.is_ascii_digit() || b == b'_' || b == b'-')
        {
            self.i += 1;
        }
        Some(&self.s[start..self.i])
    }
}

/// Whitespace as understood by the delimiter grammar (PCRE `\s`).
pub fn is_space(b: u8) -> bool {
    matches!(b, b' ' | b'\t' | b'\n' | b'\r' | 0x0b | 0x0c)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cursor_basics() {
        let mut cur = Cursor::new("hello", 10);
        assert_eq!(cur.pos(), 10);
        assert_eq!(cur.peek(), Some(b'h'));
        assert!(cur.eat(b'h'));
        assert!(!cur.eat(b'h'));
        assert_eq!(cur.pos(), 11);
    }

    #[test]
    fn cursor_starts_with() {
        let cur = Cursor::new("<!-- wp:", 0);
        assert!(cur.starts_with(b"<!--"));
        assert!(!cur.starts_with(b"-->"));
    }

    #[test]
    fn empty_string_input() {
        let mut cur = Cursor::new("", 0);
        assert_eq!(cur.peek(), None);
        assert!(!cur.eat(b'<'));
        assert_eq!(cur.eat_name(), None);
        assert_eq!(cur.pos(), 0);
    }

    #[test]
    fn starts_with_past_end_is_false() {
        let mut cur = Cursor::new("ab", 0);
        assert!(cur.eat_str(b"ab"));
        assert!(!cur.starts_with(b"a"));
        assert!(!cur.starts_with(b"ab"));
        assert_eq!(cur.peek(), None);
    }

    #[test]
    fn eat_whitespace_counts_bytes() {
        let mut cur = Cursor::new(" \t\nwp", 0);
        assert_eq!(cur.eat_whitespace(), 3);
        assert_eq!(cur.eat_whitespace(), 0);
        assert_eq!(cur.peek(), Some(b'w'));
    }

    #[test]
    fn eat_name_requires_lowercase_start() {
        let mut cur = Cursor::new("my-plugin_2/block", 0);
        assert_eq!(cur.eat_name(), Some("my-plugin_2"));
        assert!(cur.eat(b'/'));
        assert_eq!(cur.eat_name(), Some("block"));

        let mut upper = Cursor::new("Paragraph", 0);
        assert_eq!(upper.eat_name(), None);
        assert_eq!(upper.i, 0);

        let mut digit = Cursor::new("2col", 0);
        assert_eq!(digit.eat_name(), None);
    }

    #[test]
    fn eat_str_only_advances_on_match() {
        let mut cur = Cursor::new("wp:paragraph", 0);
        assert!(!cur.eat_str(b"/wp:"));
        assert!(cur.eat_str(b"wp:"));
        assert_eq!(cur.i, 3);
    }
}
