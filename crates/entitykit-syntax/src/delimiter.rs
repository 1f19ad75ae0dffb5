//! # Delimiter Scanning
//!
//! Recognizes the three block comment delimiters:
//!
//! ```text
//! <!-- wp:name {"json":true} -->    opener
//! <!-- /wp:name -->                 closer
//! <!-- wp:name {"json":true} /-->   void
//! ```
//!
//! The grammar mirrors the one WordPress core scans for:
//!
//! ```text
//! "<!--" WS+ "/"? "wp:" (NAME "/")? NAME WS+ ("{" ... "}" WS+)? "/"? "-->"
//! NAME = [a-z][a-z0-9_-]*
//! ```
//!
//! The JSON payload runs from the `{` to the first `}` that is followed by
//! whitespace and `-->` or `/-->`. Its contents are not validated here; the
//! processor parses them lazily. Anything failing the grammar is not a
//! delimiter and stays part of the surrounding HTML.

use crate::{
    block_type::CORE_NAMESPACE,
    cursor::{Cursor, is_space},
    span::Span,
};

const COMMENT_OPEN: &str = "<!--";

/// Which of the three delimiter forms was matched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DelimiterType {
    /// `<!-- wp:name -->`, begins a block with children.
    Opener,
    /// `<!-- /wp:name -->`, ends the innermost open block.
    Closer,
    /// `<!-- wp:name /-->`, a self-contained block.
    Void,
}

/// A delimiter found in the source, borrowing its pieces from the document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Delimiter<'a> {
    pub kind: DelimiterType,
    /// Bytes covered by the whole comment.
    pub span: Span,
    /// Explicit namespace, without the trailing `/`.
    pub namespace: Option<&'a str>,
    pub name: &'a str,
    /// Raw JSON payload including its braces.
    pub attrs: Option<&'a str>,
}

impl Delimiter<'_> {
    /// Fully-qualified block type (`core/` prepended when no namespace was written).
    pub fn block_type(&self) -> String {
        format!("{}/{}", self.namespace.unwrap_or(CORE_NAMESPACE), self.name)
    }
}

/// Memo of the last payload terminator search.
///
/// A search starting at `from` that found its first terminator at `end`
/// also answers every search starting in `from..=end`, and a search that
/// found none answers every later one. Carrying this across calls keeps a
/// document full of unterminated `{` payloads a single forward scan.
#[derive(Debug, Clone, Copy, Default)]
pub struct PayloadEnds {
    last: Option<(usize, Option<usize>)>,
    /// Bytes examined by fresh searches.
    scanned: usize,
}

impl PayloadEnds {
    /// Absolute index of the `}` closing a payload that opens at `open`.
    fn find(&mut self, source: &str, open: usize) -> Option<usize> {
        let from = open + 1;
        if let Some((searched, found)) = self.last
            && from >= searched
        {
            match found {
                None => return None,
                Some(end) if from <= end => return Some(end),
                Some(_) => {}
            }
        }

        let bytes = source.as_bytes();
        let found = (from..bytes.len()).find(|&i| bytes[i] == b'}' && closes_comment(bytes, i + 1));
        self.scanned += found.map_or(bytes.len(), |end| end + 1).saturating_sub(from);
        self.last = Some((from, found));
        found
    }

    pub fn scanned(&self) -> usize {
        self.scanned
    }
}

/// Scans a delimiter starting exactly at byte `at`.
pub fn scan_at(source: &str, at: usize) -> Option<Delimiter<'_>> {
    scan_with(source, at, &mut PayloadEnds::default())
}

fn scan_with<'a>(source: &'a str, at: usize, ends: &mut PayloadEnds) -> Option<Delimiter<'a>> {
    let mut cur = Cursor::new(source.get(at..)?, at);

    if !cur.eat_str(COMMENT_OPEN.as_bytes()) || cur.eat_whitespace() == 0 {
        return None;
    }

    let is_closer = cur.eat(b'/');
    if !cur.eat_str(b"wp:") {
        return None;
    }

    let first = cur.eat_name()?;
    let (namespace, name) = if cur.eat(b'/') {
        (Some(first), cur.eat_name()?)
    } else {
        (None, first)
    };

    if cur.eat_whitespace() == 0 {
        return None;
    }

    let attrs = if cur.peek() == Some(b'{') {
        let close = ends.find(source, cur.pos())? - at;
        let json = &cur.s[cur.i..=close];
        cur.i = close + 1;
        cur.eat_whitespace();
        Some(json)
    } else {
        None
    };

    let is_void = cur.eat(b'/');
    if !cur.eat_str(b"-->") {
        return None;
    }

    let kind = if is_closer {
        DelimiterType::Closer
    } else if is_void {
        DelimiterType::Void
    } else {
        DelimiterType::Opener
    };

    Some(Delimiter {
        kind,
        span: Span::from_bounds(at, cur.pos()),
        namespace,
        name,
        attrs,
    })
}

/// Finds the next delimiter at or after byte `from`.
pub fn find_next(source: &str, from: usize) -> Option<Delimiter<'_>> {
    find_next_with(source, from, &mut PayloadEnds::default())
}

/// [`find_next`] sharing a payload memo with earlier calls over the same source.
pub fn find_next_with<'a>(
    source: &'a str,
    from: usize,
    ends: &mut PayloadEnds,
) -> Option<Delimiter<'a>> {
    let mut search = from;
    while let Some(offset) = source.get(search..)?.find(COMMENT_OPEN) {
        let at = search + offset;
        if let Some(delimiter) = scan_with(source, at, ends) {
            return Some(delimiter);
        }
        search = at + 1;
    }
    None
}

/// Whether `bytes[at..]` is `WS+ "/"? "-->"`.
fn closes_comment(bytes: &[u8], at: usize) -> bool {
    let mut i = at;
    while bytes.get(i).copied().is_some_and(is_space) {
        i += 1;
    }
    if i == at {
        return false;
    }
    if bytes.get(i) == Some(&b'/') {
        i += 1;
    }
    bytes.get(i..).is_some_and(|rest| rest.starts_with(b"-->"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    #[test]
    fn scans_opener_without_attrs() {
        let d = scan_at("<!-- wp:paragraph -->", 0).unwrap();
        assert_eq!(d.kind, DelimiterType::Opener);
        assert_eq!(d.name, "paragraph");
        assert_eq!(d.namespace, None);
        assert_eq!(d.attrs, None);
        assert_eq!(d.span, Span::new(0, 21));
        assert_eq!(d.block_type(), "core/paragraph");
    }

    #[test]
    fn scans_void_with_attrs_and_namespace() {
        let src = r#"<!-- wp:acme/hero {"size":"large"} /-->"#;
        let d = scan_at(src, 0).unwrap();
        assert_eq!(d.kind, DelimiterType::Void);
        assert_eq!(d.block_type(), "acme/hero");
        assert_eq!(d.attrs, Some(r#"{"size":"large"}"#));
        assert_eq!(d.span.end(), src.len());
    }

    #[test]
    fn scans_closer() {
        let d = scan_at("<!-- /wp:group -->", 0).unwrap();
        assert_eq!(d.kind, DelimiterType::Closer);
        assert_eq!(d.block_type(), "core/group");
    }

    #[test]
    fn payload_may_contain_braces_and_comment_like_text() {
        let src = r#"<!-- wp:x {"a":{"b":"} -->"}} -->"#;
        let d = scan_at(src, 0).unwrap();
        assert_eq!(d.attrs, Some(r#"{"a":{"b":"}"#));
        // The first `}` followed by ` -->` wins, exactly like the core grammar.
        assert_eq!(d.span.end(), 26);
    }

    #[test]
    fn payload_keeps_nested_objects() {
        let src = r#"<!-- wp:gallery {"ids":[1,2,3],"nested":{"deep":{"value":true}}} /-->"#;
        let d = scan_at(src, 0).unwrap();
        assert_eq!(
            d.attrs,
            Some(r#"{"ids":[1,2,3],"nested":{"deep":{"value":true}}}"#)
        );
    }

    #[rstest]
    #[case("<!-- wp: -->")]
    #[case("<!-- wp:paragr")]
    #[case("<!--wp:paragraph -->")]
    #[case("<!-- wp:paragraph-->")]
    #[case("<!-- wp:Paragraph -->")]
    #[case("<!-- wp:paragraph {\"a\":1}-->")]
    #[case("<!-- wp:paragraph {\"broken\" -->")]
    #[case("<!-- just a comment -->")]
    fn rejects_malformed(#[case] src: &str) {
        assert_eq!(scan_at(src, 0), None);
    }

    #[test]
    fn find_next_skips_plain_comments() {
        let src = "<p>a</p><!-- note --><!-- wp:separator /-->";
        let d = find_next(src, 0).unwrap();
        assert_eq!(d.span.start, 21);
        assert_eq!(d.kind, DelimiterType::Void);
    }

    #[test]
    fn find_next_from_offset() {
        let src = "<!-- wp:a /--><!-- wp:b /-->";
        let d = find_next(src, 1).unwrap();
        assert_eq!(d.name, "b");
        assert_eq!(find_next(src, src.len()), None);
    }

    #[test]
    fn unterminated_payloads_are_scanned_once() {
        let src = "<!-- wp:a {x".repeat(2000);
        let mut ends = PayloadEnds::default();

        assert_eq!(find_next_with(&src, 0, &mut ends), None);
        assert!(ends.scanned() <= src.len());
    }

    #[test]
    fn payload_memo_survives_between_calls() {
        let src = "<!-- wp:a {x<!-- wp:b /-->".repeat(500);
        let mut ends = PayloadEnds::default();
        let mut from = 0;
        let mut found = 0;

        while let Some(d) = find_next_with(&src, from, &mut ends) {
            assert_eq!(d.name, "b");
            from = d.span.end();
            found += 1;
        }

        assert_eq!(found, 500);
        assert!(ends.scanned() <= src.len());
    }

    #[test]
    fn payload_memo_reuses_a_found_terminator() {
        let src = r#"<!-- wp:a {"x <!-- wp:b {"y":1} /-->"#;
        let mut ends = PayloadEnds::default();

        let d = find_next_with(src, 0, &mut ends).unwrap();

        assert_eq!(d.name, "a");
        assert_eq!(d.attrs, Some(r#"{"x <!-- wp:b {"y":1}"#));
        assert_eq!(d.kind, DelimiterType::Void);
    }

    #[test]
    fn whitespace_variants_are_accepted() {
        let src = "<!--\n\twp:paragraph\n-->";
        let d = scan_at(src, 0).unwrap();
        assert_eq!(d.kind, DelimiterType::Opener);
        assert_eq!(d.span.end(), src.len());
    }
}
