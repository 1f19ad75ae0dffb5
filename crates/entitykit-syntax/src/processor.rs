//! # Block Processor - Streaming Tokenizer
//!
//! [`BlockProcessor`] walks a document one token at a time. A token is either
//! a run of HTML or one of the three block delimiters (see [`crate::delimiter`]).
//!
//! ```text
//! "<p>a</p><!-- wp:group --><!-- wp:separator /--><!-- /wp:group -->"
//!  Html      Opener(group)   Void(separator)       Closer(group)
//!  depth 0   depth 1         depth 1               depth 0
//! ```
//!
//! ## State
//!
//! The processor never builds a tree while scanning. The only state that
//! grows with the document is the breadcrumb stack of open block types, so
//! memory is bounded by nesting depth, not document size. Attribute JSON is
//! parsed on demand and memoized for the current token only.
//!
//! ## Malformed Markup
//!
//! Scanning never fails. Text that does not match the delimiter grammar is
//! HTML. A closer always closes the innermost open block; if the names differ
//! a [`Diagnostic::MismatchedCloser`] is recorded, and a closer with nothing
//! open is recorded as [`Diagnostic::OrphanedCloser`].
//!
//! ## Example
//!
//! ```
//! use entitykit_syntax::{BlockProcessor, DelimiterType};
//!
//! let mut processor = BlockProcessor::new("<!-- wp:group --><!-- wp:separator /--><!-- /wp:group -->");
//!
//! assert!(processor.next_block(None));
//! assert_eq!(processor.block_type(), Some("core/group"));
//! assert_eq!(processor.depth(), 1);
//!
//! assert!(processor.next_block(Some("separator")));
//! assert_eq!(processor.delimiter_type(), Some(DelimiterType::Void));
//! assert_eq!(processor.breadcrumbs(), ["core/group".to_string()]);
//! ```

use std::fmt;

use crate::{
    block::{Attributes, Block},
    block_type::matches_filter,
    cursor::is_space,
    delimiter::{self, Delimiter, DelimiterType, PayloadEnds},
    span::Span,
};

/// A non-fatal problem noticed while scanning.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Diagnostic {
    /// A closer appeared while no block was open.
    OrphanedCloser { block_type: String, span: Span },
    /// A closer's name differs from the innermost open block, which it closed anyway.
    MismatchedCloser {
        expected: String,
        found: String,
        span: Span,
    },
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Diagnostic::OrphanedCloser { block_type, span } => {
                write!(f, "closer for {block_type} at byte {} has no opener", span.start)
            }
            Diagnostic::MismatchedCloser {
                expected,
                found,
                span,
            } => write!(
                f,
                "closer for {found} at byte {} closed {expected}",
                span.start
            ),
        }
    }
}

#[derive(Debug, Clone)]
enum Token<'a> {
    Html(Span),
    Delimiter {
        delimiter: Delimiter<'a>,
        block_type: String,
    },
}

/// Streaming tokenizer over block markup.
pub struct BlockProcessor<'a> {
    source: &'a str,
    /// Bytes consumed so far.
    pos: usize,
    current: Option<Token<'a>>,
    /// Delimiter found while scanning the HTML run in front of it.
    pending: Option<Delimiter<'a>>,
    stack: Vec<String>,
    payload_ends: PayloadEnds,
    /// `None` until the current token's attributes have been parsed.
    parsed_attrs: Option<Option<Attributes>>,
    diagnostics: Vec<Diagnostic>,
}

impl<'a> BlockProcessor<'a> {
    pub fn new(source: &'a str) -> Self {
        Self {
            source,
            pos: 0,
            current: None,
            pending: None,
            stack: Vec::new(),
            payload_ends: PayloadEnds::default(),
            parsed_attrs: None,
            diagnostics: Vec::new(),
        }
    }

    /// The document being scanned.
    pub fn source(&self) -> &'a str {
        self.source
    }

    /// Advances to the next HTML run or delimiter. Returns false at end of input.
    ///
    /// Empty HTML runs (two delimiters back to back) produce no token.
    pub fn next_token(&mut self) -> bool {
        self.parsed_attrs = None;

        if let Some(delimiter) = self.pending.take() {
            self.enter_delimiter(delimiter);
            return true;
        }

        if self.pos >= self.source.len() {
            self.current = None;
            return false;
        }

        match delimiter::find_next_with(self.source, self.pos, &mut self.payload_ends) {
            Some(delimiter) if delimiter.span.start == self.pos => {
                self.enter_delimiter(delimiter);
            }
            Some(delimiter) => {
                self.current = Some(Token::Html(Span::from_bounds(
                    self.pos,
                    delimiter.span.start,
                )));
                self.pos = delimiter.span.start;
                self.pending = Some(delimiter);
            }
            None => {
                self.current = Some(Token::Html(Span::from_bounds(
                    self.pos,
                    self.source.len(),
                )));
                self.pos = self.source.len();
            }
        }
        true
    }

    /// Advances to the next delimiter of any kind, optionally only those matching `filter`.
    pub fn next_delimiter(&mut self, filter: Option<&str>) -> bool {
        while self.next_token() {
            if self.is_html() {
                continue;
            }
            if filter.is_none_or(|f| self.is_block_type(f)) {
                return true;
            }
        }
        false
    }

    /// Advances to the next opener or void delimiter, optionally only those matching `filter`.
    ///
    /// The filter accepts shorthand core names (`paragraph`), full names
    /// (`core/paragraph`, `acme/hero`) and `*`.
    pub fn next_block(&mut self, filter: Option<&str>) -> bool {
        while self.next_delimiter(filter) {
            if self.delimiter_type() != Some(DelimiterType::Closer) {
                return true;
            }
        }
        false
    }

    /// Normalized type of the current delimiter, `None` on HTML.
    pub fn block_type(&self) -> Option<&str> {
        match &self.current {
            Some(Token::Delimiter { block_type, .. }) => Some(block_type),
            _ => None,
        }
    }

    /// Kind of the current delimiter, `None` on HTML.
    pub fn delimiter_type(&self) -> Option<DelimiterType> {
        match &self.current {
            Some(Token::Delimiter { delimiter, .. }) => Some(delimiter.kind),
            _ => None,
        }
    }

    /// Number of open blocks after the current token.
    pub fn depth(&self) -> usize {
        self.stack.len()
    }

    /// Types of the open blocks, outermost first.
    pub fn breadcrumbs(&self) -> &[String] {
        &self.stack
    }

    /// Raw JSON payload of the current opener or void delimiter.
    pub fn raw_attributes(&self) -> Option<&'a str> {
        match &self.current {
            Some(Token::Delimiter { delimiter, .. }) if delimiter.kind != DelimiterType::Closer => {
                delimiter.attrs
            }
            _ => None,
        }
    }

    /// Parses the current delimiter's JSON payload, once per token.
    ///
    /// Returns `None` when there is no payload or it is not a valid JSON object.
    pub fn allocate_and_return_parsed_attributes(&mut self) -> Option<Attributes> {
        if self.parsed_attrs.is_none() {
            let parsed = self.raw_attributes().and_then(|raw| {
                match serde_json::from_str::<serde_json::Value>(raw) {
                    Ok(serde_json::Value::Object(map)) => Some(map),
                    Ok(_) => None,
                    Err(err) => {
                        log::debug!("ignoring invalid block attributes {raw:?}: {err}");
                        None
                    }
                }
            });
            self.parsed_attrs = Some(parsed);
        }
        self.parsed_attrs.clone().flatten()
    }

    /// Materializes the block opened by the current opener.
    ///
    /// Consumes tokens up to and including the matching closer, which becomes
    /// the current token. Nested blocks are built with an explicit stack, so
    /// arbitrarily deep documents cannot overflow the call stack.
    ///
    /// Returns `None` if the current token is not an opener, or if the input
    /// ends before the block is closed.
    pub fn extract_full_block_and_advance(&mut self) -> Option<Block> {
        if self.delimiter_type() != Some(DelimiterType::Opener) {
            return None;
        }

        let mut open = vec![self.current_block()?];

        while self.next_token() {
            match self.delimiter_type() {
                None => {
                    if let (Some(html), Some(top)) = (self.html_content(), open.last_mut()) {
                        top.push_html(html);
                    }
                }
                Some(DelimiterType::Void) => {
                    let block = self.current_block()?;
                    open.last_mut()?.push_inner(block);
                }
                Some(DelimiterType::Opener) => {
                    open.push(self.current_block()?);
                }
                Some(DelimiterType::Closer) => {
                    let done = open.pop()?;
                    match open.last_mut() {
                        Some(parent) => parent.push_inner(done),
                        None => return Some(done),
                    }
                }
            }
        }

        log::debug!(
            "block left unclosed at end of input ({} still open)",
            open.len()
        );
        None
    }

    /// Span of the current token.
    pub fn span(&self) -> Option<Span> {
        match &self.current {
            Some(Token::Html(span)) => Some(*span),
            Some(Token::Delimiter { delimiter, .. }) => Some(delimiter.span),
            None => None,
        }
    }

    pub fn is_html(&self) -> bool {
        matches!(self.current, Some(Token::Html(_)))
    }

    /// Whether the current HTML run contains anything besides whitespace.
    pub fn is_non_whitespace_html(&self) -> bool {
        self.html_content()
            .is_some_and(|html| !html.bytes().all(is_space))
    }

    /// Text of the current HTML run.
    pub fn html_content(&self) -> Option<&'a str> {
        match &self.current {
            Some(Token::Html(span)) => span.slice(self.source),
            _ => None,
        }
    }

    /// Whether the current token opens a block (opener or void), optionally of a given type.
    pub fn opens_block(&self, filter: Option<&str>) -> bool {
        matches!(
            self.delimiter_type(),
            Some(DelimiterType::Opener | DelimiterType::Void)
        ) && filter.is_none_or(|f| self.is_block_type(f))
    }

    /// Whether the current delimiter's type matches `filter`.
    pub fn is_block_type(&self, filter: &str) -> bool {
        self.block_type()
            .is_some_and(|block_type| matches_filter(block_type, filter))
    }

    /// Problems noticed so far.
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    fn current_block(&mut self) -> Option<Block> {
        let name = self.block_type()?.to_owned();
        let attrs = self
            .allocate_and_return_parsed_attributes()
            .unwrap_or_default();
        Some(Block::new(name, attrs))
    }

    fn enter_delimiter(&mut self, delimiter: Delimiter<'a>) {
        let block_type = delimiter.block_type();

        match delimiter.kind {
            DelimiterType::Opener => self.stack.push(block_type.clone()),
            DelimiterType::Closer => match self.stack.pop() {
                Some(open) if open != block_type => {
                    self.record(Diagnostic::MismatchedCloser {
                        expected: open,
                        found: block_type.clone(),
                        span: delimiter.span,
                    });
                }
                Some(_) => {}
                None => self.record(Diagnostic::OrphanedCloser {
                    block_type: block_type.clone(),
                    span: delimiter.span,
                }),
            },
            DelimiterType::Void => {}
        }

        self.pos = delimiter.span.end();
        self.current = Some(Token::Delimiter {
            delimiter,
            block_type,
        });
    }

    fn record(&mut self, diagnostic: Diagnostic) {
        log::debug!("{diagnostic}");
        self.diagnostics.push(diagnostic);
    }
}
