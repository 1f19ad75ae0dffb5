//! # entitykit-syntax
//!
//! A streaming tokenizer for WordPress block markup: HTML interleaved with
//! block comment delimiters.
//!
//! ```text
//! <!-- wp:group {"layout":{"type":"flex"}} -->   opener
//! <div class="wp-block-group">                    html
//! <!-- wp:separator /-->                          void
//! </div>                                          html
//! <!-- /wp:group -->                              closer
//! ```
//!
//! ## Architecture Overview
//!
//! ```text
//! Source Text → delimiter scan → BlockProcessor → tokens / Block values → serialize
//!               (Cursor)         (breadcrumbs)                            (wp comments)
//! ```
//!
//! ### 1. Delimiters ([`delimiter`] module)
//!
//! A byte [`cursor`] recognizes the three comment forms. Anything else,
//! malformed delimiters included, is HTML.
//!
//! ### 2. Processor ([`processor`] module)
//!
//! [`BlockProcessor`] hands out one token at a time and tracks the stack of
//! open blocks. It never fails: unbalanced closers become [`Diagnostic`]s.
//! On an opener it can materialize the whole block as a [`Block`].
//!
//! ### 3. Serializer ([`serialize`] module)
//!
//! Writes [`Block`] values back to markup. Parsing then serializing an
//! unedited document reproduces it byte for byte.
//!
//! ## Module Structure
//!
//! ```text
//! entitykit-syntax/
//! ├── lib.rs          # This file - public API and fixture tests
//! ├── span.rs         # Byte ranges into the source
//! ├── cursor.rs       # Byte scanner used by the delimiter grammar
//! ├── block_type.rs   # core/ namespace normalization and type filters
//! ├── delimiter.rs    # Opener / closer / void recognition
//! ├── block.rs        # Block model (blockName, attrs, innerBlocks, ...)
//! ├── processor.rs    # BlockProcessor tokenizer
//! └── serialize.rs    # Block → markup
//! ```
//!
//! ## Quick Start
//!
//! ```
//! use entitykit_syntax::{BlockProcessor, serialize_block};
//!
//! let source = r#"<!-- wp:heading {"level":2} --><h2>Hi</h2><!-- /wp:heading -->"#;
//! let mut processor = BlockProcessor::new(source);
//!
//! assert!(processor.next_block(Some("heading")));
//! let block = processor.extract_full_block_and_advance().unwrap();
//! assert_eq!(block.attrs["level"], 2);
//! assert_eq!(serialize_block(&block), source);
//! ```

pub mod block;
pub mod block_type;
pub mod cursor;
pub mod delimiter;
pub mod processor;
pub mod serialize;
pub mod span;

pub use block::{Attributes, Block};
pub use block_type::{matches_filter, normalize_block_type, strip_core_namespace};
pub use delimiter::DelimiterType;
pub use processor::{BlockProcessor, Diagnostic};
pub use serialize::{
    comment_delimited_block_content, serialize_block, serialize_block_attributes,
    serialize_blocks,
};
pub use span::Span;
