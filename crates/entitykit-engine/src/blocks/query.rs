//! Read-only queries over block markup.
//!
//! Every function here drives a fresh [`BlockProcessor`] over the content and
//! materializes only what it returns; nothing is parsed into a tree up front.
//!
//! "Top level" means a block sitting directly in the document. For openers
//! that is depth 1 once the opener is consumed; a void block does not change
//! the depth, so a top-level void is seen at depth 0. [`block_level`] folds
//! both cases into one number.

use entitykit_syntax::{Attributes, Block, BlockProcessor, DelimiterType};
use indexmap::IndexMap;
use serde::Serialize;

/// Nesting level of the block the processor is positioned on, 1 for top level.
///
/// Returns 0 when the current token does not open a block.
pub fn block_level(processor: &BlockProcessor<'_>) -> usize {
    match processor.delimiter_type() {
        Some(DelimiterType::Opener) => processor.depth(),
        Some(DelimiterType::Void) => processor.depth() + 1,
        _ => 0,
    }
}

/// Materializes the block under the cursor, whether void or opener.
///
/// For an opener the cursor ends up on its matching closer.
fn take_block(processor: &mut BlockProcessor<'_>) -> Option<Block> {
    match processor.delimiter_type()? {
        DelimiterType::Void => {
            let name = processor.block_type()?.to_owned();
            let attrs = processor
                .allocate_and_return_parsed_attributes()
                .unwrap_or_default();
            Some(Block::new(name, attrs))
        }
        DelimiterType::Opener => processor.extract_full_block_and_advance(),
        DelimiterType::Closer => None,
    }
}

/// All top-level blocks, freeform HTML excluded.
///
/// Blocks left unclosed at the end of the document are dropped.
pub fn parse_all(content: &str) -> Vec<Block> {
    let mut processor = BlockProcessor::new(content);
    let mut blocks = Vec::new();
    while processor.next_block(None) {
        if block_level(&processor) != 1 {
            continue;
        }
        blocks.extend(take_block(&mut processor));
    }
    blocks
}

/// Every top-level item, freeform HTML runs included, in document order.
///
/// This is the list the editing operations rewrite; serializing it reproduces
/// the document. Markup that does not pair up is kept as freeform text: an
/// orphaned closer as its own bytes, and an opener left unclosed together
/// with everything after it.
pub fn parse_blocks(content: &str) -> Vec<Block> {
    let mut processor = BlockProcessor::new(content);
    let mut blocks = Vec::new();
    while processor.next_token() {
        if let Some(html) = processor.html_content() {
            blocks.push(Block::freeform(html));
            continue;
        }

        let Some(span) = processor.span() else {
            continue;
        };
        if processor.delimiter_type() == Some(DelimiterType::Closer) {
            blocks.extend(span.slice(content).map(Block::freeform));
            continue;
        }

        match take_block(&mut processor) {
            Some(block) => blocks.push(block),
            None => {
                log::debug!("keeping unclosed block at byte {} as freeform", span.start);
                blocks.extend(content.get(span.start..).map(Block::freeform));
                break;
            }
        }
    }
    blocks
}

/// The top-level item at `index`.
///
/// With `skip_freeform` off, every top-level HTML run counts as one freeform
/// item, whitespace between blocks included.
pub fn get_at_index(content: &str, index: i64, skip_freeform: bool) -> Option<Block> {
    let target = usize::try_from(index).ok()?;
    let mut processor = BlockProcessor::new(content);
    let mut current = 0;

    while processor.next_token() {
        let is_item = if processor.is_html() {
            !skip_freeform && processor.depth() == 0
        } else {
            block_level(&processor) == 1
        };
        if !is_item {
            continue;
        }

        if current == target {
            return match processor.html_content() {
                Some(html) => Some(Block::freeform(html)),
                None => take_block(&mut processor),
            };
        }
        current += 1;
    }
    None
}

/// Block counts per type, in the order each type was first seen.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct BlockCounts(IndexMap<String, usize>);

impl BlockCounts {
    fn add(&mut self, block_type: &str) {
        *self.0.entry(block_type.to_owned()).or_default() += 1;
    }

    pub fn get(&self, block_type: &str) -> usize {
        self.0.get(block_type).copied().unwrap_or(0)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, usize)> {
        self.0.iter().map(|(name, count)| (name.as_str(), *count))
    }

    pub fn types(&self) -> Vec<String> {
        self.0.keys().cloned().collect()
    }

    pub fn total(&self) -> usize {
        self.0.values().sum()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Tallies blocks by normalized type. Without `nested`, only top-level blocks count.
pub fn count_by_type(content: &str, nested: bool) -> BlockCounts {
    let mut counts = BlockCounts::default();
    let mut processor = BlockProcessor::new(content);
    while processor.next_block(None) {
        if !nested && block_level(&processor) > 1 {
            continue;
        }
        if let Some(block_type) = processor.block_type() {
            counts.add(block_type);
        }
    }
    counts
}

/// One row of [`list_blocks`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BlockListRow {
    pub block_name: String,
    pub count: usize,
}

/// `count_by_type` as rows of block name and count.
pub fn list_blocks(content: &str, nested: bool) -> Vec<BlockListRow> {
    count_by_type(content, nested)
        .iter()
        .map(|(name, count)| BlockListRow {
            block_name: name.to_owned(),
            count,
        })
        .collect()
}

/// Whether a block of `block_type` appears anywhere, nested or not.
pub fn has_block(content: &str, block_type: &str) -> bool {
    BlockProcessor::new(content).next_block(Some(block_type))
}

/// Number of blocks. Freeform runs count only at top level and only without `skip_freeform`.
pub fn get_block_count(content: &str, nested: bool, skip_freeform: bool) -> usize {
    let mut processor = BlockProcessor::new(content);
    let mut count = 0;
    while processor.next_token() {
        if processor.is_html() {
            if !skip_freeform && processor.depth() == 0 {
                count += 1;
            }
            continue;
        }
        let level = block_level(&processor);
        if level == 1 || (nested && level > 1) {
            count += 1;
        }
    }
    count
}

/// Top-level blocks for which `predicate(block_type, attrs)` holds.
///
/// Stops after `limit` matches; a limit of 0 means no limit.
pub fn extract_matching<F>(content: &str, mut predicate: F, limit: usize) -> Vec<Block>
where
    F: FnMut(&str, &Attributes) -> bool,
{
    let mut processor = BlockProcessor::new(content);
    let mut blocks = Vec::new();

    while processor.next_block(None) {
        if block_level(&processor) != 1 {
            continue;
        }
        let Some(block_type) = processor.block_type().map(str::to_owned) else {
            continue;
        };
        let attrs = processor
            .allocate_and_return_parsed_attributes()
            .unwrap_or_default();
        if !predicate(&block_type, &attrs) {
            continue;
        }

        if let Some(block) = take_block(&mut processor) {
            blocks.push(block);
            if limit > 0 && blocks.len() >= limit {
                break;
            }
        }
    }
    blocks
}

/// Byte range of a top-level block, delimiters included.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BlockSpan {
    pub start: usize,
    pub end: usize,
}

/// Where the top-level named block at `index` sits in `content`.
///
/// An opener whose closer is missing extends to the end of the document.
pub fn get_block_span(content: &str, index: i64) -> Option<BlockSpan> {
    let target = usize::try_from(index).ok()?;
    let mut processor = BlockProcessor::new(content);
    let mut current = 0;

    while processor.next_block(None) {
        if block_level(&processor) != 1 {
            continue;
        }
        if current < target {
            current += 1;
            continue;
        }

        let start = processor.span()?;
        if processor.delimiter_type() == Some(DelimiterType::Void) {
            return Some(BlockSpan {
                start: start.start,
                end: start.end(),
            });
        }

        let end = match processor.extract_full_block_and_advance() {
            Some(_) => processor.span().map_or(content.len(), |closer| closer.end()),
            None => content.len(),
        };
        return Some(BlockSpan {
            start: start.start,
            end,
        });
    }
    None
}

/// Distinct block types in first-seen order.
pub fn get_block_types(content: &str, nested: bool) -> Vec<String> {
    count_by_type(content, nested).types()
}

/// Whether the content holds any block at all.
pub fn has_blocks(content: &str) -> bool {
    BlockProcessor::new(content).next_block(None)
}

/// Drops freeform entries, keeping the order of the rest.
pub fn filter_empty_blocks(blocks: Vec<Block>) -> Vec<Block> {
    blocks
        .into_iter()
        .filter(|block| block.block_name.as_deref().is_some_and(|name| !name.is_empty()))
        .collect()
}
