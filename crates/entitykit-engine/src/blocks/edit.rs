//! Edits on a document's top-level block list.
//!
//! The list comes from [`parse_blocks`](super::parse_blocks) and still holds
//! the freeform runs between blocks, so serializing it after an edit keeps the
//! surrounding whitespace. Operations that take an index count named blocks
//! only, the way a user numbers the blocks they can see.

use std::{fmt, str::FromStr};

use entitykit_syntax::{Attributes, Block, normalize_block_type};

use super::sync::sync_html;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EditError {
    #[error("Invalid index: {index}. Content has {count} block(s) (0-indexed).")]
    InvalidIndex { index: usize, count: usize },
    #[error("Invalid position: {position}. Must be between 0 and {len}.")]
    InvalidPosition { position: usize, len: usize },
}

/// Positions of the named blocks within the raw list.
fn named_positions(blocks: &[Block]) -> Vec<usize> {
    blocks
        .iter()
        .enumerate()
        .filter(|(_, block)| !block.is_freeform())
        .map(|(i, _)| i)
        .collect()
}

fn resolve(blocks: &[Block], index: usize) -> Result<usize, EditError> {
    let positions = named_positions(blocks);
    positions
        .get(index)
        .copied()
        .ok_or(EditError::InvalidIndex {
            index,
            count: positions.len(),
        })
}

/// Builds a new block. Content that does not start with a tag is wrapped in `<p>`.
pub fn create_block(name: &str, attrs: Attributes, content: &str) -> Block {
    let mut block = Block::new(normalize_block_type(name), attrs);
    if !content.is_empty() {
        if content.starts_with('<') {
            block.push_html(content);
        } else {
            block.push_html(&format!("<p>{content}</p>"));
        }
    }
    block
}

/// Changes applied by [`update_block`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BlockUpdate {
    pub attrs: Option<Attributes>,
    pub content: Option<String>,
    /// Replace the attributes instead of merging into them.
    pub replace_attrs: bool,
}

/// Updates the named block at `index`.
///
/// Attributes are merged key by key unless `replace_attrs` is set. A new
/// heading `level` or list `ordered` attribute also retags the block's HTML
/// (see [`sync_html`]). New content replaces the block's HTML and any blocks
/// nested inside it.
pub fn update_block(
    blocks: &mut [Block],
    index: usize,
    update: BlockUpdate,
) -> Result<(), EditError> {
    let position = resolve(blocks, index)?;
    let block = &mut blocks[position];

    if let Some(attrs) = update.attrs {
        if update.content.is_none() && sync_html(block, &attrs) {
            log::debug!("retagged html of block {index} to follow its attributes");
        }
        if update.replace_attrs {
            block.attrs = attrs;
        } else {
            block.attrs.extend(attrs);
        }
    }

    if let Some(content) = update.content {
        block.inner_blocks.clear();
        block.inner_content = vec![Some(content.clone())];
        block.inner_html = content;
    }

    log::debug!("updated block {index} at list position {position}");
    Ok(())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveOutcome {
    Moved,
    /// Source and destination were the same block.
    Unchanged,
}

/// Moves the named block at `from` so that it becomes named block `to`.
pub fn move_block(blocks: &mut Vec<Block>, from: usize, to: usize) -> Result<MoveOutcome, EditError> {
    let count = named_positions(blocks).len();
    for index in [from, to] {
        if index >= count {
            return Err(EditError::InvalidIndex { index, count });
        }
    }
    if from == to {
        return Ok(MoveOutcome::Unchanged);
    }

    let block = blocks.remove(resolve(blocks, from)?);
    let insert_at = named_positions(blocks)
        .get(to)
        .copied()
        .unwrap_or(blocks.len());
    blocks.insert(insert_at, block);

    log::debug!("moved block {from} to {to}");
    Ok(MoveOutcome::Moved)
}

/// Where [`insert_block`] puts the new block. `Index` addresses the raw list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Position {
    Start,
    End,
    Index(usize),
}

impl FromStr for Position {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "start" => Ok(Position::Start),
            "end" => Ok(Position::End),
            other => other
                .parse()
                .map(Position::Index)
                .map_err(|_| format!("expected start, end or an index, got {other:?}")),
        }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Position::Start => f.write_str("start"),
            Position::End => f.write_str("end"),
            Position::Index(i) => write!(f, "{i}"),
        }
    }
}

pub fn insert_block(
    blocks: &mut Vec<Block>,
    block: Block,
    position: Position,
) -> Result<(), EditError> {
    let at = match position {
        Position::Start => 0,
        Position::End => blocks.len(),
        Position::Index(i) if i <= blocks.len() => i,
        Position::Index(i) => {
            return Err(EditError::InvalidPosition {
                position: i,
                len: blocks.len(),
            });
        }
    };
    blocks.insert(at, block);
    Ok(())
}

/// Which blocks [`remove_blocks`] takes out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RemoveTarget {
    /// Positions in the raw list; out-of-range entries are ignored.
    Indices(Vec<usize>),
    FirstOfType(String),
    AllOfType(String),
}

/// Removes blocks and returns how many went.
pub fn remove_blocks(blocks: &mut Vec<Block>, target: RemoveTarget) -> usize {
    let before = blocks.len();
    match target {
        RemoveTarget::Indices(mut indices) => {
            indices.sort_unstable_by(|a, b| b.cmp(a));
            indices.dedup();
            for i in indices {
                if i < blocks.len() {
                    blocks.remove(i);
                }
            }
        }
        RemoveTarget::FirstOfType(name) => {
            let name = normalize_block_type(&name);
            if let Some(i) = blocks
                .iter()
                .position(|b| b.block_name.as_deref() == Some(&*name))
            {
                blocks.remove(i);
            }
        }
        RemoveTarget::AllOfType(name) => {
            let name = normalize_block_type(&name);
            blocks.retain(|b| b.block_name.as_deref() != Some(&*name));
        }
    }
    let removed = before - blocks.len();
    log::debug!("removed {removed} block(s)");
    removed
}

/// Content placeholder standing for the replaced block's own HTML.
pub const KEEP_CONTENT: &str = "{content}";

/// Replaces blocks of type `old` with freshly built blocks of type `new`.
///
/// Without `attrs` the old attributes carry over. Without `content`, or with
/// [`KEEP_CONTENT`], the old `innerHTML` does. Only the first match is
/// replaced unless `all` is set. Returns the number replaced.
pub fn replace_blocks(
    blocks: &mut [Block],
    old: &str,
    new: &str,
    attrs: Option<&Attributes>,
    content: Option<&str>,
    all: bool,
) -> usize {
    let old = normalize_block_type(old);
    let mut replaced = 0;

    for block in blocks
        .iter_mut()
        .filter(|b| b.block_name.as_deref() == Some(&*old))
    {
        let new_attrs = attrs.cloned().unwrap_or_else(|| block.attrs.clone());
        let html = match content {
            Some(c) if c != KEEP_CONTENT => c.to_owned(),
            _ => block.inner_html.clone(),
        };
        *block = create_block(new, new_attrs, &html);
        replaced += 1;
        if !all {
            break;
        }
    }

    log::debug!("replaced {replaced} {old} block(s) with {new}");
    replaced
}

/// Where [`clone_block`] puts the copy.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ClonePosition {
    Before,
    #[default]
    After,
    Start,
    End,
}

impl FromStr for ClonePosition {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "before" => Ok(ClonePosition::Before),
            "after" => Ok(ClonePosition::After),
            "start" => Ok(ClonePosition::Start),
            "end" => Ok(ClonePosition::End),
            other => Err(format!("expected before, after, start or end, got {other:?}")),
        }
    }
}

/// Copies the named block at `index`, returning the copy's named index.
pub fn clone_block(
    blocks: &mut Vec<Block>,
    index: usize,
    position: ClonePosition,
) -> Result<usize, EditError> {
    let source = resolve(blocks, index)?;
    let copy = blocks[source].clone();

    let (at, new_index) = match position {
        ClonePosition::Before => (source, index),
        ClonePosition::After => (source + 1, index + 1),
        ClonePosition::Start => (0, 0),
        ClonePosition::End => (blocks.len(), named_positions(blocks).len()),
    };
    blocks.insert(at, copy);

    log::debug!("cloned block {index} to {new_index}");
    Ok(new_index)
}
