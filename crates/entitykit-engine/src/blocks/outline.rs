use entitykit_syntax::{Attributes, Block};
use serde::{Deserialize, Serialize};

/// A block without its HTML: name, attributes and the outline of its children.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlockOutline {
    pub block_name: Option<String>,
    #[serde(default)]
    pub attrs: Attributes,
    #[serde(default)]
    pub inner_blocks: Vec<BlockOutline>,
}

impl From<&Block> for BlockOutline {
    fn from(block: &Block) -> Self {
        Self {
            block_name: block.block_name.clone(),
            attrs: block.attrs.clone(),
            inner_blocks: strip_inner_html(&block.inner_blocks),
        }
    }
}

/// Drops `innerHTML` and `innerContent` from a block tree for compact display.
pub fn strip_inner_html(blocks: &[Block]) -> Vec<BlockOutline> {
    blocks.iter().map(BlockOutline::from).collect()
}
