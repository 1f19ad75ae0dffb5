use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Parsed block attributes: the JSON object from a delimiter.
pub type Attributes = Map<String, Value>;

/// A fully materialized block, shaped like WordPress' parsed block arrays.
///
/// `inner_content` interleaves literal HTML chunks with `None` placeholders,
/// one per entry of `inner_blocks` and in the same order, so the original
/// markup can be rebuilt with children put back where they were.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Block {
    /// Fully-qualified type, or `None` for freeform HTML.
    pub block_name: Option<String>,
    #[serde(default)]
    pub attrs: Attributes,
    #[serde(default)]
    pub inner_blocks: Vec<Block>,
    #[serde(rename = "innerHTML", default)]
    pub inner_html: String,
    #[serde(default)]
    pub inner_content: Vec<Option<String>>,
}

impl Block {
    /// An empty named block, ready to receive content.
    pub fn new(block_name: impl Into<String>, attrs: Attributes) -> Self {
        Self {
            block_name: Some(block_name.into()),
            attrs,
            inner_blocks: Vec::new(),
            inner_html: String::new(),
            inner_content: Vec::new(),
        }
    }

    /// A run of HTML outside any block.
    pub fn freeform(html: impl Into<String>) -> Self {
        let html = html.into();
        Self {
            block_name: None,
            attrs: Attributes::new(),
            inner_blocks: Vec::new(),
            inner_content: vec![Some(html.clone())],
            inner_html: html,
        }
    }

    pub fn is_freeform(&self) -> bool {
        self.block_name.is_none()
    }

    /// Appends a literal HTML chunk.
    pub fn push_html(&mut self, html: &str) {
        self.inner_html.push_str(html);
        self.inner_content.push(Some(html.to_owned()));
    }

    /// Appends a child block and its placeholder.
    pub fn push_inner(&mut self, block: Block) {
        self.inner_blocks.push(block);
        self.inner_content.push(None);
    }

    /// Whether placeholders and children line up.
    pub fn placeholders_match(&self) -> bool {
        self.inner_content.iter().filter(|c| c.is_none()).count() == self.inner_blocks.len()
    }
}
