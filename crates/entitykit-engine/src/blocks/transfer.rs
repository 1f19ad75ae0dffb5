//! Moving blocks between documents as structured data.
//!
//! An export is an envelope naming its format version and generator around
//! the document's named blocks. Import accepts that envelope or a bare array
//! of blocks, so a hand-written list works too.

use entitykit_syntax::Block;
use serde::Serialize;
use serde_json::Value;

use super::edit::{EditError, Position};
use super::outline::{BlockOutline, strip_inner_html};
use super::query::{filter_empty_blocks, parse_blocks};

pub const EXPORT_VERSION: &str = "1.0";
pub const GENERATOR: &str = concat!("entitykit/", env!("CARGO_PKG_VERSION"));

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ExportedBlocks {
    /// Full blocks, `innerHTML` and `innerContent` included.
    Raw(Vec<Block>),
    Outline(Vec<BlockOutline>),
}

impl ExportedBlocks {
    pub fn len(&self) -> usize {
        match self {
            ExportedBlocks::Raw(blocks) => blocks.len(),
            ExportedBlocks::Outline(blocks) => blocks.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BlockExport {
    pub version: &'static str,
    pub generator: &'static str,
    pub blocks: ExportedBlocks,
}

/// The named blocks of `content` wrapped for export. Freeform HTML is left out.
pub fn export_blocks(content: &str, raw: bool) -> BlockExport {
    let blocks = filter_empty_blocks(parse_blocks(content));
    let blocks = if raw {
        ExportedBlocks::Raw(blocks)
    } else {
        ExportedBlocks::Outline(strip_inner_html(&blocks))
    };
    BlockExport {
        version: EXPORT_VERSION,
        generator: GENERATOR,
        blocks,
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ImportError {
    #[error("No blocks found in import data.")]
    NoBlocks,
    #[error("Invalid block structure at index {0}: missing blockName.")]
    MissingBlockName(usize),
    #[error("Invalid block structure at index {index}: {message}")]
    Malformed { index: usize, message: String },
}

/// Reads blocks from an export envelope or a bare array of blocks.
///
/// Every top-level entry needs a string `blockName`. Blocks exported without
/// their HTML come back with one placeholder per child, so nested blocks
/// survive serialization.
pub fn blocks_from_value(data: Value) -> Result<Vec<Block>, ImportError> {
    let items = match data {
        Value::Object(mut envelope) => match envelope.remove("blocks") {
            Some(Value::Array(items)) => items,
            _ => return Err(ImportError::NoBlocks),
        },
        Value::Array(items) => items,
        _ => return Err(ImportError::NoBlocks),
    };
    if items.is_empty() {
        return Err(ImportError::NoBlocks);
    }

    items
        .into_iter()
        .enumerate()
        .map(|(index, item)| {
            if !item.get("blockName").is_some_and(Value::is_string) {
                return Err(ImportError::MissingBlockName(index));
            }
            let mut block: Block =
                serde_json::from_value(item).map_err(|e| ImportError::Malformed {
                    index,
                    message: e.to_string(),
                })?;
            restore_placeholders(&mut block);
            Ok(block)
        })
        .collect()
}

fn restore_placeholders(block: &mut Block) {
    if block.inner_content.is_empty() {
        if !block.inner_html.is_empty() {
            block.inner_content.push(Some(block.inner_html.clone()));
        }
        block
            .inner_content
            .extend(std::iter::repeat_n(None, block.inner_blocks.len()));
    }
    block.inner_blocks.iter_mut().for_each(restore_placeholders);
}

/// Adds `imported` to a document's block list at `position`, or swaps the
/// whole list for it when `replace` is set. Returns the number imported.
pub fn import_blocks(
    blocks: &mut Vec<Block>,
    imported: Vec<Block>,
    position: Position,
    replace: bool,
) -> Result<usize, EditError> {
    let count = imported.len();
    if replace {
        *blocks = imported;
    } else {
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
        blocks.splice(at..at, imported);
    }
    log::debug!("imported {count} block(s)");
    Ok(count)
}

#[cfg(test)]
mod tests {
    use super::*;
    use entitykit_syntax::serialize_blocks;
    use insta::assert_snapshot;
    use pretty_assertions::assert_eq;
    use rstest::rstest;
    use serde_json::json;

    const POST: &str = "<p>classic intro</p>\n<!-- wp:group {\"tagName\":\"section\"} --><section><!-- wp:paragraph --><p>Inside</p><!-- /wp:paragraph --></section><!-- /wp:group -->\n\n<!-- wp:separator /-->";

    #[test]
    fn export_outline_drops_html_and_freeform() {
        let export = export_blocks(POST, false);

        assert_eq!(export.blocks.len(), 2);
        let value = serde_json::to_value(&export).unwrap();
        assert_eq!(value["version"], "1.0");
        assert_eq!(value["generator"], GENERATOR);
        assert_snapshot!(serde_json::to_string(&value["blocks"]).unwrap(), @r#"[{"blockName":"core/group","attrs":{"tagName":"section"},"innerBlocks":[{"blockName":"core/paragraph","attrs":{},"innerBlocks":[]}]},{"blockName":"core/separator","attrs":{},"innerBlocks":[]}]"#);
    }

    #[test]
    fn raw_export_keeps_inner_html() {
        let export = export_blocks(POST, true);

        let value = serde_json::to_value(&export).unwrap();
        assert_eq!(value["blocks"][0]["innerHTML"], "<section></section>");
        assert_eq!(
            value["blocks"][0]["innerContent"],
            json!(["<section>", null, "</section>"])
        );
    }

    #[test]
    fn export_of_classic_content_is_empty() {
        assert!(export_blocks("<p>no blocks here</p>", false).blocks.is_empty());
    }

    #[test]
    fn raw_export_imports_back_to_the_same_markup() {
        // Given a raw export turned into plain data
        let data = serde_json::to_value(export_blocks(POST, true)).unwrap();

        // When it is imported into an empty document
        let mut blocks = Vec::new();
        let imported = import_blocks(&mut blocks, blocks_from_value(data).unwrap(), Position::End, false).unwrap();

        // Then the named blocks serialize exactly as they were
        assert_eq!(imported, 2);
        assert_eq!(
            serialize_blocks(&blocks),
            "<!-- wp:group {\"tagName\":\"section\"} --><section><!-- wp:paragraph --><p>Inside</p><!-- /wp:paragraph --></section><!-- /wp:group --><!-- wp:separator /-->"
        );
    }

    #[test]
    fn outline_import_keeps_nested_blocks() {
        let data = serde_json::to_value(export_blocks(POST, false)).unwrap();

        let blocks = blocks_from_value(data).unwrap();

        assert_eq!(
            serialize_blocks(&blocks[..1]),
            "<!-- wp:group {\"tagName\":\"section\"} --><!-- wp:paragraph /--><!-- /wp:group -->"
        );
    }

    #[test]
    fn bare_array_is_accepted() {
        let blocks = blocks_from_value(json!([
            {"blockName": "core/paragraph", "innerHTML": "<p>Hi</p>"}
        ]))
        .unwrap();

        assert_eq!(blocks[0].inner_content, vec![Some("<p>Hi</p>".to_string())]);
    }

    #[rstest]
    #[case::empty_array(json!([]), ImportError::NoBlocks)]
    #[case::envelope_without_blocks(json!({"version": "1.0"}), ImportError::NoBlocks)]
    #[case::scalar(json!("blocks"), ImportError::NoBlocks)]
    #[case::missing_name(json!([{"blockName": "core/spacer"}, {"attrs": {}}]), ImportError::MissingBlockName(1))]
    #[case::null_name(json!({"blocks": [{"blockName": null}]}), ImportError::MissingBlockName(0))]
    fn rejects_unusable_data(#[case] data: Value, #[case] expected: ImportError) {
        assert_eq!(blocks_from_value(data), Err(expected));
    }

    #[test]
    fn malformed_fields_name_the_index() {
        let err = blocks_from_value(json!([{"blockName": "core/spacer", "attrs": [1]}])).unwrap_err();
        assert!(matches!(err, ImportError::Malformed { index: 0, .. }));
    }

    #[rstest]
    #[case(Position::Start, "<!-- wp:spacer /--><!-- wp:separator /-->\n<p>tail</p>")]
    #[case(Position::End, "<!-- wp:separator /-->\n<p>tail</p><!-- wp:spacer /-->")]
    #[case(Position::Index(1), "<!-- wp:separator /--><!-- wp:spacer /-->\n<p>tail</p>")]
    fn import_positions(#[case] position: Position, #[case] expected: &str) {
        let mut blocks = parse_blocks("<!-- wp:separator /-->\n<p>tail</p>");
        let imported = blocks_from_value(json!([{"blockName": "core/spacer"}])).unwrap();

        import_blocks(&mut blocks, imported, position, false).unwrap();

        assert_eq!(serialize_blocks(&blocks), expected);
    }

    #[test]
    fn import_with_replace_drops_existing_content() {
        let mut blocks = parse_blocks(POST);
        let imported = blocks_from_value(json!([{"blockName": "core/spacer"}])).unwrap();

        assert_eq!(import_blocks(&mut blocks, imported, Position::Start, true), Ok(1));
        assert_eq!(serialize_blocks(&blocks), "<!-- wp:spacer /-->");
    }

    #[test]
    fn import_past_end_is_an_error() {
        let mut blocks = parse_blocks("<!-- wp:separator /-->");
        let imported = blocks_from_value(json!([{"blockName": "core/spacer"}])).unwrap();

        assert_eq!(
            import_blocks(&mut blocks, imported, Position::Index(4), false),
            Err(EditError::InvalidPosition { position: 4, len: 1 })
        );
    }
}
