//! Writes blocks back out as comment-delimited markup.
//!
//! The output follows WordPress' `serialize_blocks()` byte for byte, so a
//! document that was parsed and serialized without edits comes back unchanged.

use crate::{
    block::{Attributes, Block},
    block_type::strip_core_namespace,
};

/// Serializes a list of blocks, freeform entries included.
pub fn serialize_blocks(blocks: &[Block]) -> String {
    let mut out = String::new();
    for block in blocks {
        write_block(&mut out, block);
    }
    out
}

/// Serializes a single block and everything nested inside it.
pub fn serialize_block(block: &Block) -> String {
    let mut out = String::new();
    write_block(&mut out, block);
    out
}

/// Encodes attributes as delimiter JSON.
///
/// Sequences that could end the surrounding HTML comment or be read as markup
/// are replaced with unicode escapes, which any JSON parser decodes back to
/// the same value.
pub fn serialize_block_attributes(attrs: &Attributes) -> String {
    // A map of `Value`s always has a JSON representation.
    let json = serde_json::to_string(attrs).unwrap_or_else(|_| String::from("{}"));
    escape_for_comment(&json)
}

/// Wraps already-serialized content in a block's delimiters.
///
/// Empty content produces the void form.
pub fn comment_delimited_block_content(
    block_name: Option<&str>,
    attrs: &Attributes,
    content: &str,
) -> String {
    let Some(name) = block_name else {
        return content.to_owned();
    };
    let name = strip_core_namespace(name);
    let attrs = if attrs.is_empty() {
        String::new()
    } else {
        format!("{} ", serialize_block_attributes(attrs))
    };

    if content.is_empty() {
        format!("<!-- wp:{name} {attrs}/-->")
    } else {
        format!("<!-- wp:{name} {attrs}-->{content}<!-- /wp:{name} -->")
    }
}

fn write_block(out: &mut String, block: &Block) {
    let mut content = String::new();
    let mut children = block.inner_blocks.iter();
    for chunk in &block.inner_content {
        match chunk {
            Some(html) => content.push_str(html),
            None => match children.next() {
                Some(child) => write_block(&mut content, child),
                None => log::warn!(
                    "placeholder without inner block in {}",
                    block.block_name.as_deref().unwrap_or("freeform content")
                ),
            },
        }
    }

    out.push_str(&comment_delimited_block_content(
        block.block_name.as_deref(),
        &block.attrs,
        &content,
    ));
}

fn escape_for_comment(json: &str) -> String {
    let mut out = String::with_capacity(json.len());
    let mut chars = json.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '\\' => match chars.next() {
                Some('"') => out.push_str("\\u0022"),
                Some(next) => {
                    out.push('\\');
                    out.push(next);
                }
                None => out.push('\\'),
            },
            '-' if chars.peek() == Some(&'-') => {
                chars.next();
                out.push_str("\\u002d\\u002d");
            }
            '<' => out.push_str("\\u003c"),
            '>' => out.push_str("\\u003e"),
            '&' => out.push_str("\\u0026"),
            c => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use insta::assert_snapshot;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn attrs(value: serde_json::Value) -> Attributes {
        match value {
            serde_json::Value::Object(map) => map,
            other => panic!("not an object: {other}"),
        }
    }

    #[test]
    fn paragraph_with_content() {
        let mut block = Block::new("core/paragraph", Attributes::new());
        block.push_html("<p>Hello</p>");
        assert_snapshot!(serialize_block(&block), @"<!-- wp:paragraph --><p>Hello</p><!-- /wp:paragraph -->");
    }

    #[test]
    fn empty_block_is_void() {
        let block = Block::new("core/separator", Attributes::new());
        assert_snapshot!(serialize_block(&block), @"<!-- wp:separator /-->");
    }

    #[test]
    fn namespaced_void_with_attributes() {
        let block = Block::new("acme/hero", attrs(json!({"size": "large"})));
        assert_snapshot!(serialize_block(&block), @r#"<!-- wp:acme/hero {"size":"large"} /-->"#);
    }

    #[test]
    fn nested_blocks_fill_placeholders() {
        let mut inner = Block::new("core/paragraph", Attributes::new());
        inner.push_html("<p>Inner</p>");
        let mut group = Block::new("core/group", attrs(json!({"layout": {"type": "flex"}})));
        group.push_html("<div>");
        group.push_inner(inner);
        group.push_html("</div>");

        assert_eq!(
            serialize_block(&group),
            r#"<!-- wp:group {"layout":{"type":"flex"}} --><div><!-- wp:paragraph --><p>Inner</p><!-- /wp:paragraph --></div><!-- /wp:group -->"#
        );
    }

    #[test]
    fn freeform_is_written_verbatim() {
        let blocks = vec![
            Block::freeform("<p>Free</p>\n"),
            Block::new("core/separator", Attributes::new()),
        ];
        assert_eq!(serialize_blocks(&blocks), "<p>Free</p>\n<!-- wp:separator /-->");
    }

    #[test]
    fn attributes_escape_comment_breaking_sequences() {
        let encoded = serialize_block_attributes(&attrs(json!({
            "a": "x --> <b> & y",
            "q": "say \"hi\"",
        })));
        assert_eq!(
            encoded,
            "{\"a\":\"x \\u002d\\u002d\\u003e \\u003cb\\u003e \\u0026 y\",\"q\":\"say \\u0022hi\\u0022\"}"
        );

        // Escapes decode back to the original values.
        let decoded: serde_json::Value = serde_json::from_str(&encoded).unwrap();
        assert_eq!(decoded["a"], json!("x --> <b> & y"));
        assert_eq!(decoded["q"], json!("say \"hi\""));
    }

    #[test]
    fn escaped_backslash_before_quote_is_kept() {
        // The string `a\` encodes as "a\\"; the closing quote must survive.
        let encoded = serialize_block_attributes(&attrs(json!({"p": "a\\"})));
        assert_eq!(encoded, "{\"p\":\"a\\\\\"}");
        let decoded: serde_json::Value = serde_json::from_str(&encoded).unwrap();
        assert_eq!(decoded["p"], json!("a\\"));
    }

    #[test]
    fn slashes_and_unicode_are_not_escaped() {
        let encoded = serialize_block_attributes(&attrs(json!({"url": "https://a/b", "t": "日本"})));
        assert_eq!(encoded, r#"{"url":"https://a/b","t":"日本"}"#);
    }

    #[test]
    fn comment_delimited_content_without_name_is_content() {
        assert_eq!(
            comment_delimited_block_content(None, &Attributes::new(), "<p>x</p>"),
            "<p>x</p>"
        );
    }
}
