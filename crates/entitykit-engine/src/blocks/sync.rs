//! Keeps a block's markup in step with attributes that decide its tag.
//!
//! A heading's `level` picks `<h1>` to `<h6>` and a list's `ordered` picks
//! `<ol>` or `<ul>`. When an update sets one of these, the matching tags in
//! the block's own HTML chunks are rewritten; nested blocks are left alone.

use std::sync::OnceLock;

use entitykit_syntax::{Attributes, Block};
use regex::{Captures, Regex};
use serde_json::Value;

struct TagPattern {
    open: Regex,
    close: Regex,
}

impl TagPattern {
    fn new(tag: &str) -> Self {
        Self {
            open: Regex::new(&format!(r"<{tag}((?-u:\s)[^>]*)?>")).expect("Invalid tag regex"),
            close: Regex::new(&format!(r"</{tag}>")).expect("Invalid tag regex"),
        }
    }

    /// Renames every matched tag to `tag`, keeping opening tag attributes.
    fn rename(&self, html: &str, tag: &str) -> String {
        let opened = self.open.replace_all(html, |caps: &Captures| {
            format!("<{tag}{}>", caps.get(1).map_or("", |m| m.as_str()))
        });
        self.close
            .replace_all(&opened, regex::NoExpand(&format!("</{tag}>")))
            .into_owned()
    }
}

fn heading_tags() -> &'static TagPattern {
    static HEADING: OnceLock<TagPattern> = OnceLock::new();
    HEADING.get_or_init(|| TagPattern::new("h[1-6]"))
}

fn list_tags(ordered: bool) -> &'static TagPattern {
    static UNORDERED: OnceLock<TagPattern> = OnceLock::new();
    static ORDERED: OnceLock<TagPattern> = OnceLock::new();
    if ordered {
        ORDERED.get_or_init(|| TagPattern::new("ol"))
    } else {
        UNORDERED.get_or_init(|| TagPattern::new("ul"))
    }
}

/// Applies `rewrite` to each HTML chunk and rebuilds `innerHTML` if any changed.
fn rewrite_chunks(block: &mut Block, rewrite: impl Fn(&str) -> String) -> bool {
    if block.inner_html.is_empty() {
        return false;
    }

    let mut changed = false;
    for chunk in block.inner_content.iter_mut().flatten() {
        let updated = rewrite(chunk);
        if updated != *chunk {
            *chunk = updated;
            changed = true;
        }
    }
    if changed {
        block.inner_html = block.inner_content.iter().flatten().map(String::as_str).collect();
    }
    changed
}

/// A heading level from 1 to 6, accepting numbers and numeric strings.
fn heading_level(value: &Value) -> Option<u64> {
    let level = match value {
        Value::Number(n) => n.as_u64().or_else(|| n.as_f64().map(|f| f as u64))?,
        Value::String(s) => s.trim().parse().ok()?,
        _ => return None,
    };
    (1..=6).contains(&level).then_some(level)
}

/// Loose truthiness: `false`, `0`, `""`, `"0"`, empty arrays and objects are false.
fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty() && s != "0",
        Value::Array(items) => !items.is_empty(),
        Value::Object(map) => !map.is_empty(),
    }
}

/// Rewrites `<hN>` tags of a `core/heading` to the `level` in `new_attrs`.
///
/// Returns whether the HTML changed. Levels outside 1 to 6 are ignored.
pub fn sync_heading_level(block: &mut Block, new_attrs: &Attributes) -> bool {
    if block.block_name.as_deref() != Some("core/heading") {
        return false;
    }
    let Some(level) = new_attrs.get("level").and_then(heading_level) else {
        return false;
    };
    let tag = format!("h{level}");
    rewrite_chunks(block, |html| heading_tags().rename(html, &tag))
}

/// Switches a `core/list` between `<ul>` and `<ol>` to follow `ordered` in `new_attrs`.
pub fn sync_list_type(block: &mut Block, new_attrs: &Attributes) -> bool {
    if block.block_name.as_deref() != Some("core/list") {
        return false;
    }
    let Some(ordered) = new_attrs.get("ordered").filter(|v| !v.is_null()) else {
        return false;
    };
    let ordered = is_truthy(ordered);
    let (from, to) = if ordered { (false, "ol") } else { (true, "ul") };
    rewrite_chunks(block, |html| list_tags(from).rename(html, to))
}

/// Runs every tag sync for `new_attrs`. Returns whether any HTML changed.
pub fn sync_html(block: &mut Block, new_attrs: &Attributes) -> bool {
    let heading = sync_heading_level(block, new_attrs);
    let list = sync_list_type(block, new_attrs);
    heading || list
}
