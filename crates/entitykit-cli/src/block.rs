use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result, bail};
use clap::Subcommand;
use entitykit_engine::blocks::{
    BlockOutline, BlockUpdate, ClonePosition, MoveOutcome, Position, RemoveTarget,
    blocks_from_value, clone_block, count_by_type, create_block, export_blocks, extract_matching,
    get_at_index, get_block_span, get_block_types, has_block, import_blocks, insert_block,
    list_blocks, move_block, parse_all, parse_blocks, remove_blocks, replace_blocks,
    strip_inner_html, update_block,
};
use entitykit_syntax::{
    Attributes, Block, BlockProcessor, DelimiterType, matches_filter, serialize_blocks,
};
use serde::Serialize;
use serde_json::Value;

use crate::Runtime;
use crate::output::{Report, read_file, render, write_file};

#[derive(Debug, Subcommand)]
pub enum BlockCommand {
    #[command(about = "List the top-level blocks")]
    Parse {
        file: PathBuf,
        #[arg(long, help = "Include innerHTML and innerContent")]
        raw: bool,
    },
    #[command(about = "Show the top-level block at an index")]
    Get {
        file: PathBuf,
        #[arg(allow_negative_numbers = true)]
        index: i64,
        #[arg(long, help = "Include innerHTML and innerContent")]
        raw: bool,
        #[arg(long, help = "Count freeform HTML between blocks when indexing")]
        include_freeform: bool,
    },
    #[command(about = "Count blocks by type")]
    Count {
        file: PathBuf,
        #[arg(long, help = "Include nested blocks")]
        nested: bool,
        #[arg(long = "type", value_name = "TYPE", help = "Only count this block type")]
        block_type: Option<String>,
    },
    #[command(about = "List block types with how often each appears")]
    List {
        file: PathBuf,
        #[arg(long, help = "Include nested blocks")]
        nested: bool,
        #[arg(long, help = "Print only the number of distinct types")]
        count: bool,
    },
    #[command(about = "List distinct block types in first-seen order")]
    Types {
        file: PathBuf,
        #[arg(long, help = "Include nested blocks")]
        nested: bool,
    },
    #[command(about = "Check for a block type anywhere in the content (exit 1 when absent)")]
    Has {
        file: PathBuf,
        #[arg(value_name = "TYPE")]
        block_type: String,
    },
    #[command(about = "Byte range of the top-level block at an index")]
    Span {
        file: PathBuf,
        #[arg(allow_negative_numbers = true)]
        index: i64,
    },
    #[command(about = "Extract top-level blocks by type and attribute")]
    Extract {
        file: PathBuf,
        #[arg(long = "type", value_name = "TYPE")]
        block_type: Option<String>,
        #[arg(long = "attr", value_name = "KEY=VALUE", help = "Attribute that must match (repeatable)")]
        attrs: Vec<String>,
        #[arg(long, default_value_t = 0, help = "Stop after this many matches, 0 for all")]
        limit: usize,
        #[arg(long, help = "Include innerHTML and innerContent")]
        raw: bool,
    },
    #[command(about = "Export the named blocks as JSON or YAML")]
    Export {
        file: PathBuf,
        #[arg(long, help = "Include innerHTML and innerContent")]
        raw: bool,
        #[arg(long, value_name = "PATH", help = "Write to a file instead of stdout")]
        output: Option<PathBuf>,
    },
    #[command(about = "Import blocks from a JSON or YAML export")]
    Import {
        file: PathBuf,
        #[arg(help = "Export to read, - for stdin")]
        input: PathBuf,
        #[arg(long, default_value = "end", help = "start, end or a list position")]
        position: Position,
        #[arg(long, help = "Replace all existing content")]
        replace: bool,
    },
    #[command(about = "Dump the token stream")]
    Tokens { file: PathBuf },
    #[command(about = "Insert a new block")]
    Insert {
        file: PathBuf,
        #[arg(value_name = "TYPE")]
        block_type: String,
        #[arg(long, default_value = "")]
        content: String,
        #[arg(long, value_name = "JSON")]
        attrs: Option<String>,
        #[arg(long, default_value = "end", help = "start, end or a list position")]
        position: Position,
    },
    #[command(about = "Update the attributes or content of a block")]
    Update {
        file: PathBuf,
        index: usize,
        #[arg(long, value_name = "JSON")]
        attrs: Option<String>,
        #[arg(long)]
        content: Option<String>,
        #[arg(long, help = "Replace the attributes instead of merging")]
        replace_attrs: bool,
    },
    #[command(about = "Move a block to another index")]
    Move { file: PathBuf, from: usize, to: usize },
    #[command(about = "Remove blocks by list position or type")]
    Remove {
        file: PathBuf,
        indices: Vec<usize>,
        #[arg(long = "type", value_name = "TYPE", conflicts_with = "indices")]
        block_type: Option<String>,
        #[arg(long, requires = "block_type", help = "Remove every block of the type")]
        all: bool,
    },
    #[command(about = "Replace blocks of one type with another")]
    Replace {
        file: PathBuf,
        old: String,
        new: String,
        #[arg(long, value_name = "JSON")]
        attrs: Option<String>,
        #[arg(long, help = "New content, {content} keeps the old HTML")]
        content: Option<String>,
        #[arg(long, help = "Replace every match instead of the first")]
        all: bool,
    },
    #[command(about = "Duplicate a block")]
    Clone {
        file: PathBuf,
        index: usize,
        #[arg(long, default_value = "after", help = "before, after, start or end")]
        position: ClonePosition,
    },
}

pub fn run(runtime: &Runtime, command: BlockCommand) -> Result<ExitCode> {
    Ok(execute(runtime, command)?.emit())
}

fn execute(runtime: &Runtime, command: BlockCommand) -> Result<Report> {
    match command {
        BlockCommand::Parse { file, raw } => {
            let (_, content) = read_file(runtime, &file)?;
            blocks_report(runtime, &parse_all(&content), raw)
        }
        BlockCommand::Get {
            file,
            index,
            raw,
            include_freeform,
        } => {
            let (_, content) = read_file(runtime, &file)?;
            match get_at_index(&content, index, !include_freeform) {
                Some(block) => {
                    let raw = raw || runtime.config.raw;
                    let text = if raw {
                        render(&block, runtime.format)?
                    } else {
                        render(&BlockOutline::from(&block), runtime.format)?
                    };
                    Ok(Report::ok(text))
                }
                None => bail!("No block found at index {index}."),
            }
        }
        BlockCommand::Count {
            file,
            nested,
            block_type,
        } => {
            let (_, content) = read_file(runtime, &file)?;
            let counts = count_by_type(&content, nested);
            match block_type {
                Some(filter) => {
                    let total: usize = counts
                        .iter()
                        .filter(|(name, _)| matches_filter(name, &filter))
                        .map(|(_, count)| count)
                        .sum();
                    Ok(Report::ok(total.to_string()))
                }
                None => Ok(Report::ok(render(&counts, runtime.format)?)),
            }
        }
        BlockCommand::List {
            file,
            nested,
            count,
        } => {
            let (_, content) = read_file(runtime, &file)?;
            let rows = list_blocks(&content, nested);
            if count {
                Ok(Report::ok(rows.len().to_string()))
            } else {
                Ok(Report::ok(render(&rows, runtime.format)?))
            }
        }
        BlockCommand::Types { file, nested } => {
            let (_, content) = read_file(runtime, &file)?;
            Ok(Report::ok(render(&get_block_types(&content, nested), runtime.format)?))
        }
        BlockCommand::Has { file, block_type } => {
            let (_, content) = read_file(runtime, &file)?;
            if has_block(&content, &block_type) {
                Ok(Report::ok(format!("Success: Content contains {block_type} block.")))
            } else {
                Ok(Report::failed(format!("Content does not contain {block_type} block.")))
            }
        }
        BlockCommand::Span { file, index } => {
            let (_, content) = read_file(runtime, &file)?;
            let span = get_block_span(&content, index)
                .with_context(|| format!("No block found at index {index}."))?;
            Ok(Report::ok(render(&span, runtime.format)?))
        }
        BlockCommand::Extract {
            file,
            block_type,
            attrs,
            limit,
            raw,
        } => {
            let (_, content) = read_file(runtime, &file)?;
            let wanted = attrs
                .iter()
                .map(|pair| parse_attr_filter(pair))
                .collect::<Result<Vec<_>>>()?;
            let blocks = extract_matching(
                &content,
                |name, block_attrs| {
                    block_type.as_deref().is_none_or(|filter| matches_filter(name, filter))
                        && wanted
                            .iter()
                            .all(|(key, value)| block_attrs.get(key) == Some(value))
                },
                limit,
            );
            blocks_report(runtime, &blocks, raw)
        }
        BlockCommand::Export { file, raw, output } => {
            let (_, content) = read_file(runtime, &file)?;
            let export = export_blocks(&content, raw || runtime.config.raw);
            let text = render(&export, runtime.format)?;
            let Some(output) = output else {
                return Ok(Report::ok(text));
            };

            let path = runtime.config.resolve(&output);
            if let Some(parent) = path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
                fs::create_dir_all(parent)
                    .with_context(|| format!("Could not create directory: {}", parent.display()))?;
            }
            write_file(&path, &format!("{text}\n"))?;
            Ok(Report::ok(format!(
                "Success: Exported {} block(s) to {}.",
                export.blocks.len(),
                output.display()
            )))
        }
        BlockCommand::Import {
            file,
            input,
            position,
            replace,
        } => {
            let data = parse_import(&read_input(runtime, &input)?)?;
            let imported = blocks_from_value(data)?;
            edit_file(runtime, file, |blocks| {
                let count = import_blocks(blocks, imported, position, replace)?;
                Ok(format!("Success: Imported {count} block(s)."))
            })
        }
        BlockCommand::Tokens { file } => {
            let (_, content) = read_file(runtime, &file)?;
            Ok(Report::ok(render(&tokens(&content), runtime.format)?))
        }
        BlockCommand::Insert {
            file,
            block_type,
            content: html,
            attrs,
            position,
        } => edit_file(runtime, file, |blocks| {
            let attrs = parse_attrs(attrs.as_deref())?.unwrap_or_default();
            let block = create_block(&block_type, attrs, &html);
            insert_block(blocks, block, position)?;
            Ok(format!("Success: Inserted {block_type} block at {position}."))
        }),
        BlockCommand::Update {
            file,
            index,
            attrs,
            content,
            replace_attrs,
        } => edit_file(runtime, file, |blocks| {
            let update = BlockUpdate {
                attrs: parse_attrs(attrs.as_deref())?,
                content,
                replace_attrs,
            };
            if update.attrs.is_none() && update.content.is_none() {
                bail!("Nothing to update. Pass --attrs or --content.");
            }
            update_block(blocks, index, update)?;
            Ok(format!("Success: Updated block at index {index}."))
        }),
        BlockCommand::Move { file, from, to } => edit_file(runtime, file, |blocks| {
            Ok(match move_block(blocks, from, to)? {
                MoveOutcome::Moved => format!("Success: Moved block from index {from} to {to}."),
                MoveOutcome::Unchanged => "Source and destination are the same.".to_string(),
            })
        }),
        BlockCommand::Remove {
            file,
            indices,
            block_type,
            all,
        } => edit_file(runtime, file, |blocks| {
            let target = match block_type {
                Some(name) if all => RemoveTarget::AllOfType(name),
                Some(name) => RemoveTarget::FirstOfType(name),
                None if indices.is_empty() => bail!("Pass block indices or --type."),
                None => RemoveTarget::Indices(indices),
            };
            let removed = remove_blocks(blocks, target);
            if removed == 0 {
                bail!("No blocks were removed.");
            }
            Ok(format!("Success: Removed {removed} block(s)."))
        }),
        BlockCommand::Replace {
            file,
            old,
            new,
            attrs,
            content,
            all,
        } => edit_file(runtime, file, |blocks| {
            let attrs = parse_attrs(attrs.as_deref())?;
            let replaced =
                replace_blocks(blocks, &old, &new, attrs.as_ref(), content.as_deref(), all);
            if replaced == 0 {
                bail!("No {old} blocks found.");
            }
            Ok(format!("Success: Replaced {replaced} {old} block(s) with {new}."))
        }),
        BlockCommand::Clone {
            file,
            index,
            position,
        } => edit_file(runtime, file, |blocks| {
            let new_index = clone_block(blocks, index, position)?;
            Ok(format!("Success: Cloned block {index} to index {new_index}."))
        }),
    }
}

fn blocks_report(runtime: &Runtime, blocks: &[Block], raw: bool) -> Result<Report> {
    let text = if raw || runtime.config.raw {
        render(blocks, runtime.format)?
    } else {
        render(&strip_inner_html(blocks), runtime.format)?
    };
    Ok(Report::ok(text))
}

/// Parses the file into its block list, applies `edit` and writes the result back.
fn edit_file<F>(runtime: &Runtime, file: PathBuf, edit: F) -> Result<Report>
where
    F: FnOnce(&mut Vec<Block>) -> Result<String>,
{
    let (path, content) = read_file(runtime, &file)?;
    let mut blocks = parse_blocks(&content);
    let message = edit(&mut blocks)?;
    let updated = serialize_blocks(&blocks);
    if updated != content {
        write_file(&path, &updated)?;
    }
    Ok(Report::ok(message))
}

fn read_input(runtime: &Runtime, input: &Path) -> Result<String> {
    if input == Path::new("-") {
        return io::read_to_string(io::stdin()).context("Failed to read stdin");
    }
    let (_, text) = read_file(runtime, input)?;
    Ok(text)
}

/// Import data is tried as JSON first, then as YAML.
fn parse_import(input: &str) -> Result<Value> {
    if input.trim().is_empty() {
        bail!("No input data provided.");
    }
    match serde_json::from_str(input) {
        Ok(value) => Ok(value),
        Err(_) => serde_yaml::from_str(input).context("Invalid input format. Expected JSON or YAML."),
    }
}

fn parse_attrs(json: Option<&str>) -> Result<Option<Attributes>> {
    let Some(json) = json else {
        return Ok(None);
    };
    match serde_json::from_str::<Value>(json).context("Invalid JSON for --attrs")? {
        Value::Object(map) => Ok(Some(map)),
        other => bail!("--attrs must be a JSON object, got {other}"),
    }
}

/// `key=value`, where the value is JSON when it parses and a string otherwise.
fn parse_attr_filter(pair: &str) -> Result<(String, Value)> {
    let (key, raw) = pair
        .split_once('=')
        .with_context(|| format!("Expected KEY=VALUE, got {pair:?}"))?;
    let value = serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()));
    Ok((key.to_string(), value))
}

#[derive(Debug, Serialize)]
struct TokenRow {
    kind: &'static str,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    block_type: Option<String>,
    start: usize,
    length: usize,
    depth: usize,
}

fn tokens(content: &str) -> Vec<TokenRow> {
    let mut processor = BlockProcessor::new(content);
    let mut rows = Vec::new();
    while processor.next_token() {
        let Some(span) = processor.span() else {
            continue;
        };
        let kind = match processor.delimiter_type() {
            None => "html",
            Some(DelimiterType::Opener) => "opener",
            Some(DelimiterType::Closer) => "closer",
            Some(DelimiterType::Void) => "void",
        };
        rows.push(TokenRow {
            kind,
            block_type: processor.block_type().map(str::to_owned),
            start: span.start,
            length: span.length,
            depth: processor.depth(),
        });
    }
    rows
}
