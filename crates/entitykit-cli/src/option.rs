use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Subcommand;
use entitykit_engine::traverse::{PatchAction, PatchError, PatchOutcome, coerce_path, patch, pluck};
use serde_json::Value;

use crate::Runtime;
use crate::output::{Report, read_file, render, write_file};

#[derive(Debug, Subcommand)]
pub enum OptionCommand {
    #[command(about = "Print a nested value from a JSON option file")]
    Pluck {
        file: PathBuf,
        #[arg(required = true, num_args = 1.., help = "Key path, numeric keys index arrays")]
        keys: Vec<String>,
    },
    #[command(about = "Insert, update or delete a nested value in a JSON option file")]
    Patch {
        action: PatchAction,
        file: PathBuf,
        #[arg(
            required = true,
            num_args = 1..,
            help = "Key path; for insert and update the last argument is the value"
        )]
        keys: Vec<String>,
        #[arg(long, help = "Parse the value as JSON")]
        json: bool,
    },
}

pub fn run(runtime: &Runtime, command: OptionCommand) -> Result<ExitCode> {
    Ok(execute(runtime, command)?.emit())
}

fn execute(runtime: &Runtime, command: OptionCommand) -> Result<Report> {
    match command {
        OptionCommand::Pluck { file, keys } => {
            let (path, content) = read_file(runtime, &file)?;
            let value = parse_option(&path, &content)?;
            let found = pluck(&value, &coerce_path(&keys))?;
            let text = match found {
                Value::String(s) => s,
                other => render(&other, runtime.format)?,
            };
            Ok(Report::ok(text))
        }
        OptionCommand::Patch {
            action,
            file,
            mut keys,
            json,
        } => {
            let patch_value = match action {
                PatchAction::Delete => None,
                PatchAction::Insert | PatchAction::Update => {
                    if keys.len() < 2 {
                        return Err(PatchError::MissingValue(action).into());
                    }
                    keys.pop().map(|raw| parse_value(&raw, json)).transpose()?
                }
            };

            let (path, content) = read_file(runtime, &file)?;
            let value = parse_option(&path, &content)?;
            let name = file.display();

            match patch(value, action, &coerce_path(&keys), patch_value)? {
                PatchOutcome::Updated(updated) => {
                    write_file(&path, &format!("{}\n", serde_json::to_string_pretty(&updated)?))?;
                    Ok(Report::ok(format!("Success: Updated '{name}' option.")))
                }
                PatchOutcome::Unchanged => Ok(Report::ok(format!(
                    "Success: Value passed for '{name}' option is unchanged."
                ))),
            }
        }
    }
}

fn parse_option(path: &std::path::Path, content: &str) -> Result<Value> {
    serde_json::from_str(content).with_context(|| format!("Invalid JSON in {}", path.display()))
}

fn parse_value(raw: &str, json: bool) -> Result<Value> {
    if json {
        serde_json::from_str(raw).with_context(|| format!("Invalid JSON value: {raw}"))
    } else {
        Ok(Value::String(raw.to_string()))
    }
}
