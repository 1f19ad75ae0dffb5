use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use entitykit_config::{Config, OutputFormat};

mod block;
mod option;
mod output;

#[derive(Debug, Parser)]
#[command(
    name = "entitykit",
    version,
    about = "Inspect and edit WordPress block markup and nested option values"
)]
struct Cli {
    #[arg(long, global = true, value_name = "PATH", help = "Config file to use instead of the default")]
    config: Option<PathBuf>,
    #[arg(long, global = true, value_name = "FORMAT", help = "Output format: json or yaml")]
    format: Option<OutputFormat>,
    #[arg(short, long, global = true, action = clap::ArgAction::Count, help = "Raise log verbosity (repeatable)")]
    verbose: u8,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    #[command(about = "Query and edit the blocks of a post content file")]
    Block(BlockArgs),
    #[command(about = "Read and patch nested values of a JSON option file")]
    Option(OptionArgs),
}

#[derive(Debug, Args)]
struct BlockArgs {
    #[command(subcommand)]
    command: block::BlockCommand,
}

#[derive(Debug, Args)]
struct OptionArgs {
    #[command(subcommand)]
    command: option::OptionCommand,
}

/// Settings every command sees, merged from the config file and global flags.
#[derive(Debug, Clone, Default)]
pub struct Runtime {
    pub config: Config,
    pub format: OutputFormat,
}

impl Runtime {
    fn from_cli(cli: &Cli) -> Result<Self> {
        let loaded = match &cli.config {
            Some(path) => Config::load_from_path(path)?
                .with_context(|| format!("Config file not found: {}", path.display()))?,
            None => Config::load()?.unwrap_or_default(),
        };
        let format = cli.format.unwrap_or(loaded.format);
        Ok(Self {
            config: loaded,
            format,
        })
    }
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => log::LevelFilter::Warn,
        1 => log::LevelFilter::Info,
        2 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    };
    env_logger::Builder::from_default_env()
        .filter_level(level)
        .init();
}

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let runtime = Runtime::from_cli(&cli)?;
    log::debug!("output format {}", runtime.format);

    match cli.command {
        Commands::Block(BlockArgs { command }) => block::run(&runtime, command),
        Commands::Option(OptionArgs { command }) => option::run(&runtime, command),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn global_flags_after_subcommand() {
        let cli = Cli::try_parse_from([
            "entitykit", "block", "parse", "post.html", "--format", "yaml", "-vv",
        ])
        .unwrap();

        assert_eq!(cli.format, Some(OutputFormat::Yaml));
        assert_eq!(cli.verbose, 2);
    }

    #[test]
    fn explicit_config_must_exist() {
        let cli = Cli::try_parse_from([
            "entitykit", "--config", "/nonexistent/entitykit.toml", "block", "types", "a.html",
        ])
        .unwrap();

        let err = Runtime::from_cli(&cli).unwrap_err();
        assert!(err.to_string().starts_with("Config file not found"));
    }
}
