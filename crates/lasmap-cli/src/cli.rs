//! Command-line definitions for `lasmap`.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use colorchoice_clap::Color;

use lasmap_ingest::DiscoveryOptions;
use lasmap_model::Assignment;

use lasmap_cli::pipeline::parse_assignment;
use lasmap_cli::types::DictionaryEdit;

#[derive(Parser)]
#[command(
    name = "lasmap",
    version,
    about = "Reconcile LAS curve mnemonics against an alias dictionary",
    long_about = "Classify the curves of LAS files against a dictionary of base names,\n\
                  aliases and ignored names, and maintain that dictionary."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Adjust log verbosity (-v for info, -vv for debug, -q for errors only).
    #[command(flatten)]
    pub verbosity: Verbosity<WarnLevel>,

    /// Control ANSI color output (auto, always, never).
    #[command(flatten)]
    pub color: Color,

    /// Explicit log level (overrides -v/-q flags).
    #[arg(long = "log-level", value_enum, global = true)]
    pub log_level: Option<LogLevelArg>,

    /// Log output format (pretty for human, json for machine parsing).
    #[arg(
        long = "log-format",
        value_enum,
        default_value = "pretty",
        global = true
    )]
    pub log_format: LogFormatArg,

    /// Write logs to a file instead of stderr.
    #[arg(long = "log-file", value_name = "PATH", global = true)]
    pub log_file: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Command {
    /// Classify every LAS file in a directory.
    Scan(ScanArgs),

    /// Show dictionary statistics.
    Stats(StatsArgs),

    /// Edit the dictionary and save it.
    Dict(DictArgs),

    /// Copy the reference file's mappings to every other file and commit.
    Propagate(PropagateArgs),
}

#[derive(Args)]
pub struct DirectoryArgs {
    /// Directory containing `.las` files.
    #[arg(value_name = "DIR")]
    pub dir: PathBuf,

    /// Descend into subdirectories.
    #[arg(long = "recursive", short = 'r')]
    pub recursive: bool,

    /// Number of header parsing threads (default: available cores).
    #[arg(long = "threads", value_name = "N")]
    pub threads: Option<usize>,
}

impl DirectoryArgs {
    pub fn discovery_options(&self) -> DiscoveryOptions {
        let options = DiscoveryOptions::default().with_recursive(self.recursive);
        match self.threads {
            Some(threads) => options.with_threads(threads),
            None => options,
        }
    }
}

#[derive(Args)]
pub struct DictionaryArg {
    /// Dictionary CSV (`FieldName,PrimaryName,Status,Description`).
    #[arg(long = "dictionary", short = 'd', value_name = "CSV")]
    pub dictionary: PathBuf,
}

#[derive(Args)]
pub struct ScanArgs {
    #[command(flatten)]
    pub directory: DirectoryArgs,

    #[command(flatten)]
    pub dictionary: DictionaryArg,

    /// List every unknown curve per file.
    #[arg(long = "details")]
    pub details: bool,

    /// Print the result as JSON instead of tables.
    #[arg(long = "json")]
    pub json: bool,
}

#[derive(Args)]
pub struct StatsArgs {
    #[command(flatten)]
    pub dictionary: DictionaryArg,

    #[arg(long = "json")]
    pub json: bool,
}

#[derive(Args)]
pub struct DictArgs {
    #[command(subcommand)]
    pub action: DictAction,

    /// Dictionary CSV to edit; created when it does not exist.
    #[arg(long = "dictionary", short = 'd', value_name = "CSV", global = true)]
    pub dictionary: Option<PathBuf>,

    #[arg(long = "json", global = true)]
    pub json: bool,
}

#[derive(Subcommand)]
pub enum DictAction {
    /// Add a base name, optionally with aliases.
    AddBase {
        name: String,
        /// Alias to map to the new base (repeatable).
        #[arg(long = "alias", short = 'a', value_name = "FIELD")]
        aliases: Vec<String>,
    },
    /// Map a field name to an existing base name.
    AddAlias { base: String, field: String },
    /// Mark a field name as ignored.
    Ignore { name: String },
    /// Remove a base name together with its aliases.
    RemoveBase { name: String },
    /// Remove an alias or ignored name.
    RemoveField { name: String },
    /// Rename a base name and re-point its aliases.
    Rename { old: String, new: String },
}

impl DictAction {
    pub fn to_edit(&self) -> DictionaryEdit {
        match self {
            Self::AddBase { name, aliases } => DictionaryEdit::AddBase {
                name: name.clone(),
                aliases: aliases.clone(),
            },
            Self::AddAlias { base, field } => DictionaryEdit::AddAlias {
                base: base.clone(),
                field: field.clone(),
            },
            Self::Ignore { name } => DictionaryEdit::Ignore { name: name.clone() },
            Self::RemoveBase { name } => DictionaryEdit::RemoveBase { name: name.clone() },
            Self::RemoveField { name } => DictionaryEdit::RemoveField { name: name.clone() },
            Self::Rename { old, new } => DictionaryEdit::Rename {
                old: old.clone(),
                new: new.clone(),
            },
        }
    }
}

#[derive(Args)]
pub struct PropagateArgs {
    #[command(flatten)]
    pub directory: DirectoryArgs,

    #[command(flatten)]
    pub dictionary: DictionaryArg,

    /// File name or path of the reference file.
    #[arg(long = "reference", value_name = "FILE")]
    pub reference: String,

    /// Assign a value on the reference file first (repeatable).
    ///
    /// VALUE is a base name, `[IGNORE]`, `[NEW BASE]`, or empty to clear.
    #[arg(long = "set", value_name = "FIELD=VALUE", value_parser = parse_set)]
    pub set: Vec<(String, Assignment)>,

    /// Show pending changes without committing or saving.
    #[arg(long = "dry-run")]
    pub dry_run: bool,

    #[arg(long = "json")]
    pub json: bool,
}

fn parse_set(text: &str) -> Result<(String, Assignment), String> {
    parse_assignment(text).map_err(|error| error.to_string())
}

/// CLI log level choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogLevelArg {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// CLI log format choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogFormatArg {
    Pretty,
    Compact,
    Json,
}
