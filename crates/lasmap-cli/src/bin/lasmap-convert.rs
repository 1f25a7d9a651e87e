//! Converts the legacy ignored/primary/alias files into a dictionary CSV.

use std::io::{self, IsTerminal};
use std::path::PathBuf;

use clap::Parser;
use clap_verbosity_flag::{Verbosity, WarnLevel};
use lasmap_cli::convert::{collect_paths, run_convert};
use lasmap_cli::logging::{LogConfig, init_logging};

#[derive(Parser)]
#[command(
    name = "lasmap-convert",
    version,
    about = "Convert legacy ignored/primary/alias files into a dictionary CSV",
    long_about = "Convert legacy ignored/primary/alias files into a dictionary CSV.\n\n\
                  Paths not given on the command line are asked for interactively."
)]
struct Args {
    /// Ignored names, one per line.
    #[arg(value_name = "IGNORED")]
    ignored: Option<PathBuf>,

    /// Primary names, one per line.
    #[arg(value_name = "PRIMARY")]
    primary: Option<PathBuf>,

    /// Alias rows `PRIMARY,ALIAS1,ALIAS2,...`.
    #[arg(value_name = "ALIASES")]
    aliases: Option<PathBuf>,

    /// Dictionary CSV to write.
    #[arg(value_name = "OUTPUT")]
    output: Option<PathBuf>,

    #[command(flatten)]
    verbosity: Verbosity<WarnLevel>,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_logging(
        &LogConfig::default()
            .with_level_filter(args.verbosity.tracing_level_filter())
            .with_env_filter(!args.verbosity.is_present())
            .with_ansi(io::stderr().is_terminal()),
    )?;

    let mut input = io::stdin().lock();
    let mut output = io::stdout().lock();
    let Some(paths) = collect_paths(
        [args.ignored, args.primary, args.aliases, args.output],
        &mut input,
        &mut output,
    )?
    else {
        println!();
        println!("No path given; nothing converted.");
        return Ok(());
    };
    run_convert(&paths, &mut output)?;
    Ok(())
}
