use anyhow::{Context, Result};
use serde::Serialize;

use lasmap_cli::pipeline::{
    PropagateRequest, dictionary_stats, edit_dictionary, propagate, scan_directory,
};

use crate::cli::{DictArgs, PropagateArgs, ScanArgs, StatsArgs};
use crate::summary::{print_edit, print_propagate, print_scan, print_stats};

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value).context("serialize result")?;
    println!("{json}");
    Ok(())
}

pub fn run_scan(args: &ScanArgs) -> Result<()> {
    let options = args.directory.discovery_options();
    let result = scan_directory(&args.directory.dir, &args.dictionary.dictionary, &options)?;
    if args.json {
        print_json(&result)
    } else {
        print_scan(&result, args.details);
        Ok(())
    }
}

pub fn run_stats(args: &StatsArgs) -> Result<()> {
    let result = dictionary_stats(&args.dictionary.dictionary)?;
    if args.json {
        print_json(&result)
    } else {
        print_stats(&result);
        Ok(())
    }
}

pub fn run_dict(args: &DictArgs) -> Result<()> {
    let path = args
        .dictionary
        .as_deref()
        .context("--dictionary <CSV> is required")?;
    let outcome = edit_dictionary(path, &args.action.to_edit())?;
    if args.json {
        print_json(&outcome)
    } else {
        print_edit(&outcome);
        Ok(())
    }
}

/// Returns whether every pending change was committed.
pub fn run_propagate(args: &PropagateArgs) -> Result<bool> {
    let request = PropagateRequest {
        dir: &args.directory.dir,
        dictionary: &args.dictionary.dictionary,
        reference: &args.reference,
        assignments: &args.set,
        options: args.directory.discovery_options(),
        dry_run: args.dry_run,
    };
    let result = propagate(&request)?;
    if args.json {
        print_json(&result)?;
    } else {
        print_propagate(&result);
    }
    Ok(result.commit.as_ref().is_none_or(|report| report.is_clean()))
}
