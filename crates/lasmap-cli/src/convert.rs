//! Interactive front end for the legacy dictionary converter.

use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use lasmap_ingest::{ConversionReport, LegacyFiles, convert_legacy_to_csv};

pub const IGNORED_LABEL: &str = "Ignored names file";
pub const PRIMARY_LABEL: &str = "Primary names file";
pub const ALIASES_LABEL: &str = "Alias CSV file";
pub const OUTPUT_LABEL: &str = "Output dictionary CSV";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConvertPaths {
    pub ignored: PathBuf,
    pub primary: PathBuf,
    pub aliases: PathBuf,
    pub output: PathBuf,
}

/// Returns `given`, or prompts for a path on `output` and reads one line
/// from `input`. A blank answer or end of input yields `None`.
pub fn resolve_path<R: BufRead, W: Write>(
    given: Option<PathBuf>,
    label: &str,
    input: &mut R,
    output: &mut W,
) -> io::Result<Option<PathBuf>> {
    if given.is_some() {
        return Ok(given);
    }
    write!(output, "{label}: ")?;
    output.flush()?;
    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        return Ok(None);
    }
    let answer = line.trim();
    Ok((!answer.is_empty()).then(|| PathBuf::from(answer)))
}

/// Fills in the four paths, prompting for those not given.
pub fn collect_paths<R: BufRead, W: Write>(
    given: [Option<PathBuf>; 4],
    input: &mut R,
    output: &mut W,
) -> io::Result<Option<ConvertPaths>> {
    let [ignored, primary, aliases, target] = given;
    let Some(ignored) = resolve_path(ignored, IGNORED_LABEL, input, output)? else {
        return Ok(None);
    };
    let Some(primary) = resolve_path(primary, PRIMARY_LABEL, input, output)? else {
        return Ok(None);
    };
    let Some(aliases) = resolve_path(aliases, ALIASES_LABEL, input, output)? else {
        return Ok(None);
    };
    let Some(target) = resolve_path(target, OUTPUT_LABEL, input, output)? else {
        return Ok(None);
    };
    Ok(Some(ConvertPaths {
        ignored,
        primary,
        aliases,
        output: target,
    }))
}

/// Describes the first unusable path, if any.
pub fn check_paths(paths: &ConvertPaths) -> Option<String> {
    let inputs: [(&str, &Path); 3] = [
        (IGNORED_LABEL, &paths.ignored),
        (PRIMARY_LABEL, &paths.primary),
        (ALIASES_LABEL, &paths.aliases),
    ];
    for (label, path) in inputs {
        if !path.is_file() {
            return Some(format!("{label} not found: {}", path.display()));
        }
    }
    if paths.output.is_dir() {
        return Some(format!(
            "{OUTPUT_LABEL} is a directory: {}",
            paths.output.display()
        ));
    }
    None
}

/// Converts when every path is usable. Problems with the paths are written
/// to `output` and yield `Ok(None)`.
pub fn run_convert<W: Write>(paths: &ConvertPaths, output: &mut W) -> Result<Option<ConversionReport>> {
    if let Some(message) = check_paths(paths) {
        writeln!(output, "{message}")?;
        return Ok(None);
    }
    let files = LegacyFiles {
        ignored: &paths.ignored,
        primary: &paths.primary,
        aliases: &paths.aliases,
    };
    let report = convert_legacy_to_csv(&files, &paths.output)
        .with_context(|| format!("convert into {}", paths.output.display()))?;
    writeln!(
        output,
        "Wrote {}: {} base name(s), {} alias(es), {} ignored",
        paths.output.display(),
        report.load.bases,
        report.load.aliases,
        report.load.ignored
    )?;
    if !report.load.rejected.is_empty() {
        writeln!(output, "{} record(s) rejected:", report.load.rejected.len())?;
        for record in &report.load.rejected {
            writeln!(
                output,
                "  {} -> {} ({})",
                record.field_name, record.primary_name, record.status
            )?;
        }
    }
    Ok(Some(report))
}
