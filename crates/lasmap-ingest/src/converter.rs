//! Conversion from the legacy three-file dictionary layout.
//!
//! The legacy layout kept ignored names and primary names in plain text
//! files (one name per line) and aliases in a CSV file whose rows read
//! `PRIMARY,ALIAS1,ALIAS2,...`.

use std::path::Path;

use serde::Serialize;
use tracing::info;

use lasmap_map::{AliasDictionary, LoadReport};
use lasmap_model::{DictionaryRecord, clean_name};

use crate::dictionary_csv::save_dictionary;
use crate::encoding::read_text;
use crate::error::{IngestError, Result};

/// Paths of the three legacy files.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LegacyFiles<'a> {
    pub ignored: &'a Path,
    pub primary: &'a Path,
    pub aliases: &'a Path,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ConversionReport {
    pub primary_names: usize,
    pub alias_rows: usize,
    pub ignored_names: usize,
    pub load: LoadReport,
}

fn read_name_list(path: &Path) -> Result<Vec<String>> {
    let (text, _) = read_text(path)?;
    Ok(text
        .lines()
        .map(clean_name)
        .filter(|name| !name.is_empty())
        .map(str::to_string)
        .collect())
}

fn read_alias_rows(path: &Path) -> Result<Vec<Vec<String>>> {
    let (text, _) = read_text(path)?;
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(text.as_bytes());

    let mut rows = Vec::new();
    for row in reader.records() {
        let row = row.map_err(|source| IngestError::Csv {
            path: path.to_path_buf(),
            source,
        })?;
        let names: Vec<String> = row
            .iter()
            .filter(|cell| !cell.is_empty())
            .map(str::to_string)
            .collect();
        if !names.is_empty() {
            rows.push(names);
        }
    }
    Ok(rows)
}

/// Builds a dictionary from the legacy files.
///
/// Every primary of an alias row becomes a base name even when the primary
/// file does not list it. Alias rows are applied after the ignored list, so
/// a name found in both ends up mapped.
pub fn convert_legacy(files: &LegacyFiles<'_>) -> Result<(AliasDictionary, ConversionReport)> {
    let primary = read_name_list(files.primary)?;
    let alias_rows = read_alias_rows(files.aliases)?;
    let ignored = read_name_list(files.ignored)?;

    let mut records: Vec<DictionaryRecord> =
        primary.iter().map(DictionaryRecord::base).collect();
    records.extend(alias_rows.iter().map(|row| DictionaryRecord::base(&row[0])));
    records.extend(ignored.iter().map(DictionaryRecord::ignore));
    for row in &alias_rows {
        records.extend(
            row[1..]
                .iter()
                .map(|alias| DictionaryRecord::alias(alias, &row[0])),
        );
    }

    let (dictionary, load) = AliasDictionary::from_records(&records);
    let report = ConversionReport {
        primary_names: primary.len(),
        alias_rows: alias_rows.len(),
        ignored_names: ignored.len(),
        load,
    };
    Ok((dictionary, report))
}

/// Converts the legacy files and saves the result as dictionary CSV.
pub fn convert_legacy_to_csv(files: &LegacyFiles<'_>, output: &Path) -> Result<ConversionReport> {
    let (dictionary, report) = convert_legacy(files)?;
    save_dictionary(output, &dictionary)?;
    info!(
        output = %output.display(),
        primary = report.primary_names,
        alias_rows = report.alias_rows,
        ignored = report.ignored_names,
        rejected = report.load.rejected.len(),
        "legacy dictionary converted"
    );
    Ok(report)
}
