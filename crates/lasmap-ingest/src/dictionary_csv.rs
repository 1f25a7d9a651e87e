//! Dictionary persistence as `FieldName,PrimaryName,Status,Description` CSV.

use std::fs::{self, File};
use std::io::Write;
use std::path::Path;

use serde::Serialize;
use tracing::{info, warn};

use lasmap_map::{AliasDictionary, LoadReport};
use lasmap_model::{DictionaryRecord, RecordStatus};

use crate::encoding::read_text;
use crate::error::{IngestError, Result};

pub const FIELD_NAME_COLUMN: &str = "FieldName";
pub const PRIMARY_NAME_COLUMN: &str = "PrimaryName";
pub const STATUS_COLUMN: &str = "Status";
pub const DESCRIPTION_COLUMN: &str = "Description";

/// Records read from a dictionary file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DictionaryRecords {
    pub records: Vec<DictionaryRecord>,
    /// Rows whose status was not `base`, `alias` or `ignore`.
    pub unknown_status: usize,
}

/// A dictionary loaded from disk, with what was refused on the way.
#[derive(Debug, Clone, Default)]
pub struct LoadedDictionary {
    pub dictionary: AliasDictionary,
    pub report: DictionaryLoadReport,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DictionaryLoadReport {
    #[serde(flatten)]
    pub load: LoadReport,
    pub unknown_status: usize,
}

fn header_index(headers: &csv::StringRecord, name: &str) -> Option<usize> {
    headers.iter().position(|h| h.eq_ignore_ascii_case(name))
}

fn get_string(row: &csv::StringRecord, idx: Option<usize>) -> String {
    idx.and_then(|i| row.get(i))
        .map(|s| s.trim().to_string())
        .unwrap_or_default()
}

/// Parses dictionary CSV text. `path` is only used in errors.
pub fn parse_dictionary_csv(path: &Path, text: &str) -> Result<DictionaryRecords> {
    let csv_error = |source| IngestError::Csv {
        path: path.to_path_buf(),
        source,
    };
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(text.as_bytes());
    let headers = reader.headers().map_err(csv_error)?.clone();

    let required = |column: &'static str| {
        header_index(&headers, column).ok_or_else(|| IngestError::MissingColumn {
            column,
            path: path.to_path_buf(),
        })
    };
    let idx_field = required(FIELD_NAME_COLUMN)?;
    let idx_primary = required(PRIMARY_NAME_COLUMN)?;
    let idx_status = required(STATUS_COLUMN)?;
    let idx_description = header_index(&headers, DESCRIPTION_COLUMN);

    let mut result = DictionaryRecords::default();
    for row in reader.records() {
        let row = row.map_err(csv_error)?;
        let status_text = get_string(&row, Some(idx_status));
        let Ok(status) = status_text.parse::<RecordStatus>() else {
            warn!(
                path = %path.display(),
                line = row.position().map_or(0, csv::Position::line),
                status = %status_text,
                "unknown dictionary status; row skipped"
            );
            result.unknown_status += 1;
            continue;
        };
        let description = Some(get_string(&row, idx_description));
        result.records.push(
            DictionaryRecord {
                field_name: get_string(&row, Some(idx_field)),
                primary_name: get_string(&row, Some(idx_primary)),
                status,
                description: None,
            }
            .with_description(description),
        );
    }
    Ok(result)
}

pub fn read_dictionary_records(path: &Path) -> Result<DictionaryRecords> {
    let (text, _) = read_text(path)?;
    parse_dictionary_csv(path, &text)
}

/// Reads a dictionary file and builds the dictionary.
pub fn load_dictionary(path: &Path) -> Result<LoadedDictionary> {
    let parsed = read_dictionary_records(path)?;
    let (dictionary, load) = AliasDictionary::from_records(&parsed.records);
    if let Err(violation) = dictionary.validate() {
        warn!(path = %path.display(), %violation, "dictionary invariant violated after load");
    }
    info!(
        path = %path.display(),
        bases = load.bases,
        aliases = load.aliases,
        ignored = load.ignored,
        rejected = load.rejected.len(),
        unknown_status = parsed.unknown_status,
        "dictionary loaded"
    );
    Ok(LoadedDictionary {
        dictionary,
        report: DictionaryLoadReport {
            load,
            unknown_status: parsed.unknown_status,
        },
    })
}

/// Records in save order: each base name followed by its aliases, bases
/// alphabetical, then the ignored names.
pub fn dictionary_records(dictionary: &AliasDictionary) -> Vec<DictionaryRecord> {
    let describe = |name: &str| dictionary.description(name).map(str::to_string);
    let mut records = Vec::with_capacity(dictionary.len());
    for group in dictionary.grouped() {
        records.push(DictionaryRecord::base(&group.base).with_description(describe(&group.base)));
        for alias in &group.aliases {
            records.push(
                DictionaryRecord::alias(alias, &group.base).with_description(describe(alias)),
            );
        }
    }
    for name in dictionary.ignored_names() {
        records.push(DictionaryRecord::ignore(&name).with_description(describe(&name)));
    }
    records
}

/// Writes the dictionary as CSV and hands the writer back.
pub fn write_dictionary<W: Write>(
    writer: W,
    dictionary: &AliasDictionary,
) -> std::result::Result<W, csv::Error> {
    let mut csv_writer = csv::WriterBuilder::new()
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(writer);
    csv_writer.write_record([
        FIELD_NAME_COLUMN,
        PRIMARY_NAME_COLUMN,
        STATUS_COLUMN,
        DESCRIPTION_COLUMN,
    ])?;
    for record in dictionary_records(dictionary) {
        csv_writer.write_record([
            record.field_name.as_str(),
            record.primary_name.as_str(),
            record.status.as_str(),
            record.description.as_deref().unwrap_or(""),
        ])?;
    }
    csv_writer
        .into_inner()
        .map_err(|e| csv::Error::from(e.into_error()))
}

fn write_temp(temp_path: &Path, dictionary: &AliasDictionary) -> Result<()> {
    let file = File::create(temp_path).map_err(|e| IngestError::write(temp_path, e))?;
    let file = write_dictionary(file, dictionary).map_err(|source| IngestError::Csv {
        path: temp_path.to_path_buf(),
        source,
    })?;
    file.sync_all()
        .map_err(|e| IngestError::write(temp_path, e))
}

/// Saves the dictionary through a temp file and rename. A failed save
/// removes the temp file and leaves `path` as it was.
pub fn save_dictionary(path: &Path, dictionary: &AliasDictionary) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| IngestError::write(parent, e))?;
    }

    let temp_path = path.with_extension("csv.tmp");
    let written = write_temp(&temp_path, dictionary).and_then(|()| {
        fs::rename(&temp_path, path).map_err(|e| IngestError::AtomicWriteFailed {
            temp_path: temp_path.clone(),
            target_path: path.to_path_buf(),
            source: e,
        })
    });
    if let Err(error) = written {
        if temp_path.exists()
            && let Err(cleanup) = fs::remove_file(&temp_path)
        {
            warn!(path = %temp_path.display(), error = %cleanup, "temp file not removed");
        }
        return Err(error);
    }

    let stats = dictionary.statistics();
    info!(
        path = %path.display(),
        bases = stats.base_count,
        aliases = stats.alias_count,
        ignored = stats.ignored_count,
        "dictionary saved"
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(text: &str) -> DictionaryRecords {
        parse_dictionary_csv(Path::new("dict.csv"), text).unwrap()
    }

    #[test]
    fn test_status_is_case_insensitive_and_unknown_skipped() {
        let parsed = parse(
            "FieldName,PrimaryName,Status,Description\n\
             GR,GR,BASE,Gamma ray\n\
             GRC, GR ,Alias,\n\
             XX,,maybe,\n",
        );
        assert_eq!(parsed.unknown_status, 1);
        assert_eq!(parsed.records.len(), 2);
        assert_eq!(parsed.records[0].description.as_deref(), Some("Gamma ray"));
        assert_eq!(parsed.records[1], DictionaryRecord::alias("GRC", "GR"));
    }

    #[test]
    fn test_columns_found_in_any_order() {
        let parsed = parse("status,fieldname,primaryname\nignore,SP,\n");
        assert_eq!(parsed.records, vec![DictionaryRecord::ignore("SP")]);
    }

    #[test]
    fn test_missing_column() {
        let err = parse_dictionary_csv(Path::new("dict.csv"), "FieldName,Status\n").unwrap_err();
        assert!(matches!(
            err,
            IngestError::MissingColumn {
                column: PRIMARY_NAME_COLUMN,
                ..
            }
        ));
    }
}
