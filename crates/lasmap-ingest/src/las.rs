//! LAS 2.0 header reader.
//!
//! Only the header is read: `~Version`, `~Well` and `~Curve`. Reading stops
//! at `~A`, so the data section is never decoded. Header lines have the form
//!
//! ```text
//! MNEM.UNIT    DATA : DESCRIPTION
//! ```
//!
//! where the unit runs from the first `.` to the next whitespace and the
//! description follows the last `:`.

use std::path::Path;

use tracing::debug;

use lasmap_model::{CurveInfo, LogFile, WellHeader};

use crate::encoding::read_text;
use crate::error::{IngestError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    Version,
    Well,
    Curve,
    Other,
}

impl Section {
    fn from_line(line: &str) -> Option<Self> {
        let name = line.strip_prefix('~')?;
        let section = match name.chars().next().map(|c| c.to_ascii_uppercase()) {
            Some('V') => Self::Version,
            Some('W') => Self::Well,
            Some('C') => Self::Curve,
            _ => Self::Other,
        };
        Some(section)
    }
}

/// One `MNEM.UNIT DATA : DESCRIPTION` line.
#[derive(Debug, Clone, PartialEq, Eq)]
struct HeaderLine<'a> {
    mnemonic: &'a str,
    unit: &'a str,
    value: &'a str,
    description: &'a str,
}

fn split_header_line(line: &str) -> Option<HeaderLine<'_>> {
    let (mnemonic, rest) = line.split_once('.')?;
    let unit_end = rest.find(char::is_whitespace).unwrap_or(rest.len());
    let (unit, rest) = rest.split_at(unit_end);
    let (value, description) = match rest.rfind(':') {
        Some(colon) => (&rest[..colon], &rest[colon + 1..]),
        None => (rest, ""),
    };
    Some(HeaderLine {
        mnemonic: mnemonic.trim(),
        unit: unit.trim(),
        value: value.trim(),
        description: description.trim(),
    })
}

fn non_empty(text: &str) -> Option<String> {
    (!text.is_empty()).then(|| text.to_string())
}

fn apply_well_line(header: &mut WellHeader, line: &HeaderLine<'_>) {
    let number = || line.value.parse::<f64>().ok();
    match line.mnemonic.to_ascii_uppercase().as_str() {
        "STRT" => {
            header.start = number();
            header.depth_unit = non_empty(line.unit);
        }
        "STOP" => header.stop = number(),
        "STEP" => header.step = number(),
        "NULL" => header.null_value = number(),
        // LAS 1.2 files put the well name in the description column.
        "WELL" => header.well_name = non_empty(line.value).or_else(|| non_empty(line.description)),
        _ => {}
    }
}

/// Parses the header of a decoded LAS file.
pub fn parse_las(path: &Path, text: &str) -> Result<LogFile> {
    let mut file = LogFile::new(path);
    let mut section = None;
    let mut saw_curves = false;

    for (index, raw) in text.lines().enumerate() {
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        if let Some(next) = Section::from_line(line) {
            if line[1..].starts_with(['A', 'a']) {
                break;
            }
            saw_curves |= next == Section::Curve;
            section = Some(next);
            continue;
        }

        match section {
            Some(Section::Curve) => {
                let parsed = split_header_line(line)
                    .filter(|parsed| !parsed.mnemonic.is_empty())
                    .ok_or_else(|| IngestError::LasParse {
                        path: path.to_path_buf(),
                        line: index + 1,
                        message: format!("expected 'MNEM.UNIT : DESCRIPTION', found '{line}'"),
                    })?;
                let mut curve = CurveInfo::new(parsed.mnemonic);
                curve.unit = non_empty(parsed.unit);
                curve.description = non_empty(parsed.description);
                file.curves.push(curve);
            }
            Some(Section::Well) => match split_header_line(line) {
                Some(parsed) => apply_well_line(&mut file.header, &parsed),
                None => debug!(path = %path.display(), line = index + 1, "well line skipped"),
            },
            Some(Section::Version | Section::Other) | None => {}
        }
    }

    if !saw_curves {
        return Err(IngestError::MissingCurveSection {
            path: path.to_path_buf(),
        });
    }
    debug!(path = %path.display(), curves = file.curves.len(), "LAS header parsed");
    Ok(file)
}

/// Reads and parses one LAS file from disk.
pub fn read_las_file(path: &Path) -> Result<LogFile> {
    let (text, _) = read_text(path)?;
    parse_las(path, &text)
}
