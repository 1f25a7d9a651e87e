//! Curve and well header metadata handed over by the LAS reader.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// One entry of a LAS `~Curve` section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurveInfo {
    /// Mnemonic exactly as written in the file.
    pub mnemonic: String,
    pub unit: Option<String>,
    pub description: Option<String>,
}

impl CurveInfo {
    pub fn new(mnemonic: impl Into<String>) -> Self {
        Self {
            mnemonic: mnemonic.into(),
            unit: None,
            description: None,
        }
    }

    #[must_use]
    pub fn with_unit(mut self, unit: impl Into<String>) -> Self {
        self.unit = Some(unit.into());
        self
    }

    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// Numeric fields of the `~Well` section.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WellHeader {
    pub well_name: Option<String>,
    pub start: Option<f64>,
    pub stop: Option<f64>,
    pub step: Option<f64>,
    pub null_value: Option<f64>,
    /// Unit of STRT/STOP/STEP (usually `M` or `FT`).
    pub depth_unit: Option<String>,
}

/// The parsed header of one well-log file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogFile {
    pub path: PathBuf,
    pub header: WellHeader,
    pub curves: Vec<CurveInfo>,
}

impl LogFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            header: WellHeader::default(),
            curves: Vec::new(),
        }
    }

    /// Convenience constructor for a file known only by its mnemonics.
    pub fn from_mnemonics<I, S>(path: impl Into<PathBuf>, mnemonics: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            path: path.into(),
            header: WellHeader::default(),
            curves: mnemonics.into_iter().map(CurveInfo::new).collect(),
        }
    }

    pub fn mnemonics(&self) -> impl Iterator<Item = &str> {
        self.curves.iter().map(|curve| curve.mnemonic.as_str())
    }

    /// File name for display, falling back to the full path.
    pub fn display_name(&self) -> String {
        display_name(&self.path)
    }
}

pub fn display_name(path: &Path) -> String {
    path.file_name()
        .and_then(|name| name.to_str())
        .map(str::to_string)
        .unwrap_or_else(|| path.display().to_string())
}
