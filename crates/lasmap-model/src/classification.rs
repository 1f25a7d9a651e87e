//! Result of looking a mnemonic up in the alias dictionary.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Outcome of a single dictionary lookup.
///
/// The base name is carried inside the `Mapped` variant so that "is it
/// ignored" and "what does it map to" can never disagree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", content = "base", rename_all = "snake_case")]
pub enum Classification {
    /// No dictionary entry.
    Unknown,
    /// Explicitly excluded from mapping.
    Ignored,
    /// Resolves to the given base name (stored casing).
    Mapped(String),
}

impl Classification {
    pub fn status(&self) -> CurveStatus {
        match self {
            Self::Unknown => CurveStatus::Unknown,
            Self::Ignored => CurveStatus::Ignored,
            Self::Mapped(_) => CurveStatus::Mapped,
        }
    }

    pub fn base_name(&self) -> Option<&str> {
        match self {
            Self::Mapped(base) => Some(base),
            _ => None,
        }
    }
}

/// Bucket a curve falls into, without the base name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CurveStatus {
    Unknown,
    Ignored,
    Mapped,
}

impl CurveStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Unknown => "unknown",
            Self::Ignored => "ignored",
            Self::Mapped => "mapped",
        }
    }
}

impl fmt::Display for CurveStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
