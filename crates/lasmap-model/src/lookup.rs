//! Case-insensitive name keys.
//!
//! Curve mnemonics are written by many different logging contractors, so the
//! same curve shows up as `GR`, `gr` or ` Gr `. Every lookup in the workspace
//! goes through [`NameKey`], which trims and upper-cases the raw text. The
//! original spelling is kept separately by whoever stores the name.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::ModelError;

/// Normalized lookup key for a field or base name.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct NameKey(String);

impl NameKey {
    /// Builds a key from raw text. Blank input is rejected.
    pub fn new(raw: &str) -> Result<Self, ModelError> {
        let trimmed = clean_name(raw);
        if trimmed.is_empty() {
            return Err(ModelError::InvalidName(raw.to_string()));
        }
        Ok(Self(trimmed.to_ascii_uppercase()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NameKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Trims surrounding whitespace (and a stray BOM) while preserving casing.
pub fn clean_name(raw: &str) -> &str {
    raw.trim().trim_matches('\u{feff}').trim()
}

/// Compares two names the way the dictionary does.
pub fn same_name(left: &str, right: &str) -> bool {
    clean_name(left).eq_ignore_ascii_case(clean_name(right))
}
