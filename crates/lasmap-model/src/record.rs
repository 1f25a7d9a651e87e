//! Flat dictionary records as exchanged with the persistence codec.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ModelError;

/// Status column of a dictionary record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecordStatus {
    Base,
    Alias,
    Ignore,
}

impl RecordStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Base => "base",
            Self::Alias => "alias",
            Self::Ignore => "ignore",
        }
    }
}

impl FromStr for RecordStatus {
    type Err = ModelError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "base" => Ok(Self::Base),
            "alias" => Ok(Self::Alias),
            "ignore" => Ok(Self::Ignore),
            _ => Err(ModelError::UnknownStatus(value.to_string())),
        }
    }
}

impl fmt::Display for RecordStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One `(FieldName, PrimaryName, Status, Description)` row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DictionaryRecord {
    pub field_name: String,
    pub primary_name: String,
    pub status: RecordStatus,
    pub description: Option<String>,
}

impl DictionaryRecord {
    pub fn base(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            primary_name: name.clone(),
            field_name: name,
            status: RecordStatus::Base,
            description: None,
        }
    }

    pub fn alias(field_name: impl Into<String>, primary_name: impl Into<String>) -> Self {
        Self {
            field_name: field_name.into(),
            primary_name: primary_name.into(),
            status: RecordStatus::Alias,
            description: None,
        }
    }

    pub fn ignore(field_name: impl Into<String>) -> Self {
        Self {
            field_name: field_name.into(),
            primary_name: String::new(),
            status: RecordStatus::Ignore,
            description: None,
        }
    }

    #[must_use]
    pub fn with_description(mut self, description: Option<String>) -> Self {
        self.description = description.filter(|text| !text.trim().is_empty());
        self
    }
}

/// Dictionary size summary.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DictionaryStats {
    pub base_count: usize,
    /// Field names mapped to a base other than themselves.
    pub alias_count: usize,
    pub ignored_count: usize,
}

impl DictionaryStats {
    pub fn total_fields(&self) -> usize {
        self.base_count + self.alias_count + self.ignored_count
    }
}
