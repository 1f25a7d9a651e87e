//! Error types for dictionary and session operations.
//!
//! Routine dictionary mutations (`add_alias_to_base` on an unknown base and
//! friends) report failure with `bool`; the variants here cover addressing
//! mistakes and the composite rename, which must fail loudly.

use lasmap_model::{FileId, RowId};
use thiserror::Error;

/// Errors from mapping operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MapError {
    /// File is not part of the loaded batch.
    #[error("file not loaded: {0}")]
    UnknownFile(FileId),
    /// Row index is out of range for its file.
    #[error("row not found: {0}")]
    UnknownRow(RowId),
    /// File was loaded but its header could not be parsed.
    #[error("file {file} failed to load: {message}")]
    FailedFile { file: FileId, message: String },
    /// Name is not a base name in the dictionary.
    #[error("base name not found: {0}")]
    BaseNameNotFound(String),
    /// Name is already a different base name.
    #[error("base name already exists: {0}")]
    BaseNameExists(String),
    /// Blank or otherwise unusable name.
    #[error("invalid name: {0:?}")]
    InvalidName(String),
    /// Composite rename could not be completed; the dictionary was restored.
    #[error("could not rename '{old}' to '{new}'")]
    RenameFailed { old: String, new: String },
}

/// Result type for mapping operations.
pub type Result<T> = std::result::Result<T, MapError>;

/// A broken dictionary invariant, reported by `AliasDictionary::validate`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvariantViolation {
    #[error("base name '{0}' has no self-mapping entry")]
    MissingSelfMapping(String),
    #[error("base name '{0}' is marked as ignored")]
    IgnoredBase(String),
    #[error("field '{field}' maps to '{base}', which is not a base name")]
    DanglingAlias { field: String, base: String },
}
