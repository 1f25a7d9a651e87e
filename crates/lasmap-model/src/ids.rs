use std::fmt;

/// Position of a file within a loaded batch.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
pub struct FileId(usize);

impl FileId {
    pub fn new(index: usize) -> Self {
        Self(index)
    }

    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for FileId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "file#{}", self.0)
    }
}

/// One curve occurrence inside one loaded file.
///
/// A mnemonic may be listed more than once in the same file, so rows are
/// addressed by position rather than by name.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
pub struct RowId {
    pub file: FileId,
    pub index: usize,
}

impl RowId {
    pub fn new(file: FileId, index: usize) -> Self {
        Self { file, index }
    }
}

impl fmt::Display for RowId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/row#{}", self.file, self.index)
    }
}
