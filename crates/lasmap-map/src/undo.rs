//! Undo history for curve-row assignments.
//!
//! The log stores `(row, previous value)` pairs grouped into units. A unit is
//! either one edit or everything recorded between `begin_batch` and the
//! matching `end_batch`, so an "apply to all files" run undoes in one step.
//! Replaying a unit is the session's job; see `ChangeSession::undo_last`.

use lasmap_model::{Assignment, RowId};

/// One recorded edit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UndoEntry {
    pub row: RowId,
    pub previous: Assignment,
}

/// A group of edits undone together.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UndoUnit {
    entries: Vec<UndoEntry>,
}

impl UndoUnit {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[UndoEntry] {
        &self.entries
    }

    /// Entries in the order they were recorded.
    pub fn into_entries(self) -> Vec<UndoEntry> {
        self.entries
    }

    /// Keeps only the first previous value per row, so that replaying the
    /// unit front to back restores the state before the whole unit.
    fn push(&mut self, row: RowId, previous: Assignment) {
        if self.entries.iter().any(|entry| entry.row == row) {
            return;
        }
        self.entries.push(UndoEntry { row, previous });
    }
}

/// Stack of undo units.
#[derive(Debug, Clone, Default)]
pub struct UndoLog {
    units: Vec<UndoUnit>,
    open: Option<UndoUnit>,
    batch_depth: usize,
    suppressed: usize,
    limit: Option<usize>,
}

impl UndoLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Keeps at most `limit` units; the oldest are dropped first.
    pub fn with_limit(limit: Option<usize>) -> Self {
        Self {
            limit,
            ..Self::default()
        }
    }

    pub fn len(&self) -> usize {
        self.units.len()
    }

    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }

    pub fn is_recording(&self) -> bool {
        self.suppressed == 0
    }

    pub fn is_batch_open(&self) -> bool {
        self.batch_depth > 0
    }

    /// Records an edit into the open batch, or as its own unit.
    ///
    /// Returns `false` when recording is suppressed.
    pub fn record(&mut self, row: RowId, previous: Assignment) -> bool {
        if !self.is_recording() {
            return false;
        }
        match self.open.as_mut() {
            Some(unit) => unit.push(row, previous),
            None => self.push_single(row, previous),
        }
        true
    }

    /// Pushes a one-entry unit.
    pub fn push_single(&mut self, row: RowId, previous: Assignment) {
        let mut unit = UndoUnit::default();
        unit.push(row, previous);
        self.push_unit(unit);
    }

    /// Opens a batch window. Nested windows fold into the outermost one.
    pub fn begin_batch(&mut self) {
        self.batch_depth += 1;
        if self.open.is_none() {
            self.open = Some(UndoUnit::default());
        }
    }

    /// Closes a batch window; the outermost close pushes the unit if it is
    /// not empty.
    pub fn end_batch(&mut self) {
        if self.batch_depth == 0 {
            return;
        }
        self.batch_depth -= 1;
        if self.batch_depth == 0
            && let Some(unit) = self.open.take()
            && !unit.is_empty()
        {
            self.push_unit(unit);
        }
    }

    pub fn pop(&mut self) -> Option<UndoUnit> {
        self.units.pop()
    }

    pub fn peek(&self) -> Option<&UndoUnit> {
        self.units.last()
    }

    /// Drops all history, including a batch that is still open.
    pub fn clear(&mut self) {
        self.units.clear();
        if let Some(unit) = self.open.as_mut() {
            unit.entries.clear();
        }
    }

    pub(crate) fn suppress(&mut self) {
        self.suppressed += 1;
    }

    pub(crate) fn resume(&mut self) {
        self.suppressed = self.suppressed.saturating_sub(1);
    }

    fn push_unit(&mut self, unit: UndoUnit) {
        self.units.push(unit);
        if let Some(limit) = self.limit
            && self.units.len() > limit
        {
            let excess = self.units.len() - limit;
            self.units.drain(0..excess);
        }
    }
}

#[cfg(test)]
mod tests {
    use lasmap_model::FileId;

    use super::*;

    fn row(index: usize) -> RowId {
        RowId::new(FileId::new(0), index)
    }

    #[test]
    fn single_edits_are_separate_units() {
        let mut log = UndoLog::new();
        log.record(row(0), Assignment::Unset);
        log.record(row(1), Assignment::Ignore);
        assert_eq!(log.len(), 2);
        assert_eq!(log.pop().unwrap().entries()[0].row, row(1));
    }

    #[test]
    fn batch_collects_one_unit() {
        let mut log = UndoLog::new();
        log.begin_batch();
        log.record(row(0), Assignment::Unset);
        log.begin_batch();
        log.record(row(1), Assignment::Unset);
        log.end_batch();
        assert!(log.is_empty());
        log.end_batch();
        assert_eq!(log.len(), 1);
        assert_eq!(log.peek().unwrap().len(), 2);
    }

    #[test]
    fn empty_batch_pushes_nothing() {
        let mut log = UndoLog::new();
        log.begin_batch();
        log.end_batch();
        assert!(log.is_empty());
        log.end_batch();
        assert!(!log.is_batch_open());
    }

    #[test]
    fn batch_keeps_first_previous_value_per_row() {
        let mut log = UndoLog::new();
        log.begin_batch();
        log.record(row(3), Assignment::Unset);
        log.record(row(3), Assignment::base("GR"));
        log.end_batch();
        let unit = log.pop().unwrap();
        assert_eq!(unit.len(), 1);
        assert_eq!(unit.entries()[0].previous, Assignment::Unset);
    }

    #[test]
    fn suppressed_log_records_nothing() {
        let mut log = UndoLog::new();
        log.suppress();
        assert!(!log.record(row(0), Assignment::Unset));
        log.resume();
        assert!(log.record(row(0), Assignment::Unset));
        assert_eq!(log.len(), 1);
    }

    #[test]
    fn limit_drops_oldest_units() {
        let mut log = UndoLog::with_limit(Some(2));
        for index in 0..4 {
            log.record(row(index), Assignment::Unset);
        }
        assert_eq!(log.len(), 2);
        assert_eq!(log.pop().unwrap().entries()[0].row, row(3));
        assert_eq!(log.pop().unwrap().entries()[0].row, row(2));
    }
}
