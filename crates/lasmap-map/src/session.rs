//! Pending curve-row edits across a batch of loaded files.
//!
//! A [`ChangeSession`] owns one row per curve of every loaded file. Each row
//! carries the value the dictionary gave it at load time (`original`) and the
//! value the analyst has assigned since (`assigned`). Edits go through
//! [`ChangeSession::record_assignment`], which feeds the undo log and emits a
//! [`SessionEvent`]; the [`SessionSummary`] aggregate is updated from those
//! events only.

use std::collections::BTreeSet;
use std::fmt::Display;
use std::ops::{Deref, DerefMut};
use std::path::PathBuf;

use serde::Serialize;
use tracing::{debug, info, warn};

use lasmap_model::{
    Assignment, CurveStatus, FileId, LogFile, NameKey, RowId, WellHeader, display_name,
    same_name,
};

use crate::classifier::{BatchClassification, FileOutcome, classify_batch};
use crate::dictionary::AliasDictionary;
use crate::error::{MapError, Result};
use crate::undo::UndoLog;

/// Session configuration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SessionOptions {
    /// Maximum number of undo units kept; `None` keeps everything.
    pub undo_limit: Option<usize>,
}

impl SessionOptions {
    #[must_use]
    pub fn with_undo_limit(mut self, limit: usize) -> Self {
        self.undo_limit = Some(limit);
        self
    }
}

/// One curve of one loaded file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CurveRow {
    pub field_name: String,
    pub unit: Option<String>,
    pub description: Option<String>,
    assigned: Assignment,
    original: Assignment,
}

impl CurveRow {
    fn new(
        field_name: String,
        unit: Option<String>,
        description: Option<String>,
        value: Assignment,
    ) -> Self {
        Self {
            field_name,
            unit,
            description,
            assigned: value.clone(),
            original: value,
        }
    }

    pub fn assigned(&self) -> &Assignment {
        &self.assigned
    }

    pub fn original(&self) -> &Assignment {
        &self.original
    }

    pub fn status(&self) -> CurveStatus {
        self.assigned.status()
    }

    pub fn is_modified(&self) -> bool {
        self.assigned != self.original
    }

    fn assign(&mut self, value: Assignment) -> Assignment {
        std::mem::replace(&mut self.assigned, value)
    }

    fn set_original(&mut self, value: Assignment) {
        self.original = value;
    }
}

/// A file of the batch. Failed files have an error and no rows.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LoadedFile {
    pub id: FileId,
    pub path: PathBuf,
    pub header: WellHeader,
    pub rows: Vec<CurveRow>,
    pub error: Option<String>,
}

impl LoadedFile {
    pub fn name(&self) -> String {
        display_name(&self.path)
    }

    pub fn is_failed(&self) -> bool {
        self.error.is_some()
    }

    pub fn row_ids(&self) -> impl Iterator<Item = RowId> + '_ {
        (0..self.rows.len()).map(|index| RowId::new(self.id, index))
    }
}

/// Per-file counts for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileSummary {
    pub id: FileId,
    pub name: String,
    pub rows: usize,
    pub modified: usize,
    pub unknown: usize,
    pub ignored: usize,
    pub mapped: usize,
    pub error: Option<String>,
}

impl FileSummary {
    fn of(file: &LoadedFile) -> Self {
        let mut summary = Self {
            id: file.id,
            name: file.name(),
            rows: file.rows.len(),
            modified: 0,
            unknown: 0,
            ignored: 0,
            mapped: 0,
            error: file.error.clone(),
        };
        for row in &file.rows {
            summary.modified += usize::from(row.is_modified());
            match row.status() {
                CurveStatus::Unknown => summary.unknown += 1,
                CurveStatus::Ignored => summary.ignored += 1,
                CurveStatus::Mapped => summary.mapped += 1,
            }
        }
        summary
    }
}

/// Totals across all non-failed files.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SessionSummary {
    pub files: usize,
    pub failed_files: usize,
    pub rows: usize,
    pub modified: usize,
    pub unknown: usize,
    pub ignored: usize,
    pub mapped: usize,
}

impl SessionSummary {
    pub fn has_unsaved_changes(&self) -> bool {
        self.modified > 0
    }

    fn from_files(files: &[LoadedFile]) -> Self {
        let mut summary = Self {
            files: files.len(),
            ..Self::default()
        };
        for file in files {
            if file.is_failed() {
                summary.failed_files += 1;
                continue;
            }
            let counts = FileSummary::of(file);
            summary.rows += counts.rows;
            summary.modified += counts.modified;
            summary.unknown += counts.unknown;
            summary.ignored += counts.ignored;
            summary.mapped += counts.mapped;
        }
        summary
    }

    fn count_status(&mut self, status: CurveStatus, added: bool) {
        let slot = match status {
            CurveStatus::Unknown => &mut self.unknown,
            CurveStatus::Ignored => &mut self.ignored,
            CurveStatus::Mapped => &mut self.mapped,
        };
        *slot = if added {
            *slot + 1
        } else {
            slot.saturating_sub(1)
        };
    }

    /// The aggregator. Row changes are applied incrementally; bulk events
    /// recount from the files.
    fn apply(&mut self, event: &SessionEvent, files: &[LoadedFile]) {
        match event {
            SessionEvent::RowChanged {
                previous,
                current,
                was_modified,
                modified,
                ..
            } => {
                self.count_status(previous.status(), false);
                self.count_status(current.status(), true);
                match (was_modified, modified) {
                    (false, true) => self.modified += 1,
                    (true, false) => self.modified = self.modified.saturating_sub(1),
                    _ => {}
                }
            }
            SessionEvent::Undone { .. } => {}
            SessionEvent::Loaded { .. }
            | SessionEvent::Committed { .. }
            | SessionEvent::Resynced
            | SessionEvent::Renamed { .. } => *self = Self::from_files(files),
        }
    }
}

/// Emitted once per session mutation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum SessionEvent {
    Loaded {
        files: usize,
        failed: usize,
    },
    RowChanged {
        row: RowId,
        previous: Assignment,
        current: Assignment,
        was_modified: bool,
        modified: bool,
    },
    Undone {
        rows: usize,
    },
    Committed {
        applied: usize,
        failed: usize,
    },
    Resynced,
    Renamed {
        old: String,
        new: String,
        rows: usize,
    },
}

/// A modified row the dictionary refused during commit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CommitFailure {
    pub row: RowId,
    pub field_name: String,
    pub assignment: Assignment,
}

impl CommitFailure {
    pub fn message(&self) -> String {
        match &self.assignment {
            Assignment::Ignore => {
                format!("'{}' is a base name and cannot be ignored", self.field_name)
            }
            Assignment::Unset => format!(
                "'{}' is a base name or unknown and cannot be cleared",
                self.field_name
            ),
            Assignment::NewBase => format!("'{}' cannot become a base name", self.field_name),
            Assignment::Base(base) => {
                format!("'{}' cannot be mapped to '{base}'", self.field_name)
            }
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CommitReport {
    /// Dictionary mutations that succeeded.
    pub applied: usize,
    pub failures: Vec<CommitFailure>,
    /// Rows whose value changed while re-reading the dictionary afterwards.
    pub reclassified: usize,
}

impl CommitReport {
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Change-tracking state for one batch of files.
#[derive(Debug, Default)]
pub struct ChangeSession {
    files: Vec<LoadedFile>,
    undo: UndoLog,
    summary: SessionSummary,
    events: Vec<SessionEvent>,
    options: SessionOptions,
}

impl ChangeSession {
    pub fn new(options: SessionOptions) -> Self {
        Self {
            undo: UndoLog::with_limit(options.undo_limit),
            options,
            ..Self::default()
        }
    }

    pub fn options(&self) -> SessionOptions {
        self.options
    }

    /// Replaces the batch with freshly classified files and clears undo.
    pub fn load<I, E>(&mut self, dictionary: &AliasDictionary, inputs: I)
    where
        I: IntoIterator<Item = (PathBuf, std::result::Result<LogFile, E>)>,
        E: Display,
    {
        self.load_classified(classify_batch(dictionary, inputs));
    }

    /// Loads files that all parsed successfully.
    pub fn load_files(&mut self, dictionary: &AliasDictionary, files: Vec<LogFile>) {
        self.load(
            dictionary,
            files
                .into_iter()
                .map(|file| (file.path.clone(), Ok::<_, std::convert::Infallible>(file))),
        );
    }

    /// Loads an already classified batch.
    pub fn load_classified(&mut self, batch: BatchClassification) {
        self.files = batch
            .files
            .into_iter()
            .enumerate()
            .map(|(index, report)| {
                let id = FileId::new(index);
                match report.outcome {
                    FileOutcome::Classified {
                        header,
                        classification,
                    } => {
                        let rows = classification
                            .in_input_order()
                            .into_iter()
                            .map(|(entry, class)| {
                                CurveRow::new(
                                    entry.curve.mnemonic.clone(),
                                    entry.curve.unit.clone(),
                                    entry.curve.description.clone(),
                                    Assignment::from_classification(&class),
                                )
                            })
                            .collect();
                        LoadedFile {
                            id,
                            path: report.path,
                            header,
                            rows,
                            error: None,
                        }
                    }
                    FileOutcome::Failed { message } => LoadedFile {
                        id,
                        path: report.path,
                        header: WellHeader::default(),
                        rows: Vec::new(),
                        error: Some(message),
                    },
                }
            })
            .collect();
        self.undo = UndoLog::with_limit(self.options.undo_limit);

        let failed = self.files.iter().filter(|file| file.is_failed()).count();
        info!(files = self.files.len(), failed, "session loaded");
        self.emit(SessionEvent::Loaded {
            files: self.files.len(),
            failed,
        });
    }

    pub fn files(&self) -> &[LoadedFile] {
        &self.files
    }

    pub fn file(&self, id: FileId) -> Option<&LoadedFile> {
        self.files.get(id.index())
    }

    /// Finds a loaded file by file name or full path.
    pub fn find_file(&self, name: &str) -> Option<&LoadedFile> {
        self.files
            .iter()
            .find(|file| file.path.to_str() == Some(name))
            .or_else(|| self.files.iter().find(|file| file.name() == name))
    }

    pub fn row(&self, id: RowId) -> Result<&CurveRow> {
        let file = self.files.get(id.file.index()).ok_or(MapError::UnknownFile(id.file))?;
        if let Some(message) = &file.error {
            return Err(MapError::FailedFile {
                file: id.file,
                message: message.clone(),
            });
        }
        file.rows.get(id.index).ok_or(MapError::UnknownRow(id))
    }

    /// Modified rows in file order.
    pub fn pending_changes(&self) -> Vec<(RowId, &CurveRow)> {
        self.files
            .iter()
            .flat_map(|file| file.row_ids().zip(file.rows.iter()))
            .filter(|(_, row)| row.is_modified())
            .collect()
    }

    pub fn summary(&self) -> SessionSummary {
        self.summary
    }

    pub fn file_summaries(&self) -> Vec<FileSummary> {
        self.files.iter().map(FileSummary::of).collect()
    }

    /// Takes the events emitted since the last drain.
    pub fn drain_events(&mut self) -> Vec<SessionEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn can_undo(&self) -> bool {
        !self.undo.is_empty()
    }

    pub fn undo_depth(&self) -> usize {
        self.undo.len()
    }

    /// Sets a row's value. Returns `Ok(false)` when the value is unchanged.
    pub fn record_assignment(&mut self, id: RowId, value: Assignment) -> Result<bool> {
        self.row(id)?;
        let value = value.normalized();
        let row = &mut self.files[id.file.index()].rows[id.index];
        if row.assigned == value {
            return Ok(false);
        }
        let was_modified = row.is_modified();
        let previous = row.assign(value.clone());
        let modified = row.is_modified();

        self.undo.record(id, previous.clone());
        debug!(row = %id, from = %previous, to = %value, "row assigned");
        self.emit(SessionEvent::RowChanged {
            row: id,
            previous,
            current: value,
            was_modified,
            modified,
        });
        Ok(true)
    }

    /// Reverts the most recent undo unit. Returns the number of rows reverted.
    pub fn undo_last(&mut self) -> usize {
        let Some(unit) = self.undo.pop() else {
            return 0;
        };
        let mut reverted = 0;
        {
            let mut quiet = self.suppress_recording();
            for entry in unit.into_entries() {
                match quiet.record_assignment(entry.row, entry.previous) {
                    Ok(true) => reverted += 1,
                    Ok(false) => {}
                    Err(error) => warn!(%error, "undo entry skipped"),
                }
            }
        }
        debug!(rows = reverted, "undo applied");
        self.emit(SessionEvent::Undone { rows: reverted });
        reverted
    }

    /// Writes every modified row into the dictionary.
    ///
    /// Afterwards every row sharing a touched field name is re-read from the
    /// dictionary, all rows become unmodified and the undo log is cleared.
    pub fn commit(&mut self, dictionary: &mut AliasDictionary) -> CommitReport {
        let pending: Vec<(RowId, String, Assignment)> = self
            .pending_changes()
            .into_iter()
            .map(|(id, row)| (id, row.field_name.clone(), row.assigned.clone()))
            .collect();

        let mut report = CommitReport::default();
        let mut touched: BTreeSet<NameKey> = BTreeSet::new();
        for (id, field, assignment) in pending {
            let applied = match &assignment {
                Assignment::Ignore => dictionary.add_ignored(&field),
                Assignment::NewBase => dictionary.add_base_name(&field, [&field]).is_some(),
                Assignment::Base(base) if !dictionary.is_base_name(base) => {
                    // A base name cannot be re-pointed at a new base.
                    if dictionary.is_base_name(&field) {
                        false
                    } else {
                        touched.extend(NameKey::new(base).ok());
                        dictionary
                            .add_base_name(base, [&field])
                            .is_some_and(|mapped| mapped == 1 || same_name(base, &field))
                    }
                }
                Assignment::Base(base) => dictionary.add_alias_to_base(base, &field),
                Assignment::Unset => dictionary.remove_field_name(&field),
            };
            touched.extend(NameKey::new(&field).ok());
            if applied {
                report.applied += 1;
            } else {
                let failure = CommitFailure {
                    row: id,
                    field_name: field,
                    assignment,
                };
                warn!(row = %id, reason = %failure.message(), "commit rejected");
                report.failures.push(failure);
            }
        }

        let resweep: Vec<(RowId, Assignment)> = self
            .files
            .iter()
            .flat_map(|file| file.row_ids().zip(file.rows.iter()))
            .filter(|(_, row)| {
                NameKey::new(&row.field_name).is_ok_and(|key| touched.contains(&key))
            })
            .map(|(id, row)| {
                (
                    id,
                    Assignment::from_classification(&dictionary.classify(&row.field_name)),
                )
            })
            .collect();
        {
            let mut quiet = self.suppress_recording();
            for (id, value) in resweep {
                if let Ok(true) = quiet.record_assignment(id, value) {
                    report.reclassified += 1;
                }
            }
        }

        for row in self.files.iter_mut().flat_map(|file| file.rows.iter_mut()) {
            let value = row.assigned.clone();
            row.set_original(value);
        }
        self.undo.clear();

        info!(
            applied = report.applied,
            failed = report.failures.len(),
            reclassified = report.reclassified,
            "session committed"
        );
        self.emit(SessionEvent::Committed {
            applied: report.applied,
            failed: report.failures.len(),
        });
        report
    }

    /// Re-reads every row's committed value after the dictionary changed
    /// outside the session. Pending edits survive; undo is cleared.
    pub fn resync(&mut self, dictionary: &AliasDictionary) {
        for row in self.files.iter_mut().flat_map(|file| file.rows.iter_mut()) {
            let current = Assignment::from_classification(&dictionary.classify(&row.field_name));
            if !row.is_modified() {
                row.assign(current.clone());
            }
            row.set_original(current);
        }
        self.undo.clear();
        debug!("session resynced");
        self.emit(SessionEvent::Resynced);
    }

    /// Renames a base name in the dictionary and re-points every row assigned
    /// to it. Returns the number of re-pointed rows.
    pub fn rename_base_name(
        &mut self,
        dictionary: &mut AliasDictionary,
        old: &str,
        new: &str,
    ) -> Result<usize> {
        dictionary.rename_base_name(old, new)?;
        let stored = dictionary.stored_spelling(new).unwrap_or(new).to_string();
        let old_value = Assignment::base(old);

        let mut repointed = 0;
        for row in self.files.iter_mut().flat_map(|file| file.rows.iter_mut()) {
            let was_modified = row.is_modified();
            let moved = row.assigned == old_value;
            if moved {
                row.assign(Assignment::Base(stored.clone()));
                repointed += 1;
            }
            let current = Assignment::from_classification(&dictionary.classify(&row.field_name));
            if !was_modified && !moved {
                row.assign(current.clone());
            }
            row.set_original(current);
        }
        self.undo.clear();

        info!(old = %old, new = %stored, rows = repointed, "base name renamed in session");
        self.emit(SessionEvent::Renamed {
            old: old.to_string(),
            new: stored,
            rows: repointed,
        });
        Ok(repointed)
    }

    /// Disables undo recording until the guard is dropped.
    pub fn suppress_recording(&mut self) -> RecordingSuppressed<'_> {
        self.undo.suppress();
        RecordingSuppressed { session: self }
    }

    /// Groups every edit made through the guard into one undo unit.
    pub fn batch(&mut self) -> BatchScope<'_> {
        self.undo.begin_batch();
        BatchScope { session: self }
    }

    fn emit(&mut self, event: SessionEvent) {
        self.summary.apply(&event, &self.files);
        self.events.push(event);
    }
}

/// Guard returned by [`ChangeSession::suppress_recording`].
pub struct RecordingSuppressed<'a> {
    session: &'a mut ChangeSession,
}

impl Deref for RecordingSuppressed<'_> {
    type Target = ChangeSession;

    fn deref(&self) -> &ChangeSession {
        self.session
    }
}

impl DerefMut for RecordingSuppressed<'_> {
    fn deref_mut(&mut self) -> &mut ChangeSession {
        self.session
    }
}

impl Drop for RecordingSuppressed<'_> {
    fn drop(&mut self) {
        self.session.undo.resume();
    }
}

/// Guard returned by [`ChangeSession::batch`].
pub struct BatchScope<'a> {
    session: &'a mut ChangeSession,
}

impl Deref for BatchScope<'_> {
    type Target = ChangeSession;

    fn deref(&self) -> &ChangeSession {
        self.session
    }
}

impl DerefMut for BatchScope<'_> {
    fn deref_mut(&mut self) -> &mut ChangeSession {
        self.session
    }
}

impl Drop for BatchScope<'_> {
    fn drop(&mut self) {
        self.session.undo.end_batch();
    }
}
