//! "Apply to all files": copy a reference file's assignments to every other
//! file of the session.

use std::collections::HashMap;

use tracing::{debug, info};

use lasmap_model::{Assignment, FileId, NameKey, RowId};

use crate::error::{MapError, Result};
use crate::session::ChangeSession;

/// Field-name to assignment table built from one reference file.
#[derive(Debug, Clone)]
pub struct BatchPropagator {
    reference: FileId,
    table: HashMap<NameKey, Assignment>,
}

impl BatchPropagator {
    /// Reads the current assignments of `reference`.
    ///
    /// The first occurrence of a field name wins and unset rows are skipped.
    pub fn new(session: &ChangeSession, reference: FileId) -> Result<Self> {
        let file = session
            .file(reference)
            .ok_or(MapError::UnknownFile(reference))?;
        if let Some(message) = &file.error {
            return Err(MapError::FailedFile {
                file: reference,
                message: message.clone(),
            });
        }

        let mut table = HashMap::new();
        for row in file.rows.iter().filter(|row| row.assigned().is_set()) {
            if let Ok(key) = NameKey::new(&row.field_name) {
                table.entry(key).or_insert_with(|| row.assigned().clone());
            }
        }
        debug!(file = %file.name(), fields = table.len(), "propagation table built");
        Ok(Self { reference, table })
    }

    pub fn reference(&self) -> FileId {
        self.reference
    }

    pub fn len(&self) -> usize {
        self.table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    /// Rows of the other files that `apply` would change, with their new value.
    pub fn targets(&self, session: &ChangeSession) -> Vec<(RowId, Assignment)> {
        session
            .files()
            .iter()
            .filter(|file| file.id != self.reference && !file.is_failed())
            .flat_map(|file| file.row_ids().zip(file.rows.iter()))
            .filter_map(|(id, row)| {
                let key = NameKey::new(&row.field_name).ok()?;
                let value = self.table.get(&key)?;
                (row.assigned() != value).then(|| (id, value.clone()))
            })
            .collect()
    }

    /// Applies the table as one undo unit. Returns the number of changed rows.
    pub fn apply(&self, session: &mut ChangeSession) -> Result<usize> {
        let targets = self.targets(session);
        let mut changed = 0;
        {
            let mut batch = session.batch();
            for (id, value) in targets {
                if batch.record_assignment(id, value)? {
                    changed += 1;
                }
            }
        }
        info!(reference = %self.reference, rows = changed, "assignments propagated");
        Ok(changed)
    }
}
