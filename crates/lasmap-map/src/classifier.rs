//! Per-file classification of curve mnemonics.

use std::collections::BTreeMap;
use std::fmt::Display;
use std::path::PathBuf;

use serde::Serialize;
use tracing::{debug, warn};

use lasmap_model::{Classification, CurveInfo, LogFile, WellHeader, display_name};

use crate::dictionary::AliasDictionary;

/// A curve together with its position in the file's curve list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClassifiedCurve {
    pub position: usize,
    pub curve: CurveInfo,
}

/// The three buckets of one file.
///
/// Every input curve lands in exactly one bucket, duplicates included, and
/// each bucket keeps input order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FileClassification {
    /// Base name (stored spelling) to the curves resolving to it.
    pub mapped: BTreeMap<String, Vec<ClassifiedCurve>>,
    pub ignored: Vec<ClassifiedCurve>,
    pub unknown: Vec<ClassifiedCurve>,
}

impl FileClassification {
    pub fn mapped_count(&self) -> usize {
        self.mapped.values().map(Vec::len).sum()
    }

    pub fn total(&self) -> usize {
        self.mapped_count() + self.ignored.len() + self.unknown.len()
    }

    pub fn unknown_mnemonics(&self) -> Vec<&str> {
        self.unknown
            .iter()
            .map(|entry| entry.curve.mnemonic.as_str())
            .collect()
    }

    /// Classification of every curve, back in input order.
    pub fn in_input_order(&self) -> Vec<(&ClassifiedCurve, Classification)> {
        let mut all: Vec<(&ClassifiedCurve, Classification)> = Vec::with_capacity(self.total());
        for (base, curves) in &self.mapped {
            all.extend(
                curves
                    .iter()
                    .map(|curve| (curve, Classification::Mapped(base.clone()))),
            );
        }
        all.extend(self.ignored.iter().map(|curve| (curve, Classification::Ignored)));
        all.extend(self.unknown.iter().map(|curve| (curve, Classification::Unknown)));
        all.sort_by_key(|(curve, _)| curve.position);
        all
    }
}

/// Buckets a curve list against the dictionary.
pub fn classify_curves(dictionary: &AliasDictionary, curves: &[CurveInfo]) -> FileClassification {
    let mut result = FileClassification::default();
    for (position, curve) in curves.iter().enumerate() {
        let entry = ClassifiedCurve {
            position,
            curve: curve.clone(),
        };
        match dictionary.classify(&curve.mnemonic) {
            Classification::Mapped(base) => result.mapped.entry(base).or_default().push(entry),
            Classification::Ignored => result.ignored.push(entry),
            Classification::Unknown => result.unknown.push(entry),
        }
    }
    result
}

pub fn classify_file(dictionary: &AliasDictionary, file: &LogFile) -> FileClassification {
    let result = classify_curves(dictionary, &file.curves);
    debug!(
        file = %file.display_name(),
        mapped = result.mapped_count(),
        ignored = result.ignored.len(),
        unknown = result.unknown.len(),
        "file classified"
    );
    result
}

/// Outcome for one file of a batch.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum FileOutcome {
    Classified {
        header: WellHeader,
        classification: FileClassification,
    },
    Failed {
        message: String,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FileReport {
    pub path: PathBuf,
    pub outcome: FileOutcome,
}

impl FileReport {
    pub fn name(&self) -> String {
        display_name(&self.path)
    }

    pub fn classification(&self) -> Option<&FileClassification> {
        match &self.outcome {
            FileOutcome::Classified { classification, .. } => Some(classification),
            FileOutcome::Failed { .. } => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match &self.outcome {
            FileOutcome::Failed { message } => Some(message),
            FileOutcome::Classified { .. } => None,
        }
    }
}

/// Counts across the files of a batch; failed files contribute only to
/// `failed_files`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ClassificationTotals {
    pub files: usize,
    pub failed_files: usize,
    pub mapped: usize,
    pub ignored: usize,
    pub unknown: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BatchClassification {
    pub files: Vec<FileReport>,
}

impl BatchClassification {
    pub fn totals(&self) -> ClassificationTotals {
        let mut totals = ClassificationTotals {
            files: self.files.len(),
            ..ClassificationTotals::default()
        };
        for report in &self.files {
            match report.classification() {
                Some(classification) => {
                    totals.mapped += classification.mapped_count();
                    totals.ignored += classification.ignored.len();
                    totals.unknown += classification.unknown.len();
                }
                None => totals.failed_files += 1,
            }
        }
        totals
    }

    /// Distinct unknown mnemonics across the batch with their occurrence
    /// counts, keyed by upper-cased mnemonic.
    pub fn unknown_mnemonics(&self) -> BTreeMap<String, usize> {
        let mut counts = BTreeMap::new();
        for classification in self.files.iter().filter_map(FileReport::classification) {
            for mnemonic in classification.unknown_mnemonics() {
                *counts
                    .entry(mnemonic.trim().to_ascii_uppercase())
                    .or_insert(0) += 1;
            }
        }
        counts
    }
}

/// Classifies the output of the LAS reader for a whole batch.
///
/// A reader error only marks its own file as failed.
pub fn classify_batch<I, E>(dictionary: &AliasDictionary, inputs: I) -> BatchClassification
where
    I: IntoIterator<Item = (PathBuf, Result<LogFile, E>)>,
    E: Display,
{
    let files = inputs
        .into_iter()
        .map(|(path, parsed)| {
            let outcome = match parsed {
                Ok(file) => FileOutcome::Classified {
                    classification: classify_file(dictionary, &file),
                    header: file.header,
                },
                Err(error) => {
                    warn!(path = %path.display(), %error, "file skipped");
                    FileOutcome::Failed {
                        message: error.to_string(),
                    }
                }
            };
            FileReport { path, outcome }
        })
        .collect();
    BatchClassification { files }
}
