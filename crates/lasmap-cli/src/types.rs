use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::Serialize;

use lasmap_ingest::DictionaryLoadReport;
use lasmap_map::{BatchClassification, CommitReport, SessionSummary};
use lasmap_model::DictionaryStats;

#[derive(Debug, Serialize)]
pub struct ScanResult {
    pub directory: PathBuf,
    pub dictionary: PathBuf,
    pub dictionary_report: DictionaryLoadReport,
    pub batch: BatchClassification,
    /// Unknown mnemonic (upper-cased) to number of occurrences.
    pub unknown: BTreeMap<String, usize>,
}

#[derive(Debug, Serialize)]
pub struct StatsResult {
    pub dictionary: PathBuf,
    pub stats: DictionaryStats,
    pub dictionary_report: DictionaryLoadReport,
}

/// One edit of the `dict` subcommand.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DictionaryEdit {
    AddBase { name: String, aliases: Vec<String> },
    AddAlias { base: String, field: String },
    Ignore { name: String },
    RemoveBase { name: String },
    RemoveField { name: String },
    Rename { old: String, new: String },
}

#[derive(Debug, Serialize)]
pub struct EditOutcome {
    pub dictionary: PathBuf,
    pub description: String,
    pub stats: DictionaryStats,
}

/// A row whose value differs from the dictionary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PendingChange {
    pub file: String,
    pub field: String,
    pub from: String,
    pub to: String,
}

#[derive(Debug, Serialize)]
pub struct PropagateResult {
    pub reference: String,
    /// Rows of the reference file changed by `--set`.
    pub assigned_rows: usize,
    /// Rows of other files changed by propagation.
    pub propagated_rows: usize,
    pub pending: Vec<PendingChange>,
    pub summary: SessionSummary,
    /// `None` on a dry run.
    pub commit: Option<CommitReport>,
}
