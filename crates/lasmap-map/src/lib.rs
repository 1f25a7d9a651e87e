#![deny(unsafe_code)]

pub mod classifier;
pub mod dictionary;
pub mod error;
pub mod propagate;
pub mod session;
pub mod undo;

pub use classifier::{
    BatchClassification, ClassificationTotals, ClassifiedCurve, FileClassification, FileOutcome,
    FileReport, classify_batch, classify_curves, classify_file,
};
pub use dictionary::{AliasDictionary, BaseGroup, LoadReport};
pub use error::{InvariantViolation, MapError, Result};
pub use propagate::BatchPropagator;
pub use session::{
    BatchScope, ChangeSession, CommitFailure, CommitReport, CurveRow, FileSummary, LoadedFile,
    RecordingSuppressed, SessionEvent, SessionOptions, SessionSummary,
};
pub use undo::{UndoEntry, UndoLog, UndoUnit};
