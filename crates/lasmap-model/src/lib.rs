//! Value types shared by the lasmap crates.

#![deny(unsafe_code)]

pub mod assignment;
pub mod classification;
pub mod curve;
pub mod error;
pub mod ids;
pub mod lookup;
pub mod record;

pub use assignment::{Assignment, IGNORE_MARKER, NEW_BASE_MARKER};
pub use classification::{Classification, CurveStatus};
pub use curve::{CurveInfo, LogFile, WellHeader, display_name};
pub use error::{ModelError, Result};
pub use ids::{FileId, RowId};
pub use lookup::{NameKey, clean_name, same_name};
pub use record::{DictionaryRecord, DictionaryStats, RecordStatus};
