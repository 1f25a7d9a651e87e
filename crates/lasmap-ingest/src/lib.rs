//! LAS header ingestion and dictionary persistence.
//!
//! - [`las`]: `~Version`/`~Well`/`~Curve` header reader
//! - [`encoding`]: UTF-8 / Windows-1252 decoding
//! - [`discovery`] and [`loader`]: find and parse a directory of `.las` files
//! - [`dictionary_csv`]: the dictionary CSV codec
//! - [`converter`]: import of the legacy three-file layout

pub mod converter;
pub mod dictionary_csv;
pub mod discovery;
pub mod encoding;
pub mod error;
pub mod las;
pub mod loader;

pub use converter::{ConversionReport, LegacyFiles, convert_legacy, convert_legacy_to_csv};
pub use dictionary_csv::{
    DictionaryLoadReport, DictionaryRecords, LoadedDictionary, dictionary_records,
    load_dictionary, parse_dictionary_csv, read_dictionary_records, save_dictionary,
    write_dictionary,
};
pub use discovery::{DiscoveryOptions, list_las_files};
pub use encoding::{TextEncoding, decode_text, read_text};
pub use error::{IngestError, Result};
pub use las::{parse_las, read_las_file};
pub use loader::{ParsedFile, load_directory, parse_files};
