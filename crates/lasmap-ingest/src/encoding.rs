//! Text decoding for LAS headers.
//!
//! LAS files in the wild are mostly ASCII, UTF-8 or Windows-1252 (degree
//! signs and accented descriptions). UTF-16 files are rejected.

use std::borrow::Cow;
use std::path::Path;

use encoding_rs::{Encoding, UTF_8, UTF_16BE, UTF_16LE, WINDOWS_1252};

use crate::error::{IngestError, Result};

/// Encoding a file was decoded with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextEncoding {
    Utf8,
    Windows1252,
}

impl TextEncoding {
    pub fn name(self) -> &'static str {
        match self {
            Self::Utf8 => UTF_8.name(),
            Self::Windows1252 => WINDOWS_1252.name(),
        }
    }
}

/// Decodes file bytes, stripping a UTF-8 BOM and falling back to
/// Windows-1252 when the bytes are not valid UTF-8.
pub fn decode_text<'a>(path: &Path, bytes: &'a [u8]) -> Result<(Cow<'a, str>, TextEncoding)> {
    let mut body = bytes;
    if let Some((encoding, bom_len)) = Encoding::for_bom(bytes) {
        if encoding == UTF_16LE || encoding == UTF_16BE {
            return Err(IngestError::UnsupportedEncoding {
                path: path.to_path_buf(),
                encoding: encoding.name(),
            });
        }
        body = &bytes[bom_len..];
    }

    if let Some(text) = UTF_8.decode_without_bom_handling_and_without_replacement(body) {
        return Ok((text, TextEncoding::Utf8));
    }
    let (text, _) = WINDOWS_1252.decode_without_bom_handling(body);
    tracing::debug!(path = %path.display(), "decoded as windows-1252");
    Ok((text, TextEncoding::Windows1252))
}

/// Reads and decodes a whole text file.
pub fn read_text(path: &Path) -> Result<(String, TextEncoding)> {
    let bytes = std::fs::read(path).map_err(|e| IngestError::read(path, e))?;
    let (text, encoding) = decode_text(path, &bytes)?;
    Ok((text.into_owned(), encoding))
}
