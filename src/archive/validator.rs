//! Cheap structural checks run before any extraction work.
//!
//! Checks, in order, failing fast on the first unmet condition:
//! 1. the source is not empty,
//! 2. the first four bytes are a ZIP local-file-header signature,
//! 3. a forward scan over local file headers finds a `_chat.txt` entry.
//!
//! The scan reads only headers and names, seeking over entry data. When an
//! entry's size is not recorded in its local header (streamed entries with a
//! trailing data descriptor, or ZIP64 placeholders) the scan cannot skip it
//! and falls back to reading the central directory instead.

use std::io::{self, Read, Seek, SeekFrom};

use zip::ZipArchive;

use super::classify::is_transcript;
use crate::error::ValidationError;

/// `PK\x03\x04`
pub const LOCAL_FILE_HEADER_SIGNATURE: [u8; 4] = [0x50, 0x4b, 0x03, 0x04];

const LOCAL_HEADER_LEN: usize = 30;
const FLAG_DATA_DESCRIPTOR: u16 = 0x0008;
const ZIP64_PLACEHOLDER: u32 = 0xFFFF_FFFF;

/// Read-only validator for chat-export archives.
///
/// # Example
///
/// ```rust
/// use chatsift::archive::ArchiveValidator;
/// use chatsift::error::ValidationError;
/// use std::io::Cursor;
///
/// let result = ArchiveValidator::validate(&mut Cursor::new(Vec::new()));
/// assert!(matches!(result, Err(ValidationError::Empty)));
/// ```
pub struct ArchiveValidator;

enum ScanResult {
    Found,
    NotFound,
    /// An entry could not be skipped without decompressing it.
    Indeterminate,
}

impl ArchiveValidator {
    /// Validates `source` and rewinds it to the start on success.
    pub fn validate<R: Read + Seek>(source: &mut R) -> Result<(), ValidationError> {
        let len = source.seek(SeekFrom::End(0))?;
        if len == 0 {
            return Err(ValidationError::Empty);
        }

        source.seek(SeekFrom::Start(0))?;
        let mut signature = [0u8; 4];
        match source.read_exact(&mut signature) {
            Ok(()) => {}
            Err(e) if e.kind() == io::ErrorKind::UnexpectedEof => {
                return Err(ValidationError::NotAZip);
            }
            Err(e) => return Err(e.into()),
        }
        if signature != LOCAL_FILE_HEADER_SIGNATURE {
            return Err(ValidationError::NotAZip);
        }

        source.seek(SeekFrom::Start(0))?;
        let found = match scan_local_headers(source)? {
            ScanResult::Found => true,
            ScanResult::NotFound => false,
            ScanResult::Indeterminate => {
                tracing::debug!("Local header scan inconclusive, reading central directory");
                source.seek(SeekFrom::Start(0))?;
                scan_central_directory(source)?
            }
        };

        source.seek(SeekFrom::Start(0))?;
        if found {
            Ok(())
        } else {
            Err(ValidationError::MissingTranscript)
        }
    }
}

fn read_u16(bytes: &[u8], offset: usize) -> u16 {
    u16::from_le_bytes([bytes[offset], bytes[offset + 1]])
}

fn read_u32(bytes: &[u8], offset: usize) -> u32 {
    u32::from_le_bytes([
        bytes[offset],
        bytes[offset + 1],
        bytes[offset + 2],
        bytes[offset + 3],
    ])
}

fn base_name(entry_name: &str) -> &str {
    entry_name
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or(entry_name)
}

fn scan_local_headers<R: Read + Seek>(source: &mut R) -> io::Result<ScanResult> {
    let mut header = [0u8; LOCAL_HEADER_LEN];
    loop {
        match source.read_exact(&mut header) {
            Ok(()) => {}
            // Truncated trailer: nothing more to scan.
            Err(e) if e.kind() == io::ErrorKind::UnexpectedEof => return Ok(ScanResult::NotFound),
            Err(e) => return Err(e),
        }
        if header[..4] != LOCAL_FILE_HEADER_SIGNATURE {
            // Reached the central directory (or trailing garbage).
            return Ok(ScanResult::NotFound);
        }

        let flags = read_u16(&header, 6);
        let compressed_size = read_u32(&header, 18);
        let name_len = usize::from(read_u16(&header, 26));
        let extra_len = i64::from(read_u16(&header, 28));

        let mut name = vec![0u8; name_len];
        source.read_exact(&mut name)?;
        let name = String::from_utf8_lossy(&name);
        if is_transcript(base_name(&name)) {
            return Ok(ScanResult::Found);
        }

        let size_unknown = (flags & FLAG_DATA_DESCRIPTOR != 0 && compressed_size == 0)
            || compressed_size == ZIP64_PLACEHOLDER;
        if size_unknown {
            return Ok(ScanResult::Indeterminate);
        }

        source.seek(SeekFrom::Current(extra_len + i64::from(compressed_size)))?;
    }
}

fn scan_central_directory<R: Read + Seek>(source: &mut R) -> Result<bool, ValidationError> {
    let archive = ZipArchive::new(source).map_err(|e| {
        tracing::debug!(error = %e, "Central directory unreadable");
        ValidationError::NotAZip
    })?;
    let found = archive
        .file_names()
        .any(|name| is_transcript(base_name(name)));
    Ok(found)
}
