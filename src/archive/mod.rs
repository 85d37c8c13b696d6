//! Archive validation and extraction.
//!
//! - [`ArchiveValidator`] - structural checks before any extraction
//! - [`ArchiveExtractor`] - bounded-buffer streaming extraction
//! - [`classify`] - filename patterns for transcript / voice note / media
//!
//! Archives are read through any `Read + Seek` handle, so callers can pass a
//! `File`, a `Cursor<Vec<u8>>`, or a platform content stream.

pub mod classify;
mod extractor;
mod validator;

pub use classify::{EntryKind, TRANSCRIPT_NAME, classify_entry};
pub use extractor::{ArchiveExtractionResult, ArchiveExtractor, sanitize_entry_path};
pub use validator::{ArchiveValidator, LOCAL_FILE_HEADER_SIGNATURE};
