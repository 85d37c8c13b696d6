//! Streaming extraction of chat-export archives.
//!
//! Entries are copied one at a time through a fixed-size buffer, so memory
//! use does not depend on archive or entry size. Entry paths are never
//! trusted: any path that would escape the output directory is rejected and
//! the entry skipped.
//!
//! Partially extracted files are left in place on failure; cleaning up the
//! output directory is the caller's job.

use std::fs::{self, File};
use std::io::{self, Read, Seek, Write};
use std::path::{Component, Path, PathBuf};

use zip::ZipArchive;

use super::classify::{EntryKind, classify_entry};
use crate::cancel::CancellationToken;
use crate::config::ExtractorConfig;
use crate::error::Result;

/// Paths of the categorized entries written by [`ArchiveExtractor::extract`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ArchiveExtractionResult {
    /// First `_chat.txt` entry, if present.
    pub transcript_path: Option<PathBuf>,
    pub media_files: Vec<PathBuf>,
    pub voice_note_files: Vec<PathBuf>,
    /// Extracted but uncategorized entries.
    pub other_files: Vec<PathBuf>,
    /// Entry names rejected for unsafe paths.
    pub skipped_entries: Vec<String>,
}

impl ArchiveExtractionResult {
    /// Total number of files written to disk.
    pub fn extracted_count(&self) -> usize {
        usize::from(self.transcript_path.is_some())
            + self.media_files.len()
            + self.voice_note_files.len()
            + self.other_files.len()
    }
}

/// Streams ZIP entries into an output directory.
///
/// # Example
///
/// ```rust,no_run
/// use chatsift::archive::ArchiveExtractor;
/// use std::fs::File;
/// use std::path::Path;
///
/// let extractor = ArchiveExtractor::new();
/// let result = extractor.extract(File::open("WhatsApp Chat.zip")?, Path::new("out"))?;
/// println!("transcript: {:?}", result.transcript_path);
/// # Ok::<(), chatsift::ChatsiftError>(())
/// ```
#[derive(Debug, Clone, Default)]
pub struct ArchiveExtractor {
    config: ExtractorConfig,
    cancel: Option<CancellationToken>,
}

impl ArchiveExtractor {
    /// Creates an extractor with the default 8KB buffer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an extractor with custom configuration.
    pub fn with_config(config: ExtractorConfig) -> Self {
        Self {
            config,
            cancel: None,
        }
    }

    /// Observes `token` between entries.
    #[must_use]
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = Some(token);
        self
    }

    /// Extracts every entry of `source` below `output_dir`.
    pub fn extract<R: Read + Seek>(
        &self,
        source: R,
        output_dir: &Path,
    ) -> Result<ArchiveExtractionResult> {
        fs::create_dir_all(output_dir)?;
        let mut archive = ZipArchive::new(source)?;
        let mut buffer = vec![0u8; self.config.buffer_size.max(1)];
        let mut result = ArchiveExtractionResult::default();

        for index in 0..archive.len() {
            if let Some(token) = &self.cancel {
                token.check()?;
            }

            let mut entry = archive.by_index(index)?;
            let name = entry.name().to_string();

            let Some(relative) = sanitize_entry_path(&name) else {
                tracing::warn!(entry = %name, "Skipping archive entry with unsafe path");
                result.skipped_entries.push(name);
                continue;
            };
            let target = output_dir.join(&relative);

            if entry.is_dir() {
                fs::create_dir_all(&target).map_err(|e| describe(&name, e))?;
                continue;
            }
            if let Some(parent) = target.parent() {
                fs::create_dir_all(parent).map_err(|e| describe(&name, e))?;
            }

            let written = copy_entry(&mut entry, &target, &mut buffer).map_err(|e| describe(&name, e))?;
            tracing::debug!(entry = %name, bytes = written, "Extracted entry");

            let file_name = relative
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();

            match classify_entry(&file_name) {
                EntryKind::Transcript if result.transcript_path.is_none() => {
                    result.transcript_path = Some(target);
                }
                EntryKind::Transcript => {
                    tracing::warn!(entry = %name, "Ignoring additional transcript entry");
                    result.other_files.push(target);
                }
                EntryKind::VoiceNote => result.voice_note_files.push(target),
                EntryKind::Media => result.media_files.push(target),
                EntryKind::Other => result.other_files.push(target),
            }
        }

        tracing::info!(
            transcript = result.transcript_path.is_some(),
            media = result.media_files.len(),
            voice_notes = result.voice_note_files.len(),
            skipped = result.skipped_entries.len(),
            "Archive extracted"
        );
        Ok(result)
    }
}

fn describe(entry: &str, err: io::Error) -> io::Error {
    io::Error::new(err.kind(), format!("failed to extract '{entry}': {err}"))
}

/// Maps an entry name to a relative path that stays inside the output dir.
///
/// Returns `None` for absolute paths, drive prefixes, `..` components, or
/// names that reduce to nothing.
pub fn sanitize_entry_path(name: &str) -> Option<PathBuf> {
    let normalized = name.replace('\\', "/");
    let mut relative = PathBuf::new();
    for component in Path::new(&normalized).components() {
        match component {
            Component::Normal(part) if part.to_string_lossy().ends_with(':') => return None,
            Component::Normal(part) => relative.push(part),
            Component::CurDir => {}
            Component::ParentDir | Component::RootDir | Component::Prefix(_) => return None,
        }
    }
    if relative.as_os_str().is_empty() {
        None
    } else {
        Some(relative)
    }
}

fn copy_entry(reader: &mut impl Read, target: &Path, buffer: &mut [u8]) -> io::Result<u64> {
    let mut file = File::create(target)?;
    let mut written: u64 = 0;
    loop {
        let n = match reader.read(buffer) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        };
        file.write_all(&buffer[..n])?;
        written = written.saturating_add(n as u64);
    }
    file.flush()?;
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ChatsiftError;
    use std::io::Cursor;
    use zip::write::SimpleFileOptions;
    use zip::{CompressionMethod, ZipWriter};

    fn build_zip(entries: &[(&str, &[u8])]) -> Cursor<Vec<u8>> {
        let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
        let options = SimpleFileOptions::default().compression_method(CompressionMethod::Stored);
        for (name, data) in entries {
            writer.start_file(*name, options).unwrap();
            writer.write_all(data).unwrap();
        }
        let mut cursor = writer.finish().unwrap();
        cursor.set_position(0);
        cursor
    }

    #[test]
    fn test_sanitize_rejects_traversal() {
        assert_eq!(sanitize_entry_path("../evil.txt"), None);
        assert_eq!(sanitize_entry_path("a/../../evil.txt"), None);
        assert_eq!(sanitize_entry_path("/etc/passwd"), None);
        assert_eq!(sanitize_entry_path("..\\evil.txt"), None);
        assert_eq!(sanitize_entry_path("./"), None);
        assert_eq!(sanitize_entry_path("C:\\Windows\\evil.txt"), None);
    }

    #[test]
    fn test_sanitize_keeps_nested() {
        assert_eq!(
            sanitize_entry_path("./media/IMG-1.jpg"),
            Some(PathBuf::from("media/IMG-1.jpg"))
        );
    }

    #[test]
    fn test_extract_classifies_entries() {
        let dir = tempfile::tempdir().unwrap();
        let source = build_zip(&[
            ("_chat.txt", b"12/31/23, 11:59 PM - A: hi"),
            ("PTT-20231231-WA0001.opus", b"OggS"),
            ("IMG-20231231-WA0002.jpg", b"jpeg"),
            ("random.bin", b"??"),
        ]);

        let result = ArchiveExtractor::new().extract(source, dir.path()).unwrap();

        let transcript = result.transcript_path.clone().unwrap();
        assert_eq!(
            fs::read_to_string(transcript).unwrap(),
            "12/31/23, 11:59 PM - A: hi"
        );
        assert_eq!(result.voice_note_files.len(), 1);
        assert_eq!(result.media_files.len(), 1);
        assert_eq!(result.other_files.len(), 1);
        assert_eq!(result.extracted_count(), 4);
        assert!(dir.path().join("random.bin").exists());
    }

    #[test]
    fn test_extract_skips_traversal_entries() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("out");
        let source = build_zip(&[("../escape.txt", b"nope"), ("_chat.txt", b"x")]);

        let result = ArchiveExtractor::new().extract(source, &out).unwrap();

        assert_eq!(result.skipped_entries, vec!["../escape.txt".to_string()]);
        assert!(!dir.path().join("escape.txt").exists());
        assert!(result.transcript_path.is_some());
    }

    #[test]
    fn test_small_buffer_copies_whole_entry() {
        let dir = tempfile::tempdir().unwrap();
        let payload = vec![7u8; 10_000];
        let source = build_zip(&[("VID-20240101-WA0001.mp4", &payload)]);

        let extractor = ArchiveExtractor::with_config(ExtractorConfig::new().with_buffer_size(16));
        let result = extractor.extract(source, dir.path()).unwrap();

        let written = fs::read(&result.media_files[0]).unwrap();
        assert_eq!(written.len(), 10_000);
    }

    #[test]
    fn test_extract_cancelled_between_entries() {
        let dir = tempfile::tempdir().unwrap();
        let source = build_zip(&[("_chat.txt", b"x")]);
        let token = CancellationToken::new();
        token.cancel();

        let err = ArchiveExtractor::new()
            .with_cancellation(token)
            .extract(source, dir.path())
            .unwrap_err();
        assert!(matches!(err, ChatsiftError::Cancelled));
    }

    #[test]
    fn test_extract_rejects_non_zip() {
        let dir = tempfile::tempdir().unwrap();
        let err = ArchiveExtractor::new()
            .extract(Cursor::new(b"plain text".to_vec()), dir.path())
            .unwrap_err();
        assert!(matches!(err, ChatsiftError::Zip(_)));
    }
}
