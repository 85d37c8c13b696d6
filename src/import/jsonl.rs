//! JSON Lines store.
//!
//! Writes one JSONL file per record kind plus a pretty-printed
//! `analytics.json`:
//!
//! ```text
//! out/
//! ├── messages.jsonl
//! ├── voice_notes.jsonl
//! ├── phrases.jsonl
//! └── analytics.json
//! ```
//!
//! Each batch is flushed before the call returns, so a failed import leaves
//! every previously accepted batch on disk.

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use serde::Serialize;

use super::store::ImportStore;
use crate::analytics::{CommunicationPatterns, PhraseFrequency, SentimentDistribution};
use crate::error::{ChatsiftError, Result};
use crate::message::{Message, VoiceNoteRecord};

pub const MESSAGES_FILE: &str = "messages.jsonl";
pub const VOICE_NOTES_FILE: &str = "voice_notes.jsonl";
pub const PHRASES_FILE: &str = "phrases.jsonl";
pub const ANALYTICS_FILE: &str = "analytics.json";

#[derive(Serialize)]
struct AnalyticsSummary<'a> {
    sentiment: &'a SentimentDistribution,
    patterns: &'a CommunicationPatterns,
}

/// Persists import results as JSON Lines under one directory.
///
/// # Example
///
/// ```rust,no_run
/// use chatsift::import::{ImportOrchestrator, JsonlStore};
/// use std::path::Path;
///
/// let store = JsonlStore::create("out")?;
/// let outcome = ImportOrchestrator::new(store).run_path(Path::new("WhatsApp Chat.zip"));
/// println!("{outcome}");
/// # Ok::<(), chatsift::ChatsiftError>(())
/// ```
#[derive(Debug)]
pub struct JsonlStore {
    dir: PathBuf,
    messages: BufWriter<File>,
    voice_notes: BufWriter<File>,
    phrases: BufWriter<File>,
}

impl JsonlStore {
    /// Creates `dir` if needed and truncates the record files.
    pub fn create(dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref().to_path_buf();
        fs::create_dir_all(&dir)?;
        let open = |name: &str| -> Result<BufWriter<File>> {
            Ok(BufWriter::new(File::create(dir.join(name))?))
        };
        Ok(Self {
            messages: open(MESSAGES_FILE)?,
            voice_notes: open(VOICE_NOTES_FILE)?,
            phrases: open(PHRASES_FILE)?,
            dir,
        })
    }

    /// Output directory.
    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

fn write_batch<T: Serialize>(writer: &mut BufWriter<File>, batch: &[T], kind: &str) -> Result<()> {
    for record in batch {
        let line = serde_json::to_string(record)?;
        writeln!(writer, "{line}")
            .map_err(|e| ChatsiftError::storage(format!("failed to write {kind}: {e}")))?;
    }
    writer
        .flush()
        .map_err(|e| ChatsiftError::storage(format!("failed to flush {kind}: {e}")))
}

impl ImportStore for JsonlStore {
    fn save_messages(&mut self, batch: &[Message]) -> Result<()> {
        write_batch(&mut self.messages, batch, "messages")
    }

    fn save_voice_notes(&mut self, batch: &[VoiceNoteRecord]) -> Result<()> {
        write_batch(&mut self.voice_notes, batch, "voice notes")
    }

    fn save_phrases(&mut self, batch: &[PhraseFrequency]) -> Result<()> {
        write_batch(&mut self.phrases, batch, "phrases")
    }

    fn save_analytics(
        &mut self,
        sentiment: &SentimentDistribution,
        patterns: &CommunicationPatterns,
    ) -> Result<()> {
        let summary = AnalyticsSummary {
            sentiment,
            patterns,
        };
        let json = serde_json::to_string_pretty(&summary)?;
        fs::write(self.dir.join(ANALYTICS_FILE), json)
            .map_err(|e| ChatsiftError::storage(format!("failed to write analytics: {e}")))
    }
}
