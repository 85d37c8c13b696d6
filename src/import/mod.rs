//! Import orchestration.
//!
//! [`ImportOrchestrator`] is the only component that knows stage order and
//! failure policy:
//!
//! | Stage | On error |
//! |-------|----------|
//! | Validating, Extracting, ParsingTranscript | fatal |
//! | SavingMessages, SavingAnalytics | fatal (store rejected a batch) |
//! | ProcessingVoiceNotes | per-item: logged and skipped |
//!
//! Every run ends with exactly one [`ProgressEvent::Finished`] and removes
//! its working directory, whether it succeeded, failed or was cancelled.

mod jsonl;
mod stage;
mod store;

pub use jsonl::{ANALYTICS_FILE, JsonlStore, MESSAGES_FILE, PHRASES_FILE, VOICE_NOTES_FILE};
pub use stage::ImportStage;
pub use store::{ImportStore, MemoryStore};

use std::collections::HashMap;
use std::fs::{self, File};
use std::io::{self, BufReader, Read, Seek};
use std::path::{Path, PathBuf};

use tempfile::TempDir;

use crate::analytics::AnalyticsProcessor;
use crate::archive::{ArchiveExtractionResult, ArchiveExtractor, ArchiveValidator};
use crate::cancel::CancellationToken;
use crate::config::ImportConfig;
use crate::error::{ChatsiftError, Result};
use crate::message::VoiceNoteRecord;
use crate::parser::TranscriptParser;
use crate::progress::{
    ImportOutcome, ProgressCallback, ProgressEvent, ProgressUpdate, no_progress,
};
use crate::voice::VoiceNoteProcessor;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct ImportCounts {
    messages: usize,
    voice_notes: usize,
    phrases: usize,
}

/// Runs the full archive import against an [`ImportStore`].
///
/// # Example
///
/// ```rust,no_run
/// use chatsift::import::{ImportOrchestrator, MemoryStore};
/// use chatsift::progress::stderr_progress;
/// use std::fs::File;
///
/// let mut orchestrator = ImportOrchestrator::new(MemoryStore::new())
///     .with_progress(stderr_progress());
/// let outcome = orchestrator.run(File::open("WhatsApp Chat.zip")?);
///
/// if outcome.is_success() {
///     println!("{} messages", orchestrator.store().messages.len());
/// }
/// # Ok::<(), std::io::Error>(())
/// ```
pub struct ImportOrchestrator<S: ImportStore> {
    config: ImportConfig,
    store: S,
    progress: ProgressCallback,
    voice: VoiceNoteProcessor,
    cancel: CancellationToken,
    stage: ImportStage,
}

impl<S: ImportStore> ImportOrchestrator<S> {
    /// Creates an orchestrator with default configuration and no progress output.
    pub fn new(store: S) -> Self {
        Self {
            config: ImportConfig::default(),
            store,
            progress: no_progress(),
            voice: VoiceNoteProcessor::new(),
            cancel: CancellationToken::new(),
            stage: ImportStage::Validating,
        }
    }

    #[must_use]
    pub fn with_config(mut self, config: ImportConfig) -> Self {
        self.config = config;
        self
    }

    #[must_use]
    pub fn with_progress(mut self, progress: ProgressCallback) -> Self {
        self.progress = progress;
        self
    }

    /// Replaces the voice-note processor, e.g. to enable emotion tagging.
    #[must_use]
    pub fn with_voice_processor(mut self, voice: VoiceNoteProcessor) -> Self {
        self.voice = voice;
        self
    }

    /// Observes `token` between entries, chunks and voice-note batches.
    #[must_use]
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }

    /// Handle that cancels this orchestrator's runs.
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    pub fn config(&self) -> &ImportConfig {
        &self.config
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn into_store(self) -> S {
        self.store
    }

    /// Last stage reported by the most recent run.
    pub fn stage(&self) -> ImportStage {
        self.stage
    }

    /// Opens `path` and runs the import.
    pub fn run_path(&mut self, path: &Path) -> ImportOutcome {
        match File::open(path) {
            Ok(file) => self.run(BufReader::new(file)),
            Err(e) => {
                let err = io::Error::new(e.kind(), format!("cannot open {}: {e}", path.display()));
                self.stage = ImportStage::Validating;
                self.finish(Err(err.into()))
            }
        }
    }

    /// Runs the import over `archive` and returns the terminal outcome.
    pub fn run<R: Read + Seek>(&mut self, archive: R) -> ImportOutcome {
        self.stage = ImportStage::Validating;
        let result = self.run_in_work_dir(archive);
        self.finish(result)
    }

    fn run_in_work_dir<R: Read + Seek>(&mut self, archive: R) -> Result<ImportCounts> {
        let work_dir = create_work_dir(self.config.work_dir.as_deref())?;
        let result = self.execute(archive, work_dir.path());

        let path = work_dir.path().to_path_buf();
        match work_dir.close() {
            Ok(()) => tracing::debug!(dir = %path.display(), "Removed working directory"),
            Err(e) => {
                tracing::warn!(dir = %path.display(), error = %e, "Failed to remove working directory");
            }
        }
        result
    }

    fn execute<R: Read + Seek>(&mut self, mut archive: R, work_dir: &Path) -> Result<ImportCounts> {
        self.enter(ImportStage::Validating);
        ArchiveValidator::validate(&mut archive)?;
        self.cancel.check()?;

        self.enter(ImportStage::Extracting);
        let extraction = ArchiveExtractor::with_config(self.config.extractor.clone())
            .with_cancellation(self.cancel.clone())
            .extract(archive, work_dir)?;
        let transcript = extraction
            .transcript_path
            .as_deref()
            .ok_or(ChatsiftError::MissingTranscript)?;
        self.cancel.check()?;

        self.enter(ImportStage::ParsingTranscript);
        let export = TranscriptParser::with_config(self.config.parser.clone()).parse_file(transcript)?;
        tracing::info!(
            messages = export.messages.len(),
            voice_notes = export.voice_notes.len(),
            discarded_lines = export.stats.discarded_lines,
            "Transcript parsed"
        );

        self.enter(ImportStage::SavingMessages);
        let batch = self.config.message_batch_size.max(1);
        let total = export.messages.len().div_ceil(batch);
        for (i, chunk) in export.messages.chunks(batch).enumerate() {
            self.cancel.check()?;
            self.store.save_messages(chunk)?;
            tracing::debug!(chunk = i + 1, total, records = chunk.len(), "Saved message batch");
            self.report_chunk(ImportStage::SavingMessages, i + 1, total);
        }

        self.enter(ImportStage::ProcessingVoiceNotes);
        let voice_notes = self.process_voice_notes(&export.voice_notes, &extraction)?;

        self.enter(ImportStage::RunningAnalytics);
        self.cancel.check()?;
        let report = AnalyticsProcessor::with_config(self.config.analytics.clone())
            .analyze(&export.messages);

        self.enter(ImportStage::SavingAnalytics);
        let batch = self.config.phrase_batch_size.max(1);
        let total = report.phrases.len().div_ceil(batch);
        for (i, chunk) in report.phrases.chunks(batch).enumerate() {
            self.cancel.check()?;
            self.store.save_phrases(chunk)?;
            self.report_chunk(ImportStage::SavingAnalytics, i + 1, total);
        }
        self.store.save_analytics(&report.sentiment, &report.patterns)?;

        Ok(ImportCounts {
            messages: export.messages.len(),
            voice_notes,
            phrases: report.phrases.len(),
        })
    }

    /// Pairs voice-note messages with extracted files and saves the
    /// resulting records in batches. Returns the number saved.
    fn process_voice_notes(
        &mut self,
        notes: &[VoiceNoteRecord],
        extraction: &ArchiveExtractionResult,
    ) -> Result<usize> {
        let files = extracted_files_by_name(extraction);
        let batch = self.config.voice_note_batch_size.max(1);
        let total = notes.len().div_ceil(batch);
        let mut saved = 0;
        let mut skipped = 0;

        for (i, chunk) in notes.chunks(batch).enumerate() {
            self.cancel.check()?;
            let records: Vec<VoiceNoteRecord> = chunk
                .iter()
                .filter_map(|note| self.process_voice_note(note, &files))
                .collect();
            skipped += chunk.len() - records.len();

            if !records.is_empty() {
                self.store.save_voice_notes(&records)?;
                saved += records.len();
            }
            self.report_chunk(ImportStage::ProcessingVoiceNotes, i + 1, total);
        }

        if skipped > 0 {
            tracing::warn!(saved, skipped, "Some voice notes were skipped");
        }
        Ok(saved)
    }

    fn process_voice_note(
        &self,
        note: &VoiceNoteRecord,
        files: &HashMap<String, PathBuf>,
    ) -> Option<VoiceNoteRecord> {
        let Some(path) = files.get(&note.file_name) else {
            tracing::debug!(file = %note.file_name, "Voice note not present in archive");
            return None;
        };

        let mut record =
            self.voice
                .extract_metadata(path, &note.file_name, &note.sender, note.timestamp)?;
        if record.duration_ms == 0 {
            record.duration_ms = note.duration_ms;
        }
        if self.voice.has_model() {
            record.emotion = self.voice.classify(path);
        }
        Some(record)
    }

    fn enter(&mut self, stage: ImportStage) {
        self.stage = stage;
        tracing::info!(stage = %stage, "Import stage");
        self.emit(ProgressUpdate::new(stage.label(), stage.percent()), None);
    }

    fn report_chunk(&self, stage: ImportStage, done: usize, total: usize) {
        self.emit(
            ProgressUpdate::new(stage.label(), stage.chunk_percent(done, total)),
            Some(format!("chunk {done}/{total}")),
        );
    }

    fn emit(&self, update: ProgressUpdate, detail: Option<String>) {
        let update = match detail {
            Some(detail) => update.with_detail(detail),
            None => update,
        };
        (self.progress)(ProgressEvent::Stage(update));
    }

    fn finish(&mut self, result: Result<ImportCounts>) -> ImportOutcome {
        let outcome = match result {
            Ok(counts) => {
                self.enter(ImportStage::Completed);
                tracing::info!(
                    messages = counts.messages,
                    voice_notes = counts.voice_notes,
                    phrases = counts.phrases,
                    "Import completed"
                );
                ImportOutcome::Success {
                    message_count: counts.messages,
                    voice_note_count: counts.voice_notes,
                    phrase_count: counts.phrases,
                }
            }
            Err(e) => {
                let failed_at = self.stage;
                let error_message = e.to_string();
                tracing::error!(stage = %failed_at, error = %error_message, "Import failed");
                self.stage = ImportStage::Failed;
                self.emit(
                    ProgressUpdate::new(ImportStage::Failed.label(), failed_at.percent()),
                    Some(error_message.clone()),
                );
                ImportOutcome::Failed { error_message }
            }
        };
        (self.progress)(ProgressEvent::Finished(outcome.clone()));
        outcome
    }
}

/// Extracted files keyed by file name. Voice-note entries win over other
/// entries with the same name.
fn extracted_files_by_name(extraction: &ArchiveExtractionResult) -> HashMap<String, PathBuf> {
    let mut files = HashMap::new();
    let all = extraction
        .voice_note_files
        .iter()
        .chain(&extraction.media_files)
        .chain(&extraction.other_files);
    for path in all {
        if let Some(name) = path.file_name() {
            files
                .entry(name.to_string_lossy().into_owned())
                .or_insert_with(|| path.clone());
        }
    }
    files
}

fn create_work_dir(base: Option<&Path>) -> io::Result<TempDir> {
    let mut builder = tempfile::Builder::new();
    builder.prefix("chatsift-import-");
    match base {
        Some(dir) => {
            fs::create_dir_all(dir)?;
            builder.tempdir_in(dir)
        }
        None => builder.tempdir(),
    }
}
