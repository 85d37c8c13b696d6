//! Storage boundary for import results.

use crate::analytics::{CommunicationPatterns, PhraseFrequency, SentimentDistribution};
use crate::error::Result;
use crate::message::{Message, VoiceNoteRecord};

/// Receives batched records from the import pipeline.
///
/// Called only from the task running the import. Batches arrive in
/// transcript order; an `Err` from any method aborts the import.
pub trait ImportStore {
    fn save_messages(&mut self, batch: &[Message]) -> Result<()>;

    fn save_voice_notes(&mut self, batch: &[VoiceNoteRecord]) -> Result<()>;

    fn save_phrases(&mut self, batch: &[PhraseFrequency]) -> Result<()>;

    /// Receives the aggregate statistics once per run. Ignored by default.
    fn save_analytics(
        &mut self,
        _sentiment: &SentimentDistribution,
        _patterns: &CommunicationPatterns,
    ) -> Result<()> {
        Ok(())
    }
}

/// Keeps every record in memory.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    pub messages: Vec<Message>,
    pub voice_notes: Vec<VoiceNoteRecord>,
    pub phrases: Vec<PhraseFrequency>,
    pub sentiment: Option<SentimentDistribution>,
    pub patterns: Option<CommunicationPatterns>,
    /// Number of `save_messages` calls.
    pub message_batches: usize,
    /// Number of `save_phrases` calls.
    pub phrase_batches: usize,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ImportStore for MemoryStore {
    fn save_messages(&mut self, batch: &[Message]) -> Result<()> {
        self.messages.extend_from_slice(batch);
        self.message_batches += 1;
        Ok(())
    }

    fn save_voice_notes(&mut self, batch: &[VoiceNoteRecord]) -> Result<()> {
        self.voice_notes.extend_from_slice(batch);
        Ok(())
    }

    fn save_phrases(&mut self, batch: &[PhraseFrequency]) -> Result<()> {
        self.phrases.extend_from_slice(batch);
        self.phrase_batches += 1;
        Ok(())
    }

    fn save_analytics(
        &mut self,
        sentiment: &SentimentDistribution,
        patterns: &CommunicationPatterns,
    ) -> Result<()> {
        self.sentiment = Some(sentiment.clone());
        self.patterns = Some(patterns.clone());
        Ok(())
    }
}

impl<S: ImportStore + ?Sized> ImportStore for &mut S {
    fn save_messages(&mut self, batch: &[Message]) -> Result<()> {
        (**self).save_messages(batch)
    }

    fn save_voice_notes(&mut self, batch: &[VoiceNoteRecord]) -> Result<()> {
        (**self).save_voice_notes(batch)
    }

    fn save_phrases(&mut self, batch: &[PhraseFrequency]) -> Result<()> {
        (**self).save_phrases(batch)
    }

    fn save_analytics(
        &mut self,
        sentiment: &SentimentDistribution,
        patterns: &CommunicationPatterns,
    ) -> Result<()> {
        (**self).save_analytics(sentiment, patterns)
    }
}
