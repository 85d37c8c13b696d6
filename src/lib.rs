//! # Chatsift
//!
//! A Rust library for importing WhatsApp chat-export archives and deriving
//! conversational analytics from them.
//!
//! ## Overview
//!
//! A chat export is a ZIP archive holding a `_chat.txt` transcript plus the
//! media it references (photos, stickers, voice notes). Chatsift:
//!
//! 1. validates the archive and streams it to a working directory
//! 2. parses the transcript into typed [`Message`]s, tolerating the many
//!    locale-dependent date formats exports come in
//! 3. measures voice-note durations and optionally tags their emotion
//! 4. extracts recurring phrases, a sentiment distribution and
//!    communication patterns
//! 5. hands everything to an [`ImportStore`](import::ImportStore) in batches
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use chatsift::prelude::*;
//! use std::path::Path;
//!
//! fn main() -> Result<()> {
//!     let store = JsonlStore::create("out")?;
//!     let mut orchestrator = ImportOrchestrator::new(store).with_progress(stderr_progress());
//!
//!     let outcome = orchestrator.run_path(Path::new("WhatsApp Chat.zip"));
//!     println!("{outcome}");
//!     Ok(())
//! }
//! ```
//!
//! ## Parsing a Transcript Directly
//!
//! ```rust
//! use chatsift::parser::TranscriptParser;
//! use chatsift::MessageType;
//!
//! let export = TranscriptParser::new().parse(
//!     "1/15/24, 10:30 AM - Alice: Hello!\n\
//!      1/15/24, 10:31 AM - Bob: PTT-20240115-WA0001.opus (file attached)\n",
//! );
//!
//! assert_eq!(export.messages.len(), 2);
//! assert_eq!(export.messages[1].message_type, MessageType::VoiceNote);
//! assert_eq!(export.voice_notes.len(), 1);
//! ```
//!
//! ## Module Structure
//!
//! - [`archive`] - ZIP validation, streaming extraction, entry classification
//! - [`parser`] - transcript parser ([`TranscriptParser`](parser::TranscriptParser))
//! - [`parsing`] - timestamp formats, content classification, system notices
//! - [`analytics`] - phrases, sentiment, communication patterns
//! - [`voice`] - voice-note duration probing and emotion tagging
//! - [`import`] - the staged [`ImportOrchestrator`](import::ImportOrchestrator) and stores
//! - [`config`] - per-stage configuration types
//! - [`progress`], [`cancel`] - progress events and cooperative cancellation
//! - [`error`] - unified error types ([`ChatsiftError`], [`Result`])
//! - [`prelude`] - convenient re-exports

pub mod analytics;
pub mod archive;
pub mod cancel;
#[cfg(feature = "cli")]
pub mod cli;
pub mod config;
pub mod error;
pub mod import;
pub mod message;
pub mod parser;
pub mod parsing;
pub mod progress;
pub mod voice;

// Re-export the main types at the crate root for convenience
pub use error::{ChatsiftError, Result, ValidationError};
pub use message::{ChatExport, EmotionTag, Message, MessageType, ParseStats, VoiceNoteRecord};

/// Convenient re-exports for common usage.
///
/// ```rust
/// use chatsift::prelude::*;
/// ```
pub mod prelude {
    pub use crate::{ChatExport, Message, MessageType, VoiceNoteRecord};

    pub use crate::error::{ChatsiftError, Result};

    pub use crate::config::{AnalyticsConfig, ExtractorConfig, ImportConfig, ParserConfig};

    pub use crate::archive::{ArchiveExtractor, ArchiveValidator};
    pub use crate::parser::TranscriptParser;

    pub use crate::analytics::{AnalyticsProcessor, PhraseFrequency, SentimentLabel};
    pub use crate::voice::VoiceNoteProcessor;

    pub use crate::import::{ImportOrchestrator, ImportStore, JsonlStore, MemoryStore};

    pub use crate::cancel::CancellationToken;
    pub use crate::progress::{
        ImportOutcome, ProgressCallback, ProgressEvent, no_progress, stderr_progress,
    };
}
