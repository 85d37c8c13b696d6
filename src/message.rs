//! Data model shared by every pipeline stage.
//!
//! [`Message`] is produced exclusively by the
//! [`TranscriptParser`](crate::parser::TranscriptParser) and is never mutated
//! after parsing. Messages keep transcript line order; out-of-order timestamps
//! are preserved as-is.
//!
//! # Examples
//!
//! ```
//! use chatsift::{Message, MessageType};
//! use chrono::{TimeZone, Utc};
//!
//! let ts = Utc.with_ymd_and_hms(2023, 12, 31, 23, 59, 0).unwrap();
//! let msg = Message::new("Alice", ts, "Happy New Year!");
//!
//! assert_eq!(msg.message_type, MessageType::Text);
//! assert!(!msg.is_quoted);
//! ```

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Kind of content carried by a [`Message`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageType {
    Text,
    Image,
    Video,
    Audio,
    VoiceNote,
    Document,
    Sticker,
    Location,
    Contact,
    System,
}

impl MessageType {
    /// Returns all variants in declaration order.
    pub fn all() -> &'static [MessageType] {
        &[
            MessageType::Text,
            MessageType::Image,
            MessageType::Video,
            MessageType::Audio,
            MessageType::VoiceNote,
            MessageType::Document,
            MessageType::Sticker,
            MessageType::Location,
            MessageType::Contact,
            MessageType::System,
        ]
    }

    /// Returns `true` for types that reference an attachment.
    pub fn is_media(self) -> bool {
        !matches!(
            self,
            MessageType::Text | MessageType::System | MessageType::Location
        )
    }
}

impl fmt::Display for MessageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            MessageType::Text => "text",
            MessageType::Image => "image",
            MessageType::Video => "video",
            MessageType::Audio => "audio",
            MessageType::VoiceNote => "voice_note",
            MessageType::Document => "document",
            MessageType::Sticker => "sticker",
            MessageType::Location => "location",
            MessageType::Contact => "contact",
            MessageType::System => "system",
        };
        f.write_str(name)
    }
}

/// A single parsed chat message.
///
/// | Field | Description |
/// |-------|-------------|
/// | `sender` | Display name, or the reserved system sender |
/// | `timestamp` | When the message was sent (export-local time, stored as UTC) |
/// | `text` | Body text; placeholder-only media messages have an empty body |
/// | `message_type` | Classified [`MessageType`] |
/// | `is_quoted` / `quoted_text` | Quote detection result |
/// | `media_file_name` | Attachment file name for non-text messages |
/// | `voice_note_duration_ms` | Duration from a `(mm:ss)` suffix |
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub sender: String,

    pub timestamp: DateTime<Utc>,

    /// May contain newlines for multi-line messages.
    pub text: String,

    #[serde(rename = "type")]
    pub message_type: MessageType,

    #[serde(default)]
    pub is_quoted: bool,

    #[serde(skip_serializing_if = "Option::is_none")]
    #[serde(default)]
    pub quoted_text: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    #[serde(default)]
    pub media_file_name: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    #[serde(default)]
    pub voice_note_duration_ms: Option<i64>,
}

impl Message {
    /// Creates a plain text message with no quote or media metadata.
    pub fn new(sender: impl Into<String>, timestamp: DateTime<Utc>, text: impl Into<String>) -> Self {
        Self {
            sender: sender.into(),
            timestamp,
            text: text.into(),
            message_type: MessageType::Text,
            is_quoted: false,
            quoted_text: None,
            media_file_name: None,
            voice_note_duration_ms: None,
        }
    }

    /// Builder method to set the message type.
    #[must_use]
    pub fn with_type(mut self, message_type: MessageType) -> Self {
        self.message_type = message_type;
        self
    }

    /// Builder method to attach a media file name.
    #[must_use]
    pub fn with_media_file(mut self, name: impl Into<String>) -> Self {
        self.media_file_name = Some(name.into());
        self
    }

    /// Builder method to mark the message as quoting `quoted`.
    #[must_use]
    pub fn with_quote(mut self, quoted: Option<String>) -> Self {
        self.is_quoted = true;
        self.quoted_text = quoted;
        self
    }

    /// Builder method to set the voice-note duration.
    #[must_use]
    pub fn with_duration_ms(mut self, duration_ms: i64) -> Self {
        self.voice_note_duration_ms = Some(duration_ms);
        self
    }

    /// Returns `true` if this is a text message.
    pub fn is_text(&self) -> bool {
        self.message_type == MessageType::Text
    }

    /// Number of whitespace-separated words in the body.
    pub fn word_count(&self) -> usize {
        self.text.split_whitespace().count()
    }
}

/// Emotional tag attached to a voice note by a scoring model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmotionTag {
    /// Label with the highest score.
    pub label: String,
    /// Score for every label the model knows.
    pub scores: std::collections::BTreeMap<String, f32>,
}

/// A voice note paired with its extracted file.
///
/// Exists only when the transcript references the file as a voice note AND
/// the file exists on disk after extraction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VoiceNoteRecord {
    pub file_name: String,
    pub sender: String,
    pub timestamp: DateTime<Utc>,
    /// 0 when the duration could not be determined.
    pub duration_ms: i64,
    /// Empty until extraction paths are known.
    pub file_path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[serde(default)]
    pub emotion: Option<EmotionTag>,
}

impl VoiceNoteRecord {
    /// Derives a record from a voice-note message; `None` without a file name.
    pub fn from_message(message: &Message) -> Option<Self> {
        if message.message_type != MessageType::VoiceNote {
            return None;
        }
        let file_name = message.media_file_name.clone()?;
        Some(Self {
            file_name,
            sender: message.sender.clone(),
            timestamp: message.timestamp,
            duration_ms: message.voice_note_duration_ms.unwrap_or(0),
            file_path: String::new(),
            emotion: None,
        })
    }
}

/// Line accounting for one transcript.
///
/// Every non-blank line lands in exactly one of `message_lines`,
/// `system_lines`, `continuation_lines` or `discarded_lines`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParseStats {
    pub message_lines: usize,
    pub system_lines: usize,
    pub continuation_lines: usize,
    pub discarded_lines: usize,
    pub blank_lines: usize,
}

impl ParseStats {
    /// Total non-blank lines seen.
    pub fn non_blank_lines(&self) -> usize {
        self.message_lines + self.system_lines + self.continuation_lines + self.discarded_lines
    }
}

/// Output of [`TranscriptParser::parse`](crate::parser::TranscriptParser::parse).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChatExport {
    pub messages: Vec<Message>,
    /// Attachment names referenced by non-text messages, in transcript order.
    pub media_file_names: Vec<String>,
    pub voice_notes: Vec<VoiceNoteRecord>,
    pub stats: ParseStats,
}
