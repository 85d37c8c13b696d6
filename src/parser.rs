//! Transcript parser for chat exports.
//!
//! Supported line forms:
//! - Android: `12/31/23, 11:59 PM - Sender: Message`
//! - iOS: `[12/31/23, 11:59:00 PM] Sender: Message`
//! - System notices: `12/31/23, 11:59 PM - Alice created group "Trip"`
//!
//! Any line that does not open a message continues the one currently open.
//! Lines before the first message are discarded. The parser never fails on
//! malformed input; every non-blank line is counted in [`ParseStats`].
//!
//! # Example
//!
//! ```rust
//! use chatsift::parser::TranscriptParser;
//! use chatsift::MessageType;
//!
//! let export = TranscriptParser::new()
//!     .parse("12/31/23, 11:59 PM - John Doe: Happy New Year!");
//!
//! assert_eq!(export.messages.len(), 1);
//! assert_eq!(export.messages[0].sender, "John Doe");
//! assert_eq!(export.messages[0].message_type, MessageType::Text);
//! ```

use std::fs;
use std::path::Path;
use std::sync::LazyLock;

use chrono::{DateTime, Utc};
use regex::Regex;

use crate::config::ParserConfig;
use crate::error::Result;
use crate::message::{ChatExport, Message, MessageType, ParseStats, VoiceNoteRecord};
use crate::parsing::{analyze_content, looks_like_system_notice, parse_timestamp};

const DATE: &str = r"\d{1,4}[./-]\d{1,2}[./-]\d{1,4}";
const TIME: &str = r"\d{1,2}[:.]\d{2}(?:[:.]\d{2})?(?:[\s\u{202F}\u{00A0}]*[AaPp]\.?\s?[Mm]\.?)?";

/// `<date>, <time> - <rest>`
static DASH_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r"^(?P<date>{DATE}),?\s+(?P<time>{TIME})\s*[-–]\s?(?P<rest>.*)$"
    ))
    .expect("valid dash line regex")
});

/// `[<date>, <time>] <rest>`
static BRACKET_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r"^\[(?P<date>{DATE}),?\s+(?P<time>{TIME})\]\s*(?P<rest>.*)$"
    ))
    .expect("valid bracket line regex")
});

static SENDER_SPLIT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(?P<sender>[^:]+):\s?(?P<content>.*)$").expect("valid sender regex"));

/// Invisible marks some exports put in front of lines and placeholders.
const INVISIBLE_PREFIX: &[char] = &['\u{feff}', '\u{200e}', '\u{200f}'];

enum LineKind<'a> {
    Message {
        timestamp: DateTime<Utc>,
        sender: &'a str,
        content: &'a str,
    },
    System {
        timestamp: DateTime<Utc>,
        content: &'a str,
    },
    Continuation,
}

/// Converts transcript text into ordered [`Message`] records.
#[derive(Debug, Clone, Default)]
pub struct TranscriptParser {
    config: ParserConfig,
}

impl TranscriptParser {
    /// Creates a parser with default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a parser with custom configuration.
    pub fn with_config(config: ParserConfig) -> Self {
        Self { config }
    }

    /// Returns the current configuration.
    pub fn config(&self) -> &ParserConfig {
        &self.config
    }

    /// Reads and parses a UTF-8 transcript file.
    pub fn parse_file(&self, path: &Path) -> Result<ChatExport> {
        let bytes = fs::read(path)?;
        let text = String::from_utf8(bytes)?;
        Ok(self.parse(&text))
    }

    /// Parses transcript text.
    pub fn parse(&self, text: &str) -> ChatExport {
        let mut stats = ParseStats::default();
        let mut messages: Vec<Message> = Vec::new();
        let mut current: Option<Message> = None;

        for line in text.lines() {
            if line.trim().is_empty() {
                stats.blank_lines += 1;
                continue;
            }

            let opened = match self.classify_line(line) {
                LineKind::Message {
                    timestamp,
                    sender,
                    content,
                } => {
                    stats.message_lines += 1;
                    Some(open_message(sender, timestamp, content))
                }
                LineKind::System { timestamp, content } => {
                    stats.system_lines += 1;
                    Some(
                        Message::new(self.config.system_sender.as_str(), timestamp, content)
                            .with_type(MessageType::System),
                    )
                }
                LineKind::Continuation => {
                    if let Some(message) = current.as_mut() {
                        if !message.text.is_empty() {
                            message.text.push('\n');
                        }
                        message.text.push_str(line);
                        stats.continuation_lines += 1;
                    } else {
                        tracing::trace!(line, "Discarding line before first message");
                        stats.discarded_lines += 1;
                    }
                    None
                }
            };

            if let Some(message) = opened {
                if let Some(done) = current.replace(message) {
                    messages.push(done);
                }
            }
        }
        if let Some(done) = current.take() {
            messages.push(done);
        }

        let media_file_names = messages
            .iter()
            .filter(|m| !m.is_text())
            .filter_map(|m| m.media_file_name.clone())
            .collect();
        let voice_notes: Vec<VoiceNoteRecord> =
            messages.iter().filter_map(VoiceNoteRecord::from_message).collect();

        tracing::debug!(
            messages = messages.len(),
            voice_notes = voice_notes.len(),
            discarded = stats.discarded_lines,
            "Transcript parsed"
        );

        ChatExport {
            messages,
            media_file_names,
            voice_notes,
            stats,
        }
    }

    fn classify_line<'a>(&self, line: &'a str) -> LineKind<'a> {
        let line = line.trim_start_matches(INVISIBLE_PREFIX);
        let Some(caps) = BRACKET_LINE
            .captures(line)
            .or_else(|| DASH_LINE.captures(line))
        else {
            return LineKind::Continuation;
        };

        let (Some(date), Some(time), Some(rest)) =
            (caps.name("date"), caps.name("time"), caps.name("rest"))
        else {
            return LineKind::Continuation;
        };

        let Some((timestamp, _)) = parse_timestamp(
            date.as_str(),
            time.as_str(),
            self.config.min_year,
            self.config.max_year,
        ) else {
            // Timestamp-shaped but unparsable: treat as body text.
            return LineKind::Continuation;
        };

        let rest = rest.as_str().trim_start_matches(INVISIBLE_PREFIX);
        if let Some(split) = SENDER_SPLIT.captures(rest) {
            if let (Some(sender), Some(content)) = (split.name("sender"), split.name("content")) {
                if !looks_like_system_notice(sender.as_str()) {
                    return LineKind::Message {
                        timestamp,
                        sender: sender.as_str().trim().trim_matches(INVISIBLE_PREFIX),
                        content: content.as_str().trim_start_matches(INVISIBLE_PREFIX),
                    };
                }
            }
        }

        LineKind::System {
            timestamp,
            content: rest.trim(),
        }
    }
}

fn open_message(sender: &str, timestamp: DateTime<Utc>, content: &str) -> Message {
    let info = analyze_content(content);
    Message {
        sender: sender.to_string(),
        timestamp,
        text: info.text,
        message_type: info.message_type,
        is_quoted: info.is_quoted,
        quoted_text: info.quoted_text,
        media_file_name: info.media_file_name,
        voice_note_duration_ms: info.duration_ms,
    }
}
