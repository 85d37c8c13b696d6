//! Filename-based classification of extracted archive entries.

use std::sync::LazyLock;

use regex::Regex;

/// Name of the transcript entry inside a chat export.
pub const TRANSCRIPT_NAME: &str = "_chat.txt";

/// Extensions treated as audio.
pub const AUDIO_EXTENSIONS: &[&str] = &["opus", "mp3", "wav", "m4a", "ogg", "aac", "amr"];

/// Extensions treated as media (images, video, documents, contacts, plain audio).
pub const MEDIA_EXTENSIONS: &[&str] = &[
    // images
    "jpg", "jpeg", "png", "gif", "webp", "heic", "bmp",
    // video
    "mp4", "3gp", "mov", "mkv", "avi", "webm",
    // documents
    "pdf", "doc", "docx", "xls", "xlsx", "ppt", "pptx", "csv", "zip", "rtf",
    // contacts
    "vcf",
    // audio that is not a voice note
    "mp3", "m4a", "ogg", "aac", "wav", "opus", "amr",
];

// PTT-20240101-WA0001.opus, AUD-20240101-WA0002.m4a
static VENDOR_VOICE_NOTE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^[a-z]{2,4}-\d{8}-wa\d+\.(?:opus|mp3|wav|m4a)$").expect("valid voice-note regex")
});

/// Category assigned to an extracted entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    Transcript,
    VoiceNote,
    Media,
    /// Extracted but not categorized.
    Other,
}

fn extension(file_name: &str) -> Option<String> {
    let (_, ext) = file_name.rsplit_once('.')?;
    Some(ext.to_ascii_lowercase())
}

/// Returns `true` if `file_name` is the transcript entry (case-insensitive).
pub fn is_transcript(file_name: &str) -> bool {
    file_name.eq_ignore_ascii_case(TRANSCRIPT_NAME)
}

/// Returns `true` if `file_name` looks like a voice note.
pub fn is_voice_note(file_name: &str) -> bool {
    if VENDOR_VOICE_NOTE.is_match(file_name) {
        return true;
    }
    let has_audio_ext = extension(file_name).is_some_and(|ext| AUDIO_EXTENSIONS.contains(&ext.as_str()));
    let lower = file_name.to_lowercase();
    has_audio_ext && (lower.contains("voice") || lower.contains("audio"))
}

/// Classifies an entry by its base file name.
///
/// Order matters: transcript, then voice note, then media.
pub fn classify_entry(file_name: &str) -> EntryKind {
    if is_transcript(file_name) {
        EntryKind::Transcript
    } else if is_voice_note(file_name) {
        EntryKind::VoiceNote
    } else if extension(file_name).is_some_and(|ext| MEDIA_EXTENSIONS.contains(&ext.as_str())) {
        EntryKind::Media
    } else {
        EntryKind::Other
    }
}
