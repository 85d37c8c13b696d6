//! Message-body classification.
//!
//! Runs once per message, on the first line of its body. Determines the
//! [`MessageType`], quote metadata, attachment file name and `(m:ss)`
//! duration suffix.

use std::sync::LazyLock;

use regex::Regex;

use crate::message::MessageType;

const AUDIO_EXT: &str = "opus|m4a|mp3|wav|ogg|aac|amr";
const IMAGE_EXT: &str = "jpe?g|png|gif|heic|bmp";
const VIDEO_EXT: &str = "mp4|3gp|mov|mkv|avi|webm";
const DOCUMENT_EXT: &str = "pdf|docx?|xlsx?|pptx?|csv|txt|rtf|zip|apk";

/// Ordered classification table; first match wins.
static TYPE_PATTERNS: LazyLock<Vec<(MessageType, Regex)>> = LazyLock::new(|| {
    // <attached: NAME.ext> (iOS) or NAME.ext (file attached) (Android)
    let attached = |ext: &str| {
        format!(r"(?i)(?:<attached:[^>]*\.(?:{ext})\s*>|\S\.(?:{ext})\s+\(file attached\))")
    };
    // A placeholder is the whole body, optionally behind a direction mark.
    let placeholder = |names: &str| {
        format!(r"(?i)^[\s\x{{200e}}\x{{200f}}]*<?(?:{names}):?\s*omitted>?\s*$")
    };
    let table: Vec<(MessageType, String)> = vec![
        // Placeholders
        (
            MessageType::VoiceNote,
            placeholder("audio|voice message|voice note|ptt"),
        ),
        (MessageType::Sticker, placeholder("sticker")),
        (MessageType::Image, placeholder("image|photo|gif|media")),
        (MessageType::Video, placeholder("video")),
        (MessageType::Document, placeholder("document")),
        (MessageType::Contact, placeholder("contact card")),
        // Vendor file names
        (MessageType::VoiceNote, r"(?i)\bPTT-\d{8}-WA\d+\.\w+".into()),
        (MessageType::Audio, r"(?i)\bAUD-\d{8}-WA\d+\.\w+".into()),
        (MessageType::Sticker, r"(?i)\bSTK-\d{8}-WA\d+\.\w+".into()),
        (MessageType::Image, r"(?i)\bIMG-\d{8}-WA\d+\.\w+".into()),
        (MessageType::Video, r"(?i)\bVID-\d{8}-WA\d+\.\w+".into()),
        (MessageType::Document, r"(?i)\bDOC-\d{8}-WA\d+\.\w+".into()),
        // Attachment tokens, by extension
        (
            MessageType::VoiceNote,
            format!(
                r"(?i)(?:<attached:[^>]*(?:voice|audio|ptt)[^>]*\.(?:{AUDIO_EXT})\s*>|\S*(?:voice|audio|ptt)\S*\.(?:{AUDIO_EXT})\s+\(file attached\))"
            ),
        ),
        (MessageType::Audio, attached(AUDIO_EXT)),
        (MessageType::Sticker, attached("webp")),
        (MessageType::Image, attached(IMAGE_EXT)),
        (MessageType::Video, attached(VIDEO_EXT)),
        (MessageType::Contact, attached("vcf")),
        (MessageType::Document, attached(DOCUMENT_EXT)),
        // Locations
        (MessageType::Location, r"(?i)^location:\s".into()),
        (MessageType::Location, r"(?i)\blive location shared\b".into()),
        (
            MessageType::Location,
            r"(?i)https?://(?:maps\.google\.com|goo\.gl/maps|maps\.app\.goo\.gl)".into(),
        ),
    ];
    table
        .into_iter()
        .map(|(kind, pattern)| (kind, Regex::new(&pattern).expect("valid content regex")))
        .collect()
});

static PLACEHOLDER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)<?\b(?:image|photo|gif|media|video|audio|voice message|voice note|ptt|sticker|document|contact card):?\s*omitted>?",
    )
    .expect("valid placeholder regex")
});

static ATTACHED_TOKEN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)<attached:\s*(?P<name>[^>]+?)\s*>").expect("valid attached regex")
});

static FILE_ATTACHED: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(?P<name>.+?)\s+\(file attached\)").expect("valid file-attached regex")
});

static BARE_FILE_NAME: LazyLock<Regex> = LazyLock::new(|| {
    let ext = [AUDIO_EXT, IMAGE_EXT, VIDEO_EXT, DOCUMENT_EXT, "webp|vcf"].join("|");
    Regex::new(&format!(r#"(?i)[^\s<>:"/\\|?*]+\.(?:{ext})\b"#)).expect("valid file name regex")
});

static DURATION_SUFFIX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\((?P<min>\d{1,3}):(?P<sec>[0-5]\d)\)\s*$").expect("valid duration regex")
});

static QUOTE_PAIR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"^\s*["“„«](?P<quoted>[^"“”„«»]+)["”»]"#).expect("valid quote regex")
});

/// Everything derived from a message's first body line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentInfo {
    pub message_type: MessageType,
    /// Body with placeholders, attachment tokens and the duration removed.
    pub text: String,
    pub is_quoted: bool,
    pub quoted_text: Option<String>,
    pub media_file_name: Option<String>,
    pub duration_ms: Option<i64>,
}

/// Classifies `content` against the ordered pattern table; `Text` if none match.
pub fn classify_content(content: &str) -> MessageType {
    TYPE_PATTERNS
        .iter()
        .find(|(_, pattern)| pattern.is_match(content))
        .map_or(MessageType::Text, |(kind, _)| *kind)
}

/// Returns `(is_quoted, quoted_text)`.
///
/// Cues are checked in order: a leading quote-character pair, a leading `>`,
/// then the phrase "quoted message" anywhere in the body.
pub fn detect_quote(content: &str) -> (bool, Option<String>) {
    if let Some(caps) = QUOTE_PAIR.captures(content) {
        let quoted = caps["quoted"].trim().to_string();
        return (true, Some(quoted));
    }
    if let Some(rest) = content.trim_start().strip_prefix('>') {
        let quoted = rest.trim();
        return (true, (!quoted.is_empty()).then(|| quoted.to_string()));
    }
    if content.to_lowercase().contains("quoted message") {
        return (true, None);
    }
    (false, None)
}

/// Finds an attachment file name in `content`.
pub fn extract_file_name(content: &str) -> Option<String> {
    if let Some(caps) = ATTACHED_TOKEN.captures(content) {
        return Some(caps["name"].to_string());
    }
    if let Some(caps) = FILE_ATTACHED.captures(content.trim()) {
        return Some(caps["name"].trim().to_string());
    }
    BARE_FILE_NAME
        .find(content)
        .map(|m| m.as_str().to_string())
}

/// Parses a trailing `(m:ss)` duration into milliseconds.
pub fn extract_duration_ms(content: &str) -> Option<i64> {
    let caps = DURATION_SUFFIX.captures(content)?;
    let minutes: i64 = caps["min"].parse().ok()?;
    let seconds: i64 = caps["sec"].parse().ok()?;
    Some((minutes * 60 + seconds) * 1000)
}

fn strip_media_tokens(content: &str, file_name: Option<&str>) -> String {
    let mut text = PLACEHOLDER.replace_all(content, "").into_owned();
    text = ATTACHED_TOKEN.replace_all(&text, "").into_owned();
    text = DURATION_SUFFIX.replace(&text, "").into_owned();
    if let Some(name) = file_name {
        text = text.replacen(name, "", 1);
    }
    text = text.replace("(file attached)", "");
    text.trim().to_string()
}

/// Runs every classification step over the first body line.
pub fn analyze_content(content: &str) -> ContentInfo {
    let message_type = classify_content(content);
    let (is_quoted, quoted_text) = detect_quote(content);

    if message_type == MessageType::Text {
        return ContentInfo {
            message_type,
            text: content.to_string(),
            is_quoted,
            quoted_text,
            media_file_name: None,
            duration_ms: None,
        };
    }

    let media_file_name = if message_type.is_media() {
        extract_file_name(content)
    } else {
        None
    };
    let duration_ms = extract_duration_ms(content);
    let text = if message_type == MessageType::Location {
        content.trim().to_string()
    } else {
        strip_media_tokens(content, media_file_name.as_deref())
    };

    ContentInfo {
        message_type,
        text,
        is_quoted,
        quoted_text,
        media_file_name,
        duration_ms,
    }
}
