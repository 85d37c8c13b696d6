//! Configuration types for every pipeline stage.
//!
//! Each stage has its own configuration struct:
//!
//! - [`ExtractorConfig`] - ZIP streaming settings
//! - [`ParserConfig`] - transcript parsing settings
//! - [`AnalyticsConfig`] - phrase, n-gram and sentiment vocabularies
//! - [`ImportConfig`] - orchestration settings (batch sizes, working dir)
//!
//! The stop-word list, idiom patterns and sentiment keywords are data, not
//! algorithm: the defaults are a small illustrative set that callers may
//! replace wholesale.
//!
//! # Example
//!
//! ```rust
//! use chatsift::config::{AnalyticsConfig, ImportConfig};
//!
//! let analytics = AnalyticsConfig::new()
//!     .with_max_phrases(50)
//!     .with_stop_words(["the", "a", "an"]);
//!
//! let config = ImportConfig::new()
//!     .with_message_batch_size(200)
//!     .with_analytics(analytics);
//! ```

use std::collections::BTreeSet;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Configuration for [`ArchiveExtractor`](crate::archive::ArchiveExtractor).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractorConfig {
    /// Copy buffer size per entry (default: 8KB)
    pub buffer_size: usize,
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            buffer_size: 8 * 1024, // 8KB
        }
    }
}

impl ExtractorConfig {
    /// Creates a new configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the copy buffer size. Zero is bumped to one byte.
    #[must_use]
    pub fn with_buffer_size(mut self, size: usize) -> Self {
        self.buffer_size = size.max(1);
        self
    }
}

/// Configuration for [`TranscriptParser`](crate::parser::TranscriptParser).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParserConfig {
    /// Earliest accepted year for a parsed timestamp (default: 2000)
    pub min_year: i32,

    /// Latest accepted year for a parsed timestamp (default: 2100)
    pub max_year: i32,

    /// Sender assigned to system messages (default: "System")
    pub system_sender: String,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            min_year: 2000,
            max_year: 2100,
            system_sender: "System".to_string(),
        }
    }
}

impl ParserConfig {
    /// Creates a new configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the accepted calendar range, inclusive.
    #[must_use]
    pub fn with_year_range(mut self, min_year: i32, max_year: i32) -> Self {
        self.min_year = min_year;
        self.max_year = max_year;
        self
    }

    /// Sets the reserved system sender name.
    #[must_use]
    pub fn with_system_sender(mut self, sender: impl Into<String>) -> Self {
        self.system_sender = sender.into();
        self
    }
}

const DEFAULT_STOP_WORDS: &[&str] = &[
    "a", "an", "the", "and", "or", "but", "if", "of", "to", "in", "on", "at", "for", "with",
    "is", "am", "are", "was", "were", "be", "been", "it", "its", "this", "that", "i", "me",
    "my", "you", "your", "we", "our", "he", "she", "they", "them", "his", "her", "so", "just",
    "do", "did", "not", "no", "as", "by", "from", "up", "out", "im", "i'm", "it's",
];

const DEFAULT_IDIOM_PATTERNS: &[&str] = &[
    // greetings
    r"\b(?:good (?:morning|afternoon|evening|night))\b",
    r"\b(?:hello|hey there|hi there|what'?s up)\b",
    // farewells
    r"\b(?:see you(?: later| soon| tomorrow)?|talk (?:to you )?later|take care|bye bye|goodbye)\b",
    // common questions
    r"\bhow are you\b",
    r"\bwhat are you (?:doing|up to)\b",
    r"\bwhere are you\b",
    r"\bare you (?:ok|okay|free|coming)\b",
    // apologies and thanks
    r"\b(?:i'?m sorry|sorry about that|my bad)\b",
    r"\b(?:thank you(?: so much)?|thanks a lot)\b",
    // time references
    r"\b(?:right now|later today|this (?:morning|evening|weekend)|next week|last night)\b",
    r"\b(?:on my way|be there soon|running late)\b",
];

const DEFAULT_POSITIVE: &[&str] = &[
    "love", "great", "good", "awesome", "happy", "nice", "thanks", "thank", "amazing", "cool",
    "glad", "perfect", "yay", "congrats", "congratulations", "haha", "lol", "best", "wonderful",
    "😀", "😃", "😄", "😁", "😊", "😍", "🥰", "😘", "😂", "🤣", "❤", "👍", "🎉", "🙌",
];

const DEFAULT_NEGATIVE: &[&str] = &[
    "sad", "bad", "hate", "angry", "sorry", "terrible", "awful", "worst", "annoying", "upset",
    "ugh", "tired", "sick", "miss", "cry", "crying", "hurt", "wrong", "problem", "unfortunately",
    "😢", "😭", "😞", "😠", "😡", "💔", "👎", "😩", "😔",
];

const DEFAULT_NEUTRAL: &[&str] = &[
    "ok", "okay", "fine", "sure", "maybe", "alright", "hmm", "k", "noted", "whatever", "🤔",
    "😐", "🙂",
];

fn owned_set(words: &[&str]) -> BTreeSet<String> {
    words.iter().map(|w| (*w).to_string()).collect()
}

/// Lowercases and drops emoji variation selectors (U+FE0F), which are never
/// matched on their own.
fn lowercase_set<S: Into<String>>(words: impl IntoIterator<Item = S>) -> BTreeSet<String> {
    words
        .into_iter()
        .map(|w| w.into().to_lowercase().replace('\u{fe0f}', ""))
        .filter(|w| !w.is_empty())
        .collect()
}

/// Configuration for [`AnalyticsProcessor`](crate::analytics::AnalyticsProcessor).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalyticsConfig {
    /// Maximum phrases kept after sorting (default: 100)
    pub max_phrases: usize,

    /// N-gram window sizes (default: [2, 3])
    pub ngram_sizes: Vec<usize>,

    /// Words removed before n-gram extraction
    pub stop_words: BTreeSet<String>,

    /// Idiom regular expressions, matched against lowercased text
    pub idiom_patterns: Vec<String>,

    /// Keywords and emoji counting toward `positive`
    pub positive_keywords: BTreeSet<String>,

    /// Keywords and emoji counting toward `negative`
    pub negative_keywords: BTreeSet<String>,

    /// Keywords and emoji counting toward `neutral`
    pub neutral_keywords: BTreeSet<String>,
}

impl Default for AnalyticsConfig {
    fn default() -> Self {
        Self {
            max_phrases: 100,
            ngram_sizes: vec![2, 3],
            stop_words: owned_set(DEFAULT_STOP_WORDS),
            idiom_patterns: DEFAULT_IDIOM_PATTERNS.iter().map(|p| (*p).to_string()).collect(),
            positive_keywords: owned_set(DEFAULT_POSITIVE),
            negative_keywords: owned_set(DEFAULT_NEGATIVE),
            neutral_keywords: owned_set(DEFAULT_NEUTRAL),
        }
    }
}

impl AnalyticsConfig {
    /// Creates a new configuration with the default vocabularies.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the phrase cap.
    #[must_use]
    pub fn with_max_phrases(mut self, max: usize) -> Self {
        self.max_phrases = max;
        self
    }

    /// Sets the n-gram window sizes. Sizes below 1 are ignored.
    #[must_use]
    pub fn with_ngram_sizes(mut self, sizes: impl IntoIterator<Item = usize>) -> Self {
        self.ngram_sizes = sizes.into_iter().filter(|&n| n > 0).collect();
        self
    }

    /// Replaces the stop-word list.
    #[must_use]
    pub fn with_stop_words<S: Into<String>>(mut self, words: impl IntoIterator<Item = S>) -> Self {
        self.stop_words = lowercase_set(words);
        self
    }

    /// Replaces the idiom pattern list.
    #[must_use]
    pub fn with_idiom_patterns<S: Into<String>>(
        mut self,
        patterns: impl IntoIterator<Item = S>,
    ) -> Self {
        self.idiom_patterns = patterns.into_iter().map(Into::into).collect();
        self
    }

    /// Replaces the three sentiment keyword sets.
    #[must_use]
    pub fn with_sentiment_keywords<S: Into<String>>(
        mut self,
        positive: impl IntoIterator<Item = S>,
        negative: impl IntoIterator<Item = S>,
        neutral: impl IntoIterator<Item = S>,
    ) -> Self {
        self.positive_keywords = lowercase_set(positive);
        self.negative_keywords = lowercase_set(negative);
        self.neutral_keywords = lowercase_set(neutral);
        self
    }
}

/// Configuration for [`ImportOrchestrator`](crate::import::ImportOrchestrator).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImportConfig {
    /// Messages per storage batch (default: 100)
    pub message_batch_size: usize,

    /// Phrase records per storage batch (default: 50)
    pub phrase_batch_size: usize,

    /// Voice-note records per storage batch (default: 50)
    pub voice_note_batch_size: usize,

    /// Working directory for extraction. `None` uses a fresh temp dir.
    /// The directory is removed when the import finishes either way.
    pub work_dir: Option<PathBuf>,

    pub extractor: ExtractorConfig,
    pub parser: ParserConfig,
    pub analytics: AnalyticsConfig,
}

impl Default for ImportConfig {
    fn default() -> Self {
        Self {
            message_batch_size: 100,
            phrase_batch_size: 50,
            voice_note_batch_size: 50,
            work_dir: None,
            extractor: ExtractorConfig::default(),
            parser: ParserConfig::default(),
            analytics: AnalyticsConfig::default(),
        }
    }
}

impl ImportConfig {
    /// Creates a new configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the message batch size (minimum 1).
    #[must_use]
    pub fn with_message_batch_size(mut self, size: usize) -> Self {
        self.message_batch_size = size.max(1);
        self
    }

    /// Sets the phrase batch size (minimum 1).
    #[must_use]
    pub fn with_phrase_batch_size(mut self, size: usize) -> Self {
        self.phrase_batch_size = size.max(1);
        self
    }

    /// Sets the voice-note batch size (minimum 1).
    #[must_use]
    pub fn with_voice_note_batch_size(mut self, size: usize) -> Self {
        self.voice_note_batch_size = size.max(1);
        self
    }

    /// Uses `dir` as the working directory instead of a temp dir.
    #[must_use]
    pub fn with_work_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.work_dir = Some(dir.into());
        self
    }

    #[must_use]
    pub fn with_extractor(mut self, extractor: ExtractorConfig) -> Self {
        self.extractor = extractor;
        self
    }

    #[must_use]
    pub fn with_parser(mut self, parser: ParserConfig) -> Self {
        self.parser = parser;
        self
    }

    #[must_use]
    pub fn with_analytics(mut self, analytics: AnalyticsConfig) -> Self {
        self.analytics = analytics;
        self
    }
}
