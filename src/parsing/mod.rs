//! Line-level helpers used by [`TranscriptParser`](crate::parser::TranscriptParser).
//!
//! - [`timestamp`]: ordered date-format strategies with lenient clock parsing
//! - [`content`]: message type, quote, attachment and duration detection
//! - [`system`]: system-notice recognition for colon-bearing notices

pub mod content;
pub mod system;
pub mod timestamp;

pub use content::{ContentInfo, analyze_content, classify_content, detect_quote};
pub use system::looks_like_system_notice;
pub use timestamp::{Clock, DateFormat, parse_timestamp};
