//! Progress reporting for the import pipeline.
//!
//! The orchestrator pushes [`ProgressEvent`]s through a [`ProgressCallback`]:
//! one [`ProgressEvent::Stage`] per stage transition (and between storage
//! chunks), then exactly one [`ProgressEvent::Finished`] carrying the
//! terminal [`ImportOutcome`].
//!
//! # Example
//!
//! ```rust
//! use chatsift::progress::{ProgressCallback, ProgressEvent};
//! use std::sync::Arc;
//!
//! let callback: ProgressCallback = Arc::new(|event| match event {
//!     ProgressEvent::Stage(update) => println!("{}: {}%", update.stage, update.percent),
//!     ProgressEvent::Finished(outcome) => println!("done: {}", outcome.is_success()),
//! });
//! # let _ = callback;
//! ```

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

/// A single progress update.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgressUpdate {
    /// Human-readable stage label.
    pub stage: String,

    /// Overall completion, 0..=100.
    pub percent: u8,

    /// Optional detail such as "chunk 3/7".
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

impl ProgressUpdate {
    /// Creates an update, clamping `percent` to 100.
    pub fn new(stage: impl Into<String>, percent: u8) -> Self {
        Self {
            stage: stage.into(),
            percent: percent.min(100),
            detail: None,
        }
    }

    /// Attaches a detail string.
    #[must_use]
    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }
}

impl fmt::Display for ProgressUpdate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{:>3}%] {}", self.percent, self.stage)?;
        if let Some(detail) = &self.detail {
            write!(f, " ({detail})")?;
        }
        Ok(())
    }
}

/// Terminal result of one import run. Emitted once, never mutated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ImportOutcome {
    Success {
        message_count: usize,
        voice_note_count: usize,
        phrase_count: usize,
    },
    Failed {
        error_message: String,
    },
}

impl ImportOutcome {
    /// Returns `true` for [`ImportOutcome::Success`].
    pub fn is_success(&self) -> bool {
        matches!(self, ImportOutcome::Success { .. })
    }

    /// Returns the failure message, if any.
    pub fn error_message(&self) -> Option<&str> {
        match self {
            ImportOutcome::Failed { error_message } => Some(error_message),
            ImportOutcome::Success { .. } => None,
        }
    }
}

impl fmt::Display for ImportOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ImportOutcome::Success {
                message_count,
                voice_note_count,
                phrase_count,
            } => write!(
                f,
                "imported {message_count} messages, {voice_note_count} voice notes, {phrase_count} phrases"
            ),
            ImportOutcome::Failed { error_message } => write!(f, "import failed: {error_message}"),
        }
    }
}

/// Event delivered to a [`ProgressCallback`].
#[derive(Debug, Clone, PartialEq)]
pub enum ProgressEvent {
    Stage(ProgressUpdate),
    Finished(ImportOutcome),
}

/// Callback type for receiving progress events.
///
/// Called only from the task running the import (single writer).
pub type ProgressCallback = Arc<dyn Fn(ProgressEvent) + Send + Sync>;

/// Creates a no-op progress callback.
///
/// # Example
///
/// ```rust
/// use chatsift::progress::{no_progress, ProgressEvent, ProgressUpdate};
///
/// let callback = no_progress();
/// callback(ProgressEvent::Stage(ProgressUpdate::new("Validating", 5)));
/// ```
pub fn no_progress() -> ProgressCallback {
    Arc::new(|_| {})
}

/// Creates a progress callback that prints to stderr.
pub fn stderr_progress() -> ProgressCallback {
    Arc::new(|event| match event {
        ProgressEvent::Stage(update) => eprintln!("{update}"),
        ProgressEvent::Finished(outcome) => eprintln!("{outcome}"),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[test]
    fn test_progress_update_clamps_percent() {
        let update = ProgressUpdate::new("Saving", 250);
        assert_eq!(update.percent, 100);
    }

    #[test]
    fn test_progress_update_display() {
        let update = ProgressUpdate::new("Saving messages", 45).with_detail("chunk 2/4");
        assert_eq!(update.to_string(), "[ 45%] Saving messages (chunk 2/4)");
    }

    #[test]
    fn test_outcome_accessors() {
        let ok = ImportOutcome::Success {
            message_count: 3,
            voice_note_count: 1,
            phrase_count: 7,
        };
        assert!(ok.is_success());
        assert!(ok.error_message().is_none());
        assert!(ok.to_string().contains("3 messages"));

        let failed = ImportOutcome::Failed {
            error_message: "not a ZIP archive".into(),
        };
        assert!(!failed.is_success());
        assert_eq!(failed.error_message(), Some("not a ZIP archive"));
    }

    #[test]
    fn test_outcome_serialization() {
        let failed = ImportOutcome::Failed {
            error_message: "boom".into(),
        };
        let json = serde_json::to_string(&failed).unwrap();
        assert!(json.contains(r#""status":"failed""#));
    }

    #[test]
    fn test_no_progress_callback() {
        let callback = no_progress();
        callback(ProgressEvent::Stage(ProgressUpdate::new("x", 1)));
    }

    #[test]
    fn test_progress_callback_collects() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let callback: ProgressCallback = Arc::new(move |event| {
            sink.lock().unwrap().push(event);
        });

        callback(ProgressEvent::Stage(ProgressUpdate::new("Validating", 5)));
        assert_eq!(seen.lock().unwrap().len(), 1);
    }
}
