//! Unified error types for chatsift.
//!
//! This module provides a single [`ChatsiftError`] enum covering every fatal
//! error in the import pipeline, plus the narrower [`ValidationError`] raised
//! by the cheap structural checks that run before extraction.
//!
//! # Error Handling Philosophy
//!
//! - **Fatal** errors (validation, archive I/O, missing transcript) abort the
//!   whole import and surface as a single human-readable cause.
//! - **Isolated** errors (one bad voice note) are logged and skipped; they
//!   never reach this type.
//! - Malformed transcript lines are not errors at all: the parser folds them
//!   into the previous message or drops them and counts them in
//!   [`ParseStats`](crate::message::ParseStats).

use std::io;

use thiserror::Error;

/// A specialized [`Result`] type for chatsift operations.
///
/// # Example
///
/// ```rust
/// use chatsift::error::Result;
/// use chatsift::Message;
///
/// fn my_function() -> Result<Vec<Message>> {
///     Ok(vec![])
/// }
/// ```
pub type Result<T> = std::result::Result<T, ChatsiftError>;

/// The error type for all chatsift operations.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ChatsiftError {
    /// An I/O error occurred while reading the archive or writing files.
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// The archive failed a structural check before extraction.
    #[error("Invalid archive: {0}")]
    Validation(#[from] ValidationError),

    /// The ZIP reader rejected the archive or one of its entries.
    #[error("ZIP error: {0}")]
    Zip(#[from] zip::result::ZipError),

    /// Extraction finished but no `_chat.txt` entry was written.
    #[error("Archive does not contain a _chat.txt transcript")]
    MissingTranscript,

    /// Storage collaborator failed to persist a batch.
    #[error("Storage error: {message}")]
    Storage {
        /// Description of the failure reported by the store
        message: String,
    },

    /// JSON serialization error (used by the JSONL store).
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Transcript bytes are not valid UTF-8.
    #[error("UTF-8 encoding error in {context}: {source}")]
    Utf8 {
        /// Description of where the error occurred
        context: String,
        /// The underlying UTF-8 error
        #[source]
        source: std::string::FromUtf8Error,
    },

    /// The scoring model rejected a feature vector.
    #[error("Model error: {message}")]
    Model {
        /// Description of the model failure
        message: String,
    },

    /// The import was cancelled by the caller.
    #[error("import cancelled")]
    Cancelled,
}

/// Structural problems detected by [`ArchiveValidator`](crate::archive::ArchiveValidator).
///
/// Checks run in order and the first failure wins, so each kind is distinct.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ValidationError {
    /// The archive has zero bytes.
    #[error("archive is empty")]
    Empty,

    /// The first four bytes are not a ZIP local-file-header signature.
    #[error("not a ZIP archive")]
    NotAZip,

    /// No entry named `_chat.txt` was found.
    #[error("archive does not contain a _chat.txt transcript")]
    MissingTranscript,

    /// The source could not be read while validating.
    #[error("could not read archive: {0}")]
    Io(#[from] io::Error),
}

impl From<std::string::FromUtf8Error> for ChatsiftError {
    fn from(err: std::string::FromUtf8Error) -> Self {
        ChatsiftError::Utf8 {
            context: "transcript".to_string(),
            source: err,
        }
    }
}

// ============================================================================
// Convenience constructors
// ============================================================================

impl ChatsiftError {
    /// Creates a storage error.
    pub fn storage(message: impl Into<String>) -> Self {
        ChatsiftError::Storage {
            message: message.into(),
        }
    }

    /// Creates a model error.
    pub fn model(message: impl Into<String>) -> Self {
        ChatsiftError::Model {
            message: message.into(),
        }
    }

    /// Returns `true` if this is an IO error.
    pub fn is_io(&self) -> bool {
        matches!(self, ChatsiftError::Io(_))
    }

    /// Returns `true` if this is a validation error.
    pub fn is_validation(&self) -> bool {
        matches!(self, ChatsiftError::Validation(_))
    }

    /// Returns `true` if the import was cancelled.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, ChatsiftError::Cancelled)
    }
}

// ============================================================================
// Tests
// ============================================================================
