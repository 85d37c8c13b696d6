//! Voice-note metadata and optional emotion tagging.
//!
//! Neither operation propagates errors: a missing or unreadable file yields
//! `None` and a `warn` log, so callers can skip the item and keep going.

pub mod duration;
mod emotion;

pub use duration::{Container, probe_duration_ms, sniff};
pub use emotion::{
    DEFAULT_FEATURE_LEN, EmotionModel, FeatureExtractor, LinearEmotionModel, SyntheticFeatures,
    tag_from_scores,
};

use std::fs::File;
use std::path::Path;
use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::error::Result;
use crate::message::{EmotionTag, VoiceNoteRecord};

/// Extracts voice-note metadata and, when a model is configured, an emotion tag.
///
/// # Example
///
/// ```rust,no_run
/// use chatsift::voice::{LinearEmotionModel, VoiceNoteProcessor};
/// use chrono::Utc;
/// use std::path::Path;
/// use std::sync::Arc;
///
/// let processor = VoiceNoteProcessor::new().with_model(Arc::new(LinearEmotionModel::baseline()));
/// let path = Path::new("out/PTT-20240101-WA0001.opus");
/// if let Some(record) = processor.extract_metadata(path, "PTT-20240101-WA0001.opus", "Alice", Utc::now()) {
///     println!("{} ms, emotion {:?}", record.duration_ms, processor.classify(path));
/// }
/// ```
#[derive(Clone)]
pub struct VoiceNoteProcessor {
    features: Arc<dyn FeatureExtractor>,
    model: Option<Arc<dyn EmotionModel>>,
}

impl std::fmt::Debug for VoiceNoteProcessor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VoiceNoteProcessor")
            .field("feature_dims", &self.features.dims())
            .field("model_labels", &self.model.as_ref().map(|m| m.labels().to_vec()))
            .finish()
    }
}

impl Default for VoiceNoteProcessor {
    fn default() -> Self {
        Self {
            features: Arc::new(SyntheticFeatures::default()),
            model: None,
        }
    }
}

impl VoiceNoteProcessor {
    /// Creates a processor with synthetic features and no model.
    pub fn new() -> Self {
        Self::default()
    }

    /// Enables classification with `model`.
    #[must_use]
    pub fn with_model(mut self, model: Arc<dyn EmotionModel>) -> Self {
        self.model = Some(model);
        self
    }

    /// Replaces the feature extraction strategy.
    #[must_use]
    pub fn with_feature_extractor(mut self, features: Arc<dyn FeatureExtractor>) -> Self {
        self.features = features;
        self
    }

    /// Returns `true` if [`classify`](Self::classify) can produce tags.
    pub fn has_model(&self) -> bool {
        self.model.is_some()
    }

    /// Builds a [`VoiceNoteRecord`] for the file at `path`.
    ///
    /// Duration falls back to 0 for unrecognized containers. Returns `None`
    /// if the file cannot be opened or read.
    pub fn extract_metadata(
        &self,
        path: &Path,
        file_name: &str,
        sender: &str,
        timestamp: DateTime<Utc>,
    ) -> Option<VoiceNoteRecord> {
        match probe_file(path) {
            Ok(duration_ms) => Some(VoiceNoteRecord {
                file_name: file_name.to_string(),
                sender: sender.to_string(),
                timestamp,
                duration_ms,
                file_path: path.to_string_lossy().into_owned(),
                emotion: None,
            }),
            Err(e) => {
                tracing::warn!(file = %path.display(), error = %e, "Failed to read voice note");
                None
            }
        }
    }

    /// Scores the file at `path`; `None` without a model or on any failure.
    pub fn classify(&self, path: &Path) -> Option<EmotionTag> {
        let model = self.model.as_ref()?;
        let scored = self
            .features
            .extract(path)
            .and_then(|features| model.score(&features));
        match scored {
            Ok(scores) => tag_from_scores(model.labels(), &scores),
            Err(e) => {
                tracing::warn!(file = %path.display(), error = %e, "Voice note classification failed");
                None
            }
        }
    }
}

fn probe_file(path: &Path) -> Result<i64> {
    let mut file = File::open(path)?;
    let duration = probe_duration_ms(&mut file)?.unwrap_or_else(|| {
        tracing::debug!(file = %path.display(), "Unrecognized audio container");
        0
    });
    Ok(i64::try_from(duration).unwrap_or(i64::MAX))
}
