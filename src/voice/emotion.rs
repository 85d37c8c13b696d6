//! Pluggable feature extraction and emotion scoring for voice notes.

use std::collections::BTreeMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use crate::error::{ChatsiftError, Result};
use crate::message::EmotionTag;

/// Length of the vectors produced by [`SyntheticFeatures`].
pub const DEFAULT_FEATURE_LEN: usize = 16;

/// Upper bound on bytes read by [`SyntheticFeatures`].
const SYNTHETIC_READ_LIMIT: u64 = 1024 * 1024;

/// Turns an audio file into a fixed-length numeric feature vector.
pub trait FeatureExtractor: Send + Sync {
    /// Number of features produced.
    fn dims(&self) -> usize;

    fn extract(&self, path: &Path) -> Result<Vec<f32>>;
}

/// Scores a feature vector against a fixed set of labels.
pub trait EmotionModel: Send + Sync {
    fn labels(&self) -> &[String];

    /// One score per label, in [`EmotionModel::labels`] order.
    fn score(&self, features: &[f32]) -> Result<Vec<f32>>;
}

/// Placeholder features derived from raw file bytes.
///
/// Splits the first megabyte into equal buckets and reports each bucket's
/// mean byte value scaled to 0..=1. Deterministic, but carries no acoustic
/// meaning.
#[derive(Debug, Clone, Copy)]
pub struct SyntheticFeatures {
    dims: usize,
}

impl Default for SyntheticFeatures {
    fn default() -> Self {
        Self::new(DEFAULT_FEATURE_LEN)
    }
}

impl SyntheticFeatures {
    pub fn new(dims: usize) -> Self {
        Self { dims: dims.max(1) }
    }
}

impl FeatureExtractor for SyntheticFeatures {
    fn dims(&self) -> usize {
        self.dims
    }

    fn extract(&self, path: &Path) -> Result<Vec<f32>> {
        let mut bytes = Vec::new();
        File::open(path)?
            .take(SYNTHETIC_READ_LIMIT)
            .read_to_end(&mut bytes)?;

        if bytes.is_empty() {
            return Ok(vec![0.0; self.dims]);
        }
        let bucket = bytes.len().div_ceil(self.dims);
        let mut features: Vec<f32> = bytes
            .chunks(bucket)
            .map(|chunk| {
                let sum: u64 = chunk.iter().map(|&b| u64::from(b)).sum();
                sum as f32 / (chunk.len() as f32 * 255.0)
            })
            .collect();
        features.resize(self.dims, 0.0);
        Ok(features)
    }
}

/// Linear model followed by softmax: `softmax(W x + b)`.
#[derive(Debug, Clone, PartialEq)]
pub struct LinearEmotionModel {
    labels: Vec<String>,
    weights: Vec<Vec<f32>>,
    bias: Vec<f32>,
}

impl LinearEmotionModel {
    /// Creates a model with one weight row and one bias per label.
    ///
    /// Fails if the row count, bias length or row widths disagree.
    pub fn new(labels: Vec<String>, weights: Vec<Vec<f32>>, bias: Vec<f32>) -> Result<Self> {
        if labels.is_empty() {
            return Err(ChatsiftError::model("model has no labels"));
        }
        if weights.len() != labels.len() || bias.len() != labels.len() {
            return Err(ChatsiftError::model(format!(
                "expected {} weight rows and biases, got {} and {}",
                labels.len(),
                weights.len(),
                bias.len()
            )));
        }
        let width = weights[0].len();
        if weights.iter().any(|row| row.len() != width) {
            return Err(ChatsiftError::model("weight rows differ in width"));
        }
        Ok(Self {
            labels,
            weights,
            bias,
        })
    }

    /// Fixed four-label model over [`DEFAULT_FEATURE_LEN`] synthetic features.
    ///
    /// Useful for wiring and demos; its output is not a real emotion estimate.
    pub fn baseline() -> Self {
        let labels: Vec<String> = ["calm", "happy", "sad", "angry"]
            .iter()
            .map(|l| (*l).to_string())
            .collect();
        let weights = (0..labels.len())
            .map(|row| {
                (0..DEFAULT_FEATURE_LEN)
                    .map(|col| if col % labels.len() == row { 1.0 } else { -0.25 })
                    .collect()
            })
            .collect();
        Self {
            bias: vec![0.0; labels.len()],
            labels,
            weights,
        }
    }

    /// Input width expected by [`EmotionModel::score`].
    pub fn input_len(&self) -> usize {
        self.weights.first().map_or(0, Vec::len)
    }
}

impl EmotionModel for LinearEmotionModel {
    fn labels(&self) -> &[String] {
        &self.labels
    }

    fn score(&self, features: &[f32]) -> Result<Vec<f32>> {
        if features.len() != self.input_len() {
            return Err(ChatsiftError::model(format!(
                "expected {} features, got {}",
                self.input_len(),
                features.len()
            )));
        }
        let logits: Vec<f32> = self
            .weights
            .iter()
            .zip(&self.bias)
            .map(|(row, bias)| row.iter().zip(features).map(|(w, x)| w * x).sum::<f32>() + bias)
            .collect();
        Ok(softmax(&logits))
    }
}

fn softmax(logits: &[f32]) -> Vec<f32> {
    let max = logits.iter().copied().fold(f32::NEG_INFINITY, f32::max);
    let exps: Vec<f32> = logits.iter().map(|l| (l - max).exp()).collect();
    let total: f32 = exps.iter().sum();
    exps.iter().map(|e| e / total).collect()
}

/// Builds an [`EmotionTag`] from labels and scores; highest score wins,
/// earliest label on ties.
pub fn tag_from_scores(labels: &[String], scores: &[f32]) -> Option<EmotionTag> {
    let (best, _) = labels
        .iter()
        .zip(scores)
        .fold(None::<(&String, f32)>, |best, (label, &score)| match best {
            Some((_, top)) if top >= score => best,
            _ => Some((label, score)),
        })?;
    Some(EmotionTag {
        label: best.clone(),
        scores: labels
            .iter()
            .cloned()
            .zip(scores.iter().copied())
            .collect::<BTreeMap<_, _>>(),
    })
}
