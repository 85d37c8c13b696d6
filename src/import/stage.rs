use std::fmt;

use serde::{Deserialize, Serialize};

/// Stages of one import run, in execution order.
///
/// `Failed` is terminal and reachable from any stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImportStage {
    Validating,
    Extracting,
    ParsingTranscript,
    SavingMessages,
    ProcessingVoiceNotes,
    RunningAnalytics,
    SavingAnalytics,
    Completed,
    Failed,
}

impl ImportStage {
    /// Human-readable label reported to the progress callback.
    pub fn label(self) -> &'static str {
        match self {
            ImportStage::Validating => "Validating archive",
            ImportStage::Extracting => "Extracting archive",
            ImportStage::ParsingTranscript => "Parsing transcript",
            ImportStage::SavingMessages => "Saving messages",
            ImportStage::ProcessingVoiceNotes => "Processing voice notes",
            ImportStage::RunningAnalytics => "Running analytics",
            ImportStage::SavingAnalytics => "Saving analytics",
            ImportStage::Completed => "Completed",
            ImportStage::Failed => "Failed",
        }
    }

    /// Overall percentage when the stage starts.
    pub fn percent(self) -> u8 {
        match self {
            ImportStage::Validating => 0,
            ImportStage::Extracting => 10,
            ImportStage::ParsingTranscript => 30,
            ImportStage::SavingMessages => 40,
            ImportStage::ProcessingVoiceNotes => 60,
            ImportStage::RunningAnalytics => 75,
            ImportStage::SavingAnalytics => 85,
            ImportStage::Completed | ImportStage::Failed => 100,
        }
    }

    /// Percentage after `done` of `total` chunks of this stage.
    ///
    /// Interpolates toward the next stage's starting percentage, never
    /// reaching it.
    pub fn chunk_percent(self, done: usize, total: usize) -> u8 {
        let start = self.percent();
        let Some(next) = self.next() else {
            return start;
        };
        let span = usize::from(next.percent().saturating_sub(start).saturating_sub(1));
        let step = if total == 0 { span } else { span * done.min(total) / total };
        start.saturating_add(u8::try_from(step).unwrap_or(u8::MAX))
    }

    /// Following stage on the success path.
    pub fn next(self) -> Option<ImportStage> {
        match self {
            ImportStage::Validating => Some(ImportStage::Extracting),
            ImportStage::Extracting => Some(ImportStage::ParsingTranscript),
            ImportStage::ParsingTranscript => Some(ImportStage::SavingMessages),
            ImportStage::SavingMessages => Some(ImportStage::ProcessingVoiceNotes),
            ImportStage::ProcessingVoiceNotes => Some(ImportStage::RunningAnalytics),
            ImportStage::RunningAnalytics => Some(ImportStage::SavingAnalytics),
            ImportStage::SavingAnalytics => Some(ImportStage::Completed),
            ImportStage::Completed | ImportStage::Failed => None,
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, ImportStage::Completed | ImportStage::Failed)
    }
}

impl fmt::Display for ImportStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
