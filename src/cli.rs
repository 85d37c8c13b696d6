//! Command-line interface definition using clap.
//!
//! This module defines [`Args`], the argument structure for the `chatsift`
//! binary, plus the conversion from arguments to an [`ImportConfig`].

use std::path::PathBuf;

use clap::Parser;

use crate::config::{AnalyticsConfig, ImportConfig};

/// Import a WhatsApp chat-export archive and write messages, voice notes
/// and conversational analytics as JSON Lines.
#[derive(Parser, Debug, Clone)]
#[command(name = "chatsift")]
#[command(version, about, long_about = None)]
#[command(after_help = "EXAMPLES:
    chatsift \"WhatsApp Chat - Alice.zip\"
    chatsift chat.zip -o analysis --max-phrases 50
    chatsift chat.zip --classify-voice --work-dir /tmp/chatsift
    RUST_LOG=chatsift=debug chatsift chat.zip --quiet")]
pub struct Args {
    /// Path to the exported .zip archive
    pub archive: PathBuf,

    /// Output directory for the JSONL files
    #[arg(short, long, default_value = "chatsift_out")]
    pub output: PathBuf,

    /// Directory in which to create the temporary extraction dir
    #[arg(long, value_name = "DIR")]
    pub work_dir: Option<PathBuf>,

    /// Maximum number of phrases kept
    #[arg(long, default_value_t = 100)]
    pub max_phrases: usize,

    /// Messages per storage batch
    #[arg(long, default_value_t = 100)]
    pub batch_size: usize,

    /// Tag voice notes with the built-in baseline emotion model
    #[arg(long)]
    pub classify_voice: bool,

    /// Suppress progress output
    #[arg(short, long)]
    pub quiet: bool,
}

impl Args {
    /// Builds the import configuration described by these arguments.
    pub fn import_config(&self) -> ImportConfig {
        let mut config = ImportConfig::new()
            .with_message_batch_size(self.batch_size)
            .with_analytics(AnalyticsConfig::new().with_max_phrases(self.max_phrases));
        if let Some(dir) = &self.work_dir {
            config = config.with_work_dir(dir);
        }
        config
    }
}
