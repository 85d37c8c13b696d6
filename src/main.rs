//! # chatsift CLI
//!
//! Command-line interface for the chatsift library.

use std::process;
use std::sync::Arc;
use std::time::Instant;

use clap::Parser as ClapParser;
use tracing_subscriber::EnvFilter;

use chatsift::cli::Args;
use chatsift::import::{ANALYTICS_FILE, ImportOrchestrator, JsonlStore, MESSAGES_FILE};
use chatsift::progress::{ImportOutcome, no_progress, stderr_progress};
use chatsift::voice::{LinearEmotionModel, VoiceNoteProcessor};
use chatsift::ChatsiftError;

fn main() {
    init_tracing();
    if let Err(e) = run() {
        eprintln!("❌ Error: {}", e);
        process::exit(1);
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("chatsift=warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn run() -> Result<(), ChatsiftError> {
    let start = Instant::now();
    let args = <Args as ClapParser>::parse();

    println!("📦 chatsift v{}", env!("CARGO_PKG_VERSION"));
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    println!("📂 Archive: {}", args.archive.display());
    println!("💾 Output:  {}", args.output.display());
    if args.classify_voice {
        println!("🎙️  Voice:   emotion tagging (baseline model)");
    }
    println!();

    let store = JsonlStore::create(&args.output)?;
    let mut voice = VoiceNoteProcessor::new();
    if args.classify_voice {
        voice = voice.with_model(Arc::new(LinearEmotionModel::baseline()));
    }
    let progress = if args.quiet { no_progress() } else { stderr_progress() };

    let mut orchestrator = ImportOrchestrator::new(store)
        .with_config(args.import_config())
        .with_voice_processor(voice)
        .with_progress(progress);
    let outcome = orchestrator.run_path(&args.archive);

    match outcome {
        ImportOutcome::Success {
            message_count,
            voice_note_count,
            phrase_count,
        } => {
            let out = orchestrator.store().dir();
            println!("✅ Done! Output saved to {}", out.display());
            println!();
            println!("📊 Summary:");
            println!("   Messages:    {}", message_count);
            println!("   Voice notes: {}", voice_note_count);
            println!("   Phrases:     {}", phrase_count);
            println!("   Files:       {}, {}", MESSAGES_FILE, ANALYTICS_FILE);
            println!();
            println!("⚡ Total time: {:.2}s", start.elapsed().as_secs_f64());
            Ok(())
        }
        ImportOutcome::Failed { error_message } => {
            eprintln!("❌ Import failed: {}", error_message);
            process::exit(1);
        }
    }
}
