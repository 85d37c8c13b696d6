//! End-to-end import tests.
//!
//! Each test builds a ZIP archive in memory, runs the full orchestrator and
//! inspects what reached the store.

use std::fs;
use std::io::{Cursor, Write};
use std::sync::{Arc, Mutex};

use chatsift::import::{
    ANALYTICS_FILE, ImportOrchestrator, ImportStage, ImportStore, JsonlStore, MESSAGES_FILE,
    MemoryStore, PHRASES_FILE, VOICE_NOTES_FILE,
};
use chatsift::prelude::*;
use chatsift::voice::LinearEmotionModel;
use chatsift::analytics::{CommunicationPatterns, SentimentDistribution};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

// ============================================================================
// Fixtures
// ============================================================================

fn build_zip(entries: &[(&str, &[u8])]) -> Cursor<Vec<u8>> {
    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);
    for (name, data) in entries {
        writer.start_file(*name, options).unwrap();
        writer.write_all(data).unwrap();
    }
    let mut cursor = writer.finish().unwrap();
    cursor.set_position(0);
    cursor
}

/// Minimal PCM WAV: 8 kHz mono 16-bit.
fn wav(seconds: u32) -> Vec<u8> {
    let data_len = 8_000 * 2 * seconds;
    let mut out = Vec::new();
    out.extend_from_slice(b"RIFF");
    out.extend_from_slice(&(36 + data_len).to_le_bytes());
    out.extend_from_slice(b"WAVE");
    out.extend_from_slice(b"fmt ");
    out.extend_from_slice(&16u32.to_le_bytes());
    out.extend_from_slice(&1u16.to_le_bytes());
    out.extend_from_slice(&1u16.to_le_bytes());
    out.extend_from_slice(&8_000u32.to_le_bytes());
    out.extend_from_slice(&16_000u32.to_le_bytes());
    out.extend_from_slice(&2u16.to_le_bytes());
    out.extend_from_slice(&16u16.to_le_bytes());
    out.extend_from_slice(b"data");
    out.extend_from_slice(&data_len.to_le_bytes());
    out.resize(out.len() + data_len as usize, 0);
    out
}

const CHAT: &str = "\u{feff}Messages and calls are end-to-end encrypted.\n\
1/15/24, 9:00 AM - Alice created group \"Trip\"\n\
1/15/24, 9:01 AM - Alice: good morning! are you ok? 😊\n\
1/15/24, 9:02 AM - Bob: good morning, love it 😂\n\
so excited for the trip\n\
\n\
1/15/24, 9:03 AM - Bob: voice-note-1.wav (file attached) (0:09)\n\
1/15/24, 9:04 AM - Alice: IMG-20240115-WA0001.jpg (file attached)\n\
1/15/24, 9:05 AM - Alice: ugh this is terrible, so sad\n\
1/15/24, 9:06 AM - Bob: PTT-20240115-WA0002.opus (file attached) (0:03)\n";

fn ogg_page(granule: u64, payload: &[u8]) -> Vec<u8> {
    let mut page = b"OggS\0\0".to_vec();
    page.extend_from_slice(&granule.to_le_bytes());
    page.extend_from_slice(&[1, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0]); // serial, sequence, crc
    page.push(1);
    page.push(u8::try_from(payload.len()).unwrap());
    page.extend_from_slice(payload);
    page
}

/// Opus stream whose last page reports `granule` (48 kHz samples, no pre-skip).
fn opus(granule: u64) -> Vec<u8> {
    let mut head = b"OpusHead\x01\x01".to_vec();
    head.extend_from_slice(&0u16.to_le_bytes());
    head.extend_from_slice(&48_000u32.to_le_bytes());
    head.extend_from_slice(&[0, 0, 0]);

    let mut out = ogg_page(0, &head);
    out.extend(ogg_page(granule, &[0u8; 16]));
    out
}

fn chat_archive() -> Cursor<Vec<u8>> {
    build_zip(&[
        ("_chat.txt", CHAT.as_bytes()),
        ("voice-note-1.wav", &wav(2)),
        ("IMG-20240115-WA0001.jpg", b"\xff\xd8\xff\xe0jpeg"),
    ])
}

fn recorder() -> (ProgressCallback, Arc<Mutex<Vec<ProgressEvent>>>) {
    let events = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&events);
    let callback: ProgressCallback = Arc::new(move |event| sink.lock().unwrap().push(event));
    (callback, events)
}

// ============================================================================
// Success path
// ============================================================================

#[test]
fn test_full_import_into_memory() {
    let mut orchestrator = ImportOrchestrator::new(MemoryStore::new());
    let outcome = orchestrator.run(chat_archive());

    assert!(outcome.is_success(), "{outcome}");
    let store = orchestrator.store();

    // system notice + 6 sender messages; the encryption banner is orphaned
    assert_eq!(store.messages.len(), 7);
    assert_eq!(store.messages[0].message_type, MessageType::System);
    assert_eq!(store.messages[0].sender, "System");
    assert_eq!(
        store.messages[2].text,
        "good morning, love it 😂\nso excited for the trip"
    );
    assert_eq!(store.messages[3].message_type, MessageType::VoiceNote);
    assert_eq!(store.messages[4].message_type, MessageType::Image);

    // Only the voice note present in the archive is stored.
    assert_eq!(store.voice_notes.len(), 1);
    let note = &store.voice_notes[0];
    assert_eq!(note.file_name, "voice-note-1.wav");
    assert_eq!(note.sender, "Bob");
    assert_eq!(note.duration_ms, 2_000);
    assert!(note.file_path.ends_with("voice-note-1.wav"));
    assert!(note.emotion.is_none());

    let sentiment = store.sentiment.as_ref().unwrap();
    assert_eq!(sentiment.total_messages, 3);
    assert_eq!(sentiment.count(SentimentLabel::Positive), 2);
    assert_eq!(sentiment.count(SentimentLabel::Negative), 1);

    let patterns = store.patterns.as_ref().unwrap();
    assert_eq!(patterns.hourly[9], 7);
    assert!(patterns.senders.iter().all(|s| s.sender != "System"));

    assert!(store.phrases.iter().any(|p| p.phrase == "good morning" && p.count == 2));
    assert_eq!(
        outcome,
        ImportOutcome::Success {
            message_count: 7,
            voice_note_count: 1,
            phrase_count: store.phrases.len(),
        }
    );
}

#[test]
fn test_progress_is_ordered_and_finishes_once() {
    let (progress, events) = recorder();
    let mut orchestrator = ImportOrchestrator::new(MemoryStore::new()).with_progress(progress);
    orchestrator.run(chat_archive());

    let events = events.lock().unwrap();
    let percents: Vec<u8> = events
        .iter()
        .filter_map(|e| match e {
            ProgressEvent::Stage(update) => Some(update.percent),
            ProgressEvent::Finished(_) => None,
        })
        .collect();
    assert!(percents.windows(2).all(|w| w[0] <= w[1]), "{percents:?}");
    assert_eq!(percents.first(), Some(&0));
    assert_eq!(percents.last(), Some(&100));

    let labels: Vec<&str> = events
        .iter()
        .filter_map(|e| match e {
            ProgressEvent::Stage(update) if update.detail.is_none() => Some(update.stage.as_str()),
            _ => None,
        })
        .collect();
    assert_eq!(
        labels,
        vec![
            "Validating archive",
            "Extracting archive",
            "Parsing transcript",
            "Saving messages",
            "Processing voice notes",
            "Running analytics",
            "Saving analytics",
            "Completed",
        ]
    );

    let finished: Vec<_> = events
        .iter()
        .filter(|e| matches!(e, ProgressEvent::Finished(_)))
        .collect();
    assert_eq!(finished.len(), 1);
    assert!(matches!(events.last(), Some(ProgressEvent::Finished(o)) if o.is_success()));
}

#[test]
fn test_jsonl_store_output() {
    let out = tempfile::tempdir().unwrap();
    let store = JsonlStore::create(out.path()).unwrap();
    let mut orchestrator = ImportOrchestrator::new(store);
    assert!(orchestrator.run(chat_archive()).is_success());

    let messages = fs::read_to_string(out.path().join(MESSAGES_FILE)).unwrap();
    assert_eq!(messages.lines().count(), 7);
    let first: serde_json::Value = serde_json::from_str(messages.lines().next().unwrap()).unwrap();
    assert_eq!(first["type"], "system");

    let voice = fs::read_to_string(out.path().join(VOICE_NOTES_FILE)).unwrap();
    assert_eq!(voice.lines().count(), 1);

    let phrases = fs::read_to_string(out.path().join(PHRASES_FILE)).unwrap();
    assert!(phrases.contains("good morning"));

    let analytics: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(out.path().join(ANALYTICS_FILE)).unwrap()).unwrap();
    assert_eq!(analytics["sentiment"]["total_messages"], 3);
}

#[test]
fn test_voice_notes_tagged_with_model() {
    let voice = VoiceNoteProcessor::new().with_model(Arc::new(LinearEmotionModel::baseline()));
    let mut orchestrator = ImportOrchestrator::new(MemoryStore::new()).with_voice_processor(voice);
    assert!(orchestrator.run(chat_archive()).is_success());

    let note = &orchestrator.store().voice_notes[0];
    let emotion = note.emotion.as_ref().expect("emotion tag");
    let total: f32 = emotion.scores.values().sum();
    assert!((total - 1.0).abs() < 1e-3);
}

#[test]
fn test_bad_voice_notes_do_not_stop_the_batch() {
    let chat = "1/1/24, 9:00 AM - A: PTT-20240101-WA0001.opus (file attached) (0:02)\n\
1/1/24, 9:01 AM - B: PTT-20240101-WA0002.opus (file attached) (0:07)\n\
1/1/24, 9:02 AM - A: PTT-20240101-WA0003.opus (file attached)\n\
1/1/24, 9:03 AM - B: PTT-20240101-WA0004.opus (file attached) (0:05)\n\
1/1/24, 9:04 AM - A: still here\n";
    let archive = build_zip(&[
        ("_chat.txt", chat.as_bytes()),
        ("PTT-20240101-WA0001.opus", &opus(1_500 * 48)),
        ("PTT-20240101-WA0002.opus", &opus(u64::MAX - 1)),
        ("PTT-20240101-WA0003.opus", b"Ogg"),
    ]);

    let mut orchestrator = ImportOrchestrator::new(MemoryStore::new());
    let outcome = orchestrator.run(archive);

    assert!(outcome.is_success(), "{outcome}");
    let store = orchestrator.store();
    let durations: Vec<(&str, i64)> = store
        .voice_notes
        .iter()
        .map(|n| (n.file_name.as_str(), n.duration_ms))
        .collect();
    assert_eq!(
        durations,
        vec![
            ("PTT-20240101-WA0001.opus", 1_500),
            ("PTT-20240101-WA0002.opus", 7_000),
            ("PTT-20240101-WA0003.opus", 0),
        ]
    );
    assert_eq!(store.messages.len(), 5);
    assert_eq!(
        outcome,
        ImportOutcome::Success {
            message_count: 5,
            voice_note_count: 3,
            phrase_count: store.phrases.len(),
        }
    );
}

#[test]
fn test_small_batches() {
    let config = ImportConfig::new()
        .with_message_batch_size(2)
        .with_phrase_batch_size(1);
    let mut orchestrator = ImportOrchestrator::new(MemoryStore::new()).with_config(config);
    assert!(orchestrator.run(chat_archive()).is_success());

    let store = orchestrator.store();
    assert_eq!(store.message_batches, 4);
    assert_eq!(store.phrase_batches, store.phrases.len());
}

#[test]
fn test_nested_transcript_and_unsafe_entries() {
    let archive = build_zip(&[
        ("../escape.txt", b"nope"),
        ("WhatsApp Chat - Trip/_chat.txt", b"1/1/24, 9:00 AM - A: hello there\n"),
    ]);
    let mut orchestrator = ImportOrchestrator::new(MemoryStore::new());
    let outcome = orchestrator.run(archive);

    assert!(outcome.is_success(), "{outcome}");
    assert_eq!(orchestrator.store().messages.len(), 1);
}

#[test]
fn test_work_dir_removed_after_success() {
    let work = tempfile::tempdir().unwrap();
    let mut orchestrator = ImportOrchestrator::new(MemoryStore::new())
        .with_config(ImportConfig::new().with_work_dir(work.path().join("scratch")));
    assert!(orchestrator.run(chat_archive()).is_success());

    let leftovers = fs::read_dir(work.path().join("scratch")).unwrap().count();
    assert_eq!(leftovers, 0);
}

// ============================================================================
// Failure paths
// ============================================================================

#[test]
fn test_not_a_zip() {
    let mut orchestrator = ImportOrchestrator::new(MemoryStore::new());
    let outcome = orchestrator.run(Cursor::new(b"just some text".to_vec()));

    assert_eq!(outcome.error_message(), Some("Invalid archive: not a ZIP archive"));
    assert!(orchestrator.store().messages.is_empty());
    assert_eq!(orchestrator.stage(), ImportStage::Failed);
}

#[test]
fn test_empty_archive_bytes() {
    let mut orchestrator = ImportOrchestrator::new(MemoryStore::new());
    let outcome = orchestrator.run(Cursor::new(Vec::new()));
    assert_eq!(outcome.error_message(), Some("Invalid archive: archive is empty"));
}

#[test]
fn test_missing_transcript() {
    let archive = build_zip(&[("IMG-1.jpg", b"jpeg")]);
    let (progress, events) = recorder();
    let mut orchestrator = ImportOrchestrator::new(MemoryStore::new()).with_progress(progress);
    let outcome = orchestrator.run(archive);

    assert!(outcome.error_message().unwrap().contains("_chat.txt"));
    let events = events.lock().unwrap();
    assert!(events.iter().any(|e| matches!(
        e,
        ProgressEvent::Stage(update) if update.stage == "Failed"
    )));
}

#[test]
fn test_invalid_utf8_transcript() {
    let archive = build_zip(&[("_chat.txt", &[0xff, 0xfe, 0x41])]);
    let mut orchestrator = ImportOrchestrator::new(MemoryStore::new());
    let outcome = orchestrator.run(archive);
    assert!(outcome.error_message().unwrap().contains("UTF-8"));
}

struct FailingStore {
    accepted: usize,
}

impl ImportStore for FailingStore {
    fn save_messages(&mut self, batch: &[Message]) -> Result<()> {
        if self.accepted > 0 {
            return Err(ChatsiftError::storage("disk full"));
        }
        self.accepted += batch.len();
        Ok(())
    }

    fn save_voice_notes(&mut self, _batch: &[VoiceNoteRecord]) -> Result<()> {
        Ok(())
    }

    fn save_phrases(&mut self, _batch: &[PhraseFrequency]) -> Result<()> {
        Ok(())
    }

    fn save_analytics(
        &mut self,
        _sentiment: &SentimentDistribution,
        _patterns: &CommunicationPatterns,
    ) -> Result<()> {
        panic!("analytics must not be saved after a failed message batch");
    }
}

#[test]
fn test_store_failure_is_fatal() {
    let config = ImportConfig::new().with_message_batch_size(3);
    let mut orchestrator =
        ImportOrchestrator::new(FailingStore { accepted: 0 }).with_config(config);
    let outcome = orchestrator.run(chat_archive());

    assert_eq!(outcome.error_message(), Some("Storage error: disk full"));
    assert_eq!(orchestrator.store().accepted, 3);
}

#[test]
fn test_cancel_between_chunks() {
    let token = CancellationToken::new();
    let trigger = token.clone();
    let callback: ProgressCallback = Arc::new(move |event| {
        if let ProgressEvent::Stage(update) = event {
            if update.detail.as_deref() == Some("chunk 1/7") {
                trigger.cancel();
            }
        }
    });

    let mut orchestrator = ImportOrchestrator::new(MemoryStore::new())
        .with_config(ImportConfig::new().with_message_batch_size(1))
        .with_progress(callback)
        .with_cancellation(token);
    let outcome = orchestrator.run(chat_archive());

    assert_eq!(outcome.error_message(), Some("import cancelled"));
    assert_eq!(orchestrator.store().messages.len(), 1);
    assert!(orchestrator.store().sentiment.is_none());
}
