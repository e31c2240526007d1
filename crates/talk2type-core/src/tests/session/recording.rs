use crate::{
    CoreError,
    audio::{WavEncoder, decode_wav},
    ports::{AudioEncoder, AudioSource},
    session::{RecordingSession, RecordingStore, SessionStatus},
    tests::fakes::{FailingEncoder, ScriptedSource},
};

use std::{sync::Arc, time::Duration};

use tempfile::TempDir;

const RATE: u32 = 16_000;

fn session(
    source: &Arc<ScriptedSource>,
    encoder: Arc<dyn AudioEncoder>,
    dir: &TempDir,
) -> RecordingSession {
    let store = RecordingStore::new(dir.path(), encoder.extension());
    let source: Arc<dyn AudioSource> = source.clone();
    RecordingSession::new(source, encoder, store, RATE)
}

fn files_in(dir: &TempDir) -> usize {
    std::fs::read_dir(dir.path())
        .map(|entries| entries.count())
        .unwrap_or(0)
}

/// WHAT: Stop without start fails with NotRecording and touches nothing
/// WHY: A stray release must not produce files or close devices
#[test]
#[allow(clippy::unwrap_used)]
fn given_idle_session_when_stopping_then_not_recording_without_side_effects() {
    // Given: A session that was never started
    let dir = TempDir::new().unwrap();
    let source = Arc::new(ScriptedSource::with_chunks(vec![vec![0.1; 160]]));
    let mut session = session(&source, Arc::new(WavEncoder::new()), &dir);

    // When: Stopping
    let result = session.stop();

    // Then: NotRecording, no device activity, no file
    assert!(matches!(result, Err(CoreError::NotRecording { .. })));
    assert_eq!(session.status(), SessionStatus::NotStarted);
    assert_eq!(source.opens(), 0);
    assert_eq!(source.closes(), 0);
    assert_eq!(files_in(&dir), 0);
}

/// WHAT: Starting twice fails and leaves the first session's audio intact
/// WHY: At most one capture may be active
#[test]
#[allow(clippy::unwrap_used)]
fn given_capturing_session_when_started_again_then_already_recording_and_buffer_untouched() {
    // Given: A capturing session holding one chunk
    let dir = TempDir::new().unwrap();
    let source = Arc::new(ScriptedSource::with_chunks(vec![vec![0.1; 160]]));
    let mut session = session(&source, Arc::new(WavEncoder::new()), &dir);
    let first_id = session.start().unwrap();

    // When: Starting again
    let result = session.start();

    // Then: Refused, same session, buffer unchanged, no second open
    assert!(matches!(result, Err(CoreError::AlreadyRecording { .. })));
    assert_eq!(session.id(), Some(first_id));
    assert!(session.is_capturing());
    assert_eq!(session.buffer().total_samples(), 160);
    assert_eq!(source.opens(), 1);
}

/// WHAT: A session with no chunks fails with NoAudioCaptured and writes nothing
/// WHY: Empty recordings must not reach disk or the transcriber
#[test]
#[allow(clippy::unwrap_used)]
fn given_no_chunks_when_stopping_then_no_audio_captured_and_no_file() {
    // Given: A capturing session whose source delivers nothing
    let dir = TempDir::new().unwrap();
    let source = Arc::new(ScriptedSource::default());
    let mut session = session(&source, Arc::new(WavEncoder::new()), &dir);
    session.start().unwrap();

    // When: Stopping
    let result = session.stop();

    // Then: NoAudioCaptured, capture closed, nothing written
    assert!(matches!(result, Err(CoreError::NoAudioCaptured { .. })));
    assert_eq!(session.status(), SessionStatus::Failed);
    assert_eq!(source.closes(), 1);
    assert_eq!(files_in(&dir), 0);
}

/// WHAT: Stop encodes the captured audio, saves it and reports its length
/// WHY: Every finalized recording must persist before transcription
#[test]
#[allow(clippy::unwrap_used)]
fn given_captured_chunks_when_stopping_then_recording_saved_with_duration() {
    // Given: Half a second of audio in 10 chunks
    let dir = TempDir::new().unwrap();
    let source = Arc::new(ScriptedSource::with_chunks(vec![vec![0.25; 800]; 10]));
    let mut session = session(&source, Arc::new(WavEncoder::new()), &dir);
    let session_id = session.start().unwrap();

    // When: Stopping
    let recording = session.stop().unwrap();

    // Then: The file exists with the encoded bytes and the metadata matches
    assert_eq!(recording.session_id, session_id);
    assert_eq!(recording.sample_count, 8_000);
    assert_eq!(recording.sample_rate, RATE);
    assert_eq!(recording.duration, Duration::from_millis(500));
    assert_eq!(std::fs::read(&recording.path).unwrap(), recording.audio);
    assert_eq!(
        recording.path.extension().and_then(|e| e.to_str()),
        Some("wav")
    );
    assert_eq!(session.status(), SessionStatus::Complete);

    let (samples, rate) = decode_wav(&recording.audio).unwrap();
    assert_eq!(samples.len(), 8_000);
    assert_eq!(rate, RATE);
}

/// WHAT: The recording uses the rate the capture actually opened at
/// WHY: Devices may not honour the requested rate; duration must stay right
#[test]
#[allow(clippy::unwrap_used)]
fn given_device_rate_differs_when_stopping_then_actual_rate_used() {
    // Given: A source that opens at 48kHz while 16kHz was requested
    let dir = TempDir::new().unwrap();
    let source = Arc::new(ScriptedSource {
        chunks: vec![vec![0.0; 48_000]],
        actual_rate: Some(48_000),
        ..ScriptedSource::default()
    });
    let mut session = session(&source, Arc::new(WavEncoder::new()), &dir);
    session.start().unwrap();

    // When: Stopping
    let recording = session.stop().unwrap();

    // Then: One second at 48kHz
    assert_eq!(recording.sample_rate, 48_000);
    assert_eq!(recording.duration, Duration::from_secs(1));
}

/// WHAT: Chunks arriving after stop are not part of the recording
/// WHY: The buffer is sealed before the device is closed
#[test]
#[allow(clippy::unwrap_used)]
fn given_stopped_session_when_device_delivers_late_chunk_then_ignored() {
    // Given: A session stopped with one chunk
    let dir = TempDir::new().unwrap();
    let source = Arc::new(ScriptedSource::with_chunks(vec![vec![0.1; 160]]));
    let mut session = session(&source, Arc::new(WavEncoder::new()), &dir);
    session.start().unwrap();
    let recording = session.stop().unwrap();

    // When: The device pushes once more
    let accepted = source.sink().push(&[0.9; 160]);

    // Then: Refused; the recording kept only the original chunk
    assert!(!accepted);
    assert_eq!(recording.sample_count, 160);
    assert_eq!(session.buffer().total_samples(), 0);
}

/// WHAT: A failed open leaves the session stopped with nothing to close
/// WHY: Capture failures must not leave a half-open session
#[test]
#[allow(clippy::unwrap_used)]
fn given_source_fails_when_starting_then_capture_open_failed_and_not_capturing() {
    // Given: A source that refuses to open
    let dir = TempDir::new().unwrap();
    let source = Arc::new(ScriptedSource::failing());
    let mut session = session(&source, Arc::new(WavEncoder::new()), &dir);

    // When: Starting
    let result = session.start();

    // Then: The error surfaces and a following stop is NotRecording
    assert!(matches!(result, Err(CoreError::CaptureOpenFailed { .. })));
    assert_eq!(session.status(), SessionStatus::Failed);
    assert!(!session.is_capturing());
    assert!(matches!(
        session.stop(),
        Err(CoreError::NotRecording { .. })
    ));
}

/// WHAT: A capture that opens at 0 Hz is closed and refused
/// WHY: Recording length is derived from the rate and must never divide by zero
#[test]
#[allow(clippy::unwrap_used)]
fn given_source_reports_zero_rate_when_starting_then_capture_open_failed_and_closed() {
    // Given: A source that opens but reports 0 Hz
    let dir = TempDir::new().unwrap();
    let source = Arc::new(ScriptedSource {
        chunks: vec![vec![0.1; 160]],
        actual_rate: Some(0),
        ..ScriptedSource::default()
    });
    let mut session = session(&source, Arc::new(WavEncoder::new()), &dir);

    // When: Starting
    let result = session.start();

    // Then: Refused, device released, nothing to stop, nothing written
    assert!(matches!(result, Err(CoreError::CaptureOpenFailed { .. })));
    assert_eq!(source.opens(), 1);
    assert_eq!(source.closes(), 1);
    assert_eq!(session.status(), SessionStatus::Failed);
    assert!(!session.is_capturing());
    assert!(matches!(
        session.stop(),
        Err(CoreError::NotRecording { .. })
    ));
    assert!(!source.sink().push(&[0.5; 160]));
    assert_eq!(files_in(&dir), 0);
}

/// WHAT: An encoding failure marks the session failed and writes nothing
/// WHY: Partial files must never appear in the recordings directory
#[test]
#[allow(clippy::unwrap_used)]
fn given_encoder_fails_when_stopping_then_encoding_failed_and_no_file() {
    // Given: A session with audio and a failing encoder
    let dir = TempDir::new().unwrap();
    let source = Arc::new(ScriptedSource::with_chunks(vec![vec![0.1; 160]]));
    let mut session = session(&source, Arc::new(FailingEncoder), &dir);
    session.start().unwrap();

    // When: Stopping
    let result = session.stop();

    // Then: EncodingFailed, no file
    assert!(matches!(result, Err(CoreError::EncodingFailed { .. })));
    assert_eq!(session.status(), SessionStatus::Failed);
    assert_eq!(files_in(&dir), 0);
}

/// WHAT: The session can be reused and each run gets a fresh id and buffer
/// WHY: One session object serves every press of the trigger
#[test]
#[allow(clippy::unwrap_used)]
fn given_completed_session_when_restarted_then_new_id_and_fresh_buffer() {
    // Given: A completed session
    let dir = TempDir::new().unwrap();
    let source = Arc::new(ScriptedSource::with_chunks(vec![vec![0.1; 160]]));
    let mut session = session(&source, Arc::new(WavEncoder::new()), &dir);
    let first = session.start().unwrap();
    let first_recording = session.stop().unwrap();

    // When: Starting and stopping again
    let second = session.start().unwrap();
    let second_recording = session.stop().unwrap();

    // Then: Distinct ids and files, same length each time
    assert_ne!(first, second);
    assert_ne!(first_recording.path, second_recording.path);
    assert_eq!(second_recording.sample_count, 160);
    assert_eq!(files_in(&dir), 2);
}
