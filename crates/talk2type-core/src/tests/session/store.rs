use crate::{
    CoreError,
    session::{RecordingStore, discard_partial},
};

use std::io;

use chrono::{TimeZone, Utc};
use tempfile::TempDir;

/// WHAT: File names carry the UTC capture time with millisecond precision
/// WHY: Recordings sort chronologically and are easy to find by time
#[test]
#[allow(clippy::unwrap_used)]
fn given_capture_time_when_naming_then_millisecond_utc_stem() {
    // Given: A capture time with milliseconds
    let captured_at = Utc
        .with_ymd_and_hms(2026, 10, 19, 9, 15, 2)
        .unwrap()
        .checked_add_signed(chrono::Duration::milliseconds(123))
        .unwrap();

    // When: Deriving the stem
    let stem = RecordingStore::file_stem(captured_at);

    // Then: Colons are replaced and milliseconds kept
    assert_eq!(stem, "2026-10-19T09-15-02-123Z");
}

/// WHAT: Persist creates the directory and writes the bytes
/// WHY: First run must work without a pre-existing recordings folder
#[test]
#[allow(clippy::unwrap_used)]
fn given_missing_directory_when_persisting_then_created_and_written() {
    // Given: A store pointing at a directory that does not exist yet
    let root = TempDir::new().unwrap();
    let dir = root.path().join("nested").join("recordings");
    let store = RecordingStore::new(&dir, "wav");

    // When: Persisting
    let path = store.persist(b"RIFF", Utc::now()).unwrap();

    // Then: The file is inside the new directory with the given contents
    assert!(path.starts_with(&dir));
    assert_eq!(std::fs::read(&path).unwrap(), b"RIFF");
}

/// WHAT: Same-millisecond captures get numbered suffixes instead of overwriting
/// WHY: No recording may ever be overwritten
#[test]
#[allow(clippy::unwrap_used)]
fn given_same_timestamp_when_persisting_twice_then_suffixed_and_both_kept() {
    // Given: A store and one fixed capture time
    let dir = TempDir::new().unwrap();
    let store = RecordingStore::new(dir.path(), "wav");
    let captured_at = Utc.with_ymd_and_hms(2026, 1, 2, 3, 4, 5).unwrap();

    // When: Persisting three recordings with the same time
    let first = store.persist(b"one", captured_at).unwrap();
    let second = store.persist(b"two", captured_at).unwrap();
    let third = store.persist(b"three", captured_at).unwrap();

    // Then: Distinct names, original contents preserved
    let name = |p: &std::path::Path| p.file_name().unwrap().to_string_lossy().into_owned();
    assert_eq!(name(&first), "2026-01-02T03-04-05-000Z.wav");
    assert_eq!(name(&second), "2026-01-02T03-04-05-000Z-1.wav");
    assert_eq!(name(&third), "2026-01-02T03-04-05-000Z-2.wav");
    assert_eq!(std::fs::read(&first).unwrap(), b"one");
    assert_eq!(std::fs::read(&second).unwrap(), b"two");
}

/// WHAT: An unwritable target surfaces PersistenceFailed
/// WHY: Disk errors must abort the session rather than lose audio silently
#[test]
#[allow(clippy::unwrap_used)]
fn given_directory_path_is_a_file_when_persisting_then_persistence_failed() {
    // Given: The configured directory is actually a regular file
    let root = TempDir::new().unwrap();
    let blocker = root.path().join("not-a-dir");
    std::fs::write(&blocker, b"x").unwrap();
    let store = RecordingStore::new(&blocker, "wav");

    // When: Persisting
    let result = store.persist(b"RIFF", Utc::now());

    // Then: PersistenceFailed
    assert!(matches!(
        result,
        Err(CoreError::PersistenceFailed { .. })
    ));
}

/// WHAT: A write that fails midway removes the partial file
/// WHY: A truncated recording must not be left behind for manual retry
#[test]
#[allow(clippy::unwrap_used)]
#[allow(clippy::panic)]
fn given_partial_write_when_write_fails_then_file_removed_and_persistence_failed() {
    // Given: A half-written recording on disk
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("2026-10-19T09-15-02-123Z.wav");
    std::fs::write(&path, b"RIF").unwrap();

    // When: The write reports a failure
    let result = discard_partial(&path, Err(io::Error::other("disk full")));

    // Then: PersistenceFailed naming the file, and the file is gone
    match result {
        Err(CoreError::PersistenceFailed { path: failed, .. }) => assert_eq!(failed, path),
        other => panic!("Expected PersistenceFailed, got {:?}", other),
    }
    assert!(!path.exists());
}

/// WHAT: A successful write keeps the file
/// WHY: Only failed writes are cleaned up
#[test]
#[allow(clippy::unwrap_used)]
fn given_complete_write_when_checked_then_file_kept() {
    // Given: A fully written recording
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("2026-10-19T09-15-02-123Z.wav");
    std::fs::write(&path, b"RIFF").unwrap();

    // When: The write succeeded
    let result = discard_partial(&path, Ok(()));

    // Then: Ok and the file stays
    assert!(result.is_ok());
    assert_eq!(std::fs::read(&path).unwrap(), b"RIFF");
}
