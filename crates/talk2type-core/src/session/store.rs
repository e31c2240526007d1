use crate::{CoreError, CoreResult};

use std::{
    fs::{self, OpenOptions},
    io::{self, ErrorKind, Write},
    panic::Location,
    path::{Path, PathBuf},
};

use chrono::{DateTime, Utc};
use error_location::ErrorLocation;
use tracing::{debug, info, instrument, warn};

/// Upper bound on `-N` suffixes tried for one timestamp.
const MAX_COLLISION_SUFFIX: u32 = 1_000;

/// Writes finalized recordings into one directory.
///
/// Files are named after the UTC capture time with millisecond precision,
/// e.g. `2026-10-19T09-15-02-123Z.wav`. Two captures in the same
/// millisecond get `-1`, `-2`, ... suffixes. Files are created with
/// `create_new`, so an existing recording is never overwritten.
#[derive(Debug, Clone)]
pub struct RecordingStore {
    dir: PathBuf,
    extension: String,
}

impl RecordingStore {
    /// Store recordings with `extension` under `dir`. The directory is
    /// created on first write.
    pub fn new(dir: impl Into<PathBuf>, extension: impl Into<String>) -> Self {
        Self {
            dir: dir.into(),
            extension: extension.into(),
        }
    }

    /// Directory recordings are written to.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Base file name (without suffix or extension) for a capture time.
    pub fn file_stem(captured_at: DateTime<Utc>) -> String {
        captured_at.format("%Y-%m-%dT%H-%M-%S-%3fZ").to_string()
    }

    /// Write `bytes` to a fresh file named after `captured_at`.
    #[track_caller]
    #[instrument(skip(self, bytes), fields(dir = ?self.dir, len = bytes.len()))]
    pub fn persist(&self, bytes: &[u8], captured_at: DateTime<Utc>) -> CoreResult<PathBuf> {
        fs::create_dir_all(&self.dir).map_err(|source| CoreError::PersistenceFailed {
            path: self.dir.clone(),
            source,
            location: ErrorLocation::from(Location::caller()),
        })?;

        let stem = Self::file_stem(captured_at);

        for attempt in 0..=MAX_COLLISION_SUFFIX {
            let path = self.candidate(&stem, attempt);

            let mut file = match OpenOptions::new().write(true).create_new(true).open(&path) {
                Ok(file) => file,
                Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                    debug!(path = ?path, "Recording name taken, trying next suffix");
                    continue;
                }
                Err(source) => {
                    return Err(CoreError::PersistenceFailed {
                        path,
                        source,
                        location: ErrorLocation::from(Location::caller()),
                    });
                }
            };

            let written = file.write_all(bytes).and_then(|()| file.sync_all());
            drop(file);
            discard_partial(&path, written)?;

            info!(path = ?path, "Recording saved");
            return Ok(path);
        }

        Err(CoreError::PersistenceFailed {
            path: self.candidate(&stem, MAX_COLLISION_SUFFIX),
            source: io::Error::new(
                ErrorKind::AlreadyExists,
                "every collision suffix is already taken",
            ),
            location: ErrorLocation::from(Location::caller()),
        })
    }

    fn candidate(&self, stem: &str, attempt: u32) -> PathBuf {
        let name = if attempt == 0 {
            format!("{}.{}", stem, self.extension)
        } else {
            format!("{}-{}.{}", stem, attempt, self.extension)
        };
        self.dir.join(name)
    }
}

/// Remove `path` if writing it failed, so no truncated recording is left.
#[track_caller]
pub(crate) fn discard_partial(path: &Path, written: io::Result<()>) -> CoreResult<()> {
    let Err(source) = written else {
        return Ok(());
    };

    if let Err(e) = fs::remove_file(path) {
        warn!(path = ?path, error = %e, "Failed to remove partially written recording");
    }

    Err(CoreError::PersistenceFailed {
        path: path.to_path_buf(),
        source,
        location: ErrorLocation::from(Location::caller()),
    })
}
