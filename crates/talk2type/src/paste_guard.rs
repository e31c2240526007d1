use crate::{AppError, AppResult};

use std::panic::Location;

use enigo::{Direction, Enigo, Key, Keyboard, Settings};
use error_location::ErrorLocation;

/// Cmd on macOS, Ctrl elsewhere.
fn paste_modifier() -> Key {
    #[cfg(target_os = "macos")]
    {
        Key::Meta
    }
    #[cfg(not(target_os = "macos"))]
    {
        Key::Control
    }
}

/// Holds the paste modifier down and releases it on drop.
///
/// Owns the `Enigo` instance so every key sent while the modifier is held
/// goes through the same connection. Release on drop is best-effort: the OS
/// resets modifier state on the next physical key press anyway.
pub struct PasteModifierGuard {
    enigo: Enigo,
    modifier: Key,
}

impl PasteModifierGuard {
    /// Press the paste modifier.
    #[track_caller]
    pub(crate) fn press() -> AppResult<Self> {
        let modifier = paste_modifier();

        let mut enigo =
            Enigo::new(&Settings::default()).map_err(|e| AppError::AutoPasteFailed {
                reason: format!("Failed to create Enigo: {}", e),
                location: ErrorLocation::from(Location::caller()),
            })?;

        enigo
            .key(modifier, Direction::Press)
            .map_err(|e| AppError::AutoPasteFailed {
                reason: format!("Failed to press paste modifier: {}", e),
                location: ErrorLocation::from(Location::caller()),
            })?;

        Ok(Self { enigo, modifier })
    }

    /// Click `key` while the modifier is held.
    #[track_caller]
    pub(crate) fn click(&mut self, key: Key) -> AppResult<()> {
        self.enigo
            .key(key, Direction::Click)
            .map_err(|e| AppError::AutoPasteFailed {
                reason: format!("Failed to click {:?}: {}", key, e),
                location: ErrorLocation::from(Location::caller()),
            })
    }
}

impl Drop for PasteModifierGuard {
    fn drop(&mut self) {
        let _ = self.enigo.key(self.modifier, Direction::Release);
    }
}
