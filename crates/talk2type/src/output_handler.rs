//! Delivers transcribed text to the focused window.
//!
//! Text is copied to the clipboard and, when auto-paste is enabled, pasted
//! with a simulated Cmd/Ctrl+V.

use crate::{AppError, AppResult, paste_guard::PasteModifierGuard};

use std::{panic::Location, thread, time::Duration};

use arboard::Clipboard;
use enigo::Key;
use error_location::ErrorLocation;
use talk2type_core::{CoreError, CoreResult, TextInjector};
use tracing::{debug, info, instrument, warn};

/// Delay between clipboard write and paste simulation.
///
/// Gives the OS clipboard manager time to publish the write before the
/// paste reads it.
const CLIPBOARD_SETTLE_DELAY: Duration = Duration::from_millis(50);

/// Gap between key events; some applications and IMEs drop faster input.
const KEY_EVENT_DELAY: Duration = Duration::from_millis(10);

/// Clipboard plus optional auto-paste text injector.
///
/// Called from the pipeline's blocking task, so every step is synchronous.
/// A fresh `Clipboard` and `Enigo` are created per call: neither is `Send`
/// on every platform.
#[derive(Debug)]
pub struct OutputHandler {
    auto_paste: bool,
}

impl OutputHandler {
    /// Create a handler, checking that a clipboard is reachable.
    #[track_caller]
    #[instrument]
    pub fn new(auto_paste: bool) -> AppResult<Self> {
        open_clipboard()?;

        info!(auto_paste, "OutputHandler initialized");

        Ok(Self { auto_paste })
    }

    /// Whether text is pasted after being copied.
    pub fn auto_paste(&self) -> bool {
        self.auto_paste
    }

    /// Copy `text` to the clipboard and paste it if auto-paste is on.
    #[instrument(skip(self, text), fields(text_len = text.len()))]
    pub fn output_text(&self, text: &str) -> AppResult<()> {
        open_clipboard()?
            .set_text(text)
            .map_err(|e| AppError::ClipboardError {
                reason: format!("Failed to set clipboard: {}", e),
                location: ErrorLocation::from(Location::caller()),
            })?;

        debug!("Text copied to clipboard");

        if self.auto_paste {
            thread::sleep(CLIPBOARD_SETTLE_DELAY);

            if let Err(e) = paste() {
                warn!(error = %e, "Auto-paste failed, but text is in clipboard");
                return Err(e);
            }
        }

        info!(auto_pasted = self.auto_paste, "Text output complete");

        Ok(())
    }
}

impl TextInjector for OutputHandler {
    fn inject(&self, text: &str) -> CoreResult<()> {
        self.output_text(text)
            .map_err(|e| CoreError::InjectionFailed {
                reason: e.to_string(),
                location: ErrorLocation::from(Location::caller()),
            })
    }
}

#[track_caller]
fn open_clipboard() -> AppResult<Clipboard> {
    Clipboard::new().map_err(|e| AppError::ClipboardError {
        reason: format!("Failed to open clipboard: {}", e),
        location: ErrorLocation::from(Location::caller()),
    })
}

fn paste() -> AppResult<()> {
    // The guard releases the modifier even when the click fails.
    let mut guard = PasteModifierGuard::press()?;

    thread::sleep(KEY_EVENT_DELAY);
    guard.click(Key::Unicode('v'))?;
    thread::sleep(KEY_EVENT_DELAY);

    debug!("Auto-paste simulated");

    Ok(())
}
