//! Global hotkey registration and event forwarding.
//!
//! Registers the configured hotkey on the main thread and turns its
//! pressed/released notifications into trigger events for the orchestrator.

use crate::{AppError, AppResult, config::TriggerPolicy};

use std::{panic::Location, str::FromStr, time::Duration};

use error_location::ErrorLocation;
use global_hotkey::{GlobalHotKeyEvent, GlobalHotKeyManager, HotKeyState, hotkey::HotKey};
use talk2type_core::{KeyIdentity, OrchestratorHandle, TriggerEvent, TriggerEventKind};
use tokio::sync::{mpsc, watch};
use tracing::{debug, info, instrument, warn};

const FORWARD_CHANNEL_CAPACITY: usize = 32;

/// Parse a hotkey string such as `CapsLock` or `ctrl+shift+Space`.
#[track_caller]
pub fn parse_hotkey(hotkey: &str) -> AppResult<HotKey> {
    HotKey::from_str(hotkey).map_err(|e| AppError::InvalidHotkey {
        hotkey: hotkey.to_string(),
        reason: e.to_string(),
        location: ErrorLocation::from(Location::caller()),
    })
}

/// Register `hotkey` as the global hotkey.
///
/// Must be called on a thread with a message pump (e.g. the main thread
/// running a `tao` event loop) so that `WM_HOTKEY` messages are dispatched
/// on Windows. The returned [`GlobalHotKeyManager`] must be kept alive on
/// that thread for the hotkey to remain registered.
#[track_caller]
#[instrument]
pub fn register_hotkey(hotkey: &str) -> AppResult<(GlobalHotKeyManager, KeyIdentity)> {
    let parsed = parse_hotkey(hotkey)?;

    let manager = GlobalHotKeyManager::new().map_err(|e| AppError::HotkeyRegistrationFailed {
        reason: format!("Failed to create manager: {}", e),
        location: ErrorLocation::from(Location::caller()),
    })?;

    manager
        .register(parsed)
        .map_err(|e| AppError::HotkeyRegistrationFailed {
            reason: format!("Failed to register {}: {}", hotkey, e),
            location: ErrorLocation::from(Location::caller()),
        })?;

    info!(hotkey, id = parsed.id(), "Global hotkey registered");

    Ok((manager, KeyIdentity(parsed.id())))
}

/// Turns hotkey pressed/released notifications into trigger events.
///
/// The OS reports a registered hotkey as pressed and released, never as a
/// latched level. Under the immediate policy each press flips a latch that
/// stands in for the modifier level; under the hold policy presses and
/// releases map to key down and key up. Auto-repeat presses are dropped.
#[derive(Debug)]
pub(crate) struct EventTranslator {
    identity: KeyIdentity,
    policy: TriggerPolicy,
    key_down: bool,
    latched: bool,
}

impl EventTranslator {
    pub(crate) fn new(identity: KeyIdentity, policy: TriggerPolicy) -> Self {
        Self {
            identity,
            policy,
            key_down: false,
            latched: false,
        }
    }

    /// Event for one notification observed at `at`, if it changes anything.
    pub(crate) fn translate(
        &mut self,
        state: HotKeyState,
        at: std::time::Instant,
    ) -> Option<TriggerEvent> {
        let kind = match (state, self.key_down) {
            (HotKeyState::Pressed, true) => return None,
            (HotKeyState::Released, false) => return None,
            (HotKeyState::Pressed, false) => {
                self.key_down = true;
                match self.policy {
                    TriggerPolicy::Immediate => {
                        self.latched = !self.latched;
                        TriggerEventKind::ModifierChanged { on: self.latched }
                    }
                    TriggerPolicy::Hold => TriggerEventKind::KeyDown,
                }
            }
            (HotKeyState::Released, true) => {
                self.key_down = false;
                match self.policy {
                    TriggerPolicy::Immediate => return None,
                    TriggerPolicy::Hold => TriggerEventKind::KeyUp,
                }
            }
        };

        Some(TriggerEvent::new(kind, self.identity, at))
    }
}

/// Forwards the registered hotkey's events to the orchestrator.
pub struct HotkeyHandler {
    translator: EventTranslator,
    orchestrator: OrchestratorHandle,
}

impl HotkeyHandler {
    /// Create a handler for a previously registered hotkey.
    ///
    /// The `identity` should come from [`register_hotkey`]. This struct is
    /// `Send` and can live on any thread. It only listens on the global
    /// [`GlobalHotKeyEvent`] channel.
    pub fn new(identity: KeyIdentity, policy: TriggerPolicy, orchestrator: OrchestratorHandle) -> Self {
        Self {
            translator: EventTranslator::new(identity, policy),
            orchestrator,
        }
    }

    /// Run until shutdown is signalled or the orchestrator stops listening.
    #[instrument(skip(self, shutdown_rx))]
    pub async fn run(mut self, mut shutdown_rx: watch::Receiver<bool>) -> AppResult<()> {
        let receiver = GlobalHotKeyEvent::receiver().clone();
        let (event_tx, mut event_rx) = mpsc::channel(FORWARD_CHANNEL_CAPACITY);

        // GlobalHotKeyEvent::receiver() is a blocking crossbeam receiver.
        // The stamp only feeds the debounce check. Hold time is measured by
        // the orchestrator's timer from when it handles the key down.
        let forwarder = tokio::task::spawn_blocking(move || {
            while let Ok(event) = receiver.recv() {
                if event_tx
                    .blocking_send((event, std::time::Instant::now()))
                    .is_err()
                {
                    break;
                }
            }
        });

        let identity = self.translator.identity;
        let result = loop {
            tokio::select! {
                _ = shutdown_rx.changed() => {
                    info!("Hotkey handler shutting down");
                    break Ok(());
                }
                Some((event, at)) = event_rx.recv() => {
                    if KeyIdentity(event.id) != identity {
                        continue;
                    }
                    let Some(trigger) = self.translator.translate(event.state, at) else {
                        continue;
                    };
                    debug!(kind = ?trigger.kind, "Hotkey event");
                    if let Err(e) = self.orchestrator.send_event(trigger).await {
                        warn!(error = %e, "Orchestrator stopped receiving hotkey events");
                        break Err(AppError::from(e));
                    }
                }
            }
        };

        // Dropping event_rx unblocks the forwarder's next blocking_send().
        drop(event_rx);

        // The forwarder may be parked in recv() until the next hotkey event.
        match tokio::time::timeout(Duration::from_secs(1), forwarder).await {
            Ok(Ok(())) => debug!("Hotkey event forwarder stopped cleanly"),
            Ok(Err(e)) => warn!(error = ?e, "Hotkey event forwarder task panicked"),
            Err(_) => debug!(
                "Hotkey event forwarder did not stop within timeout, \
                   will be cleaned up on exit"
            ),
        }

        result
    }
}
