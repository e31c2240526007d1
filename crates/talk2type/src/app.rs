use crate::{AppResult, TrayCommand};

use std::{fs, path::{Path, PathBuf}, time::Duration};

use talk2type_core::{OrchestratorHandle, SessionOrchestrator};
use tao::event_loop::EventLoopProxy;
use tokio::sync::{mpsc, watch};
use tracing::{error, info, instrument, warn};
use tray_icon::menu::{MenuEvent, MenuId};

/// Async side of the application.
///
/// Runs on the tokio runtime thread. Owns the orchestrator task and the tray
/// menu forwarder; tray icon mutations go back to the main thread through
/// `tray_proxy` because `TrayIcon` is `!Send`.
pub struct App {
    pub(crate) orchestrator: SessionOrchestrator,
    pub(crate) orchestrator_handle: OrchestratorHandle,
    pub(crate) tray_proxy: EventLoopProxy<TrayCommand>,
    pub(crate) shutdown_tx: watch::Sender<bool>,
    pub(crate) recordings_dir: PathBuf,
    pub(crate) recordings_menu_id: MenuId,
    pub(crate) exit_menu_id: MenuId,
}

impl App {
    /// Run until the orchestrator stops, then stop the hotkey handler and
    /// the UI thread.
    #[instrument(skip(self))]
    pub(crate) async fn run(self) -> AppResult<()> {
        let App {
            orchestrator,
            orchestrator_handle,
            tray_proxy,
            shutdown_tx,
            recordings_dir,
            recordings_menu_id,
            exit_menu_id,
        } = self;

        info!(recordings_dir = ?recordings_dir, "Talk2Type starting");

        // MenuEvent::receiver() is a blocking crossbeam receiver. When
        // tray_event_rx is dropped the next blocking_send() fails and the
        // forwarder exits.
        let (tray_event_tx, mut tray_event_rx) = mpsc::channel(32);
        let tray_handle = tokio::task::spawn_blocking(move || {
            let receiver = MenuEvent::receiver();
            while let Ok(event) = receiver.recv() {
                if tray_event_tx.blocking_send(event).is_err() {
                    break;
                }
            }
        });

        let mut orchestrator_task = tokio::spawn(orchestrator.run());

        let outcome = loop {
            tokio::select! {
                outcome = &mut orchestrator_task => break outcome,

                Some(event) = tray_event_rx.recv() => {
                    if event.id == recordings_menu_id {
                        if let Err(e) = open_recordings(&recordings_dir) {
                            error!(error = ?e, "Failed to open recordings folder");
                        }
                    } else if event.id == exit_menu_id {
                        info!("Exit requested from tray menu");
                        if let Err(e) = orchestrator_handle.shutdown().await {
                            warn!(error = %e, "Orchestrator already stopped");
                        }
                    }
                }
            }
        };

        match outcome {
            Ok(stats) => info!(stats = ?stats, "Orchestrator stopped"),
            Err(e) => error!(error = ?e, "Orchestrator task panicked"),
        }

        drop(tray_event_rx);

        match tokio::time::timeout(Duration::from_secs(1), tray_handle).await {
            Ok(Ok(())) => info!("Tray event forwarder stopped cleanly"),
            Ok(Err(e)) => error!(error = ?e, "Tray event forwarder task panicked"),
            Err(_) => info!(
                "Tray event forwarder did not stop within timeout, \
                     will be cleaned up on exit"
            ),
        }

        let _ = shutdown_tx.send(true);
        let _ = tray_proxy.send_event(TrayCommand::Shutdown);
        info!("Talk2Type shut down successfully");

        Ok(())
    }
}

/// Open the recordings folder in the platform file manager.
#[track_caller]
pub(crate) fn open_recordings(dir: &Path) -> AppResult<()> {
    fs::create_dir_all(dir)?;
    open::that(dir)?;
    info!(dir = ?dir, "Opened recordings folder");
    Ok(())
}
