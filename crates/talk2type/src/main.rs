//! Talk2Type: hold or toggle a key to dictate into any application.

mod app;
mod config;
mod error;
mod hotkey_handler;
mod output_handler;
mod paste_guard;
mod telemetry;
mod tray_command;
mod tray_manager;
mod tray_presenter;

pub(crate) use {
    app::App,
    error::{AppError, Result as AppResult},
    hotkey_handler::HotkeyHandler,
    output_handler::OutputHandler,
    tray_command::TrayCommand,
    tray_manager::TrayManager,
    tray_presenter::TrayPresenter,
};

use crate::config::{Config, LoggingConfig};

use std::sync::Arc;

use global_hotkey::GlobalHotKeyManager;
use talk2type_core::{
    Collaborators, SessionOrchestrator,
    audio::{CpalAudioSource, SttEngine, WavEncoder},
};
use tao::{
    event::Event,
    event_loop::{ControlFlow, EventLoopBuilder},
};
use tokio::sync::watch;
use tracing::{error, info};

/// Application entry point.
fn main() {
    let config = match Config::load() {
        Ok(c) => c,
        Err(e) => {
            let _guard = telemetry::init(&LoggingConfig::default());
            error!("Failed to load config: {:?}", e);
            std::process::exit(1);
        }
    };

    let log_guard = match telemetry::init(&config.logging) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("Failed to initialise logging: {}", e);
            std::process::exit(1);
        }
    };

    if let Err(e) = config.validate_model_path() {
        error!("Model validation failed: {:?}", e);
        std::process::exit(1);
    }

    let engine = match SttEngine::new(&config.whisper.model_path, config.whisper.settings()) {
        Ok(engine) => Arc::new(engine),
        Err(e) => {
            error!("Failed to load Whisper model: {:?}", e);
            std::process::exit(1);
        }
    };

    let output_handler = match OutputHandler::new(config.behavior.auto_paste) {
        Ok(oh) => Arc::new(oh),
        Err(e) => {
            error!("Failed to create OutputHandler: {:?}", e);
            std::process::exit(1);
        }
    };

    let event_loop = EventLoopBuilder::<TrayCommand>::with_user_event().build();
    let tray_proxy = event_loop.create_proxy();

    // TrayManager lives on the main thread - TrayIcon is !Send on all platforms.
    let mut tray_manager = match TrayManager::new() {
        Ok(tm) => tm,
        Err(e) => {
            error!("Failed to create TrayManager: {:?}", e);
            std::process::exit(1);
        }
    };

    // Dropping it unregisters the hotkey.
    let mut hotkey_manager: Option<GlobalHotKeyManager> = None;
    let mut startup = Some((config, engine, output_handler));

    event_loop.run(move |event, _, control_flow| {
        *control_flow = ControlFlow::Wait;

        match event {
            Event::UserEvent(cmd) => {
                match cmd {
                    TrayCommand::SetState(state) => {
                        if let Err(e) = tray_manager.update_state(state) {
                            error!(error = ?e, "Failed to update tray icon");
                        }
                    }
                    TrayCommand::Shutdown => {
                        *control_flow = ControlFlow::ExitWithCode(0);
                    }
                }
                return;
            }
            Event::NewEvents(tao::event::StartCause::Init) => {
                let Some((config, engine, output_handler)) = startup.take() else {
                    return;
                };

                #[cfg(target_os = "macos")]
                unsafe {
                    use core_foundation::runloop::{CFRunLoopGetMain, CFRunLoopWakeUp};
                    CFRunLoopWakeUp(CFRunLoopGetMain());
                }

                // Register on the main thread: tao's event loop pumps the
                // Windows messages needed for WM_HOTKEY delivery.
                let (manager, identity) =
                    match hotkey_handler::register_hotkey(&config.trigger.hotkey) {
                        Ok(pair) => pair,
                        Err(e) => {
                            error!("Failed to register hotkey: {:?}", e);
                            std::process::exit(1);
                        }
                    };
                hotkey_manager = Some(manager);

                let orchestrator_config = match config.orchestrator_config(identity) {
                    Ok(c) => c,
                    Err(e) => {
                        error!("Failed to resolve recordings directory: {:?}", e);
                        std::process::exit(1);
                    }
                };
                let recordings_dir = orchestrator_config.recordings_dir.clone();

                let collaborators = Collaborators {
                    source: Arc::new(CpalAudioSource::new()),
                    encoder: Arc::new(WavEncoder::new()),
                    transcriber: engine,
                    injector: output_handler,
                    presenter: Box::new(TrayPresenter::new(tray_proxy.clone())),
                };
                let (orchestrator, orchestrator_handle) =
                    SessionOrchestrator::new(orchestrator_config, collaborators);

                info!(
                    hotkey = %config.trigger.hotkey,
                    policy = ?config.trigger.policy,
                    "Trigger configured"
                );

                let (shutdown_tx, shutdown_rx) = watch::channel(false);
                let hotkey_handler = HotkeyHandler::new(
                    identity,
                    config.trigger.policy,
                    orchestrator_handle.clone(),
                );

                let app = App {
                    orchestrator,
                    orchestrator_handle,
                    tray_proxy: tray_proxy.clone(),
                    shutdown_tx,
                    recordings_dir,
                    recordings_menu_id: tray_manager.recordings_item_id().clone(),
                    exit_menu_id: tray_manager.exit_item_id().clone(),
                };

                // TrayManager and hotkey_manager stay on the main thread.
                std::thread::spawn(move || {
                    let rt = match tokio::runtime::Runtime::new() {
                        Ok(rt) => rt,
                        Err(e) => {
                            error!("Failed to create tokio runtime: {:?}", e);
                            std::process::exit(1);
                        }
                    };

                    rt.block_on(async {
                        tokio::join!(
                            async {
                                if let Err(e) = hotkey_handler.run(shutdown_rx).await {
                                    error!(error = ?e, "Hotkey handler error");
                                }
                            },
                            async {
                                if let Err(e) = app.run().await {
                                    error!(error = ?e, "App error");
                                }
                            }
                        );
                    });
                });
            }
            _ => {}
        }

        // Keep the hotkey registration and log writer alive for the app's lifetime.
        let _ = (&hotkey_manager, &log_guard);
    });
}
