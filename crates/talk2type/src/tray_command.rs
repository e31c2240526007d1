use talk2type_core::IndicatorState;

/// Commands sent from the async runtime to the main UI thread.
///
/// The main thread owns `TrayManager` (because `TrayIcon` is `!Send`),
/// so all tray mutations and process lifecycle events flow through this enum.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrayCommand {
    /// Show a new indicator state.
    SetState(IndicatorState),
    /// Shut down the application. The main thread will exit the event loop.
    Shutdown,
}
