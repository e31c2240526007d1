use crate::TrayCommand;

use talk2type_core::{IndicatorState, StatePresenter};
use tao::event_loop::EventLoopProxy;
use tracing::debug;

/// Forwards indicator changes to the tray on the main thread.
pub struct TrayPresenter {
    proxy: EventLoopProxy<TrayCommand>,
}

impl TrayPresenter {
    /// Presenter posting to `proxy`'s event loop.
    pub fn new(proxy: EventLoopProxy<TrayCommand>) -> Self {
        Self { proxy }
    }
}

impl StatePresenter for TrayPresenter {
    fn present(&self, state: IndicatorState) {
        // Fails only once the event loop has exited.
        if self.proxy.send_event(TrayCommand::SetState(state)).is_err() {
            debug!(%state, "Tray event loop closed, indicator update dropped");
        }
    }
}
