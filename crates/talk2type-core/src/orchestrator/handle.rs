use crate::{CoreError, CoreResult, orchestrator::OrchestratorCommand, trigger::TriggerEvent};

use std::panic::Location;

use error_location::ErrorLocation;
use tokio::sync::mpsc;

/// Cloneable sender side of the orchestrator's command channel.
#[derive(Debug, Clone)]
pub struct OrchestratorHandle {
    command_tx: mpsc::Sender<OrchestratorCommand>,
}

impl OrchestratorHandle {
    pub(crate) fn new(command_tx: mpsc::Sender<OrchestratorCommand>) -> Self {
        Self { command_tx }
    }

    /// Deliver a trigger event.
    pub async fn send_event(&self, event: TriggerEvent) -> CoreResult<()> {
        self.command_tx
            .send(OrchestratorCommand::Trigger(event))
            .await
            .map_err(|e| CoreError::ChannelSendFailed {
                message: format!("Failed to send trigger event: {}", e),
                location: ErrorLocation::from(Location::caller()),
            })
    }

    /// Ask the orchestrator to finalize and stop.
    pub async fn shutdown(&self) -> CoreResult<()> {
        self.command_tx
            .send(OrchestratorCommand::Shutdown)
            .await
            .map_err(|e| CoreError::ChannelSendFailed {
                message: format!("Failed to send shutdown: {}", e),
                location: ErrorLocation::from(Location::caller()),
            })
    }
}
