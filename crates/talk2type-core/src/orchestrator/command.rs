use crate::trigger::TriggerEvent;

/// Commands sent from the event source to the orchestrator loop.
#[derive(Debug, Clone)]
pub enum OrchestratorCommand {
    /// A hardware transition for the trigger state machine.
    Trigger(TriggerEvent),
    /// Finalize any active recording, drain pipelines and stop.
    Shutdown,
}
