mod command;
mod handle;
#[allow(clippy::module_inception)]
mod orchestrator;
pub(crate) mod pipeline;
mod report;

pub use {
    command::OrchestratorCommand,
    handle::OrchestratorHandle,
    orchestrator::{
        Collaborators, DEFAULT_SHUTDOWN_GRACE, OrchestratorConfig, OrchestratorStats,
        SessionOrchestrator,
    },
    report::{PipelineOutcome, PipelineReport},
};
