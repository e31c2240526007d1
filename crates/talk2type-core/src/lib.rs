//! Talk2type Core Library
//!
//! Push-to-talk dictation: a trigger state machine turns key events into
//! activate/deactivate intents, a recording session captures and saves the
//! audio, and a pipeline transcribes it and types the text.
//!
//! # Example
//!
//! ```no_run
//! use talk2type_core::{
//!     ActivationPolicy, Collaborators, CoreResult, KeyIdentity, NoopPresenter,
//!     OrchestratorConfig, SessionOrchestrator, TextInjector,
//!     audio::{CpalAudioSource, SttEngine, WavEncoder, WhisperSettings},
//! };
//!
//! use std::sync::Arc;
//!
//! struct Stdout;
//!
//! impl TextInjector for Stdout {
//!     fn inject(&self, text: &str) -> CoreResult<()> {
//!         println!("{}", text);
//!         Ok(())
//!     }
//! }
//!
//! #[tokio::main]
//! async fn main() -> CoreResult<()> {
//!     let engine = SttEngine::new("models/ggml-base.en.bin", WhisperSettings::default())?;
//!
//!     let config = OrchestratorConfig::new(
//!         KeyIdentity(1),
//!         ActivationPolicy::Immediate,
//!         "recordings",
//!     );
//!     let collaborators = Collaborators {
//!         source: Arc::new(CpalAudioSource::new()),
//!         encoder: Arc::new(WavEncoder::new()),
//!         transcriber: Arc::new(engine),
//!         injector: Arc::new(Stdout),
//!         presenter: Box::new(NoopPresenter),
//!     };
//!
//!     let (orchestrator, handle) = SessionOrchestrator::new(config, collaborators);
//!     let task = tokio::spawn(orchestrator.run());
//!
//!     // Feed handle.send_event(..) from a key listener, then:
//!     handle.shutdown().await?;
//!     let _stats = task.await;
//!     Ok(())
//! }
//! ```

pub mod audio;
mod error;
pub mod orchestrator;
pub mod ports;
pub mod session;
pub mod trigger;

pub use {
    error::{CoreError, Result as CoreResult},
    orchestrator::{
        Collaborators, OrchestratorCommand, OrchestratorConfig, OrchestratorHandle,
        OrchestratorStats, PipelineOutcome, PipelineReport, SessionOrchestrator,
    },
    ports::{
        AudioEncoder, AudioSource, CaptureHandle, CaptureRequest, IndicatorState, NoopPresenter,
        StatePresenter, TextInjector, Transcriber,
    },
    session::{FinalizedRecording, RecordingSession, RecordingStore, SessionStatus},
    trigger::{
        ActivationPolicy, Intent, IntentCounters, KeyIdentity, TriggerEvent, TriggerEventKind,
        TriggerState, TriggerStateMachine,
    },
};
