//! Binds trigger intents to the recording session and dispatches finished
//! recordings to transcription.

use crate::{
    CoreError,
    orchestrator::{
        OrchestratorCommand, OrchestratorHandle, PipelineOutcome, PipelineReport,
        pipeline::run_pipeline,
    },
    ports::{AudioEncoder, AudioSource, IndicatorState, StatePresenter, TextInjector, Transcriber},
    session::{DEFAULT_SAMPLE_RATE, RecordingSession, RecordingStore},
    trigger::{ActivationPolicy, Intent, IntentCounters, KeyIdentity, TimerFired, TriggerStateMachine},
};

use std::{
    collections::HashMap,
    path::PathBuf,
    sync::Arc,
    time::{Duration, Instant},
};

use tokio::{
    runtime::{Handle, RuntimeFlavor},
    sync::mpsc,
    task::{Id as TaskId, JoinError, JoinSet},
};
use tracing::{debug, error, info, instrument, warn};
use uuid::Uuid;

/// Capacity of the command channel between event source and orchestrator.
const COMMAND_CHANNEL_CAPACITY: usize = 32;

/// Default time to let in-flight transcriptions finish on shutdown.
pub const DEFAULT_SHUTDOWN_GRACE: Duration = Duration::from_secs(10);

/// Static settings for one orchestrator.
#[derive(Debug, Clone)]
pub struct OrchestratorConfig {
    /// The only key whose events are acted upon.
    pub identity: KeyIdentity,
    /// How presses become activations.
    pub policy: ActivationPolicy,
    /// Minimum gap between a deactivation and the next immediate activation.
    pub debounce: Duration,
    /// Requested capture rate.
    pub sample_rate: u32,
    /// Where finalized recordings are saved.
    pub recordings_dir: PathBuf,
    /// How long shutdown waits for in-flight transcriptions.
    pub shutdown_grace: Duration,
}

impl OrchestratorConfig {
    /// Defaults for everything but the key, policy and output directory.
    pub fn new(
        identity: KeyIdentity,
        policy: ActivationPolicy,
        recordings_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            identity,
            policy,
            debounce: Duration::ZERO,
            sample_rate: DEFAULT_SAMPLE_RATE,
            recordings_dir: recordings_dir.into(),
            shutdown_grace: DEFAULT_SHUTDOWN_GRACE,
        }
    }
}

/// External collaborators driven by the orchestrator.
pub struct Collaborators {
    /// Microphone.
    pub source: Arc<dyn AudioSource>,
    /// Persisted audio format.
    pub encoder: Arc<dyn AudioEncoder>,
    /// Speech-to-text backend.
    pub transcriber: Arc<dyn Transcriber>,
    /// Delivers text to the focused application.
    pub injector: Arc<dyn TextInjector>,
    /// Visual indicator.
    pub presenter: Box<dyn StatePresenter>,
}

/// Totals returned when the orchestrator stops.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OrchestratorStats {
    /// Intents emitted by the trigger state machine.
    pub intents: IntentCounters,
    /// Sessions whose capture opened.
    pub sessions_started: u64,
    /// Activations whose capture failed to open.
    pub start_failures: u64,
    /// Recordings encoded and saved.
    pub recordings_finalized: u64,
    /// Deactivations that produced no recording (no audio, encode or write failure).
    pub stop_failures: u64,
    /// Pipelines that transcribed (and injected, if there was text).
    pub pipelines_succeeded: u64,
    /// Pipelines that failed to transcribe or inject.
    pub pipelines_failed: u64,
    /// Pipelines cancelled on shutdown or lost to a panic.
    pub pipelines_aborted: u64,
}

struct InFlight {
    session_id: Uuid,
    path: PathBuf,
    duration: Duration,
    dispatched_at: Instant,
}

/// Owns the trigger state machine, the recording session and the
/// transcription tasks.
///
/// Every state change happens inside [`SessionOrchestrator::run`]: trigger
/// events, hold-timer fires and finished pipelines all arrive there as
/// messages. Transcription runs on separate tasks, so a new session can
/// start while earlier recordings are still being transcribed.
pub struct SessionOrchestrator {
    machine: TriggerStateMachine,
    session: RecordingSession,
    transcriber: Arc<dyn Transcriber>,
    injector: Arc<dyn TextInjector>,
    presenter: Box<dyn StatePresenter>,
    indicator: IndicatorState,
    command_rx: mpsc::Receiver<OrchestratorCommand>,
    timer_rx: mpsc::UnboundedReceiver<TimerFired>,
    pipelines: JoinSet<PipelineReport>,
    in_flight: HashMap<TaskId, InFlight>,
    report_tx: Option<mpsc::UnboundedSender<PipelineReport>>,
    shutdown_grace: Duration,
    stats: OrchestratorStats,
}

impl SessionOrchestrator {
    /// Build an orchestrator and the handle used to feed it events.
    pub fn new(config: OrchestratorConfig, collaborators: Collaborators) -> (Self, OrchestratorHandle) {
        let (command_tx, command_rx) = mpsc::channel(COMMAND_CHANNEL_CAPACITY);
        let (timer_tx, timer_rx) = mpsc::unbounded_channel();

        let Collaborators {
            source,
            encoder,
            transcriber,
            injector,
            presenter,
        } = collaborators;

        let store = RecordingStore::new(config.recordings_dir, encoder.extension());
        let session = RecordingSession::new(source, encoder, store, config.sample_rate);
        let machine =
            TriggerStateMachine::new(config.identity, config.policy, config.debounce, timer_tx);

        let orchestrator = Self {
            machine,
            session,
            transcriber,
            injector,
            presenter,
            indicator: IndicatorState::Idle,
            command_rx,
            timer_rx,
            pipelines: JoinSet::new(),
            in_flight: HashMap::new(),
            report_tx: None,
            shutdown_grace: config.shutdown_grace,
            stats: OrchestratorStats::default(),
        };

        (orchestrator, OrchestratorHandle::new(command_tx))
    }

    /// Also publish every [`PipelineReport`] on `report_tx`.
    pub fn with_reports(mut self, report_tx: mpsc::UnboundedSender<PipelineReport>) -> Self {
        self.report_tx = Some(report_tx);
        self
    }

    /// Process events until shutdown is requested or every handle is dropped.
    #[instrument(skip(self), fields(policy = ?self.machine.policy()))]
    pub async fn run(mut self) -> OrchestratorStats {
        info!("Session orchestrator started");
        self.presenter.present(self.indicator);

        loop {
            tokio::select! {
                cmd = self.command_rx.recv() => match cmd {
                    Some(OrchestratorCommand::Trigger(event)) => {
                        let intent = self.machine.handle(&event);
                        self.apply(intent);
                    }
                    Some(OrchestratorCommand::Shutdown) => {
                        info!("Shutdown requested");
                        break;
                    }
                    None => {
                        info!("All orchestrator handles dropped, shutting down");
                        break;
                    }
                },

                Some(fired) = self.timer_rx.recv() => {
                    match self.machine.on_timer_fired(fired) {
                        Ok(intent) => self.apply(intent),
                        Err(e) => error!(error = ?e, "Hold timer invariant violated"),
                    }
                }

                Some(joined) = self.pipelines.join_next_with_id(), if !self.pipelines.is_empty() => {
                    self.on_pipeline_joined(joined);
                }
            }
        }

        self.shutdown().await
    }

    fn apply(&mut self, intent: Option<Intent>) {
        match intent {
            Some(Intent::Activate) => self.begin_session(),
            Some(Intent::Deactivate) => self.finish_session(),
            None => {}
        }
        self.refresh_indicator();
    }

    fn begin_session(&mut self) {
        match blocking_section(|| self.session.start()) {
            Ok(session_id) => {
                self.stats.sessions_started += 1;
                info!(session_id = %session_id, "Recording started");
            }
            Err(e) => {
                self.stats.start_failures += 1;
                error!(error = ?e, "Failed to start recording");
                self.machine.abandon_activation();
            }
        }
    }

    fn finish_session(&mut self) {
        let recording = match blocking_section(|| self.session.stop()) {
            Ok(recording) => recording,
            Err(e) => {
                self.stats.stop_failures += 1;
                match e {
                    CoreError::NoAudioCaptured { .. } => {
                        warn!(session_id = ?self.session.id(), "Recording stopped with no audio")
                    }
                    e => error!(session_id = ?self.session.id(), error = ?e, "Failed to finalize recording"),
                }
                return;
            }
        };

        self.stats.recordings_finalized += 1;

        let in_flight = InFlight {
            session_id: recording.session_id,
            path: recording.path.clone(),
            duration: recording.duration,
            dispatched_at: Instant::now(),
        };

        let handle = self.pipelines.spawn(run_pipeline(
            recording,
            Arc::clone(&self.transcriber),
            Arc::clone(&self.injector),
        ));
        self.in_flight.insert(handle.id(), in_flight);

        debug!(in_flight = self.pipelines.len(), "Transcription dispatched");
    }

    fn on_pipeline_joined(&mut self, joined: Result<(TaskId, PipelineReport), JoinError>) {
        let report = match joined {
            Ok((task_id, report)) => {
                self.in_flight.remove(&task_id);
                report
            }
            Err(e) => {
                let Some(lost) = self.in_flight.remove(&e.id()) else {
                    error!(error = ?e, "Untracked transcription task failed");
                    return;
                };
                PipelineReport {
                    session_id: lost.session_id,
                    path: lost.path,
                    duration: lost.duration,
                    elapsed: lost.dispatched_at.elapsed(),
                    outcome: PipelineOutcome::Aborted(e.to_string()),
                }
            }
        };

        match &report.outcome {
            PipelineOutcome::Injected { text_len } => {
                self.stats.pipelines_succeeded += 1;
                info!(
                    session_id = %report.session_id,
                    elapsed_ms = report.elapsed.as_millis(),
                    text_len,
                    "Transcription typed"
                );
            }
            PipelineOutcome::EmptyTranscription => {
                self.stats.pipelines_succeeded += 1;
                info!(session_id = %report.session_id, "Transcription was empty");
            }
            PipelineOutcome::TranscriptionFailed(reason) | PipelineOutcome::InjectionFailed(reason) => {
                self.stats.pipelines_failed += 1;
                error!(
                    session_id = %report.session_id,
                    path = ?report.path,
                    reason = %reason,
                    "Transcription pipeline failed, recording kept"
                );
            }
            PipelineOutcome::Aborted(reason) => {
                self.stats.pipelines_aborted += 1;
                warn!(
                    session_id = %report.session_id,
                    path = ?report.path,
                    reason = %reason,
                    "Transcription pipeline aborted, recording kept"
                );
            }
        }

        if let Some(report_tx) = &self.report_tx {
            let _ = report_tx.send(report);
        }

        self.refresh_indicator();
    }

    fn refresh_indicator(&mut self) {
        let desired = if self.session.is_capturing() {
            IndicatorState::Recording
        } else if !self.pipelines.is_empty() {
            IndicatorState::Processing
        } else {
            IndicatorState::Idle
        };

        if desired != self.indicator {
            debug!(from = %self.indicator, to = %desired, "Indicator changed");
            self.indicator = desired;
            self.presenter.present(desired);
        }
    }

    async fn shutdown(mut self) -> OrchestratorStats {
        let intent = self.machine.release(std::time::Instant::now());
        self.apply(intent);

        if !self.pipelines.is_empty() {
            info!(
                in_flight = self.pipelines.len(),
                grace_ms = self.shutdown_grace.as_millis(),
                "Waiting for in-flight transcriptions"
            );

            let grace = tokio::time::sleep(self.shutdown_grace);
            tokio::pin!(grace);

            loop {
                tokio::select! {
                    joined = self.pipelines.join_next_with_id() => match joined {
                        Some(joined) => self.on_pipeline_joined(joined),
                        None => break,
                    },
                    _ = &mut grace => {
                        warn!(
                            in_flight = self.pipelines.len(),
                            "Shutdown grace elapsed, cancelling transcriptions"
                        );
                        self.pipelines.abort_all();
                        while let Some(joined) = self.pipelines.join_next_with_id().await {
                            self.on_pipeline_joined(joined);
                        }
                        break;
                    }
                }
            }
        }

        self.refresh_indicator();
        self.stats.intents = self.machine.counters();

        info!(stats = ?self.stats, "Session orchestrator stopped");

        self.stats
    }
}

/// Run session work that blocks (device open, encode, fsync, capture join).
///
/// On a multi-threaded runtime the worker hands its other tasks to the pool
/// for the duration. A current-thread runtime cannot do that, so the work
/// runs inline there.
fn blocking_section<T>(work: impl FnOnce() -> T) -> T {
    match Handle::try_current() {
        Ok(handle) if handle.runtime_flavor() == RuntimeFlavor::MultiThread => {
            tokio::task::block_in_place(work)
        }
        _ => work(),
    }
}
