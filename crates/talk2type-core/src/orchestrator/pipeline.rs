use crate::{
    orchestrator::{PipelineOutcome, PipelineReport},
    ports::{TextInjector, Transcriber},
    session::FinalizedRecording,
};

use std::{sync::Arc, time::Instant};

use tracing::{info, instrument, warn};

/// Transcribe one recording and inject the text. Runs as its own task.
///
/// Both collaborators are synchronous and may block for seconds, so each is
/// called from `spawn_blocking`. One attempt only; the saved file is the
/// retry path.
#[instrument(
    skip(recording, transcriber, injector),
    fields(session_id = %recording.session_id)
)]
pub(crate) async fn run_pipeline(
    recording: FinalizedRecording,
    transcriber: Arc<dyn Transcriber>,
    injector: Arc<dyn TextInjector>,
) -> PipelineReport {
    let start = Instant::now();
    let FinalizedRecording {
        session_id,
        path,
        duration,
        audio,
        ..
    } = recording;

    let report = |outcome: PipelineOutcome| PipelineReport {
        session_id,
        path: path.clone(),
        duration,
        elapsed: start.elapsed(),
        outcome,
    };

    let transcription =
        match tokio::task::spawn_blocking(move || transcriber.transcribe(&audio)).await {
            Ok(Ok(text)) => text,
            Ok(Err(e)) => {
                warn!(error = ?e, "Transcription failed");
                return report(PipelineOutcome::TranscriptionFailed(e.to_string()));
            }
            Err(e) => return report(PipelineOutcome::Aborted(e.to_string())),
        };

    let text = transcription.trim().to_string();
    if text.is_empty() {
        info!("No transcription text to type");
        return report(PipelineOutcome::EmptyTranscription);
    }

    info!(
        text_len = text.len(),
        transcribe_ms = start.elapsed().as_millis(),
        "Transcription complete"
    );

    let text_len = text.len();
    match tokio::task::spawn_blocking(move || injector.inject(&text)).await {
        Ok(Ok(())) => report(PipelineOutcome::Injected { text_len }),
        Ok(Err(e)) => {
            warn!(error = ?e, "Text injection failed");
            report(PipelineOutcome::InjectionFailed(e.to_string()))
        }
        Err(e) => report(PipelineOutcome::Aborted(e.to_string())),
    }
}
