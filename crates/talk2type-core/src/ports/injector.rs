use crate::CoreResult;

/// Delivers text to the foreground application.
///
/// Best-effort: failures are logged by the pipeline and never retried.
pub trait TextInjector: Send + Sync {
    /// Type or paste `text` into the focused window.
    fn inject(&self, text: &str) -> CoreResult<()>;
}
