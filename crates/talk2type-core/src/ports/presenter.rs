use std::fmt;

/// What the visual indicator should show.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum IndicatorState {
    /// Nothing recording, nothing in flight.
    #[default]
    Idle,
    /// A session is capturing audio.
    Recording,
    /// Recordings are being transcribed.
    Processing,
}

impl fmt::Display for IndicatorState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Idle => "idle",
            Self::Recording => "recording",
            Self::Processing => "processing",
        };
        write!(f, "{}", name)
    }
}

/// Receives indicator updates (tray icon, menu bar item).
///
/// Not required for correctness; implementations must not block.
pub trait StatePresenter: Send {
    /// Show `state`.
    fn present(&self, state: IndicatorState);
}

/// Presenter that shows nothing.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopPresenter;

impl StatePresenter for NoopPresenter {
    fn present(&self, _state: IndicatorState) {}
}
