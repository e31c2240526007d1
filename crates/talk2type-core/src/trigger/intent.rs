/// Session intent emitted by the trigger state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Intent {
    /// Start capturing audio.
    Activate,
    /// Stop capturing and finalize the recording.
    Deactivate,
}

/// Running totals of emitted intents.
///
/// `deactivations + abandoned` never exceeds `activations`, and the two are
/// equal whenever the machine is not `Active`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IntentCounters {
    /// `Activate` intents emitted.
    pub activations: u64,
    /// `Deactivate` intents emitted.
    pub deactivations: u64,
    /// Activations rolled back because the session never started.
    pub abandoned: u64,
}

impl IntentCounters {
    /// Activations not yet matched by a deactivation or an abandon.
    pub fn outstanding(&self) -> u64 {
        self.activations
            .saturating_sub(self.deactivations + self.abandoned)
    }
}
