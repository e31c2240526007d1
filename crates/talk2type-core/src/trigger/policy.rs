use std::time::Duration;

/// How a trigger press turns into an activation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActivationPolicy {
    /// ON edges activate and OFF edges deactivate directly (Caps Lock style).
    Immediate,
    /// The key must stay down for the given duration before activating.
    HeldFor(Duration),
}
