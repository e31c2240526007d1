use std::fmt;

/// Trigger state. The machine is always in exactly one of these.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TriggerState {
    /// Key up, no session.
    #[default]
    Idle,
    /// Key down, but no session running or pending (debounced or abandoned).
    Pressed,
    /// Key down under a hold policy, timer running, session not started.
    ArmPending,
    /// Session started.
    Active,
}

impl TriggerState {
    /// Get the string representation
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Pressed => "pressed",
            Self::ArmPending => "arm_pending",
            Self::Active => "active",
        }
    }
}

impl fmt::Display for TriggerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
