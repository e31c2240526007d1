use std::time::Instant;

/// Identifier of the monitored key or modifier (the registered hotkey id).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct KeyIdentity(pub u32);

/// Kind of hardware transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TriggerEventKind {
    /// The key went down.
    KeyDown,
    /// The key went up.
    KeyUp,
    /// A latching modifier (Caps Lock style) changed its level.
    ModifierChanged {
        /// Level after the change.
        on: bool,
    },
}

/// One hardware transition delivered by the event source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TriggerEvent {
    /// What happened.
    pub kind: TriggerEventKind,
    /// Which key it happened to.
    pub identity: KeyIdentity,
    /// When the event source observed it.
    pub timestamp: Instant,
}

impl TriggerEvent {
    /// Create an event observed at `timestamp`.
    pub fn new(kind: TriggerEventKind, identity: KeyIdentity, timestamp: Instant) -> Self {
        Self {
            kind,
            identity,
            timestamp,
        }
    }

    /// Level of the trigger after this event: `true` for ON edges.
    pub fn is_on(&self) -> bool {
        match self.kind {
            TriggerEventKind::KeyDown => true,
            TriggerEventKind::KeyUp => false,
            TriggerEventKind::ModifierChanged { on } => on,
        }
    }
}
