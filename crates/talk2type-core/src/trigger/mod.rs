mod event;
mod intent;
mod machine;
mod policy;
mod state;
mod timer;

pub use {
    event::{KeyIdentity, TriggerEvent, TriggerEventKind},
    intent::{Intent, IntentCounters},
    machine::TriggerStateMachine,
    policy::ActivationPolicy,
    state::TriggerState,
    timer::{HoldTimer, TimerFired},
};
