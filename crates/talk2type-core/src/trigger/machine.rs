//! Trigger state machine: raw key transitions in, session intents out.

use crate::{
    CoreError, CoreResult,
    trigger::{
        ActivationPolicy, HoldTimer, Intent, IntentCounters, KeyIdentity, TimerFired,
        TriggerEvent, TriggerState,
    },
};

use std::{
    panic::Location,
    time::{Duration, Instant},
};

use error_location::ErrorLocation;
use tokio::sync::mpsc;
use tracing::{debug, info, instrument, trace};

/// Decides when recording starts and stops.
///
/// Not thread-safe. The orchestrator drives it from a single loop that also
/// receives the hold timer's fires, so a key release and a timer fire for
/// the same press are always applied one after the other and exactly one of
/// them wins.
pub struct TriggerStateMachine {
    identity: KeyIdentity,
    policy: ActivationPolicy,
    debounce: Duration,
    state: TriggerState,
    timer: HoldTimer,
    last_deactivated_at: Option<Instant>,
    counters: IntentCounters,
}

impl TriggerStateMachine {
    /// Create a machine for one key. Hold-timer fires are sent on `timer_tx`.
    pub fn new(
        identity: KeyIdentity,
        policy: ActivationPolicy,
        debounce: Duration,
        timer_tx: mpsc::UnboundedSender<TimerFired>,
    ) -> Self {
        Self {
            identity,
            policy,
            debounce,
            state: TriggerState::Idle,
            timer: HoldTimer::new(timer_tx),
            last_deactivated_at: None,
            counters: IntentCounters::default(),
        }
    }

    /// Current state.
    pub fn state(&self) -> TriggerState {
        self.state
    }

    /// Configured activation policy.
    pub fn policy(&self) -> ActivationPolicy {
        self.policy
    }

    /// Intent totals so far.
    pub fn counters(&self) -> IntentCounters {
        self.counters
    }

    /// The hold timer owned by this machine.
    pub fn timer(&self) -> &HoldTimer {
        &self.timer
    }

    /// Apply one hardware transition.
    #[instrument(skip(self), fields(state = %self.state))]
    pub fn handle(&mut self, event: &TriggerEvent) -> Option<Intent> {
        if event.identity != self.identity {
            trace!(identity = ?event.identity, "Ignoring event for unmonitored key");
            return None;
        }

        if event.is_on() {
            self.on_pressed(event.timestamp)
        } else {
            self.on_released(event.timestamp)
        }
    }

    /// Apply a hold-timer fire.
    ///
    /// Stale fires (the key was released or the timer re-armed) are no-ops.
    #[track_caller]
    #[instrument(skip(self), fields(state = %self.state))]
    pub fn on_timer_fired(&mut self, fired: TimerFired) -> CoreResult<Option<Intent>> {
        if !self.timer.complete(fired) {
            return Ok(None);
        }

        match self.state {
            TriggerState::ArmPending => {
                info!("Hold threshold reached");
                Ok(Some(self.activate()))
            }
            other => Err(CoreError::TimerRace {
                reason: format!(
                    "live timer generation {} fired in state {}",
                    fired.generation, other
                ),
                location: ErrorLocation::from(Location::caller()),
            }),
        }
    }

    /// Roll back an `Activate` whose session failed to start.
    ///
    /// Moves `Active -> Pressed` without emitting `Deactivate`, so the
    /// matching release finds no session to stop. Returns `false` if the
    /// machine was not `Active`.
    #[instrument(skip(self), fields(state = %self.state))]
    pub fn abandon_activation(&mut self) -> bool {
        if self.state != TriggerState::Active {
            return false;
        }
        self.state = TriggerState::Pressed;
        self.counters.abandoned += 1;
        info!("Activation abandoned, waiting for release");
        true
    }

    /// Force the trigger up, e.g. on shutdown.
    ///
    /// Cancels any pending hold and emits `Deactivate` if a session is
    /// active so the recording can still be finalized.
    #[instrument(skip(self), fields(state = %self.state))]
    pub fn release(&mut self, now: Instant) -> Option<Intent> {
        self.on_released(now)
    }

    fn on_pressed(&mut self, at: Instant) -> Option<Intent> {
        match (self.state, self.policy) {
            (TriggerState::Idle, ActivationPolicy::Immediate) => {
                if self.within_debounce(at) {
                    debug!(
                        debounce_ms = self.debounce.as_millis(),
                        "ON edge debounced"
                    );
                    self.state = TriggerState::Pressed;
                    return None;
                }
                Some(self.activate())
            }
            (TriggerState::Idle, ActivationPolicy::HeldFor(duration)) => {
                if duration.is_zero() {
                    return Some(self.activate());
                }
                self.timer.arm(duration);
                self.state = TriggerState::ArmPending;
                debug!(hold_ms = duration.as_millis(), "Waiting for hold threshold");
                None
            }
            // Key repeat or a bouncing modifier.
            (TriggerState::Pressed | TriggerState::ArmPending | TriggerState::Active, _) => {
                trace!("Repeated ON edge ignored");
                None
            }
        }
    }

    fn on_released(&mut self, at: Instant) -> Option<Intent> {
        match self.state {
            TriggerState::Idle => {
                trace!("OFF edge while idle ignored");
                None
            }
            TriggerState::Pressed => {
                self.state = TriggerState::Idle;
                debug!("Released without session");
                None
            }
            TriggerState::ArmPending => {
                self.timer.cancel();
                self.state = TriggerState::Idle;
                info!("Released before hold threshold, no session started");
                None
            }
            TriggerState::Active => {
                self.state = TriggerState::Idle;
                self.last_deactivated_at = Some(at);
                self.counters.deactivations += 1;
                info!(
                    deactivations = self.counters.deactivations,
                    "Trigger deactivated"
                );
                Some(Intent::Deactivate)
            }
        }
    }

    fn activate(&mut self) -> Intent {
        self.state = TriggerState::Active;
        self.counters.activations += 1;
        info!(activations = self.counters.activations, "Trigger activated");
        Intent::Activate
    }

    fn within_debounce(&self, at: Instant) -> bool {
        if self.debounce.is_zero() {
            return false;
        }
        self.last_deactivated_at
            .is_some_and(|last| at.saturating_duration_since(last) < self.debounce)
    }
}
