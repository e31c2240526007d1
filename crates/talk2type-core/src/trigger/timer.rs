use std::time::Duration;

use tokio::{
    sync::mpsc,
    task::JoinHandle,
    time::{Instant, sleep_until},
};
use tracing::{debug, trace};

/// Message delivered when an armed hold timer reaches its deadline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimerFired {
    pub(crate) generation: u64,
}

impl TimerFired {
    /// Generation of the timer that fired.
    pub fn generation(&self) -> u64 {
        self.generation
    }
}

struct ArmedTimer {
    generation: u64,
    armed_at: Instant,
    deadline: Instant,
    task: JoinHandle<()>,
}

/// Cancellable single-shot deadline for the hold-to-activate policy.
///
/// Fires are not callbacks: the timer task sends a [`TimerFired`] into the
/// channel the orchestrator loop reads, so every state transition happens in
/// that loop. At most one timer is live. A fire is honoured by
/// [`HoldTimer::complete`] only if its generation is still the live one, which
/// makes a fire racing a cancellation a guaranteed no-op.
///
/// `arm` spawns onto the current tokio runtime.
pub struct HoldTimer {
    fire_tx: mpsc::UnboundedSender<TimerFired>,
    next_generation: u64,
    armed: Option<ArmedTimer>,
}

impl HoldTimer {
    /// Create a timer that delivers fires on `fire_tx`.
    pub fn new(fire_tx: mpsc::UnboundedSender<TimerFired>) -> Self {
        Self {
            fire_tx,
            next_generation: 0,
            armed: None,
        }
    }

    /// Arm a new deadline `duration` from now, cancelling any live one first.
    ///
    /// Returns the generation the eventual fire will carry.
    pub fn arm(&mut self, duration: Duration) -> u64 {
        self.cancel();

        self.next_generation += 1;
        let generation = self.next_generation;
        let armed_at = Instant::now();
        let deadline = armed_at + duration;
        let fire_tx = self.fire_tx.clone();

        let task = tokio::spawn(async move {
            sleep_until(deadline).await;
            // Receiver gone means the orchestrator has shut down.
            let _ = fire_tx.send(TimerFired { generation });
        });

        debug!(
            generation,
            duration_ms = duration.as_millis(),
            "Hold timer armed"
        );

        self.armed = Some(ArmedTimer {
            generation,
            armed_at,
            deadline,
            task,
        });

        generation
    }

    /// Cancel the live timer. Returns `false` if none was armed.
    pub fn cancel(&mut self) -> bool {
        match self.armed.take() {
            Some(armed) => {
                armed.task.abort();
                debug!(
                    generation = armed.generation,
                    held_ms = armed.armed_at.elapsed().as_millis(),
                    "Hold timer cancelled"
                );
                true
            }
            None => false,
        }
    }

    /// Consume a fire. Returns `true` only if it belongs to the live timer,
    /// which is then disarmed.
    pub fn complete(&mut self, fired: TimerFired) -> bool {
        match &self.armed {
            Some(armed) if armed.generation == fired.generation => {
                trace!(
                    generation = fired.generation,
                    lateness_us = armed.deadline.elapsed().as_micros(),
                    "Hold timer fire accepted"
                );
                self.armed = None;
                true
            }
            _ => {
                debug!(generation = fired.generation, "Discarding stale hold timer fire");
                false
            }
        }
    }

    /// Whether a timer is currently live.
    pub fn is_armed(&self) -> bool {
        self.armed.is_some()
    }

    /// Generation of the live timer, if any.
    pub fn armed_generation(&self) -> Option<u64> {
        self.armed.as_ref().map(|armed| armed.generation)
    }

    /// Deadline of the live timer, if any.
    pub fn deadline(&self) -> Option<Instant> {
        self.armed.as_ref().map(|armed| armed.deadline)
    }
}

impl Drop for HoldTimer {
    fn drop(&mut self) {
        self.cancel();
    }
}
