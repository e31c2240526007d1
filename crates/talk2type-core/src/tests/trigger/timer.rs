use crate::trigger::{HoldTimer, TimerFired};

use std::time::Duration;

use tokio::sync::mpsc;

const HOLD: Duration = Duration::from_millis(300);

/// WHAT: An armed timer delivers one fire carrying its generation
/// WHY: The orchestrator matches fires to the live timer by generation
#[tokio::test(start_paused = true)]
#[allow(clippy::unwrap_used)]
async fn given_armed_timer_when_deadline_passes_then_fire_delivered() {
    // Given: A timer armed for 300ms
    let (fire_tx, mut fire_rx) = mpsc::unbounded_channel();
    let mut timer = HoldTimer::new(fire_tx);
    let generation = timer.arm(HOLD);

    // When: Waiting for the fire
    let fired = fire_rx.recv().await.unwrap();

    // Then: It carries the live generation and completes the timer
    assert_eq!(fired.generation(), generation);
    assert!(timer.complete(fired));
    assert!(!timer.is_armed());
}

/// WHAT: Re-arming cancels the previous deadline
/// WHY: At most one hold timer may be live
#[tokio::test(start_paused = true)]
#[allow(clippy::unwrap_used)]
async fn given_armed_timer_when_rearmed_then_only_new_generation_fires() {
    // Given: A timer armed twice
    let (fire_tx, mut fire_rx) = mpsc::unbounded_channel();
    let mut timer = HoldTimer::new(fire_tx);
    let first = timer.arm(HOLD);
    let second = timer.arm(HOLD);

    // When: Both deadlines have passed
    tokio::time::sleep(HOLD * 2).await;

    // Then: Only the second generation fired
    assert!(second > first);
    let fired = fire_rx.try_recv().unwrap();
    assert_eq!(fired.generation(), second);
    assert!(fire_rx.try_recv().is_err());
}

/// WHAT: Cancel stops delivery and reports whether a timer was live
/// WHY: Releasing before the deadline must leave no fire behind
#[tokio::test(start_paused = true)]
async fn given_armed_timer_when_cancelled_then_no_fire() {
    // Given: A timer armed for 300ms
    let (fire_tx, mut fire_rx) = mpsc::unbounded_channel();
    let mut timer = HoldTimer::new(fire_tx);
    timer.arm(HOLD);

    // When: Cancelled halfway and then cancelled again
    tokio::time::sleep(HOLD / 2).await;
    let first_cancel = timer.cancel();
    let second_cancel = timer.cancel();
    tokio::time::sleep(HOLD * 2).await;

    // Then: Only the first cancel found a timer and nothing fired
    assert!(first_cancel);
    assert!(!second_cancel);
    assert!(fire_rx.try_recv().is_err());
}

/// WHAT: Completing with a foreign generation is rejected
/// WHY: Stale fires must leave the live timer armed
#[tokio::test(start_paused = true)]
async fn given_armed_timer_when_completed_with_stale_generation_then_rejected() {
    // Given: A live timer
    let (fire_tx, _fire_rx) = mpsc::unbounded_channel();
    let mut timer = HoldTimer::new(fire_tx);
    let live = timer.arm(HOLD);

    // When: A fire with another generation is presented
    let accepted = timer.complete(TimerFired {
        generation: live.wrapping_add(1),
    });

    // Then: Rejected, timer still armed with its deadline
    assert!(!accepted);
    assert_eq!(timer.armed_generation(), Some(live));
    assert!(timer.deadline().is_some());
}

/// WHAT: The deadline is the arm time plus the duration
/// WHY: Activation time for hold-to-talk is defined by this deadline
#[tokio::test(start_paused = true)]
#[allow(clippy::unwrap_used)]
async fn given_paused_clock_when_arming_then_deadline_is_now_plus_duration() {
    // Given: A frozen clock
    let (fire_tx, _fire_rx) = mpsc::unbounded_channel();
    let mut timer = HoldTimer::new(fire_tx);
    let now = tokio::time::Instant::now();

    // When: Arming
    timer.arm(HOLD);

    // Then: Deadline is exact
    assert_eq!(timer.deadline().unwrap(), now + HOLD);
}
