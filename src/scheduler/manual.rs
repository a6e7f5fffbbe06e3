use std::collections::BTreeMap;

use parking_lot::Mutex;
use web_time::Duration;

use super::{effective_period, Scheduler, TickFn, TimerId};
use crate::ReplayResult;

struct ManualTimer {
    period: Duration,
    next_due: Duration,
    // `None` while the callback is running outside the lock.
    tick: Option<TickFn>,
}

#[derive(Default)]
struct ManualState {
    now: Duration,
    next_id: u64,
    timers: BTreeMap<TimerId, ManualTimer>,
}

/// A scheduler driven by a virtual clock.
///
/// Nothing fires until [`advance`](Self::advance) or [`tick_all`](Self::tick_all)
/// is called, which makes playback fully deterministic: tests decide exactly how
/// many ticks happen, and exporters can step through a replay frame by frame.
///
/// Callbacks run with the scheduler unlocked, so a tick may cancel its own timer
/// or schedule a new one.
#[derive(Default)]
pub struct ManualScheduler {
    state: Mutex<ManualState>,
}

impl ManualScheduler {
    /// Creates a scheduler at virtual time zero with no timers.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Elapsed virtual time.
    #[must_use]
    pub fn now(&self) -> Duration {
        self.state.lock().now
    }

    /// Number of timers that have not been cancelled.
    #[must_use]
    pub fn active_timers(&self) -> usize {
        self.state.lock().timers.len()
    }

    /// Ids of all active timers, oldest first.
    #[must_use]
    pub fn timer_ids(&self) -> Vec<TimerId> {
        self.state.lock().timers.keys().copied().collect()
    }

    /// The period of an active timer.
    #[must_use]
    pub fn period_of(&self, timer: TimerId) -> Option<Duration> {
        self.state.lock().timers.get(&timer).map(|t| t.period)
    }

    /// Moves the clock forward by `by`, firing every tick that falls due on the way.
    ///
    /// Ticks fire in deadline order; timers due at the same instant fire oldest
    /// first. Returns the number of ticks fired.
    pub fn advance(&self, by: Duration) -> usize {
        let target = self.state.lock().now.saturating_add(by);
        let mut fired = 0;

        loop {
            let (id, mut tick) = {
                let mut state = self.state.lock();
                let due = state
                    .timers
                    .iter()
                    .filter(|(_, timer)| timer.tick.is_some() && timer.next_due <= target)
                    .min_by_key(|(id, timer)| (timer.next_due, **id))
                    .map(|(id, _)| *id);

                let Some(id) = due else {
                    state.now = target;
                    break;
                };

                let Some(timer) = state.timers.get_mut(&id) else {
                    break;
                };
                let due_at = timer.next_due;
                timer.next_due = due_at.saturating_add(timer.period);
                let Some(tick) = timer.tick.take() else {
                    break;
                };
                state.now = due_at;
                (id, tick)
            };

            tick();
            fired += 1;
            self.restore(id, tick);
        }

        fired
    }

    /// Fires every active timer exactly once without moving the clock.
    ///
    /// Timers scheduled by the callbacks themselves are not fired. Returns the
    /// number of ticks fired.
    pub fn tick_all(&self) -> usize {
        let ids = self.timer_ids();
        let mut fired = 0;

        for id in ids {
            let taken = self
                .state
                .lock()
                .timers
                .get_mut(&id)
                .and_then(|timer| timer.tick.take());
            let Some(mut tick) = taken else {
                continue;
            };
            tick();
            fired += 1;
            self.restore(id, tick);
        }

        fired
    }

    fn restore(&self, id: TimerId, tick: TickFn) {
        let mut state = self.state.lock();
        if let Some(timer) = state.timers.get_mut(&id) {
            timer.tick = Some(tick);
        } else {
            // Cancelled while running; drop the callback outside the lock.
            drop(state);
            drop(tick);
        }
    }
}

impl Scheduler for ManualScheduler {
    fn schedule_repeating(&self, period: Duration, tick: TickFn) -> ReplayResult<TimerId> {
        let period = effective_period(period);
        let mut state = self.state.lock();
        let id = TimerId::new(state.next_id);
        state.next_id += 1;
        let next_due = state.now.saturating_add(period);
        state.timers.insert(
            id,
            ManualTimer {
                period,
                next_due,
                tick: Some(tick),
            },
        );
        tracing::trace!(%id, ?period, "manual timer scheduled");
        Ok(id)
    }

    fn cancel(&self, timer: TimerId) {
        let removed = self.state.lock().timers.remove(&timer);
        if removed.is_some() {
            tracing::trace!(id = %timer, "manual timer cancelled");
        }
    }
}

impl std::fmt::Debug for ManualScheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.state.lock();
        f.debug_struct("ManualScheduler")
            .field("now", &state.now)
            .field("active_timers", &state.timers.len())
            .finish()
    }
}
