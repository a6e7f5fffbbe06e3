use std::collections::BTreeMap;
use std::sync::Arc;
use std::thread;

use parking_lot::{Condvar, Mutex};
use web_time::{Duration, Instant};

use super::{effective_period, Scheduler, TickFn, TimerId};
use crate::{ReplayError, ReplayResult};

#[derive(Default)]
struct CancelSignal {
    cancelled: Mutex<bool>,
    condvar: Condvar,
}

impl CancelSignal {
    fn cancel(&self) {
        *self.cancelled.lock() = true;
        self.condvar.notify_all();
    }

    /// Sleeps until `deadline`. Returns `false` if cancelled first.
    fn sleep_until(&self, deadline: Instant) -> bool {
        let mut cancelled = self.cancelled.lock();
        loop {
            if *cancelled {
                return false;
            }
            let now = Instant::now();
            if now >= deadline {
                return true;
            }
            self.condvar.wait_for(&mut cancelled, deadline - now);
        }
    }

    fn is_cancelled(&self) -> bool {
        *self.cancelled.lock()
    }
}

#[derive(Default)]
struct ThreadState {
    next_id: u64,
    timers: BTreeMap<TimerId, Arc<CancelSignal>>,
}

/// A wall-clock scheduler that runs each timer on its own thread.
///
/// Deadlines advance by exactly one period per tick, so ticks do not drift even
/// when callbacks take a while. If a tick runs so late that the next deadline has
/// already passed, the missed ticks are skipped instead of fired in a burst.
///
/// Cancellation wakes the timer thread through a condition variable; `cancel`
/// never joins, so it is safe to call from inside a tick. Dropping the scheduler
/// cancels every timer it started.
#[derive(Default)]
pub struct ThreadScheduler {
    state: Mutex<ThreadState>,
}

impl ThreadScheduler {
    /// Creates a scheduler with no timers.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of timers that have not been cancelled.
    #[must_use]
    pub fn active_timers(&self) -> usize {
        self.state.lock().timers.len()
    }
}

fn run_timer(signal: &CancelSignal, period: Duration, mut tick: TickFn) {
    let mut deadline = Instant::now() + period;
    while signal.sleep_until(deadline) {
        tick();
        if signal.is_cancelled() {
            break;
        }
        deadline += period;
        let now = Instant::now();
        if now > deadline + period {
            deadline = now + period;
        }
    }
}

impl Scheduler for ThreadScheduler {
    fn schedule_repeating(&self, period: Duration, tick: TickFn) -> ReplayResult<TimerId> {
        let period = effective_period(period);
        let signal = Arc::new(CancelSignal::default());

        let id = {
            let mut state = self.state.lock();
            let id = TimerId::new(state.next_id);
            state.next_id += 1;
            state.timers.insert(id, Arc::clone(&signal));
            id
        };

        let thread_signal = Arc::clone(&signal);
        let spawned = thread::Builder::new()
            .name(format!("replay-{}", id))
            .spawn(move || run_timer(&thread_signal, period, tick));

        match spawned {
            Ok(_) => {
                tracing::trace!(%id, ?period, "timer thread started");
                Ok(id)
            },
            Err(err) => {
                self.state.lock().timers.remove(&id);
                Err(ReplayError::InternalError {
                    context: format!("failed to spawn timer thread for {}: {}", id, err),
                })
            },
        }
    }

    fn cancel(&self, timer: TimerId) {
        let signal = self.state.lock().timers.remove(&timer);
        if let Some(signal) = signal {
            signal.cancel();
            tracing::trace!(id = %timer, "timer thread cancelled");
        }
    }
}

impl Drop for ThreadScheduler {
    fn drop(&mut self) {
        let timers = std::mem::take(&mut self.state.get_mut().timers);
        for signal in timers.values() {
            signal.cancel();
        }
    }
}

impl std::fmt::Debug for ThreadScheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ThreadScheduler")
            .field("active_timers", &self.active_timers())
            .finish()
    }
}
