//! Tokio-driven scheduler.
//!
//! This module provides [`TokioScheduler`], which runs every repeating timer as a
//! task on a Tokio runtime using [`tokio::time::interval_at`].
//!
//! # Example
//!
//! ```
//! use arena_replay::{ControllerBuilder, TokioScheduler};
//! use std::sync::Arc;
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() {
//!     let scheduler = Arc::new(TokioScheduler::current());
//!     let controller = ControllerBuilder::new().build(scheduler).unwrap();
//!     assert!(!controller.is_playing());
//! }
//! ```

use std::collections::BTreeMap;

use parking_lot::Mutex;
use tokio::runtime::Handle;
use tokio::task::AbortHandle;
use tokio::time::{self, MissedTickBehavior};
use web_time::Duration;

use super::{effective_period, Scheduler, TickFn, TimerId};
use crate::ReplayResult;

#[derive(Default)]
struct TokioState {
    next_id: u64,
    tasks: BTreeMap<TimerId, AbortHandle>,
}

/// A scheduler that spawns one interval task per timer onto a Tokio runtime.
///
/// Late ticks are skipped rather than fired in a burst. Cancelling aborts the
/// task; a tick callback that is already running finishes first. Dropping the
/// scheduler aborts every task it spawned.
pub struct TokioScheduler {
    handle: Handle,
    state: Mutex<TokioState>,
}

impl TokioScheduler {
    /// Creates a scheduler that spawns onto the given runtime.
    #[must_use]
    pub fn new(handle: Handle) -> Self {
        Self {
            handle,
            state: Mutex::new(TokioState::default()),
        }
    }

    /// Creates a scheduler bound to the runtime of the calling task.
    ///
    /// # Panics
    ///
    /// Panics if called outside a Tokio runtime, as [`Handle::current`] does.
    #[must_use]
    pub fn current() -> Self {
        Self::new(Handle::current())
    }

    /// Number of timers that have not been cancelled.
    #[must_use]
    pub fn active_timers(&self) -> usize {
        self.state.lock().tasks.len()
    }
}

impl Scheduler for TokioScheduler {
    fn schedule_repeating(&self, period: Duration, mut tick: TickFn) -> ReplayResult<TimerId> {
        let period = effective_period(period);
        let mut state = self.state.lock();
        let id = TimerId::new(state.next_id);
        state.next_id += 1;

        let task = self.handle.spawn(async move {
            let start = time::Instant::now() + period;
            let mut interval = time::interval_at(start, period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
            loop {
                interval.tick().await;
                tick();
            }
        });
        state.tasks.insert(id, task.abort_handle());
        tracing::trace!(%id, ?period, "tokio timer scheduled");
        Ok(id)
    }

    fn cancel(&self, timer: TimerId) {
        let task = self.state.lock().tasks.remove(&timer);
        if let Some(task) = task {
            task.abort();
            tracing::trace!(id = %timer, "tokio timer cancelled");
        }
    }
}

impl Drop for TokioScheduler {
    fn drop(&mut self) {
        for task in self.state.get_mut().tasks.values() {
            task.abort();
        }
    }
}

impl std::fmt::Debug for TokioScheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokioScheduler")
            .field("active_timers", &self.active_timers())
            .finish()
    }
}
