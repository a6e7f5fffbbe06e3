//! Cancellable repeating timers.
//!
//! The controller never sleeps or spawns anything itself. It asks a [`Scheduler`]
//! for one repeating timer while playing and cancels it on pause, so the same
//! playback logic runs against a virtual clock in tests and a real clock in
//! viewers.
//!
//! | Scheduler | Clock | Use |
//! |-----------|-------|-----|
//! | [`ManualScheduler`] | virtual, advanced by hand | tests, frame-exact exports |
//! | [`ThreadScheduler`] | wall clock, one thread per timer | desktop viewers, demos |
//! | `TokioScheduler` | tokio timer wheel (feature `tokio`) | async services |
//!
//! Implementations must tolerate `cancel` being called from inside a tick callback
//! and for a timer that has already been cancelled.

use std::fmt;
use web_time::Duration;

use crate::ReplayResult;

mod manual;
mod thread;
#[cfg(feature = "tokio")]
mod tokio_timer;

pub use manual::ManualScheduler;
pub use thread::ThreadScheduler;
#[cfg(feature = "tokio")]
pub use tokio_timer::TokioScheduler;

/// Callback invoked on every tick of a repeating timer.
pub type TickFn = Box<dyn FnMut() + Send + 'static>;

/// Identifies one repeating timer within its scheduler.
///
/// Ids are never reused by a scheduler, so a stale id can be compared against
/// the current one safely.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TimerId(u64);

impl TimerId {
    /// Wraps a raw id. Scheduler implementations hand these out.
    #[inline]
    #[must_use]
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    /// Returns the raw id.
    #[inline]
    #[must_use]
    pub const fn as_u64(self) -> u64 {
        self.0
    }
}

impl fmt::Display for TimerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "timer#{}", self.0)
    }
}

/// Source of repeating timers.
///
/// Implement this to drive playback from your own event loop. The first tick
/// fires one `period` after scheduling, and ticks keep firing every `period`
/// until the timer is cancelled.
///
/// # Example
///
/// ```
/// use arena_replay::{ManualScheduler, Scheduler};
/// use std::sync::atomic::{AtomicUsize, Ordering};
/// use std::sync::Arc;
/// use web_time::Duration;
///
/// let scheduler = ManualScheduler::new();
/// let ticks = Arc::new(AtomicUsize::new(0));
/// let counter = Arc::clone(&ticks);
/// let id = scheduler.schedule_repeating(
///     Duration::from_millis(10),
///     Box::new(move || {
///         counter.fetch_add(1, Ordering::SeqCst);
///     }),
/// )?;
///
/// scheduler.advance(Duration::from_millis(35));
/// assert_eq!(ticks.load(Ordering::SeqCst), 3);
///
/// scheduler.cancel(id);
/// scheduler.advance(Duration::from_millis(100));
/// assert_eq!(ticks.load(Ordering::SeqCst), 3);
/// # Ok::<(), arena_replay::ReplayError>(())
/// ```
pub trait Scheduler: Send + Sync {
    /// Starts a repeating timer and returns its id.
    ///
    /// # Errors
    ///
    /// Returns [`ReplayError::InternalError`] if the timer could not be started.
    /// No tick fires for a timer that failed to start.
    ///
    /// [`ReplayError::InternalError`]: crate::ReplayError::InternalError
    fn schedule_repeating(&self, period: Duration, tick: TickFn) -> ReplayResult<TimerId>;

    /// Stops a timer. Unknown or already cancelled ids are ignored.
    ///
    /// A tick that is already executing may still complete after this returns.
    fn cancel(&self, timer: TimerId);
}

/// Smallest period any scheduler will honor; shorter requests are raised to this.
pub(crate) const MIN_PERIOD: Duration = Duration::from_micros(100);

pub(crate) fn effective_period(period: Duration) -> Duration {
    period.max(MIN_PERIOD)
}
