//! Playback state machine.
//!
//! [`ReplayController`] owns the playback position, the play/pause state and the
//! speed of one replay, and drives frame advancement through a repeating timer
//! obtained from a [`Scheduler`].
//!
//! # State machine
//!
//! | From | Event | To |
//! |------|-------|----|
//! | `Empty` | `load` with frames | `Paused` |
//! | `Empty` | `load` without frames | `Empty` |
//! | `Paused` | `play` / `toggle` | `Playing` |
//! | `Playing` | `pause` / `toggle` / tick reaching the last frame | `Paused` |
//! | any | `clear` | `Empty` |
//! | any | `load` | `Paused` (or `Empty`) |
//!
//! `seek` and `set_speed` never change the state.
//!
//! # Concurrency
//!
//! Every operation, and every timer tick, is one critical section over a single
//! mutex. A tick that races a `pause`, `clear` or `load` therefore either runs
//! entirely before it or finds that its timer is no longer the current one and
//! does nothing.

use std::fmt;
use std::sync::{Arc, Weak};

use parking_lot::Mutex;
use web_time::Duration;

use crate::config::PlaybackConfig;
use crate::document::{Frame, ReplayDocument, ReplayMetadata};
use crate::loader::{MatchId, ReplayLoader};
use crate::scheduler::{Scheduler, TimerId};
use crate::telemetry::{
    InvariantChecker, InvariantViolation, Violation, ViolationKind, ViolationObserver,
    ViolationSeverity,
};
use crate::{ReplayError, ReplayResult};

mod builder;

pub use builder::ControllerBuilder;

/// Coarse classification of a controller.
///
/// | State | Document | Timer |
/// |-------|----------|-------|
/// | `Empty` | none, or zero frames | none |
/// | `Paused` | at least one frame | none |
/// | `Playing` | at least one frame | exactly one |
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PlaybackState {
    /// Nothing to play.
    Empty,
    /// Frames are loaded and the position is fixed.
    Paused,
    /// The position advances on every tick.
    Playing,
}

impl PlaybackState {
    /// Returns a lowercase label for logs and UI.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Empty => "empty",
            Self::Paused => "paused",
            Self::Playing => "playing",
        }
    }
}

impl fmt::Display for PlaybackState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Progress of the most recent load.
#[derive(Debug, Clone, PartialEq)]
pub enum LoadStatus {
    /// Nothing has been requested since construction or the last `clear`.
    Idle,
    /// A fetch is in flight.
    Loading {
        /// The match being fetched.
        match_id: MatchId,
    },
    /// A document is installed.
    Loaded {
        /// The match it came from, if it was loaded through a ticket.
        match_id: Option<MatchId>,
    },
    /// The last fetch failed. Any previously installed document is still in place.
    Failed {
        /// The match that could not be fetched.
        match_id: MatchId,
        /// Why it failed.
        error: ReplayError,
    },
}

impl LoadStatus {
    /// Returns `true` while a fetch is in flight.
    #[must_use]
    pub fn is_loading(&self) -> bool {
        matches!(self, Self::Loading { .. })
    }

    /// The failure of the last fetch, if it failed.
    #[must_use]
    pub fn error(&self) -> Option<&ReplayError> {
        match self {
            Self::Failed { error, .. } => Some(error),
            _ => None,
        }
    }
}

/// Proof that a load was started, redeemed with
/// [`ReplayController::complete_load`].
///
/// A ticket goes stale as soon as another load starts, a document is installed
/// directly or the controller is cleared.
#[derive(Debug, PartialEq, Eq)]
#[must_use = "a LoadTicket does nothing unless passed to ReplayController::complete_load()"]
pub struct LoadTicket {
    generation: u64,
    match_id: MatchId,
}

impl LoadTicket {
    /// The match this ticket was issued for.
    #[must_use]
    pub fn match_id(&self) -> &MatchId {
        &self.match_id
    }
}

/// A consistent view of the whole playback state, taken under one lock.
#[derive(Debug, Clone, PartialEq)]
pub struct PlaybackSnapshot {
    /// Coarse state.
    pub state: PlaybackState,
    /// Current frame index; `0` when empty.
    pub current_index: usize,
    /// Number of loaded frames.
    pub total_frames: usize,
    /// Active speed multiplier.
    pub speed: f64,
    /// Progress of the most recent load.
    pub load_status: LoadStatus,
    /// Bumped whenever the frame a viewer should display changes.
    pub revision: u64,
}

/// The frame to display, with the revision it belongs to.
#[derive(Debug, Clone, PartialEq)]
pub struct FrameView {
    /// Revision at the time of the read.
    pub revision: u64,
    /// Index of `frame` in its replay.
    pub index: usize,
    /// The frame, or `None` when nothing is loaded.
    pub frame: Option<Frame>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct ActiveTimer {
    id: TimerId,
    epoch: u64,
}

struct PlaybackInner {
    document: Option<Arc<ReplayDocument>>,
    current: usize,
    speed: f64,
    timer: Option<ActiveTimer>,
    timer_epoch: u64,
    load_status: LoadStatus,
    load_generation: u64,
    revision: u64,
}

impl PlaybackInner {
    fn new(default_speed: f64) -> Self {
        Self {
            document: None,
            current: 0,
            speed: default_speed,
            timer: None,
            timer_epoch: 0,
            load_status: LoadStatus::Idle,
            load_generation: 0,
            revision: 0,
        }
    }

    fn total(&self) -> usize {
        self.document.as_ref().map_or(0, |doc| doc.len())
    }

    fn state(&self) -> PlaybackState {
        if self.total() == 0 {
            PlaybackState::Empty
        } else if self.timer.is_some() {
            PlaybackState::Playing
        } else {
            PlaybackState::Paused
        }
    }

    fn set_current(&mut self, index: usize) {
        if self.current != index {
            self.current = index;
            self.revision += 1;
        }
    }

    fn frame(&self) -> Option<&Frame> {
        self.document.as_ref()?.frame(self.current)
    }
}

impl InvariantChecker for PlaybackInner {
    /// Checks the invariants of the playback state.
    ///
    /// # Invariants
    ///
    /// 1. `current` is `0` when empty and `< total` otherwise
    /// 2. A timer only exists while there are frames to play
    /// 3. `speed` is positive and finite
    fn check_invariants(&self) -> Result<(), InvariantViolation> {
        let total = self.total();
        if (total == 0 && self.current != 0) || (total > 0 && self.current >= total) {
            return Err(
                InvariantViolation::new("PlaybackInner", "current index out of range")
                    .with_details(format!("current={}, total={}", self.current, total)),
            );
        }

        if total == 0 && self.timer.is_some() {
            return Err(InvariantViolation::new(
                "PlaybackInner",
                "timer is running without frames",
            ));
        }

        if !(self.speed.is_finite() && self.speed > 0.0) {
            return Err(
                InvariantViolation::new("PlaybackInner", "speed must be positive")
                    .with_details(format!("speed={}", self.speed)),
            );
        }

        Ok(())
    }
}

struct Shared {
    inner: Mutex<PlaybackInner>,
    scheduler: Arc<dyn Scheduler>,
    config: PlaybackConfig,
    observer: Option<Arc<dyn ViolationObserver>>,
}

impl Shared {
    fn report(&self, violation: &Violation) {
        crate::telemetry::report_to_observer(self.observer.as_ref(), violation);
    }

    /// Starts a timer for the current speed. On error the controller stays paused.
    fn start_timer(self: &Arc<Self>, inner: &mut PlaybackInner) -> ReplayResult<()> {
        inner.timer_epoch += 1;
        let epoch = inner.timer_epoch;
        let period = self.config.tick_period(inner.speed);
        let weak: Weak<Self> = Arc::downgrade(self);
        let id = self.scheduler.schedule_repeating(
            period,
            Box::new(move || {
                if let Some(shared) = weak.upgrade() {
                    shared.on_tick(epoch);
                }
            }),
        )?;
        inner.timer = Some(ActiveTimer { id, epoch });
        tracing::debug!(timer = %id, ?period, speed = inner.speed, "playback timer started");
        Ok(())
    }

    /// Call without holding `inner`.
    fn report_timer_failure(&self, err: &ReplayError) {
        tracing::warn!(error = %err, "playback timer could not start");
        self.report(
            &Violation::new(
                ViolationSeverity::Error,
                ViolationKind::InternalError,
                "playback timer could not start, staying paused",
                concat!(file!(), ":", line!()),
            )
            .with_context("error", err.to_string()),
        );
    }

    fn stop_timer(&self, inner: &mut PlaybackInner) {
        if let Some(timer) = inner.timer.take() {
            self.scheduler.cancel(timer.id);
            tracing::debug!(timer = %timer.id, "playback timer stopped");
        }
    }

    fn on_tick(&self, epoch: u64) {
        let mut inner = self.inner.lock();
        if inner.timer.map(|t| t.epoch) != Some(epoch) {
            tracing::trace!(epoch, "ignoring tick from a replaced timer");
            return;
        }

        let total = inner.total();
        if total == 0 {
            self.stop_timer(&mut inner);
            drop(inner);
            self.report(&Violation::new(
                ViolationSeverity::Warning,
                ViolationKind::Playback,
                "timer fired with no frames loaded",
                concat!(file!(), ":", line!()),
            ));
            return;
        }

        let last = total - 1;
        let next = inner.current.saturating_add(1);
        if next >= last {
            inner.set_current(last);
            self.stop_timer(&mut inner);
            tracing::debug!(index = last, "reached last frame, playback paused");
        } else {
            inner.set_current(next);
            tracing::trace!(index = next, "tick");
        }
        crate::debug_check_invariants!(inner, "tick");
    }

    fn install(&self, inner: &mut PlaybackInner, document: ReplayDocument, match_id: Option<MatchId>) {
        self.stop_timer(inner);
        let frames = document.len();
        let summary = document.metadata().and_then(ReplayMetadata::summary);
        inner.document = Some(Arc::new(document));
        inner.current = 0;
        inner.revision += 1;
        inner.load_status = LoadStatus::Loaded { match_id };
        tracing::info!(frames, metadata = summary.as_deref().unwrap_or("none"), "replay loaded");
    }
}

impl Drop for Shared {
    fn drop(&mut self) {
        if let Some(timer) = self.inner.get_mut().timer.take() {
            self.scheduler.cancel(timer.id);
        }
    }
}

/// Deterministic playback of one replay at a time.
///
/// The controller is a cheap, cloneable handle; all clones drive the same
/// playback. Every method takes `&self` and may be called from any thread.
/// When the last handle is dropped, the running timer (if any) is cancelled.
///
/// # Example
///
/// ```
/// use arena_replay::{Frame, ManualScheduler, PlaybackState, ReplayController, ReplayDocument};
/// use std::sync::Arc;
///
/// let scheduler = Arc::new(ManualScheduler::new());
/// let controller = ReplayController::new(scheduler.clone());
///
/// let frames = (0..10).map(|i| Frame::pong([0.5, 0.5], [0.5, 0.5], [i, 0])).collect();
/// controller.load(ReplayDocument::new(frames));
/// assert_eq!(controller.state(), PlaybackState::Paused);
///
/// controller.play();
/// scheduler.tick_all();
/// scheduler.tick_all();
/// assert_eq!(controller.current_index(), 2);
///
/// controller.seek(-5);
/// assert_eq!(controller.current_index(), 0);
/// assert!(controller.is_playing());
/// ```
#[derive(Clone)]
pub struct ReplayController {
    shared: Arc<Shared>,
}

impl ReplayController {
    /// Creates a controller with the default [`PlaybackConfig`].
    #[must_use]
    pub fn new(scheduler: Arc<dyn Scheduler>) -> Self {
        Self::from_parts(scheduler, PlaybackConfig::default(), None)
    }

    /// Starts a [`ControllerBuilder`].
    pub fn builder() -> ControllerBuilder {
        ControllerBuilder::new()
    }

    pub(crate) fn from_parts(
        scheduler: Arc<dyn Scheduler>,
        config: PlaybackConfig,
        observer: Option<Arc<dyn ViolationObserver>>,
    ) -> Self {
        Self {
            shared: Arc::new(Shared {
                inner: Mutex::new(PlaybackInner::new(config.default_speed)),
                scheduler,
                config,
                observer,
            }),
        }
    }

    // ---- document lifecycle -------------------------------------------------

    /// Installs `document`, rewinding to frame 0 in the paused state.
    ///
    /// Any running timer is cancelled first and any pending load ticket becomes
    /// stale. The speed is kept. An empty document is accepted; playback is then
    /// a no-op.
    pub fn load(&self, document: ReplayDocument) {
        let mut inner = self.shared.inner.lock();
        inner.load_generation += 1;
        self.shared.install(&mut inner, document, None);
        crate::debug_check_invariants!(inner, "load");
    }

    /// Marks a fetch of `match_id` as in flight.
    ///
    /// The current document keeps playing until the result is installed.
    pub fn begin_load(&self, match_id: MatchId) -> LoadTicket {
        let mut inner = self.shared.inner.lock();
        inner.load_generation += 1;
        inner.load_status = LoadStatus::Loading {
            match_id: match_id.clone(),
        };
        tracing::info!(match_id = %match_id, "replay load started");
        LoadTicket {
            generation: inner.load_generation,
            match_id,
        }
    }

    /// Finishes a load started with [`begin_load`](Self::begin_load).
    ///
    /// On success the document is installed as by [`load`](Self::load). On
    /// failure the status becomes [`LoadStatus::Failed`] and the previously
    /// installed document, if any, stays in place.
    ///
    /// # Errors
    ///
    /// - [`ReplayError::StaleLoad`] if the ticket was superseded; nothing changes.
    /// - The loader's error, unchanged, if `result` is an error.
    pub fn complete_load(
        &self,
        ticket: LoadTicket,
        result: ReplayResult<ReplayDocument>,
    ) -> ReplayResult<()> {
        let mut inner = self.shared.inner.lock();
        if ticket.generation != inner.load_generation {
            drop(inner);
            self.shared.report(
                &Violation::new(
                    ViolationSeverity::Warning,
                    ViolationKind::Playback,
                    "discarded result of a superseded load",
                    concat!(file!(), ":", line!()),
                )
                .with_context("match_id", ticket.match_id.as_str()),
            );
            return Err(ReplayError::StaleLoad {
                match_id: ticket.match_id.to_string(),
            });
        }

        match result {
            Ok(document) => {
                self.shared
                    .install(&mut inner, document, Some(ticket.match_id));
                crate::debug_check_invariants!(inner, "complete_load");
                Ok(())
            },
            Err(error) => {
                inner.load_status = LoadStatus::Failed {
                    match_id: ticket.match_id.clone(),
                    error: error.clone(),
                };
                drop(inner);
                self.shared.report(
                    &Violation::new(
                        ViolationSeverity::Error,
                        ViolationKind::Loading,
                        error.to_string(),
                        concat!(file!(), ":", line!()),
                    )
                    .with_context("match_id", ticket.match_id.as_str()),
                );
                Err(error)
            },
        }
    }

    /// Fetches `match_id` from `loader` and installs it.
    ///
    /// The fetch runs on the calling thread without holding the playback lock,
    /// so other handles keep working while it blocks.
    ///
    /// # Errors
    ///
    /// See [`complete_load`](Self::complete_load).
    pub fn load_from<L>(&self, loader: &L, match_id: &MatchId) -> ReplayResult<()>
    where
        L: ReplayLoader + ?Sized,
    {
        let ticket = self.begin_load(match_id.clone());
        let result = loader.fetch_replay(match_id);
        self.complete_load(ticket, result)
    }

    /// Pauses, discards the document and restores every setting to its initial
    /// value, including speed and load status. Pending load tickets go stale.
    pub fn clear(&self) {
        let mut inner = self.shared.inner.lock();
        self.shared.stop_timer(&mut inner);
        let had_document = inner.document.take().is_some();
        inner.current = 0;
        inner.speed = self.shared.config.default_speed;
        inner.load_status = LoadStatus::Idle;
        inner.load_generation += 1;
        inner.revision += 1;
        tracing::debug!(had_document, "playback cleared");
        crate::debug_check_invariants!(inner, "clear");
    }

    /// Pauses, rewinds to frame 0 and restores the default speed, keeping the document.
    pub fn reset(&self) {
        let mut inner = self.shared.inner.lock();
        self.shared.stop_timer(&mut inner);
        inner.set_current(0);
        inner.speed = self.shared.config.default_speed;
        tracing::debug!("playback reset");
        crate::debug_check_invariants!(inner, "reset");
    }

    // ---- transport ----------------------------------------------------------

    /// Starts advancing one frame per tick.
    ///
    /// Does nothing if already playing or if there are no frames.
    pub fn play(&self) {
        let mut inner = self.shared.inner.lock();
        if inner.timer.is_some() {
            return;
        }
        if inner.total() == 0 {
            tracing::debug!("play ignored: no frames loaded");
            return;
        }
        if let Err(err) = self.shared.start_timer(&mut inner) {
            drop(inner);
            self.shared.report_timer_failure(&err);
            return;
        }
        crate::debug_check_invariants!(inner, "play");
    }

    /// Stops advancing. Idempotent.
    pub fn pause(&self) {
        let mut inner = self.shared.inner.lock();
        self.shared.stop_timer(&mut inner);
    }

    /// Pauses if playing, plays otherwise. Returns the resulting state.
    pub fn toggle(&self) -> PlaybackState {
        let mut inner = self.shared.inner.lock();
        if inner.timer.is_some() {
            self.shared.stop_timer(&mut inner);
        } else if inner.total() > 0 {
            if let Err(err) = self.shared.start_timer(&mut inner) {
                drop(inner);
                self.shared.report_timer_failure(&err);
                return PlaybackState::Paused;
            }
        }
        inner.state()
    }

    /// Jumps to `index`, clamped to the loaded frames.
    ///
    /// Any integer is accepted: negative values go to the first frame and values
    /// past the end go to the last. Playing continues from the new position.
    /// Does nothing when no frames are loaded.
    pub fn seek(&self, index: i64) {
        let mut inner = self.shared.inner.lock();
        let total = inner.total();
        if total == 0 {
            return;
        }
        let target = if index < 0 {
            0
        } else {
            usize::try_from(index).unwrap_or(usize::MAX).min(total - 1)
        };
        inner.set_current(target);
        tracing::trace!(requested = index, index = target, "seek");
        crate::debug_check_invariants!(inner, "seek");
    }

    /// Changes the speed multiplier.
    ///
    /// While playing, the timer is replaced within the same critical section, so
    /// the controller is never observed paused.
    ///
    /// # Errors
    ///
    /// Returns [`ReplayError::InvalidSpeed`] if `multiplier` is not one of the
    /// configured speeds. Nothing changes in that case.
    ///
    /// Returns the scheduler's error if the replacement timer cannot start. The
    /// new speed is kept and playback is left paused.
    pub fn set_speed(&self, multiplier: f64) -> ReplayResult<()> {
        if !self.shared.config.is_allowed_speed(multiplier) {
            return Err(ReplayError::InvalidSpeed {
                requested: multiplier,
                allowed: self.shared.config.speeds.clone(),
            });
        }

        let mut inner = self.shared.inner.lock();
        if inner.speed == multiplier {
            return Ok(());
        }
        inner.speed = multiplier;
        if inner.timer.is_some() {
            self.shared.stop_timer(&mut inner);
            if let Err(err) = self.shared.start_timer(&mut inner) {
                drop(inner);
                self.shared.report_timer_failure(&err);
                return Err(err);
            }
        }
        tracing::debug!(speed = multiplier, "playback speed changed");
        Ok(())
    }

    // ---- queries ------------------------------------------------------------

    /// The frame at the current index, or `None` when nothing is loaded.
    #[must_use]
    pub fn current_frame(&self) -> Option<Frame> {
        self.shared.inner.lock().frame().cloned()
    }

    /// The current frame together with its index and revision, read atomically.
    #[must_use]
    pub fn frame_view(&self) -> FrameView {
        let inner = self.shared.inner.lock();
        FrameView {
            revision: inner.revision,
            index: inner.current,
            frame: inner.frame().cloned(),
        }
    }

    /// Number of loaded frames.
    #[must_use]
    pub fn total_frames(&self) -> usize {
        self.shared.inner.lock().total()
    }

    /// Current frame index; `0` when empty.
    #[must_use]
    pub fn current_index(&self) -> usize {
        self.shared.inner.lock().current
    }

    /// Active speed multiplier.
    #[must_use]
    pub fn speed(&self) -> f64 {
        self.shared.inner.lock().speed
    }

    /// Returns `true` while a timer is running.
    #[must_use]
    pub fn is_playing(&self) -> bool {
        self.shared.inner.lock().timer.is_some()
    }

    /// Coarse state.
    #[must_use]
    pub fn state(&self) -> PlaybackState {
        self.shared.inner.lock().state()
    }

    /// Returns `true` at frame 0, including when nothing is loaded.
    #[must_use]
    pub fn is_at_start(&self) -> bool {
        self.shared.inner.lock().current == 0
    }

    /// Returns `true` at the last frame, including when nothing is loaded.
    #[must_use]
    pub fn is_at_end(&self) -> bool {
        let inner = self.shared.inner.lock();
        inner.current + 1 >= inner.total()
    }

    /// Progress of the most recent load.
    #[must_use]
    pub fn load_status(&self) -> LoadStatus {
        self.shared.inner.lock().load_status.clone()
    }

    /// Metadata of the loaded replay.
    #[must_use]
    pub fn metadata(&self) -> Option<ReplayMetadata> {
        self.shared
            .inner
            .lock()
            .document
            .as_ref()
            .and_then(|doc| doc.metadata().cloned())
    }

    /// The loaded document.
    #[must_use]
    pub fn document(&self) -> Option<Arc<ReplayDocument>> {
        self.shared.inner.lock().document.clone()
    }

    /// Counter bumped whenever the frame a viewer should display changes.
    #[must_use]
    pub fn revision(&self) -> u64 {
        self.shared.inner.lock().revision
    }

    /// The whole playback state, read atomically.
    #[must_use]
    pub fn snapshot(&self) -> PlaybackSnapshot {
        let inner = self.shared.inner.lock();
        PlaybackSnapshot {
            state: inner.state(),
            current_index: inner.current,
            total_frames: inner.total(),
            speed: inner.speed,
            load_status: inner.load_status.clone(),
            revision: inner.revision,
        }
    }

    /// Time between ticks at the current speed.
    #[must_use]
    pub fn tick_period(&self) -> Duration {
        let speed = self.shared.inner.lock().speed;
        self.shared.config.tick_period(speed)
    }

    /// Speed multipliers accepted by [`set_speed`](Self::set_speed).
    #[must_use]
    pub fn allowed_speeds(&self) -> &[f64] {
        &self.shared.config.speeds
    }

    /// The playback configuration.
    #[must_use]
    pub fn config(&self) -> &PlaybackConfig {
        &self.shared.config
    }
}

impl fmt::Debug for ReplayController {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let snapshot = self.snapshot();
        f.debug_struct("ReplayController")
            .field("state", &snapshot.state)
            .field("current_index", &snapshot.current_index)
            .field("total_frames", &snapshot.total_frames)
            .field("speed", &snapshot.speed)
            .field("revision", &snapshot.revision)
            .finish()
    }
}
