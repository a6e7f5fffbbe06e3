use std::sync::Arc;

use super::ReplayController;
use crate::config::{PlaybackConfig, MAX_FRAME_RATE};
use crate::scheduler::Scheduler;
use crate::telemetry::ViolationObserver;
use crate::{ReplayError, ReplayResult};

/// The [`ControllerBuilder`] builds [`ReplayController`]s.
///
/// After setting all appropriate values, call [`build`](Self::build) with the
/// scheduler that should drive playback.
///
/// # Example
///
/// ```
/// use arena_replay::{ControllerBuilder, ManualScheduler, telemetry::CollectingObserver};
/// use std::sync::Arc;
///
/// let observer = Arc::new(CollectingObserver::new());
/// let controller = ControllerBuilder::new()
///     .with_frame_rate(60)?
///     .with_speeds(vec![1.0, 2.0, 4.0])
///     .with_violation_observer(observer.clone())
///     .build(Arc::new(ManualScheduler::new()))?;
///
/// assert_eq!(controller.config().frame_rate, 60);
/// # Ok::<(), arena_replay::ReplayError>(())
/// ```
#[must_use = "ControllerBuilder must be consumed by calling build()"]
#[derive(Clone, Default)]
pub struct ControllerBuilder {
    playback: PlaybackConfig,
    /// Optional observer for playback and loading anomalies.
    violation_observer: Option<Arc<dyn ViolationObserver>>,
}

impl ControllerBuilder {
    /// Construct a new builder with all values set to their defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the whole playback configuration. Validated in [`build`](Self::build).
    pub fn with_playback_config(mut self, config: PlaybackConfig) -> Self {
        self.playback = config;
        self
    }

    /// Sets the recorded frame rate.
    ///
    /// # Errors
    ///
    /// Returns [`ReplayError::InvalidConfig`] if `fps` is 0 or above 240.
    pub fn with_frame_rate(mut self, fps: u32) -> ReplayResult<Self> {
        if fps == 0 || fps > MAX_FRAME_RATE {
            return Err(ReplayError::InvalidConfig {
                info: format!("frame_rate must be in 1..={}, got {}", MAX_FRAME_RATE, fps),
            });
        }
        self.playback.frame_rate = fps;
        Ok(self)
    }

    /// Sets the allowed speed multipliers.
    ///
    /// If the current default speed is not in `speeds`, [`build`](Self::build)
    /// fails unless [`with_default_speed`](Self::with_default_speed) fixes it.
    pub fn with_speeds(mut self, speeds: Vec<f64>) -> Self {
        self.playback.speeds = speeds;
        self
    }

    /// Sets the speed used initially and after `reset` or `clear`.
    pub fn with_default_speed(mut self, speed: f64) -> Self {
        self.playback.default_speed = speed;
        self
    }

    /// Sets a custom observer for playback and loading anomalies.
    ///
    /// If no observer is set, violations are logged via the `tracing` crate.
    pub fn with_violation_observer(mut self, observer: Arc<dyn ViolationObserver>) -> Self {
        self.violation_observer = Some(observer);
        self
    }

    /// Consumes the builder to construct a [`ReplayController`].
    ///
    /// # Errors
    ///
    /// Returns [`ReplayError::InvalidConfig`] if the playback configuration
    /// fails [`PlaybackConfig::validate`].
    pub fn build(self, scheduler: Arc<dyn Scheduler>) -> ReplayResult<ReplayController> {
        self.playback.validate()?;
        tracing::debug!(
            frame_rate = self.playback.frame_rate,
            speeds = ?self.playback.speeds,
            default_speed = self.playback.default_speed,
            "replay controller created"
        );
        Ok(ReplayController::from_parts(
            scheduler,
            self.playback,
            self.violation_observer,
        ))
    }
}

impl std::fmt::Debug for ControllerBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let Self {
            playback,
            violation_observer,
        } = self;

        f.debug_struct("ControllerBuilder")
            .field("playback", playback)
            .field("has_violation_observer", &violation_observer.is_some())
            .finish()
    }
}
