//! Configuration types for replay playback and rendering.
//!
//! # Overview
//!
//! | Config Type | Purpose | Key Presets |
//! |-------------|---------|-------------|
//! | `PlaybackConfig` | Frame rate and the allowed speed multipliers | `extended()` |
//! | `RenderConfig` | Court geometry, font sizes and colors | `high_contrast()` |
//!
//! # Example
//!
//! ```
//! use arena_replay::{ControllerBuilder, ManualScheduler, PlaybackConfig};
//! use std::sync::Arc;
//!
//! let controller = ControllerBuilder::new()
//!     .with_playback_config(PlaybackConfig::extended())
//!     .build(Arc::new(ManualScheduler::new()))
//!     .unwrap();
//! assert_eq!(controller.allowed_speeds(), &[0.25, 0.5, 1.0, 2.0, 4.0]);
//! ```

use web_time::Duration;

use crate::render::Color;
use crate::{ReplayError, ReplayResult};

/// Frame rate used when nothing else is configured.
pub const DEFAULT_FRAME_RATE: u32 = 30;

/// Highest frame rate accepted by [`PlaybackConfig::validate`].
pub const MAX_FRAME_RATE: u32 = 240;

/// Speed multipliers offered by default.
pub const DEFAULT_SPEEDS: [f64; 3] = [0.5, 1.0, 2.0];

/// Configuration for the playback clock.
///
/// The tick period for a speed `s` is `1 / (frame_rate * s)` seconds, so the
/// defaults give 33.3ms at 1x, 66.7ms at 0.5x and 16.7ms at 2x.
///
/// # Forward Compatibility
///
/// New fields may be added to this struct in future versions. Use the
/// `..PlaybackConfig::default()` pattern when constructing instances.
///
/// # Example
///
/// ```
/// use arena_replay::PlaybackConfig;
///
/// let slow_motion = PlaybackConfig {
///     speeds: vec![0.1, 0.25, 1.0],
///     ..PlaybackConfig::default()
/// };
/// assert!(slow_motion.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq)]
#[must_use = "PlaybackConfig has no effect unless passed to ControllerBuilder::with_playback_config()"]
pub struct PlaybackConfig {
    /// Recorded frames per second at 1x speed.
    ///
    /// Default: 30
    pub frame_rate: u32,

    /// Speed multipliers a viewer may select, in display order.
    ///
    /// Default: `[0.5, 1.0, 2.0]`
    pub speeds: Vec<f64>,

    /// Speed used after construction, [`clear`](crate::ReplayController::clear)
    /// and [`reset`](crate::ReplayController::reset). Must be one of `speeds`.
    ///
    /// Default: 1.0
    pub default_speed: f64,
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self {
            frame_rate: DEFAULT_FRAME_RATE,
            speeds: DEFAULT_SPEEDS.to_vec(),
            default_speed: 1.0,
        }
    }
}

impl PlaybackConfig {
    /// Creates a new `PlaybackConfig` with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Preset with quarter-speed and 4x on top of the defaults.
    pub fn extended() -> Self {
        Self {
            speeds: vec![0.25, 0.5, 1.0, 2.0, 4.0],
            ..Self::default()
        }
    }

    /// Returns `true` if `speed` is one of the configured multipliers.
    #[must_use]
    pub fn is_allowed_speed(&self, speed: f64) -> bool {
        self.speeds.iter().any(|&allowed| allowed == speed)
    }

    /// Time between frames at 1x speed.
    #[must_use]
    pub fn base_frame_period(&self) -> Duration {
        period_for(f64::from(self.frame_rate.max(1)))
    }

    /// Time between ticks at the given speed multiplier, truncated to whole
    /// nanoseconds so that `n` ticks never take longer than `n` frames.
    ///
    /// Speeds are validated before they reach this point; a non-positive or
    /// non-finite value yields the 1x period.
    #[must_use]
    pub fn tick_period(&self, speed: f64) -> Duration {
        if !(speed.is_finite() && speed > 0.0) {
            return self.base_frame_period();
        }
        period_for(f64::from(self.frame_rate.max(1)) * speed)
    }

    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ReplayError::InvalidConfig`] if the frame rate is outside
    /// `1..=240`, the speed list is empty, contains a non-positive, non-finite
    /// or duplicated entry, or does not contain `default_speed`.
    pub fn validate(&self) -> ReplayResult<()> {
        if self.frame_rate == 0 || self.frame_rate > MAX_FRAME_RATE {
            return Err(ReplayError::InvalidConfig {
                info: format!(
                    "frame_rate must be in 1..={}, got {}",
                    MAX_FRAME_RATE, self.frame_rate
                ),
            });
        }

        if self.speeds.is_empty() {
            return Err(ReplayError::InvalidConfig {
                info: "at least one playback speed is required".to_owned(),
            });
        }

        for (i, &speed) in self.speeds.iter().enumerate() {
            if !(speed.is_finite() && speed > 0.0) {
                return Err(ReplayError::InvalidConfig {
                    info: format!("playback speed must be positive and finite, got {}", speed),
                });
            }
            if self.speeds[..i].contains(&speed) {
                return Err(ReplayError::InvalidConfig {
                    info: format!("playback speed {} listed twice", speed),
                });
            }
        }

        if !self.is_allowed_speed(self.default_speed) {
            return Err(ReplayError::InvalidConfig {
                info: format!(
                    "default speed {} is not one of {:?}",
                    self.default_speed, self.speeds
                ),
            });
        }

        Ok(())
    }
}

/// Geometry and palette for [`FrameRenderer`](crate::FrameRenderer).
///
/// All lengths are in surface pixels. Positions from the replay are normalized
/// and multiplied by the surface size at draw time; everything here is absolute.
#[derive(Debug, Clone, Copy, PartialEq)]
#[must_use = "RenderConfig has no effect unless passed to FrameRenderer::new()"]
pub struct RenderConfig {
    /// Paddle width. Default: 10
    pub paddle_width: f32,
    /// Paddle height, centered on the paddle's y position. Default: 60
    pub paddle_height: f32,
    /// Left edge of the left paddle. Default: 20
    pub left_paddle_x: f32,
    /// Distance from the right edge of the surface to the right paddle's left edge. Default: 30
    pub right_paddle_inset: f32,
    /// Ball radius. Default: 8
    pub ball_radius: f32,
    /// Width of the dashed center line. Default: 2
    pub center_line_width: f32,
    /// Length of each dash. Default: 10
    pub center_dash: f32,
    /// Gap between dashes. Default: 10
    pub center_gap: f32,
    /// Width of the court border. Default: 3
    pub border_width: f32,
    /// Score text size. Default: 48
    pub score_font_size: f32,
    /// Score text baseline, measured from the top. Default: 60
    pub score_baseline: f32,
    /// Size of the "no frame data" text. Default: 20
    pub no_data_font_size: f32,
    /// Size of the "invalid frame structure" text. Default: 16
    pub invalid_font_size: f32,

    /// Court background. Default: `#1a1a2e`
    pub background: Color,
    /// Background for the no-data and invalid-structure indicators. Default: `#333333`
    pub placeholder_background: Color,
    /// Text color of the no-data indicator. Default: white
    pub placeholder_text: Color,
    /// Text and border color of the invalid-structure indicator. Default: `#ffb020`
    pub invalid_accent: Color,
    /// Center line and border. Default: `#444466`
    pub court_lines: Color,
    /// Left paddle and score. Default: `#00ff88`
    pub left_player: Color,
    /// Right paddle and score. Default: `#ff0088`
    pub right_player: Color,
    /// Ball. Default: white
    pub ball: Color,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            paddle_width: 10.0,
            paddle_height: 60.0,
            left_paddle_x: 20.0,
            right_paddle_inset: 30.0,
            ball_radius: 8.0,
            center_line_width: 2.0,
            center_dash: 10.0,
            center_gap: 10.0,
            border_width: 3.0,
            score_font_size: 48.0,
            score_baseline: 60.0,
            no_data_font_size: 20.0,
            invalid_font_size: 16.0,
            background: Color::from_hex(0x1a1a2e),
            placeholder_background: Color::from_hex(0x333333),
            placeholder_text: Color::WHITE,
            invalid_accent: Color::from_hex(0xffb020),
            court_lines: Color::from_hex(0x444466),
            left_player: Color::from_hex(0x00ff88),
            right_player: Color::from_hex(0xff0088),
            ball: Color::WHITE,
        }
    }
}

impl RenderConfig {
    /// Creates a new `RenderConfig` with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Black court with white lines, for projectors and screenshots.
    pub fn high_contrast() -> Self {
        Self {
            background: Color::BLACK,
            court_lines: Color::WHITE,
            border_width: 4.0,
            center_line_width: 3.0,
            ..Self::default()
        }
    }

    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ReplayError::InvalidConfig`] if any length is negative or not
    /// finite, or if a paddle, ball or font size is zero.
    pub fn validate(&self) -> ReplayResult<()> {
        let strictly_positive = [
            ("paddle_width", self.paddle_width),
            ("paddle_height", self.paddle_height),
            ("ball_radius", self.ball_radius),
            ("center_dash", self.center_dash),
            ("score_font_size", self.score_font_size),
            ("no_data_font_size", self.no_data_font_size),
            ("invalid_font_size", self.invalid_font_size),
        ];
        for (field, value) in strictly_positive {
            if !(value.is_finite() && value > 0.0) {
                return Err(ReplayError::InvalidConfig {
                    info: format!("{} must be positive and finite, got {}", field, value),
                });
            }
        }

        let non_negative = [
            ("left_paddle_x", self.left_paddle_x),
            ("right_paddle_inset", self.right_paddle_inset),
            ("center_line_width", self.center_line_width),
            ("center_gap", self.center_gap),
            ("border_width", self.border_width),
            ("score_baseline", self.score_baseline),
        ];
        for (field, value) in non_negative {
            if !(value.is_finite() && value >= 0.0) {
                return Err(ReplayError::InvalidConfig {
                    info: format!("{} must be non-negative and finite, got {}", field, value),
                });
            }
        }

        Ok(())
    }
}

fn period_for(ticks_per_second: f64) -> Duration {
    Duration::from_nanos((1_000_000_000.0 / ticks_per_second) as u64)
}
