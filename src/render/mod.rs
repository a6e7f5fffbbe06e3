//! Frame rendering.
//!
//! [`FrameRenderer`] maps one frame onto any [`DrawSurface`]. It holds no state
//! between calls: every call repaints the whole surface from the frame and the
//! [`RenderConfig`] alone, so rendering the same frame twice produces identical
//! output.
//!
//! Two surfaces ship with the crate:
//!
//! - [`RasterSurface`]: an RGBA pixel buffer that can be exported as PNG
//! - [`RecordingSurface`]: records [`DrawCommand`]s for a retained-mode UI or for tests
//!
//! # Example
//!
//! ```
//! use arena_replay::{Frame, FrameRenderer, RasterSurface, RenderOutcome};
//!
//! let renderer = FrameRenderer::default();
//! let mut surface = RasterSurface::new(800, 450).unwrap();
//! let frame = Frame::pong([0.5, 0.5], [0.5, 0.5], [3, 2]);
//!
//! assert_eq!(renderer.render(Some(&frame), &mut surface), RenderOutcome::Rendered);
//! assert_eq!(renderer.render(None, &mut surface), RenderOutcome::NoData);
//! ```

use std::fmt;
use std::sync::Arc;

use crate::config::RenderConfig;
use crate::document::{Frame, FrameField, PongState};
use crate::telemetry::{Violation, ViolationKind, ViolationObserver, ViolationSeverity};
use crate::{ReplayError, ReplayResult};

mod glyphs;
mod raster;
mod recording;

pub use raster::RasterSurface;
pub use recording::{DrawCommand, RecordingSurface};

/// Surface width used by the viewer when none is given.
pub const DEFAULT_SURFACE_WIDTH: u32 = 800;
/// Surface height used by the viewer when none is given.
pub const DEFAULT_SURFACE_HEIGHT: u32 = 450;
/// Largest width or height a surface may have.
pub const MAX_SURFACE_DIMENSION: u32 = 16_384;

/// Text shown when there is no frame to draw.
pub const NO_DATA_TEXT: &str = "No frame data";
/// Text shown when a frame is present but cannot be drawn.
pub const INVALID_STRUCTURE_TEXT: &str = "Invalid frame structure";

/// An RGBA color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Color {
    /// Red channel.
    pub r: u8,
    /// Green channel.
    pub g: u8,
    /// Blue channel.
    pub b: u8,
    /// Alpha channel, 255 is opaque.
    pub a: u8,
}

impl Color {
    /// Opaque white.
    pub const WHITE: Self = Self::rgb(0xff, 0xff, 0xff);
    /// Opaque black.
    pub const BLACK: Self = Self::rgb(0, 0, 0);

    /// An opaque color from its channels.
    #[inline]
    #[must_use]
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 0xff }
    }

    /// An opaque color from `0xRRGGBB`.
    ///
    /// ```
    /// use arena_replay::Color;
    ///
    /// assert_eq!(Color::from_hex(0x00ff88), Color::rgb(0x00, 0xff, 0x88));
    /// ```
    #[inline]
    #[must_use]
    pub const fn from_hex(hex: u32) -> Self {
        Self::rgb((hex >> 16) as u8, (hex >> 8) as u8, hex as u8)
    }

    /// The same color with a different alpha.
    #[inline]
    #[must_use]
    pub const fn with_alpha(self, a: u8) -> Self {
        Self { a, ..self }
    }

    /// Channels in `[r, g, b, a]` order.
    #[inline]
    #[must_use]
    pub const fn to_rgba(self) -> [u8; 4] {
        [self.r, self.g, self.b, self.a]
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)?;
        if self.a != 0xff {
            write!(f, "{:02x}", self.a)?;
        }
        Ok(())
    }
}

/// A position in surface pixels, origin at the top-left corner.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    /// Horizontal position.
    pub x: f32,
    /// Vertical position, growing downwards.
    pub y: f32,
}

impl Point {
    /// Creates a point.
    #[inline]
    #[must_use]
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// An axis-aligned rectangle in surface pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rect {
    /// Left edge.
    pub x: f32,
    /// Top edge.
    pub y: f32,
    /// Width.
    pub width: f32,
    /// Height.
    pub height: f32,
}

impl Rect {
    /// Creates a rectangle from its top-left corner and size.
    #[inline]
    #[must_use]
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Right edge.
    #[inline]
    #[must_use]
    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    /// Bottom edge.
    #[inline]
    #[must_use]
    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }
}

/// Horizontal placement of text relative to its anchor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum TextAlign {
    /// The anchor is the left end of the text.
    #[default]
    Left,
    /// The anchor is the middle of the text.
    Center,
    /// The anchor is the right end of the text.
    Right,
}

/// A fixed-size 2D target the renderer paints onto.
///
/// Coordinates are in pixels with the origin at the top-left. Shapes that extend
/// past the edges are clipped. Text is anchored at its baseline.
pub trait DrawSurface {
    /// Width in pixels, fixed at construction.
    fn width(&self) -> u32;

    /// Height in pixels, fixed at construction.
    fn height(&self) -> u32;

    /// Paints the whole surface with `color`.
    fn fill_background(&mut self, color: Color);

    /// Fills an axis-aligned rectangle.
    fn fill_rect(&mut self, rect: Rect, color: Color);

    /// Fills a circle.
    fn fill_circle(&mut self, center: Point, radius: f32, color: Color);

    /// Draws a single line of text with its baseline at `anchor.y`.
    fn draw_text(&mut self, text: &str, anchor: Point, size: f32, align: TextAlign, color: Color);
}

/// Checks that a surface size is usable.
///
/// # Errors
///
/// Returns [`ReplayError::InvalidRequest`] if either dimension is zero or
/// larger than [`MAX_SURFACE_DIMENSION`].
pub fn validate_surface_size(width: u32, height: u32) -> ReplayResult<()> {
    if width == 0 || height == 0 || width > MAX_SURFACE_DIMENSION || height > MAX_SURFACE_DIMENSION
    {
        return Err(ReplayError::InvalidRequest {
            info: format!(
                "surface size must be between 1x1 and {max}x{max}, got {}x{}",
                width,
                height,
                max = MAX_SURFACE_DIMENSION
            ),
        });
    }
    Ok(())
}

/// What [`FrameRenderer::render`] ended up drawing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenderOutcome {
    /// The frame was drawn.
    Rendered,
    /// There was no frame; the no-data placeholder was drawn.
    NoData,
    /// The frame lacked required fields; the invalid-structure indicator was drawn.
    InvalidStructure(Vec<FrameField>),
}

impl RenderOutcome {
    /// Returns `true` if an actual frame was drawn.
    #[must_use]
    pub fn is_rendered(&self) -> bool {
        matches!(self, Self::Rendered)
    }
}

/// Paints frames onto a [`DrawSurface`].
///
/// The renderer never fails. Absent frames produce a neutral placeholder and
/// malformed frames produce a distinct indicator plus a
/// [`ViolationKind::FrameStructure`] warning, reported to the configured
/// observer or to tracing.
#[derive(Clone, Default)]
pub struct FrameRenderer {
    config: RenderConfig,
    observer: Option<Arc<dyn ViolationObserver>>,
}

impl FrameRenderer {
    /// Creates a renderer with a custom configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ReplayError::InvalidConfig`] if `config` fails validation.
    pub fn new(config: RenderConfig) -> ReplayResult<Self> {
        config.validate()?;
        Ok(Self {
            config,
            observer: None,
        })
    }

    /// Routes invalid-structure warnings to `observer` instead of tracing.
    #[must_use]
    pub fn with_violation_observer(mut self, observer: Arc<dyn ViolationObserver>) -> Self {
        self.observer = Some(observer);
        self
    }

    /// The active configuration.
    #[must_use]
    pub fn config(&self) -> &RenderConfig {
        &self.config
    }

    /// Repaints `surface` with `frame`.
    pub fn render<S>(&self, frame: Option<&Frame>, surface: &mut S) -> RenderOutcome
    where
        S: DrawSurface + ?Sized,
    {
        self.paint(frame, None, surface)
    }

    /// Like [`render`](Self::render), but tags any telemetry with the frame's
    /// position in its replay.
    pub fn render_indexed<S>(&self, index: usize, frame: Option<&Frame>, surface: &mut S) -> RenderOutcome
    where
        S: DrawSurface + ?Sized,
    {
        self.paint(frame, Some(index), surface)
    }

    fn paint<S>(&self, frame: Option<&Frame>, index: Option<usize>, surface: &mut S) -> RenderOutcome
    where
        S: DrawSurface + ?Sized,
    {
        let Some(frame) = frame else {
            self.draw_no_data(surface);
            return RenderOutcome::NoData;
        };

        match frame.validate() {
            Ok(state) => {
                self.draw_court(&state, surface);
                RenderOutcome::Rendered
            },
            Err(missing) => {
                self.report_invalid(&missing, index);
                self.draw_invalid(surface);
                RenderOutcome::InvalidStructure(missing)
            },
        }
    }

    fn report_invalid(&self, missing: &[FrameField], index: Option<usize>) {
        let fields = missing
            .iter()
            .map(FrameField::as_str)
            .collect::<Vec<_>>()
            .join(",");
        let mut violation = Violation::new(
            ViolationSeverity::Warning,
            ViolationKind::FrameStructure,
            "frame is missing required fields",
            concat!(file!(), ":", line!()),
        )
        .with_context("missing", fields);
        if let Some(index) = index {
            violation = violation.with_frame_index(index);
        }
        crate::telemetry::report_to_observer(self.observer.as_ref(), &violation);
    }

    fn draw_no_data<S: DrawSurface + ?Sized>(&self, surface: &mut S) {
        let c = &self.config;
        let (w, h) = dimensions(surface);
        surface.fill_background(c.placeholder_background);
        surface.draw_text(
            NO_DATA_TEXT,
            Point::new(w / 2.0, h / 2.0),
            c.no_data_font_size,
            TextAlign::Center,
            c.placeholder_text,
        );
    }

    fn draw_invalid<S: DrawSurface + ?Sized>(&self, surface: &mut S) {
        let c = &self.config;
        let (w, h) = dimensions(surface);
        surface.fill_background(c.placeholder_background);
        draw_border(surface, c.border_width, c.invalid_accent);
        surface.draw_text(
            INVALID_STRUCTURE_TEXT,
            Point::new(w / 2.0, h / 2.0),
            c.invalid_font_size,
            TextAlign::Center,
            c.invalid_accent,
        );
    }

    fn draw_court<S: DrawSurface + ?Sized>(&self, state: &PongState, surface: &mut S) {
        let c = &self.config;
        let (w, h) = dimensions(surface);

        surface.fill_background(c.background);

        if c.center_line_width > 0.0 {
            let x = w / 2.0 - c.center_line_width / 2.0;
            let mut y = 0.0;
            while y < h {
                let dash = c.center_dash.min(h - y);
                surface.fill_rect(Rect::new(x, y, c.center_line_width, dash), c.court_lines);
                y += c.center_dash + c.center_gap;
            }
        }

        draw_border(surface, c.border_width, c.court_lines);

        let left_y = state.paddles[0] as f32 * h;
        let right_y = state.paddles[1] as f32 * h;
        surface.fill_rect(
            Rect::new(
                c.left_paddle_x,
                left_y - c.paddle_height / 2.0,
                c.paddle_width,
                c.paddle_height,
            ),
            c.left_player,
        );
        surface.fill_rect(
            Rect::new(
                w - c.right_paddle_inset,
                right_y - c.paddle_height / 2.0,
                c.paddle_width,
                c.paddle_height,
            ),
            c.right_player,
        );

        let ball = Point::new(state.ball[0] as f32 * w, state.ball[1] as f32 * h);
        surface.fill_circle(ball, c.ball_radius, c.ball);

        surface.draw_text(
            &state.score[0].to_string(),
            Point::new(w / 4.0, c.score_baseline),
            c.score_font_size,
            TextAlign::Center,
            c.left_player,
        );
        surface.draw_text(
            &state.score[1].to_string(),
            Point::new(w * 3.0 / 4.0, c.score_baseline),
            c.score_font_size,
            TextAlign::Center,
            c.right_player,
        );
    }
}

fn dimensions<S: DrawSurface + ?Sized>(surface: &S) -> (f32, f32) {
    (surface.width() as f32, surface.height() as f32)
}

/// Paints a frame of `width` pixels just inside the surface edges.
fn draw_border<S: DrawSurface + ?Sized>(surface: &mut S, width: f32, color: Color) {
    if width <= 0.0 {
        return;
    }
    let (w, h) = dimensions(surface);
    surface.fill_rect(Rect::new(0.0, 0.0, w, width), color);
    surface.fill_rect(Rect::new(0.0, h - width, w, width), color);
    surface.fill_rect(Rect::new(0.0, 0.0, width, h), color);
    surface.fill_rect(Rect::new(w - width, 0.0, width, h), color);
}

impl fmt::Debug for FrameRenderer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FrameRenderer")
            .field("config", &self.config)
            .field("has_observer", &self.observer.is_some())
            .finish()
    }
}
