use super::{validate_surface_size, Color, DrawSurface, Point, Rect, TextAlign};
use crate::ReplayResult;

/// One call made against a [`RecordingSurface`].
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    /// [`DrawSurface::fill_background`]
    Background {
        /// Fill color.
        color: Color,
    },
    /// [`DrawSurface::fill_rect`]
    Rect {
        /// Rectangle in surface pixels.
        rect: Rect,
        /// Fill color.
        color: Color,
    },
    /// [`DrawSurface::fill_circle`]
    Circle {
        /// Center in surface pixels.
        center: Point,
        /// Radius in pixels.
        radius: f32,
        /// Fill color.
        color: Color,
    },
    /// [`DrawSurface::draw_text`]
    Text {
        /// The text as given.
        text: String,
        /// Baseline anchor.
        anchor: Point,
        /// Text height in pixels.
        size: f32,
        /// Horizontal alignment around the anchor.
        align: TextAlign,
        /// Text color.
        color: Color,
    },
}

/// A surface that records draw calls instead of rasterizing them.
///
/// Useful for handing frames to a retained-mode UI and for asserting exact
/// geometry in tests. A background fill covers everything drawn before it, so it
/// discards the previously recorded commands.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordingSurface {
    width: u32,
    height: u32,
    commands: Vec<DrawCommand>,
}

impl RecordingSurface {
    /// Creates an empty recording of the given size.
    ///
    /// # Errors
    ///
    /// Returns [`ReplayError::InvalidRequest`](crate::ReplayError::InvalidRequest)
    /// if the size is zero or too large.
    pub fn new(width: u32, height: u32) -> ReplayResult<Self> {
        validate_surface_size(width, height)?;
        Ok(Self {
            width,
            height,
            commands: Vec::new(),
        })
    }

    /// Commands recorded since the last background fill, in call order.
    #[must_use]
    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    /// Takes the recorded commands, leaving the recording empty.
    pub fn take_commands(&mut self) -> Vec<DrawCommand> {
        std::mem::take(&mut self.commands)
    }

    /// All recorded rectangles of the given color.
    #[must_use]
    pub fn rects_with_color(&self, color: Color) -> Vec<Rect> {
        self.commands
            .iter()
            .filter_map(|command| match command {
                DrawCommand::Rect { rect, color: c } if *c == color => Some(*rect),
                _ => None,
            })
            .collect()
    }

    /// All recorded text, in call order.
    #[must_use]
    pub fn texts(&self) -> Vec<&str> {
        self.commands
            .iter()
            .filter_map(|command| match command {
                DrawCommand::Text { text, .. } => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }
}

impl DrawSurface for RecordingSurface {
    fn width(&self) -> u32 {
        self.width
    }

    fn height(&self) -> u32 {
        self.height
    }

    fn fill_background(&mut self, color: Color) {
        self.commands.clear();
        self.commands.push(DrawCommand::Background { color });
    }

    fn fill_rect(&mut self, rect: Rect, color: Color) {
        self.commands.push(DrawCommand::Rect { rect, color });
    }

    fn fill_circle(&mut self, center: Point, radius: f32, color: Color) {
        self.commands.push(DrawCommand::Circle {
            center,
            radius,
            color,
        });
    }

    fn draw_text(&mut self, text: &str, anchor: Point, size: f32, align: TextAlign, color: Color) {
        self.commands.push(DrawCommand::Text {
            text: text.to_owned(),
            anchor,
            size,
            align,
            color,
        });
    }
}
