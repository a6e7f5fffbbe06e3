//! Glue between a controller and a drawing surface.

use crate::controller::ReplayController;
use crate::render::{DrawSurface, FrameRenderer, RenderOutcome};

/// Keeps a surface in sync with a [`ReplayController`].
///
/// Call [`refresh`](Self::refresh) from the UI loop (once per display frame, or
/// whenever convenient). It repaints only when the controller's revision moved
/// since the last paint, so an idle or paused replay costs nothing.
///
/// # Example
///
/// ```
/// use arena_replay::{Frame, ManualScheduler, RecordingSurface, ReplayController, ReplayDocument, ReplayViewer};
/// use std::sync::Arc;
///
/// let scheduler = Arc::new(ManualScheduler::new());
/// let controller = ReplayController::new(scheduler.clone());
/// let mut viewer = ReplayViewer::new(RecordingSurface::new(800, 450).unwrap());
///
/// assert!(viewer.refresh(&controller));
/// assert!(!viewer.refresh(&controller));
///
/// controller.load(ReplayDocument::new(vec![Frame::pong([0.5, 0.5], [0.5, 0.5], [0, 0])]));
/// assert!(viewer.refresh(&controller));
/// ```
#[derive(Debug)]
pub struct ReplayViewer<S: DrawSurface> {
    renderer: FrameRenderer,
    surface: S,
    last_revision: Option<u64>,
    last_outcome: Option<RenderOutcome>,
}

impl<S: DrawSurface> ReplayViewer<S> {
    /// Creates a viewer with the default renderer.
    pub fn new(surface: S) -> Self {
        Self::with_renderer(FrameRenderer::default(), surface)
    }

    /// Creates a viewer with a custom renderer.
    pub fn with_renderer(renderer: FrameRenderer, surface: S) -> Self {
        Self {
            renderer,
            surface,
            last_revision: None,
            last_outcome: None,
        }
    }

    /// Repaints if the controller moved to a different frame since the last paint.
    ///
    /// Returns `true` if the surface was repainted.
    pub fn refresh(&mut self, controller: &ReplayController) -> bool {
        if self.last_revision == Some(controller.revision()) {
            return false;
        }
        self.render_now(controller);
        true
    }

    /// Repaints unconditionally.
    pub fn render_now(&mut self, controller: &ReplayController) -> &RenderOutcome {
        let view = controller.frame_view();
        let outcome = self
            .renderer
            .render_indexed(view.index, view.frame.as_ref(), &mut self.surface);
        tracing::trace!(revision = view.revision, index = view.index, ?outcome, "viewer repainted");
        self.last_revision = Some(view.revision);
        self.last_outcome.insert(outcome)
    }

    /// What the last paint drew, if anything has been painted.
    #[must_use]
    pub fn last_outcome(&self) -> Option<&RenderOutcome> {
        self.last_outcome.as_ref()
    }

    /// The surface.
    #[must_use]
    pub fn surface(&self) -> &S {
        &self.surface
    }

    /// The surface, mutably. Draw overlays here after a refresh.
    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    /// Consumes the viewer, returning the surface.
    pub fn into_surface(self) -> S {
        self.surface
    }

    /// The renderer.
    #[must_use]
    pub fn renderer(&self) -> &FrameRenderer {
        &self.renderer
    }
}
