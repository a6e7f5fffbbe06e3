//! # Arena Replay
//!
//! Deterministic playback of recorded agent-versus-agent matches.
//!
//! A match replay is an ordered list of frames, each a snapshot of the game at one
//! fixed time step. This crate plays such replays back with pause/resume, seek and
//! variable speed, and renders individual frames onto a 2D surface. It is built
//! around two independent pieces:
//!
//! - [`ReplayController`]: a state machine that owns the playback position and
//!   advances it from a repeating timer supplied by a [`Scheduler`]
//! - [`FrameRenderer`]: a pure mapping from one [`Frame`] to a fully painted
//!   [`DrawSurface`]
//!
//! [`ReplayViewer`] ties them together by repainting whenever the controller's
//! revision changes, and [`ReplayLoader`] implementations fetch documents from
//! disk, memory or (with the `http` feature) the match server.
//!
//! # Example
//!
//! ```
//! use arena_replay::prelude::*;
//! use std::sync::Arc;
//! use web_time::Duration;
//!
//! let scheduler = Arc::new(ManualScheduler::new());
//! let controller = ReplayController::new(scheduler.clone());
//! let mut viewer = ReplayViewer::new(RasterSurface::new(800, 450)?);
//!
//! let frames: Vec<Frame> = (0..90)
//!     .map(|i| Frame::pong([i as f64 / 90.0, 0.5], [0.4, 0.6], [0, 0]))
//!     .collect();
//! controller.load(ReplayDocument::new(frames));
//! controller.play();
//!
//! // One second of virtual time at 30 frames per second.
//! scheduler.advance(Duration::from_secs(1));
//! assert_eq!(controller.current_index(), 30);
//!
//! assert!(viewer.refresh(&controller));
//! # Ok::<(), ReplayError>(())
//! ```
//!
//! # Feature Flags
//!
//! | Feature | Enables |
//! |---------|---------|
//! | `tokio` | `TokioScheduler`, driving timers from a Tokio runtime |
//! | `http` | `HttpReplayLoader`, a blocking `reqwest` client for the match server |

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

pub use config::{PlaybackConfig, RenderConfig};
pub use controller::{
    ControllerBuilder, FrameView, LoadStatus, LoadTicket, PlaybackSnapshot, PlaybackState,
    ReplayController,
};
pub use document::{
    FinalScore, Frame, FrameField, FrameInfo, PongState, ReplayDocument, ReplayMetadata,
};
pub use error::{LoadFailureKind, ReplayError, ReplayResult};
#[cfg(feature = "http")]
pub use loader::HttpReplayLoader;
pub use loader::{DirectoryLoader, InMemoryLoader, MatchId, ReplayLoader};
pub use render::{
    Color, DrawCommand, DrawSurface, FrameRenderer, Point, RasterSurface, RecordingSurface, Rect,
    RenderOutcome, TextAlign,
};
#[cfg(feature = "tokio")]
pub use scheduler::TokioScheduler;
pub use scheduler::{ManualScheduler, Scheduler, ThreadScheduler, TickFn, TimerId};
pub use viewer::ReplayViewer;

pub mod config;
pub mod controller;
pub mod document;
#[doc(hidden)]
pub mod error;
pub mod loader;
pub mod prelude;
pub mod render;
pub mod scheduler;
pub mod telemetry;
#[cfg(test)]
mod test_config;
pub mod viewer;
