//! Convenient re-exports for common usage.
//!
//! ```rust
//! use arena_replay::prelude::*;
//! ```
//!
//! # What's Included
//!
//! - **Playback**: [`ReplayController`], [`ControllerBuilder`], [`PlaybackState`], [`PlaybackSnapshot`], [`LoadStatus`]
//! - **Timers**: [`Scheduler`], [`ManualScheduler`], [`ThreadScheduler`], [`TimerId`]
//! - **Data**: [`ReplayDocument`], [`Frame`], [`FrameInfo`], [`ReplayMetadata`]
//! - **Rendering**: [`FrameRenderer`], [`DrawSurface`], [`RasterSurface`], [`RecordingSurface`], [`RenderOutcome`], [`ReplayViewer`]
//! - **Loading**: [`ReplayLoader`], [`MatchId`], [`DirectoryLoader`], [`InMemoryLoader`]
//! - **Configuration**: [`PlaybackConfig`], [`RenderConfig`]
//! - **Error handling**: [`ReplayError`], [`ReplayResult`]

pub use crate::config::{PlaybackConfig, RenderConfig};
pub use crate::controller::{
    ControllerBuilder, LoadStatus, PlaybackSnapshot, PlaybackState, ReplayController,
};
pub use crate::document::{Frame, FrameInfo, ReplayDocument, ReplayMetadata};
pub use crate::error::{ReplayError, ReplayResult};
pub use crate::loader::{DirectoryLoader, InMemoryLoader, MatchId, ReplayLoader};
pub use crate::render::{
    DrawSurface, FrameRenderer, RasterSurface, RecordingSurface, RenderOutcome,
};
pub use crate::scheduler::{ManualScheduler, Scheduler, ThreadScheduler, TimerId};
pub use crate::viewer::ReplayViewer;

#[cfg(feature = "tokio")]
pub use crate::scheduler::TokioScheduler;
