//! Common test infrastructure shared across integration tests.
//!
//! ```ignore
//! #[path = "common/mod.rs"]
//! mod common;
//! use common::{pong_document, setup};
//! ```


#[allow(unused_imports)]
pub use fixtures::{
    leaky_controller, observed_controller, pong_document, pong_frame, setup, LeakyScheduler,
    SAMPLE_REPLAY_JSON,
};
