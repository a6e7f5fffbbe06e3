use std::error::Error;
use std::fmt;
use std::fmt::Display;

/// Why a replay document could not be fetched or decoded.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum LoadFailureKind {
    /// The loader has no replay for the requested match.
    NotFound,
    /// The transport failed (connection refused, bad status, I/O error).
    Network,
    /// The loader gave up waiting for a response.
    Timeout,
    /// A response arrived but was not a valid replay document.
    Decode,
}

impl LoadFailureKind {
    /// Returns a short label suitable for logs and UI messages.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::NotFound => "not found",
            Self::Network => "network error",
            Self::Timeout => "timed out",
            Self::Decode => "malformed replay",
        }
    }
}

impl Display for LoadFailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// This enum contains all error messages this library can return. Most API functions will generally return a [`Result<(), ReplayError>`].
///
/// Malformed frames and out-of-range seeks are deliberately absent: the renderer
/// falls back to an indicator for the former and the controller clamps the latter.
///
/// [`Result<(), ReplayError>`]: std::result::Result
#[derive(Debug, Clone, PartialEq)]
pub enum ReplayError {
    /// The replay loader rejected the request or timed out. No document was installed.
    LoadFailure {
        /// The match whose replay was requested.
        match_id: String,
        /// The category of failure.
        kind: LoadFailureKind,
        /// Further details from the loader.
        context: String,
    },
    /// A load completed after it was superseded by a newer load, a direct
    /// [`load`](crate::ReplayController::load) or a [`clear`](crate::ReplayController::clear).
    StaleLoad {
        /// The match whose (now discarded) result arrived late.
        match_id: String,
    },
    /// The requested playback speed is not one of the configured speeds.
    InvalidSpeed {
        /// The rejected multiplier.
        requested: f64,
        /// The multipliers that would have been accepted.
        allowed: Vec<f64>,
    },
    /// A configuration value was rejected.
    InvalidConfig {
        /// Further specifies what was wrong.
        info: String,
    },
    /// You made an invalid request, usually by using wrong parameters for function calls.
    InvalidRequest {
        /// Further specifies why the request was invalid.
        info: String,
    },
    /// A drawing surface could not be created or exported.
    SurfaceError {
        /// A description of what failed.
        context: String,
    },
    /// An internal error occurred that should not happen under normal operation.
    /// If you encounter this error, please report it as a bug.
    InternalError {
        /// A description of the internal error.
        context: String,
    },
}

impl ReplayError {
    /// Shorthand for building a [`ReplayError::LoadFailure`].
    pub fn load_failure(
        match_id: impl Into<String>,
        kind: LoadFailureKind,
        context: impl Into<String>,
    ) -> Self {
        Self::LoadFailure {
            match_id: match_id.into(),
            kind,
            context: context.into(),
        }
    }

    /// Returns the load failure kind if this is a [`ReplayError::LoadFailure`].
    #[must_use]
    pub const fn load_failure_kind(&self) -> Option<LoadFailureKind> {
        match self {
            Self::LoadFailure { kind, .. } => Some(*kind),
            _ => None,
        }
    }
}

impl Display for ReplayError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReplayError::LoadFailure {
                match_id,
                kind,
                context,
            } => {
                write!(
                    f,
                    "Failed to load replay for match {}: {} ({})",
                    match_id, kind, context
                )
            }
            ReplayError::StaleLoad { match_id } => {
                write!(
                    f,
                    "Replay for match {} arrived after the load was superseded",
                    match_id
                )
            }
            ReplayError::InvalidSpeed { requested, allowed } => {
                write!(
                    f,
                    "Invalid playback speed {}: allowed speeds are {:?}",
                    requested, allowed
                )
            }
            ReplayError::InvalidConfig { info } => {
                write!(f, "Invalid configuration: {}", info)
            }
            ReplayError::InvalidRequest { info } => {
                write!(f, "Invalid Request: {}", info)
            }
            ReplayError::SurfaceError { context } => {
                write!(f, "Surface error: {}", context)
            }
            ReplayError::InternalError { context } => {
                write!(f, "Internal error (please report as bug): {}", context)
            }
        }
    }
}

impl Error for ReplayError {}

/// Convenience alias used throughout the crate.
pub type ReplayResult<T> = Result<T, ReplayError>;
