//! Structured telemetry for recoverable playback anomalies.
//!
//! Nothing in the playback engine is allowed to crash a viewing session: malformed
//! frames fall back to an indicator, ticks from cancelled timers are dropped, and
//! loader failures become a status. Each of those situations is still worth knowing
//! about, so instead of only logging with `tracing::warn!` they are reported as
//! structured [`Violation`]s that can be:
//!
//! - Logged via tracing (default behavior)
//! - Collected programmatically for testing
//! - Sent to custom observers (metrics, alerting, etc.)
//!
//! # Example
//!
//! ```
//! use arena_replay::telemetry::{CollectingObserver, ViolationKind};
//! use arena_replay::{FrameRenderer, RecordingSurface, Frame};
//! use std::sync::Arc;
//!
//! let observer = Arc::new(CollectingObserver::new());
//! let renderer = FrameRenderer::default().with_violation_observer(observer.clone());
//! let mut surface = RecordingSurface::new(800, 450).unwrap();
//!
//! // A frame without any game info is a data contract violation, not a crash.
//! renderer.render(Some(&Frame::default()), &mut surface);
//! assert!(observer.has_violation(ViolationKind::FrameStructure));
//! ```

use parking_lot::Mutex;
use std::collections::BTreeMap;
use std::sync::Arc;

/// Severity of a reported violation.
///
/// Severities are ordered from least to most severe, allowing filtering
/// and comparison operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ViolationSeverity {
    /// Unexpected but recoverable - operation continued with fallback.
    ///
    /// Example: a frame without a score was drawn as an indicator.
    Warning,
    /// Serious issue - an operation was abandoned.
    ///
    /// Example: the replay loader failed and no document was installed.
    Error,
    /// Critical invariant broken - playback state may be corrupted.
    Critical,
}

impl ViolationSeverity {
    /// Returns a string representation suitable for logging/metrics labels.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Warning => "warning",
            Self::Error => "error",
            Self::Critical => "critical",
        }
    }
}

impl std::fmt::Display for ViolationSeverity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Categories of violations, one per subsystem.
///
/// # Forward Compatibility
///
/// This enum is marked `#[non_exhaustive]` because new violation categories
/// may be added in future versions. Always include a wildcard arm when matching.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize)]
#[serde(rename_all = "snake_case")]
#[non_exhaustive]
pub enum ViolationKind {
    /// A frame is missing required game fields or holds non-finite numbers.
    FrameStructure,
    /// Playback timing anomaly.
    ///
    /// Examples:
    /// - A timer fired while no frames were loaded
    /// - A load ticket completed after being superseded
    Playback,
    /// The replay loader failed.
    Loading,
    /// Configuration constraint violated.
    Configuration,
    /// A drawing surface operation failed.
    Rendering,
    /// Internal logic error (should never happen).
    InternalError,
    /// Runtime invariant check failed.
    ///
    /// Only checked in debug builds.
    Invariant,
}

impl ViolationKind {
    /// Returns a string representation suitable for logging/metrics labels.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::FrameStructure => "frame_structure",
            Self::Playback => "playback",
            Self::Loading => "loading",
            Self::Configuration => "configuration",
            Self::Rendering => "rendering",
            Self::InternalError => "internal_error",
            Self::Invariant => "invariant",
        }
    }
}

impl std::fmt::Display for ViolationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A recorded violation.
///
/// # Example
///
/// ```
/// use arena_replay::telemetry::{Violation, ViolationSeverity, ViolationKind};
///
/// let violation = Violation::new(
///     ViolationSeverity::Warning,
///     ViolationKind::FrameStructure,
///     "frame has no score",
///     "render.rs:42",
/// ).with_frame_index(17)
///  .with_context("missing", "score");
///
/// let json = violation.to_json().unwrap();
/// assert!(json.contains(r#""severity":"warning""#));
/// assert!(json.contains(r#""kind":"frame_structure""#));
/// assert!(json.contains(r#""frame_index":17"#));
/// ```
#[derive(Debug, Clone, serde::Serialize)]
pub struct Violation {
    /// The severity level of this violation.
    pub severity: ViolationSeverity,
    /// The category/subsystem where the violation occurred.
    pub kind: ViolationKind,
    /// Human-readable description of what went wrong.
    pub message: String,
    /// Source location where the violation was detected (file:line).
    pub location: &'static str,
    /// The replay frame index involved, if applicable.
    pub frame_index: Option<usize>,
    /// Additional structured context as key-value pairs.
    pub context: BTreeMap<String, String>,
}

impl Violation {
    /// Creates a new violation.
    #[must_use]
    pub fn new(
        severity: ViolationSeverity,
        kind: ViolationKind,
        message: impl Into<String>,
        location: &'static str,
    ) -> Self {
        Self {
            severity,
            kind,
            message: message.into(),
            location,
            frame_index: None,
            context: BTreeMap::new(),
        }
    }

    /// Sets the frame index at which this violation occurred.
    #[must_use]
    pub fn with_frame_index(mut self, index: usize) -> Self {
        self.frame_index = Some(index);
        self
    }

    /// Adds a context key-value pair.
    #[must_use]
    pub fn with_context(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.context.insert(key.into(), value.into());
        self
    }

    /// Serializes this violation to a JSON string.
    ///
    /// Returns `None` if serialization fails (which should not happen for
    /// well-formed violations).
    #[must_use]
    pub fn to_json(&self) -> Option<String> {
        serde_json::to_string(self).ok()
    }

    /// Like [`to_json`](Self::to_json), but with indentation for readability.
    #[must_use]
    pub fn to_json_pretty(&self) -> Option<String> {
        serde_json::to_string_pretty(self).ok()
    }
}

impl std::fmt::Display for Violation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "[{}/{}] {} (at {}",
            self.severity, self.kind, self.message, self.location
        )?;
        if let Some(index) = self.frame_index {
            write!(f, ", frame={index}")?;
        }
        if !self.context.is_empty() {
            write!(f, ", context={:?}", self.context)?;
        }
        write!(f, ")")
    }
}

/// Trait for observing violations.
///
/// Observers are shared between the controller's timer thread and the caller's
/// thread, hence the `Send + Sync` bound.
///
/// # Example
///
/// ```
/// use arena_replay::telemetry::{ViolationObserver, Violation};
///
/// struct MetricsObserver;
///
/// impl ViolationObserver for MetricsObserver {
///     fn on_violation(&self, violation: &Violation) {
///         // Increment a counter, send to monitoring system, etc.
///         let _ = violation.kind.as_str();
///     }
/// }
/// ```
pub trait ViolationObserver: Send + Sync {
    /// Called when a violation is detected.
    ///
    /// This may be called from inside a timer tick, so it should return quickly.
    fn on_violation(&self, violation: &Violation);
}

/// Built-in observer that logs violations via the `tracing` crate.
///
/// - `Warning` severity → `tracing::warn!`
/// - `Error` and `Critical` severity → `tracing::error!`
///
/// All fields are emitted as structured tracing fields (`severity`, `kind`,
/// `location`, `frame`, `context`).
#[derive(Debug, Default, Clone)]
pub struct TracingObserver;

impl TracingObserver {
    /// Creates a new tracing observer.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    fn format_frame(index: Option<usize>) -> String {
        index.map_or_else(|| "null".to_owned(), |i| i.to_string())
    }
}

impl ViolationObserver for TracingObserver {
    fn on_violation(&self, violation: &Violation) {
        let severity = violation.severity.as_str();
        let kind = violation.kind.as_str();
        let location = violation.location;
        let frame_str = Self::format_frame(violation.frame_index);

        let context_str = if violation.context.is_empty() {
            "{}".to_owned()
        } else {
            let pairs: Vec<String> = violation
                .context
                .iter()
                .map(|(k, v)| format!("{}={}", k, v))
                .collect();
            format!("{{{}}}", pairs.join(", "))
        };

        match violation.severity {
            ViolationSeverity::Warning => {
                tracing::warn!(
                    severity,
                    kind,
                    location,
                    frame = %frame_str,
                    context = %context_str,
                    "{}",
                    violation.message
                );
            },
            ViolationSeverity::Error | ViolationSeverity::Critical => {
                tracing::error!(
                    severity,
                    kind,
                    location,
                    frame = %frame_str,
                    context = %context_str,
                    "{}",
                    violation.message
                );
            },
        }
    }
}

/// Built-in observer that collects violations for testing.
///
/// # Example
///
/// ```
/// use arena_replay::telemetry::{CollectingObserver, ViolationKind, ViolationObserver, Violation, ViolationSeverity};
///
/// let observer = CollectingObserver::new();
/// observer.on_violation(&Violation::new(
///     ViolationSeverity::Warning,
///     ViolationKind::Playback,
///     "test violation",
///     "test.rs:1",
/// ));
///
/// assert_eq!(observer.violations().len(), 1);
/// assert!(observer.has_violation(ViolationKind::Playback));
/// ```
#[derive(Debug, Default)]
pub struct CollectingObserver {
    violations: Mutex<Vec<Violation>>,
}

impl CollectingObserver {
    /// Creates a new collecting observer with an empty violation list.
    #[must_use]
    pub fn new() -> Self {
        Self {
            violations: Mutex::new(Vec::new()),
        }
    }

    /// Returns a copy of all collected violations.
    #[must_use]
    pub fn violations(&self) -> Vec<Violation> {
        self.violations.lock().clone()
    }

    /// Returns the number of collected violations.
    #[must_use]
    pub fn len(&self) -> usize {
        self.violations.lock().len()
    }

    /// Returns true if no violations have been collected.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.violations.lock().is_empty()
    }

    /// Checks if any violation of the specified kind has been collected.
    #[must_use]
    pub fn has_violation(&self, kind: ViolationKind) -> bool {
        self.violations.lock().iter().any(|v| v.kind == kind)
    }

    /// Checks if any violation with the specified severity has been collected.
    #[must_use]
    pub fn has_severity(&self, severity: ViolationSeverity) -> bool {
        self.violations
            .lock()
            .iter()
            .any(|v| v.severity == severity)
    }

    /// Returns all violations matching the specified kind.
    #[must_use]
    pub fn violations_of_kind(&self, kind: ViolationKind) -> Vec<Violation> {
        self.violations
            .lock()
            .iter()
            .filter(|v| v.kind == kind)
            .cloned()
            .collect()
    }

    /// Clears all collected violations.
    pub fn clear(&self) {
        self.violations.lock().clear();
    }
}

impl ViolationObserver for CollectingObserver {
    fn on_violation(&self, violation: &Violation) {
        self.violations.lock().push(violation.clone());
    }
}

/// Reports a violation to an optional observer, falling back to [`TracingObserver`] if `None`.
///
/// # Example
///
/// ```
/// use arena_replay::telemetry::{
///     report_to_observer, CollectingObserver, Violation, ViolationKind, ViolationSeverity
/// };
/// use std::sync::Arc;
///
/// let observer = Arc::new(CollectingObserver::new());
/// let violation = Violation::new(
///     ViolationSeverity::Warning,
///     ViolationKind::Playback,
///     "test message",
///     "test.rs:1",
/// );
///
/// report_to_observer(Some(&observer), &violation);
/// assert_eq!(observer.len(), 1);
///
/// // No observer: logged through tracing
/// report_to_observer(None::<&Arc<CollectingObserver>>, &violation);
/// ```
pub fn report_to_observer<O: ViolationObserver + ?Sized>(
    observer: Option<&Arc<O>>,
    violation: &Violation,
) {
    match observer {
        Some(obs) => obs.on_violation(violation),
        None => TracingObserver.on_violation(violation),
    }
}

/// Reports a violation with location tracking to the default [`TracingObserver`].
///
/// # Syntax
///
/// ```text
/// report_violation!(severity, kind, "message");
/// report_violation!(severity, kind, "message with {}", format_args);
/// ```
#[macro_export]
macro_rules! report_violation {
    ($severity:expr, $kind:expr, $msg:literal) => {{
        use $crate::telemetry::ViolationObserver as _;
        let violation = $crate::telemetry::Violation::new(
            $severity,
            $kind,
            $msg,
            concat!(file!(), ":", line!()),
        );
        $crate::telemetry::TracingObserver.on_violation(&violation);
    }};

    ($severity:expr, $kind:expr, $fmt:literal, $($arg:tt)+) => {{
        use $crate::telemetry::ViolationObserver as _;
        let violation = $crate::telemetry::Violation::new(
            $severity,
            $kind,
            format!($fmt, $($arg)+),
            concat!(file!(), ":", line!()),
        );
        $crate::telemetry::TracingObserver.on_violation(&violation);
    }};
}

/// Asserts that no violations have been collected.
///
/// # Panics
///
/// Panics if the observer contains any violations, printing them for debugging.
#[macro_export]
macro_rules! assert_no_violations {
    ($observer:expr) => {{
        let violations = $observer.violations();
        assert!(
            violations.is_empty(),
            "Expected no violations, but found {}:\n{:#?}",
            violations.len(),
            violations
        );
    }};
}

/// Asserts that a violation of the specified kind was collected.
///
/// # Panics
///
/// Panics if no violation of the specified kind was found.
#[macro_export]
macro_rules! assert_violation {
    ($observer:expr, $kind:expr) => {{
        assert!(
            $observer.has_violation($kind),
            "Expected violation of kind {:?}, but found: {:#?}",
            $kind,
            $observer.violations()
        );
    }};
}

// ==========================================
// Runtime Invariant Checking
// ==========================================

/// Result of a failed invariant check.
#[derive(Debug, Clone, serde::Serialize)]
pub struct InvariantViolation {
    /// Name of the type whose invariant was violated.
    pub type_name: &'static str,
    /// Description of the violated invariant.
    pub invariant: String,
    /// Additional diagnostic context.
    pub details: Option<String>,
}

impl InvariantViolation {
    /// Creates a new invariant violation.
    #[must_use]
    pub fn new(type_name: &'static str, invariant: impl Into<String>) -> Self {
        Self {
            type_name,
            invariant: invariant.into(),
            details: None,
        }
    }

    /// Adds additional details to the violation.
    #[must_use]
    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }
}

impl std::fmt::Display for InvariantViolation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.type_name, self.invariant)?;
        if let Some(details) = &self.details {
            write!(f, " ({})", details)?;
        }
        Ok(())
    }
}

/// Trait for types that maintain internal invariants.
pub trait InvariantChecker {
    /// Returns `Ok(())` if all invariants hold, or the first broken one.
    fn check_invariants(&self) -> Result<(), InvariantViolation>;
}

/// Checks invariants in debug builds and reports failures as critical violations.
/// Compiles to nothing in release builds.
#[macro_export]
#[cfg(debug_assertions)]
macro_rules! debug_check_invariants {
    ($expr:expr, $context:expr) => {{
        use $crate::telemetry::InvariantChecker as _;
        if let Err(violation) = $expr.check_invariants() {
            $crate::report_violation!(
                $crate::telemetry::ViolationSeverity::Critical,
                $crate::telemetry::ViolationKind::Invariant,
                "{} [context: {}]",
                violation,
                $context
            );
        }
    }};
}

/// No-op version for release builds.
#[macro_export]
#[cfg(not(debug_assertions))]
macro_rules! debug_check_invariants {
    ($expr:expr, $context:expr) => {{}};
}
