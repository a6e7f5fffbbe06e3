//! Replay documents and the frames they contain.
//!
//! A [`ReplayDocument`] is the decoded form of the structured-frame JSON that the
//! match server produces:
//!
//! ```json
//! {
//!   "frames": [
//!     { "info": { "ball_pos": [0.5, 0.5], "paddle_positions": [0.4, 0.6], "score": [0, 0] } }
//!   ],
//!   "metadata": { "finalScore": "3-2", "duration": 245, "timestamp": "2024-05-01T12:00:00Z" }
//! }
//! ```
//!
//! Every frame field is optional. A field that is absent, `null` or of the wrong
//! JSON type decodes as `None` rather than failing the whole document, so a single
//! corrupted frame degrades to the renderer's invalid-structure indicator instead
//! of making the replay unplayable.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use smallvec::SmallVec;
use std::fmt;
use std::io::Read;

/// Per-player values. The reference game has two players, so these never spill.
pub type PlayerValues<T> = SmallVec<[T; 2]>;

fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(value.and_then(|value| serde_json::from_value(value).ok()))
}

/// A frame field that [`Frame::validate`] found missing or malformed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FrameField {
    /// The whole `info` object.
    Info,
    /// `info.ball_pos`
    BallPos,
    /// `info.paddle_positions`
    PaddlePositions,
    /// `info.score`
    Score,
}

impl FrameField {
    /// Returns the wire name of the field.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Info => "info",
            Self::BallPos => "ball_pos",
            Self::PaddlePositions => "paddle_positions",
            Self::Score => "score",
        }
    }
}

impl fmt::Display for FrameField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Game state recorded for one frame, as it appears on the wire.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FrameInfo {
    /// Normalized `[x, y]` ball position.
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub ball_pos: Option<PlayerValues<f64>>,
    /// Normalized paddle `y` positions, left player first.
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub paddle_positions: Option<PlayerValues<f64>>,
    /// Scores, left player first.
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub score: Option<PlayerValues<i64>>,
}

/// One discrete snapshot of game state.
///
/// Frames are stored as received. Use [`Frame::validate`] to obtain a
/// [`PongState`] the renderer can draw.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Frame {
    /// The recorded game state, if the frame carries any.
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub info: Option<FrameInfo>,
}

/// A validated paddle-and-ball frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PongState {
    /// Normalized `[x, y]` ball position.
    pub ball: [f64; 2],
    /// Normalized paddle `y` positions, left player first.
    pub paddles: [f64; 2],
    /// Scores, left player first.
    pub score: [i64; 2],
}

impl Frame {
    /// Builds a well-formed paddle-and-ball frame.
    #[must_use]
    pub fn pong(ball: [f64; 2], paddles: [f64; 2], score: [i64; 2]) -> Self {
        Self {
            info: Some(FrameInfo {
                ball_pos: Some(SmallVec::from_buf(ball)),
                paddle_positions: Some(SmallVec::from_buf(paddles)),
                score: Some(SmallVec::from_buf(score)),
            }),
        }
    }

    /// Checks that the frame has everything the renderer needs.
    ///
    /// A frame is valid when `info` is present and `ball_pos`, `paddle_positions`
    /// and `score` each have at least two entries, with finite coordinates.
    /// Extra entries are ignored.
    ///
    /// # Errors
    ///
    /// Returns every missing or malformed field, in wire order.
    pub fn validate(&self) -> Result<PongState, Vec<FrameField>> {
        let Some(info) = &self.info else {
            return Err(vec![FrameField::Info]);
        };

        let ball = finite_pair(info.ball_pos.as_deref());
        let paddles = finite_pair(info.paddle_positions.as_deref());
        let score = info
            .score
            .as_deref()
            .and_then(|values| Some([*values.first()?, *values.get(1)?]));

        match (ball, paddles, score) {
            (Some(ball), Some(paddles), Some(score)) => Ok(PongState {
                ball,
                paddles,
                score,
            }),
            (ball, paddles, score) => {
                let mut missing = Vec::with_capacity(3);
                if ball.is_none() {
                    missing.push(FrameField::BallPos);
                }
                if paddles.is_none() {
                    missing.push(FrameField::PaddlePositions);
                }
                if score.is_none() {
                    missing.push(FrameField::Score);
                }
                Err(missing)
            },
        }
    }

    /// Returns `true` if [`validate`](Self::validate) would succeed.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.validate().is_ok()
    }
}

fn finite_pair(values: Option<&[f64]>) -> Option<[f64; 2]> {
    let values = values?;
    let pair = [*values.first()?, *values.get(1)?];
    pair.iter().all(|v| v.is_finite()).then_some(pair)
}

/// Final score as reported by the match server: either a preformatted string
/// such as `"11-8"` or a pair of integers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FinalScore {
    /// Preformatted score text.
    Text(String),
    /// Left and right player scores.
    Points([i64; 2]),
}

impl fmt::Display for FinalScore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(text) => f.write_str(text),
            Self::Points([left, right]) => write!(f, "{}-{}", left, right),
        }
    }
}

/// Match metadata shipped alongside the frames.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReplayMetadata {
    /// Final score, if the server recorded one.
    #[serde(
        rename = "finalScore",
        default,
        deserialize_with = "lenient",
        skip_serializing_if = "Option::is_none"
    )]
    pub final_score: Option<FinalScore>,
    /// Match length in seconds.
    #[serde(
        rename = "duration",
        alias = "durationSeconds",
        default,
        deserialize_with = "lenient",
        skip_serializing_if = "Option::is_none"
    )]
    pub duration_seconds: Option<f64>,
    /// When the match was played, as sent by the server.
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
}

impl ReplayMetadata {
    /// One-line summary for logs and status bars, e.g. `final score 3-2, 245s`.
    ///
    /// Returns `None` when no field is set.
    #[must_use]
    pub fn summary(&self) -> Option<String> {
        let mut parts = Vec::with_capacity(3);
        if let Some(score) = &self.final_score {
            parts.push(format!("final score {}", score));
        }
        if let Some(duration) = self.duration_seconds {
            parts.push(format!("{}s", duration));
        }
        if let Some(timestamp) = &self.timestamp {
            parts.push(format!("played {}", timestamp));
        }
        (!parts.is_empty()).then(|| parts.join(", "))
    }
}

/// An immutable, fully decoded match replay.
///
/// # Example
///
/// ```
/// use arena_replay::ReplayDocument;
///
/// let json = r#"{"frames":[{"info":{"ball_pos":[0.5,0.5],"paddle_positions":[0.5,0.5],"score":[0,0]}}]}"#;
/// let document = ReplayDocument::from_json_str(json).unwrap();
/// assert_eq!(document.len(), 1);
/// assert!(document.frame(0).unwrap().is_valid());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReplayDocument {
    #[serde(default)]
    frames: Vec<Frame>,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    metadata: Option<ReplayMetadata>,
}

impl ReplayDocument {
    /// Creates a document from frames, without metadata.
    #[must_use]
    pub fn new(frames: Vec<Frame>) -> Self {
        Self {
            frames,
            metadata: None,
        }
    }

    /// Attaches match metadata.
    #[must_use]
    pub fn with_metadata(mut self, metadata: ReplayMetadata) -> Self {
        self.metadata = Some(metadata);
        self
    }

    /// Decodes a document from JSON text.
    ///
    /// # Errors
    ///
    /// Fails only if the text is not JSON or `frames` is not an array of objects.
    pub fn from_json_str(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Decodes a document from JSON bytes.
    ///
    /// # Errors
    ///
    /// See [`from_json_str`](Self::from_json_str).
    pub fn from_slice(bytes: &[u8]) -> Result<Self, serde_json::Error> {
        serde_json::from_slice(bytes)
    }

    /// Decodes a document from a reader.
    ///
    /// # Errors
    ///
    /// See [`from_json_str`](Self::from_json_str). I/O errors are reported as
    /// `serde_json` I/O errors.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self, serde_json::Error> {
        serde_json::from_reader(reader)
    }

    /// Encodes the document back into the wire format.
    ///
    /// # Errors
    ///
    /// Fails if a frame holds a non-finite number, which JSON cannot represent.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// All frames, in playback order.
    #[must_use]
    pub fn frames(&self) -> &[Frame] {
        &self.frames
    }

    /// The frame at `index`, if any.
    #[must_use]
    pub fn frame(&self, index: usize) -> Option<&Frame> {
        self.frames.get(index)
    }

    /// Number of frames.
    #[must_use]
    pub fn len(&self) -> usize {
        self.frames.len()
    }

    /// Returns `true` if the document has no frames.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// Match metadata, if the server sent any.
    #[must_use]
    pub fn metadata(&self) -> Option<&ReplayMetadata> {
        self.metadata.as_ref()
    }

    /// Indices of frames that fail [`Frame::validate`].
    #[must_use]
    pub fn invalid_frames(&self) -> Vec<usize> {
        self.frames
            .iter()
            .enumerate()
            .filter(|(_, frame)| !frame.is_valid())
            .map(|(index, _)| index)
            .collect()
    }
}

impl From<Vec<Frame>> for ReplayDocument {
    fn from(frames: Vec<Frame>) -> Self {
        Self::new(frames)
    }
}
