//! Fetching replay documents.
//!
//! The controller only knows the [`ReplayLoader`] contract; where replays come
//! from is up to the application. Three loaders ship with the crate:
//!
//! | Loader | Source |
//! |--------|--------|
//! | [`DirectoryLoader`] | `<root>/<match id>.json` on disk |
//! | [`InMemoryLoader`] | documents, raw JSON or scripted failures held in memory |
//! | `HttpReplayLoader` | `GET {base}/matches/{id}/replay?format=json` (feature `http`) |
//!
//! Loaders never retry. A failure is reported once as
//! [`ReplayError::LoadFailure`] and it is up to the caller to try again.

use std::collections::BTreeMap;
use std::fmt;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use parking_lot::RwLock;

use crate::document::ReplayDocument;
use crate::error::LoadFailureKind;
use crate::{ReplayError, ReplayResult};

#[cfg(feature = "http")]
mod http;

#[cfg(feature = "http")]
pub use http::HttpReplayLoader;

/// Identifier of a recorded match.
///
/// Ids are used verbatim in file names and URL paths, so they must be non-empty
/// and free of path separators and `..`.
///
/// ```
/// use arena_replay::MatchId;
///
/// assert!(MatchId::new("match_123").is_ok());
/// assert!(MatchId::new("").is_err());
/// assert!(MatchId::new("../secrets").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MatchId(String);

impl MatchId {
    /// Validates and wraps a match id.
    ///
    /// # Errors
    ///
    /// Returns [`ReplayError::InvalidRequest`] if the id is empty, only
    /// whitespace, or contains `/`, `\` or `..`.
    pub fn new(id: impl Into<String>) -> ReplayResult<Self> {
        let id = id.into();
        if id.trim().is_empty() {
            return Err(ReplayError::InvalidRequest {
                info: "match id must not be empty".to_owned(),
            });
        }
        if id.contains(['/', '\\']) || id.contains("..") {
            return Err(ReplayError::InvalidRequest {
                info: format!("match id {:?} must not contain path separators or '..'", id),
            });
        }
        Ok(Self(id))
    }

    /// The id as text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for MatchId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for MatchId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl FromStr for MatchId {
    type Err = ReplayError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<&str> for MatchId {
    type Error = ReplayError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl TryFrom<String> for MatchId {
    type Error = ReplayError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Source of replay documents.
///
/// Implementations may block; [`ReplayController::load_from`](crate::ReplayController::load_from)
/// calls them without holding any playback lock.
pub trait ReplayLoader: Send + Sync {
    /// Fetches and decodes the replay of one match.
    ///
    /// # Errors
    ///
    /// Returns [`ReplayError::LoadFailure`] describing why the replay is unavailable.
    fn fetch_replay(&self, match_id: &MatchId) -> ReplayResult<ReplayDocument>;
}

/// Decodes a JSON body, tagging failures with the match they belong to.
pub(crate) fn decode_body(match_id: &MatchId, bytes: &[u8]) -> ReplayResult<ReplayDocument> {
    ReplayDocument::from_slice(bytes).map_err(|err| {
        ReplayError::load_failure(match_id.as_str(), LoadFailureKind::Decode, err.to_string())
    })
}

/// Loads `<root>/<match id>.json`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectoryLoader {
    root: PathBuf,
}

impl DirectoryLoader {
    /// Creates a loader reading from `root`.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// The directory replays are read from.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// The file a match's replay is expected in.
    #[must_use]
    pub fn path_for(&self, match_id: &MatchId) -> PathBuf {
        self.root.join(format!("{}.json", match_id))
    }
}

impl ReplayLoader for DirectoryLoader {
    fn fetch_replay(&self, match_id: &MatchId) -> ReplayResult<ReplayDocument> {
        let path = self.path_for(match_id);
        let bytes = std::fs::read(&path).map_err(|err| {
            let kind = match err.kind() {
                ErrorKind::NotFound => LoadFailureKind::NotFound,
                ErrorKind::TimedOut => LoadFailureKind::Timeout,
                _ => LoadFailureKind::Network,
            };
            ReplayError::load_failure(
                match_id.as_str(),
                kind,
                format!("{}: {}", path.display(), err),
            )
        })?;
        tracing::debug!(match_id = %match_id, path = %path.display(), bytes = bytes.len(), "replay file read");
        decode_body(match_id, &bytes)
    }
}

#[derive(Debug, Clone)]
enum Entry {
    Document(ReplayDocument),
    Json(String),
    Failure(LoadFailureKind),
}

/// Serves replays from memory.
///
/// Besides ready documents it can hold raw JSON, which goes through the same
/// decoding as a real loader, and scripted failures for exercising error paths.
///
/// ```
/// use arena_replay::{InMemoryLoader, LoadFailureKind, MatchId, ReplayDocument, ReplayLoader};
///
/// let loader = InMemoryLoader::new();
/// let ok = MatchId::new("ok").unwrap();
/// let slow = MatchId::new("slow").unwrap();
/// loader.insert(ok.clone(), ReplayDocument::default());
/// loader.fail_with(slow.clone(), LoadFailureKind::Timeout);
///
/// assert!(loader.fetch_replay(&ok).is_ok());
/// let err = loader.fetch_replay(&slow).unwrap_err();
/// assert_eq!(err.load_failure_kind(), Some(LoadFailureKind::Timeout));
/// ```
#[derive(Debug, Default)]
pub struct InMemoryLoader {
    entries: RwLock<BTreeMap<MatchId, Entry>>,
}

impl InMemoryLoader {
    /// Creates an empty loader.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Serves `document` for `match_id`.
    pub fn insert(&self, match_id: MatchId, document: ReplayDocument) {
        self.entries.write().insert(match_id, Entry::Document(document));
    }

    /// Serves `json`, decoded on every fetch, for `match_id`.
    pub fn insert_json(&self, match_id: MatchId, json: impl Into<String>) {
        self.entries.write().insert(match_id, Entry::Json(json.into()));
    }

    /// Makes every fetch of `match_id` fail with `kind`.
    pub fn fail_with(&self, match_id: MatchId, kind: LoadFailureKind) {
        self.entries.write().insert(match_id, Entry::Failure(kind));
    }

    /// Forgets `match_id`. Returns `true` if it was known.
    pub fn remove(&self, match_id: &MatchId) -> bool {
        self.entries.write().remove(match_id).is_some()
    }

    /// Number of known matches.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    /// Returns `true` if no match is known.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}

impl ReplayLoader for InMemoryLoader {
    fn fetch_replay(&self, match_id: &MatchId) -> ReplayResult<ReplayDocument> {
        let entry = self.entries.read().get(match_id).cloned();
        match entry {
            Some(Entry::Document(document)) => Ok(document),
            Some(Entry::Json(json)) => decode_body(match_id, json.as_bytes()),
            Some(Entry::Failure(kind)) => Err(ReplayError::load_failure(
                match_id.as_str(),
                kind,
                "scripted failure",
            )),
            None => Err(ReplayError::load_failure(
                match_id.as_str(),
                LoadFailureKind::NotFound,
                "no such match",
            )),
        }
    }
}
