//! Blocking HTTP replay loader.
//!
//! [`HttpReplayLoader`] asks the match server for the structured-frame replay
//! format: `GET {base_url}/matches/{match_id}/replay?format=json`.

use reqwest::blocking::Client;
use reqwest::{StatusCode, Url};
use web_time::Duration;

use super::{decode_body, MatchId, ReplayLoader};
use crate::document::ReplayDocument;
use crate::error::LoadFailureKind;
use crate::{ReplayError, ReplayResult};

/// Request timeout used when none is configured.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Fetches replays from the match server over HTTP.
///
/// A 404 maps to [`LoadFailureKind::NotFound`], a timed out request to
/// [`LoadFailureKind::Timeout`], any other transport error or non-success status
/// to [`LoadFailureKind::Network`] and an undecodable body to
/// [`LoadFailureKind::Decode`].
///
/// ```no_run
/// use arena_replay::{HttpReplayLoader, MatchId, ReplayLoader};
/// use web_time::Duration;
///
/// let loader = HttpReplayLoader::new("https://arena.example.com/api")?
///     .with_timeout(Duration::from_secs(10))?;
/// let replay = loader.fetch_replay(&MatchId::new("match_123")?)?;
/// println!("{} frames", replay.len());
/// # Ok::<(), arena_replay::ReplayError>(())
/// ```
#[derive(Debug, Clone)]
pub struct HttpReplayLoader {
    base_url: Url,
    timeout: Duration,
    client: Client,
}

fn build_client(timeout: Duration) -> ReplayResult<Client> {
    Client::builder()
        .timeout(timeout)
        .build()
        .map_err(|err| ReplayError::InvalidConfig {
            info: format!("could not build HTTP client: {}", err),
        })
}

impl HttpReplayLoader {
    /// Creates a loader for the API rooted at `base_url`.
    ///
    /// # Errors
    ///
    /// Returns [`ReplayError::InvalidConfig`] if `base_url` is not an absolute
    /// http(s) URL or the HTTP client cannot be created.
    pub fn new(base_url: impl AsRef<str>) -> ReplayResult<Self> {
        let raw = base_url.as_ref();
        let base_url = Url::parse(raw).map_err(|err| ReplayError::InvalidConfig {
            info: format!("base URL {:?} is not valid: {}", raw, err),
        })?;
        if !matches!(base_url.scheme(), "http" | "https") || base_url.cannot_be_a_base() {
            return Err(ReplayError::InvalidConfig {
                info: format!("base URL {:?} must start with http:// or https://", raw),
            });
        }
        Ok(Self {
            base_url,
            timeout: DEFAULT_TIMEOUT,
            client: build_client(DEFAULT_TIMEOUT)?,
        })
    }

    /// Sets the per-request timeout.
    ///
    /// # Errors
    ///
    /// Returns [`ReplayError::InvalidConfig`] if `timeout` is zero.
    pub fn with_timeout(mut self, timeout: Duration) -> ReplayResult<Self> {
        if timeout.is_zero() {
            return Err(ReplayError::InvalidConfig {
                info: "HTTP timeout must be greater than zero".to_owned(),
            });
        }
        self.client = build_client(timeout)?;
        self.timeout = timeout;
        Ok(self)
    }

    /// The request timeout.
    #[must_use]
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// The URL a match's replay is fetched from.
    ///
    /// The match id is percent-encoded as a single path segment.
    #[must_use]
    pub fn url_for(&self, match_id: &MatchId) -> Url {
        let mut url = self.base_url.clone();
        url.set_fragment(None);
        if let Ok(mut segments) = url.path_segments_mut() {
            segments
                .pop_if_empty()
                .push("matches")
                .push(match_id.as_str())
                .push("replay");
        }
        url.set_query(Some("format=json"));
        url
    }
}

impl ReplayLoader for HttpReplayLoader {
    fn fetch_replay(&self, match_id: &MatchId) -> ReplayResult<ReplayDocument> {
        let url = self.url_for(match_id);
        tracing::debug!(match_id = %match_id, %url, "requesting replay");

        let transport = |err: reqwest::Error| {
            let kind = if err.is_timeout() {
                LoadFailureKind::Timeout
            } else {
                LoadFailureKind::Network
            };
            ReplayError::load_failure(match_id.as_str(), kind, err.to_string())
        };

        let response = self.client.get(url.clone()).send().map_err(transport)?;
        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Err(ReplayError::load_failure(
                match_id.as_str(),
                LoadFailureKind::NotFound,
                format!("{} returned 404", url),
            ));
        }
        if !status.is_success() {
            return Err(ReplayError::load_failure(
                match_id.as_str(),
                LoadFailureKind::Network,
                format!("{} returned {}", url, status),
            ));
        }

        let body = response.bytes().map_err(transport)?;
        decode_body(match_id, &body)
    }
}
