use anyhow::{Context, Result};
use reqwest::blocking::Client;
use serde_json::Value;
use std::time::Duration;
use thiserror::Error;
use url::Url;

use crate::review::Panel;

/// Shown when the service answers 2xx but carries neither `review` nor `detail`
pub const NO_REVIEW: &str = "No review available.";

/// Failure of a single review request
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RequestError {
    /// Non-2xx response
    #[error("Server error: {0}")]
    Status(u16),

    #[error("{0}")]
    Transport(String),

    #[error("invalid response body: {0}")]
    Decode(String),

    /// A name that would collapse the request path (`.` or `..`)
    #[error("invalid name in request path: {0:?}")]
    InvalidName(String),
}

/// What a review is requested for
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReviewTarget {
    Repo { owner: String, repo: String },
    User { username: String },
}

impl ReviewTarget {
    pub fn panel(&self) -> Panel {
        match self {
            ReviewTarget::Repo { .. } => Panel::Repo,
            ReviewTarget::User { .. } => Panel::User,
        }
    }

    /// Human-readable subject (`owner/repo` or `username`)
    pub fn subject(&self) -> String {
        match self {
            ReviewTarget::Repo { owner, repo } => format!("{owner}/{repo}"),
            ReviewTarget::User { username } => username.clone(),
        }
    }

    fn path_segments(&self) -> Vec<&str> {
        match self {
            ReviewTarget::Repo { owner, repo } => {
                vec!["review", "repo", owner.as_str(), repo.as_str()]
            }
            ReviewTarget::User { username } => vec!["review", "user", username.as_str()],
        }
    }
}

/// Parse `OWNER/REPO` into its two parts.
/// Exactly one slash, both sides non-empty after trimming.
pub fn parse_repo_spec(spec: &str) -> Option<(String, String)> {
    let (owner, repo) = spec.trim().split_once('/')?;
    let (owner, repo) = (owner.trim(), repo.trim());
    if owner.is_empty() || repo.is_empty() || repo.contains('/') {
        return None;
    }
    Some((owner.to_string(), repo.to_string()))
}

/// Source of review Markdown. Called from worker threads.
pub trait ReviewApi: Send + Sync {
    fn fetch_review(&self, target: &ReviewTarget) -> Result<String, RequestError>;
}

/// Blocking HTTP client for the review service
#[derive(Debug, Clone)]
pub struct HttpReviewApi {
    base_url: Url,
    client: Client,
}

impl HttpReviewApi {
    /// `timeout = None` waits for the service indefinitely
    pub fn new(base_url: &str, timeout: Option<Duration>) -> Result<Self> {
        let base_url = Url::parse(base_url.trim())
            .with_context(|| format!("Invalid server URL: {}", base_url))?;
        if base_url.cannot_be_a_base() {
            anyhow::bail!("Server URL cannot be used as a base: {}", base_url);
        }
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to configure HTTP client")?;
        Ok(Self { base_url, client })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Build the endpoint for `target`, percent-encoding each path segment
    pub fn endpoint(&self, target: &ReviewTarget) -> Result<Url, RequestError> {
        let segments = target.path_segments();
        // `url` drops dot segments instead of encoding them
        if let Some(dot) = segments.iter().find(|s| matches!(**s, "." | "..")) {
            return Err(RequestError::InvalidName(dot.to_string()));
        }
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| RequestError::Transport(format!("invalid base URL: {}", self.base_url)))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }
}

impl ReviewApi for HttpReviewApi {
    fn fetch_review(&self, target: &ReviewTarget) -> Result<String, RequestError> {
        let url = self.endpoint(target)?;
        tracing::debug!(%url, "requesting review");

        let response = self
            .client
            .get(url)
            .send()
            .map_err(|e| RequestError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(RequestError::Status(status.as_u16()));
        }

        let body: Value = response
            .json()
            .map_err(|e| RequestError::Decode(e.to_string()))?;
        Ok(review_markdown(&body))
    }
}

/// Pick the review text out of a response body: `review`, then `detail`,
/// then [`NO_REVIEW`]. Empty strings and non-object bodies count as absent.
pub fn review_markdown(body: &Value) -> String {
    ["review", "detail"]
        .iter()
        .filter_map(|key| body.get(key).and_then(Value::as_str))
        .find(|text| !text.is_empty())
        .unwrap_or(NO_REVIEW)
        .to_string()
}
