//! Latest helm-s3 version lookup via GitHub Releases.

use serde::Deserialize;

/// GitHub repository publishing helm-s3 releases.
pub const HELM_S3_REPO: &str = "hypnoglow/helm-s3";

pub const GITHUB_API_BASE: &str = "https://api.github.com";

/// Source of the latest published plugin version.
///
/// Production code uses [`GitHubReleases`], tests use mockall-generated mocks.
#[allow(async_fn_in_trait)]
pub trait ReleaseSource: Send + Sync {
    /// Latest released version, without a leading `v`.
    async fn latest_version(&self) -> Result<String, ReleaseError>;
}

#[derive(Debug, Deserialize)]
struct GhRelease {
    tag_name: String,
}

/// GitHub Releases client for the helm-s3 repository.
#[derive(Debug, Clone)]
pub struct GitHubReleases {
    client: reqwest::Client,
    api_base: String,
    token: Option<String>,
}

impl GitHubReleases {
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
            api_base: GITHUB_API_BASE.to_owned(),
            token: None,
        }
    }

    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into();
        self
    }

    /// Authenticate requests, which lifts the anonymous rate limit.
    pub fn with_token(mut self, token: Option<String>) -> Self {
        self.token = token.filter(|t| !t.trim().is_empty());
        self
    }

    pub fn latest_url(&self) -> String {
        format!(
            "{}/repos/{HELM_S3_REPO}/releases/latest",
            self.api_base.trim_end_matches('/')
        )
    }
}

impl Default for GitHubReleases {
    fn default() -> Self {
        Self::new()
    }
}

impl ReleaseSource for GitHubReleases {
    async fn latest_version(&self) -> Result<String, ReleaseError> {
        let url = self.latest_url();
        tracing::debug!(%url, authenticated = self.token.is_some(), "fetching latest release");

        let mut request = self
            .client
            .get(&url)
            .header(reqwest::header::USER_AGENT, "chartpush")
            .header(reqwest::header::ACCEPT, "application/vnd.github+json");
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await.map_err(|e| ReleaseError::Request {
            url: url.clone(),
            source: e,
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(ReleaseError::Status {
                url,
                status: status.as_u16(),
            });
        }

        let body = response.text().await.map_err(|e| ReleaseError::Request {
            url: url.clone(),
            source: e,
        })?;

        parse_latest_tag(&body)
    }
}

/// Extract the version from a GitHub "latest release" response body.
pub fn parse_latest_tag(body: &str) -> Result<String, ReleaseError> {
    let release: GhRelease =
        serde_json::from_str(body).map_err(|e| ReleaseError::Parse { source: e })?;

    let version = normalize_version(release.tag_name.trim());
    if version.is_empty() {
        return Err(ReleaseError::InvalidTag(release.tag_name));
    }

    Ok(version.to_owned())
}

/// Drop a single leading `v` from a release tag: `v0.16.2` → `0.16.2`.
pub fn normalize_version(tag: &str) -> &str {
    tag.strip_prefix('v').unwrap_or(tag)
}

#[derive(Debug, thiserror::Error)]
pub enum ReleaseError {
    #[error("request to {url} failed")]
    Request { url: String, source: reqwest::Error },

    #[error("{url} returned HTTP {status}")]
    Status { url: String, status: u16 },

    #[error("unexpected release response")]
    Parse { source: serde_json::Error },

    #[error("release tag '{0}' does not contain a version")]
    InvalidTag(String),
}
