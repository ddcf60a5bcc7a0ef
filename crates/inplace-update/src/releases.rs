//! GitHub releases lookup and asset download

use async_trait::async_trait;
use bytes::Bytes;
use futures_util::stream::BoxStream;
use futures_util::StreamExt;
use inplace_core::types::{NetworkConfig, RuntimeConfig};
use reqwest::header::ACCEPT;
use reqwest::StatusCode;
use serde::Deserialize;
use std::io;
use std::time::Duration;
use tracing::debug;

use crate::error::UpdateError;

/// Stream of asset bytes handed to the replacement engine
pub type ByteStream = BoxStream<'static, io::Result<Bytes>>;

const GITHUB_JSON: &str = "application/vnd.github+json";
const OCTET_STREAM: &str = "application/octet-stream";

/// Release information
#[derive(Debug, Clone, Deserialize)]
pub struct Release {
    /// Release tag (e.g., "v3.0.0")
    pub tag_name: String,

    /// Release name
    #[serde(default)]
    pub name: Option<String>,

    /// Release assets, in the order the API returned them
    #[serde(default)]
    pub assets: Vec<ReleaseAsset>,
}

impl Release {
    /// Name compared against the running version.
    ///
    /// Falls back to the tag when the release has no name.
    pub fn display_name(&self) -> &str {
        match self.name.as_deref() {
            Some(name) if !name.is_empty() => name,
            _ => &self.tag_name,
        }
    }
}

/// Release asset
#[derive(Debug, Clone, Deserialize)]
pub struct ReleaseAsset {
    /// Asset id used to request the download
    pub id: u64,

    /// Asset name
    pub name: String,

    /// Browser download URL, for diagnostics only
    #[serde(default)]
    pub browser_download_url: String,

    /// Asset size in bytes
    #[serde(default)]
    pub size: u64,
}

/// Bearer credential read from a named environment variable
#[derive(Debug, Clone)]
pub struct Credential {
    env_var: String,
    token: Option<String>,
}

impl Credential {
    /// Create a credential; an empty token counts as absent
    pub fn new(env_var: impl Into<String>, token: Option<String>) -> Self {
        Self {
            env_var: env_var.into(),
            token: token.filter(|t| !t.is_empty()),
        }
    }

    /// Read the token from the named environment variable
    pub fn from_env(env_var: impl Into<String>) -> Self {
        let env_var = env_var.into();
        let token = std::env::var(&env_var).ok();
        Self::new(env_var, token)
    }

    pub fn env_var(&self) -> &str {
        &self.env_var
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    /// Hint shown when a repository cannot be found without a token
    fn missing_token_hint(&self) -> Option<String> {
        if self.token.is_some() {
            return None;
        }
        Some(format!(
            "if this is a private repository, set the {} environment variable",
            self.env_var
        ))
    }
}

/// Source of published releases
#[async_trait]
pub trait ReleaseSource: Send + Sync {
    /// Fetch the latest published release of `owner/repo`
    async fn fetch_latest_release(
        &self,
        owner: &str,
        repo: &str,
        credential: &Credential,
    ) -> Result<Release, UpdateError>;

    /// Open a byte stream for the asset with the given id
    async fn open_asset_download(
        &self,
        owner: &str,
        repo: &str,
        asset_id: u64,
        credential: &Credential,
    ) -> Result<ByteStream, UpdateError>;
}

/// [`ReleaseSource`] backed by the GitHub REST API
pub struct GitHubReleaseSource {
    /// HTTP client
    client: reqwest::Client,

    /// Base URL for GitHub API
    api_url: String,

    /// Timeout for API requests
    api_timeout: Duration,

    /// Timeout for asset downloads
    download_timeout: Duration,
}

impl GitHubReleaseSource {
    /// Create a source talking to `api_url`
    pub fn new(api_url: impl Into<String>, network: &NetworkConfig) -> Result<Self, UpdateError> {
        let client = reqwest::Client::builder()
            .user_agent(&network.user_agent)
            .build()
            .map_err(|e| UpdateError::lookup(format!("failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            api_url: api_url.into().trim_end_matches('/').to_string(),
            api_timeout: Duration::from_secs(network.http_timeout_secs),
            download_timeout: Duration::from_secs(network.download_timeout_secs),
        })
    }

    /// Create a source from runtime configuration
    pub fn from_config(config: &RuntimeConfig) -> Result<Self, UpdateError> {
        Self::new(&config.github.api_url, &config.network)
    }

    fn request(
        &self,
        url: &str,
        accept: &'static str,
        timeout: Duration,
        credential: &Credential,
    ) -> reqwest::RequestBuilder {
        let mut request = self
            .client
            .get(url)
            .header(ACCEPT, accept)
            .timeout(timeout);
        if let Some(token) = credential.token() {
            request = request.bearer_auth(token);
        }
        request
    }
}

#[async_trait]
impl ReleaseSource for GitHubReleaseSource {
    async fn fetch_latest_release(
        &self,
        owner: &str,
        repo: &str,
        credential: &Credential,
    ) -> Result<Release, UpdateError> {
        let url = format!("{}/repos/{}/{}/releases/latest", self.api_url, owner, repo);

        debug!("Fetching latest release from: {}", url);

        let response = self
            .request(&url, GITHUB_JSON, self.api_timeout, credential)
            .send()
            .await
            .map_err(|e| UpdateError::lookup(format!("request to {} failed: {}", url, e)))?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Err(UpdateError::LookupFailed {
                message: format!("no latest release found for {}/{} ({})", owner, repo, status),
                hint: credential.missing_token_hint(),
            });
        }
        if !status.is_success() {
            return Err(UpdateError::lookup(format!(
                "failed to fetch release for {}/{}: {}",
                owner, repo, status
            )));
        }

        let release: Release = response
            .json()
            .await
            .map_err(|e| UpdateError::lookup(format!("invalid release response: {}", e)))?;

        debug!(
            "Latest release {} has {} assets",
            release.display_name(),
            release.assets.len()
        );
        Ok(release)
    }

    async fn open_asset_download(
        &self,
        owner: &str,
        repo: &str,
        asset_id: u64,
        credential: &Credential,
    ) -> Result<ByteStream, UpdateError> {
        let url = format!(
            "{}/repos/{}/{}/releases/assets/{}",
            self.api_url, owner, repo, asset_id
        );

        debug!("Downloading asset from: {}", url);

        let response = self
            .request(&url, OCTET_STREAM, self.download_timeout, credential)
            .send()
            .await
            .map_err(|e| UpdateError::download(asset_id, e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(UpdateError::download(
                asset_id,
                format!("server responded with {}", status),
            ));
        }

        let stream = response
            .bytes_stream()
            .map(|chunk| chunk.map_err(io::Error::other));
        Ok(stream.boxed())
    }
}
