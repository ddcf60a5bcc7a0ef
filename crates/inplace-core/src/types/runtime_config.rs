//! Runtime configuration types for operational parameters
//!
//! These types define configuration that controls runtime behavior like
//! network timeouts, which GitHub repository to update from, and how the
//! running executable gets replaced.

use serde::{Deserialize, Serialize};

/// Complete runtime configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct RuntimeConfig {
    /// Network and HTTP configuration
    #[serde(default)]
    pub network: NetworkConfig,

    /// GitHub repository settings
    #[serde(default)]
    pub github: GitHubConfig,

    /// Self-replacement settings
    #[serde(default)]
    pub update: UpdateConfig,
}

/// Network and HTTP configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct NetworkConfig {
    /// Timeout for GitHub API requests in seconds
    #[serde(default = "default_http_timeout")]
    pub http_timeout_secs: u64,

    /// Timeout for asset downloads in seconds
    #[serde(default = "default_download_timeout")]
    pub download_timeout_secs: u64,

    /// User agent string for HTTP requests
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            http_timeout_secs: default_http_timeout(),
            download_timeout_secs: default_download_timeout(),
            user_agent: default_user_agent(),
        }
    }
}

fn default_http_timeout() -> u64 {
    30
}
fn default_download_timeout() -> u64 {
    300 // 5 minutes
}
fn default_user_agent() -> String {
    format!(
        "inplace/{} ({}; {})",
        env!("CARGO_PKG_VERSION"),
        std::env::consts::OS,
        std::env::consts::ARCH
    )
}

/// GitHub repository configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct GitHubConfig {
    /// Repository owner
    #[serde(default = "default_repo_owner")]
    pub repo_owner: String,

    /// Repository name
    #[serde(default = "default_repo_name")]
    pub repo_name: String,

    /// Base URL for GitHub API
    #[serde(default = "default_github_api_url")]
    pub api_url: String,

    /// Name of the environment variable holding the API token.
    /// The token is required for private repositories.
    #[serde(default = "default_token_env")]
    pub token_env: String,
}

impl Default for GitHubConfig {
    fn default() -> Self {
        Self {
            repo_owner: default_repo_owner(),
            repo_name: default_repo_name(),
            api_url: default_github_api_url(),
            token_env: default_token_env(),
        }
    }
}

fn default_repo_owner() -> String {
    "inplace-rs".to_string()
}
fn default_repo_name() -> String {
    "inplace".to_string()
}
fn default_github_api_url() -> String {
    "https://api.github.com".to_string()
}
fn default_token_env() -> String {
    "GITHUB_TOKEN".to_string()
}

/// How the running executable is replaced
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct UpdateConfig {
    /// Replacement strategy
    #[serde(default)]
    pub strategy: ReplaceStrategy,

    /// Where the private backup directory is created
    #[serde(default)]
    pub backup_location: BackupLocation,
}

/// Replacement strategy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum ReplaceStrategy {
    /// Write the download to a staging file next to the backup, then rename
    /// it onto the live path. The live path never holds a partial file.
    #[default]
    Staged,

    /// Move the original aside and stream the download straight into a new
    /// file at the live path, restoring the backup on failure.
    InPlace,
}

/// Location of the private backup directory
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum BackupLocation {
    /// Directory next to the executable, keeping renames on one filesystem
    #[default]
    BesideExecutable,

    /// The operating system's temporary directory
    SystemTemp,
}

impl std::str::FromStr for ReplaceStrategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "staged" => Ok(Self::Staged),
            "in-place" => Ok(Self::InPlace),
            other => Err(format!(
                "unknown replace strategy '{}' (expected 'staged' or 'in-place')",
                other
            )),
        }
    }
}

impl std::str::FromStr for BackupLocation {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "beside-executable" => Ok(Self::BesideExecutable),
            "system-temp" => Ok(Self::SystemTemp),
            other => Err(format!(
                "unknown backup location '{}' (expected 'beside-executable' or 'system-temp')",
                other
            )),
        }
    }
}
