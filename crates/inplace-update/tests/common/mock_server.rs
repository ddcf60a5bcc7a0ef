//! Mock GitHub API helpers
//!
//! Mounts the two endpoints the release source talks to:
//! `/repos/{owner}/{repo}/releases/latest` and
//! `/repos/{owner}/{repo}/releases/assets/{id}`.

use inplace_core::types::NetworkConfig;
use inplace_update::GitHubReleaseSource;
use serde_json::Value;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use super::constants::*;

pub fn latest_release_path() -> String {
    format!("/repos/{}/{}/releases/latest", OWNER, REPO)
}

pub fn asset_path(asset_id: u64) -> String {
    format!("/repos/{}/{}/releases/assets/{}", OWNER, REPO, asset_id)
}

/// Serve `release` as the latest release to anyone
pub async fn mock_latest_release(server: &MockServer, release: Value) {
    Mock::given(method("GET"))
        .and(path(latest_release_path()))
        .and(header("accept", "application/vnd.github+json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(release))
        .mount(server)
        .await;
}

/// Serve `release` only to requests carrying `Bearer <token>`; everyone else gets 404
pub async fn mock_private_release(server: &MockServer, release: Value, token: &str) {
    Mock::given(method("GET"))
        .and(path(latest_release_path()))
        .and(header("authorization", format!("Bearer {}", token).as_str()))
        .respond_with(ResponseTemplate::new(200).set_body_json(release))
        .with_priority(1)
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path(latest_release_path()))
        .respond_with(ResponseTemplate::new(404).set_body_json(serde_json::json!({
            "message": "Not Found",
            "documentation_url": "https://docs.github.com/rest/releases/releases#get-the-latest-release"
        })))
        .with_priority(10)
        .mount(server)
        .await;
}

/// Respond to the latest-release endpoint with a bare status
pub async fn mock_release_status(server: &MockServer, status: u16) {
    Mock::given(method("GET"))
        .and(path(latest_release_path()))
        .respond_with(ResponseTemplate::new(status))
        .mount(server)
        .await;
}

/// Serve `content` for the asset download, expecting the octet-stream accept header
pub async fn mock_asset_download(server: &MockServer, asset_id: u64, content: &[u8]) {
    Mock::given(method("GET"))
        .and(path(asset_path(asset_id)))
        .and(header("accept", "application/octet-stream"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(content.to_vec()))
        .mount(server)
        .await;
}

/// Fail the asset download with a bare status
pub async fn mock_asset_status(server: &MockServer, asset_id: u64, status: u16) {
    Mock::given(method("GET"))
        .and(path(asset_path(asset_id)))
        .respond_with(ResponseTemplate::new(status))
        .mount(server)
        .await;
}

/// Release source pointed at the mock server
pub fn github_source(server: &MockServer) -> GitHubReleaseSource {
    let network = NetworkConfig {
        http_timeout_secs: 5,
        download_timeout_secs: 5,
        ..NetworkConfig::default()
    };
    GitHubReleaseSource::new(server.uri(), &network).expect("client should build")
}
