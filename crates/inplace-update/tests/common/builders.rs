//! Builders for release test data
//!
//! Releases are assembled as GitHub API JSON so the same builder feeds both
//! wiremock responses and in-memory sources.

use inplace_update::{Release, ReleaseAsset};
use serde_json::{json, Value};

use super::constants::*;

/// Builder for GitHub release payloads
#[derive(Debug, Clone)]
pub struct ReleaseBuilder {
    tag_name: String,
    name: Option<String>,
    assets: Vec<Value>,
}

impl ReleaseBuilder {
    pub fn new() -> Self {
        Self {
            tag_name: format!("v{}", VERSION_1_1_0),
            name: Some(VERSION_1_1_0.to_string()),
            assets: Vec::new(),
        }
    }

    pub fn tag(mut self, tag: &str) -> Self {
        self.tag_name = tag.to_string();
        self
    }

    pub fn name(mut self, name: &str) -> Self {
        self.name = Some(name.to_string());
        self
    }

    pub fn without_name(mut self) -> Self {
        self.name = None;
        self
    }

    pub fn asset(mut self, asset: ReleaseAssetBuilder) -> Self {
        self.assets.push(asset.build_json());
        self
    }

    /// Add an asset with the given id and name
    pub fn named_asset(self, id: u64, name: &str) -> Self {
        self.asset(ReleaseAssetBuilder::new(id, name))
    }

    pub fn build_json(&self) -> Value {
        json!({
            "tag_name": self.tag_name,
            "name": self.name,
            "draft": false,
            "prerelease": false,
            "assets": self.assets,
        })
    }

    pub fn build(&self) -> Release {
        serde_json::from_value(self.build_json()).expect("release JSON should deserialize")
    }
}

impl Default for ReleaseBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Builder for GitHub release asset payloads
#[derive(Debug, Clone)]
pub struct ReleaseAssetBuilder {
    id: u64,
    name: String,
    size: u64,
}

impl ReleaseAssetBuilder {
    pub fn new(id: u64, name: &str) -> Self {
        Self {
            id,
            name: name.to_string(),
            size: NEW_BINARY_CONTENT.len() as u64,
        }
    }

    pub fn size(mut self, size: u64) -> Self {
        self.size = size;
        self
    }

    pub fn build_json(&self) -> Value {
        json!({
            "id": self.id,
            "name": self.name,
            "browser_download_url": format!(
                "https://github.com/{}/{}/releases/download/v{}/{}",
                OWNER, REPO, VERSION_1_1_0, self.name
            ),
            "size": self.size,
            "content_type": "application/octet-stream",
        })
    }

    pub fn build(&self) -> ReleaseAsset {
        serde_json::from_value(self.build_json()).expect("asset JSON should deserialize")
    }
}
