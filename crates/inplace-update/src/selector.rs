//! Platform asset selection

use tracing::debug;

use crate::error::UpdateError;
use crate::releases::{Release, ReleaseAsset};

/// Decides whether a release asset can be installed on this machine
pub trait AssetSelector: Send + Sync {
    fn is_compatible(&self, asset: &ReleaseAsset) -> bool;
}

impl<F> AssetSelector for F
where
    F: Fn(&ReleaseAsset) -> bool + Send + Sync,
{
    fn is_compatible(&self, asset: &ReleaseAsset) -> bool {
        self(asset)
    }
}

/// Matches assets whose name contains the host operating system identifier
#[derive(Debug, Clone)]
pub struct HostOsSelector {
    os: String,
}

impl HostOsSelector {
    /// Selector for the operating system this binary was built for
    pub fn new() -> Self {
        Self::for_os(host_os_identifier())
    }

    /// Selector for an explicit operating system identifier
    pub fn for_os(os: impl Into<String>) -> Self {
        Self { os: os.into() }
    }
}

impl Default for HostOsSelector {
    fn default() -> Self {
        Self::new()
    }
}

impl AssetSelector for HostOsSelector {
    fn is_compatible(&self, asset: &ReleaseAsset) -> bool {
        asset.name.contains(&self.os)
    }
}

/// Operating system identifier as it appears in release asset names
/// (`linux`, `darwin`, `windows`, ...)
pub fn host_os_identifier() -> &'static str {
    match std::env::consts::OS {
        "macos" => "darwin",
        other => other,
    }
}

/// Return the first asset of `release` the selector accepts.
///
/// Assets are scanned in release order and scanning stops at the first match.
pub fn select_asset<'a>(
    release: &'a Release,
    selector: &dyn AssetSelector,
) -> Result<&'a ReleaseAsset, UpdateError> {
    for asset in &release.assets {
        let compatible = selector.is_compatible(asset);
        debug!(
            "Asset {} (id {}, {} bytes): {}",
            asset.name,
            asset.id,
            asset.size,
            if compatible { "compatible" } else { "skipped" }
        );
        if compatible {
            return Ok(asset);
        }
    }

    Err(UpdateError::NoSuitableAsset {
        release: release.display_name().to_string(),
    })
}
