//! Self-update functionality for the inplace CLI
//!
//! Provides:
//! - Latest-release lookup against the GitHub REST API
//! - Platform asset selection through a pluggable [`AssetSelector`]
//! - Safe replacement of the running executable with automatic rollback
//! - An [`Updater`] tying the pieces together for a single update run

pub mod error;
pub mod releases;
pub mod replace;
pub mod selector;
pub mod updater;

pub use error::UpdateError;
pub use releases::{
    ByteStream, Credential, GitHubReleaseSource, Release, ReleaseAsset, ReleaseSource,
};
pub use replace::{
    current_executable, BackupHandle, ProgressCallback, ReplaceReport, ReplaceState, SelfReplacer,
};
pub use selector::{host_os_identifier, select_asset, AssetSelector, HostOsSelector};
pub use updater::{UpdateCheck, UpdateOptions, UpdateOutcome, UpdatePlan, Updater};

/// Current CLI version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
