//! Error types for the update pipeline

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Errors produced while checking for, downloading, or installing an update
#[derive(Error, Debug)]
pub enum UpdateError {
    /// The latest release could not be fetched or does not exist
    #[error("Failed to look up the latest release: {message}{}", hint_suffix(.hint))]
    LookupFailed {
        message: String,
        hint: Option<String>,
    },

    /// No asset in the release passed the compatibility check
    #[error(
        "No compatible asset found in release {release}; run with --debug to list the available assets"
    )]
    NoSuitableAsset { release: String },

    /// The asset download could not be started or was rejected
    #[error("Failed to download asset {asset_id}: {message}")]
    DownloadFailed { asset_id: u64, message: String },

    /// The running executable could not be moved into the backup directory
    #[error("Failed to back up {}: {source}", .path.display())]
    BackupFailed {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Writing the new executable failed; the original has been restored
    #[error("Failed to write {}: {source}", .path.display())]
    WriteFailed {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Writing failed and restoring the original executable failed too
    #[error(
        "Failed to write {}: {write_error}; restoring the original also failed: {rollback_error}. The previous executable is preserved at {}",
        .path.display(),
        .backup_path.display()
    )]
    RollbackFailed {
        path: PathBuf,
        write_error: io::Error,
        rollback_error: io::Error,
        backup_path: PathBuf,
    },

    /// The path of the running executable could not be determined
    #[error("Failed to resolve the path of the running executable: {0}")]
    PathResolutionFailed(#[source] io::Error),
}

impl UpdateError {
    /// Create a lookup error without a hint
    pub fn lookup(message: impl Into<String>) -> Self {
        Self::LookupFailed {
            message: message.into(),
            hint: None,
        }
    }

    /// Create a download error for the given asset id
    pub fn download(asset_id: u64, message: impl Into<String>) -> Self {
        Self::DownloadFailed {
            asset_id,
            message: message.into(),
        }
    }

    /// Whether the installation may have been left without a valid executable
    pub fn is_rollback_failure(&self) -> bool {
        matches!(self, Self::RollbackFailed { .. })
    }

    /// The hint attached to a lookup failure, if any
    pub fn hint(&self) -> Option<&str> {
        match self {
            Self::LookupFailed { hint, .. } => hint.as_deref(),
            _ => None,
        }
    }
}

fn hint_suffix(hint: &Option<String>) -> String {
    hint.as_ref()
        .map(|h| format!(" ({})", h))
        .unwrap_or_default()
}
