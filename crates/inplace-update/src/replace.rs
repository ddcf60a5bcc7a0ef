//! Safe replacement of the running executable
//!
//! The engine moves the live executable into a private backup directory,
//! puts the new content in its place and restores the backup if anything
//! fails after the original has been moved. Two strategies are supported:
//!
//! - [`ReplaceStrategy::Staged`] downloads into the backup directory first and
//!   only then swaps files with renames, so the live path never holds a
//!   partially written executable.
//! - [`ReplaceStrategy::InPlace`] moves the original aside and streams the
//!   download straight into a new file at the live path.
//!
//! The backup directory is removed on every exit path except a failed
//! rollback, where it holds the only remaining copy of the original.

use futures_util::StreamExt;
use inplace_core::types::{BackupLocation, ReplaceStrategy};
use std::ffi::{OsStr, OsString};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tempfile::TempDir;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::{debug, error, info, warn};

use crate::error::UpdateError;
use crate::releases::ByteStream;

/// Callback receiving the number of bytes written so far
pub type ProgressCallback = Arc<dyn Fn(u64) + Send + Sync>;

/// Suffix of the staged download inside the backup directory
const STAGED_SUFFIX: &str = ".new";

/// Lifecycle of a single replacement
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplaceState {
    Idle,
    Downloading,
    BackedUp,
    Overwriting,
    Committed,
    RolledBack,
}

/// Backup of the original executable inside the private directory
#[derive(Debug)]
pub struct BackupHandle {
    original_path: PathBuf,
    backup_path: PathBuf,
    dir: TempDir,
}

impl BackupHandle {
    pub fn original_path(&self) -> &Path {
        &self.original_path
    }

    pub fn backup_path(&self) -> &Path {
        &self.backup_path
    }

    pub fn dir(&self) -> &Path {
        self.dir.path()
    }

    /// Remove the private directory, logging instead of failing
    fn cleanup(self) {
        let dir = self.dir.path().to_path_buf();
        match self.dir.close() {
            Ok(()) => debug!("Removed backup directory {}", dir.display()),
            Err(e) => warn!("Failed to remove backup directory {}: {}", dir.display(), e),
        }
    }

    /// Keep the private directory on disk and return its path
    fn preserve(self) -> PathBuf {
        self.dir.keep()
    }
}

/// Outcome of a committed replacement
#[derive(Debug, Clone)]
pub struct ReplaceReport {
    /// Terminal state, always [`ReplaceState::Committed`]
    pub state: ReplaceState,

    /// Path of the replaced executable
    pub path: PathBuf,

    /// Number of bytes written from the stream
    pub bytes_written: u64,

    /// Private directory used during the replacement (already removed)
    pub backup_dir: PathBuf,
}

/// Replaces an executable with the content of a byte stream
pub struct SelfReplacer {
    /// Name the backup directory is derived from
    label: String,

    strategy: ReplaceStrategy,

    backup_location: BackupLocation,

    progress: Option<ProgressCallback>,
}

impl SelfReplacer {
    /// Create a replacer whose backup directories are named `<label>-bak-XXXXXX`
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            strategy: ReplaceStrategy::default(),
            backup_location: BackupLocation::default(),
            progress: None,
        }
    }

    pub fn with_strategy(mut self, strategy: ReplaceStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    pub fn with_backup_location(mut self, location: BackupLocation) -> Self {
        self.backup_location = location;
        self
    }

    /// Report written bytes to `progress` while streaming
    pub fn with_progress(mut self, progress: Option<ProgressCallback>) -> Self {
        self.progress = progress;
        self
    }

    /// Replace the file at `executable` with the content of `stream`.
    ///
    /// On error the original content is back at `executable`, unless the
    /// error is [`UpdateError::RollbackFailed`], in which case it is at the
    /// reported backup path.
    ///
    /// The backup directory is removed before returning, except after
    /// [`UpdateError::RollbackFailed`]: then it is left on disk and the
    /// caller is responsible for restoring and deleting it.
    pub async fn replace(
        &self,
        executable: &Path,
        stream: ByteStream,
    ) -> Result<ReplaceReport, UpdateError> {
        let mut state = ReplaceState::Idle;
        let file_name = executable.file_name().ok_or_else(|| {
            UpdateError::PathResolutionFailed(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("{} has no file name", executable.display()),
            ))
        })?;

        let handle = self.prepare_backup(executable, file_name)?;
        debug!(
            "Using backup directory {} ({:?} strategy)",
            handle.dir().display(),
            self.strategy
        );

        transition(&mut state, ReplaceState::Downloading);
        let result = match self.strategy {
            ReplaceStrategy::Staged => self.replace_staged(&handle, stream, &mut state).await,
            ReplaceStrategy::InPlace => self.replace_in_place(&handle, stream, &mut state).await,
        };

        match result {
            Ok(bytes_written) => {
                transition(&mut state, ReplaceState::Committed);
                info!(
                    "Replaced {} ({} bytes)",
                    handle.original_path().display(),
                    bytes_written
                );
                let backup_dir = handle.dir().to_path_buf();
                handle.cleanup();
                Ok(ReplaceReport {
                    state,
                    path: executable.to_path_buf(),
                    bytes_written,
                    backup_dir,
                })
            }
            Err(err @ UpdateError::RollbackFailed { .. }) => {
                let kept = handle.preserve();
                error!(
                    "Backup directory {} kept; it holds the only copy of the original executable",
                    kept.display()
                );
                Err(err)
            }
            Err(err) => {
                handle.cleanup();
                Err(err)
            }
        }
    }

    /// Create the private backup directory for `executable`
    fn prepare_backup(
        &self,
        executable: &Path,
        file_name: &OsStr,
    ) -> Result<BackupHandle, UpdateError> {
        let backup_failed = |source| UpdateError::BackupFailed {
            path: executable.to_path_buf(),
            source,
        };

        let prefix = format!("{}-bak-", self.label);
        let mut builder = tempfile::Builder::new();
        builder.prefix(&prefix);

        let dir = match self.backup_location {
            BackupLocation::BesideExecutable => {
                let parent = executable
                    .parent()
                    .filter(|p| !p.as_os_str().is_empty())
                    .unwrap_or_else(|| Path::new("."));
                builder.tempdir_in(parent)
            }
            BackupLocation::SystemTemp => builder.tempdir(),
        }
        .map_err(backup_failed)?;

        Ok(BackupHandle {
            original_path: executable.to_path_buf(),
            backup_path: dir.path().join(file_name),
            dir,
        })
    }

    /// Download into the backup directory, then swap files by renaming
    async fn replace_staged(
        &self,
        handle: &BackupHandle,
        stream: ByteStream,
        state: &mut ReplaceState,
    ) -> Result<u64, UpdateError> {
        let mut staged_name = OsString::from(handle.backup_path().as_os_str());
        staged_name.push(STAGED_SUFFIX);
        let staged_path = PathBuf::from(staged_name);

        let bytes_written = self
            .write_stream(&staged_path, stream)
            .await
            .map_err(|source| UpdateError::WriteFailed {
                path: staged_path.clone(),
                source,
            })?;
        debug!(
            "Staged {} bytes at {}",
            bytes_written,
            staged_path.display()
        );

        move_aside(handle).await?;
        transition(state, ReplaceState::BackedUp);

        transition(state, ReplaceState::Overwriting);
        if let Err(e) = fs::rename(&staged_path, handle.original_path()).await {
            return Err(roll_back(handle, e, state).await);
        }

        Ok(bytes_written)
    }

    /// Move the original aside, then stream into a new file at the live path
    async fn replace_in_place(
        &self,
        handle: &BackupHandle,
        stream: ByteStream,
        state: &mut ReplaceState,
    ) -> Result<u64, UpdateError> {
        move_aside(handle).await?;
        transition(state, ReplaceState::BackedUp);

        transition(state, ReplaceState::Overwriting);
        match self.write_stream(handle.original_path(), stream).await {
            Ok(bytes_written) => Ok(bytes_written),
            Err(e) => Err(roll_back(handle, e, state).await),
        }
    }

    /// Create `path` with execute permissions and copy the stream into it
    async fn write_stream(&self, path: &Path, mut stream: ByteStream) -> io::Result<u64> {
        let mut options = fs::OpenOptions::new();
        options.write(true).create(true).truncate(true);
        #[cfg(unix)]
        options.mode(0o755);
        let mut file = options.open(path).await?;

        let mut written: u64 = 0;
        while let Some(chunk) = stream.next().await {
            let chunk = chunk?;
            file.write_all(&chunk).await?;
            written += chunk.len() as u64;
            if let Some(progress) = &self.progress {
                progress(written);
            }
        }

        file.flush().await?;
        file.sync_all().await?;
        Ok(written)
    }
}

/// Rename the live executable into the backup directory
async fn move_aside(handle: &BackupHandle) -> Result<(), UpdateError> {
    debug!(
        "Moving {} to {}",
        handle.original_path().display(),
        handle.backup_path().display()
    );
    fs::rename(handle.original_path(), handle.backup_path())
        .await
        .map_err(|source| UpdateError::BackupFailed {
            path: handle.original_path().to_path_buf(),
            source,
        })
}

/// Put the backup back at the live path after a failed write
async fn roll_back(
    handle: &BackupHandle,
    write_error: io::Error,
    state: &mut ReplaceState,
) -> UpdateError {
    let path = handle.original_path().to_path_buf();
    warn!("Write to {} failed ({}), rolling back", path.display(), write_error);

    // The partial file may not exist if the failure happened before creation
    if let Err(e) = fs::remove_file(&path).await {
        if e.kind() != io::ErrorKind::NotFound {
            debug!("Could not remove partial file {}: {}", path.display(), e);
        }
    }

    match fs::rename(handle.backup_path(), &path).await {
        Ok(()) => {
            transition(state, ReplaceState::RolledBack);
            info!("Restored original executable at {}", path.display());
            UpdateError::WriteFailed {
                path,
                source: write_error,
            }
        }
        Err(rollback_error) => {
            error!(
                "Failed to restore {} from {}: {}. Manual intervention required",
                path.display(),
                handle.backup_path().display(),
                rollback_error
            );
            UpdateError::RollbackFailed {
                path,
                write_error,
                rollback_error,
                backup_path: handle.backup_path().to_path_buf(),
            }
        }
    }
}

fn transition(state: &mut ReplaceState, next: ReplaceState) {
    debug!("Replace state: {:?} -> {:?}", state, next);
    *state = next;
}

/// Absolute path of the running executable with symlinks resolved
pub fn current_executable() -> Result<PathBuf, UpdateError> {
    let exe = std::env::current_exe().map_err(UpdateError::PathResolutionFailed)?;
    exe.canonicalize().map_err(UpdateError::PathResolutionFailed)
}
