//! Update orchestration
//!
//! An [`Updater`] runs one update check and, when the latest release differs
//! from the running version, installs its platform asset over the executable:
//!
//! 1. Fetch the latest release
//! 2. Compare its display name with the current version (exact match)
//! 3. Select the first compatible asset
//! 4. Resolve the executable path and open the download
//! 5. Hand the stream to the [`SelfReplacer`]

use inplace_core::types::{BackupLocation, ReplaceStrategy, RuntimeConfig};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, info};

use crate::error::UpdateError;
use crate::releases::{Credential, Release, ReleaseSource};
use crate::replace::{current_executable, ProgressCallback, SelfReplacer};
use crate::selector::{select_asset, AssetSelector, HostOsSelector};

/// Explicit settings for an update run
#[derive(Clone)]
pub struct UpdateOptions {
    /// Decides which release asset is installable
    pub selector: Arc<dyn AssetSelector>,

    /// Environment variable holding the GitHub token
    pub token_env: String,

    /// How the executable is replaced
    pub strategy: ReplaceStrategy,

    /// Where the private backup directory is created
    pub backup_location: BackupLocation,

    /// Executable to replace instead of the running one
    pub executable_path: Option<PathBuf>,

    /// Receives the number of bytes written during the download
    pub progress: Option<ProgressCallback>,
}

impl Default for UpdateOptions {
    fn default() -> Self {
        Self {
            selector: Arc::new(HostOsSelector::new()),
            token_env: "GITHUB_TOKEN".to_string(),
            strategy: ReplaceStrategy::default(),
            backup_location: BackupLocation::default(),
            executable_path: None,
            progress: None,
        }
    }
}

impl UpdateOptions {
    /// Options taken from runtime configuration
    pub fn from_config(config: &RuntimeConfig) -> Self {
        Self {
            token_env: config.github.token_env.clone(),
            strategy: config.update.strategy,
            backup_location: config.update.backup_location,
            ..Self::default()
        }
    }

    pub fn with_selector(mut self, selector: impl AssetSelector + 'static) -> Self {
        self.selector = Arc::new(selector);
        self
    }

    pub fn with_token_env(mut self, token_env: impl Into<String>) -> Self {
        self.token_env = token_env.into();
        self
    }

    pub fn with_strategy(mut self, strategy: ReplaceStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    pub fn with_backup_location(mut self, location: BackupLocation) -> Self {
        self.backup_location = location;
        self
    }

    pub fn with_executable_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.executable_path = Some(path.into());
        self
    }

    pub fn with_progress(mut self, progress: ProgressCallback) -> Self {
        self.progress = Some(progress);
        self
    }
}

impl std::fmt::Debug for UpdateOptions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UpdateOptions")
            .field("token_env", &self.token_env)
            .field("strategy", &self.strategy)
            .field("backup_location", &self.backup_location)
            .field("executable_path", &self.executable_path)
            .field("progress", &self.progress.is_some())
            .finish_non_exhaustive()
    }
}

/// The asset chosen for installation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdatePlan {
    pub asset_id: u64,
    pub asset_name: String,
    pub size: u64,
}

/// Result of comparing the latest release with the running version
#[derive(Debug, Clone)]
pub enum UpdateCheck {
    UpToDate { version: String },
    Available(Release),
}

/// Result of an update run
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpdateOutcome {
    /// The latest release matches the running version; nothing was touched
    AlreadyUpToDate { version: String },

    /// The executable was replaced
    Updated {
        from: String,
        to: String,
        asset: String,
        bytes_written: u64,
    },
}

/// Self-updater for a single `owner/repo`
pub struct Updater<S> {
    source: S,
    owner: String,
    repo: String,
    current_version: String,
    credential: Credential,
    options: UpdateOptions,
}

impl<S: ReleaseSource> Updater<S> {
    /// Create an updater; the token is read from `options.token_env` here
    pub fn new(
        source: S,
        owner: impl Into<String>,
        repo: impl Into<String>,
        current_version: impl Into<String>,
        options: UpdateOptions,
    ) -> Self {
        let credential = Credential::from_env(options.token_env.clone());
        Self {
            source,
            owner: owner.into(),
            repo: repo.into(),
            current_version: current_version.into(),
            credential,
            options,
        }
    }

    /// Use an explicit credential instead of the environment
    pub fn with_credential(mut self, credential: Credential) -> Self {
        self.credential = credential;
        self
    }

    /// Fetch the latest release and compare it with the running version
    pub async fn check(&self) -> Result<UpdateCheck, UpdateError> {
        let release = self
            .source
            .fetch_latest_release(&self.owner, &self.repo, &self.credential)
            .await?;

        debug!(
            "Found release {} for {}/{} (current version {})",
            release.display_name(),
            self.owner,
            self.repo,
            self.current_version
        );

        if release.display_name() == self.current_version {
            return Ok(UpdateCheck::UpToDate {
                version: self.current_version.clone(),
            });
        }

        Ok(UpdateCheck::Available(release))
    }

    /// Pick the asset to install from `release`
    pub fn plan(&self, release: &Release) -> Result<UpdatePlan, UpdateError> {
        let asset = select_asset(release, self.options.selector.as_ref())?;
        debug!("Selected asset {} (id {})", asset.name, asset.id);
        Ok(UpdatePlan {
            asset_id: asset.id,
            asset_name: asset.name.clone(),
            size: asset.size,
        })
    }

    /// Download the planned asset of `release` and install it
    pub async fn apply(&self, release: &Release) -> Result<UpdateOutcome, UpdateError> {
        let plan = self.plan(release)?;

        let executable = match &self.options.executable_path {
            Some(path) => path.clone(),
            None => current_executable()?,
        };
        debug!("Executable to replace: {}", executable.display());

        let stream = self
            .source
            .open_asset_download(&self.owner, &self.repo, plan.asset_id, &self.credential)
            .await?;

        let report = SelfReplacer::new(&self.repo)
            .with_strategy(self.options.strategy)
            .with_backup_location(self.options.backup_location)
            .with_progress(self.options.progress.clone())
            .replace(&executable, stream)
            .await?;

        info!(
            "Updated {} from {} to {}",
            report.path.display(),
            self.current_version,
            release.display_name()
        );

        Ok(UpdateOutcome::Updated {
            from: self.current_version.clone(),
            to: release.display_name().to_string(),
            asset: plan.asset_name,
            bytes_written: report.bytes_written,
        })
    }

    /// Check for an update and install it when one is available
    pub async fn run(&self) -> Result<UpdateOutcome, UpdateError> {
        match self.check().await? {
            UpdateCheck::UpToDate { version } => {
                info!("Already at version {}", version);
                Ok(UpdateOutcome::AlreadyUpToDate { version })
            }
            UpdateCheck::Available(release) => self.apply(&release).await,
        }
    }
}
