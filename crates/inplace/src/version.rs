//! Build and update-source information reported by `inplace version`

use inplace_core::types::ReplaceStrategy;
use inplace_core::RuntimeConfig;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VersionInfo {
    /// Compared verbatim against the latest release name
    pub version: String,

    /// `GIT_SHA` at build time, if set
    pub commit: Option<String>,

    /// `TARGET` at build time, if set
    pub target: Option<String>,

    /// `owner/repo` the updater fetches releases from
    pub repository: String,

    pub strategy: ReplaceStrategy,

    /// Environment variable the GitHub token is read from
    pub token_env: String,
}

impl VersionInfo {
    /// Info for this build, with the update source taken from `config`
    pub fn current(config: &RuntimeConfig) -> Self {
        Self {
            version: inplace_update::VERSION.to_string(),
            commit: option_env!("GIT_SHA").map(String::from),
            target: option_env!("TARGET").map(String::from),
            repository: format!(
                "{}/{}",
                config.github.repo_owner, config.github.repo_name
            ),
            strategy: config.update.strategy,
            token_env: config.github.token_env.clone(),
        }
    }
}

/// `inplace <version> [(<commit>)] [<target>]`
impl fmt::Display for VersionInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "inplace {}", self.version)?;
        if let Some(commit) = &self.commit {
            write!(f, " ({})", commit)?;
        }
        if let Some(target) = &self.target {
            write!(f, " {}", target)?;
        }
        Ok(())
    }
}
