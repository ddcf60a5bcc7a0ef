//! Update command

use anyhow::Result;
use inplace_core::HierarchicalConfigLoader;
use inplace_update::{
    GitHubReleaseSource, UpdateCheck, UpdateOptions, UpdateOutcome, Updater, VERSION,
};
use std::sync::Arc;
use tracing::debug;

use crate::cli::UpdateArgs;
use crate::output;

pub async fn run(args: UpdateArgs, quiet: bool) -> Result<()> {
    let config = HierarchicalConfigLoader::new()?.load_runtime_config()?;
    debug!(
        "Updating from {}/{} via {} (debug: {})",
        config.github.repo_owner, config.github.repo_name, config.github.api_url, args.debug
    );

    let source = GitHubReleaseSource::from_config(&config)?;

    let progress = output::download_bar(quiet);
    let bar = progress.clone();
    let options = UpdateOptions::from_config(&config)
        .with_progress(Arc::new(move |n: u64| bar.set_position(n)));

    let updater = Updater::new(
        source,
        &config.github.repo_owner,
        &config.github.repo_name,
        VERSION,
        options,
    );

    let spinner = output::spinner("Checking for updates...", quiet);
    let check = updater.check().await;
    spinner.finish_and_clear();

    let release = match check? {
        UpdateCheck::UpToDate { .. } => {
            println!("Already up to date");
            return Ok(());
        }
        UpdateCheck::Available(release) => release,
    };

    println!("Updating to {}", release.display_name());

    let plan = updater.plan(&release)?;
    progress.set_length(plan.size);
    progress.set_message(format!("Downloading {}", plan.asset_name));

    let outcome = updater.apply(&release).await;
    progress.finish_and_clear();

    // stdout only carries the update notice; the result is logged on stderr
    if let UpdateOutcome::Updated { bytes_written, .. } = outcome? {
        debug!("Installed {} ({} bytes)", plan.asset_name, bytes_written);
    }

    Ok(())
}
