//! CLI argument parsing with clap

use clap::{Args, Parser, Subcommand};

/// inplace - a command-line tool that updates itself from GitHub releases
#[derive(Parser, Debug)]
#[command(name = "inplace")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Show version information
    Version(VersionArgs),

    /// Update to the latest GitHub release
    #[command(long_about = UPDATE_LONG_ABOUT)]
    Update(UpdateArgs),
}

const UPDATE_LONG_ABOUT: &str = "\
Update to the latest GitHub release.

Fetches the latest release of the configured repository, picks the first asset
whose name contains this operating system's identifier and replaces the running
executable with it. The original is restored if the replacement fails.

A GitHub token is read from the GITHUB_TOKEN environment variable. The token is
required for private repositories. Set INPLACE_GITHUB_TOKEN_ENV (or github.token-env
in ~/.inplace/runtime.yaml) to read it from a different variable.";

// Version command
#[derive(Args, Debug)]
pub struct VersionArgs {
    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

// Update command
#[derive(Args, Debug)]
pub struct UpdateArgs {
    /// Print debug diagnostics (release assets, chosen paths)
    #[arg(long)]
    pub debug: bool,
}
