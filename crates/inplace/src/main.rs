//! inplace - a command-line tool that keeps itself up to date
//!
//! This is the main entry point for the inplace command-line interface.

mod cli;
mod commands;
mod output;
mod version;

use clap::Parser;
use inplace_update::UpdateError;
use std::process::ExitCode;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use cli::{Cli, Commands};

/// Exit code for any failed command
const EXIT_FAILURE: u8 = 1;

/// Exit code when the executable could not be restored after a failed update
const EXIT_ROLLBACK_FAILED: u8 = 2;

#[tokio::main]
async fn main() -> ExitCode {
    // Initialize rustls crypto provider (required for rustls 0.23+)
    // This must be done before any TLS operations
    let _ = rustls::crypto::aws_lc_rs::default_provider().install_default();

    // Parse CLI args
    let cli = Cli::parse();

    // --debug on `update` is shorthand for -v
    let verbose = match &cli.command {
        Commands::Update(args) if args.debug => cli.verbose.max(1),
        _ => cli.verbose,
    };
    init_tracing(verbose, cli.quiet && verbose == 0);

    // Run command
    let result = match cli.command {
        Commands::Version(args) => commands::version::run(args),
        Commands::Update(args) => commands::update::run(args, cli.quiet).await,
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            output::error(&e.to_string());
            ExitCode::from(exit_code(&e))
        }
    }
}

/// Map a command failure to the process exit code
fn exit_code(err: &anyhow::Error) -> u8 {
    match err.downcast_ref::<UpdateError>() {
        Some(update_err) if update_err.is_rollback_failure() => EXIT_ROLLBACK_FAILED,
        _ => EXIT_FAILURE,
    }
}

/// Initialize tracing with appropriate verbosity
fn init_tracing(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("info"),
            1 => EnvFilter::new("debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    // Logs go to stderr so stdout only carries command output
    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .with(filter)
        .init();
}
