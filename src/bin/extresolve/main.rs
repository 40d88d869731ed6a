//! extresolve CLI - build-time configuration for the _multiprocess extension

use std::io::IsTerminal;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use extresolve::builder::BuildFailure;
use extresolve::util::diagnostic::{emit, suggestions, Diagnostic};
use extresolve::ResolveError;

mod cli;
mod commands;

use cli::{Cli, Commands};

fn main() {
    let cli = Cli::parse();
    let color = !cli.no_color && std::io::stderr().is_terminal();

    if let Err(e) = run(cli) {
        report(&e, color);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    // Set up logging
    let filter = if cli.verbose {
        EnvFilter::new("extresolve=debug")
    } else {
        EnvFilter::new("extresolve=info")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .init();

    // Execute command
    match cli.command {
        Commands::Plan(args) => commands::plan::execute(args, cli.no_color),
        Commands::Run(args) => commands::run::execute(args, cli.no_color),
        Commands::Profile(args) => commands::profile::execute(args),
    }
}

/// Domain errors get a full diagnostic; anything else a one-line chain.
fn report(e: &anyhow::Error, color: bool) {
    if let Some(err) = e.downcast_ref::<ResolveError>() {
        emit(&err.to_diagnostic(), color);
    } else if let Some(failure) = e.downcast_ref::<BuildFailure>() {
        let diag = failure
            .context
            .iter()
            .fold(Diagnostic::error(failure.to_string()), |d, line| {
                d.with_context(line.clone())
            })
            .with_suggestion(suggestions::BUILD_FAILED);
        emit(&diag, color);
    } else {
        eprintln!("error: {:#}", e);
    }
}
