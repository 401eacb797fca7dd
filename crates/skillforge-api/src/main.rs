//! skillforge CLI entry point.
//!
//! Binary name: `sforge`
//!
//! Parses CLI arguments, sets up tracing, creates the per-invocation
//! pipeline context, then dispatches to the command handler.

mod cli;
mod state;

use std::process::ExitCode;

use clap::Parser;
use clap_complete::generate;

use skillforge_core::context::Verbosity;
use skillforge_observe::tracing_setup::{init_tracing, shutdown_tracing};

use cli::{Cli, Commands};
use state::AppState;

fn main() -> ExitCode {
    let cli = Cli::parse();

    // Set up tracing based on verbosity
    let filter = match cli.verbose {
        0 if cli.quiet => "error",
        0 => "warn",
        1 => "info,skillforge=debug",
        _ => "trace",
    };
    if let Err(e) = init_tracing(filter, cli.otel) {
        eprintln!("Warning: tracing setup failed: {e}");
    }

    let result = run(cli);
    shutdown_tracing();

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{} {e:#}", console::style("Error:").red().bold());
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let verbosity = if cli.quiet {
        Verbosity::Quiet
    } else if cli.verbose > 0 {
        Verbosity::Verbose
    } else {
        Verbosity::Normal
    };
    let mut state = AppState::init(
        cli.source.as_deref(),
        cli.project,
        cli.output,
        cli.json,
        verbosity,
    );

    let _span = tracing::info_span!("sforge").entered();

    match cli.command {
        Commands::Compile => cli::compile::compile(&mut state)?,
        Commands::Config { action } => cli::config::handle_config_command(action, &mut state)?,
        Commands::Build { target } => cli::build::handle_build_command(target, &mut state)?,
        Commands::Outdated => cli::provenance::outdated(&mut state)?,
        Commands::Diff { skill } => cli::provenance::diff(skill.as_deref(), &mut state)?,
        Commands::Fork { skill, force } => cli::provenance::fork(&skill, force, &mut state)?,
        Commands::List => cli::matrix::list(&mut state)?,
        Commands::Validate => cli::matrix::validate(&mut state)?,
        Commands::Completions { shell } => {
            let mut cmd = <Cli as clap::CommandFactory>::command();
            generate(shell, &mut cmd, "sforge", &mut std::io::stdout());
        }
    }

    Ok(())
}
