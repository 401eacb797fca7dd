//! CLI command definitions and dispatch for the `sforge` binary.
//!
//! Uses clap derive macros for argument parsing. Commands map one-to-one to
//! pipeline operations (e.g., `sforge build stack nextjs`, `sforge outdated`).

pub mod build;
pub mod compile;
pub mod config;
pub mod matrix;
pub mod provenance;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use clap_complete::Shell;
use console::style;

use skillforge_infra::filesystem::SOURCE_ENV_VAR;
use skillforge_types::outcome::RunOutcome;

use crate::state::AppState;

/// Compile skills, agents and stacks into plugins and project configs.
#[derive(Parser)]
#[command(name = "sforge", version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Output machine-readable JSON instead of styled text.
    #[arg(long, global = true)]
    pub json: bool,

    /// Suppress all output except errors.
    #[arg(long, global = true)]
    pub quiet: bool,

    /// Detailed output (-v for verbose, -vv for debug/trace).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Export tracing spans to stdout via OpenTelemetry. Not allowed with
    /// --json, which owns stdout.
    #[arg(long, global = true, conflicts_with = "json")]
    pub otel: bool,

    /// Source root holding skills/, agents/, stacks/ and config/.
    #[arg(long, global = true, env = SOURCE_ENV_VAR)]
    pub source: Option<PathBuf>,

    /// Project directory containing .claude/.
    #[arg(long, global = true, default_value = ".")]
    pub project: PathBuf,

    /// Output directory for compiled plugins.
    #[arg(long, global = true, default_value = "dist")]
    pub output: PathBuf,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Compile the project's agents into .claude/agents/.
    Compile,

    /// Create or update the project config.
    Config {
        #[command(subcommand)]
        action: config::ConfigCommand,
    },

    /// Package plugins and the marketplace index.
    Build {
        #[command(subcommand)]
        target: build::BuildCommand,
    },

    /// Compare local skills against their source.
    Outdated,

    /// Show unified diffs between forks and their source.
    Diff {
        /// Local skill id or directory (default: all forks).
        skill: Option<String>,
    },

    /// Copy a source skill into the project for local editing.
    Fork {
        /// Source skill id or alias.
        skill: String,

        /// Replace an existing fork without asking.
        #[arg(long)]
        force: bool,
    },

    /// List all skills in the merged matrix.
    #[command(alias = "ls")]
    List,

    /// Check the source tree for broken skills and stale aliases.
    Validate,

    /// Generate shell completions.
    Completions {
        /// Shell to generate completions for.
        shell: Shell,
    },
}

/// Print the closing summary line for a successful command.
///
/// Warnings are listed under `-v`; otherwise only counted.
pub fn print_summary(state: &AppState, action: &str) {
    if !state.prints_text() {
        return;
    }
    let outcome = state.ctx.outcome();
    match &outcome {
        RunOutcome::Success => {
            println!("  {} {action}", style("✓").green().bold());
        }
        RunOutcome::SuccessWithWarnings { warnings } => {
            println!(
                "  {} {action} ({} warning{})",
                style("✓").yellow().bold(),
                warnings.len(),
                if warnings.len() == 1 { "" } else { "s" }
            );
            if state.ctx.verbosity == skillforge_core::context::Verbosity::Verbose {
                for warning in warnings {
                    println!("    {} {warning}", style("!").yellow());
                }
            }
        }
        RunOutcome::Failed { cause } => {
            println!("  {} {cause}", style("✗").red().bold());
        }
    }
}
