//! Plugin packaging subcommands: plugins, stack, marketplace.
//!
//! Builds read the source tree only; project-local skills are never
//! packaged.

use anyhow::{bail, Result};
use clap::Subcommand;
use comfy_table::{presets, Cell, Color, ContentArrangement, Table};
use console::style;

use skillforge_core::matrix::resolver::resolve_skill_reference;
use skillforge_infra::plugin::marketplace::build_marketplace;
use skillforge_infra::plugin::skill::{compile_all_skill_plugins, compile_skill_plugin, PluginBuildReport};
use skillforge_infra::plugin::stack::compile_stack_plugin;
use skillforge_infra::plugin::CompiledPlugin;
use skillforge_types::outcome::RunOutcome;
use skillforge_types::plugin::PluginAuthor;

use crate::state::AppState;

#[derive(Subcommand)]
pub enum BuildCommand {
    /// Package source skills as plugins (all, or one with --skill).
    Plugins {
        /// Only package this skill.
        #[arg(long)]
        skill: Option<String>,
    },

    /// Package a stack with its agents and stack document.
    Stack {
        /// Stack id from config/stacks.yaml.
        stack: String,

        /// Author recorded in the plugin manifest.
        #[arg(long, default_value = "unknown")]
        author: String,
    },

    /// Index every compiled plugin under the output directory.
    Marketplace {
        /// Marketplace name.
        #[arg(long, default_value = "skillforge")]
        name: String,

        /// Marketplace owner.
        #[arg(long)]
        owner: Option<String>,
    },
}

pub fn handle_build_command(cmd: BuildCommand, state: &mut AppState) -> Result<()> {
    match cmd {
        BuildCommand::Plugins { skill } => handle_plugins(skill.as_deref(), state),
        BuildCommand::Stack { stack, author } => handle_stack(&stack, &author, state),
        BuildCommand::Marketplace { name, owner } => handle_marketplace(&name, owner, state),
    }
}

fn handle_plugins(skill: Option<&str>, state: &mut AppState) -> Result<()> {
    let matrix = state.source_matrix()?;

    let report = match skill {
        Some(id) => {
            let definition = resolve_skill_reference(id, &matrix)?;
            PluginBuildReport {
                plugins: vec![compile_skill_plugin(definition, &state.output_dir)?],
                failed: Vec::new(),
            }
        }
        None => compile_all_skill_plugins(&matrix, &state.output_dir),
    };
    let outcome = state.ctx.batch_outcome(
        report.failed.len(),
        report.plugins.len() + report.failed.len(),
        "skill plugins",
    );

    if state.json {
        let out = serde_json::json!({
            "plugins": plugin_rows(&report.plugins),
            "failed": report
                .failed
                .iter()
                .map(|(skill, cause)| serde_json::json!({ "skill": skill, "cause": cause }))
                .collect::<Vec<_>>(),
            "outcome": outcome,
        });
        println!("{}", serde_json::to_string_pretty(&out)?);
    } else {
        print_plugin_table(state, &report.plugins);
        if state.prints_text() && report.has_failures() {
            for (skill, cause) in &report.failed {
                println!("  {} {}: {cause}", style("✗").red(), style(skill).bold());
            }
            println!();
        }
    }

    if let RunOutcome::Failed { cause } = outcome {
        bail!(cause);
    }

    super::print_summary(state, &format!("Built {} skill plugins", report.plugins.len()));
    Ok(())
}

fn handle_stack(stack: &str, author: &str, state: &mut AppState) -> Result<()> {
    let matrix = state.source_matrix()?;
    let plugin = compile_stack_plugin(stack, &matrix, &state.output_dir, author)?;
    state.ctx.extend_warnings(plugin.warnings.clone());

    print_plugins(state, std::slice::from_ref(&plugin))?;
    super::print_summary(state, &format!("Built {}", plugin.name));
    Ok(())
}

fn handle_marketplace(name: &str, owner: Option<String>, state: &mut AppState) -> Result<()> {
    let build = build_marketplace(&state.output_dir, name, owner.map(PluginAuthor::named))?;
    state.ctx.extend_warnings(build.warnings);

    if state.json {
        println!("{}", serde_json::to_string_pretty(&build.index)?);
    } else if state.prints_text() {
        println!();
        println!(
            "  {} {} plugins indexed in {}",
            style("📦").bold(),
            build.index.plugins.len(),
            style(build.path.display()).dim()
        );
        for plugin in &build.index.plugins {
            println!(
                "    {} {} {}",
                style("•").dim(),
                style(&plugin.name).cyan(),
                style(&plugin.version).dim()
            );
        }
        println!();
    }
    super::print_summary(state, "Built marketplace");
    Ok(())
}

fn plugin_rows(plugins: &[CompiledPlugin]) -> Vec<serde_json::Value> {
    plugins
        .iter()
        .map(|p| {
            serde_json::json!({
                "name": p.name,
                "version": p.manifest.version,
                "path": p.path,
                "changed": p.changed,
            })
        })
        .collect()
}

fn print_plugins(state: &AppState, plugins: &[CompiledPlugin]) -> Result<()> {
    if state.json {
        println!("{}", serde_json::to_string_pretty(&plugin_rows(plugins))?);
    } else {
        print_plugin_table(state, plugins);
    }
    Ok(())
}

fn print_plugin_table(state: &AppState, plugins: &[CompiledPlugin]) {
    if !state.prints_text() || plugins.is_empty() {
        return;
    }

    let mut table = Table::new();
    table
        .load_preset(presets::UTF8_FULL_CONDENSED)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec![
            Cell::new("Plugin").fg(Color::Cyan),
            Cell::new("Version"),
            Cell::new("Status"),
        ]);
    for plugin in plugins {
        let status = if plugin.changed {
            Cell::new("updated").fg(Color::Yellow)
        } else {
            Cell::new("unchanged").fg(Color::Green)
        };
        table.add_row(vec![
            Cell::new(&plugin.name),
            Cell::new(&plugin.manifest.version),
            status,
        ]);
    }
    println!();
    println!("{table}");
    println!();
}
