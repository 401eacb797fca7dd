//! Project config subcommands: generate, edit.

use anyhow::{bail, Context, Result};
use clap::{Subcommand, ValueEnum};
use console::style;

use skillforge_core::config::{generate_project_config_from_skills, merge_stack_with_skills, GenerateOptions};
use skillforge_core::matrix::resolver::{expand_selection, resolve_agent_skills_from_stack, resolve_stack};
use skillforge_core::matrix::SkillMatrix;
use skillforge_core::skill::relationships::{check_conflicts, resolve_required_skills};
use skillforge_infra::project::{config_path, load_project_config, save_project_config};
use skillforge_types::project::{InstallMode, ProjectConfig};

use crate::state::AppState;

#[derive(Subcommand)]
pub enum ConfigCommand {
    /// Generate .claude/config.yaml from selected skills or a stack.
    Generate {
        /// Project name (default: existing config name or the directory name).
        #[arg(long)]
        name: Option<String>,

        /// Skill id, alias-free directory id or author-qualified id. Repeatable.
        #[arg(long = "skill", short = 's')]
        skills: Vec<String>,

        /// Start from a stack's technology choices.
        #[arg(long)]
        stack: Option<String>,

        /// Short project description.
        #[arg(long)]
        description: Option<String>,

        /// How compiled output is installed.
        #[arg(long, value_enum)]
        install_mode: Option<InstallModeArg>,

        /// Domain tags recorded in the config. Repeatable.
        #[arg(long = "domain")]
        domains: Vec<String>,

        /// Also select every skill the selection requires.
        #[arg(long)]
        with_requires: bool,

        /// Ignore an existing config instead of preserving its settings.
        #[arg(long)]
        fresh: bool,
    },

    /// Add or remove skills in the existing config.
    Edit {
        /// Skill to add. Repeatable.
        #[arg(long)]
        add: Vec<String>,

        /// Skill to remove. Repeatable.
        #[arg(long)]
        remove: Vec<String>,
    },
}

#[derive(Clone, Copy, ValueEnum)]
pub enum InstallModeArg {
    Local,
    Plugin,
}

impl From<InstallModeArg> for InstallMode {
    fn from(arg: InstallModeArg) -> Self {
        match arg {
            InstallModeArg::Local => InstallMode::Local,
            InstallModeArg::Plugin => InstallMode::Plugin,
        }
    }
}

pub fn handle_config_command(cmd: ConfigCommand, state: &mut AppState) -> Result<()> {
    match cmd {
        ConfigCommand::Generate {
            name,
            skills,
            stack,
            description,
            install_mode,
            domains,
            with_requires,
            fresh,
        } => {
            let previous = if fresh {
                None
            } else {
                load_project_config(&state.project_dir)?
            };
            let opts = GenerateOptions {
                description,
                install_mode: install_mode.map(Into::into),
                domains,
                stack,
                previous: previous.as_ref(),
            };
            handle_generate(name, skills, with_requires, opts, state)
        }
        ConfigCommand::Edit { add, remove } => handle_edit(&add, &remove, state),
    }
}

// ---------------------------------------------------------------------------
// Generate
// ---------------------------------------------------------------------------

fn handle_generate(
    name: Option<String>,
    skills: Vec<String>,
    with_requires: bool,
    opts: GenerateOptions<'_>,
    state: &mut AppState,
) -> Result<()> {
    let matrix = state.matrix()?;

    let mut selection = skills;
    if let Some(stack_id) = &opts.stack {
        selection.extend(stack_selection(stack_id, &matrix, state)?);
    }
    if selection.is_empty() {
        bail!("Nothing selected. Pass --skill or --stack.");
    }

    let mut selection = expand_selection(&selection, &matrix);
    if with_requires {
        selection = resolve_required_skills(&selection, &matrix)?
            .into_iter()
            .filter(|id| matrix.contains(id))
            .collect();
    }
    check_conflicts(&selection, &matrix)?;

    let name = name
        .or_else(|| opts.previous.map(|p| p.name.clone()))
        .unwrap_or_else(|| default_project_name(state));

    let generated = generate_project_config_from_skills(&name, &selection, &matrix, opts)?;
    state.ctx.extend_warnings(generated.warnings);

    let path = save_project_config(&state.project_dir, &generated.config)?;
    print_config(state, &generated.config, &path.display().to_string())?;
    super::print_summary(state, "Generated project config");
    Ok(())
}

/// Every skill the stack assigns to any of its agents.
fn stack_selection(stack_id: &str, matrix: &SkillMatrix, state: &mut AppState) -> Result<Vec<String>> {
    let stack = resolve_stack(stack_id, matrix)?;
    let mut ids = Vec::new();
    for agent_id in stack.agent_ids() {
        let resolution = resolve_agent_skills_from_stack(agent_id, stack, matrix);
        state.ctx.extend_warnings(resolution.warnings);
        ids.extend(resolution.references.into_iter().map(|r| r.id));
    }
    Ok(ids)
}

fn default_project_name(state: &AppState) -> String {
    std::fs::canonicalize(&state.project_dir)
        .ok()
        .and_then(|p| p.file_name().map(|n| n.to_string_lossy().into_owned()))
        .unwrap_or_else(|| "project".to_string())
}

// ---------------------------------------------------------------------------
// Edit
// ---------------------------------------------------------------------------

fn handle_edit(add: &[String], remove: &[String], state: &mut AppState) -> Result<()> {
    let base = load_project_config(&state.project_dir)?.with_context(|| {
        format!(
            "No project config at {}",
            config_path(&state.project_dir).display()
        )
    })?;
    let matrix = state.matrix()?;

    let added = expand_selection(add, &matrix);
    let removed = expand_selection(remove, &matrix);
    let mut selection: Vec<String> = base
        .skill_ids()
        .into_iter()
        .filter(|id| !removed.iter().any(|r| r.as_str() == *id))
        .map(str::to_string)
        .collect();
    for id in added {
        if !selection.contains(&id) {
            selection.push(id);
        }
    }
    check_conflicts(&selection, &matrix)?;

    let merged = merge_stack_with_skills(&base, &selection, &matrix)?;
    state.ctx.extend_warnings(merged.warnings);
    let merged = merged.config;
    if merged == base {
        if state.json {
            println!("{}", serde_json::json!({ "changed": false }));
        } else if state.prints_text() {
            println!("  {} Config unchanged", style("·").dim());
        }
        return Ok(());
    }

    let path = save_project_config(&state.project_dir, &merged)?;
    print_config(state, &merged, &path.display().to_string())?;
    super::print_summary(state, "Updated project config");
    Ok(())
}

fn print_config(state: &AppState, config: &ProjectConfig, path: &str) -> Result<()> {
    if state.json {
        println!("{}", serde_json::to_string_pretty(config)?);
        return Ok(());
    }
    if !state.prints_text() {
        return Ok(());
    }

    println!();
    println!(
        "  {} {} ({})",
        style("Config").bold(),
        style(&config.name).cyan(),
        style(path).dim()
    );
    println!("  Skills: {}", config.skills.len());
    for agent in &config.agents {
        let count: usize = config
            .agent_skills
            .get(agent)
            .map(|categories| categories.values().map(Vec::len).sum())
            .unwrap_or(0);
        println!("    {} {} ({count} skills)", style("•").dim(), agent);
    }
    println!();
    Ok(())
}
