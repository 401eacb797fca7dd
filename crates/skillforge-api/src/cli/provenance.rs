//! Fork provenance commands: outdated, diff, fork.
//!
//! Classification is recomputed from disk on every run. "No differences"
//! and "everything current" are successful outcomes.

use anyhow::{bail, Result};
use chrono::Utc;
use comfy_table::{presets, Cell, Color, ContentArrangement, Table};
use console::style;
use dialoguer::Confirm;

use skillforge_core::matrix::resolver::{resolve_skill_reference, skill_suggestions};
use skillforge_infra::provenance::{diff_report, outdated_report};
use skillforge_types::error::{PipelineError, ReferenceKind};
use skillforge_types::provenance::ForkStatus;

use crate::state::AppState;

// ---------------------------------------------------------------------------
// Outdated
// ---------------------------------------------------------------------------

pub fn outdated(state: &mut AppState) -> Result<()> {
    let source = state.source_matrix()?;
    let (report, warnings) = outdated_report(&state.local_store(), &source)?;
    state.ctx.extend_warnings(warnings);

    if state.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }
    if !state.prints_text() {
        return Ok(());
    }

    if report.entries.is_empty() {
        println!();
        println!("  No local skills. Use 'sforge fork <skill>' to fork one.");
        println!();
        return Ok(());
    }

    let mut table = Table::new();
    table
        .load_preset(presets::UTF8_FULL_CONDENSED)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec![
            Cell::new("Skill").fg(Color::Cyan),
            Cell::new("Status"),
            Cell::new("Forked from"),
            Cell::new("Note"),
        ]);
    for entry in &report.entries {
        let color = match entry.status {
            ForkStatus::Current => Color::Green,
            ForkStatus::Outdated => Color::Yellow,
            ForkStatus::LocalOnly => Color::Blue,
        };
        table.add_row(vec![
            Cell::new(&entry.skill_id),
            Cell::new(entry.status).fg(color),
            Cell::new(entry.forked_from.as_deref().unwrap_or("-")),
            Cell::new(entry.note.as_deref().unwrap_or("")),
        ]);
    }

    println!();
    println!("{table}");
    println!(
        "  {} current, {} outdated, {} local-only",
        style(report.summary.current).green(),
        style(report.summary.outdated).yellow(),
        style(report.summary.local_only).blue()
    );
    println!();
    super::print_summary(state, "Checked local skills");
    Ok(())
}

// ---------------------------------------------------------------------------
// Diff
// ---------------------------------------------------------------------------

pub fn diff(skill: Option<&str>, state: &mut AppState) -> Result<()> {
    let source = state.source_matrix()?;
    let (report, warnings) = diff_report(&state.local_store(), &source, skill)?;
    state.ctx.extend_warnings(warnings);

    if state.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }
    if !state.prints_text() {
        return Ok(());
    }

    println!();
    if !report.has_differences() {
        println!("  {} No differences from source", style("✓").green());
        println!();
        return Ok(());
    }

    for skill_diff in report.diffs.iter().filter(|d| !d.files.is_empty()) {
        println!(
            "  {} {} ({})",
            style("Fork").bold(),
            style(&skill_diff.skill_id).cyan(),
            skill_diff.status
        );
        for file in &skill_diff.files {
            for line in file.diff.lines() {
                let styled = if line.starts_with("+++") || line.starts_with("---") {
                    style(line).bold()
                } else if line.starts_with('+') {
                    style(line).green()
                } else if line.starts_with('-') {
                    style(line).red()
                } else if line.starts_with("@@") {
                    style(line).cyan()
                } else {
                    style(line)
                };
                println!("  {styled}");
            }
        }
        println!();
    }
    super::print_summary(state, "Compared forks");
    Ok(())
}

// ---------------------------------------------------------------------------
// Fork
// ---------------------------------------------------------------------------

pub fn fork(skill: &str, force: bool, state: &mut AppState) -> Result<()> {
    let source = state.source_matrix()?;
    let id = source.aliases.get(skill).map(String::as_str).unwrap_or(skill);
    let definition = resolve_skill_reference(id, &source).map_err(|_| PipelineError::ReferenceNotFound {
        kind: ReferenceKind::Skill,
        id: skill.to_string(),
        hint: skill_suggestions(skill, &source),
    })?;

    let store = state.local_store();
    let dir_name = definition
        .path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();

    let mut overwrite = force;
    if !force && store.skill_exists(&dir_name) {
        if state.json || state.ctx.is_quiet() {
            bail!("Fork '{dir_name}' already exists. Pass --force to replace it.");
        }
        overwrite = Confirm::new()
            .with_prompt(format!("Replace existing fork '{dir_name}'?"))
            .default(false)
            .interact()?;
        if !overwrite {
            println!("  Cancelled.");
            return Ok(());
        }
    }

    let path = store.fork_skill(definition, Utc::now().date_naive(), overwrite)?;

    if state.json {
        let out = serde_json::json!({
            "skill": definition.id,
            "path": path,
            "content_hash": definition.content_hash,
        });
        println!("{}", serde_json::to_string_pretty(&out)?);
    } else if state.prints_text() {
        println!();
        println!(
            "  {} Forked {} into {}",
            style("✓").green().bold(),
            style(&definition.id).cyan(),
            style(path.display()).dim()
        );
        println!();
    }
    Ok(())
}
