//! Matrix inspection commands: list, validate.

use anyhow::{bail, Result};
use comfy_table::{presets, Cell, Color, ContentArrangement, Table};
use console::style;

use skillforge_core::matrix::resolver::{resolve_agent, resolve_agent_skills_from_stack};
use skillforge_core::matrix::SkillMatrix;

use crate::state::AppState;

pub fn list(state: &mut AppState) -> Result<()> {
    let matrix = state.matrix()?;

    if state.json {
        let out: Vec<_> = matrix
            .skills
            .values()
            .map(|s| {
                serde_json::json!({
                    "id": s.id,
                    "category": s.category,
                    "description": s.description,
                    "local": s.local,
                    "path": s.path,
                })
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&out)?);
        return Ok(());
    }
    if !state.prints_text() {
        return Ok(());
    }

    if matrix.skills.is_empty() {
        println!();
        println!(
            "  No skills found under {}.",
            style(state.source_root.display()).dim()
        );
        println!();
        return Ok(());
    }

    let mut table = Table::new();
    table
        .load_preset(presets::UTF8_FULL_CONDENSED)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec![
            Cell::new("Skill").fg(Color::Cyan),
            Cell::new("Category"),
            Cell::new("Origin"),
            Cell::new("Description"),
        ]);
    for skill in matrix.skills.values() {
        let origin = if skill.local {
            Cell::new("local").fg(Color::Green)
        } else {
            Cell::new("source")
        };
        table.add_row(vec![
            Cell::new(&skill.id),
            Cell::new(&skill.category),
            origin,
            Cell::new(&skill.description),
        ]);
    }

    println!();
    println!("{table}");
    println!(
        "  {} skills ({} local), {} stacks, {} agents",
        matrix.skills.len(),
        matrix.local_skills().count(),
        matrix.stacks.len(),
        matrix.agents.len()
    );
    println!();
    Ok(())
}

/// Problems that make the source tree unusable for stack builds.
fn stack_problems(matrix: &SkillMatrix) -> Vec<String> {
    let mut problems = Vec::new();
    for stack in &matrix.stacks {
        for (agent_id, technologies) in &stack.agents {
            if let Err(err) = resolve_agent(agent_id, matrix) {
                problems.push(format!("stack '{}': {err}", stack.id));
            }
            for alias in technologies.values() {
                if let Some(target) = matrix.aliases.get(alias) {
                    if !matrix.contains(target) {
                        problems.push(format!(
                            "stack '{}' agent '{agent_id}': alias '{alias}' points to missing skill '{target}'",
                            stack.id
                        ));
                    }
                }
            }
        }
    }
    problems
}

pub fn validate(state: &mut AppState) -> Result<()> {
    let matrix = state.matrix()?;

    let mut stale = Vec::new();
    for stack in &matrix.stacks {
        for agent_id in stack.agent_ids() {
            stale.extend(resolve_agent_skills_from_stack(agent_id, stack, &matrix).warnings);
        }
    }
    state.ctx.extend_warnings(stale);

    let problems = stack_problems(&matrix);

    if state.json {
        let out = serde_json::json!({
            "warnings": state.ctx.warnings(),
            "problems": problems,
        });
        println!("{}", serde_json::to_string_pretty(&out)?);
    } else if state.prints_text() {
        println!();
        for warning in state.ctx.warnings() {
            println!("  {} {warning}", style("!").yellow());
        }
        for problem in &problems {
            println!("  {} {problem}", style("✗").red());
        }
        if state.ctx.warnings().is_empty() && problems.is_empty() {
            println!("  {} Source tree is valid", style("✓").green());
        }
        println!();
    }

    if let Some(first) = problems.first() {
        bail!("Validation failed: {first}");
    }
    super::print_summary(state, &format!("Validated {} skills", matrix.skills.len()));
    Ok(())
}
