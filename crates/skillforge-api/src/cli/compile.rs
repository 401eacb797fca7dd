//! `sforge compile`: write the project's agents into `.claude/agents/`.

use anyhow::{bail, Result};
use console::style;
use skillforge_types::outcome::RunOutcome;

use skillforge_infra::project::{config_path, compile_project_agents, load_project_config};

use crate::state::AppState;

pub fn compile(state: &mut AppState) -> Result<()> {
    let Some(config) = load_project_config(&state.project_dir)? else {
        bail!(
            "No project config at {}. Run 'sforge config generate' first.",
            config_path(&state.project_dir).display()
        );
    };
    let matrix = state.matrix()?;

    let report = compile_project_agents(&state.project_dir, &config, &matrix)?;
    state.ctx.extend_warnings(report.warnings);
    let outcome = state
        .ctx
        .batch_outcome(report.failed.len(), config.agents.len(), "agents");

    if state.json {
        let out = serde_json::json!({
            "written": report.written,
            "failed": report
                .failed
                .iter()
                .map(|(agent, cause)| serde_json::json!({ "agent": agent, "cause": cause }))
                .collect::<Vec<_>>(),
            "outcome": outcome,
        });
        println!("{}", serde_json::to_string_pretty(&out)?);
    } else if state.prints_text() {
        println!();
        for path in &report.written {
            println!("  {} {}", style("✓").green(), path.display());
        }
        for (agent, cause) in &report.failed {
            println!("  {} {}: {cause}", style("✗").red(), style(agent).bold());
        }
        println!();
    }

    if let RunOutcome::Failed { cause } = outcome {
        bail!(cause);
    }

    super::print_summary(state, &format!("Compiled {} agents", report.written.len()));
    Ok(())
}
