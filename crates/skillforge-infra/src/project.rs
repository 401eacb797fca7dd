//! Project config persistence and agent compilation into
//! `{project}/.claude/agents/`.

use std::path::{Path, PathBuf};

use skillforge_core::compiler::compile_config_agent;
use skillforge_core::config::defaults::{LOCAL_AGENTS_DIR, LOCAL_SKILLS_DIR, PROJECT_CONFIG_PATH};
use skillforge_core::config::validate_project_config;
use skillforge_core::matrix::SkillMatrix;
use skillforge_types::error::{PipelineError, PipelineWarning};
use skillforge_types::project::ProjectConfig;

use crate::filesystem::{read_yaml_opt, write_text};

pub fn config_path(project_dir: &Path) -> PathBuf {
    project_dir.join(PROJECT_CONFIG_PATH)
}

/// Directory scanned for local skill overrides.
pub fn local_skills_dir(project_dir: &Path) -> PathBuf {
    project_dir.join(LOCAL_SKILLS_DIR)
}

/// Read `.claude/config.yaml`. A missing file yields `None`.
pub fn load_project_config(project_dir: &Path) -> Result<Option<ProjectConfig>, PipelineError> {
    read_yaml_opt(&config_path(project_dir))
}

/// Validate and write `.claude/config.yaml`.
pub fn save_project_config(project_dir: &Path, config: &ProjectConfig) -> Result<PathBuf, PipelineError> {
    validate_project_config(config)?;

    let yaml = serde_yaml_ng::to_string(config).map_err(|e| PipelineError::Serialization {
        what: "project config".to_string(),
        reason: e.to_string(),
    })?;
    let path = config_path(project_dir);
    write_text(&path, &yaml)?;
    tracing::info!(path = %path.display(), "Wrote project config");
    Ok(path)
}

/// Result of compiling a project's agents.
#[derive(Debug, Default)]
pub struct AgentCompileReport {
    pub written: Vec<PathBuf>,
    /// Agents that failed, with the single-sentence cause.
    pub failed: Vec<(String, String)>,
    pub warnings: Vec<PipelineWarning>,
}

/// Compile every agent listed in the config into `.claude/agents/<agent>.md`.
///
/// A failing agent is recorded and skipped; its siblings still compile and
/// files written earlier are kept.
pub fn compile_project_agents(
    project_dir: &Path,
    config: &ProjectConfig,
    matrix: &SkillMatrix,
) -> Result<AgentCompileReport, PipelineError> {
    validate_project_config(config)?;

    let agents_dir = project_dir.join(LOCAL_AGENTS_DIR);
    let mut report = AgentCompileReport::default();

    for agent_id in &config.agents {
        match compile_config_agent(agent_id, config, matrix) {
            Ok((document, warnings)) => {
                let path = agents_dir.join(format!("{agent_id}.md"));
                write_text(&path, &document)?;
                tracing::info!(agent = %agent_id, path = %path.display(), "Compiled agent");
                report.written.push(path);
                report.warnings.extend(warnings);
            }
            Err(err) => {
                tracing::warn!(agent = %agent_id, error = %err, "Agent failed to compile");
                report.failed.push((agent_id.clone(), err.to_string()));
            }
        }
    }

    Ok(report)
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use skillforge_types::assignment::SkillAssignment;

    use super::*;
    use crate::source::load_matrix;
    use crate::source::tests::{write_agent, write_source_config, write_source_skill};
    use tempfile::tempdir;

    #[test]
    fn config_save_and_load() {
        let dir = tempdir().unwrap();
        assert!(load_project_config(dir.path()).unwrap().is_none());

        let mut config = ProjectConfig::new("demo");
        config.skills.push(SkillAssignment::Plain("react (@acme)".to_string()));
        save_project_config(dir.path(), &config).unwrap();

        let loaded = load_project_config(dir.path()).unwrap().unwrap();
        assert_eq!(loaded, config);
        assert!(dir.path().join(".claude/config.yaml").exists());
    }

    #[test]
    fn invalid_config_is_not_saved() {
        let dir = tempdir().unwrap();
        let mut config = ProjectConfig::new("demo");
        let mut categories = BTreeMap::new();
        categories.insert(
            "framework".to_string(),
            vec![SkillAssignment::Plain("react (@acme)".to_string())],
        );
        config.agent_skills.insert("web-developer".to_string(), categories);

        let err = save_project_config(dir.path(), &config).unwrap_err();
        assert!(matches!(err, PipelineError::Validation { .. }));
        assert!(!config_path(dir.path()).exists());
    }

    #[test]
    fn failing_agent_does_not_stop_siblings() {
        let dir = tempdir().unwrap();
        let source = dir.path().join("source");
        let project = dir.path().join("project");
        write_source_skill(&source, "web/framework", "react", "react (@acme)", "x");
        write_source_skill(&source, "web/styling", "scss", "scss (@acme)", "x");
        write_source_config(&source);
        write_agent(&source, "web-developer");

        let matrix = load_matrix(&source, None, &mut Vec::new()).unwrap();

        let mut config = ProjectConfig::new("demo");
        config.stack = Some("nextjs".to_string());
        config.agents = vec!["api-developer".to_string(), "web-developer".to_string()];

        let report = compile_project_agents(&project, &config, &matrix).unwrap();
        assert_eq!(report.written.len(), 1);
        assert_eq!(report.failed.len(), 1);
        assert_eq!(report.failed[0].0, "api-developer");
        assert!(report.failed[0].1.contains("Agent 'api-developer' not found"));

        let doc = std::fs::read_to_string(project.join(".claude/agents/web-developer.md")).unwrap();
        assert!(doc.contains("react (@acme)"));
        assert!(doc.contains("### scss (@acme)"));
        // Stale "tailwind" alias was skipped with a warning.
        assert!(report
            .warnings
            .iter()
            .any(|w| matches!(w, PipelineWarning::StaleAlias { alias, .. } if alias == "tailwind")));
    }
}
