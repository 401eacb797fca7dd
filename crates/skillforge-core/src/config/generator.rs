//! Build an agent-centric [`ProjectConfig`] from a list of selected skills.

use std::collections::BTreeSet;

use skillforge_types::assignment::SkillAssignment;
use skillforge_types::error::{PipelineError, PipelineWarning};
use skillforge_types::project::{AgentSkillMap, InstallMode, ProjectConfig};
use skillforge_types::skill::SkillDefinition;

use super::defaults::{is_key_subcategory, LOCAL_SKILLS_DIR};
use crate::matrix::resolver::{expand_selection, resolve_skill_reference};
use crate::matrix::SkillMatrix;
use crate::skill::relationships::missing_requirements;

/// Optional inputs to config generation.
#[derive(Debug, Clone, Default)]
pub struct GenerateOptions<'a> {
    pub description: Option<String>,
    pub install_mode: Option<InstallMode>,
    pub domains: Vec<String>,
    pub stack: Option<String>,
    /// The config being edited. Its name, description, install mode, domains,
    /// stack and local skill paths are preserved.
    pub previous: Option<&'a ProjectConfig>,
}

/// A generated config plus the non-fatal issues found while building it.
#[derive(Debug, Clone)]
pub struct GeneratedConfig {
    pub config: ProjectConfig,
    pub warnings: Vec<PipelineWarning>,
}

/// Generate a project config from selected skill ids.
///
/// Directory ids are expanded first; any id that still does not resolve is a
/// fatal [`PipelineError::ReferenceNotFound`]. Each skill is reverse-mapped
/// from its category to the agents consuming it, and lands in those agents'
/// buckets under its subcategory.
pub fn generate_project_config_from_skills(
    name: &str,
    selected: &[String],
    matrix: &SkillMatrix,
    opts: GenerateOptions<'_>,
) -> Result<GeneratedConfig, PipelineError> {
    let ids = expand_selection(selected, matrix);
    let skills = ids
        .iter()
        .map(|id| resolve_skill_reference(id, matrix))
        .collect::<Result<Vec<_>, _>>()?;

    let mut config = match opts.previous {
        Some(previous) => {
            let mut config = ProjectConfig::new(previous.name.clone());
            config.description = previous.description.clone();
            config.install_mode = previous.install_mode;
            config.domains = previous.domains.clone();
            config.stack = previous.stack.clone();
            config
        }
        None => ProjectConfig::new(name),
    };
    if opts.description.is_some() {
        config.description = opts.description;
    }
    if let Some(mode) = opts.install_mode {
        config.install_mode = mode;
    }
    if !opts.domains.is_empty() {
        config.domains = opts.domains;
    }
    if opts.stack.is_some() {
        config.stack = opts.stack;
    }

    let mut warnings = Vec::new();
    let mut agents = BTreeSet::new();

    for skill in &skills {
        let local_path = previous_local_path(opts.previous, &skill.id)
            .or_else(|| local_assignment_path(skill));

        config.skills.push(SkillAssignment::for_skill(
            &skill.id,
            local_path.as_deref(),
            false,
        ));

        let assigned = assign_to_agents(&mut config.agent_skills, skill, matrix, local_path.as_deref());
        if assigned.is_empty() {
            tracing::warn!(skill = %skill.id, category = %skill.category, "No agent consumes category");
            warnings.push(PipelineWarning::UnmappedCategory {
                skill: skill.id.clone(),
                category: skill.category.clone(),
            });
        }
        agents.extend(assigned);
    }

    config.agents = agents.into_iter().collect();
    warnings.extend(missing_requirements(&ids, matrix));

    tracing::debug!(
        skills = config.skills.len(),
        agents = config.agents.len(),
        "Generated project config"
    );

    Ok(GeneratedConfig { config, warnings })
}

/// The config path recorded for a local skill: `.claude/skills/<relative>`.
pub(crate) fn local_assignment_path(skill: &SkillDefinition) -> Option<String> {
    skill
        .local
        .then(|| format!("{LOCAL_SKILLS_DIR}/{}", skill.relative_path))
}

fn previous_local_path(previous: Option<&ProjectConfig>, id: &str) -> Option<String> {
    match previous?.skill_entry(id)? {
        SkillAssignment::Local { path, .. } => Some(path.clone()),
        _ => None,
    }
}

/// Insert a skill into the bucket of every agent consuming its category.
///
/// Returns the agents it was assigned to. Existing entries for the same id
/// are left alone.
pub(crate) fn assign_to_agents(
    buckets: &mut AgentSkillMap,
    skill: &SkillDefinition,
    matrix: &SkillMatrix,
    local_path: Option<&str>,
) -> Vec<String> {
    let agents = matrix.agents_for_category(&skill.category);
    let preloaded = is_key_subcategory(skill.subcategory());

    for agent in &agents {
        let bucket = buckets
            .entry(agent.clone())
            .or_default()
            .entry(skill.subcategory().to_string())
            .or_default();
        if bucket.iter().all(|a| a.id() != skill.id) {
            bucket.push(SkillAssignment::for_skill(&skill.id, local_path, preloaded));
        }
    }

    agents
}
