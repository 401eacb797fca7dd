//! Merge a new skill selection into an existing config, and validate the
//! result.

use std::collections::BTreeSet;

use skillforge_types::assignment::SkillAssignment;
use skillforge_types::error::{PipelineError, PipelineWarning};
use skillforge_types::project::ProjectConfig;

use super::generator::{assign_to_agents, local_assignment_path};
use crate::matrix::resolver::{expand_selection, resolve_skill_reference};
use crate::matrix::SkillMatrix;

/// A merged config plus non-fatal warnings.
#[derive(Debug, Clone)]
pub struct MergedConfig {
    pub config: ProjectConfig,
    pub warnings: Vec<PipelineWarning>,
}

/// Apply a new selection to `base`.
///
/// Computes the symmetric difference between the base's skill ids and the
/// selection. When it is empty the base comes back unchanged. Otherwise the
/// flat list is rewritten to the selection (retained ids keep their entry
/// shape), added skills are bucketed by category, and removed skills are
/// deleted from every bucket with empty categories and agents pruned.
/// An added skill whose category no agent consumes stays in the flat list
/// and yields an `UnmappedCategory` warning.
pub fn merge_stack_with_skills(
    base: &ProjectConfig,
    selected: &[String],
    matrix: &SkillMatrix,
) -> Result<MergedConfig, PipelineError> {
    let selected = expand_selection(selected, matrix);
    let before: BTreeSet<&str> = base.skill_ids().into_iter().collect();
    let after: BTreeSet<&str> = selected.iter().map(String::as_str).collect();

    if before == after {
        return Ok(MergedConfig {
            config: base.clone(),
            warnings: Vec::new(),
        });
    }

    let added: Vec<&str> = after.difference(&before).copied().collect();
    let removed: BTreeSet<&str> = before.difference(&after).copied().collect();

    let mut merged = base.clone();

    // Flat list, in selection order.
    let mut skills = Vec::with_capacity(selected.len());
    for id in &selected {
        match base.skill_entry(id) {
            Some(entry) => skills.push(entry.clone()),
            None => {
                let skill = resolve_skill_reference(id, matrix)?;
                let path = local_assignment_path(skill);
                skills.push(SkillAssignment::for_skill(id, path.as_deref(), false));
            }
        }
    }
    merged.skills = skills;

    let mut warnings = Vec::new();
    for id in &added {
        let skill = resolve_skill_reference(id, matrix)?;
        let path = local_assignment_path(skill);
        let assigned = assign_to_agents(&mut merged.agent_skills, skill, matrix, path.as_deref());
        if assigned.is_empty() {
            tracing::warn!(skill = %skill.id, category = %skill.category, "No agent consumes category");
            warnings.push(PipelineWarning::UnmappedCategory {
                skill: skill.id.clone(),
                category: skill.category.clone(),
            });
        }
        for agent in assigned {
            if !merged.agents.contains(&agent) {
                merged.agents.push(agent);
            }
        }
    }

    if !removed.is_empty() {
        let mut pruned = Vec::new();
        merged.agent_skills.retain(|agent, categories| {
            categories.retain(|_, bucket| {
                bucket.retain(|a| !removed.contains(a.id()));
                !bucket.is_empty()
            });
            if categories.is_empty() {
                pruned.push(agent.clone());
                false
            } else {
                true
            }
        });
        merged.agents.retain(|agent| !pruned.contains(agent));
    }

    tracing::debug!(
        added = added.len(),
        removed = removed.len(),
        "Merged skill selection into config"
    );

    Ok(MergedConfig {
        config: merged,
        warnings,
    })
}

/// Every bucketed assignment must reference an id in the flat skill list.
pub fn validate_project_config(config: &ProjectConfig) -> Result<(), PipelineError> {
    let known: BTreeSet<&str> = config.skill_ids().into_iter().collect();

    for (agent, categories) in &config.agent_skills {
        for (category, bucket) in categories {
            if let Some(stray) = bucket.iter().find(|a| !known.contains(a.id())) {
                return Err(PipelineError::Validation {
                    agent: agent.clone(),
                    category: category.clone(),
                    skill: stray.id().to_string(),
                });
            }
        }
    }

    Ok(())
}
