//! Reference and alias resolution against a [`SkillMatrix`].
//!
//! Turns bare ids, directory ids and stack technology aliases into canonical
//! skill references. Unknown references fail with a short list of nearby
//! candidates; stale stack aliases are skipped with a warning.

use std::collections::BTreeSet;
use std::path::Path;

use skillforge_types::error::{PipelineError, PipelineWarning, ReferenceKind};
use skillforge_types::skill::{
    is_author_qualified, ResolvedSkill, SkillDefinition, SkillReference,
};
use skillforge_types::stack::Stack;

use super::SkillMatrix;
use crate::config::defaults::is_key_subcategory;

/// Maximum number of alternatives listed in a not-found message.
const MAX_SUGGESTIONS: usize = 5;

// ---------------------------------------------------------------------------
// Skill references
// ---------------------------------------------------------------------------

/// Look up a skill by exact id.
///
/// On failure the error hint lists up to five candidate ids
/// (`Available skills: ...`) or says `no skills found` for an empty matrix.
pub fn resolve_skill_reference<'m>(
    reference: &str,
    matrix: &'m SkillMatrix,
) -> Result<&'m SkillDefinition, PipelineError> {
    matrix
        .get(reference)
        .ok_or_else(|| PipelineError::ReferenceNotFound {
            kind: ReferenceKind::Skill,
            id: reference.to_string(),
            hint: skill_suggestions(reference, matrix),
        })
}

/// Guidance text for an unknown skill reference.
///
/// Ids resembling the reference come first, then the rest in sorted order.
pub fn skill_suggestions(reference: &str, matrix: &SkillMatrix) -> String {
    let candidates = ranked_candidates(reference, matrix.skill_ids());
    if candidates.is_empty() {
        return "no skills found".to_string();
    }
    format!("Available skills: {}", candidates.join(", "))
}

/// Expand a bare directory id into every skill stored under a directory of
/// that name.
///
/// Author-qualified ids and exact matrix ids expand to themselves. Matches are
/// deduplicated by physical path. When nothing matches the input comes back
/// unchanged so later resolution reports a clear not-found error.
pub fn expand_directory_id(id: &str, matrix: &SkillMatrix) -> Vec<String> {
    if is_author_qualified(id) || matrix.contains(id) {
        return vec![id.to_string()];
    }

    let mut seen_paths: BTreeSet<&Path> = BTreeSet::new();
    let mut matches: Vec<String> = Vec::new();

    for skill in matrix.skills.values() {
        let nested = skill
            .relative_path
            .split('/')
            .filter(|segment| !segment.is_empty())
            .any(|segment| segment == id);
        if nested && seen_paths.insert(skill.path.as_path()) {
            matches.push(skill.id.clone());
        }
    }

    if matches.is_empty() {
        return vec![id.to_string()];
    }
    matches.sort();
    matches
}

/// Expand and deduplicate a selection of ids, keeping first-seen order.
pub fn expand_selection(selected: &[String], matrix: &SkillMatrix) -> Vec<String> {
    let mut seen = BTreeSet::new();
    selected
        .iter()
        .flat_map(|id| expand_directory_id(id.trim(), matrix))
        .filter(|id| seen.insert(id.clone()))
        .collect()
}

// ---------------------------------------------------------------------------
// Stack aliases
// ---------------------------------------------------------------------------

/// Canonical references for one agent of a stack, plus anything skipped.
#[derive(Debug, Clone, Default)]
pub struct StackResolution {
    pub references: Vec<SkillReference>,
    pub warnings: Vec<PipelineWarning>,
}

/// Resolve the `subcategory -> alias` pairs a stack assigns to an agent.
///
/// Each alias is looked up in the alias table. An alias missing from the
/// table is tried as a literal skill id; if that fails too the pair is
/// skipped with a stale-alias warning instead of failing the stack. An agent
/// absent from the stack yields no references.
pub fn resolve_agent_skills_from_stack(
    agent_id: &str,
    stack: &Stack,
    matrix: &SkillMatrix,
) -> StackResolution {
    let mut resolution = StackResolution::default();

    let Some(technologies) = stack.agents.get(agent_id) else {
        return resolution;
    };

    for (subcategory, alias) in technologies {
        let id = match matrix.aliases.get(alias) {
            Some(canonical) => canonical.clone(),
            None if matrix.contains(alias) => alias.clone(),
            None => {
                let err = PipelineError::StaleAliasReference {
                    stack: stack.id.clone(),
                    agent: agent_id.to_string(),
                    alias: alias.clone(),
                };
                tracing::warn!(
                    stack = %stack.id,
                    agent = %agent_id,
                    alias = %alias,
                    "Skipping stale stack alias"
                );
                resolution.warnings.extend(err.as_warning());
                continue;
            }
        };

        if resolution.references.iter().any(|r| r.id == id) {
            continue;
        }

        resolution.references.push(SkillReference {
            id,
            preloaded: is_key_subcategory(subcategory),
            subcategory: subcategory.clone(),
        });
    }

    resolution
}

/// Resolve a stack agent's references all the way to [`ResolvedSkill`]s.
///
/// Alias targets that are missing from the matrix are fatal: every resolved
/// skill must exist at resolution time.
pub fn resolve_stack_agent_skills(
    agent_id: &str,
    stack: &Stack,
    matrix: &SkillMatrix,
) -> Result<(Vec<ResolvedSkill>, Vec<PipelineWarning>), PipelineError> {
    let resolution = resolve_agent_skills_from_stack(agent_id, stack, matrix);
    let skills = resolution
        .references
        .iter()
        .map(|reference| {
            resolve_skill_reference(&reference.id, matrix)
                .map(|skill| ResolvedSkill::from_definition(skill, reference.preloaded))
        })
        .collect::<Result<Vec<_>, _>>()?;
    Ok((skills, resolution.warnings))
}

// ---------------------------------------------------------------------------
// Agents and stacks
// ---------------------------------------------------------------------------

/// Look up an agent definition, failing with a "did you mean" hint.
pub fn resolve_agent<'m>(
    agent_id: &str,
    matrix: &'m SkillMatrix,
) -> Result<&'m skillforge_types::agent::AgentDefinition, PipelineError> {
    matrix
        .agent(agent_id)
        .ok_or_else(|| PipelineError::ReferenceNotFound {
            kind: ReferenceKind::Agent,
            id: agent_id.to_string(),
            hint: agent_suggestions(agent_id, matrix),
        })
}

/// Guidance text for an unknown agent id.
pub fn agent_suggestions(agent_id: &str, matrix: &SkillMatrix) -> String {
    if matrix.agents.is_empty() {
        return "no agents found".to_string();
    }
    let best = matrix.agents.keys().find(|id| is_similar(agent_id, id));
    let available = matrix
        .agents
        .keys()
        .map(String::as_str)
        .collect::<Vec<_>>()
        .join(", ");
    match best {
        Some(best) => format!("Did you mean '{best}'? Available agents: {available}"),
        None => format!("Available agents: {available}"),
    }
}

/// Look up a stack by id.
pub fn resolve_stack<'m>(stack_id: &str, matrix: &'m SkillMatrix) -> Result<&'m Stack, PipelineError> {
    matrix
        .stack(stack_id)
        .ok_or_else(|| PipelineError::ReferenceNotFound {
            kind: ReferenceKind::Stack,
            id: stack_id.to_string(),
            hint: if matrix.stacks.is_empty() {
                "no stacks found".to_string()
            } else {
                format!(
                    "Available stacks: {}",
                    matrix
                        .stacks
                        .iter()
                        .map(|s| s.id.as_str())
                        .collect::<Vec<_>>()
                        .join(", ")
                )
            },
        })
}

// ---------------------------------------------------------------------------
// Candidate ranking
// ---------------------------------------------------------------------------

/// Strip an author qualifier and lowercase: `React (@acme)` -> `react`.
fn bare(id: &str) -> String {
    id.split(" (@").next().unwrap_or(id).trim().to_lowercase()
}

fn is_similar(reference: &str, candidate: &str) -> bool {
    let needle = bare(reference);
    let hay = bare(candidate);
    if needle.is_empty() || hay.is_empty() {
        return false;
    }
    let shared_stem = needle.split('-').next() == hay.split('-').next();
    hay.contains(&needle) || needle.contains(&hay) || shared_stem
}

fn ranked_candidates<'a>(reference: &str, ids: impl Iterator<Item = &'a str>) -> Vec<String> {
    let needle = bare(reference);
    let (mut similar, mut rest): (Vec<&str>, Vec<&str>) =
        ids.partition(|id| !needle.is_empty() && bare(id).contains(&needle));
    similar.sort_unstable();
    rest.sort_unstable();
    similar
        .into_iter()
        .chain(rest)
        .take(MAX_SUGGESTIONS)
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;
    use std::path::PathBuf;

    use skillforge_types::agent::{AgentDefinition, AgentPartials};

    use super::*;
    use crate::matrix::tests::{matrix_with, skill};

    fn stack(agent: &str, pairs: &[(&str, &str)]) -> Stack {
        let mut technologies = BTreeMap::new();
        for (sub, alias) in pairs {
            technologies.insert((*sub).to_string(), (*alias).to_string());
        }
        let mut agents = BTreeMap::new();
        agents.insert(agent.to_string(), technologies);
        Stack {
            id: "nextjs".to_string(),
            name: "Next.js".to_string(),
            description: String::new(),
            agents,
        }
    }

    fn agent(id: &str) -> AgentDefinition {
        AgentDefinition {
            id: id.to_string(),
            title: id.to_string(),
            description: format!("{id} agent"),
            tools: vec![],
            model: "opus".to_string(),
            partials: AgentPartials::default(),
            path: PathBuf::new(),
        }
    }

    #[test]
    fn resolves_exact_id() {
        let matrix = matrix_with(vec![skill("react (@acme)", "web/framework", "React")]);
        let found = resolve_skill_reference("react (@acme)", &matrix).unwrap();
        assert_eq!(found.description, "React");
    }

    #[test]
    fn not_found_lists_available_skills() {
        let matrix = matrix_with(vec![
            skill("react (@acme)", "web/framework", "React"),
            skill("react-query (@acme)", "web/server-state", "RQ"),
            skill("zustand (@acme)", "web/client-state", "Z"),
        ]);
        let err = resolve_skill_reference("react", &matrix).unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("Available skills:"), "got: {msg}");
        // Similar ids are listed first.
        assert!(msg.contains("Available skills: react (@acme), react-query (@acme), zustand (@acme)"));
    }

    #[test]
    fn not_found_caps_suggestions_at_five() {
        let skills = (0..8)
            .map(|i| skill(&format!("s{i}"), "web/misc", "d"))
            .collect();
        let matrix = matrix_with(skills);
        let msg = resolve_skill_reference("missing", &matrix)
            .unwrap_err()
            .to_string();
        let listed = msg.split("Available skills: ").nth(1).unwrap();
        assert_eq!(listed.split(", ").count(), 5);
    }

    #[test]
    fn not_found_in_empty_matrix() {
        let matrix = SkillMatrix::new("/source");
        let msg = resolve_skill_reference("react", &matrix)
            .unwrap_err()
            .to_string();
        assert!(msg.contains("no skills found"));
    }

    #[test]
    fn expand_directory_id_matches_nested_skills() {
        let matrix = matrix_with(vec![
            skill("react (@acme)", "web/framework", "React"),
            skill("vue (@acme)", "web/framework", "Vue"),
            skill("hono (@acme)", "api/framework", "Hono"),
        ]);
        assert_eq!(
            expand_directory_id("web", &matrix),
            vec!["react (@acme)".to_string(), "vue (@acme)".to_string()]
        );
        assert_eq!(expand_directory_id("framework", &matrix).len(), 3);
    }

    #[test]
    fn expand_directory_id_passes_through() {
        let matrix = matrix_with(vec![skill("react (@acme)", "web/framework", "React")]);
        assert_eq!(
            expand_directory_id("react (@acme)", &matrix),
            vec!["react (@acme)".to_string()]
        );
        assert_eq!(
            expand_directory_id("svelte (@acme)", &matrix),
            vec!["svelte (@acme)".to_string()]
        );
        assert_eq!(expand_directory_id("nothing", &matrix), vec!["nothing".to_string()]);
    }

    #[test]
    fn expand_directory_id_dedupes_by_path() {
        let mut a = skill("react (@acme)", "web/framework", "React");
        let mut b = skill("react-alias", "web/framework", "React again");
        b.path = a.path.clone();
        a.relative_path = "web/framework/react".to_string();
        b.relative_path = "web/framework/react".to_string();
        let matrix = matrix_with(vec![a, b]);
        assert_eq!(expand_directory_id("web", &matrix).len(), 1);
    }

    #[test]
    fn stack_aliases_resolve_with_preloaded_heuristic() {
        let mut matrix = matrix_with(vec![
            skill("react (@acme)", "web/framework", "React"),
            skill("scss (@acme)", "web/styling", "SCSS"),
        ]);
        matrix
            .aliases
            .insert("react".to_string(), "react (@acme)".to_string());
        matrix
            .aliases
            .insert("scss".to_string(), "scss (@acme)".to_string());

        let s = stack("web-developer", &[("framework", "react"), ("styling", "scss")]);
        let resolution = resolve_agent_skills_from_stack("web-developer", &s, &matrix);

        assert!(resolution.warnings.is_empty());
        let by_id: BTreeMap<_, _> = resolution
            .references
            .iter()
            .map(|r| (r.id.as_str(), r.preloaded))
            .collect();
        assert_eq!(by_id["react (@acme)"], true);
        assert_eq!(by_id["scss (@acme)"], false);
    }

    #[test]
    fn stale_alias_falls_back_to_literal_then_warns() {
        let mut matrix = matrix_with(vec![skill("react (@acme)", "web/framework", "React")]);
        matrix
            .aliases
            .insert("react".to_string(), "react (@acme)".to_string());

        let s = stack(
            "web-developer",
            &[("framework", "react"), ("styling", "tailwind")],
        );
        let resolution = resolve_agent_skills_from_stack("web-developer", &s, &matrix);
        assert_eq!(resolution.references.len(), 1);
        assert_eq!(
            resolution.warnings,
            vec![PipelineWarning::StaleAlias {
                stack: "nextjs".to_string(),
                agent: "web-developer".to_string(),
                alias: "tailwind".to_string(),
            }]
        );

        // Once a skill literally named "tailwind" exists, the literal is used.
        let mut matrix = matrix;
        matrix.insert_source_skill(skill("tailwind", "web/styling", "TW"));
        let resolution = resolve_agent_skills_from_stack("web-developer", &s, &matrix);
        assert_eq!(resolution.references.len(), 2);
        assert!(resolution.warnings.is_empty());
    }

    #[test]
    fn missing_agent_yields_empty_list() {
        let matrix = matrix_with(vec![]);
        let s = stack("web-developer", &[]);
        assert!(
            resolve_agent_skills_from_stack("api-developer", &s, &matrix)
                .references
                .is_empty()
        );
        assert!(
            resolve_agent_skills_from_stack("web-developer", &s, &matrix)
                .references
                .is_empty()
        );
    }

    #[test]
    fn alias_to_missing_skill_is_fatal_when_resolving() {
        let mut matrix = matrix_with(vec![skill("react (@acme)", "web/framework", "React")]);
        matrix
            .aliases
            .insert("vue".to_string(), "vue (@acme)".to_string());
        let s = stack("web-developer", &[("framework", "vue")]);
        let err = resolve_stack_agent_skills("web-developer", &s, &matrix).unwrap_err();
        assert!(err.to_string().contains("Available skills:"));
    }

    #[test]
    fn unknown_agent_suggests_close_match() {
        let mut matrix = SkillMatrix::new("/source");
        matrix.agents.insert("web-developer".to_string(), agent("web-developer"));
        matrix.agents.insert("api-developer".to_string(), agent("api-developer"));

        let msg = resolve_agent("web-dev", &matrix).unwrap_err().to_string();
        assert!(msg.contains("Did you mean 'web-developer'?"), "got: {msg}");
        assert!(msg.contains("Available agents: api-developer, web-developer"));
    }

    #[test]
    fn unknown_stack_lists_stacks() {
        let mut matrix = SkillMatrix::new("/source");
        assert!(
            resolve_stack("x", &matrix)
                .unwrap_err()
                .to_string()
                .contains("no stacks found")
        );
        matrix.stacks.push(stack("web-developer", &[]));
        assert!(
            resolve_stack("x", &matrix)
                .unwrap_err()
                .to_string()
                .contains("Available stacks: nextjs")
        );
    }
}
