//! The skill matrix: every skill known to one source root, overlaid with the
//! project's local overrides, plus the stacks, alias table, agent definitions
//! and category mappings loaded alongside them.

pub mod resolver;

use std::collections::{BTreeMap, BTreeSet};
use std::path::PathBuf;

use skillforge_types::agent::AgentDefinition;
use skillforge_types::skill::SkillDefinition;
use skillforge_types::stack::Stack;

use crate::config::defaults::default_agent_mappings;

/// What happened when a local skill was merged into the matrix.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OverrideOutcome {
    /// The local skill replaced a source skill with the same id.
    Replaced,
    /// No source skill had this id; the local skill was added.
    Added,
}

/// Merged registry for one source root.
#[derive(Debug, Clone)]
pub struct SkillMatrix {
    pub source_root: PathBuf,
    pub skills: BTreeMap<String, SkillDefinition>,
    /// Technology alias -> canonical skill id.
    pub aliases: BTreeMap<String, String>,
    pub stacks: Vec<Stack>,
    pub agents: BTreeMap<String, AgentDefinition>,
    /// Category prefix -> agents consuming it.
    pub agent_mappings: BTreeMap<String, Vec<String>>,
}

impl SkillMatrix {
    /// An empty matrix with the built-in category mappings.
    pub fn new(source_root: impl Into<PathBuf>) -> Self {
        Self {
            source_root: source_root.into(),
            skills: BTreeMap::new(),
            aliases: BTreeMap::new(),
            stacks: Vec::new(),
            agents: BTreeMap::new(),
            agent_mappings: default_agent_mappings(),
        }
    }

    /// Add a skill discovered under the source root.
    ///
    /// Ids are unique within a matrix: a second source skill with the same id
    /// is ignored with a warning and the first one is kept.
    pub fn insert_source_skill(&mut self, skill: SkillDefinition) -> bool {
        if let Some(existing) = self.skills.get(&skill.id) {
            tracing::warn!(
                skill = %skill.id,
                kept = %existing.path.display(),
                ignored = %skill.path.display(),
                "Duplicate skill id in source; keeping the first"
            );
            return false;
        }
        self.skills.insert(skill.id.clone(), skill);
        true
    }

    /// Merge one local skill into the matrix.
    ///
    /// A local skill whose id matches a source skill replaces it entirely and
    /// is marked `local`. When the local metadata declares no category the
    /// replaced skill's category is kept so agent mapping still works.
    pub fn apply_local_override(&mut self, mut skill: SkillDefinition) -> OverrideOutcome {
        skill.local = true;
        if skill.local_path.is_none() {
            skill.local_path = Some(skill.path.clone());
        }

        match self.skills.get(&skill.id) {
            Some(source) => {
                if skill.category.trim().is_empty() {
                    skill.category = source.category.clone();
                }
                tracing::debug!(skill = %skill.id, "Local skill overrides source skill");
                self.skills.insert(skill.id.clone(), skill);
                OverrideOutcome::Replaced
            }
            None => {
                tracing::debug!(skill = %skill.id, "Adding local-only skill");
                self.skills.insert(skill.id.clone(), skill);
                OverrideOutcome::Added
            }
        }
    }

    /// Merge a batch of local skills. Local always wins, whatever the order.
    pub fn merge_local_overrides(&mut self, locals: Vec<SkillDefinition>) -> usize {
        locals
            .into_iter()
            .map(|skill| self.apply_local_override(skill))
            .filter(|outcome| *outcome == OverrideOutcome::Replaced)
            .count()
    }

    /// Replace built-in category mappings with source-provided ones.
    pub fn apply_agent_mappings(&mut self, overrides: BTreeMap<String, Vec<String>>) {
        for (prefix, agents) in overrides {
            self.agent_mappings.insert(prefix, agents);
        }
    }

    pub fn get(&self, id: &str) -> Option<&SkillDefinition> {
        self.skills.get(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.skills.contains_key(id)
    }

    pub fn skill_ids(&self) -> impl Iterator<Item = &str> {
        self.skills.keys().map(String::as_str)
    }

    pub fn local_skills(&self) -> impl Iterator<Item = &SkillDefinition> {
        self.skills.values().filter(|s| s.local)
    }

    pub fn stack(&self, id: &str) -> Option<&Stack> {
        self.stacks.iter().find(|s| s.id == id)
    }

    pub fn agent(&self, id: &str) -> Option<&AgentDefinition> {
        self.agents.get(id)
    }

    /// Agents consuming a category, sorted and deduplicated.
    ///
    /// A mapping prefix matches the category itself and every category nested
    /// under it (`web` matches `web/framework`).
    pub fn agents_for_category(&self, category: &str) -> Vec<String> {
        let mut agents = BTreeSet::new();
        for (prefix, consumers) in &self.agent_mappings {
            let nested = category
                .strip_prefix(prefix.as_str())
                .is_some_and(|rest| rest.starts_with('/'));
            if category == prefix || nested {
                agents.extend(consumers.iter().cloned());
            }
        }
        agents.into_iter().collect()
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use std::collections::BTreeSet;
    use std::path::PathBuf;

    use super::*;

    /// Build a source skill for tests.
    pub(crate) fn skill(id: &str, category: &str, description: &str) -> SkillDefinition {
        let dir = id.split(' ').next().unwrap_or(id).to_string();
        SkillDefinition {
            id: id.to_string(),
            path: PathBuf::from("/source/skills").join(category).join(&dir),
            relative_path: format!("{category}/{dir}"),
            name: dir,
            description: description.to_string(),
            category: category.to_string(),
            author: Some("@acme".to_string()),
            tags: vec![],
            requires: BTreeSet::new(),
            conflicts: BTreeSet::new(),
            recommends: BTreeSet::new(),
            usage_guidance: None,
            local: false,
            local_path: None,
            forked_from: None,
            content_hash: format!("hash-{id}"),
        }
    }

    /// Build a local skill for tests.
    pub(crate) fn local_skill(id: &str, description: &str) -> SkillDefinition {
        let mut s = skill(id, "", description);
        s.path = PathBuf::from("/project/.claude/skills").join(&s.name);
        s.relative_path = s.name.clone();
        s.content_hash = format!("local-hash-{id}");
        s
    }

    pub(crate) fn matrix_with(skills: Vec<SkillDefinition>) -> SkillMatrix {
        let mut matrix = SkillMatrix::new("/source");
        for s in skills {
            matrix.insert_source_skill(s);
        }
        matrix
    }

    #[test]
    fn local_override_replaces_source_skill() {
        let mut matrix = matrix_with(vec![skill("A", "web/framework", "X")]);
        let outcome = matrix.apply_local_override(local_skill("A", "Y"));

        assert_eq!(outcome, OverrideOutcome::Replaced);
        let merged = matrix.get("A").unwrap();
        assert_eq!(merged.description, "Y");
        assert!(merged.local);
        assert_eq!(merged.content_hash, "local-hash-A");
        assert_eq!(
            merged.local_path.as_deref(),
            Some(PathBuf::from("/project/.claude/skills/A").as_path())
        );
        // Category inherited because the local skill declared none.
        assert_eq!(merged.category, "web/framework");
    }

    #[test]
    fn local_override_wins_regardless_of_order() {
        // Local merged first, then a source insert with the same id is ignored.
        let mut matrix = SkillMatrix::new("/source");
        matrix.apply_local_override(local_skill("A", "Y"));
        assert!(!matrix.insert_source_skill(skill("A", "web/framework", "X")));
        assert!(matrix.get("A").unwrap().local);
        assert_eq!(matrix.get("A").unwrap().description, "Y");
    }

    #[test]
    fn unmatched_local_skill_is_added() {
        let mut matrix = matrix_with(vec![skill("A", "web/framework", "X")]);
        let replaced = matrix.merge_local_overrides(vec![local_skill("B", "mine")]);
        assert_eq!(replaced, 0);
        assert!(matrix.get("B").unwrap().local);
        assert_eq!(matrix.local_skills().count(), 1);
    }

    #[test]
    fn duplicate_source_ids_keep_first() {
        let mut matrix = matrix_with(vec![skill("A", "web/framework", "first")]);
        assert!(!matrix.insert_source_skill(skill("A", "web/framework", "second")));
        assert_eq!(matrix.get("A").unwrap().description, "first");
    }

    #[test]
    fn agents_for_category_matches_prefixes() {
        let mut matrix = SkillMatrix::new("/source");
        matrix.agent_mappings.clear();
        matrix
            .agent_mappings
            .insert("web".to_string(), vec!["web-developer".to_string()]);
        matrix.agent_mappings.insert(
            "web/testing".to_string(),
            vec!["web-tester".to_string(), "web-developer".to_string()],
        );
        matrix
            .agent_mappings
            .insert("webhooks".to_string(), vec!["api-developer".to_string()]);

        assert_eq!(
            matrix.agents_for_category("web/testing"),
            vec!["web-developer".to_string(), "web-tester".to_string()]
        );
        assert_eq!(
            matrix.agents_for_category("web/framework"),
            vec!["web-developer".to_string()]
        );
        assert!(matrix.agents_for_category("cli/framework").is_empty());
    }

    #[test]
    fn agent_mapping_overrides_replace_defaults() {
        let mut matrix = SkillMatrix::new("/source");
        let mut overrides = BTreeMap::new();
        overrides.insert("web".to_string(), vec!["frontend".to_string()]);
        matrix.apply_agent_mappings(overrides);
        assert!(
            matrix
                .agents_for_category("web/styling")
                .contains(&"frontend".to_string())
        );
        assert!(
            !matrix
                .agents_for_category("web/styling")
                .contains(&"web-developer".to_string())
        );
    }
}
