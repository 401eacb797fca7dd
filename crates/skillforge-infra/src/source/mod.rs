//! Source loader: materialize a [`SkillMatrix`] from a source root and an
//! optional directory of local overrides.
//!
//! Layout:
//! ```text
//! {source}/skills/**/{skill}/SKILL.md + metadata.yaml
//! {source}/agents/{agent}/agent.yaml + intro.md + workflow.md
//! {source}/stacks/{stack}/CLAUDE.md
//! {source}/config/stacks.yaml
//! {source}/config/skill-aliases.yaml
//! {source}/config/agent-mappings.yaml
//! ```
//!
//! Skills that fail to load are skipped with a warning; a broken skill never
//! blocks its siblings.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use skillforge_core::matrix::SkillMatrix;
use skillforge_core::skill::manifest::{
    parse_skill_md, parse_skill_metadata, validate_frontmatter, validate_source_metadata,
};
use skillforge_types::agent::{AgentDefinition, AgentPartials};
use skillforge_types::error::{PipelineError, PipelineWarning};
use skillforge_types::skill::{SkillDefinition, SkillMetadata};
use skillforge_types::stack::{AgentMappingsFile, SkillAliasesFile, StacksFile};
use walkdir::WalkDir;

use crate::crypto::hash::{hash_skill_dir, METADATA_FILE};
use crate::filesystem::{is_hidden, read_text, read_yaml_opt, relative_slash_path, walk_error};

pub const SKILL_FILE: &str = "SKILL.md";

/// Which side of the matrix a skill directory belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkillOrigin {
    /// Under `{source}/skills`; `metadata.yaml` with a category is required.
    Source,
    /// A project-local skill; `metadata.yaml` is optional.
    Local,
}

/// Load the full matrix for a source root.
///
/// Source skills are loaded first, then every skill under `local_dir` is
/// merged over them. Discovery warnings are appended to `warnings`.
pub fn load_matrix(
    source_root: &Path,
    local_dir: Option<&Path>,
    warnings: &mut Vec<PipelineWarning>,
) -> Result<SkillMatrix, PipelineError> {
    let mut matrix = SkillMatrix::new(source_root);

    for skill in discover_skills(&source_root.join("skills"), SkillOrigin::Source, warnings)? {
        matrix.insert_source_skill(skill);
    }

    if let Some(local_dir) = local_dir {
        let locals = discover_skills(local_dir, SkillOrigin::Local, warnings)?;
        let replaced = matrix.merge_local_overrides(locals);
        tracing::debug!(replaced, dir = %local_dir.display(), "Merged local skills");
    }

    let config_dir = source_root.join("config");
    if let Some(file) = read_yaml_opt::<StacksFile>(&config_dir.join("stacks.yaml"))? {
        matrix.stacks = file.stacks;
    }
    if let Some(file) = read_yaml_opt::<SkillAliasesFile>(&config_dir.join("skill-aliases.yaml"))? {
        matrix.aliases = file.aliases;
    }
    if let Some(file) = read_yaml_opt::<AgentMappingsFile>(&config_dir.join("agent-mappings.yaml"))? {
        matrix.apply_agent_mappings(file.categories);
    }

    matrix.agents = load_agents(&source_root.join("agents"), warnings)?
        .into_iter()
        .map(|agent| (agent.id.clone(), agent))
        .collect();

    tracing::debug!(
        source = %source_root.display(),
        skills = matrix.skills.len(),
        stacks = matrix.stacks.len(),
        agents = matrix.agents.len(),
        "Loaded skill matrix"
    );

    Ok(matrix)
}

/// Find and load every skill directory under `root`.
///
/// A directory is a skill when it holds a `SKILL.md`. Directories nested
/// inside a skill (`examples/`) are not searched. A missing root yields no
/// skills.
pub fn discover_skills(
    root: &Path,
    origin: SkillOrigin,
    warnings: &mut Vec<PipelineWarning>,
) -> Result<Vec<SkillDefinition>, PipelineError> {
    if !root.is_dir() {
        tracing::debug!(dir = %root.display(), "No skills directory");
        return Ok(Vec::new());
    }

    let mut skill_dirs: Vec<PathBuf> = Vec::new();
    let walker = WalkDir::new(root)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| e.depth() == 0 || !is_hidden(e.file_name()));

    for entry in walker {
        let entry = entry.map_err(|e| walk_error(root, e))?;
        if !entry.file_type().is_file() || entry.file_name() != SKILL_FILE {
            continue;
        }
        let Some(dir) = entry.path().parent() else {
            continue;
        };
        if skill_dirs.iter().any(|known| dir.starts_with(known)) {
            continue;
        }
        skill_dirs.push(dir.to_path_buf());
    }

    let mut skills = Vec::with_capacity(skill_dirs.len());
    for dir in skill_dirs {
        match load_skill_dir(&dir, root, origin) {
            Ok(skill) => {
                tracing::debug!(skill = %skill.id, path = %dir.display(), "Discovered skill");
                skills.push(skill);
            }
            Err(err) if !err.is_fatal() => {
                tracing::warn!(path = %dir.display(), error = %err, "Skipping skill");
                warnings.extend(err.as_warning());
            }
            Err(err) => return Err(err),
        }
    }

    Ok(skills)
}

/// Load one skill directory.
///
/// Unreadable or invalid `SKILL.md` / `metadata.yaml` content is reported as
/// [`PipelineError::MalformedMetadata`] so discovery can skip it.
pub fn load_skill_dir(
    dir: &Path,
    scan_root: &Path,
    origin: SkillOrigin,
) -> Result<SkillDefinition, PipelineError> {
    let malformed = |reason: String| PipelineError::MalformedMetadata {
        path: dir.to_path_buf(),
        reason,
    };

    let content = read_text(&dir.join(SKILL_FILE)).map_err(|e| malformed(e.to_string()))?;
    let (frontmatter, _body) = parse_skill_md(&content).map_err(|e| malformed(format!("{e:#}")))?;
    validate_frontmatter(&frontmatter).map_err(|e| malformed(format!("{e:#}")))?;

    let metadata = read_metadata(dir, origin).map_err(malformed)?;
    let category = match origin {
        SkillOrigin::Source => validate_source_metadata(&metadata)
            .map_err(|e| malformed(format!("{e:#}")))?
            .to_string(),
        SkillOrigin::Local => metadata.category.clone().unwrap_or_default(),
    };

    let content_hash = hash_skill_dir(dir)?;
    let id = frontmatter.name.trim().to_string();
    let relative_path = relative_slash_path(scan_root, dir);

    Ok(SkillDefinition {
        name: metadata.display_name.clone().unwrap_or_else(|| display_name(&id)),
        id,
        path: dir.to_path_buf(),
        relative_path,
        description: frontmatter.description.trim().to_string(),
        category,
        author: metadata.author,
        tags: metadata.tags,
        requires: metadata.requires.into_iter().collect::<BTreeSet<_>>(),
        conflicts: metadata.conflicts_with.into_iter().collect(),
        recommends: metadata.recommends.into_iter().collect(),
        usage_guidance: metadata.usage_guidance,
        local: origin == SkillOrigin::Local,
        local_path: (origin == SkillOrigin::Local).then(|| dir.to_path_buf()),
        forked_from: metadata.forked_from,
        content_hash,
    })
}

/// Read `metadata.yaml`. Required for source skills, optional for local ones.
pub fn read_metadata(dir: &Path, origin: SkillOrigin) -> Result<SkillMetadata, String> {
    let path = dir.join(METADATA_FILE);
    if !path.exists() {
        return match origin {
            SkillOrigin::Source => Err(format!("missing {METADATA_FILE}")),
            SkillOrigin::Local => Ok(SkillMetadata::default()),
        };
    }
    let content = read_text(&path).map_err(|e| e.to_string())?;
    parse_skill_metadata(&content).map_err(|e| format!("{e:#}"))
}

/// `react (@acme)` -> `react`
fn display_name(id: &str) -> String {
    id.split(" (@").next().unwrap_or(id).trim().to_string()
}

// ---------------------------------------------------------------------------
// Agents
// ---------------------------------------------------------------------------

const REQUIRED_PARTIALS: [&str; 2] = ["intro.md", "workflow.md"];

/// Load every `agents/<id>/agent.yaml` with its partials.
///
/// Agents missing `agent.yaml` or a required partial are skipped with a
/// warning.
pub fn load_agents(
    agents_dir: &Path,
    warnings: &mut Vec<PipelineWarning>,
) -> Result<Vec<AgentDefinition>, PipelineError> {
    if !agents_dir.is_dir() {
        return Ok(Vec::new());
    }

    let mut dirs: Vec<PathBuf> = std::fs::read_dir(agents_dir)
        .map_err(|e| PipelineError::io(agents_dir, e))?
        .filter_map(Result::ok)
        .map(|entry| entry.path())
        .filter(|path| path.is_dir() && !path.file_name().is_some_and(is_hidden))
        .collect();
    dirs.sort();

    let mut agents = Vec::with_capacity(dirs.len());
    for dir in dirs {
        match load_agent_dir(&dir) {
            Ok(agent) => agents.push(agent),
            Err(err) if !err.is_fatal() => {
                tracing::warn!(path = %dir.display(), error = %err, "Skipping agent");
                warnings.extend(err.as_warning());
            }
            Err(err) => return Err(err),
        }
    }
    Ok(agents)
}

/// Load a single agent directory.
pub fn load_agent_dir(dir: &Path) -> Result<AgentDefinition, PipelineError> {
    let malformed = |reason: String| PipelineError::MalformedMetadata {
        path: dir.to_path_buf(),
        reason,
    };

    let yaml_path = dir.join("agent.yaml");
    if !yaml_path.exists() {
        return Err(malformed("missing agent.yaml".to_string()));
    }
    for partial in REQUIRED_PARTIALS {
        if !dir.join(partial).exists() {
            return Err(malformed(format!("missing required partial {partial}")));
        }
    }

    let content = read_text(&yaml_path)?;
    let mut agent: AgentDefinition =
        serde_yaml_ng::from_str(&content).map_err(|e| malformed(e.to_string()))?;

    if agent.id.trim().is_empty() {
        agent.id = dir
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
    }

    let optional = |name: &str| -> Result<Option<String>, PipelineError> {
        let path = dir.join(name);
        if path.exists() {
            read_text(&path).map(Some)
        } else {
            Ok(None)
        }
    };

    agent.partials = AgentPartials {
        intro: read_text(&dir.join("intro.md"))?,
        workflow: read_text(&dir.join("workflow.md"))?,
        examples: optional("examples.md")?,
        critical_requirements: optional("critical-requirements.md")?,
        output_format: optional("output-format.md")?,
    };
    agent.path = dir.to_path_buf();

    Ok(agent)
}
