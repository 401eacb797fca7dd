//! Stack plugin packaging.
//!
//! ```text
//! {out}/stacks/stack-{id}/
//!   .claude-plugin/plugin.json      lists bundled skill plugin names
//!   .claude-plugin/.skillforge-meta.toml
//!   agents/{agent}.md
//!   CLAUDE.md
//!   README.md
//! ```

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use skillforge_core::compiler::compile_agent;
use skillforge_core::compiler::render::render_stack_readme;
use skillforge_core::matrix::resolver::{resolve_agent, resolve_stack, resolve_stack_agent_skills};
use skillforge_core::matrix::SkillMatrix;
use skillforge_types::error::PipelineError;
use skillforge_types::plugin::{PluginAuthor, PluginManifest};

use super::skill::skill_plugin_name;
use super::{determine_version, write_plugin_meta, CompiledPlugin};
use crate::filesystem::{read_text, remove_dir_if_exists, slugify, write_text};

pub const STACK_DOCUMENT: &str = "CLAUDE.md";

/// `{out}/stacks/stack-{id}`
pub fn stack_plugin_dir(out_dir: &Path, stack_id: &str) -> PathBuf {
    out_dir.join("stacks").join(format!("stack-{}", slugify(stack_id)))
}

/// Package a stack: its agents, stack document and skill plugin list.
///
/// Every agent the stack names must exist and the stack's `CLAUDE.md` must
/// be present under `{source}/stacks/{id}/`. Nothing is written until both
/// checks pass.
pub fn compile_stack_plugin(
    stack_id: &str,
    matrix: &SkillMatrix,
    out_dir: &Path,
    author: &str,
) -> Result<CompiledPlugin, PipelineError> {
    let stack = resolve_stack(stack_id, matrix)?;

    for agent_id in stack.agent_ids() {
        resolve_agent(agent_id, matrix)?;
    }

    let stack_doc = matrix.source_root.join("stacks").join(&stack.id).join(STACK_DOCUMENT);
    if !stack_doc.exists() {
        return Err(PipelineError::MissingRequiredFile {
            unit: format!("stack '{}'", stack.id),
            path: stack_doc,
        });
    }

    let mut documents = Vec::new();
    let mut skill_plugins = BTreeSet::new();
    let mut warnings = Vec::new();
    for agent_id in stack.agent_ids() {
        let (skills, agent_warnings) = resolve_stack_agent_skills(agent_id, stack, matrix)?;
        skill_plugins.extend(skills.iter().map(|s| skill_plugin_name(&s.id)));
        let (_, document) = compile_agent(agent_id, skills, matrix)?;
        documents.push((agent_id.to_string(), document));
        warnings.extend(agent_warnings);
    }

    let plugin_dir = stack_plugin_dir(out_dir, &stack.id);
    let agents_dir = plugin_dir.join("agents");
    remove_dir_if_exists(&agents_dir)?;
    for (agent_id, document) in &documents {
        write_text(&agents_dir.join(format!("{agent_id}.md")), document)?;
    }
    write_text(&plugin_dir.join(STACK_DOCUMENT), &read_text(&stack_doc)?)?;

    let agent_ids: Vec<String> = documents.into_iter().map(|(id, _)| id).collect();
    let skill_plugins: Vec<String> = skill_plugins.into_iter().collect();
    write_text(
        &plugin_dir.join("README.md"),
        &render_stack_readme(stack, &agent_ids, &skill_plugins),
    )?;

    let name = format!("stack-{}", slugify(&stack.id));
    let description = if stack.description.trim().is_empty() {
        stack.name.clone()
    } else {
        stack.description.trim().to_string()
    };
    let mut manifest = PluginManifest {
        name: name.clone(),
        version: String::new(),
        description,
        author: PluginAuthor::named(author),
        keywords: agent_ids,
        skills: skill_plugins,
    };
    let info = determine_version(&plugin_dir, &manifest)?;
    write_plugin_meta(&plugin_dir, &mut manifest, &info)?;

    tracing::info!(
        plugin = %name,
        version = %manifest.version,
        agents = manifest.keywords.len(),
        "Compiled stack plugin"
    );

    Ok(CompiledPlugin {
        name,
        path: plugin_dir,
        manifest,
        changed: info.changed,
        warnings,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plugin::read_manifest;
    use crate::source::load_matrix;
    use crate::source::tests::{write_agent, write_source_config, write_source_skill};
    use tempfile::tempdir;

    fn source_with_stack(root: &Path) {
        write_source_skill(root, "web/framework", "react", "react (@acme)", "x");
        write_source_skill(root, "web/styling", "scss", "scss (@acme)", "x");
        write_source_config(root);
        write_agent(root, "web-developer");
    }

    #[test]
    fn packages_stack() {
        let dir = tempdir().unwrap();
        let source = dir.path().join("source");
        let out = dir.path().join("dist");
        source_with_stack(&source);
        write_text(&source.join("stacks/nextjs/CLAUDE.md"), "# Next.js stack").unwrap();

        let matrix = load_matrix(&source, None, &mut Vec::new()).unwrap();
        let plugin = compile_stack_plugin("nextjs", &matrix, &out, "@acme").unwrap();

        let root = out.join("stacks").join("stack-nextjs");
        assert_eq!(plugin.path, root);
        assert!(root.join("agents/web-developer.md").exists());
        assert_eq!(
            std::fs::read_to_string(root.join("CLAUDE.md")).unwrap(),
            "# Next.js stack"
        );

        let manifest = read_manifest(&root.join(".claude-plugin")).unwrap().unwrap();
        assert_eq!(manifest.version, "1.0.0");
        assert_eq!(
            manifest.skills,
            vec!["skill-react-acme".to_string(), "skill-scss-acme".to_string()]
        );
        // The stale "tailwind" alias is a warning, not a failure.
        assert_eq!(plugin.warnings.len(), 1);

        let again = compile_stack_plugin("nextjs", &matrix, &out, "@acme").unwrap();
        assert!(!again.changed);
        assert_eq!(again.manifest.version, "1.0.0");
    }

    #[test]
    fn author_change_bumps_major() {
        let dir = tempdir().unwrap();
        let source = dir.path().join("source");
        let out = dir.path().join("dist");
        source_with_stack(&source);
        write_text(&source.join("stacks/nextjs/CLAUDE.md"), "# Next.js stack").unwrap();
        let matrix = load_matrix(&source, None, &mut Vec::new()).unwrap();

        compile_stack_plugin("nextjs", &matrix, &out, "@acme").unwrap();
        let rebuilt = compile_stack_plugin("nextjs", &matrix, &out, "@someone-else").unwrap();

        assert!(rebuilt.changed);
        assert_eq!(rebuilt.manifest.version, "2.0.0");
        assert_eq!(rebuilt.manifest.author.name, "@someone-else");
    }

    #[test]
    fn missing_stack_document_is_fatal() {
        let dir = tempdir().unwrap();
        let source = dir.path().join("source");
        let out = dir.path().join("dist");
        source_with_stack(&source);

        let matrix = load_matrix(&source, None, &mut Vec::new()).unwrap();
        let err = compile_stack_plugin("nextjs", &matrix, &out, "@acme").unwrap_err();
        assert!(matches!(err, PipelineError::MissingRequiredFile { .. }));
        assert!(!stack_plugin_dir(&out, "nextjs").exists());
    }

    #[test]
    fn unknown_agent_is_fatal_with_hint() {
        let dir = tempdir().unwrap();
        let source = dir.path().join("source");
        source_with_stack(&source);
        std::fs::remove_dir_all(source.join("agents/web-developer")).unwrap();
        write_agent(&source, "web-dev");
        write_text(&source.join("stacks/nextjs/CLAUDE.md"), "x").unwrap();

        let matrix = load_matrix(&source, None, &mut Vec::new()).unwrap();
        let err = compile_stack_plugin("nextjs", &matrix, &dir.path().join("dist"), "@acme")
            .unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("Agent 'web-developer' not found"), "got: {msg}");
        assert!(msg.contains("Did you mean 'web-dev'?"));
    }

    #[test]
    fn unknown_stack_is_fatal() {
        let dir = tempdir().unwrap();
        let source = dir.path().join("source");
        source_with_stack(&source);
        let matrix = load_matrix(&source, None, &mut Vec::new()).unwrap();
        assert!(compile_stack_plugin("remix", &matrix, &dir.path().join("dist"), "@acme").is_err());
    }
}
