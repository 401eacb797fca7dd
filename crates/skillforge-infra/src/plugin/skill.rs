//! Single-skill plugin packaging.
//!
//! ```text
//! {out}/skills/skill-{slug}/
//!   .claude-plugin/plugin.json
//!   .claude-plugin/.skillforge-meta.toml
//!   skills/{slug}/SKILL.md (+ reference.md, examples/)
//!   README.md
//! ```

use std::path::{Path, PathBuf};

use skillforge_core::compiler::render::render_skill_readme;
use skillforge_core::matrix::SkillMatrix;
use skillforge_core::skill::manifest::{parse_skill_md, validate_frontmatter};
use skillforge_types::error::PipelineError;
use skillforge_types::plugin::{PluginAuthor, PluginManifest};
use skillforge_types::skill::SkillDefinition;

use super::{determine_version, write_plugin_meta, CompiledPlugin};
use crate::filesystem::{copy_dir_all, read_text, remove_dir_if_exists, slugify, write_text};
use crate::source::SKILL_FILE;

/// Optional files copied next to `SKILL.md` when present.
const COMPANIONS: [&str; 2] = ["reference.md", "examples"];

/// `react (@acme)` -> `skill-react-acme`
pub fn skill_plugin_name(skill_id: &str) -> String {
    format!("skill-{}", slugify(skill_id))
}

/// `{out}/skills/skill-{slug}`
pub fn skill_plugin_dir(out_dir: &Path, skill_id: &str) -> PathBuf {
    out_dir.join("skills").join(skill_plugin_name(skill_id))
}

/// Package one skill as a plugin.
pub fn compile_skill_plugin(skill: &SkillDefinition, out_dir: &Path) -> Result<CompiledPlugin, PipelineError> {
    let unit = format!("skill '{}'", skill.id);
    let skill_md = skill.path.join(SKILL_FILE);
    if !skill_md.exists() {
        return Err(PipelineError::MissingRequiredFile { unit, path: skill_md });
    }

    let content = read_text(&skill_md)?;
    let invalid = |reason: String| PipelineError::InvalidFrontmatter {
        path: skill_md.clone(),
        reason,
    };
    let (frontmatter, _body) = parse_skill_md(&content).map_err(|e| invalid(format!("{e:#}")))?;
    validate_frontmatter(&frontmatter).map_err(|e| invalid(format!("{e:#}")))?;

    let name = skill_plugin_name(&skill.id);
    let plugin_dir = skill_plugin_dir(out_dir, &skill.id);

    let content_dir = plugin_dir.join("skills").join(slugify(&skill.id));
    remove_dir_if_exists(&content_dir)?;
    write_text(&content_dir.join(SKILL_FILE), &content)?;
    for companion in COMPANIONS {
        let from = skill.path.join(companion);
        if from.is_dir() {
            copy_dir_all(&from, &content_dir.join(companion))?;
        } else if from.is_file() {
            write_text(&content_dir.join(companion), &read_text(&from)?)?;
        }
    }

    write_text(&plugin_dir.join("README.md"), &render_skill_readme(skill))?;

    let mut manifest = PluginManifest {
        name: name.clone(),
        version: String::new(),
        description: frontmatter.description.trim().to_string(),
        author: PluginAuthor::named(skill.author.clone().unwrap_or_else(|| "unknown".to_string())),
        keywords: skill.tags.clone(),
        skills: Vec::new(),
    };
    let info = determine_version(&plugin_dir, &manifest)?;
    write_plugin_meta(&plugin_dir, &mut manifest, &info)?;

    tracing::info!(
        plugin = %name,
        version = %manifest.version,
        changed = info.changed,
        "Compiled skill plugin"
    );

    Ok(CompiledPlugin {
        name,
        path: plugin_dir,
        manifest,
        changed: info.changed,
        warnings: Vec::new(),
    })
}

/// Plugins written by a batch build, plus the units that failed.
#[derive(Debug, Default)]
pub struct PluginBuildReport {
    pub plugins: Vec<CompiledPlugin>,
    /// `(skill id, reason)` for every skill that could not be packaged.
    pub failed: Vec<(String, String)>,
}

impl PluginBuildReport {
    pub fn has_failures(&self) -> bool {
        !self.failed.is_empty()
    }
}

/// Package every source skill in the matrix.
///
/// Local skills are not packaged. A failing skill is recorded in `failed`
/// and the rest keep going.
pub fn compile_all_skill_plugins(matrix: &SkillMatrix, out_dir: &Path) -> PluginBuildReport {
    let mut report = PluginBuildReport::default();

    for skill in matrix.skills.values().filter(|s| !s.local) {
        match compile_skill_plugin(skill, out_dir) {
            Ok(plugin) => report.plugins.push(plugin),
            Err(err) => {
                tracing::warn!(skill = %skill.id, error = %err, "Skill plugin failed");
                report.failed.push((skill.id.clone(), err.to_string()));
            }
        }
    }

    report
}
