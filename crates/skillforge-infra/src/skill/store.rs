//! Project-local skill storage.
//!
//! Local skills live at `{project}/.claude/skills/{dir}/`. Each directory holds
//! a `SKILL.md` and an optional `metadata.yaml` recording fork provenance.

use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use skillforge_core::config::defaults::LOCAL_SKILLS_DIR;
use skillforge_types::error::PipelineError;
use skillforge_types::provenance::ForkMetadata;
use skillforge_types::skill::{ForkedFrom, SkillDefinition, SkillMetadata};

use crate::crypto::hash::METADATA_FILE;
use crate::filesystem::{copy_dir_all, remove_dir_if_exists, write_text};
use crate::source::{load_skill_dir, read_metadata, SkillOrigin, SKILL_FILE};

/// A local skill together with its provenance view.
#[derive(Debug, Clone)]
pub struct LocalSkill {
    pub skill: SkillDefinition,
    pub fork: ForkMetadata,
}

#[derive(Debug, Clone)]
pub struct LocalSkillStore {
    project_dir: PathBuf,
}

impl LocalSkillStore {
    pub fn new(project_dir: impl Into<PathBuf>) -> Self {
        Self {
            project_dir: project_dir.into(),
        }
    }

    /// `{project}/.claude/skills`
    pub fn skills_dir(&self) -> PathBuf {
        self.project_dir.join(LOCAL_SKILLS_DIR)
    }

    pub fn resolve_skill_path(&self, dir_name: &str) -> PathBuf {
        self.skills_dir().join(dir_name)
    }

    pub fn skill_exists(&self, dir_name: &str) -> bool {
        self.resolve_skill_path(dir_name).join(SKILL_FILE).exists()
    }

    /// List all local skills with freshly computed hashes.
    ///
    /// Corrupted skills are skipped with a warning.
    pub fn list_skills(&self) -> Result<Vec<LocalSkill>, PipelineError> {
        let skills_dir = self.skills_dir();
        if !skills_dir.is_dir() {
            return Ok(Vec::new());
        }

        let mut dirs: Vec<PathBuf> = std::fs::read_dir(&skills_dir)
            .map_err(|e| PipelineError::io(&skills_dir, e))?
            .filter_map(Result::ok)
            .map(|entry| entry.path())
            .filter(|path| path.join(SKILL_FILE).exists())
            .collect();
        dirs.sort();

        let mut skills = Vec::with_capacity(dirs.len());
        for dir in dirs {
            match load_skill_dir(&dir, &skills_dir, SkillOrigin::Local) {
                Ok(skill) => {
                    let fork = ForkMetadata {
                        skill_id: skill.id.clone(),
                        author: skill.author.clone(),
                        content_hash: skill.content_hash.clone(),
                        forked_from: skill.forked_from.clone(),
                    };
                    skills.push(LocalSkill { skill, fork });
                }
                Err(e) => {
                    tracing::warn!(path = %dir.display(), error = %e, "Skipping corrupted local skill");
                }
            }
        }

        Ok(skills)
    }

    /// Find a local skill by id or directory name.
    pub fn find(&self, name: &str) -> Result<Option<LocalSkill>, PipelineError> {
        Ok(self.list_skills()?.into_iter().find(|local| {
            local.skill.id == name || local.skill.relative_path == name
        }))
    }

    /// Copy a source skill into the project and record where it came from.
    ///
    /// The fork lands in a directory named after the source skill's
    /// directory. `metadata.yaml` keeps the source's category and relations
    /// and gains a `forked-from` block with the source hash and `date`.
    /// An existing fork is only replaced when `force` is set.
    pub fn fork_skill(
        &self,
        source: &SkillDefinition,
        date: NaiveDate,
        force: bool,
    ) -> Result<PathBuf, PipelineError> {
        let dir_name = source
            .path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| crate::filesystem::slugify(&source.id));
        let target = self.resolve_skill_path(&dir_name);

        if target.exists() {
            if !force {
                return Err(PipelineError::AlreadyExists { path: target });
            }
            remove_dir_if_exists(&target)?;
        }

        copy_dir_all(&source.path, &target)?;

        let mut metadata = read_metadata(&source.path, SkillOrigin::Local).map_err(|reason| {
            PipelineError::MalformedMetadata {
                path: source.path.clone(),
                reason,
            }
        })?;
        metadata.content_hash = None;
        metadata.forked_from = Some(ForkedFrom {
            skill_id: source.id.clone(),
            content_hash: source.content_hash.clone(),
            date,
        });
        write_metadata(&target, &metadata)?;

        tracing::info!(skill = %source.id, path = %target.display(), "Forked skill");
        Ok(target)
    }
}

/// Write a skill's `metadata.yaml`.
pub fn write_metadata(dir: &Path, metadata: &SkillMetadata) -> Result<(), PipelineError> {
    let yaml = serde_yaml_ng::to_string(metadata).map_err(|e| PipelineError::Serialization {
        what: METADATA_FILE.to_string(),
        reason: e.to_string(),
    })?;
    write_text(&dir.join(METADATA_FILE), &yaml)
}
