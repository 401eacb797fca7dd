//! Per-invocation application state.
//!
//! AppState pins the resolved directories and owns the [`PipelineContext`]
//! that memoizes matrix loads and collects warnings for the summary line.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};

use skillforge_core::context::{PipelineContext, Verbosity};
use skillforge_core::matrix::SkillMatrix;
use skillforge_infra::filesystem::resolve_source_root;
use skillforge_infra::project::local_skills_dir;
use skillforge_infra::skill::store::LocalSkillStore;
use skillforge_infra::source::load_matrix;

pub struct AppState {
    pub source_root: PathBuf,
    pub project_dir: PathBuf,
    pub output_dir: PathBuf,
    pub json: bool,
    pub ctx: PipelineContext,
}

impl AppState {
    pub fn init(
        source: Option<&Path>,
        project_dir: PathBuf,
        output_dir: PathBuf,
        json: bool,
        verbosity: Verbosity,
    ) -> Self {
        let source_root = resolve_source_root(source);
        tracing::debug!(
            source = %source_root.display(),
            project = %project_dir.display(),
            "Resolved directories"
        );
        Self {
            source_root,
            project_dir,
            output_dir,
            json,
            ctx: PipelineContext::new(verbosity),
        }
    }

    /// Styled text is printed unless `--json` or `--quiet` is set.
    pub fn prints_text(&self) -> bool {
        !self.json && !self.ctx.is_quiet()
    }

    /// Source skills merged with the project's local skills.
    pub fn matrix(&mut self) -> Result<Arc<SkillMatrix>> {
        let local = local_skills_dir(&self.project_dir);
        let source = self.source_root.clone();
        self.ctx
            .matrix_or_load(&source, Some(&local), |warnings| {
                load_matrix(&source, Some(&local), warnings)
            })
            .with_context(|| format!("Failed to load skills from {}", source.display()))
    }

    /// Source skills only, for comparing forks against upstream.
    pub fn source_matrix(&mut self) -> Result<Arc<SkillMatrix>> {
        let source = self.source_root.clone();
        self.ctx
            .matrix_or_load(&source, None, |warnings| load_matrix(&source, None, warnings))
            .with_context(|| format!("Failed to load skills from {}", source.display()))
    }

    pub fn local_store(&self) -> LocalSkillStore {
        LocalSkillStore::new(&self.project_dir)
    }
}
