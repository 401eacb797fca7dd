//! Per-invocation pipeline context.
//!
//! Created once in `main`, threaded through every operation, dropped at
//! exit. Holds the verbosity, memoized matrix loads and the warnings
//! accumulated so far.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use skillforge_types::error::PipelineWarning;
use skillforge_types::outcome::RunOutcome;

use crate::matrix::SkillMatrix;

/// Output verbosity for one invocation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Verbosity {
    Quiet,
    #[default]
    Normal,
    Verbose,
}

type MatrixKey = (PathBuf, Option<PathBuf>);

#[derive(Debug, Default)]
pub struct PipelineContext {
    pub verbosity: Verbosity,
    matrices: HashMap<MatrixKey, Arc<SkillMatrix>>,
    warnings: Vec<PipelineWarning>,
}

impl PipelineContext {
    pub fn new(verbosity: Verbosity) -> Self {
        Self {
            verbosity,
            ..Self::default()
        }
    }

    pub fn is_quiet(&self) -> bool {
        self.verbosity == Verbosity::Quiet
    }

    /// Return the matrix for `(source, local)`, loading it on first use.
    ///
    /// `load` receives the warning sink so discovery warnings are recorded
    /// only once per key.
    pub fn matrix_or_load<E, F>(
        &mut self,
        source: &Path,
        local: Option<&Path>,
        load: F,
    ) -> Result<Arc<SkillMatrix>, E>
    where
        F: FnOnce(&mut Vec<PipelineWarning>) -> Result<SkillMatrix, E>,
    {
        let key = (source.to_path_buf(), local.map(Path::to_path_buf));
        if let Some(matrix) = self.matrices.get(&key) {
            tracing::debug!(source = %source.display(), "Reusing loaded skill matrix");
            return Ok(Arc::clone(matrix));
        }

        let matrix = Arc::new(load(&mut self.warnings)?);
        self.matrices.insert(key, Arc::clone(&matrix));
        Ok(matrix)
    }

    /// Record a non-fatal issue.
    pub fn warn(&mut self, warning: PipelineWarning) {
        tracing::warn!(%warning, "Pipeline warning");
        self.warnings.push(warning);
    }

    pub fn extend_warnings(&mut self, warnings: impl IntoIterator<Item = PipelineWarning>) {
        for warning in warnings {
            self.warn(warning);
        }
    }

    pub fn warnings(&self) -> &[PipelineWarning] {
        &self.warnings
    }

    /// Classify the run so far as success, with or without warnings.
    pub fn outcome(&self) -> RunOutcome {
        RunOutcome::from_warnings(self.warnings.clone())
    }

    /// Classify a batch run of `total` units, `failed` of which did not
    /// complete. Any failure fails the run.
    pub fn batch_outcome(&self, failed: usize, total: usize, units: &str) -> RunOutcome {
        RunOutcome::from_units(failed, total, units, self.warnings.clone())
    }
}
