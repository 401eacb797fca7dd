//! Classification of a finished run.

use serde::Serialize;

use crate::error::PipelineWarning;

/// How a pipeline invocation ended.
///
/// Only `Failed` is a failure. A run that found nothing to do (no
/// differences, zero plugins) is `Success`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum RunOutcome {
    Success,
    SuccessWithWarnings { warnings: Vec<PipelineWarning> },
    Failed { cause: String },
}

impl RunOutcome {
    /// Classify a completed run from its accumulated warnings.
    pub fn from_warnings(warnings: Vec<PipelineWarning>) -> Self {
        if warnings.is_empty() {
            Self::Success
        } else {
            Self::SuccessWithWarnings { warnings }
        }
    }

    /// Classify a run that stopped on a fatal error.
    pub fn failed(cause: impl std::fmt::Display) -> Self {
        Self::Failed {
            cause: cause.to_string(),
        }
    }

    /// Classify a batch of independent units. Any failed unit fails the run.
    pub fn from_units(failed: usize, total: usize, units: &str, warnings: Vec<PipelineWarning>) -> Self {
        if failed > 0 {
            Self::failed(format!("{failed} of {total} {units} failed"))
        } else {
            Self::from_warnings(warnings)
        }
    }

    pub fn is_success(&self) -> bool {
        !matches!(self, Self::Failed { .. })
    }

    pub fn warning_count(&self) -> usize {
        match self {
            Self::SuccessWithWarnings { warnings } => warnings.len(),
            _ => 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn warnings_do_not_fail_a_run() {
        let outcome = RunOutcome::from_warnings(vec![PipelineWarning::StaleAlias {
            stack: "s".to_string(),
            agent: "a".to_string(),
            alias: "tailwind".to_string(),
        }]);
        assert!(outcome.is_success());
        assert_eq!(outcome.warning_count(), 1);
    }

    #[test]
    fn nothing_to_do_is_success() {
        assert!(RunOutcome::from_warnings(vec![]).is_success());
        assert!(!RunOutcome::failed("Skill 'x' not found.").is_success());
    }

    #[test]
    fn one_failed_unit_fails_the_batch() {
        let outcome = RunOutcome::from_units(1, 3, "skill plugins", vec![]);
        assert_eq!(
            outcome,
            RunOutcome::Failed {
                cause: "1 of 3 skill plugins failed".to_string()
            }
        );

        assert_eq!(RunOutcome::from_units(0, 3, "skill plugins", vec![]), RunOutcome::Success);
    }
}
