use std::fmt;
use std::path::PathBuf;

use serde::Serialize;
use thiserror::Error;

/// What kind of identifier a failed lookup was for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ReferenceKind {
    Skill,
    Agent,
    Stack,
}

impl fmt::Display for ReferenceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Skill => write!(f, "Skill"),
            Self::Agent => write!(f, "Agent"),
            Self::Stack => write!(f, "Stack"),
        }
    }
}

/// Errors produced by the resolution, compile and provenance pipeline.
///
/// Loaders return these with the offending id and a remediation hint;
/// orchestration code decides per kind whether to abort or continue (see
/// [`PipelineError::is_fatal`]).
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("{kind} '{id}' not found. {hint}")]
    ReferenceNotFound {
        kind: ReferenceKind,
        id: String,
        hint: String,
    },

    #[error(
        "agent '{agent}' assigns skill '{skill}' under '{category}', but the skill is not in the config's skill list"
    )]
    Validation {
        agent: String,
        category: String,
        skill: String,
    },

    #[error("malformed metadata at {}: {reason}", .path.display())]
    MalformedMetadata { path: PathBuf, reason: String },

    #[error("{unit} is missing required file {}", .path.display())]
    MissingRequiredFile { unit: String, path: PathBuf },

    #[error("stack '{stack}' maps agent '{agent}' to unknown alias '{alias}'")]
    StaleAliasReference {
        stack: String,
        agent: String,
        alias: String,
    },

    #[error("invalid frontmatter in {}: {reason}", .path.display())]
    InvalidFrontmatter { path: PathBuf, reason: String },

    #[error("{} already exists", .path.display())]
    AlreadyExists { path: PathBuf },

    #[error("I/O error at {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to serialize {what}: {reason}")]
    Serialization { what: String, reason: String },
}

impl PipelineError {
    /// Wrap an I/O error with the path it happened at.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Whether this error aborts the enclosing step.
    ///
    /// Malformed metadata during discovery and stale stack aliases are
    /// skipped with a warning; everything else stops the unit it occurred in.
    pub fn is_fatal(&self) -> bool {
        !matches!(
            self,
            Self::MalformedMetadata { .. } | Self::StaleAliasReference { .. }
        )
    }

    /// Convert a non-fatal error into the warning the run reports for it.
    pub fn as_warning(&self) -> Option<PipelineWarning> {
        match self {
            Self::MalformedMetadata { path, reason } => Some(PipelineWarning::MalformedMetadata {
                path: path.clone(),
                reason: reason.clone(),
            }),
            Self::StaleAliasReference {
                stack,
                agent,
                alias,
            } => Some(PipelineWarning::StaleAlias {
                stack: stack.clone(),
                agent: agent.clone(),
                alias: alias.clone(),
            }),
            _ => None,
        }
    }
}

/// A non-fatal issue accumulated during a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PipelineWarning {
    /// A skill directory was skipped during discovery.
    MalformedMetadata { path: PathBuf, reason: String },
    /// A stack alias resolved to nothing; the agent gets one skill fewer.
    StaleAlias {
        stack: String,
        agent: String,
        alias: String,
    },
    /// A selected skill requires another skill that is not selected.
    MissingRequirement { skill: String, requires: String },
    /// A skill's category is not consumed by any agent.
    UnmappedCategory { skill: String, category: String },
    /// A fork points at a source skill that no longer exists.
    UpstreamMissing { skill: String, source_skill: String },
    /// An output artifact could not be read and was left out.
    SkippedArtifact { path: PathBuf, reason: String },
}

impl fmt::Display for PipelineWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MalformedMetadata { path, reason } => {
                write!(f, "skipped {}: {reason}", path.display())
            }
            Self::StaleAlias {
                stack,
                agent,
                alias,
            } => write!(
                f,
                "stack '{stack}' agent '{agent}': alias '{alias}' matches no skill, omitted"
            ),
            Self::MissingRequirement { skill, requires } => {
                write!(f, "skill '{skill}' requires '{requires}', which is not selected")
            }
            Self::UnmappedCategory { skill, category } => {
                write!(f, "skill '{skill}' has category '{category}' that no agent consumes")
            }
            Self::UpstreamMissing {
                skill,
                source_skill,
            } => write!(
                f,
                "skill '{skill}' was forked from '{source_skill}', which no longer exists upstream"
            ),
            Self::SkippedArtifact { path, reason } => {
                write!(f, "skipped {}: {reason}", path.display())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reference_not_found_display() {
        let err = PipelineError::ReferenceNotFound {
            kind: ReferenceKind::Skill,
            id: "vue".to_string(),
            hint: "Available skills: react, svelte".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Skill 'vue' not found. Available skills: react, svelte"
        );
    }

    #[test]
    fn fatality_policy() {
        let stale = PipelineError::StaleAliasReference {
            stack: "nextjs".to_string(),
            agent: "web-developer".to_string(),
            alias: "tailwind".to_string(),
        };
        assert!(!stale.is_fatal());
        assert!(matches!(
            stale.as_warning(),
            Some(PipelineWarning::StaleAlias { .. })
        ));

        let missing = PipelineError::MissingRequiredFile {
            unit: "stack 'nextjs'".to_string(),
            path: PathBuf::from("stacks/nextjs/CLAUDE.md"),
        };
        assert!(missing.is_fatal());
        assert!(missing.as_warning().is_none());
        assert!(missing.to_string().contains("stacks/nextjs/CLAUDE.md"));
    }

    #[test]
    fn warning_display() {
        let w = PipelineWarning::UpstreamMissing {
            skill: "react (@me)".to_string(),
            source_skill: "react (@acme)".to_string(),
        };
        assert!(w.to_string().contains("no longer exists upstream"));
    }
}
