//! Fork provenance records and the reports produced by `outdated` / `diff`.

use std::fmt;

use serde::Serialize;

use crate::skill::ForkedFrom;

/// Provenance view of one local skill.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ForkMetadata {
    pub skill_id: String,
    pub author: Option<String>,
    pub content_hash: String,
    pub forked_from: Option<ForkedFrom>,
}

/// Freshly evaluated state of a local skill relative to its source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ForkStatus {
    Current,
    Outdated,
    LocalOnly,
}

impl fmt::Display for ForkStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Current => write!(f, "current"),
            Self::Outdated => write!(f, "outdated"),
            Self::LocalOnly => write!(f, "local-only"),
        }
    }
}

/// One row of the `outdated` report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ForkStatusEntry {
    pub skill_id: String,
    pub status: ForkStatus,
    pub forked_from: Option<String>,
    pub recorded_hash: Option<String>,
    pub source_hash: Option<String>,
    /// Extra context, e.g. "upstream missing".
    pub note: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct OutdatedSummary {
    pub current: usize,
    pub outdated: usize,
    pub local_only: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct OutdatedReport {
    pub entries: Vec<ForkStatusEntry>,
    pub summary: OutdatedSummary,
}

impl OutdatedReport {
    /// Build a report and tally its summary counts.
    pub fn from_entries(entries: Vec<ForkStatusEntry>) -> Self {
        let mut summary = OutdatedSummary::default();
        for entry in &entries {
            match entry.status {
                ForkStatus::Current => summary.current += 1,
                ForkStatus::Outdated => summary.outdated += 1,
                ForkStatus::LocalOnly => summary.local_only += 1,
            }
        }
        Self { entries, summary }
    }
}

/// Unified diff of one file between a fork and its source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileDiff {
    pub path: String,
    pub diff: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkillDiff {
    pub skill_id: String,
    pub source_id: String,
    pub status: ForkStatus,
    pub files: Vec<FileDiff>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DiffReport {
    pub diffs: Vec<SkillDiff>,
    /// Local-only skills that were not compared.
    pub skipped: Vec<String>,
}

impl DiffReport {
    pub fn has_differences(&self) -> bool {
        self.diffs.iter().any(|d| !d.files.is_empty())
    }
}
