//! Fork provenance: classify local skills against their source.
//!
//! Classification is recomputed on every invocation from the fork's recorded
//! hash and a fresh hash of the source skill. Nothing here is cached.

pub mod diff;

use skillforge_types::error::PipelineWarning;
use skillforge_types::provenance::{ForkMetadata, ForkStatus, ForkStatusEntry};

/// Note attached to forks whose source skill no longer exists.
pub const UPSTREAM_MISSING: &str = "upstream missing";

/// Classify one local skill.
///
/// `source_hash` is the fresh hash of the skill named in `forked-from`, or
/// `None` when that skill is gone. A fork whose source vanished is reported
/// local-only with an [`UPSTREAM_MISSING`] note and a warning.
pub fn classify_fork(
    fork: &ForkMetadata,
    source_hash: Option<&str>,
) -> (ForkStatusEntry, Option<PipelineWarning>) {
    let mut entry = ForkStatusEntry {
        skill_id: fork.skill_id.clone(),
        status: ForkStatus::LocalOnly,
        forked_from: None,
        recorded_hash: None,
        source_hash: source_hash.map(str::to_string),
        note: None,
    };

    let Some(origin) = &fork.forked_from else {
        return (entry, None);
    };
    entry.forked_from = Some(origin.skill_id.clone());
    entry.recorded_hash = Some(origin.content_hash.clone());

    match source_hash {
        None => {
            entry.note = Some(UPSTREAM_MISSING.to_string());
            let warning = PipelineWarning::UpstreamMissing {
                skill: fork.skill_id.clone(),
                source_skill: origin.skill_id.clone(),
            };
            (entry, Some(warning))
        }
        Some(hash) if hash == origin.content_hash => {
            entry.status = ForkStatus::Current;
            (entry, None)
        }
        Some(_) => {
            entry.status = ForkStatus::Outdated;
            (entry, None)
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use skillforge_types::skill::ForkedFrom;

    use super::*;

    fn fork(origin: Option<&str>) -> ForkMetadata {
        ForkMetadata {
            skill_id: "my-react".to_string(),
            author: Some("@me".to_string()),
            content_hash: "local".to_string(),
            forked_from: origin.map(|hash| ForkedFrom {
                skill_id: "react (@acme)".to_string(),
                content_hash: hash.to_string(),
                date: NaiveDate::from_ymd_opt(2026, 3, 1).unwrap_or_default(),
            }),
        }
    }

    #[test]
    fn matching_hash_is_current() {
        let (entry, warning) = classify_fork(&fork(Some("abc")), Some("abc"));
        assert_eq!(entry.status, ForkStatus::Current);
        assert_eq!(entry.forked_from.as_deref(), Some("react (@acme)"));
        assert!(warning.is_none());
    }

    #[test]
    fn differing_hash_is_outdated() {
        let (entry, _) = classify_fork(&fork(Some("abc")), Some("def"));
        assert_eq!(entry.status, ForkStatus::Outdated);
        assert_eq!(entry.recorded_hash.as_deref(), Some("abc"));
        assert_eq!(entry.source_hash.as_deref(), Some("def"));
    }

    #[test]
    fn no_provenance_is_local_only() {
        let (entry, warning) = classify_fork(&fork(None), None);
        assert_eq!(entry.status, ForkStatus::LocalOnly);
        assert!(entry.note.is_none());
        assert!(warning.is_none());
    }

    #[test]
    fn deleted_upstream_is_local_only_with_note() {
        let (entry, warning) = classify_fork(&fork(Some("abc")), None);
        assert_eq!(entry.status, ForkStatus::LocalOnly);
        assert_eq!(entry.note.as_deref(), Some(UPSTREAM_MISSING));
        assert!(matches!(warning, Some(PipelineWarning::UpstreamMissing { .. })));
    }
}
