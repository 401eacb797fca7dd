//! `outdated` and `diff` reports over a project's local skills.
//!
//! The source matrix passed in must be loaded without local overrides so
//! source hashes are the upstream ones.

use std::collections::BTreeMap;
use std::path::Path;

use skillforge_core::matrix::SkillMatrix;
use skillforge_core::provenance::classify_fork;
use skillforge_core::provenance::diff::unified_file_diff;
use skillforge_types::error::{PipelineError, PipelineWarning, ReferenceKind};
use skillforge_types::provenance::{DiffReport, FileDiff, ForkStatus, OutdatedReport, SkillDiff};

use crate::crypto::hash::collect_hash_entries;
use crate::skill::store::{LocalSkill, LocalSkillStore};

/// Classify every local skill against the source.
pub fn outdated_report(
    store: &LocalSkillStore,
    source: &SkillMatrix,
) -> Result<(OutdatedReport, Vec<PipelineWarning>), PipelineError> {
    let mut entries = Vec::new();
    let mut warnings = Vec::new();

    for local in store.list_skills()? {
        let source_hash = source_hash_for(&local, source);
        let (entry, warning) = classify_fork(&local.fork, source_hash);
        tracing::debug!(skill = %entry.skill_id, status = %entry.status, "Classified local skill");
        entries.push(entry);
        warnings.extend(warning);
    }

    Ok((OutdatedReport::from_entries(entries), warnings))
}

/// Unified diffs between forks and their current source.
///
/// With `skill` set only that fork is compared; it may be named by id or
/// directory. Local-only skills are listed as skipped. Identical content
/// yields a report without differences, which is not an error.
pub fn diff_report(
    store: &LocalSkillStore,
    source: &SkillMatrix,
    skill: Option<&str>,
) -> Result<(DiffReport, Vec<PipelineWarning>), PipelineError> {
    let locals = match skill {
        Some(name) => match store.find(name)? {
            Some(local) => vec![local],
            None => {
                let available: Vec<String> = store
                    .list_skills()?
                    .into_iter()
                    .map(|l| l.skill.id)
                    .collect();
                return Err(PipelineError::ReferenceNotFound {
                    kind: ReferenceKind::Skill,
                    id: name.to_string(),
                    hint: if available.is_empty() {
                        "no local skills found".to_string()
                    } else {
                        format!("Local skills: {}", available.join(", "))
                    },
                });
            }
        },
        None => store.list_skills()?,
    };

    let mut report = DiffReport::default();
    let mut warnings = Vec::new();

    for local in locals {
        let source_hash = source_hash_for(&local, source);
        let (entry, warning) = classify_fork(&local.fork, source_hash);
        warnings.extend(warning);

        let upstream = local
            .fork
            .forked_from
            .as_ref()
            .and_then(|origin| source.get(&origin.skill_id));
        let Some(upstream) = upstream.filter(|_| entry.status != ForkStatus::LocalOnly) else {
            report.skipped.push(local.skill.id.clone());
            continue;
        };

        let files = diff_dirs(&local.skill.path, &upstream.path)?;
        report.diffs.push(SkillDiff {
            skill_id: local.skill.id.clone(),
            source_id: upstream.id.clone(),
            status: entry.status,
            files,
        });
    }

    Ok((report, warnings))
}

fn source_hash_for<'m>(local: &LocalSkill, source: &'m SkillMatrix) -> Option<&'m str> {
    let origin = local.fork.forked_from.as_ref()?;
    source
        .get(&origin.skill_id)
        .filter(|s| !s.local)
        .map(|s| s.content_hash.as_str())
}

/// Per-file diffs between a local directory and its source directory.
fn diff_dirs(local_dir: &Path, source_dir: &Path) -> Result<Vec<FileDiff>, PipelineError> {
    let mut files: BTreeMap<String, (Option<String>, Option<String>)> = BTreeMap::new();
    for entry in collect_hash_entries(local_dir)? {
        files.entry(entry.path).or_default().0 = Some(String::from_utf8_lossy(&entry.bytes).into_owned());
    }
    for entry in collect_hash_entries(source_dir)? {
        files.entry(entry.path).or_default().1 = Some(String::from_utf8_lossy(&entry.bytes).into_owned());
    }

    Ok(files
        .into_iter()
        .filter_map(|(path, (local, source))| {
            unified_file_diff(&path, local.as_deref(), source.as_deref())
                .map(|diff| FileDiff { path, diff })
        })
        .collect())
}
