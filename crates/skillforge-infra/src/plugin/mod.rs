//! Plugin packaging: manifests, the content-hash marker, the version
//! decision, and the skill / stack / marketplace builders.
//!
//! Every plugin unit carries:
//! ```text
//! {plugin}/.claude-plugin/plugin.json           public manifest
//! {plugin}/.claude-plugin/.skillforge-meta.toml content hash + updated_at
//! ```

pub mod marketplace;
pub mod skill;
pub mod stack;

use std::path::{Path, PathBuf};

use chrono::Utc;
use semver::Version;
use skillforge_core::version::{hash_entries, next_version, HashEntry};
use skillforge_types::error::{PipelineError, PipelineWarning};
use skillforge_types::plugin::{ContentHashMarker, PluginManifest, VersionInfo};

use crate::crypto::hash::{collect_hash_entries, Sha256ContentHasher};
use crate::filesystem::{read_text, write_text};

pub const PLUGIN_DIR: &str = ".claude-plugin";
pub const MANIFEST_FILE: &str = "plugin.json";
pub const MARKER_FILE: &str = ".skillforge-meta.toml";

/// A plugin unit written to disk.
#[derive(Debug, Clone)]
pub struct CompiledPlugin {
    pub name: String,
    pub path: PathBuf,
    pub manifest: PluginManifest,
    pub changed: bool,
    pub warnings: Vec<PipelineWarning>,
}

pub fn read_manifest(plugin_meta_dir: &Path) -> Result<Option<PluginManifest>, PipelineError> {
    let path = plugin_meta_dir.join(MANIFEST_FILE);
    if !path.exists() {
        return Ok(None);
    }
    let content = read_text(&path)?;
    serde_json::from_str(&content)
        .map(Some)
        .map_err(|e| PipelineError::Serialization {
            what: path.display().to_string(),
            reason: e.to_string(),
        })
}

pub fn write_manifest(plugin_meta_dir: &Path, manifest: &PluginManifest) -> Result<(), PipelineError> {
    let json = serde_json::to_string_pretty(manifest).map_err(|e| PipelineError::Serialization {
        what: format!("manifest for '{}'", manifest.name),
        reason: e.to_string(),
    })?;
    write_text(&plugin_meta_dir.join(MANIFEST_FILE), &format!("{json}\n"))
}

pub fn read_marker(plugin_meta_dir: &Path) -> Result<Option<ContentHashMarker>, PipelineError> {
    let path = plugin_meta_dir.join(MARKER_FILE);
    if !path.exists() {
        return Ok(None);
    }
    let content = read_text(&path)?;
    toml::from_str(&content)
        .map(Some)
        .map_err(|e| PipelineError::Serialization {
            what: path.display().to_string(),
            reason: e.to_string(),
        })
}

pub fn write_marker(plugin_meta_dir: &Path, marker: &ContentHashMarker) -> Result<(), PipelineError> {
    let content = toml::to_string_pretty(marker).map_err(|e| PipelineError::Serialization {
        what: MARKER_FILE.to_string(),
        reason: e.to_string(),
    })?;
    write_text(&plugin_meta_dir.join(MARKER_FILE), &content)
}

/// Hash of everything a plugin publishes.
///
/// Covers the plugin's files (the `.claude-plugin` directory excluded) plus
/// the manifest with its `version` blanked, so an author, keyword or
/// description change counts as new content.
pub fn plugin_content_hash(plugin_dir: &Path, manifest: &PluginManifest) -> Result<String, PipelineError> {
    let mut entries = collect_hash_entries(plugin_dir)?;

    let unversioned = PluginManifest {
        version: String::new(),
        ..manifest.clone()
    };
    let bytes = serde_json::to_vec(&unversioned).map_err(|e| PipelineError::Serialization {
        what: format!("manifest for '{}'", manifest.name),
        reason: e.to_string(),
    })?;
    entries.push(HashEntry {
        path: format!("{PLUGIN_DIR}/{MANIFEST_FILE}"),
        bytes,
    });

    Ok(hash_entries(&Sha256ContentHasher::new(), &entries))
}

/// Hash a written plugin unit and decide its version against the previous
/// build in the same directory.
///
/// `manifest.version` is ignored. The stored version and hash are only used
/// when both the manifest and the marker are present and readable.
pub fn determine_version(plugin_dir: &Path, manifest: &PluginManifest) -> Result<VersionInfo, PipelineError> {
    let content_hash = plugin_content_hash(plugin_dir, manifest)?;
    let previous = stored_version(&plugin_dir.join(PLUGIN_DIR));
    let info = next_version(
        previous.as_ref().map(|(v, h)| (v, h.as_str())),
        &content_hash,
    );
    tracing::debug!(
        plugin = %manifest.name,
        version = %info.version,
        changed = info.changed,
        "Determined plugin version"
    );
    Ok(info)
}

fn stored_version(manifest_dir: &Path) -> Option<(Version, String)> {
    let manifest = match read_manifest(manifest_dir) {
        Ok(manifest) => manifest?,
        Err(e) => {
            tracing::warn!(dir = %manifest_dir.display(), error = %e, "Ignoring unreadable manifest");
            return None;
        }
    };
    let marker = match read_marker(manifest_dir) {
        Ok(marker) => marker?,
        Err(e) => {
            tracing::warn!(dir = %manifest_dir.display(), error = %e, "Ignoring unreadable marker");
            return None;
        }
    };
    match Version::parse(&manifest.version) {
        Ok(version) => Some((version, marker.content_hash)),
        Err(e) => {
            tracing::warn!(version = %manifest.version, error = %e, "Ignoring invalid stored version");
            None
        }
    }
}

/// Stamp the decided version into `manifest`, then write manifest and
/// marker.
///
/// An unchanged unit keeps its existing marker so repeated builds produce
/// identical files.
pub(crate) fn write_plugin_meta(
    plugin_dir: &Path,
    manifest: &mut PluginManifest,
    info: &VersionInfo,
) -> Result<(), PipelineError> {
    manifest.version = info.version.to_string();
    let meta_dir = plugin_dir.join(PLUGIN_DIR);
    write_manifest(&meta_dir, manifest)?;

    let existing = read_marker(&meta_dir).ok().flatten();
    let keep = !info.changed && existing.as_ref().is_some_and(|m| m.content_hash == info.content_hash);
    if !keep {
        write_marker(
            &meta_dir,
            &ContentHashMarker {
                content_hash: info.content_hash.clone(),
                updated_at: Utc::now(),
            },
        )?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn write_plugin(dir: &Path, content: &str) {
        write_text(&dir.join("skills/x/SKILL.md"), content).unwrap();
    }

    fn manifest() -> PluginManifest {
        PluginManifest {
            name: "skill-x".to_string(),
            version: String::new(),
            description: "x".to_string(),
            author: skillforge_types::plugin::PluginAuthor::named("@acme"),
            keywords: vec!["x".to_string()],
            skills: vec![],
        }
    }

    #[test]
    fn first_build_is_one_zero_zero() {
        let dir = tempdir().unwrap();
        write_plugin(dir.path(), "a");

        let info = determine_version(dir.path(), &manifest()).unwrap();
        assert_eq!(info.version, Version::new(1, 0, 0));
        assert!(info.changed);
    }

    #[test]
    fn unchanged_content_keeps_version_and_changed_bumps_major() {
        let dir = tempdir().unwrap();
        let plugin = dir.path();
        let meta = plugin.join(PLUGIN_DIR);
        write_plugin(plugin, "a");

        let first = determine_version(plugin, &manifest()).unwrap();
        write_plugin_meta(plugin, &mut manifest(), &first).unwrap();
        let marker_before = std::fs::read_to_string(meta.join(MARKER_FILE)).unwrap();

        let again = determine_version(plugin, &manifest()).unwrap();
        assert_eq!(again.version, Version::new(1, 0, 0));
        assert!(!again.changed);
        write_plugin_meta(plugin, &mut manifest(), &again).unwrap();
        let marker_after = std::fs::read_to_string(meta.join(MARKER_FILE)).unwrap();
        assert_eq!(marker_before, marker_after);

        write_plugin(plugin, "b");
        let bumped = determine_version(plugin, &manifest()).unwrap();
        assert_eq!(bumped.version, Version::new(2, 0, 0));
        assert!(bumped.changed);
    }

    #[test]
    fn manifest_fields_are_part_of_the_hash() {
        let dir = tempdir().unwrap();
        let plugin = dir.path();
        write_plugin(plugin, "a");

        let first = determine_version(plugin, &manifest()).unwrap();
        write_plugin_meta(plugin, &mut manifest(), &first).unwrap();

        let mut retagged = manifest();
        retagged.keywords = vec!["y".to_string()];
        assert_eq!(determine_version(plugin, &retagged).unwrap().version, Version::new(2, 0, 0));

        let mut reauthored = manifest();
        reauthored.author = skillforge_types::plugin::PluginAuthor::named("@other");
        assert_eq!(determine_version(plugin, &reauthored).unwrap().version, Version::new(2, 0, 0));
    }

    #[test]
    fn stamped_version_does_not_change_the_hash() {
        let dir = tempdir().unwrap();
        write_plugin(dir.path(), "a");
        let mut stamped = manifest();
        stamped.version = "9.0.0".to_string();

        assert_eq!(
            plugin_content_hash(dir.path(), &manifest()).unwrap(),
            plugin_content_hash(dir.path(), &stamped).unwrap()
        );
    }

    #[test]
    fn manifest_without_marker_starts_over() {
        let dir = tempdir().unwrap();
        write_plugin(dir.path(), "a");
        let mut old = manifest();
        old.version = "7.0.0".to_string();
        write_manifest(&dir.path().join(PLUGIN_DIR), &old).unwrap();

        let info = determine_version(dir.path(), &manifest()).unwrap();
        assert_eq!(info.version, Version::new(1, 0, 0));
    }

    #[test]
    fn manifest_never_carries_hash() {
        let dir = tempdir().unwrap();
        let mut stamped = manifest();
        stamped.version = "1.0.0".to_string();
        write_manifest(dir.path(), &stamped).unwrap();
        let json = std::fs::read_to_string(dir.path().join(MANIFEST_FILE)).unwrap();
        assert!(!json.contains("hash"));
        assert!(!json.contains("updated"));
    }
}
