//! Marketplace aggregation over a directory of compiled plugins.

use std::path::{Path, PathBuf};

use skillforge_types::error::{PipelineError, PipelineWarning};
use skillforge_types::plugin::{MarketplaceIndex, MarketplacePlugin, PluginAuthor};
use walkdir::WalkDir;

use super::{read_manifest, MANIFEST_FILE, PLUGIN_DIR};
use crate::filesystem::{relative_slash_path, walk_error, write_text};

pub const MARKETPLACE_FILE: &str = "marketplace.json";

/// The marketplace written by [`build_marketplace`].
#[derive(Debug, Clone)]
pub struct MarketplaceBuild {
    pub index: MarketplaceIndex,
    pub path: PathBuf,
    pub warnings: Vec<PipelineWarning>,
}

/// Scan `plugins_dir` for plugin manifests and write
/// `{plugins_dir}/.claude-plugin/marketplace.json`.
///
/// Plugins are sorted by name. Unreadable manifests are skipped with a
/// warning. An empty directory produces an empty, valid marketplace.
pub fn build_marketplace(
    plugins_dir: &Path,
    name: &str,
    owner: Option<PluginAuthor>,
) -> Result<MarketplaceBuild, PipelineError> {
    let mut plugins = Vec::new();
    let mut warnings = Vec::new();

    if plugins_dir.is_dir() {
        for entry in WalkDir::new(plugins_dir).sort_by_file_name() {
            let entry = entry.map_err(|e| walk_error(plugins_dir, e))?;
            if !entry.file_type().is_file() || entry.file_name() != MANIFEST_FILE {
                continue;
            }
            let Some(meta_dir) = entry.path().parent() else {
                continue;
            };
            if meta_dir.file_name().is_none_or(|n| n != PLUGIN_DIR) {
                continue;
            }
            let Some(plugin_dir) = meta_dir.parent() else {
                continue;
            };
            // The marketplace's own metadata directory.
            if plugin_dir == plugins_dir {
                continue;
            }

            match read_manifest(meta_dir) {
                Ok(Some(manifest)) => plugins.push(MarketplacePlugin {
                    name: manifest.name,
                    version: manifest.version,
                    description: manifest.description,
                    source: format!("./{}", relative_slash_path(plugins_dir, plugin_dir)),
                }),
                Ok(None) => {}
                Err(err) => {
                    tracing::warn!(path = %entry.path().display(), error = %err, "Skipping unreadable plugin manifest");
                    warnings.push(PipelineWarning::SkippedArtifact {
                        path: entry.path().to_path_buf(),
                        reason: err.to_string(),
                    });
                }
            }
        }
    }

    plugins.sort_by(|a, b| a.name.cmp(&b.name));

    let index = MarketplaceIndex {
        name: name.to_string(),
        owner,
        plugins,
    };
    let json = serde_json::to_string_pretty(&index).map_err(|e| PipelineError::Serialization {
        what: "marketplace".to_string(),
        reason: e.to_string(),
    })?;
    let path = plugins_dir.join(PLUGIN_DIR).join(MARKETPLACE_FILE);
    write_text(&path, &format!("{json}\n"))?;

    tracing::info!(
        path = %path.display(),
        plugins = index.plugins.len(),
        "Wrote marketplace"
    );

    Ok(MarketplaceBuild {
        index,
        path,
        warnings,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plugin::write_manifest;
    use skillforge_types::plugin::PluginManifest;
    use tempfile::tempdir;

    fn manifest(name: &str) -> PluginManifest {
        PluginManifest {
            name: name.to_string(),
            version: "2.0.0".to_string(),
            description: format!("{name} plugin"),
            author: PluginAuthor::named("@acme"),
            keywords: vec![],
            skills: vec![],
        }
    }

    #[test]
    fn zero_plugins_is_a_valid_marketplace() {
        let dir = tempdir().unwrap();
        let build = build_marketplace(dir.path(), "acme", None).unwrap();
        assert!(build.index.plugins.is_empty());
        assert!(build.warnings.is_empty());

        let json = std::fs::read_to_string(&build.path).unwrap();
        let parsed: MarketplaceIndex = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.name, "acme");
        assert!(parsed.plugins.is_empty());
    }

    #[test]
    fn plugins_are_sorted_with_relative_sources() {
        let dir = tempdir().unwrap();
        let root = dir.path();
        write_manifest(&root.join("skills/skill-zustand/.claude-plugin"), &manifest("skill-zustand")).unwrap();
        write_manifest(&root.join("skills/skill-react/.claude-plugin"), &manifest("skill-react")).unwrap();
        write_manifest(&root.join("stacks/stack-nextjs/.claude-plugin"), &manifest("stack-nextjs")).unwrap();

        let build = build_marketplace(root, "acme", Some(PluginAuthor::named("Acme"))).unwrap();
        let names: Vec<&str> = build.index.plugins.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["skill-react", "skill-zustand", "stack-nextjs"]);
        assert_eq!(build.index.plugins[0].source, "./skills/skill-react");
        assert_eq!(build.index.plugins[0].version, "2.0.0");

        // Rebuilding does not pick up the marketplace file itself.
        let again = build_marketplace(root, "acme", None).unwrap();
        assert_eq!(again.index.plugins.len(), 3);
    }

    #[test]
    fn unreadable_manifest_is_skipped() {
        let dir = tempdir().unwrap();
        let root = dir.path();
        write_manifest(&root.join("skills/skill-react/.claude-plugin"), &manifest("skill-react")).unwrap();
        write_text(&root.join("skills/skill-bad/.claude-plugin/plugin.json"), "{ not json").unwrap();

        let build = build_marketplace(root, "acme", None).unwrap();
        assert_eq!(build.index.plugins.len(), 1);
        assert_eq!(build.warnings.len(), 1);
    }
}
