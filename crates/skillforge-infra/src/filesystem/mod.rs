//! Filesystem helpers shared by the loaders and packagers.
//!
//! Every helper maps `std::io::Error` into [`PipelineError::Io`] carrying the
//! path it happened at.

use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use skillforge_types::error::PipelineError;
use walkdir::WalkDir;

/// Environment variable naming the source root.
pub const SOURCE_ENV_VAR: &str = "SKILLFORGE_SOURCE";

/// Resolve the source root directory.
///
/// Priority:
/// 1. Explicit path (`--source`)
/// 2. `SKILLFORGE_SOURCE` environment variable
/// 3. `~/.skillforge/source`
/// 4. `./.skillforge/source`
pub fn resolve_source_root(explicit: Option<&Path>) -> PathBuf {
    if let Some(path) = explicit {
        return path.to_path_buf();
    }

    if let Ok(dir) = std::env::var(SOURCE_ENV_VAR) {
        if !dir.trim().is_empty() {
            return PathBuf::from(dir);
        }
    }

    if let Some(home) = dirs::home_dir() {
        return home.join(".skillforge").join("source");
    }

    PathBuf::from(".skillforge").join("source")
}

pub fn read_text(path: &Path) -> Result<String, PipelineError> {
    std::fs::read_to_string(path).map_err(|e| PipelineError::io(path, e))
}

/// Write a file, creating parent directories as needed.
pub fn write_text(path: &Path, content: &str) -> Result<(), PipelineError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| PipelineError::io(parent, e))?;
    }
    std::fs::write(path, content).map_err(|e| PipelineError::io(path, e))
}

/// Read and parse an optional YAML document. A missing file yields `None`.
pub fn read_yaml_opt<T: DeserializeOwned>(path: &Path) -> Result<Option<T>, PipelineError> {
    if !path.exists() {
        return Ok(None);
    }
    let content = read_text(path)?;
    serde_yaml_ng::from_str(&content)
        .map(Some)
        .map_err(|e| PipelineError::Serialization {
            what: path.display().to_string(),
            reason: e.to_string(),
        })
}

/// Recursively copy a directory tree.
pub fn copy_dir_all(from: &Path, to: &Path) -> Result<(), PipelineError> {
    for entry in WalkDir::new(from).sort_by_file_name() {
        let entry = entry.map_err(|e| walk_error(from, e))?;
        let Ok(relative) = entry.path().strip_prefix(from) else {
            continue;
        };
        let target = to.join(relative);
        if entry.file_type().is_dir() {
            std::fs::create_dir_all(&target).map_err(|e| PipelineError::io(&target, e))?;
        } else {
            if let Some(parent) = target.parent() {
                std::fs::create_dir_all(parent).map_err(|e| PipelineError::io(parent, e))?;
            }
            std::fs::copy(entry.path(), &target).map_err(|e| PipelineError::io(entry.path(), e))?;
        }
    }
    Ok(())
}

/// Remove a directory tree if it exists.
pub fn remove_dir_if_exists(path: &Path) -> Result<(), PipelineError> {
    if path.exists() {
        std::fs::remove_dir_all(path).map_err(|e| PipelineError::io(path, e))?;
    }
    Ok(())
}

/// `/`-joined path of `path` relative to `root`.
pub fn relative_slash_path(root: &Path, path: &Path) -> String {
    path.strip_prefix(root)
        .unwrap_or(path)
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

/// Whether a path component is hidden (`.git`, `.DS_Store`, ...).
pub fn is_hidden(name: &std::ffi::OsStr) -> bool {
    name.to_string_lossy().starts_with('.')
}

/// Lowercase, `-`-separated slug of a skill id: `React (@acme)` -> `react-acme`.
pub fn slugify(id: &str) -> String {
    let mut slug = String::with_capacity(id.len());
    for c in id.chars() {
        if c.is_ascii_alphanumeric() {
            slug.push(c.to_ascii_lowercase());
        } else if !slug.ends_with('-') {
            slug.push('-');
        }
    }
    slug.trim_matches('-').to_string()
}

pub(crate) fn walk_error(root: &Path, err: walkdir::Error) -> PipelineError {
    let path = err.path().unwrap_or(root).to_path_buf();
    let source = err
        .into_io_error()
        .unwrap_or_else(|| std::io::Error::other("filesystem loop detected"));
    PipelineError::io(path, source)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn explicit_source_wins() {
        let root = resolve_source_root(Some(Path::new("/tmp/src")));
        assert_eq!(root, PathBuf::from("/tmp/src"));
    }

    #[test]
    fn write_creates_parent_dirs() {
        let dir = tempdir().unwrap();
        let file = dir.path().join("nested").join("deep").join("a.txt");
        write_text(&file, "hello").unwrap();
        assert_eq!(read_text(&file).unwrap(), "hello");
    }

    #[test]
    fn read_missing_file_names_path() {
        let dir = tempdir().unwrap();
        let err = read_text(&dir.path().join("missing.md")).unwrap_err();
        assert!(err.to_string().contains("missing.md"));
    }

    #[test]
    fn optional_yaml() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("x.yaml");
        assert!(read_yaml_opt::<Vec<String>>(&path).unwrap().is_none());

        std::fs::write(&path, "- a\n- b\n").unwrap();
        assert_eq!(
            read_yaml_opt::<Vec<String>>(&path).unwrap(),
            Some(vec!["a".to_string(), "b".to_string()])
        );

        std::fs::write(&path, "{ not: [valid").unwrap();
        assert!(read_yaml_opt::<Vec<String>>(&path).is_err());
    }

    #[test]
    fn copy_nested_tree() {
        let dir = tempdir().unwrap();
        let from = dir.path().join("from");
        write_text(&from.join("a.md"), "a").unwrap();
        write_text(&from.join("examples").join("b.md"), "b").unwrap();

        let to = dir.path().join("to");
        copy_dir_all(&from, &to).unwrap();
        assert_eq!(read_text(&to.join("examples").join("b.md")).unwrap(), "b");
    }

    #[test]
    fn slugs() {
        assert_eq!(slugify("React (@acme)"), "react-acme");
        assert_eq!(slugify("web/framework/react"), "web-framework-react");
        assert_eq!(slugify("--x--"), "x");
    }

    #[test]
    fn relative_paths_use_slashes() {
        let rel = relative_slash_path(Path::new("/a/b"), Path::new("/a/b/c/d"));
        assert_eq!(rel, "c/d");
    }
}
