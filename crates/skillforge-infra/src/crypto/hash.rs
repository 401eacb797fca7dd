//! SHA-256 content hashing of skill folders.
//!
//! Implements the `ContentHasher` trait from `skillforge-core` using the
//! `sha2` crate, and collects a folder's files in the form the canonical
//! stream expects.

use std::path::Path;

use sha2::{Digest, Sha256};
use skillforge_core::version::{hash_entries, ContentHasher, HashEntry};
use skillforge_types::error::PipelineError;
use walkdir::WalkDir;

use crate::filesystem::{is_hidden, relative_slash_path, walk_error};

/// The per-skill metadata document, excluded from content hashes.
pub const METADATA_FILE: &str = "metadata.yaml";

/// SHA-256 implementation of `ContentHasher`.
///
/// Computes lowercase hex-encoded digests.
pub struct Sha256ContentHasher;

impl Sha256ContentHasher {
    pub fn new() -> Self {
        Self
    }
}

impl Default for Sha256ContentHasher {
    fn default() -> Self {
        Self::new()
    }
}

impl ContentHasher for Sha256ContentHasher {
    fn compute_hash(&self, content: &[u8]) -> String {
        let digest = Sha256::digest(content);
        format!("{:x}", digest)
    }
}

/// Collect every file of a folder for hashing.
///
/// Hidden files and directories are skipped, as is the top-level
/// `metadata.yaml`. Paths are `/`-joined relative to `dir`.
pub fn collect_hash_entries(dir: &Path) -> Result<Vec<HashEntry>, PipelineError> {
    let mut entries = Vec::new();

    let walker = WalkDir::new(dir)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| e.depth() == 0 || !is_hidden(e.file_name()));

    for entry in walker {
        let entry = entry.map_err(|e| walk_error(dir, e))?;
        if !entry.file_type().is_file() {
            continue;
        }
        if entry.depth() == 1 && entry.file_name() == METADATA_FILE {
            continue;
        }
        let bytes = std::fs::read(entry.path()).map_err(|e| PipelineError::io(entry.path(), e))?;
        entries.push(HashEntry {
            path: relative_slash_path(dir, entry.path()),
            bytes,
        });
    }

    Ok(entries)
}

/// SHA-256 content hash of a skill folder.
pub fn hash_skill_dir(dir: &Path) -> Result<String, PipelineError> {
    let entries = collect_hash_entries(dir)?;
    Ok(hash_entries(&Sha256ContentHasher::new(), &entries))
}
