//! Content hashing and the version decision for compiled plugins.
//!
//! The hashing algorithm lives behind [`ContentHasher`]; the SHA-256 adapter
//! is in `skillforge-infra`. Versions only ever bump the major component.

use semver::Version;

use skillforge_types::plugin::VersionInfo;

/// Abstraction over content hashing.
pub trait ContentHasher: Send + Sync {
    /// Compute a lowercase hex-encoded hash of the given bytes.
    fn compute_hash(&self, content: &[u8]) -> String;
}

/// One file of a hashed folder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HashEntry {
    /// `/`-joined path relative to the folder.
    pub path: String,
    pub bytes: Vec<u8>,
}

/// Canonical byte stream for a set of files.
///
/// Entries are sorted by relative path; each contributes
/// `path \0 len \0 bytes`.
pub fn canonical_stream(entries: &[HashEntry]) -> Vec<u8> {
    let mut sorted: Vec<&HashEntry> = entries.iter().collect();
    sorted.sort_by(|a, b| a.path.cmp(&b.path));

    let mut stream = Vec::new();
    for entry in sorted {
        stream.extend_from_slice(entry.path.as_bytes());
        stream.push(0);
        stream.extend_from_slice(entry.bytes.len().to_string().as_bytes());
        stream.push(0);
        stream.extend_from_slice(&entry.bytes);
    }
    stream
}

/// Hash a folder's files in canonical order.
pub fn hash_entries(hasher: &dyn ContentHasher, entries: &[HashEntry]) -> String {
    hasher.compute_hash(&canonical_stream(entries))
}

/// Version of a plugin compiled for the first time.
pub fn default_version() -> Version {
    Version::new(1, 0, 0)
}

/// `(major + 1).0.0`
pub fn bump_major(version: &Version) -> Version {
    Version::new(version.major + 1, 0, 0)
}

/// Decide the version for freshly hashed content.
///
/// `previous` is the stored version and content hash, if any. No previous
/// record yields `1.0.0`; an equal hash keeps the stored version; anything
/// else bumps the major version.
pub fn next_version(previous: Option<(&Version, &str)>, content_hash: &str) -> VersionInfo {
    let (version, changed) = match previous {
        None => (default_version(), true),
        Some((stored, stored_hash)) if stored_hash == content_hash => (stored.clone(), false),
        Some((stored, _)) => (bump_major(stored), true),
    };

    VersionInfo {
        version,
        content_hash: content_hash.to_string(),
        changed,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Hex of the raw stream, enough to exercise ordering.
    struct HexHasher;

    impl ContentHasher for HexHasher {
        fn compute_hash(&self, content: &[u8]) -> String {
            content.iter().map(|b| format!("{b:02x}")).collect()
        }
    }

    fn entry(path: &str, bytes: &str) -> HashEntry {
        HashEntry {
            path: path.to_string(),
            bytes: bytes.as_bytes().to_vec(),
        }
    }

    #[test]
    fn canonical_stream_layout() {
        let stream = canonical_stream(&[entry("b.md", "yy"), entry("a.md", "x")]);
        assert_eq!(stream, b"a.md\x001\x00xb.md\x002\x00yy".to_vec());
    }

    #[test]
    fn order_does_not_change_hash() {
        let a = hash_entries(&HexHasher, &[entry("a", "1"), entry("b", "2")]);
        let b = hash_entries(&HexHasher, &[entry("b", "2"), entry("a", "1")]);
        assert_eq!(a, b);
    }

    #[test]
    fn length_prefix_separates_boundaries() {
        let a = hash_entries(&HexHasher, &[entry("a", "12"), entry("b", "")]);
        let b = hash_entries(&HexHasher, &[entry("a", "1"), entry("b", "2")]);
        assert_ne!(a, b);
    }

    #[test]
    fn first_version_is_one() {
        let info = next_version(None, "abc");
        assert_eq!(info.version, Version::new(1, 0, 0));
        assert!(info.changed);
    }

    #[test]
    fn same_hash_keeps_version() {
        let stored = Version::new(3, 0, 0);
        let info = next_version(Some((&stored, "abc")), "abc");
        assert_eq!(info.version, stored);
        assert!(!info.changed);
        // Idempotent.
        let again = next_version(Some((&info.version, info.content_hash.as_str())), "abc");
        assert_eq!(again, info);
    }

    #[test]
    fn changed_hash_bumps_major_only() {
        let stored = Version::new(2, 4, 1);
        let info = next_version(Some((&stored, "old")), "new");
        assert_eq!(info.version, Version::new(3, 0, 0));
        assert_eq!(info.content_hash, "new");
    }
}
