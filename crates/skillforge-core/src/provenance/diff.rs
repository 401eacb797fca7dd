//! Unified diff text between a fork and its source.

use similar::TextDiff;

/// Lines of unchanged context around each hunk.
const CONTEXT_LINES: usize = 3;

/// Unified diff of one file, `None` when both sides are identical.
///
/// A missing side is diffed as empty content, so added and deleted files
/// show up as whole-file hunks.
pub fn unified_file_diff(path: &str, local: Option<&str>, source: Option<&str>) -> Option<String> {
    let old = source.unwrap_or_default();
    let new = local.unwrap_or_default();
    if old == new && local.is_some() == source.is_some() {
        return None;
    }

    let old_header = match source {
        Some(_) => format!("source/{path}"),
        None => "/dev/null".to_string(),
    };
    let new_header = match local {
        Some(_) => format!("local/{path}"),
        None => "/dev/null".to_string(),
    };

    let diff = TextDiff::from_lines(old, new);
    Some(
        diff.unified_diff()
            .context_radius(CONTEXT_LINES)
            .header(&old_header, &new_header)
            .to_string(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identical_content_has_no_diff() {
        assert!(unified_file_diff("SKILL.md", Some("a\nb\n"), Some("a\nb\n")).is_none());
    }

    #[test]
    fn changed_line_is_marked() {
        let diff = unified_file_diff("SKILL.md", Some("a\nlocal\n"), Some("a\nsource\n")).unwrap();
        assert!(diff.contains("--- source/SKILL.md"));
        assert!(diff.contains("+++ local/SKILL.md"));
        assert!(diff.contains("-source"));
        assert!(diff.contains("+local"));
        assert!(diff.contains("@@"));
    }

    #[test]
    fn file_only_on_one_side() {
        let added = unified_file_diff("notes.md", Some("new\n"), None).unwrap();
        assert!(added.contains("--- /dev/null"));
        assert!(added.contains("+new"));

        // An empty file still counts as present.
        assert!(unified_file_diff("empty.md", None, Some("")).is_some());
    }
}
