//! SKILL.md and metadata.yaml parsing and validation.
//!
//! A skill document is YAML frontmatter delimited by `---` followed by a
//! markdown body. The sibling `metadata.yaml` carries author, category and
//! relationship data.

use anyhow::{bail, Context};
use skillforge_types::skill::{SkillFrontmatter, SkillMetadata};

/// Extract YAML frontmatter and markdown body from a SKILL.md file.
///
/// Content must start with `---`, and a closing `\n---` separates the YAML
/// from the body. Returns `(yaml_str, body_str)` with leading blank lines of
/// the body trimmed.
pub fn extract_frontmatter(content: &str) -> anyhow::Result<(&str, &str)> {
    let content = content.strip_prefix('\u{feff}').unwrap_or(content);
    if !content.starts_with("---") {
        bail!("SKILL.md must start with YAML frontmatter delimiter '---'");
    }

    let after_open = &content[3..];
    let after_open = after_open
        .strip_prefix("\r\n")
        .or_else(|| after_open.strip_prefix('\n'))
        .unwrap_or(after_open);

    let closing_pos = after_open
        .find("\n---")
        .context("SKILL.md missing closing frontmatter delimiter '---'")?;

    let yaml_str = &after_open[..closing_pos];
    let remainder = &after_open[closing_pos + 4..];

    let body_str = remainder
        .strip_prefix("\r\n")
        .or_else(|| remainder.strip_prefix('\n'))
        .unwrap_or(remainder)
        .trim_start_matches(['\n', '\r']);

    Ok((yaml_str, body_str))
}

/// Parse a SKILL.md file into its frontmatter and markdown body.
pub fn parse_skill_md(content: &str) -> anyhow::Result<(SkillFrontmatter, String)> {
    let (yaml_str, body_str) = extract_frontmatter(content)?;

    let frontmatter: SkillFrontmatter =
        serde_yaml_ng::from_str(yaml_str).context("Failed to parse SKILL.md YAML frontmatter")?;

    Ok((frontmatter, body_str.to_owned()))
}

/// Validate the fields packaging and discovery rely on.
///
/// - `name` and `description` are non-empty after trimming
/// - `name` contains no line breaks or path separators
pub fn validate_frontmatter(frontmatter: &SkillFrontmatter) -> anyhow::Result<()> {
    let name = frontmatter.name.trim();
    if name.is_empty() {
        bail!("Skill name must not be empty");
    }
    if name.contains(['\n', '\r', '/', '\\']) {
        bail!("Skill name '{name}' must not contain line breaks or path separators");
    }
    if frontmatter.description.trim().is_empty() {
        bail!("Skill description must not be empty");
    }
    Ok(())
}

/// Parse a skill's `metadata.yaml`.
pub fn parse_skill_metadata(content: &str) -> anyhow::Result<SkillMetadata> {
    let metadata: SkillMetadata =
        serde_yaml_ng::from_str(content).context("Failed to parse metadata.yaml")?;

    if let Some(both) = metadata
        .conflicts_with
        .iter()
        .find(|c| metadata.requires.contains(c))
    {
        bail!("Skill both requires and conflicts with '{both}'");
    }

    Ok(metadata)
}

/// Validate a source skill's metadata: a category is mandatory.
pub fn validate_source_metadata(metadata: &SkillMetadata) -> anyhow::Result<&str> {
    match metadata.category.as_deref().map(str::trim) {
        Some(category) if !category.is_empty() => Ok(category),
        _ => bail!("metadata.yaml must declare a category"),
    }
}

/// Render a frontmatter + body document back to text.
pub fn render_skill_md(frontmatter: &SkillFrontmatter, body: &str) -> anyhow::Result<String> {
    let yaml = serde_yaml_ng::to_string(frontmatter).context("Failed to serialize frontmatter")?;
    Ok(format!("---\n{}---\n\n{}", yaml, body.trim_start()))
}

#[cfg(test)]
mod tests {
    use super::*;

    const FULL_SKILL_MD: &str = r#"---
name: react (@acme)
description: React component conventions
model: sonnet
allowed-tools: Read, Edit
---

# React

Prefer function components.
"#;

    #[test]
    fn parse_full_skill_md() {
        let (fm, body) = parse_skill_md(FULL_SKILL_MD).unwrap();
        assert_eq!(fm.name, "react (@acme)");
        assert_eq!(fm.description, "React component conventions");
        assert_eq!(fm.model.as_deref(), Some("sonnet"));
        assert_eq!(fm.allowed_tools.as_deref(), Some("Read, Edit"));
        assert!(body.starts_with("# React"));
        validate_frontmatter(&fm).unwrap();
    }

    #[test]
    fn parse_crlf_document() {
        let content = "---\r\nname: x\r\ndescription: y\r\n---\r\nbody\r\n";
        let (fm, body) = parse_skill_md(content).unwrap();
        assert_eq!(fm.name.trim(), "x");
        assert!(body.starts_with("body"));
    }

    #[test]
    fn reject_missing_frontmatter() {
        let err = parse_skill_md("# No frontmatter").unwrap_err();
        assert!(err.to_string().contains("must start with YAML frontmatter"));
    }

    #[test]
    fn reject_missing_closing_delimiter() {
        let err = parse_skill_md("---\nname: broken\ndescription: x\n").unwrap_err();
        assert!(err.to_string().contains("missing closing frontmatter"));
    }

    #[test]
    fn reject_missing_description_field() {
        assert!(parse_skill_md("---\nname: only-name\n---\nbody").is_err());
    }

    #[test]
    fn validate_empty_fields() {
        let fm = SkillFrontmatter {
            name: "  ".to_string(),
            description: "d".to_string(),
            model: None,
            allowed_tools: None,
        };
        assert!(
            validate_frontmatter(&fm)
                .unwrap_err()
                .to_string()
                .contains("name must not be empty")
        );

        let fm = SkillFrontmatter {
            name: "ok".to_string(),
            description: String::new(),
            model: None,
            allowed_tools: None,
        };
        assert!(
            validate_frontmatter(&fm)
                .unwrap_err()
                .to_string()
                .contains("description must not be empty")
        );
    }

    #[test]
    fn metadata_requires_category_for_source_skills() {
        let meta = parse_skill_metadata("author: '@acme'\n").unwrap();
        assert!(validate_source_metadata(&meta).is_err());

        let meta = parse_skill_metadata("category: web/framework\n").unwrap();
        assert_eq!(validate_source_metadata(&meta).unwrap(), "web/framework");
    }

    #[test]
    fn render_then_parse_preserves_fields() {
        let (fm, body) = parse_skill_md(FULL_SKILL_MD).unwrap();
        let rendered = render_skill_md(&fm, &body).unwrap();
        let (again, again_body) = parse_skill_md(&rendered).unwrap();
        assert_eq!(again.name, fm.name);
        assert_eq!(again_body, body);
    }
}
