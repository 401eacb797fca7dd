//! Skill assignments inside stacks and project configs.
//!
//! On disk an assignment is either a bare id string or a small object:
//!
//! ```yaml
//! skills:
//!   - react (@acme)                          # Plain
//!   - { id: my-react, local: true, path: .claude/skills/my-react }   # Local
//!   - { id: zustand (@acme), preloaded: true }                      # Preloaded
//! ```
//!
//! At most one modifier may be set. Serialization always picks the most
//! compact form for each variant.

use std::fmt;

use serde::{Deserialize, Serialize};

/// One skill assigned to a config or agent bucket.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "AssignmentWire", into = "AssignmentWire")]
pub enum SkillAssignment {
    /// A remote skill with no modifiers.
    Plain(String),
    /// A project-local skill stored at `path`.
    Local { id: String, path: String },
    /// A skill loaded into the agent's context up front.
    Preloaded(String),
}

impl SkillAssignment {
    /// Pick the variant for a skill. A local path takes precedence over the
    /// preloaded flag since only one modifier can be active.
    pub fn for_skill(id: &str, local_path: Option<&str>, preloaded: bool) -> Self {
        match (local_path, preloaded) {
            (Some(path), _) => Self::Local {
                id: id.to_string(),
                path: path.to_string(),
            },
            (None, true) => Self::Preloaded(id.to_string()),
            (None, false) => Self::Plain(id.to_string()),
        }
    }

    pub fn id(&self) -> &str {
        match self {
            Self::Plain(id) | Self::Preloaded(id) => id,
            Self::Local { id, .. } => id,
        }
    }

    pub fn is_preloaded(&self) -> bool {
        matches!(self, Self::Preloaded(_))
    }

    pub fn is_local(&self) -> bool {
        matches!(self, Self::Local { .. })
    }
}

impl fmt::Display for SkillAssignment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Plain(id) => write!(f, "{id}"),
            Self::Local { id, path } => write!(f, "{id} (local: {path})"),
            Self::Preloaded(id) => write!(f, "{id} (preloaded)"),
        }
    }
}

// ---------------------------------------------------------------------------
// Wire format
// ---------------------------------------------------------------------------

#[derive(Serialize, Deserialize)]
#[serde(untagged)]
enum AssignmentWire {
    Id(String),
    Entry(AssignmentEntry),
}

#[derive(Serialize, Deserialize)]
struct AssignmentEntry {
    id: String,
    #[serde(default, skip_serializing_if = "is_false")]
    local: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    path: Option<String>,
    #[serde(default, skip_serializing_if = "is_false")]
    preloaded: bool,
}

fn is_false(value: &bool) -> bool {
    !*value
}

impl TryFrom<AssignmentWire> for SkillAssignment {
    type Error = String;

    fn try_from(wire: AssignmentWire) -> Result<Self, Self::Error> {
        let entry = match wire {
            AssignmentWire::Id(id) => return Ok(Self::Plain(id)),
            AssignmentWire::Entry(entry) => entry,
        };

        if entry.id.trim().is_empty() {
            return Err("skill assignment has an empty id".to_string());
        }

        match (entry.local, entry.path, entry.preloaded) {
            (true, _, true) => Err(format!(
                "skill '{}' cannot be both local and preloaded",
                entry.id
            )),
            (true, Some(path), false) => Ok(Self::Local { id: entry.id, path }),
            (true, None, false) => Err(format!(
                "local skill '{}' is missing its path",
                entry.id
            )),
            (false, Some(_), _) => Err(format!(
                "skill '{}' has a path but is not marked local",
                entry.id
            )),
            (false, None, true) => Ok(Self::Preloaded(entry.id)),
            (false, None, false) => Ok(Self::Plain(entry.id)),
        }
    }
}

impl From<SkillAssignment> for AssignmentWire {
    fn from(assignment: SkillAssignment) -> Self {
        match assignment {
            SkillAssignment::Plain(id) => Self::Id(id),
            SkillAssignment::Local { id, path } => Self::Entry(AssignmentEntry {
                id,
                local: true,
                path: Some(path),
                preloaded: false,
            }),
            SkillAssignment::Preloaded(id) => Self::Entry(AssignmentEntry {
                id,
                local: false,
                path: None,
                preloaded: true,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_mixed_entries() {
        let yaml = r#"
- react (@acme)
- id: my-react
  local: true
  path: .claude/skills/my-react
- id: zustand (@acme)
  preloaded: true
- id: vitest (@acme)
"#;
        let parsed: Vec<SkillAssignment> = serde_yaml_ng::from_str(yaml).unwrap();
        assert_eq!(parsed[0], SkillAssignment::Plain("react (@acme)".to_string()));
        assert_eq!(
            parsed[1],
            SkillAssignment::Local {
                id: "my-react".to_string(),
                path: ".claude/skills/my-react".to_string(),
            }
        );
        assert_eq!(
            parsed[2],
            SkillAssignment::Preloaded("zustand (@acme)".to_string())
        );
        // An object without modifiers is still plain.
        assert_eq!(parsed[3], SkillAssignment::Plain("vitest (@acme)".to_string()));
    }

    #[test]
    fn serialize_uses_minimal_forms() {
        let entries = vec![
            SkillAssignment::Plain("react (@acme)".to_string()),
            SkillAssignment::Preloaded("zustand (@acme)".to_string()),
        ];
        let json = serde_json::to_string(&entries).unwrap();
        assert_eq!(
            json,
            r#"["react (@acme)",{"id":"zustand (@acme)","preloaded":true}]"#
        );
    }

    #[test]
    fn reject_two_modifiers() {
        let yaml = "id: x\nlocal: true\npath: p\npreloaded: true\n";
        let err = serde_yaml_ng::from_str::<SkillAssignment>(yaml).unwrap_err();
        assert!(err.to_string().contains("cannot be both local and preloaded"));
    }

    #[test]
    fn reject_local_without_path() {
        let yaml = "id: x\nlocal: true\n";
        assert!(serde_yaml_ng::from_str::<SkillAssignment>(yaml).is_err());
    }

    #[test]
    fn for_skill_prefers_local() {
        let a = SkillAssignment::for_skill("x", Some(".claude/skills/x"), true);
        assert!(a.is_local());
        assert!(!a.is_preloaded());
        assert_eq!(a.id(), "x");
        assert!(SkillAssignment::for_skill("x", None, true).is_preloaded());
    }
}
