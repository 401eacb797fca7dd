//! Skill document parsing and relationship checks.
//!
//! `SKILL.md` frontmatter parsing and validation live in [`manifest`];
//! `requires` / `conflicts-with` graph checks over a selection live in
//! [`relationships`]. The domain types are in `skillforge-types::skill`.

pub mod manifest;
pub mod relationships;
