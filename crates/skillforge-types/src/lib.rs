//! Shared domain types for skillforge.
//!
//! Skills, stacks, agents, project configs, plugin manifests and fork
//! provenance records, plus the typed pipeline errors and run outcome.
//!
//! Zero infrastructure dependencies -- only serde, chrono, semver, thiserror.

pub mod agent;
pub mod assignment;
pub mod error;
pub mod outcome;
pub mod plugin;
pub mod project;
pub mod provenance;
pub mod skill;
pub mod stack;
