//! Project configuration: built-in defaults, generation from a skill
//! selection, and stack/selection merging for the edit flow.

pub mod defaults;
pub mod generator;
pub mod merge;

pub use generator::{generate_project_config_from_skills, GenerateOptions, GeneratedConfig};
pub use merge::{merge_stack_with_skills, validate_project_config, MergedConfig};
