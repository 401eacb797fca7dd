//! Infrastructure layer for skillforge.
//!
//! Filesystem adapters around the pure logic in `skillforge-core`: source
//! tree loading, the project-local skill store, plugin packaging with
//! content-hash versioning, and fork provenance reports.

pub mod crypto;
pub mod filesystem;
pub mod plugin;
pub mod project;
pub mod provenance;
pub mod skill;
pub mod source;
