//! Resolution, configuration, rendering and versioning logic for skillforge.
//!
//! Everything here is a pure transform over in-memory data: the matrix is
//! handed in already loaded, and rendered documents are returned as text.
//! Disk access lives in `skillforge-infra`.

pub mod compiler;
pub mod config;
pub mod context;
pub mod matrix;
pub mod provenance;
pub mod skill;
pub mod version;
