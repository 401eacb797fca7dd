//! Project-local skills and forks.

pub mod store;
