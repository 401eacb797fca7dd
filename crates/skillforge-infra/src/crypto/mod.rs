//! Content hashing for skill folders.

pub mod hash;
