//! Storage core of a small Git-compatible version control system
//!
//! Objects live zlib-compressed under `objects/` and are addressed by the SHA-1 of
//! their content, the staging area is the binary `index` file, and trees and
//! commits are built from the staged entries.

pub mod areas;
pub mod artifacts;
pub mod commands;
pub mod errors;

pub use errors::{BitError, Result};
