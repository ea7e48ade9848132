//! Data structures and algorithms
//!
//! - `core`: Shared utilities (lock files)
//! - `database`: Tree records
//! - `index`: Index/staging area data structures
//! - `objects`: Object types (tree, commit) and identifiers

pub mod core;
pub mod database;
pub mod index;
pub mod objects;
