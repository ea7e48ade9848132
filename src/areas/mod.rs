//! Core repository components
//!
//! - `database`: Object database for storing blobs, trees, and commits
//! - `index`: Staging area (index/cache) for tracking file changes
//! - `repository`: Repository location and coordination
//! - `workspace`: Working directory file system operations

pub mod database;
pub mod index;
pub mod repository;
pub mod workspace;
