//! Plumbing commands (low-level operations)
//!
//! ## Commands
//!
//! - `hash-object`: Compute object ID and optionally store in database
//! - `cat-file`: Print an object's type or raw content
//! - `update-index`: Stage work-tree files
//! - `ls-files`: List staged entries
//! - `write-tree`: Write the staged entries as a tree hierarchy
//! - `commit-tree`: Wrap a tree in a commit object

pub mod cat_file;
pub mod commit_tree;
pub mod hash_object;
pub mod ls_files;
pub mod update_index;
pub mod write_tree;
