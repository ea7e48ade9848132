//! Tree object
//!
//! Trees represent directory snapshots. They list files (blobs) and subdirectories
//! (other trees) along with their names and modes.
//!
//! ## Format
//!
//! On disk: `tree <size>\0<entries>`
//! Each entry: `<mode> <name>\0<20-byte-sha1>`
//!
//! ## Tree Building
//!
//! The index holds a flat list of `/`-separated names sorted bytewise. Everything
//! under a directory `d` shares the prefix `d/` and is therefore contiguous in that
//! list, and `d/` sorts exactly where the tree record for `d` belongs. So a tree is
//! built by walking the slice once, recursing into each run of entries that share a
//! first segment.

use crate::areas::database::Database;
use crate::artifacts::database::database_entry::DatabaseEntry;
use crate::artifacts::index::entry_mode::EntryMode;
use crate::artifacts::index::index_entry::IndexEntry;
use crate::artifacts::objects::object::{Object, Packable};
use crate::artifacts::objects::object_id::ObjectId;
use crate::artifacts::objects::object_type::ObjectType;
use crate::errors::Result;
use bytes::Bytes;
use tracing::debug;

/// Records of a single tree object, in the order they are written
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Tree {
    entries: Vec<DatabaseEntry>,
}

impl Tree {
    /// Write the tree hierarchy for `entries` and return the root tree's id
    ///
    /// `entries` must be sorted by name, as `Index::load` returns them. Each
    /// directory is written once, children before parents.
    ///
    /// # Arguments
    ///
    /// * `database` - Store receiving every tree object
    /// * `entries` - Staged files; their blobs are expected to be stored already
    ///
    /// # Returns
    ///
    /// The id of the root tree, the empty tree when `entries` is empty
    pub fn build(database: &Database, entries: &[IndexEntry]) -> Result<ObjectId> {
        debug_assert!(
            entries.windows(2).all(|pair| pair[0].name < pair[1].name),
            "tree entries must be sorted by name"
        );

        let root = Self::fold(database, entries, 0)?;
        let root_oid = database.store(&root)?;
        debug!(oid = %root_oid, entries = entries.len(), "wrote root tree");

        Ok(root_oid)
    }

    /// Assemble the tree for `entries`, whose names all start with the same
    /// `offset` bytes (the parent directories, slash included)
    fn fold(database: &Database, entries: &[IndexEntry], offset: usize) -> Result<Self> {
        let mut tree = Tree::default();
        let mut rest = entries;

        while let Some(first) = rest.first() {
            let relative = &first.name[offset..];

            match relative.split_once('/') {
                None => {
                    tree.entries.push(DatabaseEntry::new(
                        relative.to_string(),
                        first.oid,
                        first.metadata.mode,
                    ));
                    rest = &rest[1..];
                }
                Some((dir_name, _)) => {
                    let prefix = &first.name[..offset + dir_name.len() + 1];
                    let group_len = rest
                        .iter()
                        .take_while(|entry| entry.name.starts_with(prefix))
                        .count();
                    let (group, tail) = rest.split_at(group_len);

                    let subtree = Self::fold(database, group, prefix.len())?;
                    let subtree_oid = database.store(&subtree)?;
                    debug!(dir = %prefix, oid = %subtree_oid, "wrote tree");

                    tree.entries.push(DatabaseEntry::new(
                        dir_name.to_string(),
                        subtree_oid,
                        EntryMode::Directory,
                    ));
                    rest = tail;
                }
            }
        }

        Ok(tree)
    }
}

impl Packable for Tree {
    fn serialize(&self) -> Result<Bytes> {
        let mut content = Vec::new();
        for entry in &self.entries {
            content.extend_from_slice(&entry.serialize()?);
        }

        Ok(Bytes::from(content))
    }
}

impl Object for Tree {
    fn object_type(&self) -> ObjectType {
        ObjectType::Tree
    }
}
