//! Index (staging area)
//!
//! The index records which files make up the next commit, together with the stat
//! data captured when they were staged and the id of the blob holding their content.
//!
//! ## Index File Format
//!
//! - Header: signature, version and entry count
//! - Entries: records sorted by name, each padded to an 8-byte boundary
//! - Checksum: SHA-1 of everything before it
//!
//! The whole file is encoded in memory and swapped in through a lock file, so a
//! reader sees either the previous index or the new one, never a torn write.

use crate::areas::database::Database;
use crate::areas::workspace::Workspace;
use crate::artifacts::core::lockfile::Lockfile;
use crate::artifacts::index::checksum::Checksum;
use crate::artifacts::index::index_entry::{ENTRY_BLOCK, ENTRY_MIN_SIZE, IndexEntry};
use crate::artifacts::index::index_header::IndexHeader;
use crate::artifacts::index::{CHECKSUM_SIZE, EXTENSION_HEADER_SIZE, HEADER_SIZE};
use crate::artifacts::objects::object::{Packable, Unpackable};
use crate::artifacts::objects::object_type::ObjectType;
use crate::errors::{BitError, Result};
use byteorder::{NetworkEndian, ReadBytesExt};
use bytes::Bytes;
use file_guard::Lock;
use std::collections::BTreeMap;
use std::io::{Cursor, Read};
use std::path::Path;
use tracing::{debug, info, warn};

/// Staged entries keyed by name; iteration order is the on-disk order
type Entries = BTreeMap<String, IndexEntry>;

#[derive(Debug, Clone)]
pub struct Index {
    /// Path to the index file (typically `.git/index`)
    path: Box<Path>,
}

impl Index {
    pub fn new(path: Box<Path>) -> Self {
        Index { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the staged entries, sorted by name
    ///
    /// # Returns
    ///
    /// The decoded entries; empty when the index file does not exist yet
    ///
    /// # Locking
    ///
    /// Holds a shared lock on the index file while reading, so a writer swapping
    /// in a new index waits for the read to finish.
    pub fn load(&self) -> Result<Vec<IndexEntry>> {
        let mut index_file = match std::fs::OpenOptions::new().read(true).open(self.path()) {
            Ok(index_file) => index_file,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(err) => return Err(err.into()),
        };
        let mut lock = file_guard::lock(&mut index_file, Lock::Shared, 0, 1)?;

        let mut data = Vec::new();
        lock.read_to_end(&mut data)?;
        drop(lock);

        Self::decode(&data)
    }

    /// Replace the index file with `entries`
    ///
    /// Entries are written in name order; when two share a name the later one wins.
    ///
    /// # Locking
    ///
    /// Fails with `IndexLocked` when `index.lock` already exists. The new content is
    /// renamed over the index in one step.
    pub fn save(&self, entries: &[IndexEntry]) -> Result<()> {
        let lock = Lockfile::acquire(self.path())?;
        let entries = entries
            .iter()
            .map(|entry| (entry.name.clone(), entry.clone()))
            .collect::<Entries>();

        self.write_locked(lock, &entries)
    }

    /// Stage the given work-tree paths
    ///
    /// Each existing file is stored as a blob and upserted into the index;
    /// directories are expanded into the files below them and paths that do not
    /// exist are skipped. The index is written back unless `write` is false. The
    /// resulting entries are returned either way.
    ///
    /// # Arguments
    ///
    /// * `database` - Store receiving a blob for every staged file
    /// * `workspace` - Work tree the paths are resolved against
    /// * `paths` - Files or directories, absolute or relative to the work tree
    /// * `write` - Whether to save the updated index
    ///
    /// # Returns
    ///
    /// All staged entries after the update, sorted by name
    ///
    /// # Locking
    ///
    /// With `write` set, the lock is taken before the index is read and held until
    /// the new index is in place.
    pub fn update<P: AsRef<Path>>(
        &self,
        database: &Database,
        workspace: &Workspace,
        paths: &[P],
        write: bool,
    ) -> Result<Vec<IndexEntry>> {
        // load -> mutate -> save runs under the lock
        let lock = match write {
            true => Some(Lockfile::acquire(self.path())?),
            false => None,
        };

        let mut entries = self
            .load()?
            .into_iter()
            .map(|entry| (entry.name.clone(), entry))
            .collect::<Entries>();

        for path in paths {
            let names = workspace.list_files(path.as_ref())?;
            if names.is_empty() {
                warn!(path = %path.as_ref().display(), "skipping path that does not exist");
            }

            for name in names {
                let data = workspace.read_file(&name)?;
                let stat = workspace.stat_file(&name)?;
                let oid = database.put(&ObjectType::Blob, &data)?;

                debug!(name = %name, oid = %oid, "staging file");
                Self::upsert(&mut entries, IndexEntry::from_stat(name, oid, stat));
            }
        }

        if let Some(lock) = lock {
            self.write_locked(lock, &entries)?;
        }

        Ok(entries.into_values().collect())
    }

    /// Encode entries into the full index file content, checksum included
    pub fn encode<'e>(entries: impl ExactSizeIterator<Item = &'e IndexEntry>) -> Result<Bytes> {
        let mut writer = Checksum::new(Vec::new());

        let header = IndexHeader::for_entries(entries.len() as u32);
        writer.write(&header.serialize()?)?;

        for entry in entries {
            writer.write(&entry.serialize()?)?;
        }

        Ok(Bytes::from(writer.write_checksum()?))
    }

    /// Decode and verify a complete index file
    ///
    /// # Returns
    ///
    /// The entries sorted by name. Optional extensions are skipped; a bad header,
    /// record, mandatory extension or checksum is `IndexCorrupt`.
    pub fn decode(data: &[u8]) -> Result<Vec<IndexEntry>> {
        let mut reader = Checksum::new(Cursor::new(data));

        let header = IndexHeader::deserialize(&reader.read(HEADER_SIZE)?[..])?;
        header.validate()?;

        let mut entries = Vec::new();
        for _ in 0..header.entries_count {
            entries.push(Self::parse_entry(&mut reader)?);
        }

        while reader.remaining() > CHECKSUM_SIZE {
            Self::skip_extension(&mut reader)?;
        }

        reader.verify()?;

        // records are expected in order already, this just guarantees it
        entries.sort_by(|a, b| a.name.cmp(&b.name));
        if let Some(pair) = entries.windows(2).find(|pair| pair[0].name == pair[1].name) {
            return Err(BitError::index_corrupt(format!(
                "duplicate entry {}",
                pair[0].name
            )));
        }

        Ok(entries)
    }

    /// Read one record: a minimum-size chunk, then 8-byte blocks until the
    /// block ends in padding
    fn parse_entry(reader: &mut Checksum<Cursor<&[u8]>>) -> Result<IndexEntry> {
        let mut entry_bytes = reader.read(ENTRY_MIN_SIZE)?.to_vec();

        while entry_bytes.last() != Some(&0) {
            entry_bytes.extend_from_slice(&reader.read(ENTRY_BLOCK)?);
        }

        IndexEntry::deserialize(&entry_bytes[..])
    }

    /// Skip one extension block, such as Git's `TREE` cache
    ///
    /// Only optional extensions, whose signature starts with an uppercase letter,
    /// may be ignored. The block still feeds the checksum. Extensions are not
    /// written back: the next save drops them, which Git treats as a cold cache.
    fn skip_extension(reader: &mut Checksum<Cursor<&[u8]>>) -> Result<()> {
        let header = reader.read(EXTENSION_HEADER_SIZE)?;
        let signature = String::from_utf8_lossy(&header[..4]).into_owned();
        let size = (&header[4..]).read_u32::<NetworkEndian>()? as usize;

        if !header[0].is_ascii_uppercase() {
            return Err(BitError::index_corrupt(format!(
                "unsupported mandatory extension {signature:?}"
            )));
        }
        if size > reader.remaining().saturating_sub(CHECKSUM_SIZE) {
            return Err(BitError::index_corrupt(format!(
                "extension {signature:?} runs past the checksum"
            )));
        }

        reader.read(size)?;
        debug!(extension = %signature, size, "skipped index extension");

        Ok(())
    }

    /// Insert `entry`, replacing any entry of the same name
    ///
    /// Entries that would clash in a tree are discarded too: a file staged at
    /// `a/b` evicts a file `a`, and a file staged at `a` evicts everything under `a/`.
    fn upsert(entries: &mut Entries, entry: IndexEntry) {
        for parent in entry.parent_dirs() {
            entries.remove(parent);
        }

        let prefix = format!("{}/", entry.name);
        let children = entries
            .range(prefix.clone()..)
            .take_while(|(name, _)| name.starts_with(&prefix))
            .map(|(name, _)| name.clone())
            .collect::<Vec<_>>();
        for child in children {
            entries.remove(&child);
        }

        entries.insert(entry.name.clone(), entry);
    }

    fn write_locked(&self, lock: Lockfile, entries: &Entries) -> Result<()> {
        let data = Self::encode(entries.values())?;
        lock.commit(&data)?;

        info!(path = %self.path.display(), entries = entries.len(), "wrote index");
        Ok(())
    }
}
