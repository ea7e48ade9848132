//! Index entry representation
//!
//! Each entry in the index represents a staged file with:
//! - File path, always `/`-separated
//! - Content hash (object ID of the blob)
//! - File metadata (mode, size, timestamps)
//!
//! ## Entry Format
//!
//! ```text
//! ctime s | ctime ns | mtime s | mtime ns | dev | ino | mode | uid | gid | size
//!   (ten 32-bit big-endian integers, 40 bytes)
//! oid (20 raw bytes) | flags (16-bit big-endian)
//! name (UTF-8) | 1..=8 NUL bytes so the record length is a multiple of 8
//! ```

use crate::artifacts::index::entry_mode::{EntryMode, FileMode};
use crate::artifacts::objects::object::{Packable, Unpackable};
use crate::artifacts::objects::object_id::ObjectId;
use crate::errors::{BitError, Result};
use byteorder::{NetworkEndian, ReadBytesExt, WriteBytesExt};
use bytes::Bytes;
use is_executable::IsExecutable;
use std::cmp::min;
use std::fs::Metadata;
use std::io::{BufRead, Read, Write};
use std::os::unix::prelude::MetadataExt;
use std::path::Path;

/// Largest name length representable in the flags field
const MAX_PATH_SIZE: usize = 0xFFF;

/// Block size for entry alignment (8 bytes)
pub const ENTRY_BLOCK: usize = 8;

/// Size of the fixed metadata block preceding the name
pub const ENTRY_METADATA_SIZE: usize = 62;

/// Minimum size of an index entry in bytes
pub const ENTRY_MIN_SIZE: usize = 64;

/// Staged file: path, blob id and the stat data captured when it was staged
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexEntry {
    /// Path relative to the work tree, `/`-separated
    pub name: String,
    /// Id of the blob holding the file content
    pub oid: ObjectId,
    pub metadata: EntryMetadata,
}

impl IndexEntry {
    /// Build an entry for `name`, deriving the flags from the name length
    pub fn from_stat(name: String, oid: ObjectId, metadata: EntryMetadata) -> Self {
        let flags = min(name.len(), MAX_PATH_SIZE) as u16;
        IndexEntry {
            name,
            oid,
            metadata: EntryMetadata { flags, ..metadata },
        }
    }

    /// Every proper ancestor directory of the entry, outermost first
    ///
    /// `a/b/c` yields `["a", "a/b"]`.
    pub fn parent_dirs(&self) -> Vec<&str> {
        self.name
            .match_indices('/')
            .map(|(idx, _)| &self.name[..idx])
            .collect()
    }
}

/// File metadata stored in index entries
///
/// Every field is kept at the width it has on disk; wider values reported by the
/// filesystem are truncated to 32 bits when the entry is built.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EntryMetadata {
    pub ctime: u32,
    pub ctime_nsec: u32,
    pub mtime: u32,
    pub mtime_nsec: u32,
    pub dev: u32,
    pub ino: u32,
    pub mode: EntryMode,
    pub uid: u32,
    pub gid: u32,
    pub size: u32,
    /// Low 12 bits hold the name length
    pub flags: u16,
}

impl Packable for IndexEntry {
    fn serialize(&self) -> Result<Bytes> {
        let mut entry_bytes = Vec::with_capacity(ENTRY_METADATA_SIZE + self.name.len() + ENTRY_BLOCK);
        entry_bytes.write_u32::<NetworkEndian>(self.metadata.ctime)?;
        entry_bytes.write_u32::<NetworkEndian>(self.metadata.ctime_nsec)?;
        entry_bytes.write_u32::<NetworkEndian>(self.metadata.mtime)?;
        entry_bytes.write_u32::<NetworkEndian>(self.metadata.mtime_nsec)?;
        entry_bytes.write_u32::<NetworkEndian>(self.metadata.dev)?;
        entry_bytes.write_u32::<NetworkEndian>(self.metadata.ino)?;
        entry_bytes.write_u32::<NetworkEndian>(self.metadata.mode.as_u32())?;
        entry_bytes.write_u32::<NetworkEndian>(self.metadata.uid)?;
        entry_bytes.write_u32::<NetworkEndian>(self.metadata.gid)?;
        entry_bytes.write_u32::<NetworkEndian>(self.metadata.size)?;
        self.oid.write_raw_to(&mut entry_bytes)?;
        entry_bytes.write_u16::<NetworkEndian>(self.metadata.flags)?;
        entry_bytes.write_all(self.name.as_bytes())?;

        // There must be at least one null byte at the end
        entry_bytes.push(0);
        while entry_bytes.len() % ENTRY_BLOCK != 0 {
            entry_bytes.push(0);
        }

        Ok(Bytes::from(entry_bytes))
    }
}

impl Unpackable for IndexEntry {
    /// Parse one complete, padded record
    fn deserialize(mut reader: impl BufRead) -> Result<Self> {
        let mut bytes = Vec::new();
        reader.read_to_end(&mut bytes)?;

        if bytes.len() < ENTRY_MIN_SIZE || bytes.len() % ENTRY_BLOCK != 0 {
            return Err(BitError::index_corrupt(format!(
                "invalid entry size {}",
                bytes.len()
            )));
        }

        let (fixed, tail) = bytes.split_at(ENTRY_METADATA_SIZE);
        let mut fixed = fixed;
        let mut field = || fixed.read_u32::<NetworkEndian>();
        let ctime = field()?;
        let ctime_nsec = field()?;
        let mtime = field()?;
        let mtime_nsec = field()?;
        let dev = field()?;
        let ino = field()?;
        let mode = field()?;
        let uid = field()?;
        let gid = field()?;
        let size = field()?;
        let oid = ObjectId::read_raw_from(&mut fixed)?;
        let flags = fixed.read_u16::<NetworkEndian>()?;

        // Only the padding is stripped: the name ends at its first NUL and
        // everything after it must be NUL as well
        let name_end = tail
            .iter()
            .position(|&b| b == 0)
            .ok_or_else(|| BitError::index_corrupt("missing null terminator in entry name"))?;
        if tail[name_end..].iter().any(|&b| b != 0) {
            return Err(BitError::index_corrupt("non-null bytes in entry padding"));
        }
        if name_end == 0 {
            return Err(BitError::index_corrupt("empty entry name"));
        }

        let name = std::str::from_utf8(&tail[..name_end])
            .map_err(|_| BitError::index_corrupt("invalid UTF-8 in entry name"))?
            .to_string();

        Ok(IndexEntry {
            name,
            oid,
            metadata: EntryMetadata {
                ctime,
                ctime_nsec,
                mtime,
                mtime_nsec,
                dev,
                ino,
                mode: EntryMode::try_from(mode)?,
                uid,
                gid,
                size,
                flags,
            },
        })
    }
}

impl TryFrom<(&Path, &Metadata)> for EntryMetadata {
    type Error = BitError;

    fn try_from((file_path, metadata): (&Path, &Metadata)) -> Result<Self> {
        if !metadata.is_file() {
            return Err(BitError::invalid_path(file_path, "not a regular file"));
        }

        let mode = match file_path.is_executable() {
            true => EntryMode::File(FileMode::Executable),
            false => EntryMode::File(FileMode::Regular),
        };

        Ok(Self {
            ctime: metadata.ctime() as u32,
            ctime_nsec: metadata.ctime_nsec() as u32,
            mtime: metadata.mtime() as u32,
            mtime_nsec: metadata.mtime_nsec() as u32,
            dev: metadata.dev() as u32,
            ino: metadata.ino() as u32,
            mode,
            uid: metadata.uid(),
            gid: metadata.gid(),
            size: metadata.size() as u32,
            flags: 0,
        })
    }
}
