//! Object identifier (SHA-1 hash)
//!
//! Externally an object id is rendered as 40 lowercase hexadecimal characters; inside
//! index records and tree entries it is stored as the 20 raw digest bytes. The two
//! representations convert losslessly into one another.
//!
//! ## Storage
//!
//! Objects are stored in `objects/<first-2-chars>/<remaining-38-chars>`

use crate::artifacts::objects::{OBJECT_ID_LENGTH, OBJECT_ID_RAW_LENGTH};
use crate::errors::BitError;
use sha1::{Digest, Sha1};
use std::io;
use std::path::PathBuf;
use std::str::FromStr;

/// Object identifier (SHA-1 hash)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, PartialOrd, Ord)]
pub struct ObjectId([u8; OBJECT_ID_RAW_LENGTH]);

impl ObjectId {
    /// Parse and validate an object id from its 40-character hex form
    pub fn try_parse(id: impl AsRef<str>) -> Result<Self, BitError> {
        let id = id.as_ref();
        if id.len() != OBJECT_ID_LENGTH {
            return Err(BitError::InvalidObjectId {
                reason: format!("expected {OBJECT_ID_LENGTH} hex characters, got {}", id.len()),
            });
        }

        let mut raw = [0u8; OBJECT_ID_RAW_LENGTH];
        hex::decode_to_slice(id, &mut raw).map_err(|err| BitError::InvalidObjectId {
            reason: format!("{id}: {err}"),
        })?;

        Ok(Self(raw))
    }

    pub fn from_raw(raw: [u8; OBJECT_ID_RAW_LENGTH]) -> Self {
        Self(raw)
    }

    /// Digest of an already header-prefixed object stream
    pub fn digest(data: &[u8]) -> Self {
        let mut hasher = Sha1::new();
        hasher.update(data);

        let mut raw = [0u8; OBJECT_ID_RAW_LENGTH];
        raw.copy_from_slice(&hasher.finalize());
        Self(raw)
    }

    pub fn as_raw(&self) -> &[u8; OBJECT_ID_RAW_LENGTH] {
        &self.0
    }

    /// Write the object id in binary format (20 bytes)
    pub fn write_raw_to<W: io::Write + ?Sized>(&self, writer: &mut W) -> io::Result<()> {
        writer.write_all(&self.0)
    }

    /// Read an object id from binary format (20 bytes)
    pub fn read_raw_from<R: io::Read + ?Sized>(reader: &mut R) -> io::Result<Self> {
        let mut raw = [0u8; OBJECT_ID_RAW_LENGTH];
        reader.read_exact(&mut raw)?;
        Ok(Self(raw))
    }

    /// Convert to the fan-out path used for object storage
    ///
    /// For example, `abc123...` becomes `ab/c123...`
    pub fn to_path(&self) -> PathBuf {
        let hex = self.to_string();
        let (dir, file) = hex.split_at(2);
        PathBuf::from(dir).join(file)
    }
}

impl FromStr for ObjectId {
    type Err = BitError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::try_parse(s)
    }
}

impl std::fmt::Display for ObjectId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&hex::encode(self.0))
    }
}
