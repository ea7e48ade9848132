use crate::artifacts::index::entry_mode::EntryMode;
use crate::artifacts::objects::object::Packable;
use crate::artifacts::objects::object_id::ObjectId;
use crate::errors::Result;
use bytes::Bytes;
use derive_new::new;
use std::io::Write;

/// One `(mode, name, oid)` record of a tree object
#[derive(Debug, Clone, PartialEq, new)]
pub struct DatabaseEntry {
    pub name: String,
    pub oid: ObjectId,
    pub mode: EntryMode,
}

impl Packable for DatabaseEntry {
    /// `<octal mode> <name>\0<20-byte oid>`
    fn serialize(&self) -> Result<Bytes> {
        let mut entry_bytes = Vec::new();
        write!(entry_bytes, "{} {}", self.mode.as_str(), self.name)?;
        entry_bytes.push(0);
        self.oid.write_raw_to(&mut entry_bytes)?;

        Ok(Bytes::from(entry_bytes))
    }
}
