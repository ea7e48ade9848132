use crate::artifacts::index::{HEADER_SIZE, SIGNATURE, VERSION};
use crate::artifacts::objects::object::{Packable, Unpackable};
use crate::errors::{BitError, Result};
use byteorder::{NetworkEndian, ReadBytesExt, WriteBytesExt};
use bytes::Bytes;
use derive_new::new;
use std::io::{BufRead, Read};

#[derive(Debug, Clone, PartialEq, new)]
pub struct IndexHeader {
    pub(crate) marker: [u8; 4],
    pub(crate) version: u32,
    pub(crate) entries_count: u32,
}

impl IndexHeader {
    pub(crate) fn for_entries(entries_count: u32) -> Self {
        IndexHeader::new(*SIGNATURE, VERSION, entries_count)
    }

    pub(crate) fn validate(&self) -> Result<()> {
        if &self.marker != SIGNATURE {
            return Err(BitError::index_corrupt(format!(
                "invalid signature {:?}",
                String::from_utf8_lossy(&self.marker)
            )));
        }

        if self.version != VERSION {
            return Err(BitError::index_corrupt(format!(
                "unsupported version {}",
                self.version
            )));
        }

        Ok(())
    }
}

impl Packable for IndexHeader {
    fn serialize(&self) -> Result<Bytes> {
        let mut bytes = Vec::with_capacity(HEADER_SIZE);
        bytes.extend_from_slice(&self.marker);
        bytes.write_u32::<NetworkEndian>(self.version)?;
        bytes.write_u32::<NetworkEndian>(self.entries_count)?;

        Ok(Bytes::from(bytes))
    }
}

impl Unpackable for IndexHeader {
    fn deserialize(mut reader: impl BufRead) -> Result<Self> {
        let truncated = |_| BitError::index_corrupt("truncated header");

        let mut marker = [0u8; 4];
        reader.read_exact(&mut marker).map_err(truncated)?;
        let version = reader.read_u32::<NetworkEndian>().map_err(truncated)?;
        let entries_count = reader.read_u32::<NetworkEndian>().map_err(truncated)?;

        Ok(IndexHeader {
            marker,
            version,
            entries_count,
        })
    }
}
