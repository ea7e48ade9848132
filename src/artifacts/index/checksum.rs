//! SHA-1 running over every byte read from or written to the index

use crate::artifacts::index::CHECKSUM_SIZE;
use crate::errors::{BitError, Result};
use bytes::Bytes;
use sha1::{Digest, Sha1};
use std::io::{Cursor, Read, Write};

#[derive(Debug)]
pub struct Checksum<T> {
    inner: T,
    digest: Sha1,
}

impl<T> Checksum<T> {
    pub(crate) fn new(inner: T) -> Self {
        Checksum {
            inner,
            digest: Sha1::new(),
        }
    }
}

impl<R: Read> Checksum<R> {
    pub(crate) fn read(&mut self, size: usize) -> Result<Bytes> {
        let mut buffer = vec![0; size];
        self.inner
            .read_exact(&mut buffer)
            .map_err(|_| BitError::index_corrupt("unexpected end-of-file while reading index"))?;

        self.digest.update(&buffer);
        Ok(Bytes::from(buffer))
    }

    /// Compare the trailing checksum against everything read so far
    ///
    /// The checksum must be the last thing in the stream.
    pub(crate) fn verify(mut self) -> Result<()> {
        let mut expected_checksum = [0u8; CHECKSUM_SIZE];
        self.inner
            .read_exact(&mut expected_checksum)
            .map_err(|_| BitError::index_corrupt("missing trailing checksum"))?;

        let actual_checksum = self.digest.finalize();
        if expected_checksum != actual_checksum.as_slice() {
            return Err(BitError::index_corrupt(
                "checksum does not match value stored on disk",
            ));
        }

        let mut trailing = Vec::new();
        self.inner.read_to_end(&mut trailing)?;
        if !trailing.is_empty() {
            return Err(BitError::index_corrupt(format!(
                "{} unexpected bytes after checksum",
                trailing.len()
            )));
        }

        Ok(())
    }
}

impl<'a> Checksum<Cursor<&'a [u8]>> {
    /// Bytes not consumed yet, trailing checksum included
    pub(crate) fn remaining(&self) -> usize {
        let consumed = self.inner.position() as usize;
        self.inner.get_ref().len().saturating_sub(consumed)
    }
}

impl<W: Write> Checksum<W> {
    pub(crate) fn write(&mut self, data: &[u8]) -> Result<()> {
        self.inner.write_all(data)?;
        self.digest.update(data);
        Ok(())
    }

    /// Append the digest of everything written and hand back the sink
    pub(crate) fn write_checksum(mut self) -> Result<W> {
        let checksum = self.digest.finalize();
        self.inner.write_all(checksum.as_slice())?;

        Ok(self.inner)
    }
}
