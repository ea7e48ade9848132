//! Content-addressed object database
//!
//! Every object is stored zlib-compressed under `objects/<2 hex>/<38 hex>`, where the
//! name is the SHA-1 of the object's header-prefixed byte stream. Identical content
//! always maps to the same file, so storing twice is a no-op.

use crate::artifacts::objects::object::Object;
use crate::artifacts::objects::OBJECT_ID_LENGTH;
use crate::artifacts::objects::object_id::ObjectId;
use crate::artifacts::objects::object_type::ObjectType;
use crate::errors::{BitError, Result};
use bytes::Bytes;
use fake::rand;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Shortest abbreviated object id accepted by `resolve_prefix`
pub const MIN_PREFIX_LENGTH: usize = 4;

/// Object database rooted at the repository's `objects/` directory
#[derive(Debug)]
pub struct Database {
    path: Box<Path>,
}

impl Database {
    /// Create a handle on an object directory
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the objects directory (typically `.git/objects`); it is
    ///   created lazily on the first write
    pub fn new(path: Box<Path>) -> Self {
        Database { path }
    }

    pub fn objects_path(&self) -> &Path {
        &self.path
    }

    /// Compute the id `content` would be stored under, without writing it
    ///
    /// # Arguments
    ///
    /// * `kind` - Object kind written into the header
    /// * `content` - Object payload, without header
    ///
    /// # Returns
    ///
    /// The SHA-1 of `"<kind> <len>\0"` followed by `content`
    pub fn hash(kind: &ObjectType, content: &[u8]) -> ObjectId {
        ObjectId::digest(&Self::frame(kind, content))
    }

    /// Store `content` as an object of the given kind
    ///
    /// The framed object is compressed into a temp file next to its final location
    /// and renamed into place. An object that already exists is left untouched.
    ///
    /// # Arguments
    ///
    /// * `kind` - Object kind written into the header
    /// * `content` - Object payload, without header
    ///
    /// # Returns
    ///
    /// The id the object is stored under, the same value `hash` returns
    pub fn put(&self, kind: &ObjectType, content: &[u8]) -> Result<ObjectId> {
        let object_content = Self::frame(kind, content);
        let object_id = ObjectId::digest(&object_content);
        let object_path = self.path.join(object_id.to_path());

        // write the object to disk unless it already exists
        if !object_path.exists() {
            self.write_object(&object_path, &object_content)?;
            debug!(oid = %object_id, kind = %kind, size = content.len(), "stored object");
        }

        Ok(object_id)
    }

    /// Serialize and `put` an object value such as a tree or commit
    pub fn store(&self, object: &impl Object) -> Result<ObjectId> {
        let content = object.serialize()?;
        self.put(&object.object_type(), &content)
    }

    /// Load an object and split it into its kind and payload
    ///
    /// # Arguments
    ///
    /// * `object_id` - Full id of the object to read
    ///
    /// # Returns
    ///
    /// The kind from the header and the payload after the first NUL. Fails with
    /// `ObjectNotFound` when no file exists and `CorruptObject` when it cannot be
    /// inflated or its header does not match the payload.
    pub fn get(&self, object_id: &ObjectId) -> Result<(ObjectType, Bytes)> {
        let object_path = self.path.join(object_id.to_path());
        let raw = std::fs::read(&object_path).map_err(|err| match err.kind() {
            std::io::ErrorKind::NotFound => BitError::ObjectNotFound { oid: *object_id },
            _ => BitError::Io(err),
        })?;

        let object_content = Self::decompress(&raw)
            .map_err(|err| BitError::corrupt_object(object_id, format!("zlib: {err}")))?;

        Self::parse_object(object_id, object_content)
    }

    pub fn contains(&self, object_id: &ObjectId) -> bool {
        self.path.join(object_id.to_path()).is_file()
    }

    /// Find all stored objects whose id starts with `prefix`
    ///
    /// Only the fan-out directory named by the first two characters is listed, so
    /// `prefix` must be at least two characters long. Files that are not object
    /// names, such as leftover temp files, are ignored.
    ///
    /// # Returns
    ///
    /// The matching ids, sorted; empty when nothing matches
    pub fn find_objects_by_prefix(&self, prefix: &str) -> Result<Vec<ObjectId>> {
        if prefix.len() < 2 || !prefix.is_ascii() {
            return Err(BitError::InvalidObjectId {
                reason: format!("{prefix:?} does not name a fan-out directory"),
            });
        }
        let (dir_name, file_prefix) = prefix.split_at(2);
        let dir_path = self.path.join(dir_name);

        let dir_entries = match std::fs::read_dir(&dir_path) {
            Ok(dir_entries) => dir_entries,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(err) => return Err(err.into()),
        };

        let mut matches = Vec::new();
        for entry in dir_entries {
            let file_name = entry?.file_name();
            let file_name = file_name.to_string_lossy();

            if file_name.starts_with(file_prefix) {
                if let Ok(oid) = ObjectId::try_parse(format!("{dir_name}{file_name}")) {
                    matches.push(oid);
                }
            }
        }
        matches.sort();

        Ok(matches)
    }

    /// Expand an abbreviated object id into the single stored object it names
    ///
    /// # Arguments
    ///
    /// * `prefix` - 4 to 40 hex characters, case-insensitive
    ///
    /// # Returns
    ///
    /// The unique matching id. Fails with `InvalidObjectId` for a malformed name,
    /// `ObjectPrefixNotFound` (or `ObjectNotFound` for a full id) when nothing is
    /// stored under it, and `AmbiguousObjectId` when several objects match.
    pub fn resolve_prefix(&self, prefix: &str) -> Result<ObjectId> {
        let prefix = prefix.to_ascii_lowercase();
        if !(MIN_PREFIX_LENGTH..=OBJECT_ID_LENGTH).contains(&prefix.len())
            || !prefix.bytes().all(|b| b.is_ascii_hexdigit())
        {
            return Err(BitError::InvalidObjectId {
                reason: format!(
                    "{prefix:?} is not {MIN_PREFIX_LENGTH} to {OBJECT_ID_LENGTH} hex characters"
                ),
            });
        }

        if prefix.len() == OBJECT_ID_LENGTH {
            let object_id = ObjectId::try_parse(&prefix)?;
            return match self.contains(&object_id) {
                true => Ok(object_id),
                false => Err(BitError::ObjectNotFound { oid: object_id }),
            };
        }

        let mut matches = self.find_objects_by_prefix(&prefix)?;
        match matches.len() {
            0 => Err(BitError::ObjectPrefixNotFound { prefix }),
            1 => {
                let object_id = matches.remove(0);
                debug!(prefix = %prefix, oid = %object_id, "resolved abbreviated id");
                Ok(object_id)
            }
            candidates => Err(BitError::AmbiguousObjectId { prefix, candidates }),
        }
    }

    fn frame(kind: &ObjectType, content: &[u8]) -> Vec<u8> {
        let header = kind.header(content.len());

        let mut object_content = Vec::with_capacity(header.len() + content.len());
        object_content.extend_from_slice(header.as_bytes());
        object_content.extend_from_slice(content);
        object_content
    }

    fn parse_object(object_id: &ObjectId, object_content: Vec<u8>) -> Result<(ObjectType, Bytes)> {
        let header_end = object_content
            .iter()
            .position(|&b| b == 0)
            .ok_or_else(|| BitError::corrupt_object(object_id, "missing header terminator"))?;

        let header = std::str::from_utf8(&object_content[..header_end])
            .map_err(|_| BitError::corrupt_object(object_id, "header is not valid UTF-8"))?;
        let (kind, length) = header
            .split_once(' ')
            .ok_or_else(|| BitError::corrupt_object(object_id, "missing space in header"))?;

        let kind = ObjectType::try_from(kind)
            .map_err(|err| BitError::corrupt_object(object_id, err.to_string()))?;
        let length = length
            .parse::<usize>()
            .map_err(|_| BitError::corrupt_object(object_id, format!("bad length {length:?}")))?;

        let content = Bytes::from(object_content).slice(header_end + 1..);
        if content.len() != length {
            return Err(BitError::corrupt_object(
                object_id,
                format!("header declares {length} bytes, found {}", content.len()),
            ));
        }

        Ok((kind, content))
    }

    fn write_object(&self, object_path: &Path, object_content: &[u8]) -> Result<()> {
        let object_dir = object_path
            .parent()
            .ok_or_else(|| BitError::invalid_path(object_path, "object path has no parent"))?;
        std::fs::create_dir_all(object_dir)?;

        let temp_object_path = object_dir.join(Self::generate_temp_name());
        let object_content = Self::compress(object_content)?;

        let mut file = std::fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&temp_object_path)?;
        file.write_all(&object_content)?;
        drop(file);

        // rename the temp file to the object file to make it atomic
        std::fs::rename(&temp_object_path, object_path).inspect_err(|_| {
            let _ = std::fs::remove_file(&temp_object_path);
        })?;

        Ok(())
    }

    fn compress(data: &[u8]) -> std::io::Result<Vec<u8>> {
        let mut encoder =
            flate2::write::ZlibEncoder::new(Vec::new(), flate2::Compression::default());
        encoder.write_all(data)?;
        encoder.finish()
    }

    fn decompress(data: &[u8]) -> std::io::Result<Vec<u8>> {
        let mut decoder = flate2::read::ZlibDecoder::new(data);
        let mut decompressed_content = Vec::new();
        decoder.read_to_end(&mut decompressed_content)?;

        Ok(decompressed_content)
    }

    fn generate_temp_name() -> PathBuf {
        PathBuf::from(format!("tmp-obj-{}", rand::random::<u32>()))
    }
}
