//! Error types for the storage core

use crate::artifacts::objects::object_id::ObjectId;
use std::path::PathBuf;
use thiserror::Error;

/// Errors surfaced by the object store, the staging index and the builders
#[derive(Error, Debug)]
pub enum BitError {
    /// No object file exists for the requested id
    #[error("Object not found: {oid}")]
    ObjectNotFound { oid: ObjectId },

    /// No stored object id starts with the abbreviated name
    #[error("Object not found: {prefix}")]
    ObjectPrefixNotFound { prefix: String },

    #[error("Ambiguous object id {prefix}: {candidates} objects match")]
    AmbiguousObjectId { prefix: String, candidates: usize },

    /// The object file could not be decompressed or its header parsed
    #[error("Corrupt object {oid}: {reason}")]
    CorruptObject { oid: ObjectId, reason: String },

    /// Checksum mismatch or malformed record in the index file
    #[error("Index file is corrupt: {reason}")]
    IndexCorrupt { reason: String },

    /// Another process holds the index lock
    #[error("Unable to lock index, {path} already exists")]
    IndexLocked { path: PathBuf },

    #[error("Invalid path {path}: {reason}")]
    InvalidPath { path: PathBuf, reason: String },

    #[error("Not a repository (or any of the parent directories): {path}")]
    NotARepository { path: PathBuf },

    #[error("Invalid object id: {reason}")]
    InvalidObjectId { reason: String },

    #[error("Invalid object type: {kind}")]
    InvalidObjectType { kind: String },

    #[error("Configuration error: {reason}")]
    Config { reason: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl BitError {
    pub fn corrupt_object(oid: &ObjectId, reason: impl Into<String>) -> Self {
        Self::CorruptObject {
            oid: *oid,
            reason: reason.into(),
        }
    }

    pub fn index_corrupt(reason: impl Into<String>) -> Self {
        Self::IndexCorrupt {
            reason: reason.into(),
        }
    }

    pub fn invalid_path(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self::InvalidPath {
            path: path.into(),
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, BitError>;
