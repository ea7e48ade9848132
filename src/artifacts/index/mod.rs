//! Index file format
//!
//! The index (also called staging area or cache) stores the set of paths that make
//! up the next snapshot.
//!
//! ## File Format (Version 2)
//!
//! ```text
//! Header (12 bytes):
//!   - Signature: "DIRC" (4 bytes)
//!   - Version: 2 (4 bytes)
//!   - Entry count (4 bytes)
//!
//! Entries (variable length, sorted by name):
//!   - 62 bytes of metadata followed by the path
//!   - NUL-padded to 8-byte alignment
//!
//! Extensions (optional, between the entries and the checksum):
//!   - Signature (4 bytes), size (4 bytes), payload
//!   - Uppercase signatures (`TREE`, `REUC`, ...) are optional and skipped
//!
//! Checksum (20 bytes):
//!   - SHA-1 hash of all preceding bytes
//! ```

pub mod checksum;
pub mod entry_mode;
pub mod index_entry;
pub mod index_header;

/// Size of SHA-1 checksum in bytes
pub const CHECKSUM_SIZE: usize = 20;

/// Size of index header in bytes
pub const HEADER_SIZE: usize = 12; // 4 bytes for marker, 4 for version, 4 for entries_count

/// Signature plus size prefix of an extension block
pub const EXTENSION_HEADER_SIZE: usize = 8;

/// Magic signature identifying index files
pub const SIGNATURE: &[u8; 4] = b"DIRC";

/// Index file format version
pub const VERSION: u32 = 2;
