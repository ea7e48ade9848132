use crate::artifacts::objects::object_type::ObjectType;
use crate::errors::Result;
use bytes::Bytes;
use std::io::BufRead;

/// Serialize a value into its on-disk byte form
pub trait Packable {
    fn serialize(&self) -> Result<Bytes>;
}

/// Rebuild a value from its on-disk byte form
pub trait Unpackable {
    fn deserialize(reader: impl BufRead) -> Result<Self>
    where
        Self: Sized;
}

/// A value stored in the object database
///
/// `serialize` yields the payload only; the store prefixes the
/// `"<kind> <length>\0"` header itself.
pub trait Object: Packable {
    fn object_type(&self) -> ObjectType;
}
