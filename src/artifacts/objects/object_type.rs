use crate::errors::BitError;

/// Kind tag written in an object's `"<kind> <length>\0"` header
///
/// The store itself accepts any ASCII tag; the three kinds the builders produce get
/// their own variants.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ObjectType {
    Blob,
    Tree,
    Commit,
    Other(String),
}

impl ObjectType {
    pub fn as_str(&self) -> &str {
        match self {
            ObjectType::Blob => "blob",
            ObjectType::Tree => "tree",
            ObjectType::Commit => "commit",
            ObjectType::Other(kind) => kind,
        }
    }

    /// Build the `"<kind> <length>\0"` header for a payload of `length` bytes
    pub fn header(&self, length: usize) -> String {
        format!("{} {}\0", self.as_str(), length)
    }
}

impl TryFrom<&str> for ObjectType {
    type Error = BitError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "blob" => Ok(ObjectType::Blob),
            "tree" => Ok(ObjectType::Tree),
            "commit" => Ok(ObjectType::Commit),
            // a space or NUL would make the header ambiguous
            other if !other.is_empty() && other.bytes().all(|b| b.is_ascii_graphic()) => {
                Ok(ObjectType::Other(other.to_string()))
            }
            other => Err(BitError::InvalidObjectType {
                kind: other.escape_default().to_string(),
            }),
        }
    }
}

impl std::fmt::Display for ObjectType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
