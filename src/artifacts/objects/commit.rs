//! Commit object
//!
//! Commits represent snapshots of the repository at specific points in time.
//! They contain:
//! - A tree object ID (directory snapshot)
//! - An optional parent commit ID (for history)
//! - Author and committer information
//! - Commit message
//!
//! ## Format
//!
//! On disk:
//! ```text
//! commit <size>\0
//! tree <tree-sha>
//! parent <parent-sha>
//! author <name> <email> <timestamp> <timezone>
//! committer <name> <email> <timestamp> <timezone>
//!
//! <commit message>
//! ```

use crate::areas::database::Database;
use crate::artifacts::objects::object::{Object, Packable};
use crate::artifacts::objects::object_id::ObjectId;
use crate::artifacts::objects::object_type::ObjectType;
use crate::errors::{BitError, Result};
use bytes::Bytes;
use chrono::{DateTime, FixedOffset};
use tracing::info;

/// Author or committer information
///
/// Contains name, email, and timestamp with timezone information.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Author {
    name: String,
    email: String,
    timestamp: DateTime<FixedOffset>,
}

impl Author {
    /// Create a new author stamped with the current local time
    pub fn new(name: String, email: String) -> Self {
        Author {
            name,
            email,
            timestamp: chrono::Local::now().fixed_offset(),
        }
    }

    pub fn new_with_timestamp(name: String, email: String, timestamp: DateTime<FixedOffset>) -> Self {
        Author {
            name,
            email,
            timestamp,
        }
    }

    /// Format complete author info including timestamp
    ///
    /// `Name <email> 1700000000 +0200`; the offset always carries its sign and
    /// four digits.
    pub fn display(&self) -> String {
        format!(
            "{} <{}> {} {}",
            self.name,
            self.email,
            self.timestamp.timestamp(),
            self.timestamp.format("%z")
        )
    }

    /// Load author information from environment variables
    ///
    /// Reads GIT_AUTHOR_NAME, GIT_AUTHOR_EMAIL, and optionally GIT_AUTHOR_DATE.
    /// If no date is provided, uses current time.
    ///
    /// # Returns
    ///
    /// `Config` when a name or email is missing or the date is neither
    /// `<unix seconds> <+hhmm>` nor `YYYY-MM-DD HH:MM:SS <+hhmm>`
    pub fn load_from_env() -> Result<Self> {
        let var = |name: &str| {
            std::env::var(name).map_err(|_| BitError::Config {
                reason: format!("{name} not set"),
            })
        };

        let name = var("GIT_AUTHOR_NAME")?;
        let email = var("GIT_AUTHOR_EMAIL")?;

        match std::env::var("GIT_AUTHOR_DATE").ok() {
            Some(date) => {
                let timestamp = Self::parse_date(&date).ok_or_else(|| BitError::Config {
                    reason: format!("unrecognised GIT_AUTHOR_DATE {date:?}"),
                })?;
                Ok(Author::new_with_timestamp(name, email, timestamp))
            }
            None => Ok(Author::new(name, email)),
        }
    }

    /// Accepts RFC 2822, `%Y-%m-%d %H:%M:%S %z`, or the raw `<seconds> <offset>` form
    fn parse_date(date: &str) -> Option<DateTime<FixedOffset>> {
        DateTime::parse_from_rfc2822(date)
            .or_else(|_| DateTime::parse_from_str(date, "%Y-%m-%d %H:%M:%S %z"))
            .or_else(|_| DateTime::parse_from_str(date, "%s %z"))
            .ok()
    }
}

#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Commit {
    /// None for a root commit
    parent: Option<ObjectId>,
    tree_oid: ObjectId,
    author: Author,
    committer: Author,
    message: String,
}

impl Commit {
    /// Create a new commit; the author doubles as committer
    pub fn new(parent: Option<ObjectId>, tree_oid: ObjectId, author: Author, message: String) -> Self {
        Commit {
            parent,
            tree_oid,
            author: author.clone(),
            committer: author,
            message,
        }
    }

    /// Write a commit of `tree_oid` and return its id
    ///
    /// # Arguments
    ///
    /// * `tree_oid` - Root tree of the snapshot
    /// * `message` - Stored as given, followed by one newline
    /// * `parent` - Previous commit, `None` for a root commit
    /// * `author` - Also recorded as committer
    pub fn build(
        database: &Database,
        tree_oid: ObjectId,
        message: &str,
        parent: Option<ObjectId>,
        author: Author,
    ) -> Result<ObjectId> {
        let commit = Commit::new(parent, tree_oid, author, message.to_string());
        let commit_id = database.store(&commit)?;

        info!(oid = %commit_id, tree = %tree_oid, root = parent.is_none(), "wrote commit");
        Ok(commit_id)
    }
}

impl Packable for Commit {
    fn serialize(&self) -> Result<Bytes> {
        let mut content = format!("tree {}\n", self.tree_oid);
        if let Some(parent) = &self.parent {
            content.push_str(&format!("parent {parent}\n"));
        }
        content.push_str(&format!("author {}\n", self.author.display()));
        content.push_str(&format!("committer {}\n", self.committer.display()));
        content.push('\n');
        content.push_str(&self.message);
        content.push('\n');

        Ok(Bytes::from(content))
    }
}

impl Object for Commit {
    fn object_type(&self) -> ObjectType {
        ObjectType::Commit
    }
}
