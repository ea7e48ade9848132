use crate::areas::repository::Repository;
use crate::artifacts::objects::commit::{Author, Commit};
use crate::artifacts::objects::object_id::ObjectId;
use std::io::Write;

impl Repository {
    pub fn commit_tree(
        &self,
        tree: &str,
        message: &str,
        parent: Option<&str>,
    ) -> anyhow::Result<ObjectId> {
        let tree_id = self.database().resolve_prefix(tree)?;
        let parent = parent
            .map(|parent| self.database().resolve_prefix(parent))
            .transpose()?;

        let author = Author::load_from_env()?;
        let message = message.trim();

        let commit_id = Commit::build(self.database(), tree_id, message, parent, author)?;
        writeln!(self.writer(), "{commit_id}")?;

        Ok(commit_id)
    }
}
