use crate::areas::repository::Repository;
use crate::artifacts::objects::object_id::ObjectId;
use crate::artifacts::objects::tree::Tree;
use std::io::Write;

impl Repository {
    pub fn write_tree(&self) -> anyhow::Result<ObjectId> {
        let entries = self.index().load()?;
        let tree_id = Tree::build(self.database(), &entries)?;

        writeln!(self.writer(), "{tree_id}")?;

        Ok(tree_id)
    }
}
