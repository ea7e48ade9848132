use crate::areas::repository::Repository;
use std::path::PathBuf;

impl Repository {
    pub fn update_index(&self, paths: &[PathBuf]) -> anyhow::Result<()> {
        self.index()
            .update(self.database(), self.workspace(), paths, true)?;

        Ok(())
    }
}
