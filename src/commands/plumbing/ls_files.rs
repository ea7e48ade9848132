use crate::areas::repository::Repository;
use std::io::Write;

impl Repository {
    /// List staged names; with `stage`, prefix each with its mode and blob id
    pub fn ls_files(&self, stage: bool) -> anyhow::Result<()> {
        let entries = self.index().load()?;

        let mut writer = self.writer();
        for entry in entries {
            match stage {
                true => writeln!(
                    writer,
                    "{} {} 0\t{}",
                    entry.metadata.mode.as_str(),
                    entry.oid,
                    entry.name
                )?,
                false => writeln!(writer, "{}", entry.name)?,
            }
        }

        Ok(())
    }
}
