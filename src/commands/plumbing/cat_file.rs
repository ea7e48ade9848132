use crate::areas::repository::Repository;
use std::io::Write;

impl Repository {
    /// Print the object's kind, or its raw content when `show_type` is false
    ///
    /// `object_id` may be abbreviated to any unique prefix of at least four characters.
    pub fn cat_file(&self, object_id: &str, show_type: bool) -> anyhow::Result<()> {
        let object_id = self.database().resolve_prefix(object_id)?;
        let (kind, content) = self.database().get(&object_id)?;

        let mut writer = self.writer();
        match show_type {
            true => writeln!(writer, "{kind}")?,
            false => writer.write_all(&content)?,
        }

        Ok(())
    }
}
