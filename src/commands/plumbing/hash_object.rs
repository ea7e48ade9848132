use crate::areas::database::Database;
use crate::areas::repository::Repository;
use crate::artifacts::objects::object_id::ObjectId;
use crate::artifacts::objects::object_type::ObjectType;
use anyhow::Context;
use std::io::Write;
use std::path::Path;

/// Compute the id a file would be stored under, without a repository
///
/// # Arguments
///
/// * `object_path` - File whose content is hashed
/// * `kind` - Object kind tag, `blob` for ordinary files
pub fn hash_file(object_path: &Path, kind: &str) -> anyhow::Result<ObjectId> {
    let (kind, object_data) = read_object_file(object_path, kind)?;

    Ok(Database::hash(&kind, &object_data))
}

fn read_object_file(object_path: &Path, kind: &str) -> anyhow::Result<(ObjectType, Vec<u8>)> {
    let object_data = std::fs::read(object_path)
        .with_context(|| format!("Unable to read {}", object_path.display()))?;
    let kind = ObjectType::try_from(kind)?;

    Ok((kind, object_data))
}

impl Repository {
    pub fn hash_object(&self, object_path: &Path, kind: &str, write: bool) -> anyhow::Result<()> {
        let object_id = match write {
            true => {
                let (kind, object_data) = read_object_file(object_path, kind)?;
                self.database().put(&kind, &object_data)?
            }
            false => hash_file(object_path, kind)?,
        };

        writeln!(self.writer(), "{object_id}")?;

        Ok(())
    }
}
