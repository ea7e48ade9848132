//! Working tree access for staging
//!
//! Paths handed to the index are resolved against the work tree root, checked not to
//! escape it, and turned into `/`-separated names regardless of platform.

use crate::artifacts::index::index_entry::EntryMetadata;
use crate::errors::{BitError, Result};
use std::path::{Component, Path, PathBuf};
use walkdir::WalkDir;

#[derive(Debug)]
pub struct Workspace {
    path: Box<Path>,
    /// Name of the metadata directory, never staged
    git_dir_name: String,
}

impl Workspace {
    pub fn new(path: Box<Path>, git_dir_name: &str) -> Self {
        Workspace {
            path,
            git_dir_name: git_dir_name.to_string(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Resolve `path` (absolute, or relative to the work tree) without touching the
    /// filesystem, rejecting anything outside the work tree or inside the
    /// metadata directory
    pub fn resolve(&self, path: &Path) -> Result<PathBuf> {
        let mut resolved = PathBuf::new();
        for component in self.path.join(path).components() {
            match component {
                Component::CurDir => {}
                Component::ParentDir => {
                    if !resolved.pop() {
                        return Err(BitError::invalid_path(path, "outside the work tree"));
                    }
                }
                other => resolved.push(other),
            }
        }

        let relative = resolved
            .strip_prefix(&self.path)
            .map_err(|_| BitError::invalid_path(path, "outside the work tree"))?;

        if relative
            .components()
            .next()
            .is_some_and(|first| first.as_os_str() == self.git_dir_name.as_str())
        {
            return Err(BitError::invalid_path(path, "inside the repository metadata"));
        }

        Ok(resolved)
    }

    /// Names of the files at or below `path`, sorted
    ///
    /// A path that does not exist yields no names.
    pub fn list_files(&self, path: &Path) -> Result<Vec<String>> {
        let resolved = self.resolve(path)?;

        let metadata = match std::fs::metadata(&resolved) {
            Ok(metadata) => metadata,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(err) => return Err(BitError::invalid_path(path, err.to_string())),
        };

        if !metadata.is_dir() {
            return Ok(vec![self.to_name(&resolved)?]);
        }

        let mut names = Vec::new();
        let walker = WalkDir::new(&resolved)
            .into_iter()
            .filter_entry(|entry| entry.file_name() != self.git_dir_name.as_str());
        for entry in walker {
            let entry = entry.map_err(std::io::Error::from)?;
            if entry.file_type().is_file() {
                names.push(self.to_name(entry.path())?);
            }
        }
        names.sort();

        Ok(names)
    }

    pub fn read_file(&self, name: &str) -> Result<Vec<u8>> {
        Ok(std::fs::read(self.path.join(name))?)
    }

    pub fn stat_file(&self, name: &str) -> Result<EntryMetadata> {
        let file_path = self.path.join(name);
        let metadata = std::fs::metadata(&file_path).map_err(|err| {
            BitError::invalid_path(&file_path, format!("unable to read metadata: {err}"))
        })?;

        (file_path.as_path(), &metadata).try_into()
    }

    /// `/`-separated name of an absolute path inside the work tree
    fn to_name(&self, path: &Path) -> Result<String> {
        let relative = path
            .strip_prefix(&self.path)
            .map_err(|_| BitError::invalid_path(path, "outside the work tree"))?;

        let parts = relative
            .components()
            .map(|component| {
                component
                    .as_os_str()
                    .to_str()
                    .ok_or_else(|| BitError::invalid_path(path, "name is not valid UTF-8"))
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(parts.join("/"))
    }
}
