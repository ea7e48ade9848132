use crate::areas::database::Database;
use crate::areas::index::Index;
use crate::areas::workspace::Workspace;
use crate::errors::{BitError, Result};
use std::cell::{RefCell, RefMut};
use std::path::Path;
use tracing::debug;

/// Metadata directory name used when `GIT_DIR` is not set
pub const DEFAULT_GIT_DIR: &str = ".git";

/// Entry point tying the object database, the index and the work tree together
pub struct Repository {
    path: Box<Path>,
    git_dir: Box<Path>,
    writer: RefCell<Box<dyn std::io::Write>>,
    index: Index,
    database: Database,
    workspace: Workspace,
}

impl Repository {
    /// Open the repository rooted at `path`
    ///
    /// The metadata directory must already contain `objects/`.
    pub fn open(path: &Path, writer: Box<dyn std::io::Write>) -> Result<Self> {
        let git_dir_name = Self::git_dir_name();
        let path = path
            .canonicalize()
            .map_err(|_| BitError::NotARepository { path: path.to_path_buf() })?;
        let git_dir = path.join(&git_dir_name);

        if !git_dir.join("objects").is_dir() {
            return Err(BitError::NotARepository { path });
        }

        let index = Index::new(git_dir.join("index").into_boxed_path());
        let database = Database::new(git_dir.join("objects").into_boxed_path());
        let workspace = Workspace::new(path.clone().into_boxed_path(), &git_dir_name);

        Ok(Repository {
            path: path.into_boxed_path(),
            git_dir: git_dir.into_boxed_path(),
            writer: RefCell::new(writer),
            index,
            database,
            workspace,
        })
    }

    /// Open the closest repository at or above `start`
    ///
    /// # Arguments
    ///
    /// * `start` - Directory to search from, usually the canonical working directory
    /// * `writer` - Destination for command output
    ///
    /// # Returns
    ///
    /// The first ancestor holding a metadata directory with `objects/`, or
    /// `NotARepository` naming `start`
    pub fn discover(start: &Path, writer: Box<dyn std::io::Write>) -> Result<Self> {
        let start = start
            .canonicalize()
            .map_err(|_| BitError::NotARepository { path: start.to_path_buf() })?;
        let git_dir_name = Self::git_dir_name();

        let root = start
            .ancestors()
            .find(|dir| dir.join(&git_dir_name).join("objects").is_dir())
            .ok_or_else(|| BitError::NotARepository { path: start.clone() })?;
        debug!(root = %root.display(), "found repository");

        Self::open(root, writer)
    }

    /// Name of the metadata directory, taken from `GIT_DIR`
    pub fn git_dir_name() -> String {
        std::env::var("GIT_DIR")
            .ok()
            .filter(|name| !name.is_empty())
            .unwrap_or_else(|| DEFAULT_GIT_DIR.to_string())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn git_dir(&self) -> &Path {
        &self.git_dir
    }

    pub fn writer(&'_ self) -> RefMut<'_, Box<dyn std::io::Write>> {
        self.writer.borrow_mut()
    }

    pub fn index(&self) -> &Index {
        &self.index
    }

    pub fn database(&self) -> &Database {
        &self.database
    }

    pub fn workspace(&self) -> &Workspace {
        &self.workspace
    }
}
