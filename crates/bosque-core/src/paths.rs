//! Scratch workspace management.
//!
//! Every kernel session owns one temporary directory that holds the
//! intermediate compile artifacts:
//!
//! ```text
//! bosque_kernel_XXXXXX/
//! ├── source.bsq   # Cell source, deleted right after the compile step
//! └── jsout/       # Compiler output, recreated before every compile
//!     └── Main.mjs # Entry module handed to the runtime
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use tempfile::TempDir;

use crate::error::{Error, Result};

/// Prefix of every scratch directory name.
pub const SCRATCH_PREFIX: &str = "bosque_kernel_";

/// A directory exclusively owned by one session.
///
/// The directory is removed when the workspace is dropped or
/// explicitly [`remove`](Self::remove)d, whatever it contains.
#[derive(Debug)]
pub struct ScratchWorkspace {
    dir: TempDir,
}

impl ScratchWorkspace {
    /// Create a fresh scratch directory under the system temp directory.
    ///
    /// # Errors
    /// Returns [`Error::Environment`] if the directory cannot be created.
    pub fn create() -> Result<Self> {
        Self::create_in(std::env::temp_dir())
    }

    /// Create a fresh scratch directory under `parent`.
    ///
    /// # Errors
    /// Returns [`Error::Environment`] if the directory cannot be created.
    pub fn create_in(parent: impl AsRef<Path>) -> Result<Self> {
        let parent = parent.as_ref();
        let dir = tempfile::Builder::new()
            .prefix(SCRATCH_PREFIX)
            .tempdir_in(parent)
            .map_err(|e| {
                Error::Environment(format!(
                    "cannot create scratch directory in {}: {}",
                    parent.display(),
                    e
                ))
            })?;

        tracing::debug!("Scratch directory created at {}", dir.path().display());
        Ok(Self { dir })
    }

    /// Path of the scratch directory.
    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Remove the directory and everything in it.
    ///
    /// Failures are logged and otherwise ignored.
    pub fn remove(self) {
        let path = self.dir.path().to_path_buf();
        match self.dir.close() {
            Ok(()) => tracing::debug!("Scratch directory {} removed", path.display()),
            Err(e) => tracing::warn!("Failed to remove scratch directory {}: {}", path.display(), e),
        }
    }
}

/// Remove whatever sits at `path`: a directory tree, a file or a symlink.
///
/// A missing path is not an error.
pub fn remove_path(path: &Path) -> Result<()> {
    let metadata = match fs::symlink_metadata(path) {
        Ok(metadata) => metadata,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(()),
        Err(e) => return Err(e.into()),
    };

    if metadata.is_dir() {
        fs::remove_dir_all(path)?;
    } else {
        fs::remove_file(path)?;
    }
    Ok(())
}

/// Replace whatever sits at `dir` with a fresh, empty directory.
pub fn recreate_dir(dir: &Path) -> Result<PathBuf> {
    remove_path(dir)?;
    fs::create_dir_all(dir)?;
    Ok(dir.to_path_buf())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_in_uses_prefix() {
        let parent = TempDir::new().expect("Failed to create temp dir");
        let scratch = ScratchWorkspace::create_in(parent.path()).expect("Failed to create scratch");

        let name = scratch.path().file_name().unwrap().to_string_lossy().to_string();
        assert!(name.starts_with(SCRATCH_PREFIX));
        assert!(scratch.path().is_dir());
        assert_eq!(scratch.path().parent(), Some(parent.path()));
    }

    #[test]
    fn test_remove_deletes_foreign_files() {
        let scratch = ScratchWorkspace::create().expect("Failed to create scratch");
        let path = scratch.path().to_path_buf();

        // Files the session never created
        fs::create_dir_all(path.join("nested/deeper")).unwrap();
        fs::write(path.join("nested/deeper/stray.txt"), "stray").unwrap();
        fs::write(path.join("other.log"), "log").unwrap();

        scratch.remove();
        assert!(!path.exists());
    }

    #[test]
    fn test_create_in_missing_parent_is_environment_error() {
        let parent = TempDir::new().unwrap();
        let missing = parent.path().join("does-not-exist");

        let err = ScratchWorkspace::create_in(&missing).unwrap_err();
        assert!(matches!(err, Error::Environment(_)));
    }

    #[test]
    fn test_recreate_dir_replaces_file() {
        let temp = TempDir::new().unwrap();
        let dir = temp.path().join("jsout");
        fs::write(&dir, "not a directory").unwrap();

        recreate_dir(&dir).unwrap();

        assert!(dir.is_dir());
    }

    #[test]
    fn test_remove_path_handles_every_kind() {
        let temp = TempDir::new().unwrap();
        let file = temp.path().join("source.bsq");
        let tree = temp.path().join("tree");
        fs::write(&file, "x").unwrap();
        fs::create_dir_all(tree.join("inner")).unwrap();

        remove_path(&file).unwrap();
        remove_path(&tree).unwrap();
        remove_path(&temp.path().join("missing")).unwrap();

        assert!(!file.exists());
        assert!(!tree.exists());
    }

    #[test]
    fn test_recreate_dir_empties_existing() {
        let temp = TempDir::new().unwrap();
        let dir = temp.path().join("jsout");
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join("Stale.mjs"), "old").unwrap();

        recreate_dir(&dir).unwrap();

        assert!(dir.is_dir());
        assert_eq!(fs::read_dir(&dir).unwrap().count(), 0);
    }
}
