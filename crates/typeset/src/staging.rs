//! Per-run staging directories

use crate::compiler::SOURCE_FILE;
use crate::{Result, TypesetError};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tempfile::TempDir;

#[cfg(unix)]
use std::os::unix::fs::symlink;
#[cfg(windows)]
use std::os::windows::fs::symlink_file as symlink;

/// Name prefix of every staging directory
pub const STAGING_PREFIX: &str = "texpdf-";

/// A fresh directory holding `document.tex` and links to auxiliary files
///
/// Dropping it removes the directory; [`Staging::keep`] leaves it on disk.
pub(crate) struct Staging {
    dir: TempDir,
}

impl Staging {
    /// Create a new staging directory below `root` and write `source` into it
    pub(crate) fn create(root: &Path, source: &str) -> Result<Self> {
        let dir = fs::create_dir_all(root)
            .and_then(|_| {
                tempfile::Builder::new()
                    .prefix(STAGING_PREFIX)
                    .tempdir_in(root)
            })
            .map_err(|source| TypesetError::Staging {
                root: root.to_path_buf(),
                source,
            })?;

        fs::write(dir.path().join(SOURCE_FILE), source)?;
        log::debug!("Staged {} in {}", SOURCE_FILE, dir.path().display());

        Ok(Self { dir })
    }

    pub(crate) fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Symlink `auxiliary` into the staging directory under its base name
    pub(crate) fn link(&self, auxiliary: &Path) -> Result<()> {
        let name = auxiliary
            .file_name()
            .ok_or_else(|| TypesetError::AuxiliaryName(auxiliary.to_path_buf()))?;

        // Absolute target, the link lives in a different directory
        let target = fs::canonicalize(auxiliary).map_err(|err| match err.kind() {
            ErrorKind::NotFound => TypesetError::AuxiliaryMissing(auxiliary.to_path_buf()),
            _ => err.into(),
        })?;

        let link = self.path().join(name);
        symlink(&target, &link).map_err(|err| match err.kind() {
            ErrorKind::AlreadyExists => TypesetError::AuxiliaryCollision {
                name: name.to_string_lossy().into_owned(),
                path: auxiliary.to_path_buf(),
            },
            _ => err.into(),
        })?;

        log::debug!("Linked {} -> {}", link.display(), target.display());
        Ok(())
    }

    /// Leave the directory on disk and return its path
    pub(crate) fn keep(self) -> PathBuf {
        self.dir.keep()
    }

    /// Remove the directory, reporting failures
    pub(crate) fn remove(self) -> Result<()> {
        Ok(self.dir.close()?)
    }
}

/// Remove staging directories below `root` last modified at least
/// `older_than` ago
///
/// Only directories named with [`STAGING_PREFIX`] are touched. A missing
/// `root` counts as empty. Returns the number of directories removed.
pub fn sweep_stale_staging<P: AsRef<Path>>(root: P, older_than: Duration) -> Result<usize> {
    let root = root.as_ref();
    let entries = match fs::read_dir(root) {
        Ok(entries) => entries,
        Err(err) if err.kind() == ErrorKind::NotFound => return Ok(0),
        Err(err) => return Err(err.into()),
    };

    let mut removed = 0;
    for entry in entries {
        let entry = entry?;
        if !entry.file_name().to_string_lossy().starts_with(STAGING_PREFIX) {
            continue;
        }
        let metadata = entry.metadata()?;
        if !metadata.is_dir() {
            continue;
        }

        let age = metadata.modified()?.elapsed().unwrap_or_default();
        if age >= older_than {
            fs::remove_dir_all(entry.path())?;
            log::info!("Removed stale staging directory {}", entry.path().display());
            removed += 1;
        }
    }

    Ok(removed)
}
