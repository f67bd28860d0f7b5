//! Atomic file replacement
//!
//! A write is staged in a temporary file beside its target and renamed over
//! it on commit, so readers see either the old or the new file.

use anyhow::{Context, Result};
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// Contents written and synced next to their target, not yet renamed into place
#[derive(Debug)]
pub struct Staged {
    file: NamedTempFile,
    target: PathBuf,
}

impl Staged {
    /// File this write will replace
    #[inline]
    #[must_use]
    pub fn target(&self) -> &Path {
        &self.target
    }

    /// Rename the staged file over its target
    ///
    /// # Errors
    /// Fails if the rename fails; the target is untouched in that case.
    pub fn commit(self) -> Result<()> {
        let Self { file, target } = self;
        file.persist(&target)
            .map_err(|e| e.error)
            .with_context(|| format!("cannot write {}", target.display()))?;
        tracing::debug!(path = %target.display(), "replaced file");
        Ok(())
    }
}

/// Write `contents` to a temporary file in the directory of `path`
///
/// Nothing is visible at `path` until [`Staged::commit`]. Dropping the
/// staged write removes the temporary file.
///
/// # Errors
/// Fails if the temporary file cannot be created or written.
pub fn stage(path: &Path, contents: &str) -> Result<Staged> {
    let dir = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));

    let mut file = NamedTempFile::new_in(dir).with_context(|| format!("cannot create temporary file in {}", dir.display()))?;
    file.write_all(contents.as_bytes())
        .and_then(|()| file.as_file().sync_all())
        .with_context(|| format!("cannot write temporary file for {}", path.display()))?;

    tracing::trace!(path = %path.display(), bytes = contents.len(), "staged file");
    Ok(Staged {
        file,
        target: path.to_path_buf(),
    })
}
