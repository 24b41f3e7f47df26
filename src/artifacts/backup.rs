use crate::error::Result;
use std::ffi::OsString;
use std::path::{Path, PathBuf};

/// `<path>.bak`, keeping the original extension (`rank.csv` -> `rank.csv.bak`).
pub fn backup_path(path: &Path) -> PathBuf {
    let mut name = OsString::from(path.as_os_str());
    name.push(".bak");
    PathBuf::from(name)
}

/// Rename an existing file at `path` to `<path>.bak` so the next write does
/// not destroy it. Only the most recent backup is kept: an older `.bak` is
/// replaced. Returns the backup path when a rename happened.
pub fn backup_existing(path: &Path) -> Result<Option<PathBuf>> {
    if !path.exists() {
        return Ok(None);
    }
    let backup = backup_path(path);
    if backup.exists() {
        // rename() does not replace existing files on every platform
        std::fs::remove_file(&backup)?;
    }
    std::fs::rename(path, &backup)?;
    log::info!("Moved existing {} to {}", path.display(), backup.display());
    Ok(Some(backup))
}
