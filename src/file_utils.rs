use crate::logger::Logger;
use anyhow::Context;
use std::ffi::OsString;
use std::fs;
use std::path::Path;

/// Entry names of a directory, sorted.
pub fn sorted_entries(dir: &Path) -> anyhow::Result<Vec<OsString>> {
    let mut names = Vec::new();
    for entry in fs::read_dir(dir).with_context(|| format!("reading {}", dir.display()))? {
        names.push(entry?.file_name());
    }
    names.sort();
    Ok(names)
}

/// Create a folder (and parents) unless it already exists
pub fn ensure_dir(path: &Path, dry_run: bool, logger: &Logger) -> anyhow::Result<()> {
    if path.is_dir() {
        return Ok(());
    }
    logger.dir_created(path);
    if !dry_run {
        fs::create_dir_all(path).with_context(|| format!("creating {}", path.display()))?;
    }
    Ok(())
}

/// Move a file or folder, refusing to clobber an existing destination
pub fn move_entry(src: &Path, dst: &Path, dry_run: bool, logger: &Logger) -> anyhow::Result<()> {
    logger.moved(src, dst);
    if dry_run {
        return Ok(());
    }
    if dst.symlink_metadata().is_ok() {
        anyhow::bail!("Destination already exists: {}", dst.display());
    }
    fs::rename(src, dst)
        .with_context(|| format!("moving {} to {}", src.display(), dst.display()))
}

/// Remove a folder that is expected to be empty
pub fn remove_empty_dir(path: &Path, dry_run: bool, logger: &Logger) -> anyhow::Result<()> {
    logger.dir_removed(path);
    if !dry_run {
        fs::remove_dir(path).with_context(|| format!("removing {}", path.display()))?;
    }
    Ok(())
}

#[cfg(unix)]
pub fn symlink(target: &Path, link: &Path) -> anyhow::Result<()> {
    std::os::unix::fs::symlink(target, link)
        .with_context(|| format!("linking {} -> {}", link.display(), target.display()))
}

#[cfg(windows)]
pub fn symlink(target: &Path, link: &Path) -> anyhow::Result<()> {
    std::os::windows::fs::symlink_file(target, link)
        .with_context(|| format!("linking {} -> {}", link.display(), target.display()))
}
