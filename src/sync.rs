use crate::file_utils;
use crate::logger::Logger;
use anyhow::Context;
use std::fs;
use std::path::Path;
use std::process::{Command, Stdio};
use walkdir::WalkDir;

/// Check if rsync is available at the configured path
pub fn check_rsync_available(rsync: &Path) -> bool {
    Command::new(rsync)
        .arg("--version")
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .map(|s| s.success())
        .unwrap_or(false)
}

/// Remove everything below `top`, leaving `top` itself as an empty directory.
pub fn delete_directory_contents(top: &Path, logger: &Logger) -> anyhow::Result<()> {
    logger.progress(&format!("Clearing staging directory {}", top.display()));
    if top.is_dir() {
        let entries = WalkDir::new(top)
            .min_depth(1)
            .contents_first(true)
            .into_iter()
            .collect::<Result<Vec<_>, _>>()
            .with_context(|| format!("walking {}", top.display()))?;
        for entry in entries {
            let path = entry.path();
            let removed = if entry.file_type().is_dir() {
                fs::remove_dir(path)
            } else {
                fs::remove_file(path)
            };
            removed.with_context(|| format!("removing {}", path.display()))?;
        }
    }
    fs::create_dir_all(top).with_context(|| format!("creating {}", top.display()))?;
    Ok(())
}

/// Link the intro file into `top` so it sorts and plays first.
/// Returns false when the intro file does not exist.
pub fn link_intro(top: &Path, intro: &Path, logger: &Logger) -> anyhow::Result<bool> {
    if !intro.is_file() {
        logger.warn(&format!("Not linking missing intro file {}", intro.display()));
        return Ok(false);
    }
    let Some(name) = intro.file_name() else {
        return Ok(false);
    };

    logger.progress(&format!("Linking intro file {}", intro.display()));
    let dest = top.join(name);
    if dest.symlink_metadata().is_ok() {
        fs::remove_file(&dest).with_context(|| format!("removing stale {}", dest.display()))?;
    }
    file_utils::symlink(intro, &dest)?;
    Ok(true)
}

/// rsync arguments that mirror `src` into `dest`, following the symlinks.
pub fn rsync_args(src: &Path, dest: &Path, dry_run: bool) -> Vec<String> {
    let mut args = Vec::new();
    if dry_run {
        args.push("-n".to_string());
    }
    for flag in [
        "--verbose",
        "--itemize-changes",
        "--recursive",
        "--copy-links",
        "--stats",
        "--size-only",
        "--delete",
        "--exclude=.*",
    ] {
        args.push(flag.to_string());
    }
    args.push(format!("{}/", src.display()));
    args.push(format!("{}/", dest.display()));
    args
}

/// Mirror the staging directory into the destination with rsync.
pub fn sync_files(
    rsync: &Path,
    src: &Path,
    dest: &Path,
    dry_run: bool,
    logger: &Logger,
) -> anyhow::Result<()> {
    if dry_run {
        logger.progress(&format!("Would sync to {}", dest.display()));
    } else {
        logger.progress(&format!("Syncing to {}", dest.display()));
    }

    let status = Command::new(rsync)
        .args(rsync_args(src, dest, dry_run))
        .status()
        .with_context(|| format!("Failed to run {}. Is it installed?", rsync.display()))?;

    if !status.success() {
        anyhow::bail!("rsync to {} failed ({})", dest.display(), status);
    }
    Ok(())
}
