use crate::file_utils;
use crate::logger::Logger;
use crate::partition::{self, Chunk, Item, Mode};
use std::collections::BTreeMap;
use std::ffi::{OsStr, OsString};
use std::fs;
use std::path::Path;

/// Number of entries moved into each chunk directory, keyed by label.
pub type SplitSummary = BTreeMap<String, usize>;

/// Move the entries of `dir` into balanced letter-range subdirectories of
/// roughly `size` entries each.
pub fn split_directory(
    dir: &Path,
    size: usize,
    dry_run: bool,
    logger: &Logger,
) -> anyhow::Result<SplitSummary> {
    let items: Vec<Item<OsString>> = file_utils::sorted_entries(dir)?
        .into_iter()
        .map(|name| {
            let key = name.to_string_lossy().into_owned();
            Item::new(key, name)
        })
        .collect();

    let chunks = partition::partition(items, size, Mode::Balanced)?;
    check_labels(dir, &chunks)?;

    let mut summary = SplitSummary::new();
    for chunk in chunks {
        let chunk_root = dir.join(&chunk.label);
        if stays_in_place(dir, &chunk) {
            logger.debug(&format!("{} stays in place", chunk_root.display()));
            let count = chunk.len();
            summary.insert(chunk.label, count);
            continue;
        }
        file_utils::ensure_dir(&chunk_root, dry_run, logger)?;
        for item in &chunk.items {
            file_utils::move_entry(
                &dir.join(&item.payload),
                &chunk_root.join(&item.payload),
                dry_run,
                logger,
            )?;
        }
        let count = chunk.len();
        summary.insert(chunk.label, count);
    }

    Ok(summary)
}

/// A chunk needs no moving when its directory is `dir` itself (the `.`
/// group) or is its only entry.
fn stays_in_place(dir: &Path, chunk: &Chunk<OsString>) -> bool {
    dir.join(&chunk.label) == dir
        || matches!(chunk.items.as_slice(), [only] if only.payload.as_os_str() == OsStr::new(&chunk.label))
}

/// Fail before anything moves if a chunk directory would land on an existing entry.
fn check_labels(dir: &Path, chunks: &[Chunk<OsString>]) -> anyhow::Result<()> {
    for chunk in chunks {
        let chunk_root = dir.join(&chunk.label);
        if !stays_in_place(dir, chunk) && chunk_root.symlink_metadata().is_ok() {
            anyhow::bail!(
                "Chunk {} would overwrite existing entry {}",
                chunk.label,
                chunk_root.display()
            );
        }
    }
    Ok(())
}

/// Move every entry of every immediate subdirectory of `dir` into `dir`,
/// then remove the emptied subdirectories.
pub fn flatten_directory(dir: &Path, dry_run: bool, logger: &Logger) -> anyhow::Result<()> {
    for name in file_utils::sorted_entries(dir)? {
        let subdir = dir.join(&name);
        if !subdir.is_dir() {
            continue;
        }
        for item in file_utils::sorted_entries(&subdir)? {
            file_utils::move_entry(&subdir.join(&item), &dir.join(&item), dry_run, logger)?;
        }
        file_utils::remove_empty_dir(&subdir, dry_run, logger)?;
    }
    Ok(())
}

/// Print the per-chunk counts of a split.
pub fn report_summary(summary: &SplitSummary, logger: &Logger) {
    logger.info("summary:");
    for (label, count) in summary {
        logger.chunk_summary(label, *count);
    }
}

/// Count of entries directly inside `dir`; used to report what a join left behind.
pub fn entry_count(dir: &Path) -> anyhow::Result<usize> {
    Ok(fs::read_dir(dir)?.count())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::LogConfig;
    use std::path::PathBuf;

    fn quiet() -> Logger {
        Logger::new(LogConfig::default())
    }

    fn populate(dir: &Path, names: &[&str]) {
        for name in names {
            fs::create_dir(dir.join(name)).unwrap();
            fs::write(dir.join(name).join("track.mp3"), name).unwrap();
        }
    }

    fn artists() -> Vec<&'static str> {
        vec![
            "Abba", "Air", "Beck", "Bjork", "Cake", "Can", "Cher", "Chic", "Cream", "Cure",
            "Cut Copy", "Cymande",
        ]
    }

    #[test]
    fn test_split_moves_entries_into_chunks() {
        let tmp = tempfile::tempdir().unwrap();
        populate(tmp.path(), &artists());

        let summary = split_directory(tmp.path(), 5, false, &quiet()).unwrap();

        let expected: SplitSummary = [("A-B".to_string(), 4), ("C".to_string(), 8)]
            .into_iter()
            .collect();
        assert_eq!(summary, expected);
        assert!(tmp.path().join("A-B").join("Abba").join("track.mp3").is_file());
        assert!(tmp.path().join("C").join("Cymande").is_dir());
        assert!(!tmp.path().join("Beck").exists());
        assert_eq!(entry_count(tmp.path()).unwrap(), 2);
    }

    #[test]
    fn test_split_dry_run_touches_nothing() {
        let tmp = tempfile::tempdir().unwrap();
        populate(tmp.path(), &artists());

        let summary = split_directory(tmp.path(), 5, true, &quiet()).unwrap();

        assert_eq!(summary.values().sum::<usize>(), 12);
        assert_eq!(entry_count(tmp.path()).unwrap(), 12);
        assert!(!tmp.path().join("A-B").exists());
    }

    #[test]
    fn test_split_rejects_zero_size() {
        let tmp = tempfile::tempdir().unwrap();
        populate(tmp.path(), &["Abba"]);
        assert!(split_directory(tmp.path(), 0, false, &quiet()).is_err());
        assert!(tmp.path().join("Abba").is_dir());
    }

    #[test]
    fn test_split_leaves_lone_dotfile_in_place() {
        let tmp = tempfile::tempdir().unwrap();
        fs::write(tmp.path().join(".DS_Store"), "finder").unwrap();
        let names: Vec<String> = (0..10).map(|i| format!("A{:02}", i)).collect();
        let names: Vec<&str> = names.iter().map(String::as_str).collect();
        populate(tmp.path(), &names);

        let summary = split_directory(tmp.path(), 5, false, &quiet()).unwrap();

        let expected: SplitSummary = [(".".to_string(), 1), ("A".to_string(), 10)]
            .into_iter()
            .collect();
        assert_eq!(summary, expected);
        assert_eq!(
            fs::read_to_string(tmp.path().join(".DS_Store")).unwrap(),
            "finder"
        );
        assert!(tmp.path().join("A").join("A09").join("track.mp3").is_file());
        assert_eq!(entry_count(tmp.path()).unwrap(), 2);
    }

    #[test]
    fn test_resplit_keeps_entry_named_like_its_chunk() {
        let tmp = tempfile::tempdir().unwrap();
        populate(tmp.path(), &["A-B", "C", "D-F"]);

        let summary = split_directory(tmp.path(), 1, false, &quiet()).unwrap();

        assert_eq!(summary.keys().collect::<Vec<_>>(), vec!["A", "C", "D"]);
        assert!(tmp.path().join("A").join("A-B").join("track.mp3").is_file());
        assert!(tmp.path().join("C").join("track.mp3").is_file());
        assert!(tmp.path().join("D").join("D-F").is_dir());
    }

    #[test]
    fn test_split_label_clash_fails_before_moving() {
        let tmp = tempfile::tempdir().unwrap();
        populate(tmp.path(), &["Abba", "C", "Cake", "Can"]);

        let err = split_directory(tmp.path(), 2, false, &quiet()).unwrap_err();

        assert!(err.to_string().contains("would overwrite"));
        assert!(tmp.path().join("Abba").join("track.mp3").is_file());
        assert!(!tmp.path().join("A").exists());
        assert_eq!(entry_count(tmp.path()).unwrap(), 4);
    }

    #[test]
    fn test_split_then_join_restores_layout() {
        let tmp = tempfile::tempdir().unwrap();
        populate(tmp.path(), &artists());

        split_directory(tmp.path(), 3, false, &quiet()).unwrap();
        flatten_directory(tmp.path(), false, &quiet()).unwrap();

        let mut names: Vec<PathBuf> = fs::read_dir(tmp.path())
            .unwrap()
            .map(|e| PathBuf::from(e.unwrap().file_name()))
            .collect();
        names.sort();
        let expected: Vec<PathBuf> = artists().into_iter().map(PathBuf::from).collect();
        assert_eq!(names, expected);
        assert!(tmp.path().join("Cure").join("track.mp3").is_file());
    }

    #[test]
    fn test_flatten_skips_files_and_keeps_dry_run() {
        let tmp = tempfile::tempdir().unwrap();
        fs::create_dir(tmp.path().join("A-B")).unwrap();
        fs::write(tmp.path().join("A-B").join("Abba.mp3"), "").unwrap();
        fs::write(tmp.path().join("loose.txt"), "").unwrap();

        flatten_directory(tmp.path(), true, &quiet()).unwrap();
        assert!(tmp.path().join("A-B").join("Abba.mp3").exists());

        flatten_directory(tmp.path(), false, &quiet()).unwrap();
        assert!(tmp.path().join("Abba.mp3").exists());
        assert!(tmp.path().join("loose.txt").exists());
        assert!(!tmp.path().join("A-B").exists());
    }
}
