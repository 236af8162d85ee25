use crate::cleaner::FilenameCleaner;
use crate::file_utils;
use crate::library::Track;
use crate::logger::Logger;
use crate::partition::{self, Item, Mode};
use anyhow::Context;
use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};

/// Top-level folders that get letter ranges when splitting is on.
pub const SPLIT_FOLDERS: [&str; 2] = ["Artists", "Compilations"];

#[derive(Debug, Clone, PartialEq)]
pub enum TreeNode {
    Dir(BTreeMap<String, TreeNode>),
    /// Symlink pointing at the original media file.
    Link(PathBuf),
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SymlinkTree {
    pub root: BTreeMap<String, TreeNode>,
}

impl SymlinkTree {
    pub fn new() -> Self {
        Self::default()
    }

    /// Lay out playlist tracks as `Artists/<artist>/<album>/<file>`,
    /// `Classical/...` for classical music, and the library's own path for
    /// compilations. Names are cleaned on the way in.
    pub fn build<'a, I>(
        tracks: I,
        music_folder: Option<&str>,
        cleaner: &FilenameCleaner,
        logger: &Logger,
    ) -> Self
    where
        I: IntoIterator<Item = &'a Track>,
    {
        let mut tree = Self::new();
        for track in tracks {
            let Some(file_path) = track.file_path() else {
                continue;
            };

            let relative = music_folder
                .and_then(|prefix| file_path.strip_prefix(prefix))
                .unwrap_or(file_path.as_str());

            let unknown = cleaner.translator().unknown_chars(relative);
            if !unknown.is_empty() {
                logger.warn(&format!("Unknown character(s) {:?} in {}", unknown, relative));
            }

            let mut relative = cleaner.clean_name(relative);
            if track.is_classical() {
                relative = format!("Classical/{}", relative);
            } else if !track.compilation {
                relative = format!("Artists/{}", relative);
            }

            if !tree.insert(&relative, PathBuf::from(&file_path)) {
                logger.warn(&format!("Skipping {}: {} collides with another track", file_path, relative));
            }
        }
        tree
    }

    /// Add a link at the `/`-separated `path`. Empty segments are ignored.
    /// Returns false when the path runs through an existing link; an existing
    /// link at the exact path is kept.
    pub fn insert(&mut self, path: &str, target: PathBuf) -> bool {
        let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
        let Some((leaf, parents)) = segments.split_last() else {
            return false;
        };

        let mut level = &mut self.root;
        for segment in parents {
            let node = level
                .entry(segment.to_string())
                .or_insert_with(|| TreeNode::Dir(BTreeMap::new()));
            match node {
                TreeNode::Dir(children) => level = children,
                TreeNode::Link(_) => return false,
            }
        }

        match level.get(*leaf) {
            Some(TreeNode::Dir(_)) => false,
            Some(TreeNode::Link(_)) => true,
            None => {
                level.insert(leaf.to_string(), TreeNode::Link(target));
                true
            }
        }
    }

    /// Replace the listed top-level folders with letter-range groups.
    pub fn split_children(&mut self, names: &[&str], size: usize) -> anyhow::Result<()> {
        for name in names {
            if let Some(TreeNode::Dir(children)) = self.root.remove(*name) {
                let split = split_tree(children, size)?;
                self.root.insert(name.to_string(), TreeNode::Dir(split));
            }
        }
        Ok(())
    }

    /// Write directories and symlinks under `top`.
    pub fn make_symlinks(&self, top: &Path, logger: &Logger) -> anyhow::Result<usize> {
        make_symlinks(top, &self.root, logger)
    }

    /// Numbered, indented listing of the tree; links show their target.
    pub fn render(&self) -> String {
        let mut out = String::new();
        render_level(&self.root, 0, &mut out);
        out
    }

    pub fn link_count(&self) -> usize {
        fn count(level: &BTreeMap<String, TreeNode>) -> usize {
            level
                .values()
                .map(|node| match node {
                    TreeNode::Dir(children) => count(children),
                    TreeNode::Link(_) => 1,
                })
                .sum()
        }
        count(&self.root)
    }
}

/// Group the entries of a mapping into letter-range sub-mappings of at least
/// `size` entries (the last one may be smaller).
pub fn split_tree(
    tree: BTreeMap<String, TreeNode>,
    size: usize,
) -> anyhow::Result<BTreeMap<String, TreeNode>> {
    let items: Vec<Item<TreeNode>> = tree
        .into_iter()
        .map(|(key, node)| Item::new(key, node))
        .collect();

    let chunks = partition::partition(items, size, Mode::Greedy)?;
    Ok(chunks
        .into_iter()
        .map(|chunk| {
            let children = chunk
                .items
                .into_iter()
                .map(|item| (item.key, item.payload))
                .collect();
            (chunk.label, TreeNode::Dir(children))
        })
        .collect())
}

fn make_symlinks(
    top: &Path,
    level: &BTreeMap<String, TreeNode>,
    logger: &Logger,
) -> anyhow::Result<usize> {
    fs::create_dir_all(top).with_context(|| format!("creating {}", top.display()))?;
    let mut linked = 0;
    for (name, node) in level {
        let item_path = top.join(name);
        match node {
            TreeNode::Dir(children) => linked += make_symlinks(&item_path, children, logger)?,
            TreeNode::Link(target) => {
                logger.linked(target, &item_path);
                file_utils::symlink(target, &item_path)?;
                linked += 1;
            }
        }
    }
    Ok(linked)
}

fn render_level(level: &BTreeMap<String, TreeNode>, depth: usize, out: &mut String) {
    let indent = "  ".repeat(depth);
    for (n, (name, node)) in level.iter().enumerate() {
        let _ = writeln!(out, "{:02}. {}{}", n + 1, indent, name);
        match node {
            TreeNode::Dir(children) => render_level(children, depth + 1, out),
            TreeNode::Link(target) => {
                let _ = writeln!(out, "--> {}{}", "  ".repeat(depth + 1), target.display());
            }
        }
    }
}
