use crate::logger::Logger;
use crate::translit::CharacterTranslator;
use anyhow::Context;
use regex::Regex;
use std::fs;
use std::path::Path;
use walkdir::WalkDir;

/// Rewrites names (or whole relative paths) into a tidy ASCII form.
pub struct FilenameCleaner {
    translator: CharacterTranslator,
    adjacent_dash_dot_re: Regex,
    trailing_characters_re: Regex,
    leading_non_word_re: Regex,
    leading_article_re: Regex,
}

impl FilenameCleaner {
    pub fn new(translator: CharacterTranslator) -> anyhow::Result<Self> {
        Ok(Self {
            translator,
            adjacent_dash_dot_re: Regex::new(r"[-_]+\.")?,
            trailing_characters_re: Regex::new(r"[-_. ]+$")?,
            leading_non_word_re: Regex::new(r"(\A|/)[^0-9A-Za-z_]*")?,
            leading_article_re: Regex::new(r"(?i)(\A|/)(THE|DER|DIE|DAS) ([^/]*)")?,
        })
    }

    pub fn translator(&self) -> &CharacterTranslator {
        &self.translator
    }

    /// Clean a name, leaving its extension alone.
    ///
    /// Every `/`-separated component gets its leading punctuation removed and
    /// a leading article moved to the end: `The Beatles` becomes `Beatles, The`.
    pub fn clean_name(&self, name: &str) -> String {
        let (root, ext) = split_ext(name);
        let root = self.translator.translate_str(root);
        let root = self.adjacent_dash_dot_re.replace_all(&root, ".");
        let root = self.trailing_characters_re.replace_all(&root, "");
        let root = self.leading_non_word_re.replace_all(&root, "${1}");
        let root = self.leading_article_re.replace_all(&root, "${1}${3}, ${2}");
        format!("{}{}", root, ext)
    }

    /// Rename everything below `top` to its cleaned name, deepest entries first.
    /// Returns the number of renames.
    pub fn recursive_clean(&self, top: &Path, dry_run: bool, logger: &Logger) -> anyhow::Result<usize> {
        let entries = WalkDir::new(top)
            .min_depth(1)
            .contents_first(true)
            .into_iter()
            .collect::<Result<Vec<_>, _>>()
            .with_context(|| format!("walking {}", top.display()))?;

        let mut renamed = 0;
        for entry in entries {
            if self.maybe_rename(entry.path(), dry_run, logger)? {
                renamed += 1;
            }
        }
        Ok(renamed)
    }

    fn maybe_rename(&self, path: &Path, dry_run: bool, logger: &Logger) -> anyhow::Result<bool> {
        let Some(basename) = path.file_name().and_then(|n| n.to_str()) else {
            logger.warn(&format!("Skipping non UTF-8 name: {}", path.display()));
            return Ok(false);
        };

        let unknown = self.translator.unknown_chars(basename);
        if !unknown.is_empty() {
            let codes: Vec<String> = unknown
                .iter()
                .map(|c| format!("'{}' (0x{:X})", c, u32::from(*c)))
                .collect();
            logger.warn(&format!("Unknown character: {} in {}", codes.join(", "), basename));
        }

        let cleaned = self.clean_name(basename);
        if cleaned == basename {
            return Ok(false);
        }

        let target = path.with_file_name(&cleaned);
        if target.symlink_metadata().is_ok() {
            logger.warn(&format!(
                "Not renaming {}: {} already exists",
                path.display(),
                target.display()
            ));
            return Ok(false);
        }

        logger.renamed(path, &target);
        if !dry_run {
            fs::rename(path, &target)
                .with_context(|| format!("renaming {} to {}", path.display(), target.display()))?;
        }
        Ok(true)
    }
}

/// Split off the extension of the last path component, like Python's
/// `os.path.splitext`: leading dots of a name never start an extension.
pub fn split_ext(name: &str) -> (&str, &str) {
    let base_start = name.rfind('/').map(|i| i + 1).unwrap_or(0);
    let base = &name[base_start..];
    let stem_start = base.len() - base.trim_start_matches('.').len();
    match base.rfind('.') {
        Some(dot) if dot > stem_start => name.split_at(base_start + dot),
        _ => (name, ""),
    }
}
