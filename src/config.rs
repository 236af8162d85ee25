use std::env;
use std::path::PathBuf;

pub const LIBRARY_XML_VAR: &str = "MEDIASHELF_LIBRARY_XML";
pub const STAGING_DIR_VAR: &str = "MEDIASHELF_STAGING_DIR";
pub const INTRO_VAR: &str = "MEDIASHELF_INTRO";
pub const CCDICT_VAR: &str = "MEDIASHELF_CCDICT";
pub const RSYNC_VAR: &str = "MEDIASHELF_RSYNC";

const DEFAULT_RSYNC: &str = "/usr/bin/rsync";

#[derive(Clone, Debug)]
pub struct Config {
    pub library_xml: PathBuf,
    pub staging_dir: PathBuf,
    pub intro_file: PathBuf,
    pub ccdict: Option<PathBuf>,
    pub rsync: PathBuf,
}

/// Values given on the command line; each one wins over its environment variable.
#[derive(Clone, Debug, Default)]
pub struct Overrides {
    pub library_xml: Option<PathBuf>,
    pub staging_dir: Option<PathBuf>,
    pub intro_file: Option<PathBuf>,
    pub ccdict: Option<PathBuf>,
}

impl Config {
    /// Resolve every path from flags, then the environment (including a
    /// `.env` file in the working directory), then defaults.
    pub fn load(overrides: Overrides) -> Self {
        let _ = dotenvy::dotenv();
        Self::resolve(overrides, |key| env::var_os(key).map(PathBuf::from))
    }

    fn resolve<F>(overrides: Overrides, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<PathBuf>,
    {
        let home = dirs::home_dir().unwrap_or_else(|| PathBuf::from("."));

        Self {
            library_xml: overrides
                .library_xml
                .or_else(|| lookup(LIBRARY_XML_VAR))
                .unwrap_or_else(|| home.join("Music").join("Music").join("Library.xml")),
            staging_dir: overrides
                .staging_dir
                .or_else(|| lookup(STAGING_DIR_VAR))
                .unwrap_or_else(|| env::temp_dir().join("playlist-files")),
            intro_file: overrides
                .intro_file
                .or_else(|| lookup(INTRO_VAR))
                .unwrap_or_else(|| home.join("Music").join("Ringtones").join("+A.mp3")),
            ccdict: overrides.ccdict.or_else(|| lookup(CCDICT_VAR)),
            rsync: lookup(RSYNC_VAR).unwrap_or_else(|| PathBuf::from(DEFAULT_RSYNC)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_without_env() {
        let config = Config::resolve(Overrides::default(), |_| None);
        assert!(config.library_xml.ends_with("Music/Music/Library.xml"));
        assert!(config.intro_file.ends_with("Ringtones/+A.mp3"));
        assert!(config.staging_dir.ends_with("playlist-files"));
        assert!(config.ccdict.is_none());
        assert_eq!(config.rsync, PathBuf::from("/usr/bin/rsync"));
    }

    #[test]
    fn test_env_overrides_defaults() {
        let config = Config::resolve(Overrides::default(), |key| match key {
            STAGING_DIR_VAR => Some(PathBuf::from("/srv/stage")),
            RSYNC_VAR => Some(PathBuf::from("/opt/bin/rsync")),
            _ => None,
        });
        assert_eq!(config.staging_dir, PathBuf::from("/srv/stage"));
        assert_eq!(config.rsync, PathBuf::from("/opt/bin/rsync"));
    }

    #[test]
    fn test_flags_override_env() {
        let overrides = Overrides {
            library_xml: Some(PathBuf::from("/tmp/lib.xml")),
            ccdict: Some(PathBuf::from("/tmp/ccdict.txt")),
            ..Default::default()
        };
        let config = Config::resolve(overrides, |key| match key {
            LIBRARY_XML_VAR => Some(PathBuf::from("/env/lib.xml")),
            CCDICT_VAR => Some(PathBuf::from("/env/ccdict.txt")),
            _ => None,
        });
        assert_eq!(config.library_xml, PathBuf::from("/tmp/lib.xml"));
        assert_eq!(config.ccdict, Some(PathBuf::from("/tmp/ccdict.txt")));
    }
}
