use clap::{ArgGroup, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "mediashelf")]
#[command(version = "0.1.0")]
#[command(about = "Media library maintenance: split, clean, and sync music folders")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Output format for progress and results
    #[arg(long = "output", value_enum, default_value_t = OutputFormat::Text, global = true)]
    pub output: OutputFormat,

    /// Only print warnings, errors, and summaries
    #[arg(long, short = 'q', default_value_t = false, global = true)]
    pub quiet: bool,

    /// Print debug output, including every created symlink
    #[arg(long, short = 'v', default_value_t = false, global = true)]
    pub verbose: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

/// Logger settings derived from CLI flags
#[derive(Clone, Debug)]
pub struct LogConfig {
    pub output_format: OutputFormat,
    pub quiet: bool,
    pub verbose: bool,
}

impl LogConfig {
    pub fn from_cli(cli: &Cli) -> Self {
        Self {
            output_format: cli.output,
            quiet: cli.quiet,
            verbose: cli.verbose,
        }
    }
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            output_format: OutputFormat::Text,
            quiet: true,
            verbose: false,
        }
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Divide a directory's entries into letter-range subdirectories of a given size
    Split {
        /// Target number of entries per subdirectory
        #[arg(short, long)]
        size: usize,
        /// Really move things rather than just showing what would be moved
        #[arg(short, long, default_value_t = false)]
        force: bool,
        dir: PathBuf,
    },
    /// Move the contents of every subdirectory into the parent
    Join {
        /// Really move things rather than just showing what would be moved
        #[arg(short, long, default_value_t = false)]
        force: bool,
        dir: PathBuf,
    },
    /// Rename files and folders to ASCII-safe, article-last names
    Clean {
        /// Unihan-style Mandarin reading table (file, or directory holding ccdict.txt)
        #[arg(long)]
        ccdict: Option<PathBuf>,
        /// Really rename rather than just showing what would be renamed
        #[arg(short, long, default_value_t = false)]
        force: bool,
        dir: PathBuf,
    },
    /// List the library's playlists with their track counts
    Playlists {
        /// Path to the library XML
        #[arg(short, long)]
        library: Option<PathBuf>,
    },
    /// Print the file paths of the tracks in a playlist
    Tracks {
        #[arg(default_value = "Library")]
        name: String,
        /// Path to the library XML
        #[arg(short, long)]
        library: Option<PathBuf>,
    },
    /// Collect a symlink farm out of a playlist and rsync it to a destination
    #[command(group(ArgGroup::new("target").required(true).multiple(true).args(["playlist", "dest"])))]
    Sync {
        /// Playlist to collect; without it the last collected farm is synced
        #[arg(short, long)]
        playlist: Option<String>,
        /// Directory the songs are written to; without it only symlinks are collected
        #[arg(short, long)]
        dest: Option<PathBuf>,
        /// Path to the library XML
        #[arg(short, long)]
        library: Option<PathBuf>,
        /// Directory where symlinks are collected
        #[arg(short, long)]
        temp_dir: Option<PathBuf>,
        /// File linked at the top of the farm so it plays first
        #[arg(long)]
        intro: Option<PathBuf>,
        /// Unihan-style Mandarin reading table used when cleaning paths
        #[arg(long)]
        ccdict: Option<PathBuf>,
        /// Group Artists and Compilations into letter ranges of this many entries (50 if no value)
        #[arg(short, long, num_args = 0..=1, default_missing_value = "50")]
        split: Option<usize>,
        /// Print the symlink tree before writing it
        #[arg(long, default_value_t = false)]
        print_tree: bool,
        /// Really sync rather than just showing what rsync would do
        #[arg(short, long, default_value_t = false)]
        force: bool,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_split() {
        let cli = Cli::try_parse_from(["mediashelf", "split", "--size", "40", "-f", "/music"]).unwrap();
        match cli.command {
            Commands::Split { size, force, dir } => {
                assert_eq!(size, 40);
                assert!(force);
                assert_eq!(dir, PathBuf::from("/music"));
            }
            _ => panic!("expected split"),
        }
    }

    #[test]
    fn test_sync_requires_playlist_or_dest() {
        assert!(Cli::try_parse_from(["mediashelf", "sync"]).is_err());
        assert!(Cli::try_parse_from(["mediashelf", "sync", "-p", "Car"]).is_ok());
        assert!(Cli::try_parse_from(["mediashelf", "sync", "-d", "/mnt/stick"]).is_ok());
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from(["mediashelf", "join", "/music", "--output", "json", "-q"]).unwrap();
        let config = LogConfig::from_cli(&cli);
        assert_eq!(config.output_format, OutputFormat::Json);
        assert!(config.quiet);
        assert!(!config.verbose);
    }

    #[test]
    fn test_sync_split_value_is_optional() {
        let cli = Cli::try_parse_from(["mediashelf", "sync", "-p", "Car", "--split"]).unwrap();
        match cli.command {
            Commands::Sync { split, force, .. } => {
                assert_eq!(split, Some(50));
                assert!(!force);
            }
            _ => panic!("expected sync"),
        }

        let cli = Cli::try_parse_from(["mediashelf", "sync", "-p", "Car", "--split", "20"]).unwrap();
        assert!(matches!(cli.command, Commands::Sync { split: Some(20), .. }));
    }

    #[test]
    fn test_tracks_defaults_to_library() {
        let cli = Cli::try_parse_from(["mediashelf", "tracks"]).unwrap();
        match cli.command {
            Commands::Tracks { name, library } => {
                assert_eq!(name, "Library");
                assert!(library.is_none());
            }
            _ => panic!("expected tracks"),
        }
    }
}
