mod cleaner;
mod cli;
mod config;
mod file_utils;
mod library;
mod logger;
mod partition;
mod splitter;
mod symlink_tree;
mod sync;
mod translit;

use crate::{
    cleaner::FilenameCleaner,
    cli::{Cli, Commands, LogConfig},
    config::{Config, Overrides},
    library::Library,
    logger::Logger,
    symlink_tree::SymlinkTree,
    translit::CharacterTranslator,
};
use clap::Parser;
use std::path::Path;
use std::process::ExitCode;

fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();
    let logger = Logger::new(LogConfig::from_cli(&cli));

    match cli.command {
        Commands::Split { size, force, dir } => {
            if !dir.is_dir() {
                logger.error(&format!("Must be a directory: {}", dir.display()));
                return Ok(ExitCode::FAILURE);
            }
            let summary = splitter::split_directory(&dir, size, !force, &logger)?;
            splitter::report_summary(&summary, &logger);
            finish(force, &logger);
        }

        Commands::Join { force, dir } => {
            if !dir.is_dir() {
                logger.error(&format!("Must be a directory: {}", dir.display()));
                return Ok(ExitCode::FAILURE);
            }
            splitter::flatten_directory(&dir, !force, &logger)?;
            if force {
                let count = splitter::entry_count(&dir)?;
                logger.success(&format!("{} now holds {} entries", dir.display(), count));
            }
            finish(force, &logger);
        }

        Commands::Clean { ccdict, force, dir } => {
            if !dir.is_dir() {
                logger.error(&format!("Must be a directory: {}", dir.display()));
                return Ok(ExitCode::FAILURE);
            }
            let config = Config::load(Overrides {
                ccdict,
                ..Default::default()
            });
            let cleaner = make_cleaner(config.ccdict.as_deref(), &logger)?;
            let renamed = cleaner.recursive_clean(&dir, !force, &logger)?;
            if force {
                logger.success(&format!("Renamed {} entries", renamed));
            } else {
                logger.success(&format!("{} entries would be renamed", renamed));
            }
            finish(force, &logger);
        }

        Commands::Playlists { library } => {
            let config = Config::load(Overrides {
                library_xml: library,
                ..Default::default()
            });
            let itunes = load_library(&config.library_xml, &logger)?;
            logger.info(&format!(
                "Music Folder: {}",
                itunes.music_folder.as_deref().unwrap_or("(none)")
            ));
            let playlists: Vec<_> = itunes.playlists().collect();
            logger.info(&format!("[{} playlists]", playlists.len()));
            for playlist in playlists {
                println!("{} ({} tracks)", playlist.name, playlist.len());
            }
        }

        Commands::Tracks { name, library } => {
            let config = Config::load(Overrides {
                library_xml: library,
                ..Default::default()
            });
            let itunes = load_library(&config.library_xml, &logger)?;
            let Some(playlist) = itunes.playlist(&name) else {
                logger.error(&format!("No such playlist: '{}'", name));
                return Ok(ExitCode::FAILURE);
            };
            for track in itunes.playlist_tracks(playlist) {
                match track.file_path() {
                    Some(path) => println!("{}", path),
                    None => logger.debug(&format!("No local file for {}", track.describe())),
                }
            }
        }

        Commands::Sync {
            playlist,
            dest,
            library,
            temp_dir,
            intro,
            ccdict,
            split,
            print_tree,
            force,
        } => {
            if let Some(dest) = &dest {
                if !dest.is_dir() {
                    logger.error(&format!("Destination must be a directory: {}", dest.display()));
                    return Ok(ExitCode::FAILURE);
                }
            }

            let config = Config::load(Overrides {
                library_xml: library,
                staging_dir: temp_dir,
                intro_file: intro,
                ccdict,
            });

            if let Some(name) = &playlist {
                let itunes = load_library(&config.library_xml, &logger)?;
                let Some(list) = itunes.playlist(name) else {
                    logger.error(&format!("No such playlist: '{}'", name));
                    return Ok(ExitCode::FAILURE);
                };

                sync::delete_directory_contents(&config.staging_dir, &logger)?;
                sync::link_intro(&config.staging_dir, &config.intro_file, &logger)?;

                logger.progress("Calculating symlinks");
                let cleaner = make_cleaner(config.ccdict.as_deref(), &logger)?;
                let mut tree = SymlinkTree::build(
                    itunes.playlist_tracks(list),
                    itunes.music_folder.as_deref(),
                    &cleaner,
                    &logger,
                );
                if let Some(size) = split {
                    tree.split_children(&symlink_tree::SPLIT_FOLDERS, size)?;
                }
                logger.info(&format!("{} tracks to link", tree.link_count()));
                if print_tree {
                    print!("{}", tree.render());
                }

                let linked = tree.make_symlinks(&config.staging_dir, &logger)?;
                logger.success(&format!(
                    "Collected {} of {} tracks from '{}' in {}",
                    linked,
                    list.len(),
                    name,
                    config.staging_dir.display()
                ));
            }

            if let Some(dest) = &dest {
                if !sync::check_rsync_available(&config.rsync) {
                    logger.warn(&format!("{} does not look runnable", config.rsync.display()));
                }
                sync::sync_files(&config.rsync, &config.staging_dir, dest, !force, &logger)?;
                finish(force, &logger);
            }
        }
    }

    Ok(ExitCode::SUCCESS)
}

fn finish(force: bool, logger: &Logger) {
    if !force {
        logger.info("Pass -f to do it for real");
    }
}

fn load_library(path: &Path, logger: &Logger) -> anyhow::Result<Library> {
    logger.progress(&format!("Reading library data from {}", path.display()));
    let library = Library::load(path)?;
    logger.debug(&format!(
        "{} tracks, {} playlists",
        library.track_count(),
        library.playlists().count()
    ));
    Ok(library)
}

fn make_cleaner(ccdict: Option<&Path>, logger: &Logger) -> anyhow::Result<FilenameCleaner> {
    let translator = match ccdict {
        Some(path) => {
            logger.progress(&format!("Loading Mandarin translations from {}", path.display()));
            CharacterTranslator::with_ccdict(path)?
        }
        None => CharacterTranslator::new(),
    };
    FilenameCleaner::new(translator)
}
