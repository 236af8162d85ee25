use anyhow::Context;
use percent_encoding::percent_decode_str;
use serde::Deserialize;
use std::collections::{BTreeMap, HashMap};
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct Track {
    #[serde(rename = "Track ID")]
    pub id: u64,
    #[serde(rename = "Name")]
    pub name: Option<String>,
    #[serde(rename = "Artist")]
    pub artist: Option<String>,
    #[serde(rename = "Album")]
    pub album: Option<String>,
    #[serde(rename = "Genre")]
    pub genre: Option<String>,
    #[serde(rename = "Compilation", default)]
    pub compilation: bool,
    #[serde(rename = "Location")]
    pub location: Option<String>,
}

impl Track {
    /// Local path of the track, or None for streamed and missing files.
    pub fn file_path(&self) -> Option<String> {
        self.location.as_deref().and_then(file_string)
    }

    /// `Artist - Name (Album)`, with placeholders for missing tags.
    pub fn describe(&self) -> String {
        format!(
            "{} - {} ({})",
            self.artist.as_deref().unwrap_or("Unknown Artist"),
            self.name.as_deref().unwrap_or("Unknown Title"),
            self.album.as_deref().unwrap_or("Unknown Album")
        )
    }

    pub fn is_classical(&self) -> bool {
        self.genre
            .as_deref()
            .map(|g| g.eq_ignore_ascii_case("classical"))
            .unwrap_or(false)
    }
}

#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct PlaylistItem {
    #[serde(rename = "Track ID")]
    pub track_id: u64,
}

#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct Playlist {
    #[serde(rename = "Name")]
    pub name: String,
    #[serde(rename = "Playlist Items", default)]
    pub items: Vec<PlaylistItem>,
}

impl Playlist {
    pub fn len(&self) -> usize {
        self.items.len()
    }
}

#[derive(Deserialize)]
struct LibraryFile {
    #[serde(rename = "Music Folder")]
    music_folder: Option<String>,
    #[serde(rename = "Tracks", default)]
    tracks: HashMap<String, Track>,
    #[serde(rename = "Playlists", default)]
    playlists: Vec<Playlist>,
}

#[derive(Debug)]
pub struct Library {
    /// Decoded local path of the media folder, usually with a trailing slash.
    pub music_folder: Option<String>,
    tracks: HashMap<u64, Track>,
    playlists: BTreeMap<String, Playlist>,
}

impl Library {
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let file = File::open(path).with_context(|| format!("opening library {}", path.display()))?;
        Self::from_xml_reader(BufReader::new(file))
            .with_context(|| format!("reading library {}", path.display()))
    }

    pub fn from_xml_reader<R: Read>(reader: R) -> anyhow::Result<Self> {
        let file: LibraryFile = plist::from_reader_xml(reader).context("parsing library XML")?;
        Ok(Self::from_file(file))
    }

    fn from_file(file: LibraryFile) -> Self {
        // Later playlists with the same name replace earlier ones.
        let playlists = file
            .playlists
            .into_iter()
            .map(|p| (p.name.clone(), p))
            .collect();
        let tracks = file
            .tracks
            .into_values()
            .map(|t| (t.id, t))
            .collect();

        Self {
            music_folder: file.music_folder.as_deref().and_then(file_string),
            tracks,
            playlists,
        }
    }

    pub fn track(&self, id: u64) -> Option<&Track> {
        self.tracks.get(&id)
    }

    pub fn track_count(&self) -> usize {
        self.tracks.len()
    }

    pub fn playlist(&self, name: &str) -> Option<&Playlist> {
        self.playlists.get(name)
    }

    /// All playlists, sorted by name.
    pub fn playlists(&self) -> impl Iterator<Item = &Playlist> {
        self.playlists.values()
    }

    /// Tracks of a playlist in playlist order; ids missing from the library are skipped.
    pub fn playlist_tracks<'a>(&'a self, playlist: &'a Playlist) -> impl Iterator<Item = &'a Track> + 'a {
        playlist.items.iter().filter_map(|item| self.track(item.track_id))
    }
}

/// Decode a `file://` location URL into a path; other schemes give None.
pub fn file_string(location: &str) -> Option<String> {
    let decoded = percent_decode_str(location).decode_utf8_lossy();
    let rest = decoded.strip_prefix("file://")?;
    Some(rest.strip_prefix("localhost").unwrap_or(rest).to_string())
}
