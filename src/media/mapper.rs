// GDrive Music - Google Drive music library client
// Copyright (C) 2025 GDrive Music contributors
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
// GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License
// along with this program. If not, see <https://www.gnu.org/licenses/>.


//! Mapping of Drive files to host items
//!
//! Every listed file is exactly one of:
//! - a folder, which becomes a [`Playlist`]
//! - an audio/video file, which becomes a [`Track`]
//! - anything else, which is dropped
//!
//! Mapping is pure. Overlay metadata is passed in as a lookup table.

use crate::api::models::RemoteFile;
use crate::media::files::{self, MediaKind};
use crate::media::metadata::MetadataEntry;
use crate::media::models::{Album, Artist, Extras, Playlist, Track, VIDEO_EXTRA_KEY};
use std::collections::HashMap;

/// Overlay lookup table keyed by file id
pub type Overlay = HashMap<String, MetadataEntry>;

/// How a listed file is presented
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileClass {
    Playlist,
    Track,
    Hidden,
}

/// Folder MIME wins over any extension
pub fn classify(file: &RemoteFile) -> FileClass {
    if file.is_folder() {
        FileClass::Playlist
    } else if files::is_media_file(&file.title) {
        FileClass::Track
    } else {
        FileClass::Hidden
    }
}

/// Split a listing into (folders, non-folders), keeping order
pub fn partition_files(items: &[RemoteFile]) -> (Vec<&RemoteFile>, Vec<&RemoteFile>) {
    items.iter().partition(|f| f.is_folder())
}

pub fn to_playlist(file: &RemoteFile) -> Playlist {
    Playlist {
        id: file.id.clone(),
        title: file.title.clone(),
        is_editable: false,
        cover: Some(files::thumbnail_url(&file.id)),
        track_count: None,
        extras: Extras::new(),
    }
}

/// Map one media file; callers filter non-media files first
pub fn to_track(file: &RemoteFile, overlay: Option<&MetadataEntry>) -> Track {
    let title = overlay
        .and_then(|m| non_empty(&m.title))
        .unwrap_or_else(|| files::clean_title(&file.title));

    let cover = overlay
        .and_then(|m| non_empty(&m.album_art))
        .unwrap_or_else(|| files::thumbnail_url(&file.id));

    let artists = overlay
        .and_then(|m| non_empty(&m.artist))
        .map(|name| {
            vec![Artist {
                id: name.clone(),
                name,
            }]
        })
        .unwrap_or_default();

    let album = overlay.and_then(|m| non_empty(&m.album)).map(|title| Album {
        id: title.clone(),
        title,
    });

    let genre = overlay.and_then(|m| non_empty(&m.genre));
    let release_year = overlay.and_then(|m| m.year);
    let track_number = overlay.and_then(|m| m.track_number);

    let mut extras = Extras::new();
    if files::media_kind(&file.title) == MediaKind::Video {
        extras.insert(VIDEO_EXTRA_KEY.to_string(), "true".to_string());
    }
    if let Some(genre) = &genre {
        extras.insert("genre".to_string(), genre.clone());
    }
    if let Some(year) = release_year {
        extras.insert("year".to_string(), year.to_string());
    }
    if let Some(n) = track_number {
        extras.insert("trackNumber".to_string(), n.to_string());
    }

    Track {
        id: file.id.clone(),
        title,
        artists,
        album,
        cover: Some(cover),
        release_year,
        track_number,
        // out-of-range durations are dropped rather than wrapped
        duration: overlay.and_then(|m| m.duration).and_then(|secs| secs.checked_mul(1000)),
        genres: genre.into_iter().collect(),
        streamables: Vec::new(),
        extras,
    }
}

/// Media files of a listing as tracks, in listing order
pub fn to_tracks<'a, I>(items: I, overlay: &Overlay) -> Vec<Track>
where
    I: IntoIterator<Item = &'a RemoteFile>,
{
    items
        .into_iter()
        .filter(|f| classify(f) == FileClass::Track)
        .map(|f| to_track(f, overlay.get(&f.id)))
        .collect()
}

pub fn to_playlists<'a, I>(items: I) -> Vec<Playlist>
where
    I: IntoIterator<Item = &'a RemoteFile>,
{
    items
        .into_iter()
        .filter(|f| f.is_folder())
        .map(to_playlist)
        .collect()
}

/// Partition and map a listing in one go
pub fn map_listing(items: &[RemoteFile], overlay: &Overlay) -> (Vec<Playlist>, Vec<Track>) {
    let (folders, others) = partition_files(items);
    (to_playlists(folders), to_tracks(others, overlay))
}

/// Number of listed files that would become tracks
pub fn count_media(items: &[RemoteFile]) -> u64 {
    items.iter().filter(|f| classify(f) == FileClass::Track).count() as u64
}

fn non_empty(value: &Option<String>) -> Option<String> {
    value.as_ref().filter(|s| !s.trim().is_empty()).cloned()
}
