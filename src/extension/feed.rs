//! Shelf grouping for the home and search screens
//!
//! Empty groups never produce a shelf.

use crate::media::models::{Feed, Playlist, Shelf, ShelfItems, Track};

/// Home feed of one folder: its sub-folders, then its loose tracks
pub fn build_library_feed(playlists: Vec<Playlist>, tracks: Vec<Track>, folder_id: &str) -> Feed {
    let mut shelves = Vec::new();

    if !playlists.is_empty() {
        shelves.push(Shelf {
            id: format!("{}_playlists", folder_id),
            title: "Playlists".to_string(),
            subtitle: Some(format!("{} playlists", playlists.len())),
            items: ShelfItems::Playlists(playlists),
        });
    }

    if !tracks.is_empty() {
        shelves.push(Shelf {
            id: format!("{}_singles", folder_id),
            title: "Singles".to_string(),
            subtitle: Some(format!("{} tracks", tracks.len())),
            items: ShelfItems::Tracks(tracks),
        });
    }

    Feed::new(shelves)
}

/// Search results: tracks first
pub fn build_search_feed(tracks: Vec<Track>, playlists: Vec<Playlist>) -> Feed {
    let mut shelves = Vec::new();

    if !tracks.is_empty() {
        shelves.push(Shelf {
            id: "search_tracks".to_string(),
            title: "Tracks".to_string(),
            subtitle: None,
            items: ShelfItems::Tracks(tracks),
        });
    }

    if !playlists.is_empty() {
        shelves.push(Shelf {
            id: "search_playlists".to_string(),
            title: "Playlists".to_string(),
            subtitle: None,
            items: ShelfItems::Playlists(playlists),
        });
    }

    Feed::new(shelves)
}
