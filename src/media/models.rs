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


//! Host-facing item types
//!
//! These are what the media host renders and hands back to the extension:
//! tracks, playlists, shelves, radios, users and streamables. They carry a
//! string `extras` map the host persists opaquely, which the extension uses
//! to stash its own state (cookie, radio offsets, video flag).

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Opaque per-item key/value state owned by the extension
pub type Extras = BTreeMap<String, String>;

/// Extras key marking a track as video
pub const VIDEO_EXTRA_KEY: &str = "isVideo";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Artist {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Album {
    pub id: String,
    pub title: String,
}

/// How the host plays a track: it asks the extension to resolve `id`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Streamable {
    pub id: String,
    pub quality: i32,
    pub title: Option<String>,
    #[serde(default)]
    pub extras: Extras,
}

impl Streamable {
    /// A streamable resolved by the extension at play time
    pub fn server(id: impl Into<String>, quality: i32, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            quality,
            title: Some(title.into()),
            extras: Extras::new(),
        }
    }
}

/// A GET request the host performs itself to fetch media bytes
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkRequest {
    pub url: String,
    #[serde(default)]
    pub headers: BTreeMap<String, String>,
}

/// Result of resolving a [`Streamable`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StreamableMedia {
    Http { request: NetworkRequest },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Track {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub artists: Vec<Artist>,
    #[serde(default)]
    pub album: Option<Album>,
    #[serde(default)]
    pub cover: Option<String>,
    /// Release year from overlay metadata
    #[serde(default)]
    pub release_year: Option<i32>,
    #[serde(default)]
    pub track_number: Option<u32>,
    /// Duration in milliseconds
    #[serde(default)]
    pub duration: Option<u64>,
    #[serde(default)]
    pub genres: Vec<String>,
    #[serde(default)]
    pub streamables: Vec<Streamable>,
    #[serde(default)]
    pub extras: Extras,
}

impl Track {
    pub fn is_video(&self) -> bool {
        self.extras.get(VIDEO_EXTRA_KEY).map(|v| v == "true").unwrap_or(false)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Playlist {
    pub id: String,
    pub title: String,
    pub is_editable: bool,
    #[serde(default)]
    pub cover: Option<String>,
    #[serde(default)]
    pub track_count: Option<u64>,
    #[serde(default)]
    pub extras: Extras,
}

/// Anything the host can start a radio from
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum MediaItem {
    Track(Track),
    Playlist(Playlist),
}

impl MediaItem {
    pub fn id(&self) -> &str {
        match self {
            MediaItem::Track(t) => &t.id,
            MediaItem::Playlist(p) => &p.id,
        }
    }

    pub fn title(&self) -> &str {
        match self {
            MediaItem::Track(t) => &t.title,
            MediaItem::Playlist(p) => &p.title,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Radio {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub extras: Extras,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub cover: Option<String>,
    #[serde(default)]
    pub extras: Extras,
}

/// Contents of a shelf
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "list", rename_all = "snake_case")]
pub enum ShelfItems {
    Playlists(Vec<Playlist>),
    Tracks(Vec<Track>),
}

impl ShelfItems {
    pub fn len(&self) -> usize {
        match self {
            ShelfItems::Playlists(p) => p.len(),
            ShelfItems::Tracks(t) => t.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// A labelled row in a feed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Shelf {
    pub id: String,
    pub title: String,
    pub subtitle: Option<String>,
    pub items: ShelfItems,
}

/// Ordered shelves of one screen
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Feed {
    pub shelves: Vec<Shelf>,
}

impl Feed {
    pub fn new(shelves: Vec<Shelf>) -> Self {
        Self { shelves }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.shelves.is_empty()
    }

    pub fn shelf(&self, id: &str) -> Option<&Shelf> {
        self.shelves.iter().find(|s| s.id == id)
    }
}
