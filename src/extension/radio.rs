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


//! Radio over a playlist folder
//!
//! A radio carries all of its state in its extras, so the host can persist
//! it and hand it back later:
//!
//! | key             | meaning                                  |
//! |-----------------|------------------------------------------|
//! | `sourceType`    | `playlist` for folder radios             |
//! | `sourceId`      | playlist the radio was started from      |
//! | `folderId`      | folder whose tracks are played           |
//! | `currentOffset` | index of the first track                 |
//! | `batchSize`     | tracks per page                          |
//! | `tracks`        | inline track list (radios without folder) |
//!
//! Folder radios page through the folder by offset and stop at the first
//! empty batch.

use crate::api::multipart;
use crate::error::Result;
use crate::library::pagination::PaginationManager;
use crate::media::models::{Extras, MediaItem, Playlist, Radio, Track};
use crate::paging::{Page, PageSource, PagedData};
use async_trait::async_trait;
use std::sync::Arc;
use tracing::debug;

pub const SOURCE_TYPE_KEY: &str = "sourceType";
pub const SOURCE_ID_KEY: &str = "sourceId";
pub const FOLDER_ID_KEY: &str = "folderId";
pub const CURRENT_OFFSET_KEY: &str = "currentOffset";
pub const BATCH_SIZE_KEY: &str = "batchSize";
pub const TRACKS_KEY: &str = "tracks";

/// Where a radio's tracks come from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RadioSource {
    Inline(Vec<Track>),
    Folder {
        folder_id: String,
        offset: usize,
        batch_size: usize,
    },
}

/// Folder tracks by offset; the continuation is the next offset
struct OffsetTrackSource {
    pagination: Arc<PaginationManager>,
    folder_id: String,
    initial_offset: usize,
    batch_size: usize,
}

#[async_trait]
impl PageSource<Track> for OffsetTrackSource {
    async fn load_page(&self, continuation: Option<String>) -> Result<Page<Track>> {
        let offset = continuation
            .and_then(|c| c.parse::<usize>().ok())
            .unwrap_or(self.initial_offset);

        let batch = self
            .pagination
            .load_tracks_with_offset(&self.folder_id, offset, self.batch_size)
            .await?;

        let next = if batch.is_empty() {
            None
        } else {
            Some((offset + batch.len()).to_string())
        };
        Ok(Page::new(batch, next))
    }
}

#[derive(Debug, Clone)]
pub struct RadioService {
    pagination: Arc<PaginationManager>,
    batch_size: usize,
}

impl RadioService {
    pub fn new(pagination: Arc<PaginationManager>, batch_size: usize) -> Self {
        Self {
            pagination,
            batch_size: batch_size.max(1),
        }
    }

    /// Describe a radio for `item`; nothing is fetched
    ///
    /// The radio always starts at the top of the playlist, whatever track
    /// `context` points at.
    pub fn create_radio(&self, item: &MediaItem, _context: Option<&MediaItem>) -> Result<Radio> {
        match item {
            MediaItem::Playlist(playlist) => Ok(self.playlist_radio(playlist)),
            MediaItem::Track(_) => empty_radio(),
        }
    }

    fn playlist_radio(&self, playlist: &Playlist) -> Radio {
        let mut extras = Extras::new();
        extras.insert(SOURCE_TYPE_KEY.to_string(), "playlist".to_string());
        extras.insert(SOURCE_ID_KEY.to_string(), playlist.id.clone());
        extras.insert(FOLDER_ID_KEY.to_string(), playlist.id.clone());
        extras.insert(CURRENT_OFFSET_KEY.to_string(), "0".to_string());
        extras.insert(BATCH_SIZE_KEY.to_string(), self.batch_size.to_string());

        Radio {
            id: format!("radio_playlist_{}_{}", playlist.id, now_millis()),
            title: format!("{} Radio", playlist.title),
            extras,
        }
    }

    /// Track sequence of a radio previously built by [`Self::create_radio`]
    pub fn load_radio_tracks(&self, radio: &Radio) -> Result<PagedData<Track>> {
        match radio_source(radio, self.batch_size)? {
            RadioSource::Inline(tracks) => Ok(PagedData::single(tracks)),
            RadioSource::Folder {
                folder_id,
                offset,
                batch_size,
            } => {
                debug!("Radio {} over folder {} from offset {}", radio.id, folder_id, offset);
                Ok(PagedData::continuous(OffsetTrackSource {
                    pagination: self.pagination.clone(),
                    folder_id,
                    initial_offset: offset,
                    batch_size,
                }))
            }
        }
    }
}

/// Radio with an inline, empty track list
pub fn empty_radio() -> Result<Radio> {
    let mut extras = Extras::new();
    extras.insert(TRACKS_KEY.to_string(), multipart::encode(&Vec::<Track>::new())?);
    Ok(Radio {
        id: format!("empty_{}", now_millis()),
        title: "Radio".to_string(),
        extras,
    })
}

/// Read a radio's source back from its extras
pub fn radio_source(radio: &Radio, default_batch_size: usize) -> Result<RadioSource> {
    let Some(folder_id) = radio.extras.get(FOLDER_ID_KEY) else {
        let tracks = match radio.extras.get(TRACKS_KEY) {
            Some(json) => multipart::decode::<Vec<Track>>(json)?,
            None => Vec::new(),
        };
        return Ok(RadioSource::Inline(tracks));
    };

    let offset = radio
        .extras
        .get(CURRENT_OFFSET_KEY)
        .and_then(|v| v.parse().ok())
        .unwrap_or(0);
    let batch_size = radio
        .extras
        .get(BATCH_SIZE_KEY)
        .and_then(|v| v.parse().ok())
        .filter(|n: &usize| *n > 0)
        .unwrap_or(default_batch_size);

    Ok(RadioSource::Folder {
        folder_id: folder_id.clone(),
        offset,
        batch_size,
    })
}

fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}
