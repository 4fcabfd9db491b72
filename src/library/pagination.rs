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


//! Paged playlist contents and counts
//!
//! Two bounded LRU caches keyed by playlist (folder) id:
//! - the lazy track sequence of the folder, paged by Drive's page token
//! - the number of media files in the folder, counted over every page
//!
//! Entries stay until evicted by capacity or dropped with [`PaginationManager::invalidate`].
//! Concurrent misses on the same id may both fetch; the last writer wins.
//!
//! Drive has no random access into a listing, so an offset load walks
//! pages from the start every time.

use crate::api::client::DriveClient;
use crate::error::Result;
use crate::library::cache::LruCache;
use crate::library::folders::folder_children_query;
use crate::media::mapper;
use crate::media::metadata::MetadataStore;
use crate::media::models::Track;
use crate::paging::{Page, PageSource, PagedData};
use async_trait::async_trait;
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::debug;

/// Tracks of one folder, one Drive page per sequence page
#[derive(Debug, Clone)]
pub struct FolderTrackSource {
    client: DriveClient,
    metadata: Arc<MetadataStore>,
    folder_id: String,
}

impl FolderTrackSource {
    pub fn new(client: DriveClient, metadata: Arc<MetadataStore>, folder_id: impl Into<String>) -> Self {
        Self {
            client,
            metadata,
            folder_id: folder_id.into(),
        }
    }
}

#[async_trait]
impl PageSource<Track> for FolderTrackSource {
    async fn load_page(&self, continuation: Option<String>) -> Result<Page<Track>> {
        let listing = self
            .client
            .search(&folder_children_query(&self.folder_id), continuation.as_deref())
            .await?;
        let overlay = self.metadata.snapshot();
        let tracks = mapper::to_tracks(&listing.items, &overlay);
        Ok(Page::new(tracks, listing.next_page_token))
    }
}

#[derive(Debug)]
pub struct PaginationManager {
    client: DriveClient,
    metadata: Arc<MetadataStore>,
    tracks: Mutex<LruCache<String, PagedData<Track>>>,
    counts: Mutex<LruCache<String, u64>>,
}

impl PaginationManager {
    pub fn new(client: DriveClient, metadata: Arc<MetadataStore>) -> Self {
        let capacity = client.config().cache_capacity;
        Self {
            client,
            metadata,
            tracks: Mutex::new(LruCache::new(capacity)),
            counts: Mutex::new(LruCache::new(capacity)),
        }
    }

    /// Cached lazy track sequence for a folder; creating one fetches nothing
    pub fn get_or_create_paged_tracks(&self, folder_id: &str) -> PagedData<Track> {
        let mut cache = lock(&self.tracks);
        let key = folder_id.to_string();
        if let Some(paged) = cache.get(&key) {
            return paged.clone();
        }

        let paged = PagedData::continuous(FolderTrackSource::new(
            self.client.clone(),
            self.metadata.clone(),
            folder_id,
        ));
        if let Some((evicted, _)) = cache.put(key, paged.clone()) {
            debug!("Evicted track sequence for {}", evicted);
        }
        paged
    }

    /// Number of audio/video files in a folder, counted once and cached
    pub async fn get_or_count_tracks(&self, folder_id: &str) -> Result<u64> {
        let key = folder_id.to_string();
        let cached = lock(&self.counts).get(&key).copied();
        if let Some(count) = cached {
            return Ok(count);
        }

        let query = folder_children_query(folder_id);
        let mut total = 0u64;
        let mut page_token: Option<String> = None;
        loop {
            let listing = self.client.search(&query, page_token.as_deref()).await?;
            total += mapper::count_media(&listing.items);
            match listing.next_page_token {
                Some(next) => page_token = Some(next),
                None => break,
            }
        }

        debug!("Folder {} holds {} media files", folder_id, total);
        lock(&self.counts).put(key, total);
        Ok(total)
    }

    /// Tracks `offset..offset + limit` of a folder, in listing order
    pub async fn load_tracks_with_offset(&self, folder_id: &str, offset: usize, limit: usize) -> Result<Vec<Track>> {
        if limit == 0 {
            return Ok(Vec::new());
        }

        let paged = self.get_or_create_paged_tracks(folder_id);
        let mut skipped = 0usize;
        let mut collected = Vec::with_capacity(limit);
        let mut continuation = None;

        loop {
            let page = paged.load_page(continuation).await?;
            for track in page.items {
                if skipped < offset {
                    skipped += 1;
                    continue;
                }
                collected.push(track);
                if collected.len() == limit {
                    return Ok(collected);
                }
            }
            match page.continuation {
                Some(next) => continuation = Some(next),
                None => return Ok(collected),
            }
        }
    }

    /// Forget both cached entries for a folder
    pub fn invalidate(&self, folder_id: &str) {
        let key = folder_id.to_string();
        lock(&self.tracks).remove(&key);
        lock(&self.counts).remove(&key);
    }

    pub fn clear(&self) {
        lock(&self.tracks).clear();
        lock(&self.counts).clear();
    }

    pub fn is_cached(&self, folder_id: &str) -> (bool, bool) {
        let key = folder_id.to_string();
        (lock(&self.tracks).contains(&key), lock(&self.counts).contains(&key))
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}
