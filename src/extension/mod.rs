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


//! The Google Drive music extension
//!
//! [`DriveExtension`] owns one session and wires every component to it:
//!
//! ```text
//! SessionStore ─┬─ DriveClient ─┬─ FolderRepository     (home, search)
//!               │               ├─ PaginationManager    (playlists) ─ RadioService
//!               │               └─ StreamingResolver    (playback)
//! MetadataStore ┘ (overlay, loaded from the settings URL)
//! ```
//!
//! # Example
//!
//! ```rust,no_run
//! use gdrive_music::config::DriveConfig;
//! use gdrive_music::extension::host::{HomeFeedClient, LoginClient};
//! use gdrive_music::extension::DriveExtension;
//!
//! # async fn example() -> gdrive_music::Result<()> {
//! let extension = DriveExtension::new(DriveConfig::default())?;
//! extension.on_login_cookie("https://drive.google.com/drive/my-drive", "SAPISID=...").await?;
//!
//! for shelf in extension.load_home_feed().await?.shelves {
//!     println!("{} ({} items)", shelf.title, shelf.items.len());
//! }
//! # Ok(())
//! # }
//! ```

pub mod feed;
pub mod host;
pub mod radio;

use crate::api::auth::SessionStore;
use crate::api::client::DriveClient;
use crate::api::transport::{HttpTransport, ReqwestTransport};
use crate::config::{self, DriveConfig, ExtensionSettings, MetadataSource, SettingItem};
use crate::download::stream::StreamingResolver;
use crate::error::{DriveError, Result};
use crate::library::folders::FolderRepository;
use crate::library::pagination::PaginationManager;
use crate::media::mapper;
use crate::media::metadata::MetadataStore;
use crate::media::models::{Feed, MediaItem, Playlist, Radio, Streamable, StreamableMedia, Track, User};
use crate::paging::PagedData;
use async_trait::async_trait;
use host::{
    ExtensionClient, HomeFeedClient, LibraryFeedClient, LoginClient, PlaylistClient, RadioClient,
    SearchFeedClient, TrackClient, WebViewLoginRequest,
};
use radio::RadioService;
use std::sync::{Arc, RwLock};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// Google sign-in, continuing to Drive
pub const LOGIN_URL: &str = "https://accounts.google.com/ServiceLogin?service=wise&continue=https://drive.google.com/";

/// Reached once sign-in has completed
pub const LOGIN_STOP_URL_REGEX: &str = r"https://drive\.google\.com/(drive|u)";

/// Title of the single streamable every track gets
pub const STREAMABLE_TITLE: &str = "Google Drive";

#[derive(Debug)]
pub struct DriveExtension {
    config: DriveConfig,
    transport: Arc<dyn HttpTransport>,
    session: Arc<SessionStore>,
    metadata: Arc<MetadataStore>,
    folders: FolderRepository,
    pagination: Arc<PaginationManager>,
    radio: RadioService,
    streaming: StreamingResolver,
    settings: RwLock<ExtensionSettings>,
}

impl DriveExtension {
    /// Extension talking to Drive over reqwest
    pub fn new(config: DriveConfig) -> Result<Self> {
        config.validate()?;
        let transport = ReqwestTransport::new(&config)?;
        Ok(Self::with_transport(config, Arc::new(transport)))
    }

    pub fn with_transport(config: DriveConfig, transport: Arc<dyn HttpTransport>) -> Self {
        let session = Arc::new(SessionStore::new());
        let metadata = Arc::new(MetadataStore::new());
        let client = DriveClient::new(transport.clone(), session.clone(), config.clone());
        let pagination = Arc::new(PaginationManager::new(client.clone(), metadata.clone()));

        Self {
            radio: RadioService::new(pagination.clone(), config.radio_batch_size),
            streaming: StreamingResolver::new(transport.clone(), config.clone()),
            folders: FolderRepository::new(client),
            pagination,
            metadata,
            session,
            transport,
            config,
            settings: RwLock::new(ExtensionSettings::new()),
        }
    }

    pub fn config(&self) -> &DriveConfig {
        &self.config
    }

    pub fn session(&self) -> &Arc<SessionStore> {
        &self.session
    }

    pub fn metadata(&self) -> &Arc<MetadataStore> {
        &self.metadata
    }

    pub fn pagination(&self) -> &Arc<PaginationManager> {
        &self.pagination
    }

    pub fn settings(&self) -> ExtensionSettings {
        self.settings
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    /// Store settings and start loading overlay metadata in the background.
    ///
    /// Returns the loader task, if one was started. Without a tokio runtime
    /// the metadata is not loaded.
    pub fn apply_settings(&self, settings: ExtensionSettings) -> Option<JoinHandle<()>> {
        let source = settings.metadata_source();
        *self.settings.write().unwrap_or_else(|poisoned| poisoned.into_inner()) = settings;

        let url = match source {
            Some(MetadataSource::Url(url)) => url,
            Some(other) => {
                debug!("Ignoring unsupported metadata source {:?}", other);
                return None;
            }
            None => return None,
        };

        let handle = match tokio::runtime::Handle::try_current() {
            Ok(handle) => handle,
            Err(_) => {
                warn!("No async runtime; custom metadata not loaded");
                return None;
            }
        };

        let transport = self.transport.clone();
        let metadata = self.metadata.clone();
        Some(handle.spawn(async move {
            if let Err(e) = metadata.load_from_url(transport.as_ref(), &url).await {
                debug!("Custom metadata unavailable: {}", e);
            }
        }))
    }

    /// Shelves of one folder's first page
    pub async fn load_folder_feed(&self, folder_id: &str) -> Result<Feed> {
        let items = self.folders.list_folder(folder_id).await?;
        let (playlists, tracks) = mapper::map_listing(&items, &self.metadata.snapshot());
        Ok(feed::build_library_feed(playlists, tracks, folder_id))
    }

    fn forget_library(&self) {
        self.pagination.clear();
    }
}

#[async_trait]
impl ExtensionClient for DriveExtension {
    fn setting_items(&self) -> Vec<SettingItem> {
        config::setting_items()
    }

    fn set_settings(&self, settings: ExtensionSettings) {
        self.apply_settings(settings);
    }
}

#[async_trait]
impl LoginClient for DriveExtension {
    fn webview_request(&self) -> WebViewLoginRequest {
        WebViewLoginRequest {
            initial_url: LOGIN_URL.to_string(),
            stop_url_regex: LOGIN_STOP_URL_REGEX.to_string(),
            dont_cache: true,
        }
    }

    async fn on_login_cookie(&self, _stop_url: &str, cookie: &str) -> Result<Vec<User>> {
        match self.session.validate_and_store(cookie) {
            Ok(user) => {
                self.forget_library();
                Ok(vec![user])
            }
            Err(e) => {
                warn!("Login verification failed: {}", e);
                self.session.clear();
                Err(e)
            }
        }
    }

    fn set_login_user(&self, user: Option<&User>) {
        match user {
            Some(user) => self.session.restore(user),
            None => self.session.clear(),
        }
        self.forget_library();
    }

    async fn current_user(&self) -> Result<Option<User>> {
        Ok(self.session.current_user())
    }
}

#[async_trait]
impl HomeFeedClient for DriveExtension {
    async fn load_home_feed(&self) -> Result<Feed> {
        let folder_id = self.folders.resolve_music_folder_id().await?;
        self.load_folder_feed(&folder_id).await
    }
}

#[async_trait]
impl LibraryFeedClient for DriveExtension {
    async fn load_library_feed(&self) -> Result<Feed> {
        Ok(Feed::empty())
    }
}

#[async_trait]
impl SearchFeedClient for DriveExtension {
    async fn load_search_feed(&self, query: &str) -> Result<Feed> {
        if query.trim().is_empty() {
            return self.load_home_feed().await;
        }

        let folder_id = self.folders.resolve_music_folder_id().await?;
        let items = self.folders.search_in_folder(&folder_id, query).await?;
        let (playlists, tracks) = mapper::map_listing(&items, &self.metadata.snapshot());
        info!("Search found {} tracks, {} playlists", tracks.len(), playlists.len());
        Ok(feed::build_search_feed(tracks, playlists))
    }
}

#[async_trait]
impl TrackClient for DriveExtension {
    async fn load_track(&self, mut track: Track, _is_download: bool) -> Result<Track> {
        track.streamables = vec![Streamable::server(track.id.clone(), 0, STREAMABLE_TITLE)];
        Ok(track)
    }

    async fn load_streamable_media(&self, streamable: &Streamable, _is_download: bool) -> Result<StreamableMedia> {
        let cookie = self.session.cookie()?;
        self.streaming.resolve_streamable_media(&streamable.id, &cookie).await
    }
}

#[async_trait]
impl PlaylistClient for DriveExtension {
    async fn load_playlist(&self, mut playlist: Playlist) -> Result<Playlist> {
        self.session.require()?;
        playlist.track_count = Some(self.pagination.get_or_count_tracks(&playlist.id).await?);
        Ok(playlist)
    }

    async fn load_playlist_tracks(&self, playlist: &Playlist) -> Result<PagedData<Track>> {
        self.session.require()?;
        Ok(self.pagination.get_or_create_paged_tracks(&playlist.id))
    }
}

#[async_trait]
impl RadioClient for DriveExtension {
    async fn radio(&self, item: &MediaItem, context: Option<&MediaItem>) -> Result<Radio> {
        self.radio.create_radio(item, context)
    }

    async fn load_radio_tracks(&self, radio: &Radio) -> Result<PagedData<Track>> {
        if radio.id.is_empty() {
            return Err(DriveError::invalid_input("Radio has no id"));
        }
        self.radio.load_radio_tracks(radio)
    }
}
