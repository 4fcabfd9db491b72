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


//! Capabilities a media host can ask of an extension
//!
//! Each trait is one screen or flow of the host app. An extension implements
//! the ones it supports; the host discovers them at load time.

use crate::config::{ExtensionSettings, SettingItem};
use crate::error::Result;
use crate::media::models::{Feed, MediaItem, Playlist, Radio, Streamable, StreamableMedia, Track, User};
use crate::paging::PagedData;
use async_trait::async_trait;

/// Settings plumbing every extension has
#[async_trait]
pub trait ExtensionClient: Send + Sync {
    fn setting_items(&self) -> Vec<SettingItem>;

    /// Called once at load and again whenever the user edits a setting
    fn set_settings(&self, settings: ExtensionSettings);

    async fn on_extension_selected(&self) -> Result<()> {
        Ok(())
    }
}

/// Login page the host opens in a web view, capturing cookies on exit
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WebViewLoginRequest {
    pub initial_url: String,
    /// The web view closes once a URL matches this
    pub stop_url_regex: String,
    pub dont_cache: bool,
}

#[async_trait]
pub trait LoginClient: Send + Sync {
    fn webview_request(&self) -> WebViewLoginRequest;

    /// Cookies captured when the web view stopped
    async fn on_login_cookie(&self, stop_url: &str, cookie: &str) -> Result<Vec<User>>;

    /// `None` logs out
    fn set_login_user(&self, user: Option<&User>);

    async fn current_user(&self) -> Result<Option<User>>;
}

#[async_trait]
pub trait HomeFeedClient: Send + Sync {
    async fn load_home_feed(&self) -> Result<Feed>;
}

#[async_trait]
pub trait LibraryFeedClient: Send + Sync {
    async fn load_library_feed(&self) -> Result<Feed>;
}

#[async_trait]
pub trait SearchFeedClient: Send + Sync {
    async fn load_search_feed(&self, query: &str) -> Result<Feed>;
}

#[async_trait]
pub trait TrackClient: Send + Sync {
    async fn load_track(&self, track: Track, is_download: bool) -> Result<Track>;

    async fn load_streamable_media(&self, streamable: &Streamable, is_download: bool) -> Result<StreamableMedia>;

    async fn load_track_feed(&self, _track: &Track) -> Result<Option<Feed>> {
        Ok(None)
    }
}

#[async_trait]
pub trait PlaylistClient: Send + Sync {
    async fn load_playlist(&self, playlist: Playlist) -> Result<Playlist>;

    async fn load_playlist_tracks(&self, playlist: &Playlist) -> Result<PagedData<Track>>;

    async fn load_playlist_feed(&self, _playlist: &Playlist) -> Result<Option<Feed>> {
        Ok(None)
    }
}

#[async_trait]
pub trait RadioClient: Send + Sync {
    async fn radio(&self, item: &MediaItem, context: Option<&MediaItem>) -> Result<Radio>;

    async fn load_radio(&self, radio: Radio) -> Result<Radio> {
        Ok(radio)
    }

    async fn load_radio_tracks(&self, radio: &Radio) -> Result<PagedData<Track>>;
}
