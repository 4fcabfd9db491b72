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


//! Client configuration and extension settings
//!
//! `DriveConfig` carries every endpoint and tunable the client uses. The
//! defaults point at the live Drive web endpoints; tests swap them for
//! local values through the builder.
//!
//! `ExtensionSettings` is the host-persisted key/value store handed to the
//! extension, and [`setting_items`] describes the schema the host renders.

use crate::error::{DriveError, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Duration;

/// Origin used for the signed authorization header and the `Origin` header
pub const DRIVE_ORIGIN: &str = "https://drive.google.com";

/// Page scraped for the internal API key
pub const DRIVE_PAGE_URL: &str = "https://drive.google.com/drive/my-drive";

/// Internal batch endpoint
pub const BATCH_URL: &str = "https://clients6.google.com/batch/drive/v2internal";

/// Content server download endpoint
pub const DOWNLOAD_URL: &str = "https://drive.usercontent.google.com/download";

/// Folder the library is rooted at
pub const MUSIC_FOLDER_NAME: &str = "echomusic";

/// Files per batch listing call
pub const PAGE_SIZE: u32 = 100;

/// Entries kept per pagination cache
pub const CACHE_CAPACITY: usize = 50;

/// Tracks per radio batch
pub const RADIO_BATCH_SIZE: usize = 50;

/// Default request timeout in seconds
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Desktop Firefox, which the web endpoints accept without extra checks
pub const DEFAULT_USER_AGENT: &str =
    "Mozilla/5.0 (X11; Linux x86_64; rv:109.0) Gecko/20100101 Firefox/115.0";

/// Settings key for the external metadata URL
pub const CUSTOM_METADATA_URL_KEY: &str = "custom_metadata_url";

/// Configuration for the Drive client
#[derive(Debug, Clone, PartialEq)]
pub struct DriveConfig {
    pub origin: String,
    pub drive_page_url: String,
    pub batch_url: String,
    pub download_url: String,
    pub user_agent: String,
    pub music_folder_name: String,
    pub page_size: u32,
    pub cache_capacity: usize,
    pub radio_batch_size: usize,
    pub timeout: Duration,
}

impl Default for DriveConfig {
    fn default() -> Self {
        Self {
            origin: DRIVE_ORIGIN.to_string(),
            drive_page_url: DRIVE_PAGE_URL.to_string(),
            batch_url: BATCH_URL.to_string(),
            download_url: DOWNLOAD_URL.to_string(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            music_folder_name: MUSIC_FOLDER_NAME.to_string(),
            page_size: PAGE_SIZE,
            cache_capacity: CACHE_CAPACITY,
            radio_batch_size: RADIO_BATCH_SIZE,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

impl DriveConfig {
    pub fn builder() -> DriveConfigBuilder {
        DriveConfigBuilder::new()
    }

    /// Reject values the client cannot work with
    pub fn validate(&self) -> Result<()> {
        if self.page_size == 0 {
            return Err(DriveError::InvalidConfiguration("page_size must be positive".to_string()));
        }
        if self.cache_capacity == 0 {
            return Err(DriveError::InvalidConfiguration("cache_capacity must be positive".to_string()));
        }
        if self.radio_batch_size == 0 {
            return Err(DriveError::InvalidConfiguration("radio_batch_size must be positive".to_string()));
        }
        if self.music_folder_name.trim().is_empty() {
            return Err(DriveError::InvalidConfiguration("music_folder_name is empty".to_string()));
        }
        for url in [&self.drive_page_url, &self.batch_url, &self.download_url] {
            url::Url::parse(url)?;
        }
        Ok(())
    }

    /// Host header value for the download endpoint
    pub fn download_host(&self) -> Option<String> {
        url::Url::parse(&self.download_url)
            .ok()
            .and_then(|u| u.host_str().map(|h| h.to_string()))
    }
}

/// Builder for DriveConfig
#[derive(Debug)]
pub struct DriveConfigBuilder {
    config: DriveConfig,
}

impl DriveConfigBuilder {
    pub fn new() -> Self {
        Self {
            config: DriveConfig::default(),
        }
    }

    pub fn origin<S: Into<String>>(mut self, origin: S) -> Self {
        self.config.origin = origin.into();
        self
    }

    pub fn drive_page_url<S: Into<String>>(mut self, url: S) -> Self {
        self.config.drive_page_url = url.into();
        self
    }

    pub fn batch_url<S: Into<String>>(mut self, url: S) -> Self {
        self.config.batch_url = url.into();
        self
    }

    pub fn download_url<S: Into<String>>(mut self, url: S) -> Self {
        self.config.download_url = url.into();
        self
    }

    pub fn user_agent<S: Into<String>>(mut self, user_agent: S) -> Self {
        self.config.user_agent = user_agent.into();
        self
    }

    pub fn music_folder_name<S: Into<String>>(mut self, name: S) -> Self {
        self.config.music_folder_name = name.into();
        self
    }

    pub fn page_size(mut self, page_size: u32) -> Self {
        self.config.page_size = page_size;
        self
    }

    pub fn cache_capacity(mut self, capacity: usize) -> Self {
        self.config.cache_capacity = capacity;
        self
    }

    pub fn radio_batch_size(mut self, batch_size: usize) -> Self {
        self.config.radio_batch_size = batch_size;
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.config.timeout = timeout;
        self
    }

    pub fn build(self) -> DriveConfig {
        self.config
    }
}

impl Default for DriveConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Where overlay metadata comes from.
///
/// Only `Url` is ever produced by [`ExtensionSettings::metadata_source`].
/// `Inline` (JSON pasted into settings) and `Bundled` (JSON shipped with the
/// extension) are deprecated sources and are deliberately not wired.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MetadataSource {
    Url(String),
    Inline(String),
    Bundled,
}

/// Host-persisted settings handed to the extension
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtensionSettings {
    #[serde(flatten)]
    values: HashMap<String, String>,
}

impl ExtensionSettings {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with<K: Into<String>, V: Into<String>>(mut self, key: K, value: V) -> Self {
        self.values.insert(key.into(), value.into());
        self
    }

    pub fn get_string(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(|s| s.as_str())
    }

    pub fn set_string<K: Into<String>, V: Into<String>>(&mut self, key: K, value: V) {
        self.values.insert(key.into(), value.into());
    }

    /// The configured overlay source, if the URL setting is non-blank
    pub fn metadata_source(&self) -> Option<MetadataSource> {
        self.get_string(CUSTOM_METADATA_URL_KEY)
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(|s| MetadataSource::Url(s.to_string()))
    }
}

/// One entry in the settings schema the host renders
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SettingItem {
    TextInput {
        title: String,
        key: String,
        summary: Option<String>,
        default_value: Option<String>,
    },
}

/// Settings schema: a single optional text field for the metadata URL
pub fn setting_items() -> Vec<SettingItem> {
    vec![SettingItem::TextInput {
        title: "Custom Metadata JSON URL".to_string(),
        key: CUSTOM_METADATA_URL_KEY.to_string(),
        summary: Some("GitHub raw URL to your metadata.json file".to_string()),
        default_value: Some(String::new()),
    }]
}
