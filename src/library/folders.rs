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


//! Folder-level queries against the library
//!
//! The library lives under one Drive folder with a fixed name. Its id is
//! looked up once per session. If the lookup fails for any reason the caller
//! gets `LoginRequired`: a missing folder and a stale session look the same
//! from the outside.

use crate::api::client::DriveClient;
use crate::api::models::{RemoteFile, FOLDER_MIME_TYPE};
use crate::error::{DriveError, Result};
use tracing::{debug, info, warn};

/// Quote user text for a Drive query literal
pub fn escape_query_text(text: &str) -> String {
    text.replace('\\', "\\\\").replace('\'', "\\'")
}

/// Direct children of a folder, trashed items excluded
pub fn folder_children_query(folder_id: &str) -> String {
    format!("trashed=false and '{}' in parents", escape_query_text(folder_id))
}

/// Title search anywhere below a folder
pub fn title_search_query(folder_id: &str, text: &str) -> String {
    format!(
        "title contains '{}' and trashed=false and '{}' in ancestors",
        escape_query_text(text),
        escape_query_text(folder_id)
    )
}

pub fn folder_by_name_query(name: &str) -> String {
    format!(
        "title='{}' and mimeType='{}' and trashed=false",
        escape_query_text(name),
        FOLDER_MIME_TYPE
    )
}

#[derive(Debug, Clone)]
pub struct FolderRepository {
    client: DriveClient,
}

impl FolderRepository {
    pub fn new(client: DriveClient) -> Self {
        Self { client }
    }

    pub fn client(&self) -> &DriveClient {
        &self.client
    }

    /// Id of the library root folder, memoized on the session
    ///
    /// # Errors
    /// Always `LoginRequired`, whatever went wrong
    pub async fn resolve_music_folder_id(&self) -> Result<String> {
        let session = self.client.session();
        let state = session.require()?;

        if let Some(id) = &state.music_folder_id {
            return Ok(id.clone());
        }

        let name = &self.client.config().music_folder_name;
        let listing = match self.client.search(&folder_by_name_query(name), None).await {
            Ok(listing) => listing,
            Err(e) => {
                warn!("Music folder lookup failed: {}", e);
                return Err(DriveError::LoginRequired);
            }
        };

        match listing.items.into_iter().find(RemoteFile::is_folder) {
            Some(folder) => {
                info!("Resolved music folder '{}'", name);
                session.update_music_folder_id_for(&state, &folder.id);
                Ok(folder.id)
            }
            None => {
                warn!("No folder named '{}' in Drive", name);
                Err(DriveError::LoginRequired)
            }
        }
    }

    /// First page of a folder's children
    pub async fn list_folder(&self, folder_id: &str) -> Result<Vec<RemoteFile>> {
        debug!("Listing folder {}", folder_id);
        let listing = self.client.search(&folder_children_query(folder_id), None).await?;
        Ok(listing.items)
    }

    /// First page of title matches below a folder
    pub async fn search_in_folder(&self, folder_id: &str, text: &str) -> Result<Vec<RemoteFile>> {
        let listing = self
            .client
            .search(&title_search_query(folder_id, text), None)
            .await?;
        Ok(listing.items)
    }
}
