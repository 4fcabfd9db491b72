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


//! Overlay metadata keyed by Drive file id
//!
//! Users can point the extension at a JSON document (usually a raw GitHub
//! URL) that supplies proper tags for their files:
//!
//! ```json
//! {
//!   "metadata": [
//!     {
//!       "fileId": "1ABC123",
//!       "title": "Song",
//!       "artist": "Artist Name",
//!       "album": "Album Name",
//!       "albumArt": "https://example.com/cover.jpg",
//!       "genre": "Rock",
//!       "year": "2024",
//!       "trackNumber": 3,
//!       "duration": 215
//!     }
//!   ]
//! }
//! ```
//!
//! `year`, `trackNumber` and `duration` (seconds) accept numbers or numeric
//! strings. Each load replaces the whole table; a document that fails to
//! decode leaves the table empty.

use crate::api::transport::{HttpRequest, HttpTransport};
use crate::error::{DriveError, Result};
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use tracing::{info, warn};

/// One overlay record
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetadataEntry {
    pub file_id: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub artist: Option<String>,
    #[serde(default)]
    pub album: Option<String>,
    #[serde(default)]
    pub album_art: Option<String>,
    #[serde(default)]
    pub genre: Option<String>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub year: Option<i32>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub track_number: Option<u32>,
    /// Seconds
    #[serde(default, deserialize_with = "lenient_number")]
    pub duration: Option<u64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MetadataDocument {
    #[serde(default)]
    pub metadata: Vec<MetadataEntry>,
}

/// Accept `2024`, `"2024"` or null; anything else is treated as absent
fn lenient_number<'de, D, T>(deserializer: D) -> std::result::Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: TryFrom<i64>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    let number = match value {
        Some(serde_json::Value::Number(n)) => n.as_i64(),
        Some(serde_json::Value::String(s)) => s.trim().parse::<i64>().ok(),
        _ => None,
    };
    Ok(number.and_then(|n| T::try_from(n).ok()))
}

/// Decode a metadata document into a lookup table; later duplicates win
pub fn parse_metadata_document(json: &str) -> Result<HashMap<String, MetadataEntry>> {
    let document: MetadataDocument = serde_json::from_str(json)
        .map_err(|e| DriveError::MetadataUnavailable(format!("Invalid metadata document: {}", e)))?;

    Ok(document
        .metadata
        .into_iter()
        .map(|entry| (entry.file_id.clone(), entry))
        .collect())
}

/// Process-lifetime overlay table, swapped wholesale on reload
#[derive(Debug, Default)]
pub struct MetadataStore {
    table: RwLock<Arc<HashMap<String, MetadataEntry>>>,
}

impl MetadataStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Exact-match lookup by file id
    pub fn get(&self, file_id: &str) -> Option<MetadataEntry> {
        self.snapshot().get(file_id).cloned()
    }

    pub fn snapshot(&self) -> Arc<HashMap<String, MetadataEntry>> {
        self.table
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    pub fn len(&self) -> usize {
        self.snapshot().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn replace(&self, table: HashMap<String, MetadataEntry>) {
        let mut guard = self.table.write().unwrap_or_else(|poisoned| poisoned.into_inner());
        *guard = Arc::new(table);
    }

    pub fn clear(&self) {
        self.replace(HashMap::new());
    }

    /// Replace the table from document text.
    /// Malformed input is logged and leaves the table empty; returns the entry count.
    pub fn load_from_json(&self, json: &str) -> usize {
        match parse_metadata_document(json) {
            Ok(table) => {
                let count = table.len();
                self.replace(table);
                info!("Loaded {} metadata entries", count);
                count
            }
            Err(e) => {
                warn!("Discarding custom metadata: {}", e);
                self.clear();
                0
            }
        }
    }

    /// Fetch the document at `url` and replace the table with it.
    /// Fetch failures also reset the table, then surface to the caller.
    pub async fn load_from_url(&self, transport: &dyn HttpTransport, url: &str) -> Result<usize> {
        let response = match transport.execute(HttpRequest::get(url)).await {
            Ok(r) => r,
            Err(e) => {
                warn!("Failed to fetch custom metadata: {}", e);
                self.clear();
                return Err(DriveError::MetadataUnavailable(e.to_string()));
            }
        };

        if !response.is_success() {
            warn!("Custom metadata URL answered HTTP {}", response.status);
            self.clear();
            return Err(DriveError::MetadataUnavailable(format!("HTTP {}", response.status)));
        }

        Ok(self.load_from_json(&response.text()))
    }
}
