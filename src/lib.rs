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


//! Google Drive as a music library
//!
//! Folders under the user's `echomusic` Drive folder are playlists, audio and
//! video files are tracks. Authentication rides on a browser cookie captured
//! at sign-in; requests go to Drive's internal web API.
//!
//! Start from [`extension::DriveExtension`].

uniffi::setup_scaffolding!();

pub mod api;
pub mod config;
pub mod download;
pub mod error;
pub mod extension;
pub mod library;
pub mod media;
pub mod paging;

#[cfg(test)]
mod test_support;

pub use config::{DriveConfig, ExtensionSettings};
pub use error::{DriveError, Result};
pub use extension::DriveExtension;

/// `SAPISIDHASH` authorization header for the current second
#[uniffi::export]
pub fn authorization_header_now(session_secret: String, origin: String) -> String {
    api::signing::signed_authorization_header_now(&session_secret, &origin)
}

/// `audio`, `video` or `other`, by file extension
#[uniffi::export]
pub fn classify_file_name(file_name: String) -> String {
    match media::files::media_kind(&file_name) {
        media::MediaKind::Audio => "audio",
        media::MediaKind::Video => "video",
        media::MediaKind::Other => "other",
    }
    .to_string()
}

#[uniffi::export]
pub fn bridge_version() -> String {
    format!("gdrive-music {}", env!("CARGO_PKG_VERSION"))
}
