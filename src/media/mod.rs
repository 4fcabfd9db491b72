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


//! Host-facing media items and how Drive files become them

pub mod files;
pub mod mapper;
pub mod metadata;
pub mod models;

pub use files::MediaKind;
pub use mapper::{FileClass, Overlay};
pub use metadata::{MetadataEntry, MetadataStore};
pub use models::{
    Album, Artist, Extras, Feed, MediaItem, NetworkRequest, Playlist, Radio, Shelf, ShelfItems, Streamable,
    StreamableMedia, Track, User,
};
