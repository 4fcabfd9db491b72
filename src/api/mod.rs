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


//! Drive internal API client
//!
//! Cookie-based authentication, request signing, the batch file-search
//! endpoint and the parser for its multipart responses.

pub mod auth;
pub mod client;
pub mod models;
pub mod multipart;
pub mod signing;
pub mod transport;

// Re-export commonly used types
pub use auth::{AuthState, SessionStore};
pub use client::DriveClient;
pub use models::{FileListing, RemoteFile};
pub use transport::{HttpRequest, HttpResponse, HttpTransport, ReqwestTransport};
