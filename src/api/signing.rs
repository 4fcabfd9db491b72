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


//! Signed authorization header for the internal batch endpoint
//!
//! The header is `SAPISIDHASH {ts}_{hex(sha1("{ts} {secret} {origin}"))}`.
//! The server checks the timestamp for recency, so it is taken from the wall
//! clock on every call and never cached.

use sha1::{Digest, Sha1};

/// Scheme prefix of the authorization header value
pub const SAPISIDHASH_SCHEME: &str = "SAPISIDHASH";

/// Build the header value for an explicit timestamp
pub fn signed_authorization_header(session_secret: &str, origin: &str, now_epoch_seconds: i64) -> String {
    let digest = Sha1::digest(format!("{} {} {}", now_epoch_seconds, session_secret, origin).as_bytes());
    format!("{} {}_{}", SAPISIDHASH_SCHEME, now_epoch_seconds, hex::encode(digest))
}

/// Build the header value using the current wall-clock second
pub fn signed_authorization_header_now(session_secret: &str, origin: &str) -> String {
    signed_authorization_header(session_secret, origin, chrono::Utc::now().timestamp())
}
