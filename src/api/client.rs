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


//! Client for Drive's internal web API
//!
//! Two remote calls are needed to browse a library:
//!
//! 1. **API key** - scraped from the Drive web page: the first quoted
//!    39-character word token. Memoized on the session.
//! 2. **File search** - a POST to the batch endpoint carrying one embedded
//!    `GET /drive/v2internal/files` sub-request. The sub-request carries the
//!    signed `SAPISIDHASH` authorization; the outer request carries the cookie.
//!
//! # Batch request
//!
//! ```text
//! POST {batch_url}?$ct=multipart/mixed; boundary="=====vc17a3rwnndj====="&key={key}
//! Content-Type: text/plain; charset=UTF-8
//!
//! --=====vc17a3rwnndj=====
//! content-type: application/http
//! content-transfer-encoding: binary
//!
//! GET /drive/v2internal/files?q=...&fields=...&maxResults=100&key=...
//! authorization: SAPISIDHASH <ts>_<sha1>
//! x-goog-authuser: 0
//!
//! --=====vc17a3rwnndj=====--
//! ```
//!
//! # Failure handling
//! - no session: `LoginRequired`, nothing is sent
//! - 401/403: the session is cleared, then `LoginRequired`
//! - other non-2xx: `ApiRequestFailed`
//! - unparseable body: the parser error, with a preview of the body
//!
//! Nothing is retried.

use crate::api::auth::{AuthState, SessionStore};
use crate::api::models::FileListing;
use crate::api::multipart;
use crate::api::signing::signed_authorization_header_now;
use crate::api::transport::{HttpRequest, HttpResponse, HttpTransport};
use crate::config::DriveConfig;
use crate::error::{DriveError, Result};
use lazy_static::lazy_static;
use regex::Regex;
use std::sync::Arc;
use tracing::{debug, warn};

/// Multipart boundary of the batch body
pub const BATCH_BOUNDARY: &str = "=====vc17a3rwnndj=====";

/// Fields requested for every listed file
const LIST_FIELDS: &str = "kind,nextPageToken,items(id,title,mimeType,fileSize)";

/// Path of the embedded file listing sub-request
const FILES_PATH: &str = "/drive/v2internal/files";

lazy_static! {
    static ref API_KEY_REGEX: Regex = Regex::new(r#""(\w{39})""#).expect("valid api key regex");
}

/// Pull the internal API key out of the Drive page HTML
pub fn extract_api_key(html: &str) -> Option<String> {
    API_KEY_REGEX
        .captures(html)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().to_string())
}

/// Path and query of the embedded listing request
pub fn build_search_path(query: &str, api_key: &str, page_token: Option<&str>, page_size: u32) -> String {
    let token_param = page_token
        .map(|t| format!("&pageToken={}", urlencoding::encode(t)))
        .unwrap_or_default();

    format!(
        "{}?q={}&fields={}&maxResults={}{}&key={}",
        FILES_PATH,
        urlencoding::encode(query),
        LIST_FIELDS,
        page_size,
        token_param,
        api_key
    )
}

/// Single-part multipart body wrapping one GET sub-request
pub fn build_batch_body(request_path: &str, authorization: &str) -> String {
    format!(
        "--{boundary}\r\n\
         content-type: application/http\r\n\
         content-transfer-encoding: binary\r\n\
         \r\n\
         GET {path}\r\n\
         authorization: {auth}\r\n\
         x-goog-authuser: 0\r\n\
         \r\n\
         --{boundary}--",
        boundary = BATCH_BOUNDARY,
        path = request_path,
        auth = authorization,
    )
}

/// Outer batch URL; `$ct` tells the endpoint how the text body is framed
pub fn build_batch_url(batch_url: &str, api_key: &str) -> String {
    let content_type = format!("multipart/mixed; boundary=\"{}\"", BATCH_BOUNDARY);
    format!(
        "{}?$ct={}&key={}",
        batch_url,
        urlencoding::encode(&content_type),
        urlencoding::encode(api_key)
    )
}

/// Client for the internal Drive API
#[derive(Debug, Clone)]
pub struct DriveClient {
    transport: Arc<dyn HttpTransport>,
    session: Arc<SessionStore>,
    config: DriveConfig,
}

impl DriveClient {
    pub fn new(transport: Arc<dyn HttpTransport>, session: Arc<SessionStore>, config: DriveConfig) -> Self {
        Self {
            transport,
            session,
            config,
        }
    }

    pub fn config(&self) -> &DriveConfig {
        &self.config
    }

    pub fn session(&self) -> &Arc<SessionStore> {
        &self.session
    }

    pub fn transport(&self) -> &Arc<dyn HttpTransport> {
        &self.transport
    }

    /// Scrape the internal API key from the Drive page
    ///
    /// # Errors
    /// - `LoginRequired` without a session, or on 401/403 (session cleared)
    /// - `ExtractionFailed` if the page has no key
    pub async fn fetch_internal_api_key(&self) -> Result<String> {
        let state = self.session.require()?;
        self.fetch_api_key_for(&state).await
    }

    async fn fetch_api_key_for(&self, state: &AuthState) -> Result<String> {
        let request = HttpRequest::get(&self.config.drive_page_url)
            .header("Accept", "*/*")
            .header("Cookie", state.cookie.as_str())
            .header("User-Agent", &self.config.user_agent);

        let response = self.transport.execute(request).await?;
        let response = self.check_status(response, &self.config.drive_page_url)?;

        extract_api_key(&response.text()).ok_or_else(|| {
            warn!("API key not found in Drive page");
            DriveError::extraction_failed("API key")
        })
    }

    /// Cached API key, fetched once per session
    pub async fn get_or_fetch_api_key(&self) -> Result<String> {
        let state = self.session.require()?;
        if let Some(key) = &state.api_key {
            return Ok(key.clone());
        }

        let key = self.fetch_api_key_for(&state).await?;
        if self.session.update_api_key_for(&state, &key) {
            debug!("API key cached on session");
        }
        Ok(key)
    }

    /// Run one page of a file query through the batch endpoint
    pub async fn search_files(&self, query: &str, api_key: &str, page_token: Option<&str>) -> Result<FileListing> {
        let state = self.session.require()?;

        let path = build_search_path(query, api_key, page_token, self.config.page_size);
        let authorization = signed_authorization_header_now(&state.session_secret, &self.config.origin);
        let body = build_batch_body(&path, &authorization);
        let url = build_batch_url(&self.config.batch_url, api_key);

        let request = HttpRequest::post(url, body)
            .header("Content-Type", "text/plain; charset=UTF-8")
            .header("Origin", &self.config.origin)
            .header("Cookie", state.cookie.as_str())
            .header("User-Agent", &self.config.user_agent);

        debug!("Searching files: {} (page token: {})", query, page_token.is_some());
        let response = self.transport.execute(request).await?;
        let response = self.check_status(response, &self.config.batch_url)?;

        let text = response.text();
        let listing: FileListing = multipart::extract_and_decode(&text)?;

        debug!(
            "Listing returned {} items, more: {}",
            listing.items.len(),
            listing.next_page_token.is_some()
        );
        Ok(listing)
    }

    /// Search with the memoized API key
    pub async fn search(&self, query: &str, page_token: Option<&str>) -> Result<FileListing> {
        let key = self.get_or_fetch_api_key().await?;
        self.search_files(query, &key, page_token).await
    }

    /// Map 401/403 to a cleared session, other failures to `ApiRequestFailed`
    fn check_status(&self, response: HttpResponse, endpoint: &str) -> Result<HttpResponse> {
        if response.is_success() {
            return Ok(response);
        }

        if response.is_auth_rejected() {
            warn!("Drive rejected the session with HTTP {}", response.status);
            self.session.clear();
            return Err(DriveError::LoginRequired);
        }

        Err(DriveError::api_failed(
            format!("Drive API request failed: {}", response.status),
            Some(response.status),
            Some(endpoint.to_string()),
        ))
    }
}
