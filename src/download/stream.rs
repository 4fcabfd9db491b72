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


//! Resolution of playable download URLs
//!
//! # Flow
//! 1. GET `{download_url}?id={file_id}` with the session cookie.
//! 2. If the body does not start with `<!DOCTYPE html>` it is the media
//!    itself: the URL is already final and the body is not read further.
//! 3. Otherwise Drive served its "can't scan this file for viruses" page.
//!    Every hidden `<input>` of its confirmation form is set as a query
//!    parameter on the URL, which then points at the media.
//!
//! The host fetches the bytes itself; the extension only hands back the
//! URL plus the headers to send with it.

use crate::api::transport::{HttpRequest, HttpTransport};
use crate::config::DriveConfig;
use crate::error::Result;
use crate::media::models::{NetworkRequest, StreamableMedia};
use lazy_static::lazy_static;
use regex::Regex;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{debug, info};

/// Prefix of the interstitial page, compared case-insensitively
pub const DOCTYPE_HTML_PREFIX: &str = "<!DOCTYPE html>";

/// Accept header of the probe, as a browser sends it
const PROBE_ACCEPT: &str = "text/html,application/xhtml+xml,application/xml;q=0.9,image/avif,image/webp,*/*;q=0.8";

const MEDIA_ACCEPT: &str = "*/*";

lazy_static! {
    static ref HIDDEN_INPUT_REGEX: Regex =
        Regex::new(r#"<input[^>]+type="hidden"[^>]+name="([^"]+)"[^>]+value="([^"]*)"[^>]*>"#)
            .expect("valid hidden input regex");
}

/// Hidden form fields in document order
pub fn hidden_fields(html: &str) -> Vec<(String, String)> {
    HIDDEN_INPUT_REGEX
        .captures_iter(html)
        .map(|c| (c[1].to_string(), c[2].to_string()))
        .collect()
}

/// Set every hidden field of the interstitial page on `base_url`.
///
/// Setting a name drops any earlier parameter of that name before appending,
/// so each name appears once, at the position it was last set.
pub fn build_confirmation_url(base_url: &str, html: &str) -> Result<String> {
    let mut url = url::Url::parse(base_url)?;
    let mut pairs: Vec<(String, String)> = url
        .query_pairs()
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect();

    for (name, value) in hidden_fields(html) {
        pairs.retain(|(k, _)| *k != name);
        pairs.push((name, value));
    }

    url.query_pairs_mut().clear().extend_pairs(pairs);
    Ok(url.to_string())
}

#[derive(Debug, Clone)]
pub struct StreamingResolver {
    transport: Arc<dyn HttpTransport>,
    config: DriveConfig,
}

impl StreamingResolver {
    pub fn new(transport: Arc<dyn HttpTransport>, config: DriveConfig) -> Self {
        Self { transport, config }
    }

    pub fn download_url(&self, file_id: &str) -> String {
        format!("{}?id={}", self.config.download_url, urlencoding::encode(file_id))
    }

    /// Headers the host sends when fetching the media
    pub fn media_headers(&self, cookie: &str) -> BTreeMap<String, String> {
        self.headers(cookie, MEDIA_ACCEPT)
    }

    fn headers(&self, cookie: &str, accept: &str) -> BTreeMap<String, String> {
        let mut headers = BTreeMap::new();
        headers.insert("Accept".to_string(), accept.to_string());
        headers.insert("Cookie".to_string(), cookie.to_string());
        headers.insert("User-Agent".to_string(), self.config.user_agent.clone());
        if let Some(host) = self.config.download_host() {
            headers.insert("Host".to_string(), host);
        }
        headers
    }

    /// URL that serves the file's bytes directly
    pub async fn resolve_download_url(&self, file_id: &str, cookie: &str) -> Result<String> {
        let download_url = self.download_url(file_id);

        let request = self
            .headers(cookie, PROBE_ACCEPT)
            .into_iter()
            .fold(HttpRequest::get(download_url.as_str()), |req, (k, v)| req.header(k, v));

        match self
            .transport
            .execute_if_body_starts_with(request, DOCTYPE_HTML_PREFIX)
            .await?
        {
            None => {
                debug!("Download URL for {} serves media directly", file_id);
                Ok(download_url)
            }
            Some(page) => {
                info!("Confirming virus-scan interstitial for {}", file_id);
                build_confirmation_url(&download_url, &page.text())
            }
        }
    }

    /// Final URL wrapped as a request the host performs
    pub async fn resolve_streamable_media(&self, file_id: &str, cookie: &str) -> Result<StreamableMedia> {
        let url = self.resolve_download_url(file_id, cookie).await?;
        Ok(StreamableMedia::Http {
            request: NetworkRequest {
                url,
                headers: self.media_headers(cookie),
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::MockTransport;

    const INTERSTITIAL: &str = r#"<!DOCTYPE html><html><body>
        <form id="download-form" action="https://drive.usercontent.google.com/download" method="get">
        <input type="submit" value="Download anyway">
        <input type="hidden" name="id" value="FILE1">
        <input type="hidden" name="export" value="download">
        <input type="hidden" name="confirm" value="t">
        <input type="hidden" name="uuid" value="1234-abcd">
        </form></body></html>"#;

    fn resolver(transport: Arc<MockTransport>) -> StreamingResolver {
        StreamingResolver::new(transport, DriveConfig::default())
    }

    #[test]
    fn test_hidden_fields_in_order() {
        let fields = hidden_fields(INTERSTITIAL);
        let names: Vec<_> = fields.iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(names, vec!["id", "export", "confirm", "uuid"]);
        assert_eq!(fields[3].1, "1234-abcd");
    }

    #[test]
    fn test_confirmation_url_sets_fields() {
        let url = build_confirmation_url(
            "https://drive.usercontent.google.com/download?id=FILE1",
            INTERSTITIAL,
        )
        .unwrap();
        assert_eq!(
            url,
            "https://drive.usercontent.google.com/download?id=FILE1&export=download&confirm=t&uuid=1234-abcd"
        );
    }

    #[test]
    fn test_repeated_name_keeps_last_value() {
        let html = r#"<input type="hidden" name="a" value="1"><input type="hidden" name="b" value="2"><input type="hidden" name="a" value="3">"#;
        let url = build_confirmation_url("https://x.test/d?id=9", html).unwrap();
        assert_eq!(url, "https://x.test/d?id=9&b=2&a=3");
    }

    #[tokio::test]
    async fn test_direct_media_url_is_unchanged() {
        let transport = Arc::new(MockTransport::new());
        transport.on_get("download?id=abc", 200, b"ID3\x04\x00\x00binary".to_vec());
        let resolver = resolver(transport.clone());

        let url = resolver.resolve_download_url("abc", "SAPISID=x").await.unwrap();
        assert_eq!(url, "https://drive.usercontent.google.com/download?id=abc");

        let sent = &transport.requests()[0];
        assert_eq!(sent.header_value("Cookie"), Some("SAPISID=x"));
        assert_eq!(sent.header_value("Host"), Some("drive.usercontent.google.com"));
        assert!(sent.header_value("Accept").unwrap().starts_with("text/html"));
    }

    #[tokio::test]
    async fn test_interstitial_is_confirmed() {
        let transport = Arc::new(MockTransport::new());
        transport.on_get("download?id=FILE1", 200, INTERSTITIAL.to_lowercase().replacen("<!doctype html>", "<!doctype HTML>", 1));
        let resolver = resolver(transport);

        let url = resolver.resolve_download_url("FILE1", "c=1").await.unwrap();
        assert!(url.contains("confirm=t"));
        assert!(url.ends_with("uuid=1234-abcd"));
    }

    #[tokio::test]
    async fn test_streamable_media_carries_headers() {
        let transport = Arc::new(MockTransport::new());
        transport.on_get("download?id=abc", 200, "fLaC");
        let resolver = resolver(transport);

        let media = resolver.resolve_streamable_media("abc", "c=1").await.unwrap();
        let StreamableMedia::Http { request } = media;
        assert_eq!(request.url, "https://drive.usercontent.google.com/download?id=abc");
        assert_eq!(request.headers.get("Cookie").map(String::as_str), Some("c=1"));
        assert_eq!(request.headers.get("Accept").map(String::as_str), Some("*/*"));
        assert!(request.headers.contains_key("User-Agent"));
    }
}
