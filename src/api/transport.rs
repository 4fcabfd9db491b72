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


//! HTTP transport used by every remote call
//!
//! Components talk to [`HttpTransport`] rather than to reqwest directly so the
//! whole client can run against an in-memory transport in tests.
//! [`ReqwestTransport`] is the production implementation.
//!
//! There is no retry layer: a failed request is returned to the caller as-is.

use crate::config::DriveConfig;
use crate::error::{DriveError, Result};
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, USER_AGENT};
use reqwest::{Client, Method};
use std::fmt::Debug;
use std::time::Duration;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
}

/// A fully built request; the URL already carries its query string
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
    pub method: HttpMethod,
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: Option<String>,
}

impl HttpRequest {
    pub fn get<S: Into<String>>(url: S) -> Self {
        Self {
            method: HttpMethod::Get,
            url: url.into(),
            headers: Vec::new(),
            body: None,
        }
    }

    pub fn post<S: Into<String>>(url: S, body: String) -> Self {
        Self {
            method: HttpMethod::Post,
            url: url.into(),
            headers: Vec::new(),
            body: Some(body),
        }
    }

    pub fn header<K: Into<String>, V: Into<String>>(mut self, name: K, value: V) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Case-insensitive header lookup
    pub fn header_value(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

impl HttpResponse {
    pub fn new<B: Into<Vec<u8>>>(status: u16, body: B) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// 401 and 403 both mean the session is no longer accepted
    pub fn is_auth_rejected(&self) -> bool {
        self.status == 401 || self.status == 403
    }

    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

/// Case-insensitive ASCII prefix check on raw bytes
pub fn starts_with_ignore_case(body: &[u8], marker: &str) -> bool {
    body.len() >= marker.len() && body[..marker.len()].eq_ignore_ascii_case(marker.as_bytes())
}

#[async_trait]
pub trait HttpTransport: Send + Sync + Debug {
    /// Send a request and read the whole body
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse>;

    /// Send a request and read only as much of the body as needed to compare
    /// it against `marker`.
    ///
    /// Returns the full response when the body starts with `marker`
    /// (ASCII case-insensitive), `None` otherwise. Implementations that can
    /// stream should stop reading once the prefix is known not to match.
    async fn execute_if_body_starts_with(
        &self,
        request: HttpRequest,
        marker: &str,
    ) -> Result<Option<HttpResponse>> {
        let response = self.execute(request).await?;
        if starts_with_ignore_case(&response.body, marker) {
            Ok(Some(response))
        } else {
            Ok(None)
        }
    }
}

/// reqwest-backed transport
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    /// Build a client with the configured timeout and user agent
    pub fn new(config: &DriveConfig) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(
            USER_AGENT,
            HeaderValue::from_str(&config.user_agent)
                .map_err(|e| DriveError::InvalidConfiguration(format!("Invalid user agent: {}", e)))?,
        );

        let client = Client::builder()
            .timeout(config.timeout)
            .default_headers(headers)
            .pool_max_idle_per_host(10)
            .pool_idle_timeout(Duration::from_secs(90))
            .build()?;

        Ok(Self { client })
    }

    pub fn with_client(client: Client) -> Self {
        Self { client }
    }

    async fn send(&self, request: HttpRequest) -> Result<reqwest::Response> {
        let method = match request.method {
            HttpMethod::Get => Method::GET,
            HttpMethod::Post => Method::POST,
        };

        let mut headers = HeaderMap::new();
        for (name, value) in &request.headers {
            let name = HeaderName::from_bytes(name.as_bytes())
                .map_err(|e| DriveError::invalid_input(format!("Invalid header name {}: {}", name, e)))?;
            let value = HeaderValue::from_str(value)
                .map_err(|e| DriveError::invalid_input(format!("Invalid header value for {}: {}", name, e)))?;
            headers.insert(name, value);
        }

        let mut builder = self.client.request(method, &request.url).headers(headers);
        if let Some(body) = request.body {
            builder = builder.body(body);
        }

        debug!("{:?} {}", request.method, redact_key(&request.url));
        builder.send().await.map_err(|e| {
            if e.is_timeout() || e.is_connect() {
                DriveError::NetworkError { message: e.to_string() }
            } else {
                DriveError::ReqwestError(e)
            }
        })
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse> {
        let response = self.send(request).await?;
        let status = response.status().as_u16();
        let body = response.bytes().await?;
        Ok(HttpResponse::new(status, body.to_vec()))
    }

    async fn execute_if_body_starts_with(
        &self,
        request: HttpRequest,
        marker: &str,
    ) -> Result<Option<HttpResponse>> {
        let mut response = self.send(request).await?;
        let status = response.status().as_u16();
        let mut body: Vec<u8> = Vec::new();

        while body.len() < marker.len() {
            match response.chunk().await? {
                Some(chunk) => body.extend_from_slice(&chunk),
                None => break,
            }
        }

        if !starts_with_ignore_case(&body, marker) {
            // Dropping the response abandons the rest of the media bytes
            return Ok(None);
        }

        while let Some(chunk) = response.chunk().await? {
            body.extend_from_slice(&chunk);
        }
        Ok(Some(HttpResponse::new(status, body)))
    }
}

/// Strip the `key=` query value from a URL before it is logged
pub fn redact_key(url: &str) -> String {
    match url::Url::parse(url) {
        Ok(mut parsed) => {
            let pairs: Vec<(String, String)> = parsed
                .query_pairs()
                .map(|(k, v)| {
                    let v = if k == "key" { "[redacted]".to_string() } else { v.into_owned() };
                    (k.into_owned(), v)
                })
                .collect();
            if pairs.is_empty() {
                return parsed.to_string();
            }
            parsed.query_pairs_mut().clear().extend_pairs(pairs);
            parsed.to_string()
        }
        Err(_) => url.to_string(),
    }
}
