//! Scripted in-memory transport and fixtures for unit tests

use crate::api::models::RemoteFile;
use crate::api::transport::{HttpMethod, HttpRequest, HttpResponse, HttpTransport};
use crate::error::{DriveError, Result};
use async_trait::async_trait;
use std::sync::Mutex;

#[derive(Debug)]
struct Route {
    method: HttpMethod,
    url_contains: String,
    body_contains: Option<String>,
    response: HttpResponse,
}

/// Routes are tried in insertion order; the first match answers.
/// Unmatched requests fail with a network error.
#[derive(Debug, Default)]
pub struct MockTransport {
    routes: Mutex<Vec<Route>>,
    requests: Mutex<Vec<HttpRequest>>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_get<S: Into<String>, B: Into<Vec<u8>>>(&self, url_contains: S, status: u16, body: B) {
        self.push(HttpMethod::Get, url_contains.into(), None, status, body.into());
    }

    pub fn on_post<S: Into<String>, B: Into<Vec<u8>>>(&self, url_contains: S, status: u16, body: B) {
        self.push(HttpMethod::Post, url_contains.into(), None, status, body.into());
    }

    /// POST route that also requires a fragment of the request body
    pub fn on_post_with_body<S: Into<String>, T: Into<String>, B: Into<Vec<u8>>>(
        &self,
        url_contains: S,
        body_contains: T,
        status: u16,
        body: B,
    ) {
        self.push(
            HttpMethod::Post,
            url_contains.into(),
            Some(body_contains.into()),
            status,
            body.into(),
        );
    }

    fn push(&self, method: HttpMethod, url_contains: String, body_contains: Option<String>, status: u16, body: Vec<u8>) {
        self.routes.lock().unwrap().push(Route {
            method,
            url_contains,
            body_contains,
            response: HttpResponse::new(status, body),
        });
    }

    pub fn requests(&self) -> Vec<HttpRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn request_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    /// Number of POSTs whose body contains `fragment`
    pub fn posts_containing(&self, fragment: &str) -> usize {
        self.requests
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.method == HttpMethod::Post)
            .filter(|r| r.body.as_deref().map(|b| b.contains(fragment)).unwrap_or(false))
            .count()
    }
}

#[async_trait]
impl HttpTransport for MockTransport {
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse> {
        self.requests.lock().unwrap().push(request.clone());
        let routes = self.routes.lock().unwrap();
        routes
            .iter()
            .find(|route| {
                route.method == request.method
                    && request.url.contains(&route.url_contains)
                    && route
                        .body_contains
                        .as_ref()
                        .map(|frag| request.body.as_deref().map(|b| b.contains(frag.as_str())).unwrap_or(false))
                        .unwrap_or(true)
            })
            .map(|route| route.response.clone())
            .ok_or_else(|| DriveError::NetworkError {
                message: format!("no route for {:?} {}", request.method, request.url),
            })
    }
}

/// Batch response body wrapping a listing
pub fn batch_listing(files: &[RemoteFile], next_page_token: Option<&str>) -> String {
    let listing = serde_json::json!({
        "kind": "drive#fileList",
        "nextPageToken": next_page_token,
        "items": files,
    });
    format!(
        "--batch_test\r\nContent-Type: application/http\r\nContent-ID: response-1\r\n\r\nHTTP/1.1 200 OK\r\nContent-Type: application/json; charset=UTF-8\r\n\r\n{}\r\n--batch_test--\r\n",
        listing
    )
}

pub fn audio(id: &str, title: &str) -> RemoteFile {
    RemoteFile {
        id: id.to_string(),
        title: title.to_string(),
        mime_type: "audio/mpeg".to_string(),
        file_size: Some("1024".to_string()),
    }
}

pub fn folder(id: &str, title: &str) -> RemoteFile {
    RemoteFile {
        id: id.to_string(),
        title: title.to_string(),
        mime_type: crate::api::models::FOLDER_MIME_TYPE.to_string(),
        file_size: None,
    }
}

pub fn other(id: &str, title: &str, mime: &str) -> RemoteFile {
    RemoteFile {
        id: id.to_string(),
        title: title.to_string(),
        mime_type: mime.to_string(),
        file_size: None,
    }
}
