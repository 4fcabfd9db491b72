//! Fake Drive backend for integration tests
//!
//! Serves the three endpoints the extension talks to from in-memory folders:
//! the Drive page (API key), the batch search endpoint and the download
//! endpoint. Folder listings are split into pages of `page_size` items.

#![allow(dead_code)]

use async_trait::async_trait;
use gdrive_music::api::models::{RemoteFile, FOLDER_MIME_TYPE};
use gdrive_music::api::transport::{HttpMethod, HttpRequest, HttpResponse, HttpTransport};
use gdrive_music::error::Result;
use std::collections::HashMap;
use std::sync::Mutex;

pub const API_KEY: &str = "AIzaSyFAKEFAKEFAKEFAKEFAKEFAKEFAKEFAKE123";
pub const COOKIE: &str = "NID=511; SAPISID=sekret/abc; remember=listener%40example.com";

#[derive(Debug, Default)]
pub struct FakeDrive {
    /// parent id -> children in listing order
    folders: Mutex<HashMap<String, Vec<RemoteFile>>>,
    /// file id -> download body
    downloads: Mutex<HashMap<String, Vec<u8>>>,
    page_size: usize,
    reject_with: Mutex<Option<u16>>,
    log: Mutex<Vec<HttpRequest>>,
}

pub fn file(id: &str, title: &str, mime: &str) -> RemoteFile {
    RemoteFile {
        id: id.to_string(),
        title: title.to_string(),
        mime_type: mime.to_string(),
        file_size: None,
    }
}

pub fn dir(id: &str, title: &str) -> RemoteFile {
    file(id, title, FOLDER_MIME_TYPE)
}

impl FakeDrive {
    pub fn new(page_size: usize) -> Self {
        Self {
            page_size: page_size.max(1),
            ..Default::default()
        }
    }

    pub fn add(&self, parent: &str, item: RemoteFile) {
        self.folders
            .lock()
            .unwrap()
            .entry(parent.to_string())
            .or_default()
            .push(item);
    }

    pub fn set_download(&self, file_id: &str, body: impl Into<Vec<u8>>) {
        self.downloads.lock().unwrap().insert(file_id.to_string(), body.into());
    }

    /// Answer every following request with this status
    pub fn reject_all(&self, status: u16) {
        *self.reject_with.lock().unwrap() = Some(status);
    }

    pub fn batch_calls(&self) -> usize {
        self.log
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.method == HttpMethod::Post)
            .count()
    }

    pub fn requests(&self) -> Vec<HttpRequest> {
        self.log.lock().unwrap().clone()
    }

    fn all_files(&self) -> Vec<(String, RemoteFile)> {
        self.folders
            .lock()
            .unwrap()
            .iter()
            .flat_map(|(parent, items)| items.iter().map(move |f| (parent.clone(), f.clone())))
            .collect()
    }

    fn is_below(&self, id: &str, ancestor: &str) -> bool {
        let files = self.all_files();
        let mut current = id.to_string();
        for _ in 0..32 {
            match files.iter().find(|(_, f)| f.id == current) {
                Some((parent, _)) if parent == ancestor => return true,
                Some((parent, _)) => current = parent.clone(),
                None => return false,
            }
        }
        false
    }

    fn search(&self, query: &str) -> Vec<RemoteFile> {
        if let Some(rest) = query.strip_prefix("title='") {
            let name = rest.split('\'').next().unwrap_or_default();
            return self
                .all_files()
                .into_iter()
                .map(|(_, f)| f)
                .filter(|f| f.title == name && f.mime_type == FOLDER_MIME_TYPE)
                .collect();
        }

        if let Some(rest) = query.strip_prefix("trashed=false and '") {
            let parent = rest.split('\'').next().unwrap_or_default();
            return self.folders.lock().unwrap().get(parent).cloned().unwrap_or_default();
        }

        if let Some(rest) = query.strip_prefix("title contains '") {
            let text = rest.split("' and").next().unwrap_or_default().replace("\\'", "'");
            let ancestor = query
                .rsplit("and '")
                .next()
                .and_then(|s| s.split('\'').next())
                .unwrap_or_default()
                .to_string();
            return self
                .all_files()
                .into_iter()
                .filter(|(_, f)| f.title.to_lowercase().contains(&text.to_lowercase()))
                .filter(|(_, f)| self.is_below(&f.id, &ancestor))
                .map(|(_, f)| f)
                .collect();
        }

        Vec::new()
    }

    fn batch_response(&self, request: &HttpRequest) -> HttpResponse {
        let body = request.body.clone().unwrap_or_default();
        let get_line = body
            .lines()
            .find(|l| l.starts_with("GET "))
            .unwrap_or_default()
            .trim_start_matches("GET ");
        let parsed = url::Url::parse(&format!("https://fake.test{}", get_line)).unwrap();
        let params: HashMap<String, String> = parsed.query_pairs().into_owned().collect();

        let query = params.get("q").cloned().unwrap_or_default();
        let offset: usize = params
            .get("pageToken")
            .and_then(|t| t.strip_prefix("offset-"))
            .and_then(|n| n.parse().ok())
            .unwrap_or(0);

        let all = self.search(&query);
        let end = (offset + self.page_size).min(all.len());
        let page = all.get(offset..end).map(|s| s.to_vec()).unwrap_or_default();
        let next = if end < all.len() { Some(format!("offset-{}", end)) } else { None };

        let listing = serde_json::json!({
            "kind": "drive#fileList",
            "nextPageToken": next,
            "items": page,
        });
        HttpResponse::new(
            200,
            format!(
                "--batch_fake\r\nContent-Type: application/http\r\n\r\nHTTP/1.1 200 OK\r\nContent-Type: application/json\r\n\r\n{}\r\n--batch_fake--\r\n",
                listing
            ),
        )
    }
}

#[async_trait]
impl HttpTransport for FakeDrive {
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse> {
        self.log.lock().unwrap().push(request.clone());

        if let Some(status) = *self.reject_with.lock().unwrap() {
            return Ok(HttpResponse::new(status, "rejected"));
        }

        if request.url.contains("/drive/my-drive") {
            return Ok(HttpResponse::new(
                200,
                format!("<html><script>window.cfg=[\"{}\",\"x\"]</script></html>", API_KEY),
            ));
        }

        if request.url.contains("/batch/") {
            return Ok(self.batch_response(&request));
        }

        if let Some((_, id)) = request.url.split_once("download?id=") {
            let id = id.split('&').next().unwrap_or_default();
            let body = self.downloads.lock().unwrap().get(id).cloned().unwrap_or_default();
            return Ok(HttpResponse::new(200, body));
        }

        Ok(HttpResponse::new(404, "not found"))
    }
}
