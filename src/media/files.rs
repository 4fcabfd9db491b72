//! File name helpers: media classification, titles, thumbnails

use serde::{Deserialize, Serialize};

const AUDIO_EXTENSIONS: [&str; 8] = ["mp3", "m4a", "flac", "wav", "ogg", "opus", "aac", "wma"];

const VIDEO_EXTENSIONS: [&str; 11] = [
    "mp4", "mkv", "webm", "avi", "mov", "wmv", "flv", "m4v", "3gp", "mpeg", "mpg",
];

/// What a file name says about its content
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MediaKind {
    Audio,
    Video,
    Other,
}

/// Lowercased text after the last `.`, empty when there is none
pub fn extension(file_name: &str) -> String {
    file_name
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .unwrap_or_default()
}

pub fn media_kind(file_name: &str) -> MediaKind {
    let ext = extension(file_name);
    if AUDIO_EXTENSIONS.contains(&ext.as_str()) {
        MediaKind::Audio
    } else if VIDEO_EXTENSIONS.contains(&ext.as_str()) {
        MediaKind::Video
    } else {
        MediaKind::Other
    }
}

pub fn is_audio_file(file_name: &str) -> bool {
    media_kind(file_name) == MediaKind::Audio
}

pub fn is_video_file(file_name: &str) -> bool {
    media_kind(file_name) == MediaKind::Video
}

pub fn is_media_file(file_name: &str) -> bool {
    media_kind(file_name) != MediaKind::Other
}

/// File name without its extension; the raw name if stripping leaves nothing
pub fn clean_title(file_name: &str) -> String {
    match file_name.rsplit_once('.') {
        Some((stem, _)) if !stem.is_empty() => stem.to_string(),
        _ => file_name.to_string(),
    }
}

pub fn thumbnail_url(file_id: &str) -> String {
    format!("https://drive.google.com/thumbnail?authuser=0&sz=w500&id={}", file_id)
}
