//! End-to-end flows through DriveExtension against a fake Drive

mod common;

use common::{dir, file, FakeDrive, API_KEY, COOKIE};
use gdrive_music::config::{DriveConfig, ExtensionSettings, CUSTOM_METADATA_URL_KEY};
use gdrive_music::error::DriveError;
use gdrive_music::extension::host::{
    HomeFeedClient, LoginClient, PlaylistClient, RadioClient, SearchFeedClient, TrackClient,
};
use gdrive_music::media::models::{MediaItem, ShelfItems, StreamableMedia};
use gdrive_music::DriveExtension;
use std::sync::Arc;

const AUDIO: &str = "audio/mpeg";

/// echomusic/
///   Road Trip/   (7 tracks + cover.jpg)
///   Empty/
///   intro.mp3, live.mp4, notes.txt
fn library(page_size: usize) -> Arc<FakeDrive> {
    let drive = Arc::new(FakeDrive::new(page_size));
    drive.add("drive-root", dir("music", "echomusic"));
    drive.add("music", dir("road", "Road Trip"));
    drive.add("music", dir("empty", "Empty"));
    drive.add("music", file("intro", "intro.mp3", AUDIO));
    drive.add("music", file("live", "live.mp4", "video/mp4"));
    drive.add("music", file("notes", "notes.txt", "text/plain"));
    for i in 0..7 {
        drive.add("road", file(&format!("r{}", i), &format!("Song {}.flac", i), "audio/flac"));
    }
    drive.add("road", file("cover", "cover.jpg", "image/jpeg"));
    drive
}

async fn logged_in(drive: Arc<FakeDrive>) -> DriveExtension {
    let extension = DriveExtension::with_transport(DriveConfig::default(), drive);
    extension
        .on_login_cookie("https://drive.google.com/drive/my-drive", COOKIE)
        .await
        .expect("login");
    extension
}

#[tokio::test]
async fn test_login_produces_persistable_user() {
    let extension = logged_in(library(100)).await;
    let user = extension.current_user().await.unwrap().unwrap();

    assert_eq!(user.id, "listener@example.com");
    assert_eq!(user.name, "listener");
    assert_eq!(user.extras.get("cookie").map(String::as_str), Some(COOKIE));
    assert_eq!(user.extras.get("email").map(String::as_str), Some("listener@example.com"));
}

#[tokio::test]
async fn test_home_feed_partitions_music_folder() {
    let drive = library(100);
    let extension = logged_in(drive.clone()).await;

    let feed = extension.load_home_feed().await.unwrap();
    assert_eq!(feed.shelves.len(), 2);

    let playlists = feed.shelf("music_playlists").unwrap();
    assert_eq!(playlists.subtitle.as_deref(), Some("2 playlists"));

    let singles = feed.shelf("music_singles").unwrap();
    match &singles.items {
        ShelfItems::Tracks(tracks) => {
            let ids: Vec<_> = tracks.iter().map(|t| t.id.as_str()).collect();
            assert_eq!(ids, vec!["intro", "live"]);
            assert!(tracks[1].is_video());
        }
        other => panic!("unexpected shelf items: {:?}", other),
    }

    // folder lookup and listing; the API key page is a GET
    assert_eq!(drive.batch_calls(), 2);
    let key_fetches = drive
        .requests()
        .iter()
        .filter(|r| r.url.contains("/drive/my-drive"))
        .count();
    assert_eq!(key_fetches, 1);

    // folder id and key are memoized
    extension.load_home_feed().await.unwrap();
    assert_eq!(drive.batch_calls(), 3);
}

#[tokio::test]
async fn test_batch_request_is_signed() {
    let drive = library(100);
    let extension = logged_in(drive.clone()).await;
    extension.load_home_feed().await.unwrap();

    let batch = drive
        .requests()
        .into_iter()
        .find(|r| r.url.contains("/batch/"))
        .unwrap();
    assert!(batch.url.ends_with(&format!("&key={}", API_KEY)));
    assert_eq!(batch.header_value("Cookie"), Some(COOKIE));
    let body = batch.body.unwrap();
    assert!(body.contains("authorization: SAPISIDHASH "));
    assert!(body.contains("x-goog-authuser: 0"));
}

#[tokio::test]
async fn test_search_feed() {
    let extension = logged_in(library(100)).await;

    let feed = extension.load_search_feed("song 3").await.unwrap();
    let ids: Vec<_> = feed.shelves.iter().map(|s| s.id.as_str()).collect();
    assert_eq!(ids, vec!["search_tracks"]);
    assert_eq!(feed.shelves[0].items.len(), 1);

    let feed = extension.load_search_feed("road").await.unwrap();
    let ids: Vec<_> = feed.shelves.iter().map(|s| s.id.as_str()).collect();
    assert_eq!(ids, vec!["search_playlists"]);
}

#[tokio::test]
async fn test_blank_search_is_home() {
    let extension = logged_in(library(100)).await;
    let home = extension.load_home_feed().await.unwrap();
    assert_eq!(extension.load_search_feed("   ").await.unwrap(), home);
}

#[tokio::test]
async fn test_playlist_count_and_paged_tracks() {
    let drive = library(3);
    let extension = logged_in(drive.clone()).await;
    let feed = extension.load_home_feed().await.unwrap();
    let road = match &feed.shelf("music_playlists").unwrap().items {
        ShelfItems::Playlists(p) => p.iter().find(|p| p.id == "road").unwrap().clone(),
        other => panic!("unexpected shelf items: {:?}", other),
    };

    let loaded = extension.load_playlist(road.clone()).await.unwrap();
    assert_eq!(loaded.track_count, Some(7));

    let tracks = extension.load_playlist_tracks(&road).await.unwrap();
    let first = tracks.load_page(None).await.unwrap();
    assert_eq!(first.items.len(), 3);
    assert!(first.continuation.is_some());

    let all = tracks.load_all().await.unwrap();
    let titles: Vec<_> = all.iter().map(|t| t.title.as_str()).collect();
    assert_eq!(
        titles,
        vec!["Song 0", "Song 1", "Song 2", "Song 3", "Song 4", "Song 5", "Song 6"]
    );

    // the count is cached
    let calls = drive.batch_calls();
    extension.load_playlist(road).await.unwrap();
    assert_eq!(drive.batch_calls(), calls);
}

#[tokio::test]
async fn test_radio_over_playlist_and_empty_playlist() {
    let extension = logged_in(library(3)).await;
    let feed = extension.load_home_feed().await.unwrap();
    let playlists = match &feed.shelf("music_playlists").unwrap().items {
        ShelfItems::Playlists(p) => p.clone(),
        other => panic!("unexpected shelf items: {:?}", other),
    };
    let road = playlists.iter().find(|p| p.id == "road").unwrap().clone();
    let empty = playlists.iter().find(|p| p.id == "empty").unwrap().clone();

    let radio = extension.radio(&MediaItem::Playlist(road), None).await.unwrap();
    assert_eq!(radio.title, "Road Trip Radio");
    let radio = extension.load_radio(radio).await.unwrap();
    let tracks = extension.load_radio_tracks(&radio).await.unwrap().load_all().await.unwrap();
    assert_eq!(tracks.len(), 7);

    let radio = extension.radio(&MediaItem::Playlist(empty), None).await.unwrap();
    let first = extension
        .load_radio_tracks(&radio)
        .await
        .unwrap()
        .load_page(None)
        .await
        .unwrap();
    assert!(first.items.is_empty());
    assert!(first.continuation.is_none());
}

#[tokio::test]
async fn test_streaming_through_interstitial() {
    let drive = library(100);
    drive.set_download("intro", b"ID3\x03binary-audio".to_vec());
    drive.set_download(
        "live",
        r#"<!doctype html><html><form><input type="hidden" name="id" value="live"><input type="hidden" name="confirm" value="t"><input type="hidden" name="uuid" value="u-1"></form></html>"#,
    );
    let extension = logged_in(drive).await;

    let feed = extension.load_home_feed().await.unwrap();
    let tracks = match &feed.shelf("music_singles").unwrap().items {
        ShelfItems::Tracks(t) => t.clone(),
        other => panic!("unexpected shelf items: {:?}", other),
    };

    let intro = extension.load_track(tracks[0].clone(), false).await.unwrap();
    let StreamableMedia::Http { request } = extension
        .load_streamable_media(&intro.streamables[0], false)
        .await
        .unwrap();
    assert_eq!(request.url, "https://drive.usercontent.google.com/download?id=intro");
    assert_eq!(request.headers.get("Cookie").map(String::as_str), Some(COOKIE));

    let live = extension.load_track(tracks[1].clone(), false).await.unwrap();
    let StreamableMedia::Http { request } = extension
        .load_streamable_media(&live.streamables[0], false)
        .await
        .unwrap();
    assert_eq!(
        request.url,
        "https://drive.usercontent.google.com/download?id=live&confirm=t&uuid=u-1"
    );
}

#[tokio::test]
async fn test_rejected_session_requires_login_again() {
    let drive = library(100);
    let extension = logged_in(drive.clone()).await;
    extension.load_home_feed().await.unwrap();

    drive.reject_all(401);
    let playlist = gdrive_music::media::models::Playlist {
        id: "road".into(),
        title: "Road Trip".into(),
        is_editable: false,
        cover: None,
        track_count: None,
        extras: Default::default(),
    };
    let feed = extension.load_playlist_tracks(&playlist);
    let tracks = feed.await.unwrap();
    let err = tracks.load_page(None).await.unwrap_err();

    assert!(matches!(err, DriveError::LoginRequired));
    assert!(extension.current_user().await.unwrap().is_none());
    assert!(matches!(extension.load_home_feed().await, Err(DriveError::LoginRequired)));
}

#[tokio::test]
async fn test_missing_music_folder_is_login_required() {
    let drive = Arc::new(FakeDrive::new(100));
    let extension = logged_in(drive).await;
    let err = extension.load_home_feed().await.unwrap_err();
    assert!(err.is_auth_error());
}

#[tokio::test]
async fn test_restored_user_browses_without_new_login() {
    let drive = library(100);
    let first = logged_in(drive.clone()).await;
    let user = first.current_user().await.unwrap().unwrap();

    let second = DriveExtension::with_transport(DriveConfig::default(), drive);
    second.set_login_user(Some(&user));
    assert!(!second.load_home_feed().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_settings_without_url_keep_overlay_empty() {
    let extension = logged_in(library(100)).await;
    let started = extension.apply_settings(ExtensionSettings::new().with(CUSTOM_METADATA_URL_KEY, ""));
    assert!(started.is_none());
    assert!(extension.metadata().is_empty());
}
