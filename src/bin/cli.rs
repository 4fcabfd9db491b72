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


use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use gdrive_music::api::multipart;
use gdrive_music::api::signing::signed_authorization_header_now;
use gdrive_music::config::{DriveConfig, DRIVE_ORIGIN};
use gdrive_music::extension::host::{
    HomeFeedClient, LoginClient, PlaylistClient, SearchFeedClient, TrackClient,
};
use gdrive_music::extension::STREAMABLE_TITLE;
use gdrive_music::media::models::{Extras, Feed, Playlist, ShelfItems, Streamable, StreamableMedia};
use gdrive_music::DriveExtension;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "gdrive-music-cli")]
#[command(about = "GDrive Music CLI - Desktop testing tool", long_about = None)]
struct Cli {
    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct CookieArg {
    /// Raw Cookie header captured from a signed-in drive.google.com tab
    #[arg(long, env = "GDRIVE_COOKIE", hide_env_values = true)]
    cookie: String,
}

#[derive(Subcommand)]
enum Commands {
    /// Print a SAPISIDHASH header for the current second
    Hash {
        /// Session secret (SAPISID value)
        secret: String,
        #[arg(long, default_value = DRIVE_ORIGIN)]
        origin: String,
    },
    /// Show who the cookie belongs to
    Whoami(CookieArg),
    /// List the music folder
    Home(CookieArg),
    /// Search the music folder by title
    Search {
        #[command(flatten)]
        auth: CookieArg,
        query: String,
    },
    /// Count and list the tracks of a playlist folder
    Tracks {
        #[command(flatten)]
        auth: CookieArg,
        playlist_id: String,
    },
    /// Resolve the playable URL of a file
    Resolve {
        #[command(flatten)]
        auth: CookieArg,
        file_id: String,
    },
    /// Extract the JSON payload from a saved batch response
    Extract {
        /// File holding the raw response body
        file: std::path::PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Hash { secret, origin } => {
            println!("{}", signed_authorization_header_now(&secret, &origin));
        }
        Commands::Whoami(auth) => {
            let extension = login(&auth).await?;
            let user = extension
                .current_user()
                .await?
                .context("no user after login")?;
            println!("{} ({})", user.name, user.id);
        }
        Commands::Home(auth) => {
            let extension = login(&auth).await?;
            print_feed(&extension.load_home_feed().await?);
        }
        Commands::Search { auth, query } => {
            let extension = login(&auth).await?;
            print_feed(&extension.load_search_feed(&query).await?);
        }
        Commands::Tracks { auth, playlist_id } => {
            let extension = login(&auth).await?;
            let playlist = Playlist {
                id: playlist_id.clone(),
                title: playlist_id,
                is_editable: false,
                cover: None,
                track_count: None,
                extras: Extras::new(),
            };
            let playlist = extension.load_playlist(playlist).await?;
            println!("{} media files", playlist.track_count.unwrap_or(0));

            let tracks = extension.load_playlist_tracks(&playlist).await?.load_all().await?;
            for (i, track) in tracks.iter().enumerate() {
                println!("{:4}  {}  [{}]", i + 1, track.title, track.id);
            }
        }
        Commands::Resolve { auth, file_id } => {
            let extension = login(&auth).await?;
            let streamable = Streamable::server(file_id, 0, STREAMABLE_TITLE);
            let StreamableMedia::Http { request } = extension.load_streamable_media(&streamable, false).await?;
            println!("{}", request.url);
        }
        Commands::Extract { file } => {
            let body = std::fs::read_to_string(&file)
                .with_context(|| format!("reading {}", file.display()))?;
            println!("{}", multipart::extract_embedded_json(&body)?);
        }
    }

    Ok(())
}

fn init_logging(verbose: u8) {
    let default = match verbose {
        0 => "gdrive_music=warn",
        1 => "gdrive_music=debug",
        _ => "gdrive_music=trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt().with_env_filter(filter).with_target(false).init();
}

async fn login(auth: &CookieArg) -> Result<DriveExtension> {
    let extension = DriveExtension::new(DriveConfig::default())?;
    extension
        .on_login_cookie(DRIVE_ORIGIN, &auth.cookie)
        .await
        .map_err(|e| anyhow::anyhow!(e.user_message()))?;
    Ok(extension)
}

fn print_feed(feed: &Feed) {
    if feed.is_empty() {
        println!("(nothing here)");
        return;
    }
    for shelf in &feed.shelves {
        match &shelf.subtitle {
            Some(subtitle) => println!("== {} ({})", shelf.title, subtitle),
            None => println!("== {}", shelf.title),
        }
        match &shelf.items {
            ShelfItems::Playlists(playlists) => {
                for p in playlists {
                    println!("  [playlist] {}  [{}]", p.title, p.id);
                }
            }
            ShelfItems::Tracks(tracks) => {
                for t in tracks {
                    let kind = if t.is_video() { "video" } else { "track" };
                    println!("  [{}] {}  [{}]", kind, t.title, t.id);
                }
            }
        }
    }
}
