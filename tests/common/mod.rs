//! Shared test harness for integration tests.
//!
//! Provides [`TestHarness`] which creates a temporary database and storage
//! root, default config, and a full [`AppContext`]. The [`with_server`]
//! constructor starts Axum on a random port for HTTP-level testing.
#![allow(dead_code)]

use std::net::SocketAddr;

use hotelier_core::config::Config;
use hotelier_core::hotel::HotelInput;
use hotelier_core::HotelId;
use hotelier_db::pool::{init_pool, DbPool};
use hotelier_server::context::AppContext;
use hotelier_server::router::build_router;

pub const PNG: &[u8] = b"\x89PNG\r\n\x1a\n\0\0\0\rIHDR\0\0\0\x01\0\0\0\x01";
pub const JPEG: &[u8] = b"\xFF\xD8\xFF\xE0\0\x10JFIF\0\x01\x01\0\0\x01\0\x01\0\0";
pub const WEBP: &[u8] = b"RIFF\x1a\0\0\0WEBPVP8 \x0e\0\0\0";

/// Test harness wrapping a fully-constructed [`AppContext`] backed by a
/// database file and storage root in a temporary directory.
pub struct TestHarness {
    pub ctx: AppContext,
    pub db: DbPool,
    pub dir: tempfile::TempDir,
}

impl TestHarness {
    /// Create a new harness with default configuration.
    pub fn new() -> Self {
        Self::with_config(Config::default())
    }

    /// Create a new harness with a custom configuration. The database and
    /// storage paths are always redirected into a fresh temp directory.
    pub fn with_config(mut config: Config) -> Self {
        let dir = tempfile::tempdir().expect("failed to create temp dir");
        config.server.db_path = dir.path().join("hotelier.db");
        config.storage.root_dir = dir.path().join("storage");
        std::fs::create_dir_all(&config.storage.root_dir).expect("failed to create storage root");

        let db = init_pool(config.server.db_path.to_str().expect("utf-8 temp path"))
            .expect("failed to create db pool");
        let ctx = AppContext::new(config, db.clone());

        Self { ctx, db, dir }
    }

    /// Start an Axum server on a random port and return the harness together
    /// with the bound socket address.
    pub async fn with_server() -> (Self, SocketAddr) {
        Self::with_server_config(Config::default()).await
    }

    /// Start an Axum server with custom config on a random port.
    pub async fn with_server_config(config: Config) -> (Self, SocketAddr) {
        let harness = Self::with_config(config);
        let app = build_router(harness.ctx.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("failed to bind random port");
        let addr = listener.local_addr().expect("failed to get local addr");

        tokio::spawn(async move {
            axum::serve(listener, app).await.ok();
        });

        (harness, addr)
    }

    /// Get a database connection from the pool.
    pub fn conn(&self) -> hotelier_db::pool::PooledConnection {
        hotelier_db::pool::get_conn(&self.db).expect("failed to get db connection")
    }

    /// Insert a hotel directly and return its ID.
    pub fn create_hotel(&self, name: &str) -> HotelId {
        hotelier_db::queries::hotels::create_hotel(&self.conn(), &hotel_input(name))
            .expect("failed to create hotel")
            .id
    }

    /// Path of a stored blob on disk.
    pub fn blob_path(&self, key: &str) -> std::path::PathBuf {
        self.ctx.config.storage.root_dir.join(key)
    }

    /// Positions of a hotel's pictures, in display order.
    pub fn positions(&self, hotel_id: HotelId) -> Vec<i64> {
        hotelier_db::queries::pictures::list_pictures(&self.conn(), hotel_id)
            .expect("failed to list pictures")
            .iter()
            .map(|p| p.position)
            .collect()
    }
}

pub fn hotel_input(name: &str) -> HotelInput {
    HotelInput {
        name: name.to_string(),
        address1: "5 Avenue Anatole France".into(),
        address2: None,
        zipcode: "75007".into(),
        city: "Paris".into(),
        country: "France".into(),
        lat: 48.8584,
        lng: 2.2945,
        description: Some("View of the tower".into()),
        max_capacity: 80,
        price_per_night: 320.0,
    }
}

/// Multipart form with a single `picture` part.
pub fn picture_form(data: &'static [u8], file_name: &str, mime: &str) -> reqwest::multipart::Form {
    let part = reqwest::multipart::Part::bytes(data)
        .file_name(file_name.to_string())
        .mime_str(mime)
        .expect("valid mime");
    reqwest::multipart::Form::new().part("picture", part)
}

/// Upload a picture over HTTP and return the response JSON.
pub async fn upload(
    client: &reqwest::Client,
    addr: SocketAddr,
    hotel_id: HotelId,
    data: &'static [u8],
    file_name: &str,
    mime: &str,
) -> reqwest::Response {
    client
        .post(format!("http://{addr}/api/hotels/{hotel_id}/pictures"))
        .multipart(picture_form(data, file_name, mime))
        .send()
        .await
        .expect("upload request failed")
}
