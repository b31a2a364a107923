//! Test helpers: an in-memory database behind the full router.
//!
//! Run from workspace root: `cargo test -p warehouse-api`.

#![allow(dead_code)]

use axum_test::TestServer;
use serde_json::{json, Map, Value};
use sqlx::SqlitePool;
use std::sync::Arc;
use warehouse_api::setup::routes;
use warehouse_api::AppState;
use warehouse_core::models::{
    CommonTags, ImageMeta, MusicMeta, NewImage, NewPdf, NewPresentation, NewTrack,
    PresentationMeta,
};
use warehouse_core::{Config, WarehouseConfig};

pub struct TestApp {
    pub server: TestServer,
    pub state: Arc<AppState>,
}

impl TestApp {
    pub fn client(&self) -> &TestServer {
        &self.server
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.state.pool
    }
}

/// Router over a fresh migrated in-memory database with default configuration.
pub async fn setup_test_app() -> TestApp {
    let pool = warehouse_db::in_memory_pool()
        .await
        .expect("Failed to create test database");
    let config = Config(Box::new(
        WarehouseConfig::from_lookup(|_| None).expect("Failed to build test config"),
    ));
    let state = Arc::new(AppState::new(config.clone(), pool));
    let app = routes::setup_routes(&config, state.clone()).expect("Failed to setup routes");
    let server = TestServer::new(app).expect("Failed to create test server");

    TestApp { server, state }
}

pub fn image(file: &str, make: Option<&str>, date: Option<&str>, coords: Option<(f64, f64)>) -> NewImage {
    NewImage {
        file: file.to_string(),
        meta: ImageMeta {
            file_name: file.to_string(),
            file_path: format!("/warehouse/images/{}", file),
            size_bytes: 4096,
            mtime_iso: Some("2024-01-01T00:00:00.000Z".to_string()),
            make: make.map(str::to_string),
            model: Some("ILCE-7M3".to_string()),
            create_date: date.map(str::to_string),
            latitude: coords.map(|c| c.0),
            longitude: coords.map(|c| c.1),
            width: Some(6000),
            height: Some(4000),
            raw: json!({ "Make": make }),
        },
    }
}

pub fn track(file: &str, artist: Option<&str>, album: &str, year: Option<u32>) -> NewTrack {
    NewTrack {
        file: file.to_string(),
        meta: MusicMeta {
            file: file.to_string(),
            common: CommonTags {
                title: Some(format!("Song {}", file)),
                artist: artist.map(str::to_string),
                album: Some(album.to_string()),
                genre: vec!["Pop".to_string()],
                year,
                ..Default::default()
            },
            format: Default::default(),
            size_bytes: 1_000_000,
            mtime_iso: None,
        },
    }
}

pub fn pdf(filename: &str, pages: i64, title: &str) -> NewPdf {
    let mut info = Map::new();
    info.insert("Title".to_string(), Value::from(title));
    info.insert("Author".to_string(), Value::from("Finance Team"));
    let mut xmp = Map::new();
    xmp.insert("dc:title".to_string(), Value::from(title));
    NewPdf {
        filename: filename.to_string(),
        numpages: Some(pages),
        text: format!("Quarterly figures in {}", filename),
        xmp,
        info,
    }
}

pub fn presentation(file_name: &str, title: &str, slides: i64, words: i64) -> NewPresentation {
    NewPresentation {
        meta: PresentationMeta {
            file_name: file_name.to_string(),
            original: Some(format!("{}.pptx", title)),
            mimetype: Some("application/vnd.ms-powerpoint".to_string()),
            title: Some(title.to_string()),
            organisation: Some("ACME".to_string()),
            slide_count: Some(slides),
            word_count: Some(words),
            ..Default::default()
        },
    }
}
