//! Search and lookup route groups, one per media collection.

use crate::constants::API_PREFIX;
use crate::handlers;
use crate::state::AppState;
use axum::routing::get;
use axum::Router;
use std::sync::Arc;

pub fn image_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route(
            &format!("{}/image/search", API_PREFIX),
            get(handlers::image::search_images),
        )
        .route(
            &format!("{}/image-search/{{field}}/{{value}}", API_PREFIX),
            get(handlers::image::search_images_by_field),
        )
        .route(&format!("{}/image", API_PREFIX), get(handlers::image::list_images))
        .route(&format!("{}/image/{{id}}", API_PREFIX), get(handlers::image::get_image))
}

pub fn music_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route(
            &format!("{}/music-search/{{field}}/{{value}}", API_PREFIX),
            get(handlers::music::search_music),
        )
        .route(&format!("{}/music", API_PREFIX), get(handlers::music::list_music))
        .route(&format!("{}/music/{{id}}", API_PREFIX), get(handlers::music::get_track))
}

pub fn pdf_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route(
            &format!("{}/pdf-search/{{field}}/{{value}}", API_PREFIX),
            get(handlers::pdf::search_pdfs),
        )
        .route(&format!("{}/pdf", API_PREFIX), get(handlers::pdf::list_pdfs))
        .route(&format!("{}/pdf/{{id}}", API_PREFIX), get(handlers::pdf::get_pdf))
        .route(&format!("{}/pdf/{{id}}/xmp", API_PREFIX), get(handlers::pdf::get_pdf_xmp))
        .route(&format!("{}/pdf/{{id}}/text", API_PREFIX), get(handlers::pdf::get_pdf_text))
}

pub fn presentation_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route(
            &format!("{}/ppt-search/{{field}}/{{value}}", API_PREFIX),
            get(handlers::presentation::search_presentations),
        )
        .route(
            &format!("{}/ppt", API_PREFIX),
            get(handlers::presentation::sample_presentations),
        )
        .route(
            &format!("{}/ppt/{{id}}", API_PREFIX),
            get(handlers::presentation::get_presentation),
        )
}
