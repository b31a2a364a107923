//! OpenAPI documentation.

use utoipa::OpenApi;

use crate::error;
use crate::handlers;
use warehouse_core::models;

/// The OpenAPI document served at `/api/openapi.json`.
pub fn get_openapi_spec() -> utoipa::openapi::OpenApi {
    ApiDoc::openapi()
}

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Warehouse API",
        version = "0.1.0",
        description = "Read-only metadata search over imported images, music, PDF documents and presentations. Every search returns the same paged envelope."
    ),
    paths(
        // Images
        handlers::image::search_images,
        handlers::image::search_images_by_field,
        handlers::image::list_images,
        handlers::image::get_image,
        // Music
        handlers::music::search_music,
        handlers::music::list_music,
        handlers::music::get_track,
        // PDF
        handlers::pdf::search_pdfs,
        handlers::pdf::list_pdfs,
        handlers::pdf::get_pdf,
        handlers::pdf::get_pdf_xmp,
        handlers::pdf::get_pdf_text,
        // Presentations
        handlers::presentation::search_presentations,
        handlers::presentation::sample_presentations,
        handlers::presentation::get_presentation,
    ),
    components(
        schemas(
            error::ErrorResponse,
            models::MediaKind,
            models::ImageHit,
            models::ImageRecord,
            models::MusicTrack,
            models::MusicRecord,
            models::PdfSummary,
            models::PdfRecord,
            models::PdfText,
            models::PresentationSummary,
            models::PresentationRecord,
        )
    ),
    tags(
        (name = "images", description = "EXIF metadata of photographs, with date and distance filters"),
        (name = "music", description = "Audio tags and stream properties"),
        (name = "pdf", description = "Document info, XMP metadata and text snippets"),
        (name = "presentations", description = "PowerPoint metadata from files and catalogues"),
    )
)]
pub struct ApiDoc;
