use crate::error::{ErrorResponse, HttpAppError, ValidatedPath, ValidatedQuery};
use crate::state::AppState;
use axum::{extract::State, response::IntoResponse, Json};
use std::sync::Arc;
use warehouse_core::models::{MusicField, MusicRecord, MusicTrack, PageParams, SearchPage};
use warehouse_core::{AppError, MediaKind};

/// Tag search. `any` with `okänd` or `unknown` selects tracks with a missing tag; `year`
/// also takes comparisons such as `>=1990`.
#[utoipa::path(
    get,
    path = "/api/music-search/{field}/{value}",
    tag = "music",
    params(
        ("field" = String, Path, description = "One of file, title, album, artist, genre, year, any"),
        ("value" = String, Path, description = "Value to match"),
        PageParams
    ),
    responses(
        (status = 200, description = "Matching tracks", body = SearchPage<MusicTrack>),
        (status = 400, description = "Invalid field name or paging parameter", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state), fields(operation = "search_music"))]
pub async fn search_music(
    State(state): State<Arc<AppState>>,
    ValidatedPath((field, value)): ValidatedPath<(String, String)>,
    ValidatedQuery(paging): ValidatedQuery<PageParams>,
) -> Result<impl IntoResponse, HttpAppError> {
    let field = field.parse::<MusicField>()?;
    let page = paging.resolve(MediaKind::Music.page_limits())?;

    let (items, total) = state.music.search(field, &value, page).await?;

    Ok(Json(SearchPage::new(MediaKind::Music, page, total, items)))
}

#[utoipa::path(
    get,
    path = "/api/music",
    tag = "music",
    params(PageParams),
    responses(
        (status = 200, description = "Page of tracks", body = SearchPage<MusicTrack>),
        (status = 400, description = "Invalid paging parameter", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state), fields(operation = "list_music"))]
pub async fn list_music(
    State(state): State<Arc<AppState>>,
    ValidatedQuery(paging): ValidatedQuery<PageParams>,
) -> Result<impl IntoResponse, HttpAppError> {
    let page = paging.resolve(MediaKind::Music.page_limits())?;
    let (items, total) = state.music.list(page).await?;
    Ok(Json(SearchPage::new(MediaKind::Music, page, total, items)))
}

#[utoipa::path(
    get,
    path = "/api/music/{id}",
    tag = "music",
    params(
        ("id" = i64, Path, description = "Track ID")
    ),
    responses(
        (status = 200, description = "Track found", body = MusicRecord),
        (status = 400, description = "Malformed ID", body = ErrorResponse),
        (status = 404, description = "Track not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state), fields(operation = "get_track"))]
pub async fn get_track(
    State(state): State<Arc<AppState>>,
    ValidatedPath(id): ValidatedPath<i64>,
) -> Result<impl IntoResponse, HttpAppError> {
    let track = state
        .music
        .get(id)
        .await?
        .ok_or_else(|| AppError::NotFound("Track not found".to_string()))?;

    Ok(Json(track))
}
