use crate::constants::RANDOM_SORT_FIELD;
use crate::error::{ErrorResponse, HttpAppError, ValidatedPath, ValidatedQuery};
use crate::state::AppState;
use axum::{extract::State, response::IntoResponse, Json};
use std::sync::Arc;
use warehouse_core::models::{
    Page, PageParams, PresentationField, PresentationRecord, PresentationSummary, SearchPage,
    SortParams,
};
use warehouse_core::{AppError, MediaKind};

/// Presentation search, sorted by `sortField` (default `title`).
#[utoipa::path(
    get,
    path = "/api/ppt-search/{field}/{value}",
    tag = "presentations",
    params(
        ("field" = String, Path, description = "A metadata field such as title, organisation or slideCount, or any"),
        ("value" = String, Path, description = "Value to match; numeric fields need an integer"),
        SortParams,
        PageParams
    ),
    responses(
        (status = 200, description = "Matching presentations", body = SearchPage<PresentationSummary>),
        (status = 400, description = "Invalid field, sort field or paging parameter", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state), fields(operation = "search_presentations"))]
pub async fn search_presentations(
    State(state): State<Arc<AppState>>,
    ValidatedPath((field, value)): ValidatedPath<(String, String)>,
    ValidatedQuery(sort): ValidatedQuery<SortParams>,
    ValidatedQuery(paging): ValidatedQuery<PageParams>,
) -> Result<impl IntoResponse, HttpAppError> {
    let field = field.parse::<PresentationField>()?;
    let sort = sort.resolve()?;
    let page = paging.resolve(MediaKind::Presentation.page_limits())?;

    let (items, total) = state
        .presentations
        .search(field, &value, sort, page)
        .await?;

    Ok(Json(
        SearchPage::new(MediaKind::Presentation, page, total, items).with_sort_field(sort.as_str()),
    ))
}

/// A random sample of presentations. `total` is the size of the whole collection.
#[utoipa::path(
    get,
    path = "/api/ppt",
    tag = "presentations",
    params(PageParams),
    responses(
        (status = 200, description = "Random sample", body = SearchPage<PresentationSummary>),
        (status = 400, description = "Invalid limit", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state), fields(operation = "sample_presentations"))]
pub async fn sample_presentations(
    State(state): State<Arc<AppState>>,
    ValidatedQuery(paging): ValidatedQuery<PageParams>,
) -> Result<impl IntoResponse, HttpAppError> {
    // Only the size matters; a sample has no offset.
    let limit = paging
        .resolve(MediaKind::Presentation.page_limits())?
        .limit;

    let (items, total) = state.presentations.random_sample(limit).await?;

    Ok(Json(
        SearchPage::new(MediaKind::Presentation, Page::new(limit, 0), total, items)
            .with_sort_field(RANDOM_SORT_FIELD),
    ))
}

#[utoipa::path(
    get,
    path = "/api/ppt/{id}",
    tag = "presentations",
    params(
        ("id" = i64, Path, description = "Presentation ID")
    ),
    responses(
        (status = 200, description = "Presentation found", body = PresentationRecord),
        (status = 400, description = "Malformed ID", body = ErrorResponse),
        (status = 404, description = "Presentation not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state), fields(operation = "get_presentation"))]
pub async fn get_presentation(
    State(state): State<Arc<AppState>>,
    ValidatedPath(id): ValidatedPath<i64>,
) -> Result<impl IntoResponse, HttpAppError> {
    let presentation = state
        .presentations
        .get(id)
        .await?
        .ok_or_else(|| AppError::NotFound("Presentation not found".to_string()))?;

    Ok(Json(presentation))
}
