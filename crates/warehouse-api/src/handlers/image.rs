use crate::error::{ErrorResponse, HttpAppError, ValidatedPath, ValidatedQuery};
use crate::state::AppState;
use axum::{extract::State, response::IntoResponse, Json};
use std::sync::Arc;
use warehouse_core::models::{
    ImageField, ImageHit, ImageRecord, ImageSearchParams, PageParams, SearchPage,
};
use warehouse_core::{AppError, MediaKind};

async fn run_search(
    state: &AppState,
    paging: &PageParams,
    params: ImageSearchParams,
    field: Option<(ImageField, String)>,
) -> Result<SearchPage<ImageHit>, HttpAppError> {
    let page = paging.resolve(MediaKind::Image.page_limits())?;
    let search = params.into_search(field)?;
    let (items, total) = state.images.search(&search, page).await?;
    Ok(SearchPage::new(MediaKind::Image, page, total, items))
}

/// Faceted image search.
#[utoipa::path(
    get,
    path = "/api/image/search",
    tag = "images",
    params(ImageSearchParams, PageParams),
    responses(
        (status = 200, description = "Matching images", body = SearchPage<ImageHit>),
        (status = 400, description = "Invalid filter or paging parameter", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state), fields(operation = "search_images"))]
pub async fn search_images(
    State(state): State<Arc<AppState>>,
    ValidatedQuery(paging): ValidatedQuery<PageParams>,
    ValidatedQuery(params): ValidatedQuery<ImageSearchParams>,
) -> Result<impl IntoResponse, HttpAppError> {
    Ok(Json(run_search(&state, &paging, params, None).await?))
}

/// Image search seeded from a path field. `any` matches file, make or model.
#[utoipa::path(
    get,
    path = "/api/image-search/{field}/{value}",
    tag = "images",
    params(
        ("field" = String, Path, description = "One of file, make, model, any"),
        ("value" = String, Path, description = "Value to match"),
        ImageSearchParams,
        PageParams
    ),
    responses(
        (status = 200, description = "Matching images", body = SearchPage<ImageHit>),
        (status = 400, description = "Invalid field name or parameter", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state, params), fields(operation = "search_images_by_field"))]
pub async fn search_images_by_field(
    State(state): State<Arc<AppState>>,
    ValidatedPath((field, value)): ValidatedPath<(String, String)>,
    ValidatedQuery(paging): ValidatedQuery<PageParams>,
    ValidatedQuery(params): ValidatedQuery<ImageSearchParams>,
) -> Result<impl IntoResponse, HttpAppError> {
    let field = field.parse::<ImageField>()?;
    Ok(Json(
        run_search(&state, &paging, params, Some((field, value))).await?,
    ))
}

/// Every image, newest capture first.
#[utoipa::path(
    get,
    path = "/api/image",
    tag = "images",
    params(PageParams),
    responses(
        (status = 200, description = "Page of images", body = SearchPage<ImageHit>),
        (status = 400, description = "Invalid paging parameter", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state), fields(operation = "list_images"))]
pub async fn list_images(
    State(state): State<Arc<AppState>>,
    ValidatedQuery(paging): ValidatedQuery<PageParams>,
) -> Result<impl IntoResponse, HttpAppError> {
    let page = paging.resolve(MediaKind::Image.page_limits())?;
    let (items, total) = state.images.list(page).await?;
    Ok(Json(SearchPage::new(MediaKind::Image, page, total, items)))
}

#[utoipa::path(
    get,
    path = "/api/image/{id}",
    tag = "images",
    params(
        ("id" = i64, Path, description = "Image ID")
    ),
    responses(
        (status = 200, description = "Image found", body = ImageRecord),
        (status = 400, description = "Malformed ID", body = ErrorResponse),
        (status = 404, description = "Image not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state), fields(operation = "get_image"))]
pub async fn get_image(
    State(state): State<Arc<AppState>>,
    ValidatedPath(id): ValidatedPath<i64>,
) -> Result<impl IntoResponse, HttpAppError> {
    let image = state
        .images
        .get(id)
        .await?
        .ok_or_else(|| AppError::NotFound("Image not found".to_string()))?;

    Ok(Json(image))
}
