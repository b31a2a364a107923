use crate::error::{ErrorResponse, HttpAppError, ValidatedPath, ValidatedQuery};
use crate::state::AppState;
use axum::{extract::State, response::IntoResponse, Json};
use std::sync::Arc;
use warehouse_core::models::{PageParams, PdfField, PdfRecord, PdfSummary, PdfText, SearchPage};
use warehouse_core::{AppError, MediaKind};

fn not_found() -> AppError {
    AppError::NotFound("PDF not found".to_string())
}

/// Document search. `pages` takes `N`, `>N`, `<N` or `MIN-MAX`.
#[utoipa::path(
    get,
    path = "/api/pdf-search/{field}/{value}",
    tag = "pdf",
    params(
        ("field" = String, Path, description = "One of filename, title, author, subject, keywords, pages, text, everything"),
        ("value" = String, Path, description = "Value to match, or a page-count filter"),
        PageParams
    ),
    responses(
        (status = 200, description = "Matching documents", body = SearchPage<PdfSummary>),
        (status = 400, description = "Invalid field name, page range or paging parameter", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state), fields(operation = "search_pdfs"))]
pub async fn search_pdfs(
    State(state): State<Arc<AppState>>,
    ValidatedPath((field, value)): ValidatedPath<(String, String)>,
    ValidatedQuery(paging): ValidatedQuery<PageParams>,
) -> Result<impl IntoResponse, HttpAppError> {
    let field = field.parse::<PdfField>()?;
    let page = paging.resolve(MediaKind::Pdf.page_limits())?;

    let (items, total) = state.pdfs.search(field, &value, page).await?;

    Ok(Json(SearchPage::new(MediaKind::Pdf, page, total, items)))
}

#[utoipa::path(
    get,
    path = "/api/pdf",
    tag = "pdf",
    params(PageParams),
    responses(
        (status = 200, description = "Page of documents", body = SearchPage<PdfSummary>),
        (status = 400, description = "Invalid paging parameter", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state), fields(operation = "list_pdfs"))]
pub async fn list_pdfs(
    State(state): State<Arc<AppState>>,
    ValidatedQuery(paging): ValidatedQuery<PageParams>,
) -> Result<impl IntoResponse, HttpAppError> {
    let page = paging.resolve(MediaKind::Pdf.page_limits())?;
    let (items, total) = state.pdfs.list(page).await?;
    Ok(Json(SearchPage::new(MediaKind::Pdf, page, total, items)))
}

#[utoipa::path(
    get,
    path = "/api/pdf/{id}",
    tag = "pdf",
    params(
        ("id" = i64, Path, description = "PDF ID")
    ),
    responses(
        (status = 200, description = "Document found", body = PdfRecord),
        (status = 400, description = "Malformed ID", body = ErrorResponse),
        (status = 404, description = "Document not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state), fields(operation = "get_pdf"))]
pub async fn get_pdf(
    State(state): State<Arc<AppState>>,
    ValidatedPath(id): ValidatedPath<i64>,
) -> Result<impl IntoResponse, HttpAppError> {
    let pdf = state.pdfs.get(id).await?.ok_or_else(not_found)?;
    Ok(Json(pdf))
}

/// XMP metadata of one document.
#[utoipa::path(
    get,
    path = "/api/pdf/{id}/xmp",
    tag = "pdf",
    params(
        ("id" = i64, Path, description = "PDF ID")
    ),
    responses(
        (status = 200, description = "XMP object", content_type = "application/json"),
        (status = 400, description = "Malformed ID", body = ErrorResponse),
        (status = 404, description = "Document not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state), fields(operation = "get_pdf_xmp"))]
pub async fn get_pdf_xmp(
    State(state): State<Arc<AppState>>,
    ValidatedPath(id): ValidatedPath<i64>,
) -> Result<impl IntoResponse, HttpAppError> {
    let xmp = state.pdfs.get_xmp(id).await?.ok_or_else(not_found)?;
    Ok(Json(xmp))
}

/// Stored text snippet of one document.
#[utoipa::path(
    get,
    path = "/api/pdf/{id}/text",
    tag = "pdf",
    params(
        ("id" = i64, Path, description = "PDF ID")
    ),
    responses(
        (status = 200, description = "Document text", body = PdfText),
        (status = 400, description = "Malformed ID", body = ErrorResponse),
        (status = 404, description = "Document not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state), fields(operation = "get_pdf_text"))]
pub async fn get_pdf_text(
    State(state): State<Arc<AppState>>,
    ValidatedPath(id): ValidatedPath<i64>,
) -> Result<impl IntoResponse, HttpAppError> {
    let text = state.pdfs.get_text(id).await?.ok_or_else(not_found)?;
    Ok(Json(text))
}
