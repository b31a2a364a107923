//! Presentation metadata repository

use sqlx::types::Json;
use sqlx::SqlitePool;

use warehouse_core::models::{
    NewPresentation, Page, PresentationField, PresentationRecord, PresentationSummary,
};
use warehouse_core::AppError;

use super::query::{fetch_page, Clause, Column, Filter, Operand, Operator, OrderTerm, SelectQuery};

const PRESENTATION_SOURCE: &str = r#"
    SELECT
        id,
        file_name,
        CAST(json_extract(metadata, '$.title') AS TEXT) AS title,
        CAST(json_extract(metadata, '$.organisation') AS TEXT) AS organisation,
        CAST(json_extract(metadata, '$.mimetype') AS TEXT) AS mimetype,
        CAST(json_extract(metadata, '$.creationDate') AS TEXT) AS creation_date,
        CAST(json_extract(metadata, '$.lastModified') AS TEXT) AS last_modified,
        CAST(json_extract(metadata, '$.revisionNumber') AS INTEGER) AS revision_number,
        CAST(json_extract(metadata, '$.slideCount') AS INTEGER) AS slide_count,
        CAST(json_extract(metadata, '$.wordCount') AS INTEGER) AS word_count,
        CAST(json_extract(metadata, '$.fileSize') AS INTEGER) AS file_size,
        CAST(json_extract(metadata, '$.original') AS TEXT) AS original
    FROM presentations
"#;

pub fn presentation_column(field: PresentationField) -> Option<&'static str> {
    let column = match field {
        PresentationField::CreationDate => "creation_date",
        PresentationField::FileName => "file_name",
        PresentationField::FileSize => "file_size",
        PresentationField::Id => "id",
        PresentationField::LastModified => "last_modified",
        PresentationField::Mimetype => "mimetype",
        PresentationField::Organisation => "organisation",
        PresentationField::Original => "original",
        PresentationField::RevisionNumber => "revision_number",
        PresentationField::SlideCount => "slide_count",
        PresentationField::Title => "title",
        PresentationField::WordCount => "word_count",
        PresentationField::Any => return None,
    };
    Some(column)
}

/// Filter for one `{field}/{value}` search.
///
/// Numeric fields match exactly and require an integer value; text fields use contains.
pub fn presentation_filter(field: PresentationField, value: &str) -> Result<Filter, AppError> {
    let Some(column) = presentation_column(field) else {
        let parts = PresentationField::columns()
            .filter_map(presentation_column)
            .map(|column| Clause::contains(column, value).into())
            .collect();
        return Ok(Filter::Any(parts));
    };

    if field.is_numeric() {
        let number = value.trim().parse::<i64>().map_err(|_| {
            AppError::InvalidInput(format!("{} must be an integer, got '{}'", field, value))
        })?;
        return Ok(Clause::new(Column::Expr(column), Operator::Equals, Operand::Int(number)).into());
    }

    Ok(Clause::contains(column, value).into())
}

fn sorted_by(query: SelectQuery, sort: PresentationField) -> SelectQuery {
    let query = match presentation_column(sort) {
        Some(column) if column != "id" => query.order_by(OrderTerm::Asc(Column::Expr(column))),
        _ => query,
    };
    query.order_by(OrderTerm::Asc(Column::Expr("id")))
}

/// Repository for the `presentations` table
#[derive(Clone)]
pub struct PresentationRepository {
    pool: SqlitePool,
}

impl PresentationRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    #[tracing::instrument(skip(self, presentation), fields(db.table = "presentations", db.operation = "upsert", file_name = %presentation.file_name()))]
    pub async fn upsert(&self, presentation: &NewPresentation) -> Result<i64, AppError> {
        let id = sqlx::query_scalar::<_, i64>(
            r#"
            INSERT INTO presentations (file_name, metadata)
            VALUES (?, ?)
            ON CONFLICT (file_name) DO UPDATE SET
                metadata = excluded.metadata,
                updated_at = CURRENT_TIMESTAMP
            RETURNING id
            "#,
        )
        .bind(presentation.file_name())
        .bind(Json(&presentation.meta))
        .fetch_one(&self.pool)
        .await?;

        Ok(id)
    }

    #[tracing::instrument(skip(self), fields(db.table = "presentations", db.operation = "delete"))]
    pub async fn delete_all(&self) -> Result<u64, AppError> {
        let result = sqlx::query("DELETE FROM presentations")
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }

    #[tracing::instrument(skip(self), fields(db.table = "presentations", db.operation = "count"))]
    pub async fn count(&self) -> Result<i64, AppError> {
        let total = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM presentations")
            .fetch_one(&self.pool)
            .await?;
        Ok(total)
    }

    #[tracing::instrument(skip(self), fields(db.table = "presentations", db.operation = "select"))]
    pub async fn get(&self, id: i64) -> Result<Option<PresentationRecord>, AppError> {
        let record = sqlx::query_as::<_, PresentationRecord>(
            "SELECT id, file_name, metadata, created_at, updated_at FROM presentations WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(record)
    }

    #[tracing::instrument(skip(self, value), fields(db.table = "presentations", db.operation = "search", field = %field, sort = %sort))]
    pub async fn search(
        &self,
        field: PresentationField,
        value: &str,
        sort: PresentationField,
        page: Page,
    ) -> Result<(Vec<PresentationSummary>, i64), AppError> {
        let query = SelectQuery::from_source(PRESENTATION_SOURCE)
            .filter(presentation_filter(field, value)?);
        Ok(fetch_page(&self.pool, &sorted_by(query, sort), page).await?)
    }

    /// `limit` rows in random order, plus the table size.
    #[tracing::instrument(skip(self), fields(db.table = "presentations", db.operation = "sample"))]
    pub async fn random_sample(
        &self,
        limit: i64,
    ) -> Result<(Vec<PresentationSummary>, i64), AppError> {
        let query = SelectQuery::from_source(PRESENTATION_SOURCE)
            .order_by(OrderTerm::Random)
            .order_by(OrderTerm::Asc(Column::Expr("id")));
        Ok(fetch_page(&self.pool, &query, Page::new(limit, 0)).await?)
    }
}
