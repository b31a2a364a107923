//! PDF metadata repository

use serde_json::Value;
use sqlx::types::Json;
use sqlx::SqlitePool;

use warehouse_core::models::{NewPdf, Page, PageRange, PdfField, PdfRecord, PdfSummary, PdfText};
use warehouse_core::AppError;

use super::query::{fetch_page, Clause, Column, Filter, Operand, Operator, OrderTerm, SelectQuery};

const PDF_SOURCE: &str = r#"
    SELECT
        id,
        filename,
        numpages,
        text,
        CAST(json_extract(info, '$.Title') AS TEXT) AS title,
        CAST(json_extract(info, '$.Author') AS TEXT) AS author,
        CAST(json_extract(info, '$.Subject') AS TEXT) AS subject,
        CAST(json_extract(info, '$.Keywords') AS TEXT) AS keywords,
        CAST(json_extract(xmp, '$.title') AS TEXT) AS xmp_title
    FROM pdfs
"#;

/// Column for a single-column field. `Everything` spans several.
pub fn pdf_column(field: PdfField) -> Option<&'static str> {
    match field {
        PdfField::Filename => Some("filename"),
        PdfField::Title => Some("title"),
        PdfField::Author => Some("author"),
        PdfField::Subject => Some("subject"),
        PdfField::Keywords => Some("keywords"),
        PdfField::Pages => Some("numpages"),
        PdfField::Text => Some("text"),
        PdfField::Everything => None,
    }
}

const EVERYTHING_COLUMNS: [&str; 7] = [
    "text", "title", "author", "subject", "keywords", "xmp_title", "filename",
];

fn pages_clause(range: PageRange) -> Clause {
    let column = "numpages";
    match range {
        PageRange::Exactly(n) => Clause::new(Column::Expr(column), Operator::Equals, Operand::Int(n)),
        PageRange::Above(n) => Clause::above(column, Operand::Int(n)),
        PageRange::Below(n) => Clause::below(column, Operand::Int(n)),
        PageRange::Between(min, max) => Clause::between(column, Operand::Int(min), Operand::Int(max)),
    }
}

/// Filter for one `{field}/{value}` search. Fails on a malformed page filter.
pub fn pdf_filter(field: PdfField, value: &str) -> Result<Filter, AppError> {
    let filter = match field {
        PdfField::Pages => pages_clause(value.parse::<PageRange>()?).into(),
        PdfField::Everything => {
            let mut parts: Vec<Filter> = EVERYTHING_COLUMNS
                .into_iter()
                .map(|column| Clause::contains(column, value).into())
                .collect();
            if let Ok(range) = value.parse::<PageRange>() {
                parts.push(pages_clause(range).into());
            }
            Filter::Any(parts)
        }
        other => match pdf_column(other) {
            Some(column) => Clause::contains(column, value).into(),
            None => Filter::Any(Vec::new()),
        },
    };
    Ok(filter)
}

fn ordered(query: SelectQuery) -> SelectQuery {
    query
        .order_by(OrderTerm::Asc(Column::Expr("filename")))
        .order_by(OrderTerm::Asc(Column::Expr("id")))
}

/// Repository for the `pdfs` table
#[derive(Clone)]
pub struct PdfRepository {
    pool: SqlitePool,
}

impl PdfRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    #[tracing::instrument(skip(self, pdf), fields(db.table = "pdfs", db.operation = "upsert", filename = %pdf.filename))]
    pub async fn upsert(&self, pdf: &NewPdf) -> Result<i64, AppError> {
        let id = sqlx::query_scalar::<_, i64>(
            r#"
            INSERT INTO pdfs (filename, numpages, text, xmp, info)
            VALUES (?, ?, ?, ?, ?)
            ON CONFLICT (filename) DO UPDATE SET
                numpages = excluded.numpages,
                text = excluded.text,
                xmp = excluded.xmp,
                info = excluded.info,
                updated_at = CURRENT_TIMESTAMP
            RETURNING id
            "#,
        )
        .bind(&pdf.filename)
        .bind(pdf.numpages)
        .bind(&pdf.text)
        .bind(Json(&pdf.xmp))
        .bind(Json(&pdf.info))
        .fetch_one(&self.pool)
        .await?;

        Ok(id)
    }

    #[tracing::instrument(skip(self), fields(db.table = "pdfs", db.operation = "delete"))]
    pub async fn delete_all(&self) -> Result<u64, AppError> {
        let result = sqlx::query("DELETE FROM pdfs").execute(&self.pool).await?;
        Ok(result.rows_affected())
    }

    #[tracing::instrument(skip(self), fields(db.table = "pdfs", db.operation = "count"))]
    pub async fn count(&self) -> Result<i64, AppError> {
        let total = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM pdfs")
            .fetch_one(&self.pool)
            .await?;
        Ok(total)
    }

    #[tracing::instrument(skip(self), fields(db.table = "pdfs", db.operation = "select"))]
    pub async fn get(&self, id: i64) -> Result<Option<PdfRecord>, AppError> {
        let record = sqlx::query_as::<_, PdfRecord>(
            r#"
            SELECT id, filename, numpages, text, xmp, info, created_at, updated_at
            FROM pdfs
            WHERE id = ?
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(record)
    }

    #[tracing::instrument(skip(self), fields(db.table = "pdfs", db.operation = "select"))]
    pub async fn get_xmp(&self, id: i64) -> Result<Option<Value>, AppError> {
        let xmp = sqlx::query_scalar::<_, Json<Value>>("SELECT xmp FROM pdfs WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(xmp.map(|Json(value)| value))
    }

    #[tracing::instrument(skip(self), fields(db.table = "pdfs", db.operation = "select"))]
    pub async fn get_text(&self, id: i64) -> Result<Option<PdfText>, AppError> {
        let text = sqlx::query_as::<_, PdfText>("SELECT id, text FROM pdfs WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(text)
    }

    #[tracing::instrument(skip(self, value), fields(db.table = "pdfs", db.operation = "search", field = %field))]
    pub async fn search(
        &self,
        field: PdfField,
        value: &str,
        page: Page,
    ) -> Result<(Vec<PdfSummary>, i64), AppError> {
        let query = ordered(SelectQuery::from_source(PDF_SOURCE).filter(pdf_filter(field, value)?));
        Ok(fetch_page(&self.pool, &query, page).await?)
    }

    #[tracing::instrument(skip(self), fields(db.table = "pdfs", db.operation = "list"))]
    pub async fn list(&self, page: Page) -> Result<(Vec<PdfSummary>, i64), AppError> {
        let query = ordered(SelectQuery::from_source(PDF_SOURCE));
        Ok(fetch_page(&self.pool, &query, page).await?)
    }
}
