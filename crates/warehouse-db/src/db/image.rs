//! Image metadata repository

use sqlx::types::Json;
use sqlx::SqlitePool;

use warehouse_core::models::geo::cos_to_km;
use warehouse_core::models::{
    ImageField, ImageHit, ImageRecord, ImageSearch, NewImage, Page, SphericalPoint,
};
use warehouse_core::AppError;

use super::query::{fetch_page, Clause, Column, Filter, Operand, Operator, OrderTerm, SelectQuery};

/// Pseudo-columns searched and returned by image queries.
const IMAGE_SOURCE: &str = r#"
    SELECT
        id,
        file,
        CAST(json_extract(meta, '$.file_name') AS TEXT) AS file_name,
        CAST(json_extract(meta, '$.file_path') AS TEXT) AS file_path,
        CAST(json_extract(meta, '$.make') AS TEXT) AS make,
        CAST(json_extract(meta, '$.model') AS TEXT) AS model,
        CAST(json_extract(meta, '$.create_date') AS TEXT) AS create_date,
        CAST(json_extract(meta, '$.width') AS INTEGER) AS width,
        CAST(json_extract(meta, '$.height') AS INTEGER) AS height,
        latitude,
        longitude,
        sin_lat,
        cos_lat,
        sin_lon,
        cos_lon
    FROM images
"#;

/// Column expression over the image pseudo-columns. `Any` has no single column.
pub fn image_column(field: ImageField) -> Option<&'static str> {
    match field {
        ImageField::File => Some("file"),
        ImageField::Make => Some("make"),
        ImageField::Model => Some("model"),
        ImageField::Any => None,
    }
}

fn text_filter(text: &str) -> Filter {
    Filter::Any(
        [ImageField::File, ImageField::Make, ImageField::Model]
            .into_iter()
            .filter_map(image_column)
            .map(|column| Clause::contains(column, text).into())
            .collect(),
    )
}

fn build_search(search: &ImageSearch) -> SelectQuery {
    let mut clauses = Vec::new();
    let mut query = SelectQuery::from_source(IMAGE_SOURCE);

    if let Some(text) = &search.text {
        clauses.push(text_filter(text));
    }
    if let Some(file) = &search.file {
        clauses.push(Clause::contains("file", file.as_str()).into());
    }
    if let Some(make) = &search.make {
        clauses.push(Clause::contains("make", make.as_str()).into());
    }
    if let Some(model) = &search.model {
        clauses.push(Clause::contains("model", model.as_str()).into());
    }
    if let Some(from) = &search.created_from {
        clauses.push(Clause::at_least("create_date", Operand::Text(from.clone())).into());
    }
    if let Some(before) = &search.created_before {
        clauses.push(Clause::below("create_date", Operand::Text(before.clone())).into());
    }

    let near = search.near.map(|near| (Column::GeoCos(near.center()), near.min_cos()));
    if let Some((column, min_cos)) = &near {
        // NULL coordinates yield a NULL cosine, which never satisfies the bound.
        clauses.push(
            Clause::new(column.clone(), Operator::AtLeast, Operand::Real(*min_cos)).into(),
        );
        query = query.computed(column.clone(), "geo_cos");
    }

    query = query.filter(Filter::All(clauses));

    if let Some(text) = &search.text {
        query = query
            .order_by(OrderTerm::MatchesFirst(Clause::equals("file", text.as_str())))
            .order_by(OrderTerm::MatchesFirst(Clause::contains("file", text.as_str())));
    }
    if let Some(file) = &search.file {
        query = query.order_by(OrderTerm::MatchesFirst(Clause::equals("file", file.as_str())));
    }
    if let Some(make) = &search.make {
        query = query.order_by(OrderTerm::MatchesFirst(Clause::equals("make", make.as_str())));
    }
    if let Some(model) = &search.model {
        query = query.order_by(OrderTerm::MatchesFirst(Clause::equals("model", model.as_str())));
    }
    if let Some((column, _)) = near {
        query = query.order_by(OrderTerm::Desc(column));
    }

    query
        .order_by(OrderTerm::Desc(Column::Expr("create_date")))
        .order_by(OrderTerm::Asc(Column::Expr("id")))
}

/// Repository for the `images` table
#[derive(Clone)]
pub struct ImageRepository {
    pool: SqlitePool,
}

impl ImageRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Insert or update by `file`, refreshing coordinates and `updated_at`.
    #[tracing::instrument(skip(self, image), fields(db.table = "images", db.operation = "upsert", file = %image.file))]
    pub async fn upsert(&self, image: &NewImage) -> Result<i64, AppError> {
        let coordinates = match (image.meta.latitude, image.meta.longitude) {
            (Some(lat), Some(lon)) => Some((lat, lon, SphericalPoint::from_degrees(lat, lon))),
            _ => None,
        };

        let id = sqlx::query_scalar::<_, i64>(
            r#"
            INSERT INTO images (file, meta, latitude, longitude, sin_lat, cos_lat, sin_lon, cos_lon)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            ON CONFLICT (file) DO UPDATE SET
                meta = excluded.meta,
                latitude = excluded.latitude,
                longitude = excluded.longitude,
                sin_lat = excluded.sin_lat,
                cos_lat = excluded.cos_lat,
                sin_lon = excluded.sin_lon,
                cos_lon = excluded.cos_lon,
                updated_at = CURRENT_TIMESTAMP
            RETURNING id
            "#,
        )
        .bind(&image.file)
        .bind(Json(&image.meta))
        .bind(coordinates.map(|(lat, _, _)| lat))
        .bind(coordinates.map(|(_, lon, _)| lon))
        .bind(coordinates.map(|(_, _, p)| p.sin_lat))
        .bind(coordinates.map(|(_, _, p)| p.cos_lat))
        .bind(coordinates.map(|(_, _, p)| p.sin_lon))
        .bind(coordinates.map(|(_, _, p)| p.cos_lon))
        .fetch_one(&self.pool)
        .await?;

        Ok(id)
    }

    #[tracing::instrument(skip(self), fields(db.table = "images", db.operation = "delete"))]
    pub async fn delete_all(&self) -> Result<u64, AppError> {
        let result = sqlx::query("DELETE FROM images")
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }

    #[tracing::instrument(skip(self), fields(db.table = "images", db.operation = "count"))]
    pub async fn count(&self) -> Result<i64, AppError> {
        let total = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM images")
            .fetch_one(&self.pool)
            .await?;
        Ok(total)
    }

    #[tracing::instrument(skip(self), fields(db.table = "images", db.operation = "select"))]
    pub async fn get(&self, id: i64) -> Result<Option<ImageRecord>, AppError> {
        let record = sqlx::query_as::<_, ImageRecord>(
            "SELECT id, file, meta, created_at, updated_at FROM images WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(record)
    }

    /// Faceted search. Returns one page of hits plus the total number of matches.
    #[tracing::instrument(skip(self, search), fields(db.table = "images", db.operation = "search", geo = search.near.is_some()))]
    pub async fn search(
        &self,
        search: &ImageSearch,
        page: Page,
    ) -> Result<(Vec<ImageHit>, i64), AppError> {
        let query = build_search(search);
        let (mut hits, total) = fetch_page::<ImageHit>(&self.pool, &query, page).await?;
        for hit in &mut hits {
            hit.distance_km = hit.geo_cos.map(cos_to_km);
        }
        Ok((hits, total))
    }

    /// Every image, newest capture first.
    #[tracing::instrument(skip(self), fields(db.table = "images", db.operation = "list"))]
    pub async fn list(&self, page: Page) -> Result<(Vec<ImageHit>, i64), AppError> {
        self.search(&ImageSearch::default(), page).await
    }
}
