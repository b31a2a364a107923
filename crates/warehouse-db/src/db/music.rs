//! Music metadata repository

use sqlx::types::Json;
use sqlx::SqlitePool;

use warehouse_core::models::{
    is_unknown_marker, MusicField, MusicRecord, MusicTrack, NewTrack, Page,
};
use warehouse_core::AppError;

use super::query::{fetch_page, Clause, Column, Filter, Operand, Operator, OrderTerm, SelectQuery};

const MUSIC_SOURCE: &str = r#"
    SELECT
        id,
        file AS file_name,
        CAST(json_extract(meta, '$.common.title') AS TEXT) AS title,
        CAST(json_extract(meta, '$.common.artist') AS TEXT) AS artist,
        CAST(json_extract(meta, '$.common.album') AS TEXT) AS album,
        CAST(json_extract(meta, '$.common.genre[0]') AS TEXT) AS genre,
        CAST(json_extract(meta, '$.common.year') AS INTEGER) AS year
    FROM music
"#;

pub fn music_column(field: MusicField) -> Option<&'static str> {
    match field {
        MusicField::File => Some("file_name"),
        MusicField::Title => Some("title"),
        MusicField::Album => Some("album"),
        MusicField::Artist => Some("artist"),
        MusicField::Genre => Some("genre"),
        MusicField::Year => Some("year"),
        MusicField::Any => None,
    }
}

fn tag_columns() -> impl Iterator<Item = &'static str> {
    MusicField::COLUMNS.iter().copied().filter_map(music_column)
}

/// `>=1990`, `<1980`, `!=2000` and friends. Anything else is a plain substring search.
fn year_comparison(value: &str) -> Option<(Operator, i64)> {
    const OPERATORS: [(&str, Operator); 7] = [
        ("<=", Operator::AtMost),
        (">=", Operator::AtLeast),
        ("!=", Operator::NotEquals),
        ("<>", Operator::NotEquals),
        ("=", Operator::Equals),
        ("<", Operator::Below),
        (">", Operator::Above),
    ];
    let value = value.trim();
    let (operator, rest) = OPERATORS
        .iter()
        .find_map(|(symbol, op)| value.strip_prefix(*symbol).map(|rest| (*op, rest)))?;
    let digits = rest.trim_start_matches(' ');
    if digits.is_empty() || digits.len() > 4 || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok().map(|year| (operator, year))
}

/// Filter for one `{field}/{value}` search.
///
/// `any` with an "unknown" value (`okänd`, `unknown`) finds tracks with any tag missing.
pub fn music_filter(field: MusicField, value: &str) -> Filter {
    match field {
        MusicField::Any if is_unknown_marker(value) => {
            Filter::Any(tag_columns().map(|c| Clause::is_blank(c).into()).collect())
        }
        MusicField::Any => {
            Filter::Any(tag_columns().map(|c| Clause::contains(c, value).into()).collect())
        }
        MusicField::Year => match year_comparison(value) {
            Some((operator, year)) => {
                Clause::new(Column::Expr("year"), operator, Operand::Int(year)).into()
            }
            None => Clause::contains("year", value).into(),
        },
        field => match music_column(field) {
            Some(column) => Clause::contains(column, value).into(),
            None => Filter::Any(Vec::new()),
        },
    }
}

fn ordered(query: SelectQuery) -> SelectQuery {
    ["artist", "album", "title", "id"]
        .into_iter()
        .fold(query, |query, column| {
            query.order_by(OrderTerm::Asc(Column::Expr(column)))
        })
}

/// Repository for the `music` table
#[derive(Clone)]
pub struct MusicRepository {
    pool: SqlitePool,
}

impl MusicRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    #[tracing::instrument(skip(self, track), fields(db.table = "music", db.operation = "upsert", file = %track.file))]
    pub async fn upsert(&self, track: &NewTrack) -> Result<i64, AppError> {
        let id = sqlx::query_scalar::<_, i64>(
            r#"
            INSERT INTO music (file, meta)
            VALUES (?, ?)
            ON CONFLICT (file) DO UPDATE SET
                meta = excluded.meta,
                updated_at = CURRENT_TIMESTAMP
            RETURNING id
            "#,
        )
        .bind(&track.file)
        .bind(Json(&track.meta))
        .fetch_one(&self.pool)
        .await?;

        Ok(id)
    }

    #[tracing::instrument(skip(self), fields(db.table = "music", db.operation = "delete"))]
    pub async fn delete_all(&self) -> Result<u64, AppError> {
        let result = sqlx::query("DELETE FROM music").execute(&self.pool).await?;
        Ok(result.rows_affected())
    }

    #[tracing::instrument(skip(self), fields(db.table = "music", db.operation = "count"))]
    pub async fn count(&self) -> Result<i64, AppError> {
        let total = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM music")
            .fetch_one(&self.pool)
            .await?;
        Ok(total)
    }

    #[tracing::instrument(skip(self), fields(db.table = "music", db.operation = "select"))]
    pub async fn get(&self, id: i64) -> Result<Option<MusicRecord>, AppError> {
        let record = sqlx::query_as::<_, MusicRecord>(
            "SELECT id, file, meta, created_at, updated_at FROM music WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(record)
    }

    #[tracing::instrument(skip(self, value), fields(db.table = "music", db.operation = "search", field = %field))]
    pub async fn search(
        &self,
        field: MusicField,
        value: &str,
        page: Page,
    ) -> Result<(Vec<MusicTrack>, i64), AppError> {
        let query =
            ordered(SelectQuery::from_source(MUSIC_SOURCE).filter(music_filter(field, value)));
        Ok(fetch_page(&self.pool, &query, page).await?)
    }

    #[tracing::instrument(skip(self), fields(db.table = "music", db.operation = "list"))]
    pub async fn list(&self, page: Page) -> Result<(Vec<MusicTrack>, i64), AppError> {
        let query = ordered(SelectQuery::from_source(MUSIC_SOURCE));
        Ok(fetch_page(&self.pool, &query, page).await?)
    }
}
