use chrono::NaiveDateTime;
use serde::Serialize;
use serde_json::{Map, Value};
use sqlx::types::Json;
use sqlx::FromRow;
use std::str::FromStr;
use utoipa::ToSchema;

use crate::error::AppError;

#[derive(Debug, Clone, PartialEq)]
pub struct NewPdf {
    pub filename: String,
    pub numpages: Option<i64>,
    /// First characters of the extracted text
    pub text: String,
    pub xmp: Map<String, Value>,
    pub info: Map<String, Value>,
}

/// One PDF search result.
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PdfSummary {
    pub id: i64,
    pub filename: String,
    pub numpages: Option<i64>,
    pub text: Option<String>,
    pub title: Option<String>,
    pub author: Option<String>,
    pub subject: Option<String>,
    pub keywords: Option<String>,
    pub xmp_title: Option<String>,
}

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PdfRecord {
    pub id: i64,
    pub filename: String,
    pub numpages: Option<i64>,
    pub text: Option<String>,
    #[schema(value_type = Object)]
    pub xmp: Json<Value>,
    #[schema(value_type = Object)]
    pub info: Json<Value>,
    pub created_at: Option<NaiveDateTime>,
    pub updated_at: Option<NaiveDateTime>,
}

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
pub struct PdfText {
    pub id: i64,
    pub text: Option<String>,
}

/// Page-count filter: `12`, `>10`, `<10` or `5-15`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageRange {
    Exactly(i64),
    Above(i64),
    Below(i64),
    Between(i64, i64),
}

/// Unsigned decimal page count.
fn parse_count(raw: &str, original: &str) -> Result<i64, AppError> {
    let raw = raw.trim();
    let invalid = || {
        AppError::InvalidInput(format!(
            "Invalid page filter '{}': use N, >N, <N or MIN-MAX",
            original
        ))
    };
    if raw.is_empty() || !raw.bytes().all(|b| b.is_ascii_digit()) {
        return Err(invalid());
    }
    raw.parse::<i64>().map_err(|_| invalid())
}

impl FromStr for PageRange {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let value = s.trim();
        if let Some(rest) = value.strip_prefix('>') {
            return Ok(PageRange::Above(parse_count(rest, s)?));
        }
        if let Some(rest) = value.strip_prefix('<') {
            return Ok(PageRange::Below(parse_count(rest, s)?));
        }
        if let Some((min, max)) = value.split_once('-') {
            let (min, max) = (parse_count(min, s)?, parse_count(max, s)?);
            if min > max {
                return Err(AppError::InvalidRange(format!(
                    "min pages {} is greater than max pages {}",
                    min, max
                )));
            }
            return Ok(PageRange::Between(min, max));
        }
        Ok(PageRange::Exactly(parse_count(value, s)?))
    }
}
