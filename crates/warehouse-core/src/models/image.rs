use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::types::Json;
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};

use super::fields::ImageField;
use super::geo::GeoFilter;
use crate::error::AppError;

/// Normalised image metadata stored in `images.meta`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageMeta {
    pub file_name: String,
    pub file_path: String,
    pub size_bytes: u64,
    pub mtime_iso: Option<String>,
    pub make: Option<String>,
    pub model: Option<String>,
    pub create_date: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub width: Option<u32>,
    pub height: Option<u32>,
    /// Every EXIF tag read from the file, or `null` when it carries none
    pub raw: Value,
}

/// Row to upsert into `images`, keyed by `file`.
#[derive(Debug, Clone)]
pub struct NewImage {
    pub file: String,
    pub meta: ImageMeta,
}

/// One image search result.
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ImageHit {
    pub id: i64,
    pub file: String,
    pub file_name: Option<String>,
    pub file_path: Option<String>,
    pub make: Option<String>,
    pub model: Option<String>,
    pub create_date: Option<String>,
    pub width: Option<i64>,
    pub height: Option<i64>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    #[serde(skip)]
    #[sqlx(default)]
    pub geo_cos: Option<f64>,
    #[sqlx(skip)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub distance_km: Option<f64>,
}

/// Full stored image row.
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ImageRecord {
    pub id: i64,
    pub file: String,
    #[schema(value_type = Object)]
    pub meta: Json<Value>,
    pub created_at: Option<NaiveDateTime>,
    pub updated_at: Option<NaiveDateTime>,
}

/// Query parameters accepted by both image search routes.
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct ImageSearchParams {
    /// Matches file name, make or model
    pub text: Option<String>,
    /// Matches the file name only
    pub file: Option<String>,
    pub make: Option<String>,
    pub model: Option<String>,
    /// Earliest capture date (YYYY-MM-DD or RFC 3339), inclusive
    pub from: Option<String>,
    /// Latest capture date (YYYY-MM-DD or RFC 3339), inclusive
    pub to: Option<String>,
    pub near_lat: Option<String>,
    pub near_lon: Option<String>,
    /// Radius in kilometres
    pub radius: Option<String>,
}

/// Validated image search criteria.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ImageSearch {
    pub text: Option<String>,
    pub file: Option<String>,
    pub make: Option<String>,
    pub model: Option<String>,
    /// Inclusive lower bound on `create_date`
    pub created_from: Option<String>,
    /// Exclusive upper bound on `create_date`
    pub created_before: Option<String>,
    pub near: Option<GeoFilter>,
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn parse_float(name: &str, value: &str) -> Result<f64, AppError> {
    value
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| AppError::InvalidInput(format!("{} must be a number, got '{}'", name, value)))
}

/// Format a timestamp the way `create_date` is stored so string comparison orders correctly.
pub fn to_iso_millis(value: DateTime<Utc>) -> String {
    value.to_rfc3339_opts(SecondsFormat::Millis, true)
}

enum DateBound {
    Day(NaiveDate),
    Instant(DateTime<Utc>),
}

fn parse_date_bound(name: &str, value: &str) -> Result<DateBound, AppError> {
    let value = value.trim();
    if let Ok(day) = NaiveDate::parse_from_str(value, "%Y-%m-%d") {
        return Ok(DateBound::Day(day));
    }
    if let Ok(instant) = DateTime::parse_from_rfc3339(value) {
        return Ok(DateBound::Instant(instant.with_timezone(&Utc)));
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S") {
        return Ok(DateBound::Instant(naive.and_utc()));
    }
    Err(AppError::InvalidInput(format!(
        "{} must be a date (YYYY-MM-DD) or RFC 3339 timestamp, got '{}'",
        name, value
    )))
}

impl ImageSearchParams {
    /// Validate the raw parameters, optionally seeding one field from a path segment.
    pub fn into_search(self, field: Option<(ImageField, String)>) -> Result<ImageSearch, AppError> {
        let mut search = ImageSearch {
            text: non_empty(self.text),
            file: non_empty(self.file),
            make: non_empty(self.make),
            model: non_empty(self.model),
            ..ImageSearch::default()
        };

        if let Some((field, value)) = field {
            let value = non_empty(Some(value));
            match field {
                ImageField::File => search.file = value,
                ImageField::Any => search.text = value,
                ImageField::Make => search.make = value,
                ImageField::Model => search.model = value,
            }
        }

        let from = non_empty(self.from)
            .map(|v| parse_date_bound("from", &v))
            .transpose()?;
        let to = non_empty(self.to)
            .map(|v| parse_date_bound("to", &v))
            .transpose()?;

        let lower = from.map(|bound| match bound {
            DateBound::Day(day) => day.and_hms_opt(0, 0, 0).map(|d| d.and_utc()),
            DateBound::Instant(instant) => Some(instant),
        });
        let upper = to.map(|bound| match bound {
            DateBound::Day(day) => day
                .succ_opt()
                .and_then(|next| next.and_hms_opt(0, 0, 0))
                .map(|d| d.and_utc()),
            DateBound::Instant(instant) => Some(instant + Duration::milliseconds(1)),
        });

        let lower = lower
            .map(|b| b.ok_or_else(|| AppError::InvalidInput("from is out of range".to_string())))
            .transpose()?;
        let upper = upper
            .map(|b| b.ok_or_else(|| AppError::InvalidInput("to is out of range".to_string())))
            .transpose()?;

        if let (Some(lower), Some(upper)) = (lower, upper) {
            if lower >= upper {
                return Err(AppError::InvalidRange(
                    "from must not be later than to".to_string(),
                ));
            }
        }
        search.created_from = lower.map(to_iso_millis);
        search.created_before = upper.map(to_iso_millis);

        let near_lat = non_empty(self.near_lat);
        let near_lon = non_empty(self.near_lon);
        let radius = non_empty(self.radius);
        search.near = match (near_lat, near_lon, radius) {
            (None, None, None) => None,
            (Some(lat), Some(lon), Some(radius)) => Some(GeoFilter::new(
                parse_float("nearLat", &lat)?,
                parse_float("nearLon", &lon)?,
                parse_float("radius", &radius)?,
            )?),
            _ => {
                return Err(AppError::InvalidInput(
                    "nearLat, nearLon and radius must be given together".to_string(),
                ))
            }
        };

        Ok(search)
    }
}
