use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::types::Json;
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};

use super::fields::PresentationField;
use crate::error::AppError;

/// Document stored in `presentations.metadata`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PresentationMeta {
    pub original: Option<String>,
    pub mimetype: Option<String>,
    pub title: Option<String>,
    pub organisation: Option<String>,
    pub file_name: String,
    pub creation_date: Option<String>,
    pub last_modified: Option<String>,
    pub revision_number: Option<i64>,
    pub slide_count: Option<i64>,
    pub word_count: Option<i64>,
    pub file_size: Option<i64>,
}

#[derive(Debug, Clone)]
pub struct NewPresentation {
    pub meta: PresentationMeta,
}

impl NewPresentation {
    pub fn file_name(&self) -> &str {
        &self.meta.file_name
    }
}

/// One presentation search result.
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PresentationSummary {
    pub id: i64,
    pub file_name: String,
    pub title: Option<String>,
    pub organisation: Option<String>,
    pub mimetype: Option<String>,
    pub creation_date: Option<String>,
    pub last_modified: Option<String>,
    pub revision_number: Option<i64>,
    pub slide_count: Option<i64>,
    pub word_count: Option<i64>,
    pub file_size: Option<i64>,
    pub original: Option<String>,
}

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PresentationRecord {
    pub id: i64,
    pub file_name: String,
    #[schema(value_type = Object)]
    pub metadata: Json<Value>,
    pub created_at: Option<NaiveDateTime>,
    pub updated_at: Option<NaiveDateTime>,
}

#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct SortParams {
    /// Metadata field to sort by (default `title`)
    pub sort_field: Option<String>,
}

impl SortParams {
    pub fn resolve(&self) -> Result<PresentationField, AppError> {
        match self.sort_field.as_deref().map(str::trim) {
            None | Some("") => Ok(PresentationField::Title),
            Some(name) => PresentationField::parse_sort(name),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_meta_uses_camel_case_keys() {
        let meta = PresentationMeta {
            file_name: "abc.ppt".to_string(),
            organisation: Some("ACME".to_string()),
            slide_count: Some(12),
            ..Default::default()
        };
        let json = serde_json::to_value(&meta).unwrap();
        assert_eq!(json["fileName"], "abc.ppt");
        assert_eq!(json["organisation"], "ACME");
        assert_eq!(json["slideCount"], 12);
        assert!(json.get("company").is_none());
    }

    #[test]
    fn test_sort_defaults_to_title() {
        assert_eq!(SortParams::default().resolve().unwrap(), PresentationField::Title);
        let params = SortParams {
            sort_field: Some("wordCount".to_string()),
        };
        assert_eq!(params.resolve().unwrap(), PresentationField::WordCount);
        let params = SortParams {
            sort_field: Some("shoeSize".to_string()),
        };
        assert!(params.resolve().is_err());
    }
}
