use serde::Serialize;
use utoipa::ToSchema;

use super::media::MediaKind;
use super::paging::Page;

/// Response envelope shared by every search and list endpoint.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SearchPage<T> {
    #[serde(rename = "type")]
    pub kind: MediaKind,
    /// Rows matching the filter, independent of paging
    pub total: i64,
    pub page: i64,
    pub page_size: i64,
    pub offset: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sort_field: Option<String>,
    pub items: Vec<T>,
}

impl<T> SearchPage<T> {
    pub fn new(kind: MediaKind, page: Page, total: i64, items: Vec<T>) -> Self {
        Self {
            kind,
            total,
            page: page.number(),
            page_size: page.limit,
            offset: page.offset,
            sort_field: None,
            items,
        }
    }

    pub fn with_sort_field(mut self, sort_field: impl Into<String>) -> Self {
        self.sort_field = Some(sort_field.into());
        self
    }
}
