//! Paging parameters shared by every search and list endpoint.
//!
//! Callers may page with `page` + `pageSize` or with `limit` + `offset`; when both an
//! `offset` and a `page` are supplied the offset wins.

use serde::Deserialize;
use utoipa::IntoParams;

use crate::error::AppError;

/// Default and maximum page size for one collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageLimits {
    pub default_size: i64,
    pub max_size: i64,
}

impl PageLimits {
    pub const fn new(default_size: i64, max_size: i64) -> Self {
        Self {
            default_size,
            max_size,
        }
    }
}

/// Raw paging query parameters. Kept as strings so malformed numbers surface as
/// `AppError::InvalidInput` rather than an extractor rejection.
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct PageParams {
    /// 1-based page number
    pub page: Option<String>,
    /// Rows per page (alias of `limit`)
    pub page_size: Option<String>,
    /// Rows per page
    pub limit: Option<String>,
    /// Rows to skip; overrides `page`
    pub offset: Option<String>,
}

/// A validated window into a result set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    pub limit: i64,
    pub offset: i64,
}

impl Page {
    pub fn new(limit: i64, offset: i64) -> Self {
        Self { limit, offset }
    }

    /// 1-based page number of this window.
    pub fn number(&self) -> i64 {
        self.offset / self.limit + 1
    }
}

fn parse_number(name: &str, value: &str) -> Result<i64, AppError> {
    value
        .trim()
        .parse::<i64>()
        .map_err(|_| {
            AppError::InvalidInput(format!("{} must be an integer, got '{}'", name, value))
        })
}

impl PageParams {
    pub fn resolve(&self, limits: PageLimits) -> Result<Page, AppError> {
        let size = match (self.page_size.as_deref(), self.limit.as_deref()) {
            (Some(v), _) => Some(("pageSize", v)),
            (None, Some(v)) => Some(("limit", v)),
            (None, None) => None,
        };
        let limit = match size {
            Some((name, raw)) => {
                let n = parse_number(name, raw)?;
                if n < 1 {
                    return Err(AppError::InvalidInput(format!(
                        "{} must be at least 1",
                        name
                    )));
                }
                n.min(limits.max_size)
            }
            None => limits.default_size,
        };

        let offset = match (self.offset.as_deref(), self.page.as_deref()) {
            (Some(raw), _) => {
                let n = parse_number("offset", raw)?;
                if n < 0 {
                    return Err(AppError::InvalidInput(
                        "offset must not be negative".to_string(),
                    ));
                }
                n
            }
            (None, Some(raw)) => {
                let page = parse_number("page", raw)?;
                if page < 1 {
                    return Err(AppError::InvalidInput("page must be at least 1".to_string()));
                }
                (page - 1)
                    .checked_mul(limit)
                    .ok_or_else(|| AppError::InvalidInput("page is out of range".to_string()))?
            }
            (None, None) => 0,
        };

        Ok(Page { limit, offset })
    }
}
