use std::num::IntErrorKind;

use serde::{Deserialize, Serialize};

/// Fixed page size for every list endpoint.
pub const PAGE_SIZE: u64 = 8;

/// Highest page number accepted. Keeps the row offset within a signed
/// 64-bit SQL `OFFSET`.
pub const MAX_PAGE: u64 = i64::MAX as u64 / PAGE_SIZE;

/// Success envelope wrapping every resource response.
#[derive(Serialize, utoipa::ToSchema)]
pub struct ApiResponse<T> {
    /// Always `true`.
    #[schema(example = true)]
    pub success: bool,
    #[schema(example = "Post Detail!")]
    pub message: String,
    pub data: T,
}

impl<T> ApiResponse<T> {
    pub fn new(message: impl Into<String>, data: T) -> Self {
        Self {
            success: true,
            message: message.into(),
            data,
        }
    }
}

/// Success envelope for operations that return no entity; `data` is `null`.
#[derive(Serialize, utoipa::ToSchema)]
pub struct MessageResponse {
    #[schema(example = true)]
    pub success: bool,
    #[schema(example = "Role deleted successfully")]
    pub message: String,
    #[schema(value_type = Option<Object>)]
    pub data: Option<()>,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
            data: None,
        }
    }
}

/// Query parameters for list endpoints.
#[derive(Debug, Default, Deserialize, utoipa::IntoParams)]
#[into_params(parameter_in = Query)]
pub struct PageQuery {
    /// 1-based page number. Missing or invalid values mean page 1.
    #[param(value_type = Option<u64>, example = 1)]
    pub page: Option<String>,
}

impl PageQuery {
    /// Requested page, clamped to `1..=MAX_PAGE`.
    pub fn page(&self) -> u64 {
        let Some(raw) = self.page.as_deref() else {
            return 1;
        };
        match raw.trim().parse::<u64>() {
            Ok(p) if p >= 1 => p.min(MAX_PAGE),
            Err(e) if *e.kind() == IntErrorKind::PosOverflow => MAX_PAGE,
            _ => 1,
        }
    }

    /// Rows to skip for this page.
    pub fn offset(&self) -> u64 {
        (self.page() - 1) * PAGE_SIZE
    }
}

/// One page of results with navigation metadata.
#[derive(Serialize, utoipa::ToSchema)]
pub struct Paginated<T> {
    #[schema(example = 1)]
    pub current_page: u64,
    pub data: Vec<T>,
    #[schema(example = "/api/posts?page=1")]
    pub first_page_url: String,
    /// 1-based index of the first item on this page; `null` when empty.
    #[schema(example = 1)]
    pub from: Option<u64>,
    #[schema(example = 3)]
    pub last_page: u64,
    #[schema(example = "/api/posts?page=3")]
    pub last_page_url: String,
    pub next_page_url: Option<String>,
    #[schema(example = "/api/posts")]
    pub path: String,
    #[schema(example = 8)]
    pub per_page: u64,
    pub prev_page_url: Option<String>,
    /// 1-based index of the last item on this page; `null` when empty.
    #[schema(example = 8)]
    pub to: Option<u64>,
    #[schema(example = 20)]
    pub total: u64,
}

impl<T> Paginated<T> {
    pub fn new(data: Vec<T>, page: u64, total: u64, path: &str) -> Self {
        let last_page = total.div_ceil(PAGE_SIZE).max(1);
        let url = |p: u64| format!("{path}?page={p}");

        let (from, to) = if data.is_empty() {
            (None, None)
        } else {
            let from = (page - 1) * PAGE_SIZE + 1;
            (Some(from), Some(from + data.len() as u64 - 1))
        };

        Self {
            current_page: page,
            first_page_url: url(1),
            from,
            last_page,
            last_page_url: url(last_page),
            next_page_url: (page < last_page).then(|| url(page + 1)),
            path: path.to_string(),
            per_page: PAGE_SIZE,
            prev_page_url: (page > 1).then(|| url(page - 1)),
            to,
            total,
            data,
        }
    }
}

/// Public URL of a stored image.
pub fn image_url(namespace: &str, filename: Option<&str>) -> Option<String> {
    filename.map(|f| format!("/storage/{namespace}/{f}"))
}
