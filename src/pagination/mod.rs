use actix_web::http::header;
use actix_web::HttpResponseBuilder;
use serde::Deserialize;

use crate::error::{AppError, AppResult};

/// Default page size for pagination
pub const PAGE_SIZE: i64 = 20;

/// Upper bound on requested page sizes
pub const MAX_PAGE_SIZE: i64 = 1000;

/// Sortable issue columns
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum IssueSortField {
    #[default]
    Id,
    Name,
    Created,
    State,
    Priority,
}

impl IssueSortField {
    pub fn as_str(&self) -> &'static str {
        match self {
            IssueSortField::Id => "id",
            IssueSortField::Name => "name",
            IssueSortField::Created => "created",
            IssueSortField::State => "state",
            IssueSortField::Priority => "priority",
        }
    }

    fn parse(s: &str) -> Option<Self> {
        match s {
            "id" => Some(IssueSortField::Id),
            "name" => Some(IssueSortField::Name),
            "created" => Some(IssueSortField::Created),
            "state" => Some(IssueSortField::State),
            "priority" => Some(IssueSortField::Priority),
            _ => None,
        }
    }
}

impl std::fmt::Display for IssueSortField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Sort order direction
#[derive(Debug, Clone, Copy, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

impl SortOrder {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortOrder::Asc => "asc",
            SortOrder::Desc => "desc",
        }
    }

    /// SQL keyword for ORDER BY clauses
    pub fn as_sql(&self) -> &'static str {
        match self {
            SortOrder::Asc => "ASC",
            SortOrder::Desc => "DESC",
        }
    }
}

impl std::fmt::Display for SortOrder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Resolved pagination parameters handed to the repositories
#[derive(Debug, Clone, Copy)]
pub struct PageRequest {
    /// Page number, 0-indexed
    pub page: i64,
    pub size: i64,
    pub sort: IssueSortField,
    pub order: SortOrder,
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page: 0,
            size: PAGE_SIZE,
            sort: IssueSortField::default(),
            order: SortOrder::default(),
        }
    }
}

impl PageRequest {
    pub fn limit(&self) -> i64 {
        self.size.clamp(1, MAX_PAGE_SIZE)
    }

    pub fn offset(&self) -> i64 {
        self.page.max(0) * self.limit()
    }
}

/// Parses a `sort=<field>,<asc|desc>` query parameter
fn parse_sort(sort: Option<&str>) -> AppResult<(IssueSortField, SortOrder)> {
    let Some(sort) = sort else {
        return Ok((IssueSortField::default(), SortOrder::default()));
    };

    let (field, order) = match sort.split_once(',') {
        Some((field, order)) => (field, Some(order)),
        None => (sort, None),
    };

    let field = IssueSortField::parse(field.trim())
        .ok_or_else(|| AppError::validation("sortinvalid", format!("unknown sort field: {}", field)))?;

    let order = match order.map(str::trim) {
        None | Some("asc") => SortOrder::Asc,
        Some("desc") => SortOrder::Desc,
        Some(other) => {
            return Err(AppError::validation(
                "sortinvalid",
                format!("unknown sort direction: {}", other),
            ))
        }
    };

    Ok((field, order))
}

/// Query parameters for listing issues
#[derive(Debug, Deserialize)]
pub struct ListIssuesQuery {
    /// Page number (0-indexed, default: 0)
    #[serde(default)]
    pub page: i64,

    /// Items per page (default: 20)
    #[serde(default = "default_size")]
    pub size: i64,

    /// Sort parameter, `<field>,<asc|desc>`
    pub sort: Option<String>,
}

impl ListIssuesQuery {
    pub fn page_request(&self) -> AppResult<PageRequest> {
        let (sort, order) = parse_sort(self.sort.as_deref())?;
        Ok(PageRequest {
            page: self.page,
            size: self.size,
            sort,
            order,
        })
    }
}

/// Query parameters for searching issues
#[derive(Debug, Deserialize)]
pub struct SearchIssuesQuery {
    /// Free-text search expression
    pub query: String,

    /// Page number (0-indexed, default: 0)
    #[serde(default)]
    pub page: i64,

    /// Items per page (default: 20)
    #[serde(default = "default_size")]
    pub size: i64,

    /// Accepted for parity with listing; results are relevance-ordered
    pub sort: Option<String>,
}

impl SearchIssuesQuery {
    pub fn page_request(&self) -> AppResult<PageRequest> {
        let (sort, order) = parse_sort(self.sort.as_deref())?;
        Ok(PageRequest {
            page: self.page,
            size: self.size,
            sort,
            order,
        })
    }
}

fn default_size() -> i64 {
    PAGE_SIZE
}

/// Adds `X-Total-Count` and `Link` headers for a listing page
pub fn pagination_headers(
    res: &mut HttpResponseBuilder,
    base_path: &str,
    page: &PageRequest,
    total_count: i64,
) {
    apply_headers(res, base_path, "", page, total_count);
}

/// Adds pagination headers for a search page, carrying the query along in
/// the generated links
pub fn search_pagination_headers(
    res: &mut HttpResponseBuilder,
    base_path: &str,
    query: &str,
    page: &PageRequest,
    total_count: i64,
) {
    let encoded: String = url::form_urlencoded::byte_serialize(query.as_bytes()).collect();
    apply_headers(res, base_path, &format!("query={}&", encoded), page, total_count);
}

fn apply_headers(
    res: &mut HttpResponseBuilder,
    base_path: &str,
    query_prefix: &str,
    page: &PageRequest,
    total_count: i64,
) {
    res.insert_header(("X-Total-Count", total_count.to_string()));

    let size = page.limit();
    let current = page.page.max(0);
    let last = if total_count > 0 {
        (total_count - 1) / size
    } else {
        0
    };

    let mut links = Vec::new();
    if current < last {
        links.push(link(base_path, query_prefix, current + 1, size, "next"));
    }
    if current > 0 {
        links.push(link(base_path, query_prefix, current - 1, size, "prev"));
    }
    links.push(link(base_path, query_prefix, last, size, "last"));
    links.push(link(base_path, query_prefix, 0, size, "first"));

    res.insert_header((header::LINK, links.join(",")));
}

fn link(base_path: &str, query_prefix: &str, page: i64, size: i64, rel: &str) -> String {
    format!(
        "<{}?{}page={}&size={}>; rel=\"{}\"",
        base_path, query_prefix, page, size, rel
    )
}
