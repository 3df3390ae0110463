//! Paper query engine.
//!
//! # Responsibility
//! - Resolve list queries: category/search filtering, published-date
//!   ordering, offset/limit pagination.
//!
//! # Invariants
//! - At most one filter is honored per call; `category` takes precedence
//!   over `search`.
//! - Sorting happens before pagination and is stable: equal timestamps keep
//!   input order.
//! - `total` counts the filtered set before slicing.

use crate::model::paper::Paper;
use std::cmp::Reverse;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Result type for query execution.
pub type QueryResult<T> = Result<T, QueryError>;

/// Pagination/filter parameter errors.
///
/// Parameters arrive as raw integers from the transport collaborator, so
/// out-of-range values must be representable and rejected here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryError {
    /// `offset` is negative.
    InvalidOffset(i64),
    /// `limit` is zero or negative.
    InvalidLimit(i64),
}

impl Display for QueryError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidOffset(offset) => write!(f, "offset must be >= 0, got {offset}"),
            Self::InvalidLimit(limit) => write!(f, "limit must be > 0, got {limit}"),
        }
    }
}

impl Error for QueryError {}

/// Optional list filters. Blank values are treated as absent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PaperFilter {
    /// Exact-match category code filter.
    pub category: Option<String>,
    /// Case-insensitive substring filter over title, authors and summary.
    pub search: Option<String>,
}

/// Ordering over the published timestamp.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortOrder {
    /// Newest first.
    #[default]
    Descending,
    Ascending,
}

/// Raw pagination window as received from the transport collaborator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub offset: i64,
    pub limit: i64,
}

/// One resolved page of papers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaperPage {
    pub items: Vec<Paper>,
    /// Filtered count before slicing.
    pub total: usize,
    pub has_more: bool,
}

/// Resolves one list query over the supplied paper working set.
///
/// Validation runs before any filtering, so an invalid page never performs
/// partial work.
pub fn run_query(
    papers: Vec<Paper>,
    filter: &PaperFilter,
    order: SortOrder,
    page: &PageRequest,
) -> QueryResult<PaperPage> {
    if page.offset < 0 {
        return Err(QueryError::InvalidOffset(page.offset));
    }
    if page.limit <= 0 {
        return Err(QueryError::InvalidLimit(page.limit));
    }

    let mut matched = apply_filter(papers, filter);
    match order {
        SortOrder::Descending => matched.sort_by_key(|paper| Reverse(paper.published)),
        SortOrder::Ascending => matched.sort_by_key(|paper| paper.published),
    }

    let total = matched.len();
    let offset = page.offset as usize;
    let limit = page.limit as usize;
    let items = matched.into_iter().skip(offset).take(limit).collect();

    Ok(PaperPage {
        items,
        total,
        has_more: offset.saturating_add(limit) < total,
    })
}

fn apply_filter(papers: Vec<Paper>, filter: &PaperFilter) -> Vec<Paper> {
    // Category short-circuits before search is considered.
    if let Some(category) = normalized(filter.category.as_deref()) {
        return papers
            .into_iter()
            .filter(|paper| paper.has_category(category))
            .collect();
    }

    if let Some(needle) = normalized(filter.search.as_deref()) {
        let needle = needle.to_lowercase();
        return papers
            .into_iter()
            .filter(|paper| matches_search(paper, &needle))
            .collect();
    }

    papers
}

fn matches_search(paper: &Paper, lowercase_needle: &str) -> bool {
    paper.title.to_lowercase().contains(lowercase_needle)
        || paper
            .authors
            .iter()
            .any(|author| author.to_lowercase().contains(lowercase_needle))
        || paper.summary.to_lowercase().contains(lowercase_needle)
}

fn normalized(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|trimmed| !trimmed.is_empty())
}
