//! Catalog facade service.
//!
//! # Responsibility
//! - Expose the full catalog operation set: paper listing/detail/creation,
//!   read/favorite status, localization access and writeback, tag tree, and
//!   paper-tag association.
//! - Validate parameters before delegating and translate every collaborator
//!   failure into the catalog error taxonomy.
//!
//! # Invariants
//! - No business rules beyond orchestration order live here; filtering and
//!   tree construction stay in their pure engines.
//! - No cross-request mutable state: every read rebuilds its working set
//!   from the store at call time.
//! - No collaborator failure is swallowed; every failure carries its kind.

use crate::model::paper::{Paper, PaperId};
use crate::model::tag::{TagId, TagRef};
use crate::query::engine::{run_query, PageRequest, PaperFilter, PaperPage, QueryError, SortOrder};
use crate::repo::paper_repo::{LocalizedText, PaperRepository, RepoError};
use crate::repo::tag_repo::{TagRepoError, TagRepository};
use crate::taxonomy::forest::{build_forest, TagTreeNode};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::{SystemTime, UNIX_EPOCH};
use uuid::Uuid;

/// Flat failure classification handed to the transport collaborator, which
/// maps kinds to distinct response codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Malformed or missing input; caller bug, never retried.
    Validation,
    /// Referenced entity absent; terminal for this call.
    NotFound,
    /// Association already exists; terminal, not retried.
    DuplicateLink,
    /// Pagination or filter parameters out of range.
    InvalidQuery,
    /// Backing store unreachable or erroring; retryable with backoff.
    StorageUnavailable,
}

/// Facade error for catalog operations.
#[derive(Debug)]
pub enum CatalogError {
    /// Input rejected before any store access.
    Validation(String),
    PaperNotFound(PaperId),
    TagNotFound(TagId),
    LinkNotFound { paper_id: PaperId, tag_id: TagId },
    DuplicateLink { paper_id: PaperId, tag_id: TagId },
    InvalidQuery(QueryError),
    /// Paper-store failure with no more specific catalog meaning.
    PaperStore(RepoError),
    /// Tag-store failure with no more specific catalog meaning.
    TagStore(TagRepoError),
}

impl CatalogError {
    /// Returns the flat kind for transport-level mapping.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Validation(_) => ErrorKind::Validation,
            Self::PaperNotFound(_) | Self::TagNotFound(_) | Self::LinkNotFound { .. } => {
                ErrorKind::NotFound
            }
            Self::DuplicateLink { .. } => ErrorKind::DuplicateLink,
            Self::InvalidQuery(_) => ErrorKind::InvalidQuery,
            Self::PaperStore(_) | Self::TagStore(_) => ErrorKind::StorageUnavailable,
        }
    }
}

impl Display for CatalogError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(message) => write!(f, "invalid input: {message}"),
            Self::PaperNotFound(id) => write!(f, "paper not found: {id}"),
            Self::TagNotFound(id) => write!(f, "tag not found: {id}"),
            Self::LinkNotFound { paper_id, tag_id } => {
                write!(f, "tag {tag_id} is not attached to paper {paper_id}")
            }
            Self::DuplicateLink { paper_id, tag_id } => {
                write!(f, "tag {tag_id} is already attached to paper {paper_id}")
            }
            Self::InvalidQuery(err) => write!(f, "{err}"),
            Self::PaperStore(err) => write!(f, "{err}"),
            Self::TagStore(err) => write!(f, "{err}"),
        }
    }
}

impl Error for CatalogError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::InvalidQuery(err) => Some(err),
            Self::PaperStore(err) => Some(err),
            Self::TagStore(err) => Some(err),
            _ => None,
        }
    }
}

impl From<QueryError> for CatalogError {
    fn from(value: QueryError) -> Self {
        Self::InvalidQuery(value)
    }
}

impl From<RepoError> for CatalogError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::Validation(err) => Self::Validation(err.to_string()),
            RepoError::NotFound(id) => Self::PaperNotFound(id),
            // The error taxonomy has no duplicate-paper kind; a caller
            // re-supplying an existing immutable id is a caller bug.
            RepoError::DuplicateId(id) => {
                Self::Validation(format!("paper id already exists: {id}"))
            }
            other => Self::PaperStore(other),
        }
    }
}

impl From<TagRepoError> for CatalogError {
    fn from(value: TagRepoError) -> Self {
        match value {
            TagRepoError::PaperNotFound(id) => Self::PaperNotFound(id),
            TagRepoError::TagNotFound(id) => Self::TagNotFound(id),
            TagRepoError::DuplicateLink { paper_id, tag_id } => {
                Self::DuplicateLink { paper_id, tag_id }
            }
            TagRepoError::LinkNotFound { paper_id, tag_id } => {
                Self::LinkNotFound { paper_id, tag_id }
            }
            other => Self::TagStore(other),
        }
    }
}

/// Request model for catalog-add. Identifier and timestamp are optional;
/// the facade fills defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewPaper {
    /// Caller-supplied stable id; a fresh UUID is generated when absent.
    pub id: Option<PaperId>,
    pub title: String,
    pub authors: Vec<String>,
    pub summary: String,
    pub categories: Vec<String>,
    /// Epoch milliseconds; defaults to the current time when absent.
    pub published: Option<i64>,
}

/// Catalog facade composing the paper and tag repositories with the pure
/// query and taxonomy engines.
pub struct CatalogService<P: PaperRepository, T: TagRepository> {
    papers: P,
    tags: T,
}

impl<P: PaperRepository, T: TagRepository> CatalogService<P, T> {
    /// Creates a facade over the provided repository implementations.
    pub fn new(papers: P, tags: T) -> Self {
        Self { papers, tags }
    }

    /// Lists papers with optional filter and mandatory pagination.
    ///
    /// Reads the full catalogued set and delegates to the query engine,
    /// newest first. Category takes precedence over search.
    pub fn list_papers(
        &self,
        filter: &PaperFilter,
        page: &PageRequest,
    ) -> Result<PaperPage, CatalogError> {
        // Page validation happens before the store read so an invalid page
        // performs no work at all.
        if page.offset < 0 {
            return Err(QueryError::InvalidOffset(page.offset).into());
        }
        if page.limit <= 0 {
            return Err(QueryError::InvalidLimit(page.limit).into());
        }

        let papers = self.papers.list_papers()?;
        Ok(run_query(papers, filter, SortOrder::Descending, page)?)
    }

    /// Gets one paper by id.
    pub fn get_paper(&self, paper_id: &str) -> Result<Paper, CatalogError> {
        let paper_id = require_paper_id(paper_id)?;
        self.papers
            .get_paper(paper_id)?
            .ok_or_else(|| CatalogError::PaperNotFound(paper_id.to_string()))
    }

    /// Adds one paper to the catalog.
    pub fn add_paper(&self, request: NewPaper) -> Result<Paper, CatalogError> {
        let id = match request.id {
            Some(id) => id,
            None => Uuid::new_v4().to_string(),
        };
        let published = request.published.unwrap_or_else(now_epoch_ms);

        let paper = Paper::new(
            id,
            request.title,
            request.authors,
            request.summary,
            request.categories,
            published,
        );
        self.papers.create_paper(&paper)?;
        Ok(paper)
    }

    /// Sets the read flag for one paper. Idempotent.
    pub fn set_read_status(&self, paper_id: &str, is_read: bool) -> Result<(), CatalogError> {
        let paper_id = require_paper_id(paper_id)?;
        self.papers.set_read(paper_id, is_read)?;
        Ok(())
    }

    /// Sets the favorite flag for one paper. Idempotent.
    pub fn set_favorite_status(
        &self,
        paper_id: &str,
        is_favorite: bool,
    ) -> Result<(), CatalogError> {
        let paper_id = require_paper_id(paper_id)?;
        self.papers.set_favorite(paper_id, is_favorite)?;
        Ok(())
    }

    /// Lists ids of papers marked read.
    pub fn list_read_papers(&self) -> Result<Vec<PaperId>, CatalogError> {
        Ok(self.papers.list_read_ids()?)
    }

    /// Lists ids of papers marked favorite.
    pub fn list_favorite_papers(&self) -> Result<Vec<PaperId>, CatalogError> {
        Ok(self.papers.list_favorite_ids()?)
    }

    /// Returns the localized fulltext for one paper.
    ///
    /// A paper with no localized text yields an empty string, never an
    /// error; a missing paper is `NotFound`.
    pub fn localized_fulltext(&self, paper_id: &str) -> Result<String, CatalogError> {
        let paper_id = require_paper_id(paper_id)?;
        self.papers
            .localized_fulltext(paper_id)?
            .ok_or_else(|| CatalogError::PaperNotFound(paper_id.to_string()))
    }

    /// Applies a translation writeback to one paper.
    pub fn set_localization(
        &self,
        paper_id: &str,
        text: &LocalizedText,
    ) -> Result<(), CatalogError> {
        let paper_id = require_paper_id(paper_id)?;
        self.papers.set_localization(paper_id, text)?;
        Ok(())
    }

    /// Returns the user-defined tag taxonomy rendered as a forest.
    pub fn tag_tree(&self) -> Result<Vec<TagTreeNode>, CatalogError> {
        let tags = self.tags.list_tags()?;
        Ok(build_forest(&tags))
    }

    /// Attaches one tag to one paper. Not idempotent: a duplicate link is
    /// rejected by the store constraint.
    pub fn attach_tag(&self, paper_id: &str, tag_id: TagId) -> Result<(), CatalogError> {
        let paper_id = require_paper_id(paper_id)?;
        let tag_id = require_tag_id(tag_id)?;
        self.tags.attach(paper_id, tag_id)?;
        Ok(())
    }

    /// Detaches one tag from one paper.
    pub fn detach_tag(&self, paper_id: &str, tag_id: TagId) -> Result<(), CatalogError> {
        let paper_id = require_paper_id(paper_id)?;
        let tag_id = require_tag_id(tag_id)?;
        self.tags.detach(paper_id, tag_id)?;
        Ok(())
    }

    /// Lists the tags attached to one paper. Empty for untagged papers.
    pub fn tags_for_paper(&self, paper_id: &str) -> Result<Vec<TagRef>, CatalogError> {
        let paper_id = require_paper_id(paper_id)?;
        Ok(self.tags.tags_for(paper_id)?)
    }
}

fn require_paper_id(paper_id: &str) -> Result<&str, CatalogError> {
    let trimmed = paper_id.trim();
    if trimmed.is_empty() {
        return Err(CatalogError::Validation(
            "paper_id must not be blank".to_string(),
        ));
    }
    Ok(trimmed)
}

fn require_tag_id(tag_id: TagId) -> Result<TagId, CatalogError> {
    if tag_id <= 0 {
        return Err(CatalogError::Validation(format!(
            "tag_id must be positive, got {tag_id}"
        )));
    }
    Ok(tag_id)
}

fn now_epoch_ms() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_millis() as i64)
        .unwrap_or(0)
}
