//! Core domain logic for Paperdesk, a local research-paper catalog.
//! This crate is the single source of truth for business invariants.

pub mod db;
pub mod logging;
pub mod model;
pub mod query;
pub mod repo;
pub mod service;
pub mod taxonomy;

pub use db::{open_db, open_db_in_memory, DbError};
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::paper::{Paper, PaperId, PaperValidationError};
pub use model::tag::{Tag, TagId, TagRef};
pub use query::engine::{
    run_query, PageRequest, PaperFilter, PaperPage, QueryError, SortOrder,
};
pub use repo::paper_repo::{
    LocalizedText, PaperRepository, RepoError, RepoResult, SqlitePaperRepository,
};
pub use repo::tag_repo::{SqliteTagRepository, TagRepoError, TagRepoResult, TagRepository};
pub use service::catalog_service::{CatalogError, CatalogService, ErrorKind, NewPaper};
pub use taxonomy::forest::{build_forest, TagTreeNode};

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
