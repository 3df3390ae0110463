//! Paper repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Provide stable persistence APIs over the `papers` table: record
//!   creation, full-set reads, read/favorite status flags, and localization
//!   writeback.
//! - Keep SQL details inside the catalog persistence boundary.
//!
//! # Invariants
//! - Write paths must call `Paper::validate()` before SQL mutations.
//! - Read paths must reject invalid persisted state instead of masking it.
//! - Status updates are idempotent: matching a row counts as success even
//!   when the stored value is unchanged.

use crate::db::migrations::latest_version;
use crate::db::DbError;
use crate::model::paper::{Paper, PaperId, PaperValidationError};
use rusqlite::{params, Connection, Row};
use std::error::Error;
use std::fmt::{Display, Formatter};

const PAPER_SELECT_SQL: &str = "SELECT
    id,
    title,
    authors,
    summary,
    categories,
    published,
    title_localized,
    summary_localized,
    fulltext_localized,
    is_read,
    is_favorite
FROM papers";

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository error for paper persistence and query operations.
#[derive(Debug)]
pub enum RepoError {
    Validation(PaperValidationError),
    /// Storage transport failure; retryable at the caller's discretion.
    Db(DbError),
    /// Referenced paper does not exist.
    NotFound(PaperId),
    /// A paper with this id already exists.
    DuplicateId(PaperId),
    /// Connection schema is not at the expected migrated version.
    UninitializedConnection {
        expected_version: u32,
        actual_version: u32,
    },
    /// Persisted data cannot be converted to a valid read model.
    InvalidData(String),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::NotFound(id) => write!(f, "paper not found: {id}"),
            Self::DuplicateId(id) => write!(f, "paper id already exists: {id}"),
            Self::UninitializedConnection {
                expected_version,
                actual_version,
            } => write!(
                f,
                "paper repository requires schema version {expected_version}, got {actual_version}"
            ),
            Self::InvalidData(message) => write!(f, "invalid persisted paper data: {message}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Db(err) => Some(err),
            Self::NotFound(_) => None,
            Self::DuplicateId(_) => None,
            Self::UninitializedConnection { .. } => None,
            Self::InvalidData(_) => None,
        }
    }
}

impl From<PaperValidationError> for RepoError {
    fn from(value: PaperValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Translation writeback payload. Fields left as `None` keep their stored
/// value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LocalizedText {
    pub title: Option<String>,
    pub summary: Option<String>,
    pub fulltext: Option<String>,
}

/// Repository interface for paper persistence and status operations.
pub trait PaperRepository {
    /// Inserts one paper and returns its stable id.
    fn create_paper(&self, paper: &Paper) -> RepoResult<PaperId>;
    /// Gets one paper by id.
    fn get_paper(&self, id: &str) -> RepoResult<Option<Paper>>;
    /// Reads the full catalogued set, newest first.
    fn list_papers(&self) -> RepoResult<Vec<Paper>>;
    /// Sets the read flag. Idempotent; `NotFound` when the paper is absent.
    fn set_read(&self, id: &str, is_read: bool) -> RepoResult<()>;
    /// Sets the favorite flag. Idempotent; `NotFound` when the paper is
    /// absent.
    fn set_favorite(&self, id: &str, is_favorite: bool) -> RepoResult<()>;
    /// Lists ids of papers marked read.
    fn list_read_ids(&self) -> RepoResult<Vec<PaperId>>;
    /// Lists ids of papers marked favorite.
    fn list_favorite_ids(&self) -> RepoResult<Vec<PaperId>>;
    /// Reads the localized fulltext column.
    ///
    /// Returns `None` when the paper row is missing; `Some("")` when the
    /// paper exists but carries no localized text.
    fn localized_fulltext(&self, id: &str) -> RepoResult<Option<String>>;
    /// Applies a translation writeback to one paper.
    fn set_localization(&self, id: &str, text: &LocalizedText) -> RepoResult<()>;
}

/// SQLite-backed paper repository.
pub struct SqlitePaperRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqlitePaperRepository<'conn> {
    /// Creates a repository from a migrated/ready connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_paper_connection_ready(conn)?;
        Ok(Self { conn })
    }
}

impl PaperRepository for SqlitePaperRepository<'_> {
    fn create_paper(&self, paper: &Paper) -> RepoResult<PaperId> {
        paper.validate()?;

        let authors = encode_string_list(&paper.authors)?;
        let categories = encode_string_list(&paper.categories)?;
        let inserted = self.conn.execute(
            "INSERT INTO papers (
                id,
                title,
                authors,
                summary,
                categories,
                published,
                title_localized,
                summary_localized,
                fulltext_localized,
                is_read,
                is_favorite
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11);",
            params![
                paper.id.as_str(),
                paper.title.as_str(),
                authors,
                paper.summary.as_str(),
                categories,
                paper.published,
                paper.title_localized.as_deref(),
                paper.summary_localized.as_deref(),
                paper.fulltext_localized.as_deref(),
                bool_to_int(paper.is_read),
                bool_to_int(paper.is_favorite),
            ],
        );

        match inserted {
            Ok(_) => Ok(paper.id.clone()),
            Err(err) if is_unique_violation(&err) => Err(RepoError::DuplicateId(paper.id.clone())),
            Err(err) => Err(err.into()),
        }
    }

    fn get_paper(&self, id: &str) -> RepoResult<Option<Paper>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{PAPER_SELECT_SQL} WHERE id = ?1;"))?;

        let mut rows = stmt.query([id])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_paper_row(row)?));
        }

        Ok(None)
    }

    fn list_papers(&self) -> RepoResult<Vec<Paper>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{PAPER_SELECT_SQL} ORDER BY published DESC, id ASC;"))?;
        let mut rows = stmt.query([])?;
        let mut papers = Vec::new();

        while let Some(row) = rows.next()? {
            papers.push(parse_paper_row(row)?);
        }

        Ok(papers)
    }

    fn set_read(&self, id: &str, is_read: bool) -> RepoResult<()> {
        let changed = self.conn.execute(
            "UPDATE papers
             SET is_read = ?2,
                 updated_at = (strftime('%s', 'now') * 1000)
             WHERE id = ?1;",
            params![id, bool_to_int(is_read)],
        )?;

        if changed == 0 {
            return Err(RepoError::NotFound(id.to_string()));
        }

        Ok(())
    }

    fn set_favorite(&self, id: &str, is_favorite: bool) -> RepoResult<()> {
        let changed = self.conn.execute(
            "UPDATE papers
             SET is_favorite = ?2,
                 updated_at = (strftime('%s', 'now') * 1000)
             WHERE id = ?1;",
            params![id, bool_to_int(is_favorite)],
        )?;

        if changed == 0 {
            return Err(RepoError::NotFound(id.to_string()));
        }

        Ok(())
    }

    fn list_read_ids(&self) -> RepoResult<Vec<PaperId>> {
        list_flagged_ids(self.conn, "is_read")
    }

    fn list_favorite_ids(&self) -> RepoResult<Vec<PaperId>> {
        list_flagged_ids(self.conn, "is_favorite")
    }

    fn localized_fulltext(&self, id: &str) -> RepoResult<Option<String>> {
        let mut stmt = self
            .conn
            .prepare("SELECT fulltext_localized FROM papers WHERE id = ?1;")?;
        let mut rows = stmt.query([id])?;

        if let Some(row) = rows.next()? {
            let text: Option<String> = row.get(0)?;
            return Ok(Some(text.unwrap_or_default()));
        }

        Ok(None)
    }

    fn set_localization(&self, id: &str, text: &LocalizedText) -> RepoResult<()> {
        let changed = self.conn.execute(
            "UPDATE papers
             SET title_localized = COALESCE(?2, title_localized),
                 summary_localized = COALESCE(?3, summary_localized),
                 fulltext_localized = COALESCE(?4, fulltext_localized),
                 updated_at = (strftime('%s', 'now') * 1000)
             WHERE id = ?1;",
            params![
                id,
                text.title.as_deref(),
                text.summary.as_deref(),
                text.fulltext.as_deref(),
            ],
        )?;

        if changed == 0 {
            return Err(RepoError::NotFound(id.to_string()));
        }

        Ok(())
    }
}

fn list_flagged_ids(conn: &Connection, flag_column: &str) -> RepoResult<Vec<PaperId>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT id FROM papers WHERE {flag_column} = 1 ORDER BY published DESC, id ASC;"
    ))?;
    let mut rows = stmt.query([])?;
    let mut ids = Vec::new();

    while let Some(row) = rows.next()? {
        ids.push(row.get(0)?);
    }

    Ok(ids)
}

fn parse_paper_row(row: &Row<'_>) -> RepoResult<Paper> {
    let authors_text: String = row.get("authors")?;
    let categories_text: String = row.get("categories")?;

    let paper = Paper {
        id: row.get("id")?,
        title: row.get("title")?,
        authors: decode_string_list(&authors_text, "papers.authors")?,
        summary: row.get("summary")?,
        categories: decode_string_list(&categories_text, "papers.categories")?,
        published: row.get("published")?,
        title_localized: row.get("title_localized")?,
        summary_localized: row.get("summary_localized")?,
        fulltext_localized: row.get("fulltext_localized")?,
        is_read: int_to_bool(row.get("is_read")?, "papers.is_read")?,
        is_favorite: int_to_bool(row.get("is_favorite")?, "papers.is_favorite")?,
    };
    paper.validate()?;
    Ok(paper)
}

fn encode_string_list(values: &[String]) -> RepoResult<String> {
    serde_json::to_string(values)
        .map_err(|err| RepoError::InvalidData(format!("failed to encode string list: {err}")))
}

fn decode_string_list(value: &str, column: &'static str) -> RepoResult<Vec<String>> {
    serde_json::from_str(value)
        .map_err(|_| RepoError::InvalidData(format!("invalid JSON list `{value}` in {column}")))
}

fn bool_to_int(value: bool) -> i64 {
    if value {
        1
    } else {
        0
    }
}

fn int_to_bool(value: i64, column: &'static str) -> RepoResult<bool> {
    match value {
        0 => Ok(false),
        1 => Ok(true),
        other => Err(RepoError::InvalidData(format!(
            "invalid flag value `{other}` in {column}"
        ))),
    }
}

fn is_unique_violation(err: &rusqlite::Error) -> bool {
    matches!(
        err,
        rusqlite::Error::SqliteFailure(failure, _)
            if failure.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_PRIMARYKEY
                || failure.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE
    )
}

fn ensure_paper_connection_ready(conn: &Connection) -> RepoResult<()> {
    let expected_version = latest_version();
    let actual_version: u32 = conn.query_row("PRAGMA user_version;", [], |row| row.get(0))?;
    if actual_version != expected_version {
        return Err(RepoError::UninitializedConnection {
            expected_version,
            actual_version,
        });
    }
    Ok(())
}
