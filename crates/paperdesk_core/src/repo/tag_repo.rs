//! Tag and paper-tag-link repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Read the flat tag taxonomy in builder-ready order.
//! - Own paper-tag link creation and removal.
//!
//! # Invariants
//! - The `UNIQUE (paper_id, tag_id)` constraint is the arbiter for duplicate
//!   links; attach never pre-checks in process (a check-then-act would race
//!   under concurrent requests).
//! - Tag listing order is deterministic: `parent_id ASC, id ASC` with roots
//!   first, matching the tree builder's input contract.

use crate::db::DbError;
use crate::model::tag::{Tag, TagId, TagRef};
use rusqlite::{params, Connection};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type TagRepoResult<T> = Result<T, TagRepoError>;

/// Errors from tag and association repository operations.
#[derive(Debug)]
pub enum TagRepoError {
    /// Underlying SQLite/bootstrap error.
    Db(DbError),
    /// Link target paper does not exist.
    PaperNotFound(String),
    /// Link target tag does not exist.
    TagNotFound(TagId),
    /// The (paper, tag) link already exists.
    DuplicateLink { paper_id: String, tag_id: TagId },
    /// The (paper, tag) link does not exist.
    LinkNotFound { paper_id: String, tag_id: TagId },
    /// Required table is missing.
    MissingRequiredTable(&'static str),
    /// Required column is missing from expected table.
    MissingRequiredColumn {
        table: &'static str,
        column: &'static str,
    },
    /// Persisted data cannot be converted to a valid read model.
    InvalidData(String),
}

impl Display for TagRepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::PaperNotFound(id) => write!(f, "paper not found: {id}"),
            Self::TagNotFound(id) => write!(f, "tag not found: {id}"),
            Self::DuplicateLink { paper_id, tag_id } => {
                write!(f, "tag {tag_id} is already attached to paper {paper_id}")
            }
            Self::LinkNotFound { paper_id, tag_id } => {
                write!(f, "tag {tag_id} is not attached to paper {paper_id}")
            }
            Self::MissingRequiredTable(table) => {
                write!(f, "tag repository requires table `{table}`")
            }
            Self::MissingRequiredColumn { table, column } => write!(
                f,
                "tag repository requires column `{column}` in table `{table}`"
            ),
            Self::InvalidData(message) => write!(f, "invalid tag data: {message}"),
        }
    }
}

impl Error for TagRepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            _ => None,
        }
    }
}

impl From<DbError> for TagRepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for TagRepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Repository interface for tag taxonomy reads and link mutations.
pub trait TagRepository {
    /// Lists all tags ordered for tree construction (roots first, then by
    /// parent and id).
    fn list_tags(&self) -> TagRepoResult<Vec<Tag>>;
    /// Creates one (paper, tag) link. Fails with `DuplicateLink` when the
    /// pair already exists.
    fn attach(&self, paper_id: &str, tag_id: TagId) -> TagRepoResult<()>;
    /// Removes one (paper, tag) link. Fails with `LinkNotFound` when the
    /// pair does not exist.
    fn detach(&self, paper_id: &str, tag_id: TagId) -> TagRepoResult<()>;
    /// Lists tags attached to one paper, ordered by tag id.
    fn tags_for(&self, paper_id: &str) -> TagRepoResult<Vec<TagRef>>;
}

/// SQLite-backed tag repository.
pub struct SqliteTagRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteTagRepository<'conn> {
    /// Creates a repository from a migrated/ready connection.
    pub fn try_new(conn: &'conn Connection) -> TagRepoResult<Self> {
        ensure_tag_connection_ready(conn)?;
        Ok(Self { conn })
    }
}

impl TagRepository for SqliteTagRepository<'_> {
    fn list_tags(&self) -> TagRepoResult<Vec<Tag>> {
        // NULL parents sort first in SQLite ASC order, so roots lead.
        let mut stmt = self.conn.prepare(
            "SELECT id, name, parent_id
             FROM tags
             ORDER BY parent_id ASC, id ASC;",
        )?;
        let mut rows = stmt.query([])?;
        let mut tags = Vec::new();

        while let Some(row) = rows.next()? {
            let name: String = row.get("name")?;
            if name.trim().is_empty() {
                let id: TagId = row.get("id")?;
                return Err(TagRepoError::InvalidData(format!(
                    "blank name for tag {id} in tags.name"
                )));
            }
            tags.push(Tag {
                id: row.get("id")?,
                name,
                parent_id: row.get("parent_id")?,
            });
        }

        Ok(tags)
    }

    fn attach(&self, paper_id: &str, tag_id: TagId) -> TagRepoResult<()> {
        let inserted = self.conn.execute(
            "INSERT INTO paper_tags (paper_id, tag_id) VALUES (?1, ?2);",
            params![paper_id, tag_id],
        );

        match inserted {
            Ok(_) => Ok(()),
            Err(err) if is_unique_violation(&err) => Err(TagRepoError::DuplicateLink {
                paper_id: paper_id.to_string(),
                tag_id,
            }),
            // The insert already failed; read-only probes only disambiguate
            // which reference was missing.
            Err(err) if is_foreign_key_violation(&err) => {
                if !self.paper_exists(paper_id)? {
                    return Err(TagRepoError::PaperNotFound(paper_id.to_string()));
                }
                Err(TagRepoError::TagNotFound(tag_id))
            }
            Err(err) => Err(err.into()),
        }
    }

    fn detach(&self, paper_id: &str, tag_id: TagId) -> TagRepoResult<()> {
        let changed = self.conn.execute(
            "DELETE FROM paper_tags WHERE paper_id = ?1 AND tag_id = ?2;",
            params![paper_id, tag_id],
        )?;

        if changed == 0 {
            return Err(TagRepoError::LinkNotFound {
                paper_id: paper_id.to_string(),
                tag_id,
            });
        }

        Ok(())
    }

    fn tags_for(&self, paper_id: &str) -> TagRepoResult<Vec<TagRef>> {
        let mut stmt = self.conn.prepare(
            "SELECT t.id, t.name
             FROM paper_tags pt
             INNER JOIN tags t ON t.id = pt.tag_id
             WHERE pt.paper_id = ?1
             ORDER BY t.id ASC;",
        )?;
        let mut rows = stmt.query([paper_id])?;
        let mut tags = Vec::new();

        while let Some(row) = rows.next()? {
            tags.push(TagRef {
                id: row.get(0)?,
                name: row.get(1)?,
            });
        }

        Ok(tags)
    }
}

impl SqliteTagRepository<'_> {
    fn paper_exists(&self, paper_id: &str) -> TagRepoResult<bool> {
        let exists: i64 = self.conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM papers WHERE id = ?1);",
            [paper_id],
            |row| row.get(0),
        )?;
        Ok(exists == 1)
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

fn is_foreign_key_violation(err: &rusqlite::Error) -> bool {
    matches!(
        err,
        rusqlite::Error::SqliteFailure(failure, _)
            if failure.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_FOREIGNKEY
    )
}

fn ensure_tag_connection_ready(conn: &Connection) -> TagRepoResult<()> {
    for table in ["tags", "paper_tags"] {
        if !table_exists(conn, table)? {
            return Err(TagRepoError::MissingRequiredTable(table));
        }
    }

    for column in ["id", "name", "parent_id"] {
        if !table_has_column(conn, "tags", column)? {
            return Err(TagRepoError::MissingRequiredColumn {
                table: "tags",
                column,
            });
        }
    }

    for column in ["paper_id", "tag_id"] {
        if !table_has_column(conn, "paper_tags", column)? {
            return Err(TagRepoError::MissingRequiredColumn {
                table: "paper_tags",
                column,
            });
        }
    }

    Ok(())
}

fn table_exists(conn: &Connection, table: &str) -> TagRepoResult<bool> {
    let exists: i64 = conn.query_row(
        "SELECT EXISTS(
            SELECT 1
            FROM sqlite_master
            WHERE type = 'table' AND name = ?1
        );",
        [table],
        |row| row.get(0),
    )?;
    Ok(exists == 1)
}

fn table_has_column(conn: &Connection, table: &str, column: &str) -> TagRepoResult<bool> {
    let mut stmt = conn.prepare(&format!("PRAGMA table_info({table});"))?;
    let mut rows = stmt.query([])?;
    while let Some(row) = rows.next()? {
        let current: String = row.get(1)?;
        if current == column {
            return Ok(true);
        }
    }
    Ok(false)
}
