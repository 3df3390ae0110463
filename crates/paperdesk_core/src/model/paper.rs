//! Paper domain model.
//!
//! # Responsibility
//! - Define the canonical paper record consumed by query and status layers.
//! - Validate the required-field rules shared by ingestion and catalog-add.
//!
//! # Invariants
//! - `id` is stable and never reused for another paper.
//! - `categories` is non-empty for any paper surfaced through the catalog.
//! - Localized fields are opaque writeback targets; the core never derives
//!   them itself.

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Stable identifier for a catalogued paper.
///
/// Kept as a type alias to make semantic intent explicit in signatures.
pub type PaperId = String;

/// Canonical catalog record for one research paper.
///
/// Acquisition produces records already in this shape; the catalog only
/// mutates status flags and localization writeback fields afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Paper {
    /// Stable global id (arXiv entry id or caller-supplied identifier).
    pub id: PaperId,
    pub title: String,
    /// Author names ordered as published.
    pub authors: Vec<String>,
    pub summary: String,
    /// Category codes. Set semantics, but input order is preserved for
    /// display.
    pub categories: Vec<String>,
    /// Publication timestamp in epoch milliseconds.
    pub published: i64,
    /// Translated title written back by the translation collaborator.
    pub title_localized: Option<String>,
    /// Translated summary written back by the translation collaborator.
    pub summary_localized: Option<String>,
    /// Translated fulltext written back by the translation collaborator.
    pub fulltext_localized: Option<String>,
    pub is_read: bool,
    pub is_favorite: bool,
}

/// Validation failure for paper records.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PaperValidationError {
    /// `id` is empty or whitespace-only.
    BlankId,
    /// `title` is empty or whitespace-only.
    BlankTitle,
    /// `authors` list is empty.
    NoAuthors,
    /// `categories` list is empty.
    NoCategories,
}

impl Display for PaperValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::BlankId => write!(f, "paper id must not be blank"),
            Self::BlankTitle => write!(f, "paper title must not be blank"),
            Self::NoAuthors => write!(f, "paper must have at least one author"),
            Self::NoCategories => write!(f, "paper must have at least one category"),
        }
    }
}

impl Error for PaperValidationError {}

impl Paper {
    /// Creates a paper with default status flags and no localization.
    pub fn new(
        id: impl Into<PaperId>,
        title: impl Into<String>,
        authors: Vec<String>,
        summary: impl Into<String>,
        categories: Vec<String>,
        published: i64,
    ) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            authors,
            summary: summary.into(),
            categories,
            published,
            title_localized: None,
            summary_localized: None,
            fulltext_localized: None,
            is_read: false,
            is_favorite: false,
        }
    }

    /// Checks the required-field rules enforced on every write path.
    ///
    /// # Invariants
    /// - Must be called before any SQL mutation persists this record.
    pub fn validate(&self) -> Result<(), PaperValidationError> {
        if self.id.trim().is_empty() {
            return Err(PaperValidationError::BlankId);
        }
        if self.title.trim().is_empty() {
            return Err(PaperValidationError::BlankTitle);
        }
        if self.authors.is_empty() {
            return Err(PaperValidationError::NoAuthors);
        }
        if self.categories.is_empty() {
            return Err(PaperValidationError::NoCategories);
        }
        Ok(())
    }

    /// Returns whether this paper carries the given category code.
    ///
    /// Exact string match; category codes are case-sensitive (`cs.AI`).
    pub fn has_category(&self, category: &str) -> bool {
        self.categories.iter().any(|code| code == category)
    }
}

#[cfg(test)]
mod tests {
    use super::{Paper, PaperValidationError};

    fn sample() -> Paper {
        Paper::new(
            "2401.00001",
            "Attention Is Not All You Need",
            vec!["A. Researcher".to_string()],
            "A summary.",
            vec!["cs.LG".to_string()],
            1_700_000_000_000,
        )
    }

    #[test]
    fn valid_paper_passes_validation() {
        assert_eq!(sample().validate(), Ok(()));
    }

    #[test]
    fn blank_id_is_rejected() {
        let mut paper = sample();
        paper.id = "  ".to_string();
        assert_eq!(paper.validate(), Err(PaperValidationError::BlankId));
    }

    #[test]
    fn empty_categories_are_rejected() {
        let mut paper = sample();
        paper.categories.clear();
        assert_eq!(paper.validate(), Err(PaperValidationError::NoCategories));
    }

    #[test]
    fn category_match_is_exact() {
        let paper = sample();
        assert!(paper.has_category("cs.LG"));
        assert!(!paper.has_category("cs.lg"));
        assert!(!paper.has_category("cs.AI"));
    }
}
