//! Repository layer abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define use-case oriented data access contracts.
//! - Isolate SQLite query details from facade orchestration.
//!
//! # Invariants
//! - Repository writes must enforce model validation before persistence.
//! - Repository APIs return semantic errors (`NotFound`, `DuplicateLink`) in
//!   addition to DB transport errors, so callers can tell "nothing to
//!   update" from "could not reach the store".

pub mod paper_repo;
pub mod tag_repo;
