//! In-memory paper query resolution.
//!
//! # Responsibility
//! - Filter, search, sort and paginate the paper collection.
//!
//! # Invariants
//! - Query execution is pure; the caller supplies the paper working set.
//! - Pagination parameters are validated before any work is done.

pub mod engine;
