//! Domain model for the paper catalog.
//!
//! # Responsibility
//! - Define the canonical paper record and the flat tag row.
//! - Keep validation rules next to the data they protect.
//!
//! # Invariants
//! - Every paper is identified by a stable, immutable string id.
//! - Catalogued papers always carry at least one category code.

pub mod paper;
pub mod tag;
