//! Tag taxonomy rendering.
//!
//! # Responsibility
//! - Convert the flat tag adjacency list into a forest of rooted trees.
//!
//! # Invariants
//! - Construction is pure and deterministic for identical input.
//! - Tags with unresolved parents are promoted to root, never dropped.

pub mod forest;
