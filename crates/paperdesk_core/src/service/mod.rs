//! Catalog use-case services.
//!
//! # Responsibility
//! - Orchestrate repository calls and pure query/taxonomy engines behind a
//!   single stable operation set for the transport collaborator.
//! - Keep transport layers decoupled from storage details.

pub mod catalog_service;
