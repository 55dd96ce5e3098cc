//! PostgreSQL repository implementations.
//!
//! Queries are built with SQLx runtime binding (`query_as` + `FromRow`), so
//! the crate builds without a live database.

pub mod pg_link_repository;

pub use pg_link_repository::PgLinkRepository;
