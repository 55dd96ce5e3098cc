//! Repository trait definitions for the domain layer.
//!
//! Implementations live in `crate::infrastructure::persistence`; mock
//! implementations are generated via `mockall` for unit tests.

pub mod link_repository;

pub use link_repository::{LinkFilter, LinkRepository};

#[cfg(test)]
pub use link_repository::MockLinkRepository;
