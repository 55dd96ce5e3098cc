//! Application layer services implementing business logic.
//!
//! Services consume the repository, cache and clock traits and expose a
//! small API to the HTTP handlers and the admin binary.
//!
//! # Available Services
//!
//! - [`services::link_service::LinkService`] - Link creation and administration
//! - [`services::redirect_service::RedirectService`] - Short code resolution and click dispatch
//! - [`services::auth_service::AuthService`] - Admin API key authentication

pub mod services;
