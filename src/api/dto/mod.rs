//! Data Transfer Objects for API requests and responses.
//!
//! JSON bodies use camelCase field names. Request DTOs are checked with
//! `validator` before reaching the services.

pub mod admin;
pub mod health;
pub mod link;
pub mod resolve;
pub mod shorten;
