//! Domain layer containing business entities and background workers.
//!
//! # Architecture
//!
//! - [`entities`] - Core business data structures
//! - [`repositories`] - Data access trait definitions
//! - [`clock`] - Injectable time source for expiry checks
//! - [`click_event`] - Click tracking event model
//! - [`click_worker`] - Asynchronous click counter worker
//! - [`expiry_sweeper`] - Periodic purge of expired links
//!
//! # Click Processing Flow
//!
//! 1. [`crate::application::services::RedirectService`] resolves a short code
//! 2. A [`click_event::ClickEvent`] is pushed onto a bounded channel (non-blocking)
//! 3. [`click_worker::run_click_worker`] applies an atomic increment with retry
//! 4. The counter is persisted via [`repositories::LinkRepository::increment_clicks`]

pub mod click_event;
pub mod click_worker;
pub mod clock;
pub mod entities;
pub mod expiry_sweeper;
pub mod repositories;
