//! Core domain entities.
//!
//! - [`ShortLink`] - a persisted short code → URL mapping with click count and validity
//! - [`NewShortLink`] - input for inserting a link
//! - [`CachedLink`] - the validity tuple stored in the cache
//! - [`LinkPage`] - one page of the admin listing

pub mod link;

pub use link::{CachedLink, LinkPage, NewShortLink, ShortLink};
