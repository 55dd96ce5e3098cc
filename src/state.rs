//! Shared state injected into every handler.

use std::sync::Arc;
use tokio::sync::mpsc;

use crate::application::services::{AuthService, LinkService, RedirectService};
use crate::domain::click_event::ClickEvent;
use crate::infrastructure::cache::CacheService;

/// Application state cloned into each request.
///
/// All fields are cheap to clone (`Arc` or channel handles).
#[derive(Clone)]
pub struct AppState {
    pub link_service: Arc<LinkService>,
    pub redirect_service: Arc<RedirectService>,
    pub auth_service: Arc<AuthService>,
    pub cache: Arc<dyn CacheService>,
    /// Kept for health reporting; the redirect service holds its own sender.
    pub click_sender: mpsc::Sender<ClickEvent>,
}
