//! Shared application state injected into handlers.

use std::sync::Arc;

use crate::api::responder::RedirectResponder;
use crate::application::services::{
    ClickService, EnrichmentTrigger, IdentityService, LinkService,
};
use crate::domain::repositories::LinkRepository;

/// Explicitly constructed collaborators for the redirect flow.
///
/// Everything is behind `Arc`, so cloning per request is cheap.
#[derive(Clone)]
pub struct AppState {
    pub identity_service: Arc<IdentityService>,
    pub link_service: Arc<LinkService>,
    pub click_service: Arc<ClickService>,
    pub enrichment_trigger: Arc<dyn EnrichmentTrigger>,
    pub responder: Arc<RedirectResponder>,
    /// Used by the health check.
    pub link_repository: Arc<dyn LinkRepository>,
    pub behind_proxy: bool,
}
