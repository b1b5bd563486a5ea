//! Application layer services implementing the redirect flow.
//!
//! Services consume repository traits and are wired together in
//! [`crate::state::AppState`].
//!
//! # Available Services
//!
//! - [`services::identity_service::IdentityService`] - Visitor/session cookies
//! - [`services::link_service::LinkService`] - Short code resolution
//! - [`services::click_service::ClickService`] - Click recording and counter
//! - [`services::enrichment_trigger::EnrichmentTrigger`] - Non-blocking enrichment dispatch
//! - [`services::enrichment_service::EnrichmentService`] - Geo and device enrichment

pub mod services;
