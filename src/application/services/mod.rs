//! Business logic services for the application layer.

pub mod click_service;
pub mod enrichment_service;
pub mod enrichment_trigger;
pub mod identity_service;
pub mod link_service;

pub use click_service::ClickService;
pub use enrichment_service::EnrichmentService;
pub use enrichment_trigger::{EnrichmentTrigger, QueuedEnrichmentTrigger};
pub use identity_service::IdentityService;
pub use link_service::LinkService;
