//! Enrichment job model for asynchronous click enrichment.

use crate::domain::entities::{Enrichment, RequestFingerprint};

/// A queued request to enrich one recorded click.
///
/// Created by the redirect handler only after the click row was written,
/// so `click_id` always refers to an existing event.
///
/// # Usage Flow
///
/// 1. Created in the redirect handler from the recorded click
/// 2. Sent to the enrichment queue (non-blocking)
/// 3. Processed by [`crate::domain::enrichment_worker::run_enrichment_worker`]
/// 4. Written back via [`crate::domain::repositories::ClickRepository::apply_enrichment`]
#[derive(Debug, Clone)]
pub struct EnrichmentJob {
    pub click_id: i64,
    pub fingerprint: RequestFingerprint,
}

impl EnrichmentJob {
    pub fn new(click_id: i64, fingerprint: RequestFingerprint) -> Self {
        Self {
            click_id,
            fingerprint,
        }
    }
}

/// Derives enrichment fields from a request fingerprint.
///
/// Implementations must not fail: unknown data maps to `None` fields.
#[cfg_attr(test, mockall::automock)]
pub trait ClickEnricher: Send + Sync {
    fn enrich(&self, fingerprint: &RequestFingerprint) -> Enrichment;
}
