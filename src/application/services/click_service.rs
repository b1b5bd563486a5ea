//! Click recording service.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{debug, error};

use crate::domain::entities::{Click, Link, NewClick, RequestFingerprint, ResolvedIdentity};
use crate::domain::repositories::{ClickRepository, LinkRepository};
use crate::error::TrackingError;

/// Service persisting click events and maintaining the link click counter.
///
/// The click row is the source of truth; the counter on the link is a
/// best-effort cache.
pub struct ClickService {
    clicks: Arc<dyn ClickRepository>,
    links: Arc<dyn LinkRepository>,
}

impl ClickService {
    /// Creates a new click service.
    pub fn new(clicks: Arc<dyn ClickRepository>, links: Arc<dyn LinkRepository>) -> Self {
        Self { clicks, links }
    }

    /// Records one click for `link`.
    ///
    /// The click insert completes before the counter increment is attempted.
    /// A failed increment is logged and does not undo the recorded click.
    ///
    /// # Errors
    ///
    /// Returns [`TrackingError::Persistence`] if the click row could not be
    /// written. Callers must still redirect; tracking is best-effort.
    pub async fn record(
        &self,
        link: &Link,
        identity: &ResolvedIdentity,
        fingerprint: RequestFingerprint,
        clicked_at: DateTime<Utc>,
    ) -> Result<Click, TrackingError> {
        let new_click = NewClick {
            link_id: link.id,
            visitor_id: identity.visitor.value.clone(),
            session_id: identity.session.value.clone(),
            clicked_at,
            fingerprint,
        };

        let click = match self.clicks.record_click(new_click).await {
            Ok(click) => click,
            Err(e) => {
                metrics::counter!("clicktrail_clicks_failed_total").increment(1);
                error!(code = %link.code, "Failed to record click: {}", e);
                return Err(TrackingError::Persistence(e));
            }
        };

        metrics::counter!("clicktrail_clicks_recorded_total").increment(1);
        debug!(code = %link.code, click_id = click.id, "Click recorded");

        if let Err(e) = self.links.increment_click_count(link.id, clicked_at).await {
            error!(
                code = %link.code,
                click_id = click.id,
                "Failed to increment click counter: {}",
                e
            );
        }

        Ok(click)
    }
}
