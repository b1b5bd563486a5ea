//! Link entity representing a short-link to destination mapping.

use chrono::{DateTime, Utc};

/// UTM campaign parameters attached to a link by its owner.
///
/// Stored for attribution reporting. They are not appended to the
/// destination URL on redirect.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UtmParams {
    pub source: Option<String>,
    pub medium: Option<String>,
    pub campaign: Option<String>,
    pub term: Option<String>,
    pub content: Option<String>,
}

impl UtmParams {
    /// Returns true if no UTM parameter is set.
    pub fn is_empty(&self) -> bool {
        self.source.is_none()
            && self.medium.is_none()
            && self.campaign.is_none()
            && self.term.is_none()
            && self.content.is_none()
    }
}

/// A short link with its owning campaign and denormalized click counter.
///
/// `click_count` and `last_clicked_at` are a best-effort cache of the
/// `link_clicks` table; the click rows are authoritative.
#[derive(Debug, Clone)]
pub struct Link {
    pub id: i64,
    pub code: String,
    pub destination_url: String,
    pub owner_id: Option<String>,
    pub campaign_id: Option<String>,
    pub utm: UtmParams,
    pub click_count: i64,
    pub last_clicked_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl Link {
    /// Creates a link without owner, campaign or UTM metadata and zero clicks.
    pub fn new(id: i64, code: String, destination_url: String, created_at: DateTime<Utc>) -> Self {
        Self {
            id,
            code,
            destination_url,
            owner_id: None,
            campaign_id: None,
            utm: UtmParams::default(),
            click_count: 0,
            last_clicked_at: None,
            created_at,
        }
    }

    /// Sets the owning user and campaign.
    pub fn with_owner(mut self, owner_id: Option<String>, campaign_id: Option<String>) -> Self {
        self.owner_id = owner_id;
        self.campaign_id = campaign_id;
        self
    }

    /// Sets the UTM parameters.
    pub fn with_utm(mut self, utm: UtmParams) -> Self {
        self.utm = utm;
        self
    }
}
