//! Click entity representing a single redirect event.

use chrono::{DateTime, Utc};

/// Raw request data captured at redirect time.
///
/// All fields are optional to handle missing headers gracefully.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestFingerprint {
    pub ip: Option<String>,
    pub user_agent: Option<String>,
    pub referer: Option<String>,
    pub accept_language: Option<String>,
}

/// Derived data attached to a click after the redirect has been served.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Enrichment {
    pub country_code: Option<String>,
    pub region: Option<String>,
    pub city: Option<String>,
    pub browser: Option<String>,
    pub os: Option<String>,
    pub device_category: Option<String>,
    pub is_bot: bool,
}

/// A click recorded when a short link is accessed.
///
/// Immutable once written, except for `enrichment`, which the background
/// enrichment worker fills in later.
#[derive(Debug, Clone)]
pub struct Click {
    pub id: i64,
    pub link_id: i64,
    pub visitor_id: String,
    pub session_id: String,
    pub clicked_at: DateTime<Utc>,
    pub fingerprint: RequestFingerprint,
    pub enrichment: Option<Enrichment>,
    pub enriched_at: Option<DateTime<Utc>>,
}

/// Input data for recording a new click.
///
/// The `link_id` must reference a link that existed at request time.
#[derive(Debug, Clone)]
pub struct NewClick {
    pub link_id: i64,
    pub visitor_id: String,
    pub session_id: String,
    pub clicked_at: DateTime<Utc>,
    pub fingerprint: RequestFingerprint,
}

impl Click {
    /// Builds the stored representation of a freshly inserted click.
    pub fn from_new(id: i64, new_click: NewClick) -> Self {
        Self {
            id,
            link_id: new_click.link_id,
            visitor_id: new_click.visitor_id,
            session_id: new_click.session_id,
            clicked_at: new_click.clicked_at,
            fingerprint: new_click.fingerprint,
            enrichment: None,
            enriched_at: None,
        }
    }

    pub fn is_enriched(&self) -> bool {
        self.enriched_at.is_some()
    }
}
