//! Visitor and session identity tokens carried in cookies.

use chrono::{DateTime, Duration, Utc};

/// Lifetime of the durable visitor identifier.
pub const VISITOR_LIFETIME_DAYS: i64 = 365;

/// Lifetime of the ephemeral session identifier.
pub const SESSION_LIFETIME_HOURS: i64 = 24;

/// Which identity a token represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IdentityKind {
    Visitor,
    Session,
}

impl IdentityKind {
    /// Name of the cookie holding this identity.
    pub fn cookie_name(self) -> &'static str {
        match self {
            IdentityKind::Visitor => "ct_vid",
            IdentityKind::Session => "ct_sid",
        }
    }

    pub fn lifetime(self) -> Duration {
        match self {
            IdentityKind::Visitor => Duration::days(VISITOR_LIFETIME_DAYS),
            IdentityKind::Session => Duration::hours(SESSION_LIFETIME_HOURS),
        }
    }

    /// Tag mixed into the cookie signature so a session value cannot be
    /// replayed as a visitor value and vice versa.
    pub fn as_str(self) -> &'static str {
        match self {
            IdentityKind::Visitor => "visitor",
            IdentityKind::Session => "session",
        }
    }
}

/// An opaque identity token with its expiry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdentityToken {
    pub kind: IdentityKind,
    pub value: String,
    pub expires_at: DateTime<Utc>,
}

impl IdentityToken {
    /// Creates a token whose expiry is one full lifetime after `now`.
    pub fn issue(kind: IdentityKind, value: String, now: DateTime<Utc>) -> Self {
        Self {
            kind,
            value,
            expires_at: now + kind.lifetime(),
        }
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }

    /// Returns true if the token expires within `window` of `now`.
    pub fn expires_within(&self, window: Duration, now: DateTime<Utc>) -> bool {
        self.expires_at - now <= window
    }

    /// Same value, expiry pushed out to a full lifetime from `now`.
    pub fn refreshed(&self, now: DateTime<Utc>) -> Self {
        Self::issue(self.kind, self.value.clone(), now)
    }

    /// Remaining lifetime, clamped at zero.
    pub fn remaining(&self, now: DateTime<Utc>) -> Duration {
        (self.expires_at - now).max(Duration::zero())
    }
}

/// Identity resolved from an incoming request.
///
/// The `is_new_*` flags tell the redirect responder which cookies must be
/// written back.
#[derive(Debug, Clone)]
pub struct ResolvedIdentity {
    pub visitor: IdentityToken,
    pub session: IdentityToken,
    pub is_new_visitor: bool,
    pub is_new_session: bool,
}
