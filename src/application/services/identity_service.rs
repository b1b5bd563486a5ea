//! Visitor and session identity resolution from request cookies.

use chrono::{DateTime, Duration, Utc};
use cookie::Cookie;
use hmac::{Hmac, Mac};
use sha2::Sha256;

use crate::domain::entities::{IdentityKind, IdentityToken, ResolvedIdentity};
use crate::utils::token_generator::{generate_token, is_valid_token};

type HmacSha256 = Hmac<Sha256>;

/// Default window before visitor expiry in which the cookie is re-issued.
pub const VISITOR_REFRESH_WINDOW_DAYS: i64 = 30;

/// Service resolving, encoding and verifying identity cookies.
///
/// # Cookie Format
///
/// ```text
/// <token>.<expires_unix>.<hex hmac-sha256("<kind>:<token>.<expires_unix>")>
/// ```
///
/// The expiry travels inside the signed value because browsers do not send
/// cookie attributes back. A value that does not parse or whose MAC does not
/// verify is treated as absent.
pub struct IdentityService {
    signing_secret: String,
    visitor_refresh_window: Duration,
}

impl IdentityService {
    /// Creates a new identity service.
    ///
    /// # Arguments
    ///
    /// - `signing_secret` - HMAC key for cookie values; rotating it resets all identities
    pub fn new(signing_secret: String) -> Self {
        Self {
            signing_secret,
            visitor_refresh_window: Duration::days(VISITOR_REFRESH_WINDOW_DAYS),
        }
    }

    /// Overrides the visitor refresh window.
    pub fn with_refresh_window(mut self, window: Duration) -> Self {
        self.visitor_refresh_window = window;
        self
    }

    /// Resolves identity from the raw `Cookie` header.
    ///
    /// Never fails. Rules:
    ///
    /// - Visitor cookie absent or malformed: mint a new visitor
    /// - Visitor cookie present but past its expiry: keep the value (a
    ///   visitor id is never reissued for the same browser); the responder
    ///   refreshes it
    /// - Session cookie absent, malformed or expired: mint a new session
    pub fn resolve(&self, cookie_header: Option<&str>, now: DateTime<Utc>) -> ResolvedIdentity {
        let mut visitor = None;
        let mut session = None;

        if let Some(header) = cookie_header {
            for cookie in Cookie::split_parse(header).flatten() {
                if cookie.name() == IdentityKind::Visitor.cookie_name() && visitor.is_none() {
                    visitor = self.decode(IdentityKind::Visitor, cookie.value());
                } else if cookie.name() == IdentityKind::Session.cookie_name() && session.is_none()
                {
                    session = self
                        .decode(IdentityKind::Session, cookie.value())
                        .filter(|token| !token.is_expired(now));
                }
            }
        }

        let is_new_visitor = visitor.is_none();
        let is_new_session = session.is_none();

        ResolvedIdentity {
            visitor: visitor.unwrap_or_else(|| Self::mint(IdentityKind::Visitor, now)),
            session: session.unwrap_or_else(|| Self::mint(IdentityKind::Session, now)),
            is_new_visitor,
            is_new_session,
        }
    }

    /// Returns the visitor token to write back, if any.
    ///
    /// New visitors get their freshly minted token. Existing visitors get a
    /// refreshed copy (same value, full lifetime) when the current one
    /// expires within the refresh window.
    pub fn visitor_to_set(
        &self,
        identity: &ResolvedIdentity,
        now: DateTime<Utc>,
    ) -> Option<IdentityToken> {
        if identity.is_new_visitor {
            Some(identity.visitor.clone())
        } else if identity
            .visitor
            .expires_within(self.visitor_refresh_window, now)
        {
            Some(identity.visitor.refreshed(now))
        } else {
            None
        }
    }

    /// Returns the session token to write back, if any.
    pub fn session_to_set(&self, identity: &ResolvedIdentity) -> Option<IdentityToken> {
        identity.is_new_session.then(|| identity.session.clone())
    }

    /// Serializes a token into its signed cookie value.
    pub fn encode(&self, token: &IdentityToken) -> String {
        let payload = format!("{}.{}", token.value, token.expires_at.timestamp());
        let signature = hex::encode(self.sign(token.kind, &payload));
        format!("{payload}.{signature}")
    }

    /// Parses and verifies a signed cookie value.
    ///
    /// Returns `None` for any malformed or tampered value. Expiry is not
    /// checked here.
    pub fn decode(&self, kind: IdentityKind, raw: &str) -> Option<IdentityToken> {
        let (payload, signature) = raw.rsplit_once('.')?;
        let (value, expires) = payload.split_once('.')?;

        if !is_valid_token(value) {
            return None;
        }

        let signature = hex::decode(signature).ok()?;
        let mut mac = self.mac(kind);
        mac.update(payload.as_bytes());
        mac.verify_slice(&signature).ok()?;

        let expires_at = DateTime::from_timestamp(expires.parse().ok()?, 0)?;

        Some(IdentityToken {
            kind,
            value: value.to_string(),
            expires_at,
        })
    }

    fn mint(kind: IdentityKind, now: DateTime<Utc>) -> IdentityToken {
        IdentityToken::issue(kind, generate_token(), now)
    }

    fn sign(&self, kind: IdentityKind, payload: &str) -> Vec<u8> {
        let mut mac = self.mac(kind);
        mac.update(payload.as_bytes());
        mac.finalize().into_bytes().to_vec()
    }

    fn mac(&self, kind: IdentityKind) -> HmacSha256 {
        let mut mac = HmacSha256::new_from_slice(self.signing_secret.as_bytes())
            .expect("HMAC accepts any key length");
        mac.update(kind.as_str().as_bytes());
        mac.update(b":");
        mac
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service() -> IdentityService {
        IdentityService::new("test-identity-secret".to_string())
    }

    fn cookie_pair(service: &IdentityService, token: &IdentityToken) -> String {
        format!("{}={}", token.kind.cookie_name(), service.encode(token))
    }

    #[test]
    fn test_first_visit_mints_both() {
        let now = Utc::now();
        let identity = service().resolve(None, now);

        assert!(identity.is_new_visitor);
        assert!(identity.is_new_session);
        assert_ne!(identity.visitor.value, identity.session.value);
        assert_eq!(identity.visitor.expires_at, now + Duration::days(365));
        assert_eq!(identity.session.expires_at, now + Duration::hours(24));
    }

    #[test]
    fn test_encode_decode() {
        let service = service();
        let now = Utc::now();
        let token = IdentityToken::issue(IdentityKind::Visitor, generate_token(), now);

        let decoded = service
            .decode(IdentityKind::Visitor, &service.encode(&token))
            .unwrap();

        assert_eq!(decoded.value, token.value);
        assert_eq!(decoded.expires_at.timestamp(), token.expires_at.timestamp());
    }

    #[test]
    fn test_returning_visitor_within_session() {
        let service = service();
        let now = Utc::now();
        let first = service.resolve(None, now);

        let header = format!(
            "{}; {}",
            cookie_pair(&service, &first.visitor),
            cookie_pair(&service, &first.session)
        );
        let later = now + Duration::hours(1);
        let second = service.resolve(Some(&header), later);

        assert!(!second.is_new_visitor);
        assert!(!second.is_new_session);
        assert_eq!(second.visitor.value, first.visitor.value);
        assert_eq!(second.session.value, first.session.value);
    }

    #[test]
    fn test_expired_session_is_reissued() {
        let service = service();
        let now = Utc::now();
        let first = service.resolve(None, now);

        let header = format!(
            "{}; {}",
            cookie_pair(&service, &first.visitor),
            cookie_pair(&service, &first.session)
        );
        let next_day = now + Duration::hours(25);
        let second = service.resolve(Some(&header), next_day);

        assert!(!second.is_new_visitor);
        assert!(second.is_new_session);
        assert_eq!(second.visitor.value, first.visitor.value);
        assert_ne!(second.session.value, first.session.value);
    }

    #[test]
    fn test_tampered_value_is_malformed() {
        let service = service();
        let now = Utc::now();
        let token = IdentityToken::issue(IdentityKind::Visitor, generate_token(), now);
        let encoded = service.encode(&token);

        let forged = encoded.replacen(&token.value, &generate_token(), 1);
        assert!(service.decode(IdentityKind::Visitor, &forged).is_none());

        let extended = encoded.replacen(
            &token.expires_at.timestamp().to_string(),
            &(token.expires_at.timestamp() + 1000).to_string(),
            1,
        );
        assert!(service.decode(IdentityKind::Visitor, &extended).is_none());
    }

    #[test]
    fn test_session_value_rejected_as_visitor() {
        let service = service();
        let now = Utc::now();
        let session = IdentityToken::issue(IdentityKind::Session, generate_token(), now);

        assert!(
            service
                .decode(IdentityKind::Visitor, &service.encode(&session))
                .is_none()
        );
    }

    #[test]
    fn test_malformed_cookies_mint_new_identity() {
        let service = service();
        let now = Utc::now();

        for header in [
            "ct_vid=; ct_sid=",
            "ct_vid=garbage; ct_sid=also.garbage",
            "ct_vid=a.b.c.d; ct_sid=...",
            "ct_vid=AAAAAAAAAAAAAAAAAAAAAA.notanumber.00",
        ] {
            let identity = service.resolve(Some(header), now);
            assert!(identity.is_new_visitor, "header: {header}");
            assert!(identity.is_new_session, "header: {header}");
        }
    }

    #[test]
    fn test_other_cookies_are_ignored() {
        let service = service();
        let now = Utc::now();
        let first = service.resolve(None, now);

        let header = format!(
            "theme=dark; {}; _ga=GA1.2.3",
            cookie_pair(&service, &first.visitor)
        );
        let second = service.resolve(Some(&header), now);

        assert!(!second.is_new_visitor);
        assert!(second.is_new_session);
    }

    #[test]
    fn test_different_secret_rejects_cookie() {
        let now = Utc::now();
        let token = IdentityToken::issue(IdentityKind::Visitor, generate_token(), now);
        let encoded = service().encode(&token);

        let other = IdentityService::new("rotated-secret".to_string());
        assert!(other.decode(IdentityKind::Visitor, &encoded).is_none());
    }

    #[test]
    fn test_visitor_to_set() {
        let service = service();
        let now = Utc::now();

        let new_visitor = service.resolve(None, now);
        assert_eq!(
            service.visitor_to_set(&new_visitor, now),
            Some(new_visitor.visitor.clone())
        );

        let fresh = ResolvedIdentity {
            is_new_visitor: false,
            ..new_visitor.clone()
        };
        assert!(service.visitor_to_set(&fresh, now).is_none());

        let ageing = ResolvedIdentity {
            visitor: IdentityToken {
                kind: IdentityKind::Visitor,
                value: new_visitor.visitor.value.clone(),
                expires_at: now + Duration::days(3),
            },
            is_new_visitor: false,
            ..new_visitor
        };
        let refreshed = service.visitor_to_set(&ageing, now).unwrap();
        assert_eq!(refreshed.value, ageing.visitor.value);
        assert_eq!(refreshed.expires_at, now + Duration::days(365));
    }

    #[test]
    fn test_expired_visitor_keeps_value() {
        let service = service();
        let now = Utc::now();
        let stale = IdentityToken {
            kind: IdentityKind::Visitor,
            value: generate_token(),
            expires_at: now - Duration::days(1),
        };

        let header = cookie_pair(&service, &stale);
        let identity = service.resolve(Some(&header), now);

        assert!(!identity.is_new_visitor);
        assert_eq!(identity.visitor.value, stale.value);
        let to_set = service.visitor_to_set(&identity, now).unwrap();
        assert_eq!(to_set.value, stale.value);
        assert!(!to_set.is_expired(now));
    }

    #[test]
    fn test_session_to_set() {
        let service = service();
        let now = Utc::now();
        let identity = service.resolve(None, now);

        assert!(service.session_to_set(&identity).is_some());

        let existing = ResolvedIdentity {
            is_new_session: false,
            ..identity
        };
        assert!(service.session_to_set(&existing).is_none());
    }
}
