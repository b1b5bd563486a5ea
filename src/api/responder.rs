//! Redirect response construction with identity cookies.

use std::sync::Arc;

use axum::{
    http::{HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
};
use chrono::{DateTime, Utc};
use cookie::{Cookie, SameSite};

use crate::application::services::IdentityService;
use crate::domain::entities::{IdentityToken, ResolvedIdentity};
use crate::error::AppError;

/// Builds the single exit point of a successful redirect.
///
/// Identity cookies are `HttpOnly`, `SameSite=Lax`, `Path=/`, carry a
/// `Max-Age` equal to the token's remaining lifetime and are `Secure` when
/// `secure_cookies` is set.
pub struct RedirectResponder {
    identity_service: Arc<IdentityService>,
    secure_cookies: bool,
}

impl RedirectResponder {
    pub fn new(identity_service: Arc<IdentityService>, secure_cookies: bool) -> Self {
        Self {
            identity_service,
            secure_cookies,
        }
    }

    /// Returns `307 Temporary Redirect` to `destination` with any identity
    /// cookies that need to be written.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] if the destination cannot be used as a
    /// `Location` header value.
    pub fn redirect(
        &self,
        destination: &str,
        identity: &ResolvedIdentity,
        now: DateTime<Utc>,
    ) -> Result<Response, AppError> {
        let location = HeaderValue::from_str(destination)
            .map_err(|_| AppError::internal("Destination is not a valid Location header"))?;

        let mut response = (StatusCode::TEMPORARY_REDIRECT, [(header::LOCATION, location)])
            .into_response();

        for cookie in self.identity_cookies(identity, now) {
            let value = HeaderValue::from_str(&cookie.to_string())
                .map_err(|_| AppError::internal("Identity cookie is not a valid header"))?;
            response.headers_mut().append(header::SET_COOKIE, value);
        }

        Ok(response)
    }

    /// Cookies to set: the visitor cookie when new or close to expiry, the
    /// session cookie when new.
    pub fn identity_cookies(
        &self,
        identity: &ResolvedIdentity,
        now: DateTime<Utc>,
    ) -> Vec<Cookie<'static>> {
        let visitor = self.identity_service.visitor_to_set(identity, now);
        let session = self.identity_service.session_to_set(identity);

        visitor
            .into_iter()
            .chain(session)
            .map(|token| self.build_cookie(&token, now))
            .collect()
    }

    fn build_cookie(&self, token: &IdentityToken, now: DateTime<Utc>) -> Cookie<'static> {
        let max_age = cookie::time::Duration::seconds(token.remaining(now).num_seconds());

        Cookie::build((
            token.kind.cookie_name(),
            self.identity_service.encode(token),
        ))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(self.secure_cookies)
        .max_age(max_age)
        .build()
    }
}
