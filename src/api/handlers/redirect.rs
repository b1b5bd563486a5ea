//! Handler for short link redirect with click attribution.

use axum::{
    extract::{ConnectInfo, Path, State},
    http::{HeaderMap, header},
    response::Response,
};
use chrono::Utc;
use std::net::SocketAddr;
use tracing::warn;

use crate::domain::enrichment_job::EnrichmentJob;
use crate::domain::entities::RequestFingerprint;
use crate::error::AppError;
use crate::state::AppState;
use crate::utils::client_ip::client_ip;

/// Redirects a short code to its destination and records the click.
///
/// # Endpoint
///
/// `GET /{code}`
///
/// # Request Flow
///
/// 1. Resolve visitor/session identity from cookies (no side effects)
/// 2. Look up the link; unknown codes stop here with 404
/// 3. Record the click and bump the link counter
/// 4. Enqueue enrichment for the recorded click (never awaited)
/// 5. Return 307 Temporary Redirect with identity cookies
///
/// # Click Tracking
///
/// Tracking is best-effort. A failed click insert is logged, enrichment is
/// skipped, and the redirect is still issued. A full enrichment queue drops
/// the job.
///
/// # Errors
///
/// Returns 404 `{"error": "Link not found"}` if the short code doesn't exist.
/// Returns 500 if the link lookup itself fails.
pub async fn redirect_handler(
    Path(code): Path<String>,
    State(state): State<AppState>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    headers: HeaderMap,
) -> Result<Response, AppError> {
    let now = Utc::now();

    let identity = state
        .identity_service
        .resolve(cookie_header(&headers).as_deref(), now);

    let link = state.link_service.resolve(&code).await?;

    let fingerprint = fingerprint(&headers, addr, state.behind_proxy);

    match state
        .click_service
        .record(&link, &identity, fingerprint.clone(), now)
        .await
    {
        Ok(click) => {
            if let Err(e) = state
                .enrichment_trigger
                .dispatch(EnrichmentJob::new(click.id, fingerprint))
            {
                warn!(click_id = click.id, "{}", e);
            }
        }
        Err(e) => {
            warn!(code = %link.code, "Redirecting without tracking: {}", e);
        }
    }

    state
        .responder
        .redirect(&link.destination_url, &identity, now)
}

/// Joins every `Cookie` header; HTTP/2 clients may split cookies across
/// several header fields.
fn cookie_header(headers: &HeaderMap) -> Option<String> {
    let values: Vec<&str> = headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .collect();

    if values.is_empty() {
        None
    } else {
        Some(values.join("; "))
    }
}

fn fingerprint(headers: &HeaderMap, addr: SocketAddr, behind_proxy: bool) -> RequestFingerprint {
    let header_str = |name: header::HeaderName| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(|s| s.to_string())
    };

    RequestFingerprint {
        ip: Some(client_ip(headers, addr.ip(), behind_proxy).to_string()),
        user_agent: header_str(header::USER_AGENT),
        referer: header_str(header::REFERER),
        accept_language: header_str(header::ACCEPT_LANGUAGE),
    }
}
