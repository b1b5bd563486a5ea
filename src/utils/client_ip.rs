//! Client IP extraction from HTTP request headers.

use axum::http::HeaderMap;
use std::net::IpAddr;

/// Resolves the client IP for click attribution.
///
/// When `behind_proxy` is true the left-most valid address in
/// `X-Forwarded-For` wins, then `X-Real-IP`. Otherwise, and whenever those
/// headers are missing or unparsable, the socket peer address is used.
/// Forwarding headers are ignored unless the service runs behind a trusted
/// reverse proxy, since clients can set them freely.
pub fn client_ip(headers: &HeaderMap, peer: IpAddr, behind_proxy: bool) -> IpAddr {
    if !behind_proxy {
        return peer;
    }

    forwarded_for(headers)
        .or_else(|| real_ip(headers))
        .unwrap_or(peer)
}

fn forwarded_for(headers: &HeaderMap) -> Option<IpAddr> {
    headers
        .get("x-forwarded-for")?
        .to_str()
        .ok()?
        .split(',')
        .find_map(|s| s.trim().parse::<IpAddr>().ok())
}

fn real_ip(headers: &HeaderMap) -> Option<IpAddr> {
    headers
        .get("x-real-ip")?
        .to_str()
        .ok()?
        .trim()
        .parse()
        .ok()
}
