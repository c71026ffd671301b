//! `ClientMeta` extractor: the caller's address and user agent.

use std::convert::Infallible;
use std::net::{IpAddr, SocketAddr};

use axum::extract::{ConnectInfo, FromRequestParts};
use axum::http::HeaderMap;
use axum::http::request::Parts;
use axum_extra::headers::{HeaderMapExt, UserAgent};

use folio_auth::ClientInfo;

use crate::state::AppState;

/// Request metadata recorded on sessions and used as the rate-limit key.
#[derive(Debug, Clone)]
pub struct ClientMeta(pub ClientInfo);

fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
}

/// Client address as reported by a trusted proxy.
///
/// `X-Forwarded-For` is walked from the right, skipping hops that are
/// themselves trusted proxies; the first other hop is the client. Hops that
/// do not parse as an address end the walk, since anything left of them is
/// client-controlled. `X-Real-IP` is the fallback.
fn forwarded_ip(headers: &HeaderMap, trusted: &[IpAddr]) -> Option<IpAddr> {
    if let Some(chain) = header_str(headers, "x-forwarded-for") {
        let mut client = None;
        for hop in chain.rsplit(',').map(str::trim) {
            let Ok(ip) = hop.parse::<IpAddr>() else {
                break;
            };
            client = Some(ip);
            if !trusted.contains(&ip) {
                break;
            }
        }
        if client.is_some() {
            return client;
        }
    }

    header_str(headers, "x-real-ip").and_then(|v| v.parse().ok())
}

/// The address used for this request.
///
/// Forwarding headers are only read when the socket peer is a trusted
/// proxy; otherwise the peer itself is the client.
fn client_ip(headers: &HeaderMap, peer: Option<IpAddr>, trusted: &[IpAddr]) -> Option<IpAddr> {
    match peer {
        Some(peer) if trusted.contains(&peer) => forwarded_ip(headers, trusted).or(Some(peer)),
        Some(peer) => Some(peer),
        None => None,
    }
}

impl FromRequestParts<AppState> for ClientMeta {
    type Rejection = Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let peer = parts
            .extensions
            .get::<ConnectInfo<SocketAddr>>()
            .map(|ConnectInfo(addr)| addr.ip());

        let ip_address = client_ip(&parts.headers, peer, &state.config.server.trusted_proxies)
            .map(|ip| ip.to_string())
            .unwrap_or_else(|| "unknown".to_string());

        let user_agent = parts
            .headers
            .typed_get::<UserAgent>()
            .map(|ua| ua.as_str().to_string())
            .unwrap_or_else(|| "unknown".to_string());

        Ok(Self(ClientInfo {
            ip_address,
            user_agent,
        }))
    }
}
