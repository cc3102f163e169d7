//! Caller identity extractor.
//!
//! Sessions are keyed by agent and caller. The caller is taken from:
//! - `X-Caller-Id: <id>` header, when present and non-blank
//! - otherwise the peer IP address from `ConnectInfo`

use std::convert::Infallible;
use std::net::SocketAddr;

use axum::extract::{ConnectInfo, FromRequestParts};
use axum::http::request::Parts;

pub const CALLER_HEADER: &str = "x-caller-id";

/// Identity used for the caller half of a session key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Caller(pub String);

impl<S: Send + Sync> FromRequestParts<S> for Caller {
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Caller(resolve_caller(parts)))
    }
}

fn resolve_caller(parts: &Parts) -> String {
    if let Some(value) = parts.headers.get(CALLER_HEADER)
        && let Ok(id) = value.to_str()
        && !id.trim().is_empty()
    {
        return id.trim().to_string();
    }

    parts
        .extensions
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip().to_string())
        .unwrap_or_else(|| "unknown".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request;

    fn parts(request: Request<()>) -> Parts {
        request.into_parts().0
    }

    #[test]
    fn test_header_wins_over_peer_address() {
        let mut req = Request::builder()
            .header(CALLER_HEADER, " team-ux ")
            .body(())
            .unwrap();
        req.extensions_mut()
            .insert(ConnectInfo(SocketAddr::from(([10, 0, 0, 7], 5555))));
        assert_eq!(resolve_caller(&parts(req)), "team-ux");
    }

    #[test]
    fn test_falls_back_to_peer_ip() {
        let mut req = Request::builder().body(()).unwrap();
        req.extensions_mut()
            .insert(ConnectInfo(SocketAddr::from(([10, 0, 0, 7], 5555))));
        assert_eq!(resolve_caller(&parts(req)), "10.0.0.7");
    }

    #[test]
    fn test_blank_header_is_ignored() {
        let req = Request::builder()
            .header(CALLER_HEADER, "   ")
            .body(())
            .unwrap();
        assert_eq!(resolve_caller(&parts(req)), "unknown");
    }
}
