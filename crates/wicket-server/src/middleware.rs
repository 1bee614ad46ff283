use std::net::SocketAddr;
use std::sync::Arc;

use axum::extract::{ConnectInfo, State};
use axum::response::IntoResponse;
use axum::{
    body::Body,
    http::{HeaderName, HeaderValue, Request},
    middleware::Next,
    response::Response,
};
use uuid::Uuid;

use crate::error::GatewayError;
use wicket_accesslog::AccessLogStage;
use wicket_auth::{AuthOutcome, IdentityGate};

// =============================================================================
// Authentication Middleware
// =============================================================================

/// State required by the authentication middleware.
#[derive(Clone)]
pub struct AuthState {
    pub gate: Arc<IdentityGate>,
    pub enabled: bool,
    pub protected_prefixes: Arc<Vec<String>>,
}

/// Authentication middleware guarding the configured protected prefixes.
///
/// For protected paths it asks the [`IdentityGate`] for a decision:
/// `Rejected` terminates the pipeline with a bodyless 401 (the upstream
/// target is never invoked), `Authenticated` passes the request through
/// unchanged; the gate rewrites no headers and injects no identity claims.
pub async fn authentication(
    State(state): State<AuthState>,
    req: Request<Body>,
    next: Next,
) -> Response {
    if !state.enabled || !requires_authentication(&state.protected_prefixes, req.uri().path()) {
        return next.run(req).await;
    }

    match state.gate.check(req.headers()).await {
        AuthOutcome::Authenticated => next.run(req).await,
        AuthOutcome::Rejected => {
            tracing::debug!(path = %req.uri().path(), "request rejected by authentication gate");
            GatewayError::Unauthorized.into_response()
        }
    }
}

fn requires_authentication(prefixes: &[String], path: &str) -> bool {
    prefixes.iter().any(|prefix| path.starts_with(prefix))
}

// =============================================================================
// Access Log Middleware
// =============================================================================

/// State required by the access-log middleware.
#[derive(Clone)]
pub struct AccessLogState {
    pub stage: Arc<AccessLogStage>,
}

/// Enqueue one access-log record for every inbound request.
///
/// Runs before (and independently of) authentication, so rejected requests
/// are logged too. The enqueue is fire-and-forget; nothing on this path
/// waits on the storage sink.
pub async fn access_log(
    State(state): State<AccessLogState>,
    req: Request<Body>,
    next: Next,
) -> Response {
    state.stage.record(client_ip(&req), req.uri().path());
    next.run(req).await
}

/// Best-effort client address: forwarding headers first, then the peer
/// address of the connection.
fn client_ip(req: &Request<Body>) -> String {
    let headers = req.headers();

    if let Some(forwarded) = headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.split(',').next())
        .map(str::trim)
        .filter(|s| !s.is_empty())
    {
        return forwarded.to_string();
    }

    if let Some(real_ip) = headers
        .get("x-real-ip")
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|s| !s.is_empty())
    {
        return real_ip.to_string();
    }

    req.extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|info| info.0.ip().to_string())
        .unwrap_or_else(|| "unknown".to_string())
}

// =============================================================================
// Other Middleware
// =============================================================================

// Middleware that ensures each request has an X-Request-Id and mirrors it on the response
pub async fn request_id(mut req: Request<Body>, next: Next) -> Response {
    let header_name = HeaderName::from_static("x-request-id");

    // If the incoming request already has a request-id, preserve it; otherwise generate one
    let req_id_value = req
        .headers()
        .get(&header_name)
        .cloned()
        .unwrap_or_else(|| HeaderValue::from_str(&Uuid::new_v4().to_string()).unwrap());

    // Add to request extensions for downstream usage (e.g., logging)
    req.extensions_mut().insert(req_id_value.clone());

    let mut res = next.run(req).await;

    // Add/propagate the request id header to response
    res.headers_mut().insert(header_name, req_id_value);

    res
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderMap;

    fn request_with_headers(headers: HeaderMap) -> Request<Body> {
        let mut req = Request::builder().uri("/movies").body(Body::empty()).unwrap();
        *req.headers_mut() = headers;
        req
    }

    #[test]
    fn prefix_matching_guards_only_configured_paths() {
        let prefixes = vec!["/movies".to_string(), "/billing".to_string()];
        assert!(requires_authentication(&prefixes, "/movies/search"));
        assert!(requires_authentication(&prefixes, "/billing"));
        assert!(!requires_authentication(&prefixes, "/healthz"));
        assert!(!requires_authentication(&prefixes, "/idm/login"));
    }

    #[test]
    fn client_ip_prefers_forwarded_header() {
        let mut headers = HeaderMap::new();
        headers.insert(
            "x-forwarded-for",
            HeaderValue::from_static("203.0.113.9, 10.0.0.1"),
        );
        headers.insert("x-real-ip", HeaderValue::from_static("10.0.0.2"));
        assert_eq!(client_ip(&request_with_headers(headers)), "203.0.113.9");
    }

    #[test]
    fn client_ip_falls_back_to_real_ip_then_unknown() {
        let mut headers = HeaderMap::new();
        headers.insert("x-real-ip", HeaderValue::from_static("10.0.0.2"));
        assert_eq!(client_ip(&request_with_headers(headers)), "10.0.0.2");

        assert_eq!(client_ip(&request_with_headers(HeaderMap::new())), "unknown");
    }

    #[test]
    fn empty_forwarding_headers_fall_through_to_the_peer() {
        let mut headers = HeaderMap::new();
        headers.insert("x-forwarded-for", HeaderValue::from_static(""));
        headers.insert("x-real-ip", HeaderValue::from_static(" "));
        assert_eq!(client_ip(&request_with_headers(headers)), "unknown");
    }
}
