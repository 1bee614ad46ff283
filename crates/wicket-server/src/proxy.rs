//! Forwarding handler: hands post-stage requests to the upstream target.

use std::time::Duration;

use axum::{
    body::Body,
    extract::State,
    http::{HeaderMap, Request},
    response::Response,
};
use tracing::{debug, warn};

use crate::error::GatewayError;

const MAX_FORWARD_BODY_BYTES: usize = 10_000_000;

/// State required by the forwarding handler.
#[derive(Clone)]
pub struct ProxyState {
    pub client: reqwest::Client,
    /// Upstream base URL without a trailing slash.
    pub base_url: String,
    pub timeout: Duration,
}

impl ProxyState {
    pub fn new(client: reqwest::Client, base_url: &str, timeout: Duration) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            timeout,
        }
    }
}

/// Forward a request to the upstream target.
///
/// The inbound path and query are appended to the configured base URL;
/// hop-by-hop headers are filtered in both directions. Errors reaching the
/// upstream map to 502, never to a retry.
pub async fn forward(
    State(state): State<ProxyState>,
    request: Request<Body>,
) -> Result<Response, GatewayError> {
    let method = request.method().clone();
    let path_and_query = request
        .uri()
        .path_and_query()
        .map(|pq| pq.as_str().to_string())
        .unwrap_or_else(|| request.uri().path().to_string());
    let target_url = format!("{}{}", state.base_url, path_and_query);

    debug!(method = %method, target_url = %target_url, "forwarding request upstream");

    // Copy headers, filtering out hop-by-hop headers
    let mut headers = HeaderMap::new();
    for (name, value) in request.headers() {
        if is_hop_by_hop_header(name.as_str()) {
            continue;
        }
        headers.insert(name.clone(), value.clone());
    }

    let body_bytes = axum::body::to_bytes(request.into_body(), MAX_FORWARD_BODY_BYTES)
        .await
        .map_err(|e| GatewayError::ProxyError(format!("Failed to read request body: {}", e)))?;

    let upstream_response = state
        .client
        .request(method, &target_url)
        .headers(headers)
        .body(body_bytes.to_vec())
        .timeout(state.timeout)
        .send()
        .await
        .map_err(|e| {
            warn!(target_url = %target_url, error = %e, "upstream call failed");
            if e.is_timeout() {
                GatewayError::ProxyError(format!(
                    "Upstream request timed out after {} ms",
                    state.timeout.as_millis()
                ))
            } else if e.is_connect() {
                GatewayError::ProxyError(format!("Failed to connect to upstream: {}", e))
            } else {
                GatewayError::ProxyError(format!("Upstream request failed: {}", e))
            }
        })?;

    let status = upstream_response.status();

    let mut response_builder = Response::builder().status(status);
    for (name, value) in upstream_response.headers() {
        if !is_hop_by_hop_header(name.as_str()) {
            response_builder = response_builder.header(name, value);
        }
    }

    let response_body = upstream_response
        .bytes()
        .await
        .map_err(|e| GatewayError::ProxyError(format!("Failed to read response body: {}", e)))?;

    response_builder
        .body(Body::from(response_body.to_vec()))
        .map_err(|e| GatewayError::InternalError(format!("Failed to build response: {}", e)))
}

/// Checks if a header is a hop-by-hop header that should not be forwarded.
///
/// Hop-by-hop headers are defined in RFC 2616 Section 13.5.1.
fn is_hop_by_hop_header(name: &str) -> bool {
    matches!(
        name.to_lowercase().as_str(),
        "connection"
            | "keep-alive"
            | "proxy-authenticate"
            | "proxy-authorization"
            | "te"
            | "trailers"
            | "transfer-encoding"
            | "upgrade"
            | "host" // Host should be set to target, not forwarded
    )
}
