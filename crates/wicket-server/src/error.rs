//! Gateway-facing error types.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use std::fmt;

/// Errors a request can surface on its way through the gateway.
#[derive(Debug)]
pub enum GatewayError {
    /// Authentication required (401 Unauthorized). The response carries no
    /// body: the gate's only observable effect on rejection is the status.
    Unauthorized,

    /// Error forwarding the request upstream.
    ProxyError(String),

    /// Generic internal error.
    InternalError(String),
}

impl fmt::Display for GatewayError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unauthorized => write!(f, "Authentication required"),
            Self::ProxyError(msg) => write!(f, "Proxy error: {}", msg),
            Self::InternalError(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl std::error::Error for GatewayError {}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        match self {
            Self::Unauthorized => StatusCode::UNAUTHORIZED.into_response(),
            Self::ProxyError(_) => (StatusCode::BAD_GATEWAY, self.to_string()).into_response(),
            Self::InternalError(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, self.to_string()).into_response()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unauthorized_maps_to_bare_401() {
        let response = GatewayError::Unauthorized.into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[test]
    fn proxy_error_maps_to_502() {
        let response = GatewayError::ProxyError("upstream down".into()).into_response();
        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    }
}
