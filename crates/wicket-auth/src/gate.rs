//! The authentication gate: one remote validation call per request.

use std::time::Duration;

use axum::http::HeaderMap;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::config::AuthConfig;
use crate::error::AuthError;
use crate::extract::bearer_token;
use crate::outcome::AuthOutcome;

/// Request body submitted to the identity service.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct AuthenticateRequest<'a> {
    access_token: &'a str,
}

/// Response body returned by the identity service.
#[derive(Debug, Deserialize)]
struct AuthenticateResponse {
    result: ResultBody,
}

#[derive(Debug, Deserialize)]
struct ResultBody {
    code: i64,
}

/// Decides whether a request may proceed, by validating its bearer
/// credential against the remote identity service.
///
/// The gate is stateless per invocation; the underlying [`reqwest::Client`]
/// only contributes ordinary connection reuse. A single remote failure is a
/// rejection, never retried here.
#[derive(Clone)]
pub struct IdentityGate {
    client: reqwest::Client,
    endpoint: Url,
    timeout: Duration,
}

impl IdentityGate {
    pub fn new(config: &AuthConfig) -> Result<Self, AuthError> {
        Self::with_client(config, reqwest::Client::new())
    }

    /// Build a gate around an injected HTTP client (shared with the rest of
    /// the gateway).
    pub fn with_client(config: &AuthConfig, client: reqwest::Client) -> Result<Self, AuthError> {
        let endpoint = Url::parse(&config.idm_authenticate)
            .map_err(|e| AuthError::invalid_endpoint(e.to_string()))?;
        Ok(Self {
            client,
            endpoint,
            timeout: config.timeout,
        })
    }

    /// Decide the outcome for a request given its headers.
    ///
    /// Absence of a usable credential short-circuits to `Rejected` without
    /// touching the identity service; absence is cheaper and semantically
    /// distinct from an invalid token.
    pub async fn check(&self, headers: &HeaderMap) -> AuthOutcome {
        match bearer_token(headers) {
            Some(token) => self.authenticate(&token).await,
            None => {
                tracing::debug!("no usable bearer credential, rejecting without identity call");
                AuthOutcome::Rejected
            }
        }
    }

    /// Submit a token to the identity service and map the result code.
    ///
    /// This is a total function: timeouts, connection errors, and
    /// non-parseable responses all map to `Rejected`.
    pub async fn authenticate(&self, token: &str) -> AuthOutcome {
        let response = self
            .client
            .post(self.endpoint.clone())
            .json(&AuthenticateRequest {
                access_token: token,
            })
            .timeout(self.timeout)
            .send()
            .await;

        let response = match response {
            Ok(r) => r,
            Err(e) => {
                if e.is_timeout() {
                    tracing::debug!(timeout_ms = %self.timeout.as_millis(), "identity call timed out");
                } else if e.is_connect() {
                    tracing::debug!(error = %e, "failed to connect to identity service");
                } else {
                    tracing::debug!(error = %e, "identity call failed");
                }
                return AuthOutcome::Rejected;
            }
        };

        match response.json::<AuthenticateResponse>().await {
            Ok(body) => {
                let outcome = AuthOutcome::from_code(body.result.code);
                tracing::debug!(code = body.result.code, ?outcome, "identity service answered");
                outcome
            }
            Err(e) => {
                tracing::debug!(error = %e, "identity response was not parseable");
                AuthOutcome::Rejected
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::{HeaderValue, header::AUTHORIZATION};
    use serde_json::json;
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn gate_for(uri: &str) -> IdentityGate {
        let config = AuthConfig {
            idm_authenticate: format!("{uri}/authenticate"),
            timeout: Duration::from_secs(2),
            ..AuthConfig::default()
        };
        IdentityGate::new(&config).unwrap()
    }

    fn bearer_headers(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_str(value).unwrap());
        headers
    }

    #[tokio::test]
    async fn success_code_authenticates() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/authenticate"))
            .and(body_json(json!({"accessToken": "abc123"})))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({"result": {"code": 1040}})),
            )
            .expect(1)
            .mount(&server)
            .await;

        let gate = gate_for(&server.uri());
        let outcome = gate.check(&bearer_headers("Bearer abc123")).await;

        assert_eq!(outcome, AuthOutcome::Authenticated);
    }

    #[tokio::test]
    async fn non_success_code_rejects() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/authenticate"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({"result": {"code": 1011}})),
            )
            .mount(&server)
            .await;

        let gate = gate_for(&server.uri());
        let outcome = gate.authenticate("expired-token").await;

        assert_eq!(outcome, AuthOutcome::Rejected);
    }

    #[tokio::test]
    async fn malformed_response_rejects() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/authenticate"))
            .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
            .mount(&server)
            .await;

        let gate = gate_for(&server.uri());
        let outcome = gate.authenticate("whatever").await;

        assert_eq!(outcome, AuthOutcome::Rejected);
    }

    #[tokio::test]
    async fn server_error_rejects() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/authenticate"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let gate = gate_for(&server.uri());
        let outcome = gate.authenticate("whatever").await;

        assert_eq!(outcome, AuthOutcome::Rejected);
    }

    #[tokio::test]
    async fn slow_identity_service_rejects_on_timeout() {
        let server = MockServer::start().await;

        // The answer would authenticate, but it arrives after the gate has
        // given up.
        Mock::given(method("POST"))
            .and(path("/authenticate"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"result": {"code": 1040}}))
                    .set_delay(Duration::from_secs(5)),
            )
            .mount(&server)
            .await;

        let config = AuthConfig {
            idm_authenticate: format!("{}/authenticate", server.uri()),
            timeout: Duration::from_millis(100),
            ..AuthConfig::default()
        };
        let gate = IdentityGate::new(&config).unwrap();
        let outcome = gate.authenticate("abc123").await;

        assert_eq!(outcome, AuthOutcome::Rejected);
    }

    #[tokio::test]
    async fn connection_failure_rejects() {
        // Nothing listens on port 1.
        let gate = gate_for("http://127.0.0.1:1");
        let outcome = gate.authenticate("whatever").await;

        assert_eq!(outcome, AuthOutcome::Rejected);
    }

    #[tokio::test]
    async fn absence_never_reaches_the_identity_service() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/authenticate"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({"result": {"code": 1040}})),
            )
            .expect(0)
            .mount(&server)
            .await;

        let gate = gate_for(&server.uri());

        assert_eq!(gate.check(&HeaderMap::new()).await, AuthOutcome::Rejected);
        assert_eq!(
            gate.check(&bearer_headers("Basic abc123")).await,
            AuthOutcome::Rejected
        );

        let mut doubled = bearer_headers("Bearer abc123");
        doubled.append(AUTHORIZATION, HeaderValue::from_static("Bearer def456"));
        assert_eq!(gate.check(&doubled).await, AuthOutcome::Rejected);

        server.verify().await;
    }

    #[tokio::test]
    async fn empty_token_is_submitted_and_rejected_remotely() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/authenticate"))
            .and(body_json(json!({"accessToken": ""})))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({"result": {"code": 1011}})),
            )
            .expect(1)
            .mount(&server)
            .await;

        let gate = gate_for(&server.uri());
        let outcome = gate.check(&bearer_headers("Bearer ")).await;

        assert_eq!(outcome, AuthOutcome::Rejected);
    }
}
