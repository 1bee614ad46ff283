//! Authentication stage error types.
//!
//! The gate itself never surfaces an error: every failure collapses to a
//! rejection. Errors here cover construction and configuration only.

/// Errors that can occur while building the authentication stage.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// The configured identity-service endpoint could not be parsed.
    #[error("Invalid identity endpoint: {message}")]
    InvalidEndpoint {
        /// Description of why the endpoint is invalid.
        message: String,
    },
}

impl AuthError {
    pub fn invalid_endpoint(message: impl Into<String>) -> Self {
        Self::InvalidEndpoint {
            message: message.into(),
        }
    }
}
