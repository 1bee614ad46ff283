//! Authentication stage configuration.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Configuration for the authentication gate.
///
/// # Example (TOML)
///
/// ```toml
/// [auth]
/// enabled = true
/// idm_authenticate = "https://idm.example.com/authenticate"
/// timeout = "5s"
/// protected_prefixes = ["/movies", "/billing"]
/// ```
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AuthConfig {
    /// Enable/disable the authentication stage entirely.
    /// When disabled, protected prefixes are not enforced.
    pub enabled: bool,

    /// Endpoint of the identity service's authenticate operation.
    pub idm_authenticate: String,

    /// Upper bound on the remote validation call. A timeout is treated
    /// identically to any other transport failure: rejection.
    #[serde(with = "humantime_serde")]
    pub timeout: Duration,

    /// Request-path prefixes that require authentication. Everything else
    /// passes the gate untouched.
    pub protected_prefixes: Vec<String>,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            idm_authenticate: "http://localhost:8081/authenticate".to_string(),
            timeout: Duration::from_secs(5),
            protected_prefixes: Vec::new(),
        }
    }
}

impl AuthConfig {
    pub fn validate(&self) -> Result<(), String> {
        if self.enabled {
            if self.idm_authenticate.is_empty() {
                return Err("auth.idm_authenticate must not be empty".into());
            }
            url::Url::parse(&self.idm_authenticate)
                .map_err(|e| format!("auth.idm_authenticate is not a valid URL: {e}"))?;
            if self.timeout.is_zero() {
                return Err("auth.timeout must be > 0".into());
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        assert!(AuthConfig::default().validate().is_ok());
    }

    #[test]
    fn invalid_endpoint_is_rejected() {
        let cfg = AuthConfig {
            idm_authenticate: "not a url".to_string(),
            ..AuthConfig::default()
        };
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn disabled_config_skips_endpoint_validation() {
        let cfg = AuthConfig {
            enabled: false,
            idm_authenticate: String::new(),
            ..AuthConfig::default()
        };
        assert!(cfg.validate().is_ok());
    }
}
