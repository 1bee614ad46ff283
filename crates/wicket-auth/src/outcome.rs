//! Mapping from identity-service result codes to an effective outcome.

use serde::{Deserialize, Serialize};

/// Result code the identity service returns for a valid, active session.
pub const SESSION_ACTIVE: i64 = 1040;

/// Effective authentication state of a request.
///
/// There are exactly two states. Every non-success result code, and every
/// transport-level failure, collapses to [`AuthOutcome::Rejected`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuthOutcome {
    /// The identity service confirmed the token; the request may proceed.
    Authenticated,
    /// Anything else: the request must not proceed.
    Rejected,
}

impl AuthOutcome {
    /// Total mapping from a result code to an outcome.
    ///
    /// Only [`SESSION_ACTIVE`] authenticates; the default arm rejects, so
    /// the fail-closed contract holds for codes this gateway has never
    /// seen.
    pub fn from_code(code: i64) -> Self {
        match code {
            SESSION_ACTIVE => Self::Authenticated,
            _ => Self::Rejected,
        }
    }

    pub fn is_authenticated(self) -> bool {
        matches!(self, Self::Authenticated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn success_code_authenticates() {
        assert_eq!(AuthOutcome::from_code(1040), AuthOutcome::Authenticated);
    }

    #[test]
    fn every_other_code_rejects() {
        for code in [0, 1, 1039, 1041, -1040, i64::MIN, i64::MAX] {
            assert_eq!(AuthOutcome::from_code(code), AuthOutcome::Rejected);
        }
    }
}
