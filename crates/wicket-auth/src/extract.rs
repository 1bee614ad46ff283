//! Bearer credential extraction from request headers.

use axum::http::{HeaderMap, header::AUTHORIZATION};

/// Literal prefix a bearer credential must carry. Case-sensitive.
pub const BEARER_PREFIX: &str = "Bearer ";

/// Extract the bearer token from the `Authorization` header set.
///
/// Returns `None` when:
/// - the header is missing,
/// - the header appears more than once (ambiguous, treated as untrusted
///   rather than merged),
/// - the single value does not start with the exact `Bearer ` prefix,
/// - the value is not valid visible ASCII.
///
/// On success the substring following the prefix is returned unmodified:
/// not trimmed and not checked for emptiness. An empty token is a valid
/// extraction result; the identity service is the one to reject it.
pub fn bearer_token(headers: &HeaderMap) -> Option<String> {
    let mut values = headers.get_all(AUTHORIZATION).iter();
    let value = values.next()?;
    if values.next().is_some() {
        return None;
    }

    let raw = value.to_str().ok()?;
    raw.strip_prefix(BEARER_PREFIX).map(str::to_owned)
}
