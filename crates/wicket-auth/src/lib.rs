//! # wicket-auth
//!
//! The authentication stage of the wicket gateway.
//!
//! Given the headers of an inbound request, this crate decides whether the
//! request may proceed. The decision is made in two steps:
//!
//! 1. [`extract::bearer_token`] pulls the bearer credential out of the
//!    `Authorization` header, treating a missing, duplicated, or
//!    non-`Bearer` header as a defined absence.
//! 2. [`gate::IdentityGate`] submits a present token to the remote identity
//!    service and maps the result code to an [`outcome::AuthOutcome`].
//!
//! The mapping is fail-closed: absence of a clear success signal is never
//! treated as success. There is no code path that defaults to allow.

pub mod config;
pub mod error;
pub mod extract;
pub mod gate;
pub mod outcome;

pub use config::AuthConfig;
pub use error::AuthError;
pub use extract::{BEARER_PREFIX, bearer_token};
pub use gate::IdentityGate;
pub use outcome::{AuthOutcome, SESSION_ACTIVE};
