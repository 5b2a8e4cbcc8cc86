//! Session establishment and tenant resolution.
//!
//! The pieces, leaves first: [`codec`] seals session records into cookie
//! values, [`tenant`] picks a tenant, [`anonymous`] gates anonymous access,
//! [`store`] reads and writes the record through a transport, and
//! [`service`] runs the login, logout and anonymous-login flows.

pub mod anonymous;
pub mod authenticator;
pub mod codec;
pub mod request;
pub mod service;
pub mod store;
pub mod tenant;

use std::time::Duration;

use thiserror::Error;

pub use codec::{DecodeError, EncodeError, SessionCookieCodec};
pub use tenant::NoAccessibleTenant;

/// Challenge sent when the backend did not provide one.
pub const DEFAULT_CHALLENGE: &str = r#"Basic realm="Authorization Required""#;

/// Session-layer errors.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Username is on the deny-list; raised before the backend is contacted.
    #[error("Denied login for forbidden username {0}")]
    DeniedUsername(String),

    #[error("Authentication failed: {0}")]
    AuthenticationFailed(#[from] AuthenticatorError),

    #[error(transparent)]
    NoAccessibleTenant(#[from] NoAccessibleTenant),

    #[error("Session encoding failed: {0}")]
    Session(#[from] EncodeError),

    #[error(transparent)]
    Expiry(#[from] crate::models::auth::ExpiryOverflow),
}

/// Failures of the external authenticator.
#[derive(Debug, Error)]
pub enum AuthenticatorError {
    #[error("credentials rejected")]
    Rejected { challenge: String },

    #[error("backend unreachable: {0}")]
    Unreachable(String),

    #[error("backend did not answer within {0:?}")]
    Timeout(Duration),

    #[error("unexpected backend response: {0}")]
    InvalidResponse(String),
}

impl AuthenticatorError {
    /// Value for the `www-authenticate` header.
    pub fn challenge(&self) -> &str {
        match self {
            Self::Rejected { challenge } if !challenge.is_empty() => challenge,
            _ => DEFAULT_CHALLENGE,
        }
    }
}
