//! Sign-in option negotiation for the login page.
//!
//! Decides which login elements to offer, given the configured mechanisms
//! and what the backend currently reports.

pub mod negotiator;

use thiserror::Error;

pub use negotiator::{LoginElement, LoginLayout, SignInOptionNegotiator, mechanisms};

/// A mechanism tag outside the supported set.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Authentication Type: {tag} is not supported for multiple authentication.")]
pub struct UnsupportedMechanism {
    pub tag: String,
}
