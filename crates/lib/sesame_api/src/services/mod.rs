//! Service layer: cookie transport and backend authenticator.

pub mod backend;
pub mod cookies;
