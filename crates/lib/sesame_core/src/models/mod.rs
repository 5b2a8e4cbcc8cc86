//! Domain models.

pub mod auth;
pub mod sign_in;
