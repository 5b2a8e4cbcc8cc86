//! # sesame_core
//!
//! Core session and tenant logic for Sesame.
//!
//! Turns credentials (or an anonymous assertion) into a sealed session
//! record, picks the tenant the session operates against, and decides
//! whether anonymous access is permitted at all.

pub mod auth;
pub mod config;
pub mod models;
pub mod routes;
pub mod signin;

/// Returns the crate version.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
