//! HTTP request handlers.

pub mod auth;
pub mod login_page;
