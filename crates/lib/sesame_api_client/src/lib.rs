//! # sesame_api_client
//!
//! HTTP client for the Sesame API and the login-page flow built on it:
//! form submission, sign-in option revalidation and next-URL handling.

pub mod client;
pub mod error;
pub mod login;
pub mod next_url;

pub use client::{SesameClient, SessionInfo};
pub use error::ClientError;
pub use login::{LOGIN_FAILED_MESSAGE, LoginForm, LoginFormError, follow};
pub use next_url::{next_path, next_url_query};
