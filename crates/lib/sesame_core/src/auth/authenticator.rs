//! The external credential backend, seen as an opaque capability.

use async_trait::async_trait;

use super::AuthenticatorError;
use super::request::RequestContext;
use crate::models::auth::{Credentials, DashboardsInfo, Principal};

/// Verifies identities. Implementations do network I/O; callers bound every
/// call with a timeout.
#[async_trait]
pub trait Authenticator: Send + Sync {
    /// Verify a username and password.
    async fn authenticate(
        &self,
        request: &RequestContext,
        credentials: &Credentials,
    ) -> Result<Principal, AuthenticatorError>;

    /// Derive an identity from the request alone (trusted network headers).
    async fn authenticate_with_headers(
        &self,
        request: &RequestContext,
    ) -> Result<Principal, AuthenticatorError>;

    /// Current dashboards settings, including the enabled sign-in options.
    async fn dashboards_info(
        &self,
        request: &RequestContext,
    ) -> Result<DashboardsInfo, AuthenticatorError>;
}
