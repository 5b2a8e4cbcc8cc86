//! Authentication session service: login, logout and anonymous login.
//!
//! A session moves `Anonymous` → (credential check in flight) →
//! `Authenticated`, and back to `Anonymous` through logout or expiry. Every
//! transition writes a freshly built [`SessionRecord`]; records are never
//! patched in place.

use std::future::Future;
use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, error, info, warn};

use super::anonymous::is_anonymous_allowed;
use super::authenticator::Authenticator;
use super::request::RequestContext;
use super::store::{SessionState, SessionStorage, SessionStore};
use super::tenant::TenantResolver;
use super::{AuthError, AuthenticatorError};
use crate::config::SecurityConfig;
use crate::models::auth::{
    CredentialCarrier, Credentials, DashboardsInfo, LoginResponse, Principal, SessionRecord,
};
use crate::routes;

/// Result of a successful password login.
#[derive(Debug, Clone)]
pub struct LoginOutcome {
    pub principal: Principal,
    pub record: SessionRecord,
}

/// Why an anonymous login ended on the login page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnonymousDenial {
    /// Anonymous auth is switched off in the local configuration.
    Disabled,
    /// The backend's sign-in options could not be fetched.
    OptionsUnavailable,
    /// The policy rejected this attempt.
    NotAllowed,
    /// The no-credential authentication failed.
    AuthenticationFailed,
}

/// Anonymous login always ends in a redirect.
#[derive(Debug, Clone)]
pub enum AnonymousLoginOutcome {
    Established {
        record: SessionRecord,
        location: String,
    },
    Denied {
        reason: AnonymousDenial,
        location: String,
    },
}

impl AnonymousLoginOutcome {
    pub fn location(&self) -> &str {
        match self {
            Self::Established { location, .. } | Self::Denied { location, .. } => location,
        }
    }
}

/// Orchestrates the session flows over an external [`Authenticator`].
pub struct AuthSessionService {
    config: Arc<SecurityConfig>,
    authenticator: Arc<dyn Authenticator>,
    resolver: TenantResolver,
}

impl AuthSessionService {
    pub fn new(config: Arc<SecurityConfig>, authenticator: Arc<dyn Authenticator>) -> Self {
        let resolver = TenantResolver::new(config.multitenancy.clone());
        Self {
            config,
            authenticator,
            resolver,
        }
    }

    pub fn config(&self) -> &SecurityConfig {
        &self.config
    }

    /// Login entry point, including the server base path.
    pub fn login_page_location(&self) -> String {
        routes::with_base_path(&self.config.server.base_path, routes::GET_APP_LOGIN)
    }

    /// Where an established anonymous session lands.
    pub fn post_login_location(&self) -> String {
        let base = self.config.server.base_path.trim_end_matches('/');
        if base.is_empty() {
            "/".to_string()
        } else {
            base.to_string()
        }
    }

    /// Bound a backend call; a slow backend becomes an error, never a retry.
    async fn bounded<T>(
        &self,
        call: impl Future<Output = Result<T, AuthenticatorError>>,
    ) -> Result<T, AuthenticatorError> {
        let limit = self.config.auth.backend_timeout();
        match tokio::time::timeout(limit, call).await {
            Ok(result) => result,
            Err(_) => Err(AuthenticatorError::Timeout(limit)),
        }
    }

    /// Tenant of the current session, kept only for the same user.
    fn prior_tenant<S: SessionStorage>(
        store: &mut SessionStore<S>,
        username: &str,
    ) -> Option<String> {
        store
            .read()
            .record()
            .filter(|r| r.username() == username)
            .and_then(|r| r.tenant().map(str::to_string))
    }

    /// Username/password login.
    pub async fn login<S: SessionStorage>(
        &self,
        request: &RequestContext,
        credentials: &Credentials,
        store: &mut SessionStore<S>,
    ) -> Result<LoginOutcome, AuthError> {
        if self.config.auth.is_forbidden(&credentials.username) {
            error!(
                username = %credentials.username,
                "Denied login for forbidden username"
            );
            return Err(AuthError::DeniedUsername(credentials.username.clone()));
        }

        let principal = self
            .bounded(self.authenticator.authenticate(request, credentials))
            .await
            .map_err(|e| {
                error!(username = %credentials.username, "Failed authentication: {e}");
                AuthError::AuthenticationFailed(e)
            })?;

        let prior = Self::prior_tenant(store, &principal.username);
        store.clear();

        let tenant =
            self.resolver
                .resolve(&principal, request.tenant_hint().as_deref(), prior.as_deref())?;
        let record = SessionRecord::password(
            &principal.username,
            CredentialCarrier::basic(credentials),
            self.config.session.ttl(),
            Utc::now(),
        )?
        .with_tenant(tenant);

        store.write(&record)?;
        info!(
            username = %principal.username,
            tenant = ?record.tenant(),
            "session established"
        );
        Ok(LoginOutcome { principal, record })
    }

    /// Body for the login endpoint.
    pub fn login_response(&self, outcome: &LoginOutcome) -> LoginResponse {
        let principal = &outcome.principal;
        LoginResponse {
            username: principal.username.clone(),
            tenants: principal.tenants.clone(),
            roles: principal.roles.clone(),
            backend_roles: principal.backend_roles.clone(),
            selected_tenant: if self.config.multitenancy.enabled {
                outcome.record.tenant().map(str::to_string)
            } else {
                None
            },
        }
    }

    /// Clears the session whatever its state. Idempotent.
    pub fn logout<S: SessionStorage>(&self, store: &mut SessionStore<S>) -> SessionState {
        store.clear();
        SessionState::LoggedOut
    }

    /// Establish an anonymous session if policy and backend allow it.
    pub async fn anonymous_login<S: SessionStorage>(
        &self,
        request: &RequestContext,
        store: &mut SessionStore<S>,
    ) -> Result<AnonymousLoginOutcome, AuthError> {
        let denied = |reason| AnonymousLoginOutcome::Denied {
            reason,
            location: self.login_page_location(),
        };

        if !self.config.auth.anonymous_auth_enabled {
            error!("Anonymous auth is disabled. Redirecting to Login Page");
            return Ok(denied(AnonymousDenial::Disabled));
        }

        let options = match self.bounded(self.authenticator.dashboards_info(request)).await {
            Ok(info) => info.sign_in_options,
            Err(e) => {
                warn!("Unable to fetch sign-in options: {e}. Redirecting to Login Page");
                return Ok(denied(AnonymousDenial::OptionsUnavailable));
            }
        };

        if !is_anonymous_allowed(&self.config.auth, &options, request.is_auto_login_attempt()) {
            debug!(?options, "anonymous access not allowed for this request");
            return Ok(denied(AnonymousDenial::NotAllowed));
        }

        let principal = match self
            .bounded(self.authenticator.authenticate_with_headers(request))
            .await
        {
            Ok(principal) => principal,
            Err(e) => {
                error!("Failed authentication: {e}. Redirecting to Login Page");
                return Ok(denied(AnonymousDenial::AuthenticationFailed));
            }
        };

        let prior = Self::prior_tenant(store, &principal.username);
        store.clear();

        let tenant =
            self.resolver
                .resolve(&principal, request.tenant_hint().as_deref(), prior.as_deref())?;
        let record =
            SessionRecord::anonymous(&principal.username, self.config.session.ttl(), Utc::now())?
                .with_tenant(tenant);
        store.write(&record)?;

        let location = self.post_login_location();
        info!(username = %principal.username, %location, "anonymous session established");
        Ok(AnonymousLoginOutcome::Established { record, location })
    }

    /// Session state for a protected request.
    pub fn session<S: SessionStorage>(&self, store: &mut SessionStore<S>) -> SessionState {
        store.read()
    }

    /// Sign-in options and related settings as currently reported by the backend.
    pub async fn dashboards_info(
        &self,
        request: &RequestContext,
    ) -> Result<DashboardsInfo, AuthenticatorError> {
        self.bounded(self.authenticator.dashboards_info(request))
            .await
    }
}
