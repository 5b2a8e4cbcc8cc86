//! Authentication domain models.
//!
//! `Principal` is produced by the backend authenticator; `SessionRecord` is
//! what gets sealed into the session cookie.

use std::collections::BTreeMap;
use std::fmt;

use base64::Engine;
use chrono::{DateTime, SubsecRound, TimeDelta, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::sign_in::SignInOption;

/// Verified identity returned by the backend authenticator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Principal {
    pub username: String,
    #[serde(default)]
    pub roles: Vec<String>,
    #[serde(default)]
    pub backend_roles: Vec<String>,
    #[serde(default)]
    pub multitenancy_enabled: bool,
    #[serde(default)]
    pub private_tenant_enabled: bool,
    #[serde(default)]
    pub default_tenant: String,
    /// Tenant name → accessible.
    #[serde(default)]
    pub tenants: BTreeMap<String, bool>,
}

impl Principal {
    /// True when the tenant map grants access to `tenant`.
    pub fn can_access(&self, tenant: &str) -> bool {
        self.tenants.get(tenant).copied().unwrap_or(false)
    }
}

/// Mechanism a session was established with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AuthType {
    #[serde(rename = "basicauth")]
    Basic,
    #[serde(rename = "anonymous")]
    Anonymous,
    #[serde(rename = "openid")]
    OpenId,
    #[serde(rename = "saml")]
    Saml,
}

impl AuthType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Basic => "basicauth",
            Self::Anonymous => "anonymous",
            Self::OpenId => "openid",
            Self::Saml => "saml",
        }
    }
}

impl fmt::Display for AuthType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Username and password as submitted to the login endpoint.
#[derive(Clone, Deserialize)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Re-presentable credentials embedded in password sessions.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CredentialCarrier {
    pub auth_header_value: String,
}

impl CredentialCarrier {
    /// `Basic base64(username:password)`.
    pub fn basic(credentials: &Credentials) -> Self {
        let encoded = base64::engine::general_purpose::STANDARD
            .encode(format!("{}:{}", credentials.username, credentials.password));
        Self {
            auth_header_value: format!("Basic {encoded}"),
        }
    }
}

impl fmt::Debug for CredentialCarrier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("CredentialCarrier(<redacted>)")
    }
}

/// Persisted session state.
///
/// Fields are private: a record is never edited in place, every transition
/// builds a new one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionRecord {
    username: String,
    auth_type: AuthType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    credentials: Option<CredentialCarrier>,
    is_anonymous_auth: bool,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    expiry_time: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    tenant: Option<String>,
}

impl SessionRecord {
    /// Password session carrying re-presentable credentials.
    pub fn password(
        username: &str,
        credentials: CredentialCarrier,
        ttl: TimeDelta,
        now: DateTime<Utc>,
    ) -> Result<Self, ExpiryOverflow> {
        Ok(Self {
            username: username.to_string(),
            auth_type: AuthType::Basic,
            credentials: Some(credentials),
            is_anonymous_auth: false,
            expiry_time: expiry(now, ttl)?,
            tenant: None,
        })
    }

    /// Anonymous session; never carries credentials.
    pub fn anonymous(
        username: &str,
        ttl: TimeDelta,
        now: DateTime<Utc>,
    ) -> Result<Self, ExpiryOverflow> {
        Ok(Self {
            username: username.to_string(),
            auth_type: AuthType::Anonymous,
            credentials: None,
            is_anonymous_auth: true,
            expiry_time: expiry(now, ttl)?,
            tenant: None,
        })
    }

    /// Same record with the given tenant selection.
    pub fn with_tenant(self, tenant: Option<String>) -> Self {
        Self { tenant, ..self }
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn auth_type(&self) -> AuthType {
        self.auth_type
    }

    pub fn credentials(&self) -> Option<&CredentialCarrier> {
        self.credentials.as_ref()
    }

    pub fn is_anonymous(&self) -> bool {
        self.is_anonymous_auth
    }

    pub fn expires_at(&self) -> DateTime<Utc> {
        self.expiry_time
    }

    pub fn tenant(&self) -> Option<&str> {
        self.tenant.as_deref()
    }

    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expiry_time <= now
    }

    /// Checks the structural invariants a decoded record must still hold.
    pub fn check(&self) -> Result<(), String> {
        if self.username.is_empty() {
            return Err("empty username".into());
        }
        if self.is_anonymous_auth && self.credentials.is_some() {
            return Err("anonymous session carries credentials".into());
        }
        if self.is_anonymous_auth != (self.auth_type == AuthType::Anonymous) {
            return Err("anonymous flag does not match auth type".into());
        }
        if self.auth_type != AuthType::Basic && self.credentials.is_some() {
            return Err(format!("{} session carries credentials", self.auth_type));
        }
        Ok(())
    }
}

/// Cookie timestamps have millisecond resolution; truncating up front keeps
/// a decoded record equal to the one that was encoded.
pub(crate) fn expiry(
    now: DateTime<Utc>,
    ttl: TimeDelta,
) -> Result<DateTime<Utc>, ExpiryOverflow> {
    now.checked_add_signed(ttl)
        .map(|t| t.trunc_subsecs(3))
        .ok_or(ExpiryOverflow { ttl })
}

/// Session lifetime too large to represent as an expiry time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("session ttl of {} ms overflows the expiry time", .ttl.num_milliseconds())]
pub struct ExpiryOverflow {
    pub ttl: TimeDelta,
}

/// Body returned by a successful login.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginResponse {
    pub username: String,
    pub tenants: BTreeMap<String, bool>,
    pub roles: Vec<String>,
    #[serde(rename = "backendroles")]
    pub backend_roles: Vec<String>,
    #[serde(
        rename = "selectedTenants",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub selected_tenant: Option<String>,
}

/// Backend view of the dashboards integration, including the sign-in options.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DashboardsInfo {
    #[serde(default)]
    pub multitenancy_enabled: bool,
    #[serde(default)]
    pub private_tenant_enabled: bool,
    #[serde(default)]
    pub default_tenant: String,
    #[serde(default)]
    pub password_validation_error_message: String,
    #[serde(default, alias = "dashboard_signin_options")]
    pub sign_in_options: Vec<SignInOption>,
}
