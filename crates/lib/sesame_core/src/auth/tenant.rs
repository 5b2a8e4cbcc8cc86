//! Tenant resolution: decides which tenant a new session operates against.
//!
//! Precedence, first match wins:
//! 1. multitenancy off (globally or for the principal) → no tenant
//! 2. explicit, accessible hint from the request
//! 3. accessible tenant of the prior session
//! 4. private tenant, when enabled for the principal and globally
//! 5. the principal's default tenant, if accessible
//!
//! Anything else is [`NoAccessibleTenant`].

use thiserror::Error;

use crate::config::MultitenancyConfig;
use crate::models::auth::Principal;

/// Identifier stored for the private tenant.
pub const PRIVATE_TENANT: &str = "__user__";
/// Hint spellings that name the private tenant (besides the username).
const PRIVATE_ALIASES: &[&str] = &[PRIVATE_TENANT, "private"];
/// Names under which the global tenant appears in tenant maps.
const GLOBAL_TENANT_NAMES: &[&str] = &["global_tenant", "global", ""];

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("no accessible tenant for user {username}")]
pub struct NoAccessibleTenant {
    pub username: String,
}

/// Pure tenant selection over an immutable multitenancy configuration.
#[derive(Debug, Clone)]
pub struct TenantResolver {
    config: MultitenancyConfig,
}

impl TenantResolver {
    pub fn new(config: MultitenancyConfig) -> Self {
        Self { config }
    }

    pub fn resolve(
        &self,
        principal: &Principal,
        hint: Option<&str>,
        prior_tenant: Option<&str>,
    ) -> Result<Option<String>, NoAccessibleTenant> {
        if !self.config.enabled || !principal.multitenancy_enabled {
            return Ok(None);
        }

        if let Some(tenant) = hint.and_then(|h| self.accessible(principal, h)) {
            return Ok(Some(tenant));
        }

        if let Some(tenant) = prior_tenant.and_then(|t| self.accessible(principal, t)) {
            return Ok(Some(tenant));
        }

        if self.private_available(principal) {
            return Ok(Some(PRIVATE_TENANT.to_string()));
        }

        self.accessible(principal, &principal.default_tenant)
            .map(Some)
            .ok_or_else(|| NoAccessibleTenant {
                username: principal.username.clone(),
            })
    }

    fn private_available(&self, principal: &Principal) -> bool {
        self.config.tenants.enable_private && principal.private_tenant_enabled
    }

    /// Canonical identifier for `tenant` when the principal may use it.
    fn accessible(&self, principal: &Principal, tenant: &str) -> Option<String> {
        if PRIVATE_ALIASES.contains(&tenant) || tenant == principal.username {
            return self
                .private_available(principal)
                .then(|| PRIVATE_TENANT.to_string());
        }
        if GLOBAL_TENANT_NAMES.contains(&tenant) && !self.config.tenants.enable_global {
            return None;
        }
        principal.can_access(tenant).then(|| tenant.to_string())
    }
}
