//! Security configuration: loaded once at startup, read-only afterwards.
//!
//! Components receive the pieces they need at construction; nothing reads
//! process-wide state after [`SecurityConfig::load`] returns.

pub mod validation;

use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono::TimeDelta;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Cannot read config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid config syntax: {0}")]
    Parse(#[from] serde_yaml::Error),

    #[error("Invalid config: {}", .0.join("; "))]
    Invalid(Vec<String>),
}

/// Environment variable naming an explicit config file.
pub const CONFIG_PATH_ENV: &str = "SESAME_CONFIG";

/// Top-level configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SecurityConfig {
    pub auth: AuthConfig,
    pub session: SessionConfig,
    pub cookie: CookieConfig,
    pub multitenancy: MultitenancyConfig,
    pub server: ServerConfig,
    pub backend: BackendConfig,
    pub ui: UiConfig,
}

/// Configured login mechanisms: a single tag or a list of tags.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AuthTypeSetting {
    Single(String),
    Many(Vec<String>),
}

impl Default for AuthTypeSetting {
    fn default() -> Self {
        Self::Single(String::new())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    #[serde(rename = "type")]
    pub auth_type: AuthTypeSetting,
    pub anonymous_auth_enabled: bool,
    pub forbidden_usernames: Vec<String>,
    /// Upper bound for every backend call.
    pub backend_timeout_ms: u64,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            auth_type: AuthTypeSetting::default(),
            anonymous_auth_enabled: false,
            forbidden_usernames: Vec::new(),
            backend_timeout_ms: 10_000,
        }
    }
}

impl AuthConfig {
    pub fn is_forbidden(&self, username: &str) -> bool {
        self.forbidden_usernames.iter().any(|u| u == username)
    }

    pub fn backend_timeout(&self) -> Duration {
        Duration::from_millis(self.backend_timeout_ms)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Session lifetime in milliseconds.
    pub ttl_ms: i64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            ttl_ms: 60 * 60 * 1000,
        }
    }
}

impl SessionConfig {
    pub fn ttl(&self) -> TimeDelta {
        TimeDelta::milliseconds(self.ttl_ms)
    }
}

#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CookieConfig {
    pub name: String,
    /// Sealing secret; at least 32 characters.
    pub password: String,
    pub secure: bool,
    /// Name and path of the session cookie written by the previous release.
    pub legacy_name: String,
    pub legacy_path: String,
}

impl Default for CookieConfig {
    fn default() -> Self {
        Self {
            name: "sesame_session".into(),
            password: String::new(),
            secure: false,
            legacy_name: "security_authentication".into(),
            legacy_path: "/".into(),
        }
    }
}

impl std::fmt::Debug for CookieConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CookieConfig")
            .field("name", &self.name)
            .field("password", &"<redacted>")
            .field("secure", &self.secure)
            .field("legacy_name", &self.legacy_name)
            .field("legacy_path", &self.legacy_path)
            .finish()
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MultitenancyConfig {
    pub enabled: bool,
    pub tenants: TenantsConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TenantsConfig {
    pub enable_private: bool,
    pub enable_global: bool,
}

impl Default for TenantsConfig {
    fn default() -> Self {
        Self {
            enable_private: true,
            enable_global: true,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Prefix for every route, e.g. `/dashboards`. Empty for none.
    pub base_path: String,
    pub bind_addr: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            base_path: String::new(),
            bind_addr: "127.0.0.1:5601".into(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BackendConfig {
    pub url: String,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            url: "http://localhost:9200".into(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct UiConfig {
    pub basicauth: UiSection,
    pub anonymous: UiSection,
    pub openid: UiSection,
    pub saml: UiSection,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct UiSection {
    pub login: LoginUiConfig,
}

/// Presentation settings for one login mechanism.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoginUiConfig {
    pub title: String,
    pub subtitle: String,
    #[serde(rename = "buttonname")]
    pub button_name: String,
    #[serde(rename = "showbrandimage")]
    pub show_brand_image: bool,
    #[serde(rename = "brandimage")]
    pub brand_image: String,
    #[serde(rename = "buttonstyle")]
    pub button_style: String,
}

impl SecurityConfig {
    /// Parse YAML without applying overrides or validating.
    pub fn from_yaml_str(yaml: &str) -> Result<Self, ConfigError> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    /// Load the configuration.
    ///
    /// An explicit `path` must exist. Without one, `SESAME_CONFIG` and then
    /// the per-user default location are tried; a missing default file means
    /// built-in defaults. Environment overrides are applied last, then the
    /// result is validated.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let explicit = path
            .map(Path::to_path_buf)
            .or_else(|| std::env::var_os(CONFIG_PATH_ENV).map(PathBuf::from));

        let mut config = match explicit {
            Some(p) => Self::read_file(&p)?,
            None => {
                let p = default_config_path();
                if p.exists() {
                    Self::read_file(&p)?
                } else {
                    debug!(path = %p.display(), "no config file, using defaults");
                    Self::default()
                }
            }
        };

        config.apply_overrides(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    fn read_file(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        debug!(path = %path.display(), "loaded config file");
        Self::from_yaml_str(&raw)
    }

    /// Apply `SESAME_*` overrides from `lookup`.
    ///
    /// | Variable                 | Field             |
    /// |--------------------------|-------------------|
    /// | `SESAME_COOKIE_PASSWORD` | `cookie.password` |
    /// | `SESAME_BACKEND_URL`     | `backend.url`     |
    /// | `SESAME_BIND_ADDR`       | `server.bind_addr`|
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(v) = lookup("SESAME_COOKIE_PASSWORD").filter(|v| !v.is_empty()) {
            self.cookie.password = v;
        }
        if let Some(v) = lookup("SESAME_BACKEND_URL").filter(|v| !v.is_empty()) {
            self.backend.url = v;
        }
        if let Some(v) = lookup("SESAME_BIND_ADDR").filter(|v| !v.is_empty()) {
            self.server.bind_addr = v;
        }
    }

    /// Reject configurations the rest of the system cannot work with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let errors = validation::validate_config(self);
        if errors.is_empty() {
            Ok(())
        } else {
            Err(ConfigError::Invalid(errors))
        }
    }
}

/// Per-user default config location, `<config dir>/sesame/sesame.yml`.
pub fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("sesame")
        .join("sesame.yml")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_values() {
        let config = SecurityConfig::default();
        assert_eq!(config.auth.auth_type, AuthTypeSetting::Single(String::new()));
        assert!(!config.auth.anonymous_auth_enabled);
        assert_eq!(config.cookie.name, "sesame_session");
        assert_eq!(config.cookie.legacy_name, "security_authentication");
        assert_eq!(config.cookie.legacy_path, "/");
        assert_eq!(config.session.ttl(), TimeDelta::hours(1));
        assert_eq!(config.auth.backend_timeout(), Duration::from_secs(10));
        assert!(config.multitenancy.tenants.enable_private);
        assert!(config.multitenancy.tenants.enable_global);
    }

    #[test]
    fn parses_yaml_with_list_auth_type() {
        let yaml = r#"
auth:
  type: [basicauth, saml]
  anonymous_auth_enabled: true
  forbidden_usernames: [admin]
multitenancy:
  enabled: true
  tenants:
    enable_private: false
ui:
  saml:
    login:
      buttonname: Corporate SSO
"#;
        let config = SecurityConfig::from_yaml_str(yaml).unwrap();
        assert_eq!(
            config.auth.auth_type,
            AuthTypeSetting::Many(vec!["basicauth".into(), "saml".into()])
        );
        assert!(config.auth.is_forbidden("admin"));
        assert!(!config.auth.is_forbidden("alice"));
        assert!(config.multitenancy.enabled);
        assert!(!config.multitenancy.tenants.enable_private);
        assert!(config.multitenancy.tenants.enable_global);
        assert_eq!(config.ui.saml.login.button_name, "Corporate SSO");
    }

    #[test]
    fn parses_single_string_auth_type() {
        let config = SecurityConfig::from_yaml_str("auth:\n  type: openid\n").unwrap();
        assert_eq!(config.auth.auth_type, AuthTypeSetting::Single("openid".into()));
    }

    #[test]
    fn overrides_replace_file_values() {
        let mut config = SecurityConfig::default();
        config.apply_overrides(|key| match key {
            "SESAME_COOKIE_PASSWORD" => Some("x".repeat(40)),
            "SESAME_BACKEND_URL" => Some("https://backend:9200".into()),
            "SESAME_BIND_ADDR" => Some(String::new()),
            _ => None,
        });
        assert_eq!(config.cookie.password.len(), 40);
        assert_eq!(config.backend.url, "https://backend:9200");
        assert_eq!(config.server.bind_addr, "127.0.0.1:5601");
    }

    #[test]
    fn missing_explicit_file_is_an_error() {
        let err = SecurityConfig::load(Some(Path::new("/nonexistent/sesame.yml"))).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }

    #[test]
    fn debug_output_redacts_cookie_password() {
        let mut config = SecurityConfig::default();
        config.cookie.password = "super-secret-cookie-password-0123456789".into();
        assert!(!format!("{config:?}").contains("super-secret"));
    }
}
