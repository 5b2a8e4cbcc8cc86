//! Config validation: collects every problem instead of stopping at the first.

use chrono::Utc;
use url::Url;

use super::SecurityConfig;
use crate::models::auth::expiry;

/// Minimum length of the cookie sealing secret.
pub const MIN_COOKIE_PASSWORD_LEN: usize = 32;
/// Longest accepted session lifetime: 10 years.
pub const MAX_SESSION_TTL_MS: i64 = 10 * 365 * 24 * 60 * 60 * 1000;

/// Validate a configuration.
/// Returns a list of validation error messages (empty = valid).
pub fn validate_config(config: &SecurityConfig) -> Vec<String> {
    let mut errors = Vec::new();

    if config.cookie.password.chars().count() < MIN_COOKIE_PASSWORD_LEN {
        errors.push(format!(
            "cookie.password must be at least {MIN_COOKIE_PASSWORD_LEN} characters"
        ));
    }
    if config.cookie.name.trim().is_empty() {
        errors.push("cookie.name must not be empty".to_string());
    }
    if config.session.ttl_ms <= 0 {
        errors.push("session.ttl_ms must be positive".to_string());
    } else if config.session.ttl_ms > MAX_SESSION_TTL_MS
        || expiry(Utc::now(), config.session.ttl()).is_err()
    {
        errors.push(format!(
            "session.ttl_ms must not exceed {MAX_SESSION_TTL_MS}"
        ));
    }
    if config.auth.backend_timeout_ms == 0 {
        errors.push("auth.backend_timeout_ms must be positive".to_string());
    }
    let base_path = &config.server.base_path;
    if !base_path.is_empty() && !base_path.starts_with('/') {
        errors.push(format!("server.base_path must start with '/': {base_path}"));
    }
    if let Err(e) = Url::parse(&config.backend.url) {
        errors.push(format!("backend.url is not a valid URL: {e}"));
    }

    errors
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid() -> SecurityConfig {
        let mut config = SecurityConfig::default();
        config.cookie.password = "0123456789abcdef0123456789abcdef".into();
        config
    }

    #[test]
    fn accepts_valid_config() {
        assert!(validate_config(&valid()).is_empty());
    }

    #[test]
    fn rejects_short_cookie_password() {
        let mut config = valid();
        config.cookie.password = "short".into();
        let errors = validate_config(&config);
        assert_eq!(errors.len(), 1);
        assert!(errors[0].starts_with("cookie.password"));
    }

    #[test]
    fn rejects_oversized_ttl() {
        let config = SecurityConfig::from_yaml_str(
            "cookie:\n  password: 0123456789abcdef0123456789abcdef\n\
             session:\n  ttl_ms: 9000000000000000000\n",
        )
        .unwrap();
        let errors = validate_config(&config);
        assert_eq!(errors.len(), 1);
        assert!(errors[0].starts_with("session.ttl_ms"));
    }

    #[test]
    fn accepts_ttl_at_the_cap() {
        let mut config = valid();
        config.session.ttl_ms = MAX_SESSION_TTL_MS;
        assert!(validate_config(&config).is_empty());
    }

    #[test]
    fn accumulates_errors() {
        let mut config = valid();
        config.session.ttl_ms = 0;
        config.auth.backend_timeout_ms = 0;
        config.server.base_path = "dashboards".into();
        config.backend.url = "not a url".into();
        assert_eq!(validate_config(&config).len(), 4);
    }
}
