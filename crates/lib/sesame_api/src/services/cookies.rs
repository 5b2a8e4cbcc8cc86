//! Cookie service: session cookie transport over the request's jar.

use std::sync::Arc;

use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use sesame_core::auth::store::SessionStorage;
use sesame_core::config::{CookieConfig, SecurityConfig};
use time::Duration;

/// Cookie path for the session cookie.
const SESSION_COOKIE_PATH: &str = "/";

/// Build the httpOnly session cookie. No max-age: expiry lives in the
/// sealed record.
pub fn session_cookie(config: &CookieConfig, value: String) -> Cookie<'static> {
    Cookie::build((config.name.clone(), value))
        .http_only(true)
        .secure(config.secure)
        .same_site(SameSite::Lax)
        .path(SESSION_COOKIE_PATH)
        .build()
}

/// Cookie used to remove the session cookie from the jar.
pub fn clear_session_cookie(config: &CookieConfig) -> Cookie<'static> {
    Cookie::build((config.name.clone(), String::new()))
        .path(SESSION_COOKIE_PATH)
        .build()
}

/// Build an expired cookie that clears the previous release's session cookie.
pub fn clear_legacy_cookie(config: &CookieConfig) -> Cookie<'static> {
    Cookie::build((config.legacy_name.clone(), String::new()))
        .http_only(true)
        .secure(config.secure)
        .same_site(SameSite::Lax)
        .path(config.legacy_path.clone())
        .max_age(Duration::ZERO)
        .build()
}

/// [`SessionStorage`] over an axum-extra [`CookieJar`]. Hand the jar back to
/// the response with [`CookieJarStorage::into_jar`].
#[derive(Debug)]
pub struct CookieJarStorage {
    jar: CookieJar,
    config: Arc<SecurityConfig>,
}

impl CookieJarStorage {
    pub fn new(jar: CookieJar, config: Arc<SecurityConfig>) -> Self {
        Self { jar, config }
    }

    pub fn into_jar(self) -> CookieJar {
        self.jar
    }
}

impl SessionStorage for CookieJarStorage {
    fn get(&self) -> Option<String> {
        self.jar
            .get(&self.config.cookie.name)
            .map(|c| c.value().to_string())
            .filter(|v| !v.is_empty())
    }

    fn set(&mut self, value: String) {
        let jar = std::mem::take(&mut self.jar);
        self.jar = jar.add(session_cookie(&self.config.cookie, value));
    }

    fn clear(&mut self) {
        let jar = std::mem::take(&mut self.jar);
        self.jar = jar.remove(clear_session_cookie(&self.config.cookie));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> Arc<SecurityConfig> {
        let mut config = SecurityConfig::default();
        config.cookie.password = "0123456789abcdef0123456789abcdef".into();
        Arc::new(config)
    }

    #[test]
    fn session_cookie_is_http_only_without_max_age() {
        let cookie = session_cookie(&config().cookie, "2.abc".into());
        assert_eq!(cookie.name(), "sesame_session");
        assert_eq!(cookie.http_only(), Some(true));
        assert_eq!(cookie.same_site(), Some(SameSite::Lax));
        assert!(cookie.max_age().is_none());
    }

    #[test]
    fn legacy_cookie_is_expired_on_its_own_path() {
        let mut config = SecurityConfig::default();
        config.cookie.legacy_path = "/dashboards".into();
        let cookie = clear_legacy_cookie(&config.cookie);
        assert_eq!(cookie.name(), "security_authentication");
        assert_eq!(cookie.path(), Some("/dashboards"));
        assert_eq!(cookie.max_age(), Some(Duration::ZERO));
    }

    #[test]
    fn storage_reads_and_replaces_the_session_cookie() {
        let jar = CookieJar::new().add(Cookie::new("sesame_session", "old"));
        let mut storage = CookieJarStorage::new(jar, config());
        assert_eq!(storage.get().as_deref(), Some("old"));

        storage.set("new".into());
        assert_eq!(storage.get().as_deref(), Some("new"));

        storage.clear();
        assert_eq!(storage.get(), None);
    }

    #[test]
    fn empty_cookie_value_reads_as_absent() {
        let jar = CookieJar::new().add(Cookie::new("sesame_session", ""));
        let storage = CookieJarStorage::new(jar, config());
        assert_eq!(storage.get(), None);
    }
}
