//! Route paths shared by the server and the client.
//!
//! All paths are relative to the configured server base path.

/// Login entry point; renders the client shell.
pub const GET_APP_LOGIN: &str = "/app/login";
/// Username/password login.
pub const POST_AUTH_LOGIN: &str = "/api/v1/auth/login";
/// Logout; always succeeds.
pub const POST_AUTH_LOGOUT: &str = "/api/v1/auth/logout";
/// Anonymous login; always answers with a redirect.
pub const GET_AUTH_ANONYMOUS: &str = "/auth/anonymous";
/// Currently enabled sign-in options, as reported by the backend.
pub const GET_AUTH_DASHBOARDSINFO: &str = "/api/v1/auth/dashboardsinfo";
/// Summary of the current session (requires a session).
pub const GET_AUTH_SESSION: &str = "/api/v1/auth/session";
/// OpenID Connect login, captures the URL fragment before redirecting.
pub const GET_AUTH_OPENID_LOGIN: &str = "/auth/openid/captureUrlFragment";
/// SAML login, captures the URL fragment before redirecting.
pub const GET_AUTH_SAML_LOGIN: &str = "/auth/saml/captureUrlFragment";

/// Join a server base path and a route path.
pub fn with_base_path(base_path: &str, path: &str) -> String {
    format!("{}{path}", base_path.trim_end_matches('/'))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_path_is_prefixed() {
        assert_eq!(with_base_path("/dash", GET_APP_LOGIN), "/dash/app/login");
        assert_eq!(with_base_path("/dash/", GET_APP_LOGIN), "/dash/app/login");
        assert_eq!(with_base_path("", GET_APP_LOGIN), "/app/login");
    }
}
